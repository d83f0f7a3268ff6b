//! Binary Merkle tree for distribution proofs.
//!
//! Leaf formula: `Keccak256(encode(address, entitlement))`, see [`crate::codec`].
//! Internal nodes: `Keccak256(min(a, b) || max(a, b))`.
//! If a level has an odd number of nodes, the last node is paired with itself.
//!
//! Sorting each pair means a proof is just the list of sibling hashes:
//! the verifier never needs the leaf's position in the tree.

use std::collections::HashMap;

use sha3::{Digest, Keccak256};
use tracing::debug;

use dropcraft_core::{hash_hex, parse_hash, short_hex, Address, Amount, Hash};

use crate::codec::{leaf_hash, Leaf};
use crate::{MerkleError, Result};

/// A Merkle proof consisting of sibling hashes along the path to the root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MerkleProof {
    /// Sibling hashes from leaf level to root (bottom-up).
    pub siblings: Vec<Hash>,
}

impl MerkleProof {
    pub fn new(siblings: Vec<Hash>) -> Self {
        Self { siblings }
    }

    /// Parse a proof from hex digests. Any element that is not a 32-byte
    /// digest fails with `MalformedProof`.
    pub fn from_hex<S: AsRef<str>>(elements: &[S]) -> Result<Self> {
        let siblings = elements
            .iter()
            .map(|s| parse_hash(s.as_ref()).map_err(|e| MerkleError::MalformedProof(e.to_string())))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { siblings })
    }

    pub fn to_hex(&self) -> Vec<String> {
        self.siblings.iter().map(hash_hex).collect()
    }

    pub fn len(&self) -> usize {
        self.siblings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.siblings.is_empty()
    }
}

/// A binary Merkle tree over an ordered, address-unique leaf set.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    /// All nodes stored level by level, bottom-up. `layers[0]` = leaf hashes.
    layers: Vec<Vec<Hash>>,
    /// Leaves in input order
    leaves: Vec<Leaf>,
    /// Address → leaf index
    index: HashMap<Address, usize>,
    root: Hash,
}

/// Hash two child nodes to produce a parent, smaller hash first.
pub fn hash_pair(a: &Hash, b: &Hash) -> Hash {
    let (left, right) = if a <= b { (a, b) } else { (b, a) };
    Keccak256::new()
        .chain_update(left)
        .chain_update(right)
        .finalize()
        .into()
}

impl MerkleTree {
    /// Build a tree from leaves in the given order.
    ///
    /// Fails with `EmptyDistribution` for an empty set and `DuplicateAddress`
    /// if any address appears twice. Nothing is returned on failure, so a
    /// partially built tree can never escape.
    pub fn from_leaves(leaves: Vec<Leaf>) -> Result<Self> {
        if leaves.is_empty() {
            return Err(MerkleError::EmptyDistribution);
        }

        let mut index = HashMap::with_capacity(leaves.len());
        for (i, leaf) in leaves.iter().enumerate() {
            if index.insert(leaf.address, i).is_some() {
                return Err(MerkleError::DuplicateAddress(leaf.address));
            }
        }

        let hashes: Vec<Hash> = leaves.iter().map(Leaf::hash).collect();
        let layers = build_layers(hashes);
        let root = layers
            .last()
            .and_then(|top| top.first())
            .copied()
            .ok_or(MerkleError::EmptyDistribution)?;

        debug!(
            "Built Merkle tree: {} leaves, depth {}, root {}",
            leaves.len(),
            layers.len() - 1,
            short_hex(&root),
        );

        Ok(Self {
            layers,
            leaves,
            index,
            root,
        })
    }

    /// Get the Merkle root.
    pub fn root(&self) -> Hash {
        self.root
    }

    /// Generate the proof for an address, or `None` if it is not a leaf.
    pub fn proof(&self, address: &Address) -> Option<MerkleProof> {
        let leaf_index = *self.index.get(address)?;
        self.proof_at(leaf_index)
    }

    /// Generate the proof for the leaf at `leaf_index`.
    pub fn proof_at(&self, leaf_index: usize) -> Option<MerkleProof> {
        if leaf_index >= self.leaves.len() {
            return None;
        }

        let mut siblings = Vec::with_capacity(self.layers.len() - 1);
        let mut idx = leaf_index;

        for layer in &self.layers[..self.layers.len() - 1] {
            // Unpaired last node is its own sibling
            let sibling = layer.get(idx ^ 1).unwrap_or(&layer[idx]);
            siblings.push(*sibling);
            idx /= 2;
        }

        Some(MerkleProof { siblings })
    }

    /// Fold a leaf hash up through a proof and compare with `root`.
    pub fn verify(root: &Hash, leaf: &Hash, proof: &MerkleProof) -> bool {
        let computed = proof
            .siblings
            .iter()
            .fold(*leaf, |current, sibling| hash_pair(&current, sibling));
        computed == *root
    }

    pub fn leaves(&self) -> &[Leaf] {
        &self.leaves
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    /// Number of levels above the leaves (= proof length).
    pub fn depth(&self) -> usize {
        self.layers.len() - 1
    }

    pub fn entitlement_of(&self, address: &Address) -> Option<Amount> {
        self.index.get(address).map(|&i| self.leaves[i].entitlement)
    }
}

fn build_layers(leaf_hashes: Vec<Hash>) -> Vec<Vec<Hash>> {
    let mut layers = vec![leaf_hashes];

    loop {
        let prev = &layers[layers.len() - 1];
        if prev.len() <= 1 {
            break;
        }
        let next_layer: Vec<Hash> = prev
            .chunks(2)
            .map(|pair| hash_pair(&pair[0], pair.get(1).unwrap_or(&pair[0])))
            .collect();
        layers.push(next_layer);
    }

    layers
}

/// Check that `(address, entitlement)` is committed to by `root`.
///
/// Only asserts consistency of the claimed pair with the root; it knows
/// nothing about what has been paid.
pub fn verify_leaf(root: &Hash, address: &Address, entitlement: Amount, proof: &MerkleProof) -> bool {
    MerkleTree::verify(root, &leaf_hash(address, entitlement), proof)
}

/// [`verify_leaf`] over textual inputs.
///
/// A wrong-width address, root, or proof element fails with
/// `MalformedProof`; a well-formed proof that does not match yields `Ok(false)`.
pub fn verify_hex<S: AsRef<str>>(
    root: &str,
    address: &str,
    entitlement: Amount,
    proof: &[S],
) -> Result<bool> {
    let root = parse_hash(root).map_err(|e| MerkleError::MalformedProof(format!("root: {}", e)))?;
    let address: Address = address
        .parse()
        .map_err(|e| MerkleError::MalformedProof(format!("address: {}", e)))?;
    let proof = MerkleProof::from_hex(proof)?;
    Ok(verify_leaf(&root, &address, entitlement, &proof))
}
