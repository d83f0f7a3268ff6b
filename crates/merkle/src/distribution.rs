//! Distribution artifacts.
//!
//! A `Distribution` is the in-memory result of building a round: the tree,
//! its root, and the per-address proofs. `DistributionFile` is the JSON form
//! handed out to claimants, and `ClaimIndex` is a loaded, fully re-verified
//! file keyed by address for O(1) proof lookup.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use dropcraft_core::{hash_hex, parse_amount, parse_hash, short_hex, Address, Amount, Hash};

use crate::codec::Leaf;
use crate::merkle::{verify_leaf, MerkleProof, MerkleTree};
use crate::{MerkleError, Result};

/// Build a leaf set in which every address is entitled to the same total.
pub fn uniform_leaves(addresses: &[Address], amount: Amount) -> Vec<Leaf> {
    addresses
        .iter()
        .map(|address| Leaf::new(*address, amount))
        .collect()
}

/// A built distribution round.
#[derive(Debug, Clone)]
pub struct Distribution {
    tree: MerkleTree,
    /// Sum of all entitlements
    total: Amount,
}

impl Distribution {
    /// Build a distribution from leaves in the given order.
    ///
    /// Tree errors (empty set, duplicate addresses) are reported first. A
    /// set whose entitlements sum past `u128::MAX` still forms a valid tree
    /// but cannot be published: the file's `total` is an `Amount`, so the
    /// build fails with `AmountOverflow`.
    pub fn build(leaves: Vec<Leaf>) -> Result<Self> {
        let tree = MerkleTree::from_leaves(leaves)?;

        let total = tree
            .leaves()
            .iter()
            .try_fold(0u128, |acc, leaf| acc.checked_add(leaf.entitlement))
            .ok_or_else(|| {
                MerkleError::AmountOverflow("distribution total exceeds 128 bits".to_string())
            })?;

        info!(
            "Built distribution: {} addresses, total {}, root {}",
            tree.leaf_count(),
            total,
            short_hex(&tree.root()),
        );

        Ok(Self { tree, total })
    }

    pub fn root(&self) -> Hash {
        self.tree.root()
    }

    pub fn total(&self) -> Amount {
        self.total
    }

    pub fn len(&self) -> usize {
        self.tree.leaf_count()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.leaf_count() == 0
    }

    pub fn leaves(&self) -> &[Leaf] {
        self.tree.leaves()
    }

    pub fn tree(&self) -> &MerkleTree {
        &self.tree
    }

    /// Proof for a specific address.
    pub fn proof_for(&self, address: &Address) -> Result<MerkleProof> {
        self.tree
            .proof(address)
            .ok_or(MerkleError::UnknownAddress(*address))
    }

    /// Serialisable form with one proof per leaf, in leaf order.
    pub fn to_file(&self) -> DistributionFile {
        let claims = self
            .tree
            .leaves()
            .iter()
            .enumerate()
            .filter_map(|(i, leaf)| {
                self.tree.proof_at(i).map(|proof| ClaimEntry {
                    address: leaf.address,
                    amount: leaf.entitlement.to_string(),
                    proof: proof.to_hex(),
                })
            })
            .collect();

        DistributionFile {
            merkle_root: hash_hex(&self.root()),
            total: self.total.to_string(),
            claims,
        }
    }
}

/// One claimant's entry in a distribution file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimEntry {
    pub address: Address,
    /// Total entitlement, decimal
    pub amount: String,
    /// Sibling hashes, leaf to root
    pub proof: Vec<String>,
}

/// JSON distribution file.
///
/// ```json
/// {
///   "merkleRoot": "0x…",
///   "total": "3500000",
///   "claims": [
///     { "address": "0x…", "amount": "1000000", "proof": ["0x…", "0x…"] }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionFile {
    pub merkle_root: String,
    pub total: String,
    pub claims: Vec<ClaimEntry>,
}

impl DistributionFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| MerkleError::Serialization(format!("{}: {}", path.display(), e)))
    }

    /// Write the file atomically (temp file + rename).
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| MerkleError::Serialization(e.to_string()))?;

        let temp_path = path.with_extension("tmp");
        let mut file = File::create(&temp_path)?;
        file.write_all(json.as_bytes())?;
        file.flush()?;
        fs::rename(&temp_path, path)?;

        debug!("Wrote distribution file {} ({} claims)", path.display(), self.claims.len());
        Ok(())
    }
}

/// A distribution file that has been parsed and re-verified.
///
/// Every entry's proof is checked against the root and the stated total is
/// checked against the sum of entitlements, so an index can only exist for
/// an internally consistent file.
#[derive(Debug, Clone)]
pub struct ClaimIndex {
    root: Hash,
    total: Amount,
    entries: Vec<(Leaf, MerkleProof)>,
    by_address: HashMap<Address, usize>,
}

impl ClaimIndex {
    pub fn load(path: &Path) -> Result<Self> {
        Self::from_file(&DistributionFile::load(path)?)
    }

    pub fn from_file(file: &DistributionFile) -> Result<Self> {
        let root = parse_hash(&file.merkle_root)?;
        if file.claims.is_empty() {
            return Err(MerkleError::EmptyDistribution);
        }

        let mut entries = Vec::with_capacity(file.claims.len());
        let mut by_address = HashMap::with_capacity(file.claims.len());
        let mut sum: Amount = 0;

        for claim in &file.claims {
            let entitlement = parse_amount(&claim.amount)?;
            let proof = MerkleProof::from_hex(&claim.proof)?;

            if by_address.insert(claim.address, entries.len()).is_some() {
                return Err(MerkleError::DuplicateAddress(claim.address));
            }
            if !verify_leaf(&root, &claim.address, entitlement, &proof) {
                return Err(MerkleError::Inconsistent(format!(
                    "proof for {} does not match root {}",
                    claim.address, file.merkle_root
                )));
            }

            sum = sum.checked_add(entitlement).ok_or_else(|| {
                MerkleError::AmountOverflow("distribution total exceeds 128 bits".to_string())
            })?;
            entries.push((Leaf::new(claim.address, entitlement), proof));
        }

        let total = parse_amount(&file.total)?;
        if total != sum {
            return Err(MerkleError::Inconsistent(format!(
                "stated total {} but entitlements sum to {}",
                total, sum
            )));
        }

        Ok(Self {
            root,
            total,
            entries,
            by_address,
        })
    }

    pub fn root(&self) -> Hash {
        self.root
    }

    pub fn total(&self) -> Amount {
        self.total
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entitlement and proof for an address.
    pub fn claim_for(&self, address: &Address) -> Result<(Amount, &MerkleProof)> {
        let index = *self
            .by_address
            .get(address)
            .ok_or(MerkleError::UnknownAddress(*address))?;
        let (leaf, proof) = &self.entries[index];
        Ok((leaf.entitlement, proof))
    }

    /// Entries in file order.
    pub fn entries(&self) -> impl Iterator<Item = (&Leaf, &MerkleProof)> {
        self.entries.iter().map(|(leaf, proof)| (leaf, proof))
    }
}
