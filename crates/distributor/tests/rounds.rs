//! Multi-round distribution scenarios driven through the public API.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use dropcraft_core::{Address, Amount};
use dropcraft_distributor::{
    ClaimRequest, DistributionEvent, Distributor, DistributorConfig, DistributorError,
    InMemoryTokenLedger, TokenLedger, TransferError,
};
use dropcraft_merkle::{Distribution, Leaf};

const DISTRIBUTOR: Address = Address::new([0xDD; 20]);
const ADMIN: Address = Address::new([0xAD; 20]);
const TOKEN: Address = Address::new([0xEE; 20]);

fn addr(b: u8) -> Address {
    Address::new([b; 20])
}

fn distributor_with(tokens: Arc<dyn TokenLedger>) -> Distributor {
    Distributor::new(DistributorConfig::new(DISTRIBUTOR, ADMIN).with_token(TOKEN), tokens)
}

fn funded(reserve: Amount) -> (Distributor, Arc<InMemoryTokenLedger>) {
    let tokens = Arc::new(InMemoryTokenLedger::new());
    tokens.mint(&TOKEN, &DISTRIBUTOR, reserve);
    (distributor_with(tokens.clone()), tokens)
}

fn request(dist: &Distribution, address: Address, amount: Amount, total: Amount) -> ClaimRequest {
    ClaimRequest::new(address, amount, total, dist.proof_for(&address).unwrap())
}

fn round_one() -> Distribution {
    Distribution::build(vec![
        Leaf::new(addr(1), 1_000_000),
        Leaf::new(addr(2), 1_000_000),
        Leaf::new(addr(3), 1_000_000),
    ])
    .unwrap()
}

fn round_two() -> Distribution {
    Distribution::build(vec![
        Leaf::new(addr(1), 2_500_000),
        Leaf::new(addr(2), 2_500_000),
        Leaf::new(addr(3), 2_500_000),
        Leaf::new(addr(4), 500_000),
    ])
    .unwrap()
}

#[test]
fn test_every_address_claims_its_entitlement() {
    let (distributor, tokens) = funded(3_000_000);
    let dist = round_one();
    distributor.set_root(dist.root(), &ADMIN).unwrap();

    for leaf in dist.leaves() {
        let receipt = distributor
            .claim(&request(&dist, leaf.address, leaf.entitlement, leaf.entitlement), &leaf.address)
            .unwrap();
        assert_eq!(receipt.cumulative_claimed, leaf.entitlement);
        assert_eq!(tokens.balance_of(&TOKEN, &leaf.address), leaf.entitlement);
    }

    assert_eq!(distributor.reserve_balance(), 0);
    assert_eq!(distributor.state().claimant_count(), 3);
    assert_eq!(distributor.state().total_claimed(), 3_000_000);
}

#[test]
fn test_second_claim_in_same_round_rejected() {
    let (distributor, tokens) = funded(10_000_000);
    let dist = round_one();
    distributor.set_root(dist.root(), &ADMIN).unwrap();

    distributor
        .claim(&request(&dist, addr(1), 1_000_000, 1_000_000), &addr(1))
        .unwrap();
    let again = distributor.claim(&request(&dist, addr(1), 1_000_000, 1_000_000), &addr(1));

    assert!(matches!(again, Err(DistributorError::ExceedsEntitlement { .. })));
    assert_eq!(tokens.balance_of(&TOKEN, &addr(1)), 1_000_000);
}

#[test]
fn test_entitlement_upgrade_pays_only_the_delta() {
    let (distributor, tokens) = funded(10_000_000);
    let first = round_one();
    let second = round_two();

    distributor.set_root(first.root(), &ADMIN).unwrap();
    distributor
        .claim(&request(&first, addr(1), 1_000_000, 1_000_000), &addr(1))
        .unwrap();

    distributor.set_root(second.root(), &ADMIN).unwrap();
    assert_eq!(distributor.round(), 2);
    assert_eq!(distributor.cumulative_claimed(&addr(1)), 1_000_000);

    // Claiming the full new total again would pay twice.
    let greedy = distributor.claim(&request(&second, addr(1), 2_500_000, 2_500_000), &addr(1));
    assert_eq!(
        greedy,
        Err(DistributorError::ExceedsEntitlement {
            claimed: 1_000_000,
            requested: 2_500_000,
            entitlement: 2_500_000
        })
    );

    let receipt = distributor
        .claim(&request(&second, addr(1), 1_500_000, 2_500_000), &addr(1))
        .unwrap();
    assert_eq!(receipt.paid, 1_500_000);
    assert_eq!(receipt.cumulative_claimed, 2_500_000);
    assert_eq!(receipt.round, 2);
    assert_eq!(tokens.balance_of(&TOKEN, &addr(1)), 2_500_000);

    let more = distributor.claim(&request(&second, addr(1), 1, 2_500_000), &addr(1));
    assert!(matches!(more, Err(DistributorError::ExceedsEntitlement { .. })));
}

#[test]
fn test_address_added_in_later_round() {
    let (distributor, _) = funded(10_000_000);
    let second = round_two();
    distributor.set_root(round_one().root(), &ADMIN).unwrap();
    distributor.set_root(second.root(), &ADMIN).unwrap();

    let receipt = distributor
        .claim(&request(&second, addr(4), 500_000, 500_000), &addr(4))
        .unwrap();
    assert_eq!(receipt.cumulative_claimed, 500_000);
}

#[test]
fn test_old_proof_invalid_after_rotation() {
    let (distributor, _) = funded(10_000_000);
    let first = round_one();
    distributor.set_root(first.root(), &ADMIN).unwrap();
    distributor.set_root(round_two().root(), &ADMIN).unwrap();

    let stale = distributor.claim(&request(&first, addr(2), 1_000_000, 1_000_000), &addr(2));
    assert_eq!(stale, Err(DistributorError::InvalidProof));
    assert_eq!(distributor.cumulative_claimed(&addr(2)), 0);
}

#[test]
fn test_lower_root_blocks_further_claims() {
    let (distributor, _) = funded(10_000_000);
    let second = round_two();
    distributor.set_root(second.root(), &ADMIN).unwrap();
    distributor
        .claim(&request(&second, addr(3), 2_000_000, 2_500_000), &addr(3))
        .unwrap();

    // Later root certifies less than was already paid: nothing left to claim.
    let first = round_one();
    distributor.set_root(first.root(), &ADMIN).unwrap();
    let result = distributor.claim(&request(&first, addr(3), 1, 1_000_000), &addr(3));
    assert!(matches!(result, Err(DistributorError::ExceedsEntitlement { .. })));
    assert_eq!(distributor.cumulative_claimed(&addr(3)), 2_000_000);
}

#[test]
fn test_single_recipient_round() {
    let (distributor, _) = funded(100);
    let dist = Distribution::build(vec![Leaf::new(addr(9), 100)]).unwrap();
    distributor.set_root(dist.root(), &ADMIN).unwrap();

    let claim = request(&dist, addr(9), 100, 100);
    assert!(claim.proof.is_empty());
    distributor.claim(&claim, &addr(9)).unwrap();
    assert_eq!(distributor.reserve_balance(), 0);
}

#[test]
fn test_non_admin_cannot_rotate() {
    let (distributor, _) = funded(0);
    let dist = round_one();
    distributor.set_root(dist.root(), &ADMIN).unwrap();

    let result = distributor.set_root(round_two().root(), &addr(1));
    assert_eq!(result, Err(DistributorError::NotAdministrator(addr(1))));
    assert_eq!(distributor.current_root(), Some(dist.root()));
    assert_eq!(distributor.round(), 1);
}

#[test]
fn test_claim_before_any_root() {
    let (distributor, _) = funded(1_000_000);
    let dist = round_one();

    let result = distributor.claim(&request(&dist, addr(1), 1, 1_000_000), &addr(1));
    assert_eq!(result, Err(DistributorError::NoActiveRoot));
}

struct FailingLedger;

impl TokenLedger for FailingLedger {
    fn balance_of(&self, _token: &Address, _holder: &Address) -> Amount {
        Amount::MAX
    }

    fn transfer(&self, _: &Address, _: &Address, _: &Address, _: Amount) -> Result<(), TransferError> {
        Err(TransferError::Rejected("paused".to_string()))
    }
}

#[test]
fn test_failed_transfer_leaves_record_untouched() {
    let distributor = distributor_with(Arc::new(FailingLedger));
    let dist = round_one();
    distributor.set_root(dist.root(), &ADMIN).unwrap();
    distributor.drain_events();

    let result = distributor.claim(&request(&dist, addr(1), 1_000, 1_000_000), &addr(1));
    assert!(matches!(result, Err(DistributorError::InsufficientReserve { .. })));
    assert_eq!(distributor.cumulative_claimed(&addr(1)), 0);
    assert!(distributor.drain_events().is_empty());
}

#[test]
fn test_event_log_in_commit_order() {
    let (distributor, _) = funded(10_000_000);
    let first = round_one();
    let second = round_two();

    distributor.set_root(first.root(), &ADMIN).unwrap();
    distributor
        .claim(&request(&first, addr(1), 1_000_000, 1_000_000), &addr(1))
        .unwrap();
    distributor.set_root(second.root(), &ADMIN).unwrap();
    distributor
        .claim(&request(&second, addr(1), 1_500_000, 2_500_000), &addr(1))
        .unwrap();

    assert_eq!(
        distributor.drain_events(),
        vec![
            DistributionEvent::RootUpdated {
                previous: None,
                root: first.root(),
                round: 1
            },
            DistributionEvent::RewardsClaimed {
                address: addr(1),
                amount: 1_000_000,
                cumulative_claimed: 1_000_000,
                round: 1
            },
            DistributionEvent::RootUpdated {
                previous: Some(first.root()),
                root: second.root(),
                round: 2
            },
            DistributionEvent::RewardsClaimed {
                address: addr(1),
                amount: 1_500_000,
                cumulative_claimed: 2_500_000,
                round: 2
            },
        ]
    );
}

#[test]
fn test_concurrent_claims_never_exceed_entitlement() {
    const THREADS: usize = 16;

    let (distributor, tokens) = funded(100_000_000);
    let distributor = Arc::new(distributor);
    let dist = round_one();
    distributor.set_root(dist.root(), &ADMIN).unwrap();

    let barrier = Arc::new(Barrier::new(THREADS));
    let successes = Arc::new(AtomicUsize::new(0));
    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let distributor = Arc::clone(&distributor);
            let barrier = Arc::clone(&barrier);
            let successes = Arc::clone(&successes);
            let claim = request(&dist, addr(1), 300_000, 1_000_000);
            thread::spawn(move || {
                barrier.wait();
                if distributor.claim(&claim, &addr(1)).is_ok() {
                    successes.fetch_add(1, Ordering::SeqCst);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    // Three claims of 300_000 fit in 1_000_000, a fourth does not.
    assert_eq!(successes.load(Ordering::SeqCst), 3);
    assert_eq!(distributor.cumulative_claimed(&addr(1)), 900_000);
    assert_eq!(tokens.balance_of(&TOKEN, &addr(1)), 900_000);
}

#[test]
fn test_rotation_during_claims_keeps_ledger_consistent() {
    let (distributor, tokens) = funded(100_000_000);
    let distributor = Arc::new(distributor);
    let first = round_one();
    let second = round_two();
    distributor.set_root(first.root(), &ADMIN).unwrap();

    let claimers: Vec<_> = [1u8, 2, 3]
        .into_iter()
        .map(|b| {
            let distributor = Arc::clone(&distributor);
            let old = request(&first, addr(b), 1_000_000, 1_000_000);
            let new = request(&second, addr(b), 1_000_000, 2_500_000);
            thread::spawn(move || {
                let _ = distributor.claim(&old, &addr(b));
                let _ = distributor.claim(&new, &addr(b));
            })
        })
        .collect();

    let rotator = {
        let distributor = Arc::clone(&distributor);
        let root = second.root();
        thread::spawn(move || distributor.set_root(root, &ADMIN))
    };

    for handle in claimers {
        handle.join().unwrap();
    }
    rotator.join().unwrap().unwrap();

    for b in [1u8, 2, 3] {
        let claimed = distributor.cumulative_claimed(&addr(b));
        assert!(claimed <= 2_500_000);
        assert_eq!(tokens.balance_of(&TOKEN, &addr(b)), claimed);
    }
    assert_eq!(distributor.round(), 2);
}
