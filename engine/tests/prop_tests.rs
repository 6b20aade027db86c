use std::sync::Arc;

use proptest::prelude::*;

use passport_engine::{Collaborators, Passport, PassportConfig};
use passport_nullables::{NullAppRegistry, NullBlockClock, NullMembership, NullRoundClock};
use passport_types::{Address, AppId, Check, ParamKey, SecurityTier};

fn acct(i: usize) -> Address {
    Address::new(format!("psp_w{i}"))
}

fn ledger() -> (Passport, Arc<NullBlockClock>, Address) {
    let blocks = Arc::new(NullBlockClock::new(1));
    let apps = Arc::new(NullAppRegistry::new());
    apps.register(AppId::new([1u8; 32]), acct(1000));
    let admin = acct(999);
    let collaborators = Collaborators {
        blocks: blocks.clone(),
        rounds: Arc::new(NullRoundClock::new()),
        apps,
        membership: Arc::new(NullMembership::new()),
    };
    let mut config = PassportConfig::default();
    config.params.max_entities_per_passport = 100;
    let ledger = Passport::new(&config, &admin, collaborators).expect("ledger");
    (ledger, blocks, admin)
}

/// Linear reference of the decay recurrence.
fn reference_cumulative(scores: &[u64], window: usize, decay: u64) -> u64 {
    let last = scores.len();
    let start = if last >= window { last - window + 1 } else { 1 };
    let mut c: u64 = 0;
    for round in start..=last {
        c = scores[round - 1] + c * (100 - decay) / 100;
    }
    c
}

#[derive(Clone, Debug)]
enum Op {
    Signal(usize),
    Link(usize, usize),
    Unlink(usize),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..6).prop_map(Op::Signal),
        (0usize..6, 0usize..6).prop_map(|(e, p)| Op::Link(e, p)),
        (0usize..6).prop_map(Op::Unlink),
    ]
}

proptest! {
    /// Every address's count equals its own signals plus the counts of its
    /// Active entities, after any sequence of signals, links and unlinks.
    #[test]
    fn signal_sum_invariant(ops in prop::collection::vec(arb_op(), 1..40)) {
        let (mut ledger, blocks, _) = ledger();
        let app = AppId::new([1u8; 32]);
        let signaler = acct(500);
        ledger.assign_signaler(&acct(1000), app, &signaler).unwrap();

        for op in ops {
            blocks.advance(1);
            // Rejected operations are part of the sequence; they must not
            // disturb the invariant either.
            let _ = match op {
                Op::Signal(u) => ledger.signal(&signaler, &acct(u), ""),
                Op::Link(e, p) => ledger
                    .request_link(&acct(e), &acct(p))
                    .and_then(|_| ledger.accept_link(&acct(p), &acct(e))),
                Op::Unlink(e) => ledger.unlink(&acct(e), &acct(e)),
            };

            for i in 0..6 {
                // An entity has no entities of its own, so this also pins
                // its count to its direct signals.
                let addr = acct(i);
                let expected = ledger.own_signal_count(&addr)
                    + ledger
                        .entities_of(&addr)
                        .iter()
                        .map(|e| ledger.signal_count(e))
                        .sum::<u64>();
                prop_assert_eq!(ledger.signal_count(&addr), expected);
            }
        }
    }

    /// The ledger's cumulative score matches a direct evaluation of the
    /// recurrence.
    #[test]
    fn decay_matches_reference(
        scores in prop::collection::vec(0u64..10_000, 1..20),
        window in 1usize..25,
        decay in 0u64..=100,
    ) {
        let (mut ledger, _, admin) = ledger();
        let app = AppId::new([1u8; 32]);
        let user = acct(1);
        ledger.set_param(&admin, ParamKey::DecayRate, decay).unwrap();
        ledger.set_param(&admin, ParamKey::RoundsForCumulativeScore, window as u64).unwrap();
        for (i, points) in scores.iter().enumerate() {
            ledger
                .register_aggregated_actions(&admin, &user, app, i as u32 + 1, *points)
                .unwrap();
        }
        let last = scores.len() as u32;
        prop_assert_eq!(
            ledger.cumulative_score(&user, last),
            reference_cumulative(&scores, window, decay)
        );
    }

    /// Entity linking does not check the delegator role: an Active delegator
    /// can still become an entity. Delegation, in contrast, rejects entities.
    #[test]
    fn link_ignores_delegator_role(a in 0usize..50, d in 50usize..100, p in 100usize..150) {
        let (mut ledger, blocks, _) = ledger();
        let (a, d, p) = (acct(a), acct(d), acct(p));
        ledger.request_delegation(&a, &d).unwrap();
        ledger.accept_delegation(&d, &a).unwrap();
        blocks.advance(1);

        ledger.request_link(&a, &p).unwrap();
        prop_assert!(ledger.accept_link(&p, &a).is_ok());
        prop_assert!(ledger.is_delegator(&a));
        prop_assert!(ledger.is_entity(&a));
        prop_assert!(ledger.request_delegation(&a, &d).is_err());
    }

    /// Changing a threshold at a later block never changes an earlier
    /// decision.
    #[test]
    fn later_threshold_change_keeps_history(
        points in 0u64..1_000,
        first in 0u64..1_000,
        second in 0u64..1_000,
    ) {
        let (mut ledger, blocks, admin) = ledger();
        let app = AppId::new([1u8; 32]);
        let user = acct(1);
        ledger.set_app_security(&admin, app, SecurityTier::Low).unwrap();
        ledger.set_check_enabled(&admin, Check::ParticipationScore, true).unwrap();
        ledger.set_param(&admin, ParamKey::ParticipationScoreThreshold, first).unwrap();
        ledger.register_aggregated_actions(&admin, &user, app, 1, points).unwrap();

        let b1 = blocks.advance(1);
        let before = ledger.is_person_at(&user, b1);
        blocks.advance(1);
        ledger.set_param(&admin, ParamKey::ParticipationScoreThreshold, second).unwrap();

        prop_assert_eq!(ledger.is_person_at(&user, b1), before);
        prop_assert_eq!(before.is_person, points >= first);
        prop_assert_eq!(ledger.is_person(&user).is_person, points >= second);
    }
}
