use proptest::prelude::*;

use passport_checkpoints::Trace;
use passport_types::BlockNumber;

proptest! {
    /// `at(b)` matches a linear scan for the last write at or before `b`.
    #[test]
    fn at_matches_linear_reference(
        gaps in prop::collection::vec(0u64..5, 1..40),
        probe in 0u64..250,
    ) {
        let mut trace = Trace::new();
        let mut writes: Vec<(u64, u64)> = Vec::new();
        let mut block = 0u64;
        for (i, gap) in gaps.iter().enumerate() {
            block += gap;
            trace.push(BlockNumber::new(block), i as u64).unwrap();
            writes.retain(|(b, _)| *b != block);
            writes.push((block, i as u64));
        }
        let expected = writes
            .iter()
            .filter(|(b, _)| *b <= probe)
            .last()
            .map(|(_, v)| *v);
        prop_assert_eq!(trace.at(BlockNumber::new(probe)).copied(), expected);
    }

    /// A write older than the latest checkpoint never changes the trace.
    #[test]
    fn out_of_order_writes_leave_trace_untouched(first in 1u64..1_000, back in 1u64..1_000) {
        let mut trace = Trace::starting_at(BlockNumber::new(first + back), 1u64);
        let before = trace.clone();
        prop_assert!(trace.push(BlockNumber::new(first), 2).is_err());
        prop_assert_eq!(trace, before);
    }
}
