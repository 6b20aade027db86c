//! Decayed cumulative score.

use passport_types::RoundId;

/// First round of the look-back window ending at `last_round`. Round 0 is
/// never scored, so the window is clamped at round 1.
pub fn window_start(last_round: RoundId, window: u64) -> RoundId {
    let window = u32::try_from(window).unwrap_or(u32::MAX);
    if window == 0 {
        return last_round.saturating_add(1);
    }
    if last_round >= window {
        last_round - window + 1
    } else {
        1
    }
}

/// Fold the round scores of the window ending at `last_round`, applying
/// `decay_rate` percent of decay per step with floor truncation.
///
/// A `decay_rate` above 100 is treated as 100.
pub fn cumulative_score<F>(round_score: F, last_round: RoundId, window: u64, decay_rate: u64) -> u64
where
    F: Fn(RoundId) -> u64,
{
    if window == 0 || last_round == 0 {
        return 0;
    }
    let keep = u128::from(100 - decay_rate.min(100));
    let start = window_start(last_round, window);
    let mut cumulative: u64 = 0;
    for round in start..=last_round {
        // C(k-1) × keep / 100 never exceeds C(k-1), so the cast is lossless.
        let carried = (u128::from(cumulative) * keep / 100) as u64;
        cumulative = round_score(round).saturating_add(carried);
    }
    cumulative
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(scores: &[u64]) -> impl Fn(RoundId) -> u64 + '_ {
        move |round| {
            scores
                .get((round as usize).wrapping_sub(1))
                .copied()
                .unwrap_or(0)
        }
    }

    #[test]
    fn window_start_clamps_at_round_one() {
        assert_eq!(window_start(5, 8), 1);
        assert_eq!(window_start(8, 8), 1);
        assert_eq!(window_start(9, 8), 2);
        assert_eq!(window_start(3, 1), 3);
    }

    #[test]
    fn zero_window_scores_nothing() {
        let scores = [100, 100];
        assert_eq!(cumulative_score(series(&scores), 2, 0, 0), 0);
    }

    #[test]
    fn no_decay_is_a_plain_sum() {
        let scores = [100, 200, 300];
        assert_eq!(cumulative_score(series(&scores), 3, 8, 0), 600);
    }

    #[test]
    fn decay_recurrence_truncates_each_step() {
        // 100, 100+80, 200+144, 200+275 (275.2), 400+380 (380)
        let scores = [100, 100, 200, 200, 400];
        let expected = [100, 180, 344, 475, 780];
        for (i, want) in expected.iter().enumerate() {
            let last = i as RoundId + 1;
            assert_eq!(cumulative_score(series(&scores), last, 8, 20), *want, "round {last}");
        }
    }

    #[test]
    fn five_equal_rounds_with_decay() {
        let scores = [100; 5];
        assert_eq!(cumulative_score(series(&scores), 5, 8, 20), 336);
    }

    #[test]
    fn window_drops_old_rounds() {
        let scores = [1000, 0, 0, 10];
        assert_eq!(cumulative_score(series(&scores), 4, 2, 0), 10);
        assert_eq!(cumulative_score(series(&scores), 4, 4, 0), 1010);
    }

    #[test]
    fn full_decay_keeps_only_last_round() {
        let scores = [500, 500, 7];
        assert_eq!(cumulative_score(series(&scores), 3, 8, 100), 7);
        assert_eq!(cumulative_score(series(&scores), 3, 8, 250), 7);
    }

    #[test]
    fn round_zero_is_empty() {
        let scores = [100];
        assert_eq!(cumulative_score(series(&scores), 0, 8, 0), 0);
    }
}
