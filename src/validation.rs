use crate::dataset::MatchData;
use crate::numerics::{MAX_GOAL_RATE, safe_exp};

// Shared gate run by every evaluator before its match loop. Anything that
// fails here makes the whole call return the penalty sentinel, so a
// gradient-free optimizer sees a flat wall instead of a crash.
pub(crate) fn inputs_are_usable(
    data: &MatchData,
    attack: &[f64],
    defence: &[f64],
    hfa: f64,
) -> bool {
    let t = attack.len();
    if t == 0 || defence.len() != t {
        return false;
    }

    let n = data.goals_home.len();
    if data.goals_away.len() != n
        || data.weights.len() != n
        || data.home_idx.len() != n
        || data.away_idx.len() != n
    {
        return false;
    }

    if !hfa.is_finite() {
        return false;
    }
    if attack.iter().chain(defence.iter()).any(|v| !v.is_finite()) {
        return false;
    }
    if data.weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return false;
    }
    if data
        .home_idx
        .iter()
        .chain(data.away_idx.iter())
        .any(|&i| i >= t)
    {
        return false;
    }

    true
}

pub(crate) fn rate_is_plausible(lambda: f64) -> bool {
    lambda.is_finite() && lambda > 0.0 && lambda <= MAX_GOAL_RATE
}

// Expected-goal rates for one fixture, or None when either rate leaves the
// plausible range.
pub(crate) fn match_rates(
    data: &MatchData,
    i: usize,
    attack: &[f64],
    defence: &[f64],
    hfa: f64,
) -> Option<(f64, f64)> {
    let h = data.home_idx[i];
    let a = data.away_idx[i];
    let lambda_home = safe_exp(hfa + attack[h] + defence[a]);
    let lambda_away = safe_exp(attack[a] + defence[h]);
    if rate_is_plausible(lambda_home) && rate_is_plausible(lambda_away) {
        Some((lambda_home, lambda_away))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::MatchData;

    fn two_matches() -> MatchData {
        MatchData::from_results(
            &["A", "B"],
            &["B", "A"],
            &[1, 0],
            &[0, 2],
            None,
        )
        .unwrap()
    }

    #[test]
    fn accepts_well_formed_inputs() {
        let data = two_matches();
        assert!(inputs_are_usable(&data, &[0.1, -0.1], &[0.0, 0.0], 0.2));
    }

    #[test]
    fn rejects_structural_and_numerical_defects() {
        let data = two_matches();
        assert!(!inputs_are_usable(&data, &[0.1], &[0.0, 0.0], 0.2));
        assert!(!inputs_are_usable(&data, &[], &[], 0.2));
        assert!(!inputs_are_usable(&data, &[0.1, f64::NAN], &[0.0, 0.0], 0.2));
        assert!(!inputs_are_usable(&data, &[0.1, -0.1], &[0.0, 0.0], f64::NAN));

        let mut bad_idx = two_matches();
        bad_idx.home_idx[0] = 7;
        assert!(!inputs_are_usable(&bad_idx, &[0.1, -0.1], &[0.0, 0.0], 0.2));

        let mut bad_weight = two_matches();
        bad_weight.weights[1] = -1.0;
        assert!(!inputs_are_usable(&bad_weight, &[0.1, -0.1], &[0.0, 0.0], 0.2));
    }

    #[test]
    fn rate_plausibility_bounds() {
        assert!(rate_is_plausible(1.3));
        assert!(rate_is_plausible(MAX_GOAL_RATE));
        assert!(!rate_is_plausible(0.0));
        assert!(!rate_is_plausible(MAX_GOAL_RATE + 1.0));
        assert!(!rate_is_plausible(f64::INFINITY));
    }

    #[test]
    fn match_rates_follow_the_log_linear_model() {
        let data = two_matches();
        let (lh, la) = match_rates(&data, 0, &[0.1, -0.1], &[0.0, 0.0], 0.2).unwrap();
        assert!((lh - (0.2_f64 + 0.1).exp()).abs() < 1e-12);
        assert!((la - (-0.1_f64).exp()).abs() < 1e-12);

        // A huge strength offset pushes the rate past the plausible cap.
        assert!(match_rates(&data, 0, &[10.0, -0.1], &[0.0, 0.0], 0.2).is_none());
    }
}
