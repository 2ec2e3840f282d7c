use crate::dataset::MatchData;
use crate::numerics::{NLL_PENALTY, is_valid_log_likelihood, poisson_log_pmf, safe_log};
use crate::validation::{inputs_are_usable, match_rates};

// Low-score correlation multiplier from Dixon & Coles (1997). Scores with
// both sides above 1 are left untouched.
pub(crate) fn tau(
    goals_home: u32,
    goals_away: u32,
    lambda_home: f64,
    lambda_away: f64,
    rho: f64,
) -> f64 {
    match (goals_home, goals_away) {
        (0, 0) => 1.0 - lambda_home * lambda_away * rho,
        (0, 1) => 1.0 + lambda_home * rho,
        (1, 0) => 1.0 + lambda_away * rho,
        (1, 1) => 1.0 - rho,
        _ => 1.0,
    }
}

pub fn dixon_coles_nll(
    data: &MatchData,
    attack: &[f64],
    defence: &[f64],
    hfa: f64,
    rho: f64,
) -> f64 {
    if !rho.is_finite() || !inputs_are_usable(data, attack, defence, hfa) {
        return NLL_PENALTY;
    }

    let mut total = 0.0;
    for i in 0..data.n_matches() {
        let Some((lambda_home, lambda_away)) = match_rates(data, i, attack, defence, hfa) else {
            return NLL_PENALTY;
        };

        let goals_home = data.goals_home[i];
        let goals_away = data.goals_away[i];
        let llk_home = poisson_log_pmf(goals_home, lambda_home);
        let llk_away = poisson_log_pmf(goals_away, lambda_away);
        if !is_valid_log_likelihood(llk_home) || !is_valid_log_likelihood(llk_away) {
            return NLL_PENALTY;
        }

        // safe_log turns a non-positive tau (rho pushed out of range) into
        // the log sentinel, which keeps the objective finite but steep.
        let adjustment = safe_log(tau(goals_home, goals_away, lambda_home, lambda_away, rho));
        total += data.weights[i] * (llk_home + llk_away + adjustment);
    }

    -total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::MatchData;
    use crate::poisson::poisson_nll;

    fn small_season() -> MatchData {
        MatchData::from_results(
            &["A", "B", "C", "A"],
            &["B", "C", "A", "C"],
            &[0, 1, 1, 2],
            &[0, 1, 0, 2],
            None,
        )
        .unwrap()
    }

    #[test]
    fn zero_rho_reduces_to_independent_poisson() {
        let data = small_season();
        let attack = [0.12, -0.05, -0.07];
        let defence = [0.02, -0.01, -0.01];
        let dc = dixon_coles_nll(&data, &attack, &defence, 0.2, 0.0);
        let ip = poisson_nll(&data, &attack, &defence, 0.2);
        assert!((dc - ip).abs() < 1e-12);
    }

    #[test]
    fn negative_rho_lifts_low_score_draws() {
        // All four adjusted cells appear in this dataset; a negative rho
        // inflates (0,0) and (1,1) so the NLL of this draw-heavy sample drops.
        let data = small_season();
        let attack = [0.0, 0.0, 0.0];
        let defence = [0.0, 0.0, 0.0];
        let with_rho = dixon_coles_nll(&data, &attack, &defence, 0.1, -0.08);
        let without = dixon_coles_nll(&data, &attack, &defence, 0.1, 0.0);
        assert!(with_rho < without);
    }

    #[test]
    fn non_finite_rho_returns_penalty() {
        let data = small_season();
        let attack = [0.0, 0.0, 0.0];
        let defence = [0.0, 0.0, 0.0];
        assert_eq!(
            dixon_coles_nll(&data, &attack, &defence, 0.1, f64::NAN),
            NLL_PENALTY
        );
    }

    #[test]
    fn tau_only_touches_the_four_low_cells() {
        assert_eq!(tau(3, 2, 1.4, 0.9, -0.1), 1.0);
        assert!((tau(1, 1, 1.4, 0.9, -0.1) - 1.1).abs() < 1e-12);
        assert!((tau(0, 0, 1.4, 0.9, -0.1) - (1.0 + 1.4 * 0.9 * 0.1)).abs() < 1e-12);
    }
}
