use crate::dataset::MatchData;
use crate::numerics::{
    NLL_PENALTY, is_valid_log_likelihood, is_valid_probability, poisson_log_pmf, safe_log,
};
use crate::validation::{inputs_are_usable, match_rates};

// Mixture of a structural zero (probability `zero_inflation`) and a
// Poisson draw. Observed zeros can come from either component.
pub(crate) fn zip_log_pmf(k: u32, lambda: f64, zero_inflation: f64) -> f64 {
    if k == 0 {
        safe_log(zero_inflation + (1.0 - zero_inflation) * (-lambda).exp())
    } else {
        safe_log(1.0 - zero_inflation) + poisson_log_pmf(k, lambda)
    }
}

pub fn zero_inflated_nll(
    data: &MatchData,
    attack: &[f64],
    defence: &[f64],
    hfa: f64,
    zero_inflation: f64,
) -> f64 {
    if !is_valid_probability(zero_inflation) || !inputs_are_usable(data, attack, defence, hfa) {
        return NLL_PENALTY;
    }

    let mut total = 0.0;
    for i in 0..data.n_matches() {
        let Some((lambda_home, lambda_away)) = match_rates(data, i, attack, defence, hfa) else {
            return NLL_PENALTY;
        };

        let llk_home = zip_log_pmf(data.goals_home[i], lambda_home, zero_inflation);
        let llk_away = zip_log_pmf(data.goals_away[i], lambda_away, zero_inflation);
        if !is_valid_log_likelihood(llk_home) || !is_valid_log_likelihood(llk_away) {
            return NLL_PENALTY;
        }

        total += data.weights[i] * (llk_home + llk_away);
    }

    -total
}
