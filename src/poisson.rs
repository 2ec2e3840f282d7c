use crate::dataset::MatchData;
use crate::numerics::{NLL_PENALTY, is_valid_log_likelihood, poisson_log_pmf};
use crate::validation::{inputs_are_usable, match_rates};

// Independent-Poisson goals model: each side's score is Poisson with a
// log-linear rate in attack, defence and home advantage.
pub fn poisson_nll(data: &MatchData, attack: &[f64], defence: &[f64], hfa: f64) -> f64 {
    if !inputs_are_usable(data, attack, defence, hfa) {
        return NLL_PENALTY;
    }

    let mut total = 0.0;
    for i in 0..data.n_matches() {
        let Some((lambda_home, lambda_away)) = match_rates(data, i, attack, defence, hfa) else {
            return NLL_PENALTY;
        };

        let llk_home = poisson_log_pmf(data.goals_home[i], lambda_home);
        let llk_away = poisson_log_pmf(data.goals_away[i], lambda_away);
        if !is_valid_log_likelihood(llk_home) || !is_valid_log_likelihood(llk_away) {
            return NLL_PENALTY;
        }

        total += data.weights[i] * (llk_home + llk_away);
    }

    -total
}
