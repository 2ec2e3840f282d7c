use statrs::function::gamma::ln_gamma;

use crate::dataset::MatchData;
use crate::numerics::{NLL_PENALTY, is_valid_log_likelihood, ln_factorial, safe_log};
use crate::validation::{inputs_are_usable, match_rates};

// Below this the success probability degenerates and the PMF loses meaning.
const MIN_DISPERSION: f64 = 1e-5;

// NB(r, p) with r = dispersion and p = r / (r + lambda), so the mean stays
// at lambda while the variance grows to lambda * (1 + lambda / r).
pub(crate) fn nb_log_pmf(k: u32, dispersion: f64, p: f64) -> f64 {
    ln_gamma(k as f64 + dispersion) - ln_gamma(dispersion) - ln_factorial(k)
        + dispersion * safe_log(p)
        + (k as f64) * safe_log(1.0 - p)
}

pub fn negative_binomial_nll(
    data: &MatchData,
    attack: &[f64],
    defence: &[f64],
    hfa: f64,
    dispersion: f64,
) -> f64 {
    if !dispersion.is_finite() || !inputs_are_usable(data, attack, defence, hfa) {
        return NLL_PENALTY;
    }
    let dispersion = dispersion.max(MIN_DISPERSION);

    let mut total = 0.0;
    for i in 0..data.n_matches() {
        let Some((lambda_home, lambda_away)) = match_rates(data, i, attack, defence, hfa) else {
            return NLL_PENALTY;
        };

        let p_home = dispersion / (dispersion + lambda_home);
        let p_away = dispersion / (dispersion + lambda_away);
        let llk_home = nb_log_pmf(data.goals_home[i], dispersion, p_home);
        let llk_away = nb_log_pmf(data.goals_away[i], dispersion, p_away);
        if !is_valid_log_likelihood(llk_home) || !is_valid_log_likelihood(llk_away) {
            return NLL_PENALTY;
        }

        total += data.weights[i] * (llk_home + llk_away);
    }

    -total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::MatchData;
    use crate::numerics::poisson_log_pmf;
    use crate::poisson::poisson_nll;

    #[test]
    fn nb_pmf_sums_to_one() {
        let (dispersion, lambda) = (1.7, 1.35);
        let p = dispersion / (dispersion + lambda);
        let total: f64 = (0..400).map(|k| nb_log_pmf(k, dispersion, p).exp()).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn large_dispersion_approaches_poisson_pmf() {
        let (dispersion, lambda) = (1e6, 1.35);
        let p = dispersion / (dispersion + lambda);
        for k in 0..6 {
            let nb = nb_log_pmf(k, dispersion, p);
            let pois = poisson_log_pmf(k, lambda);
            assert!((nb - pois).abs() < 1e-4, "k={k} nb={nb} pois={pois}");
        }
    }

    #[test]
    fn large_dispersion_nll_matches_poisson_nll() {
        let data = MatchData::from_results(
            &["A", "B", "C"],
            &["B", "C", "A"],
            &[2, 1, 0],
            &[1, 1, 3],
            None,
        )
        .unwrap();
        let attack = [0.1, -0.05, -0.05];
        let defence = [0.0, 0.02, -0.02];
        let nb = negative_binomial_nll(&data, &attack, &defence, 0.2, 1e6);
        let pois = poisson_nll(&data, &attack, &defence, 0.2);
        assert!((nb - pois).abs() / pois.abs() < 1e-3);
    }

    #[test]
    fn dispersion_is_floored_not_rejected() {
        let data = MatchData::from_results(&["A"], &["B"], &[1], &[0], None).unwrap();
        let floored = negative_binomial_nll(&data, &[0.0, 0.0], &[0.0, 0.0], 0.1, 0.0);
        let at_floor = negative_binomial_nll(&data, &[0.0, 0.0], &[0.0, 0.0], 0.1, MIN_DISPERSION);
        assert!(floored.is_finite());
        assert!((floored - at_floor).abs() < 1e-12);
    }
}
