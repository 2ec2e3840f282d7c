use std::collections::HashMap;

use crate::dataset::MatchData;
use crate::numerics::{MAX_GOAL_RATE, MIN_JOINT_PROB, NLL_PENALTY, poisson_pmf_table, safe_exp};
use crate::validation::{inputs_are_usable, match_rates};

// Bivariate Poisson via a shared component: Home = X + Z, Away = Y + Z with
// X ~ Poisson(l1), Y ~ Poisson(l2), Z ~ Poisson(l3) independent and
// l3 = exp(correlation). The joint PMF is the finite convolution over Z.
pub fn bivariate_nll(
    data: &MatchData,
    attack: &[f64],
    defence: &[f64],
    hfa: f64,
    correlation: f64,
) -> f64 {
    if !correlation.is_finite() || !inputs_are_usable(data, attack, defence, hfa) {
        return NLL_PENALTY;
    }

    // l3 may underflow to exactly 0 as correlation -> -inf, which is the
    // independent-Poisson limit and stays valid.
    let lambda3 = safe_exp(correlation);
    if lambda3 > MAX_GOAL_RATE {
        return NLL_PENALTY;
    }

    // One shared truncation bound sized from the whole dataset.
    let bound = data.max_observed_goals() as usize + 1;
    let pmf3 = poisson_pmf_table(lambda3, bound);

    // Many matches share a team and therefore a rate, so PMF tables are
    // memoized per distinct lambda for the duration of this call only.
    let mut cache: HashMap<u64, Vec<f64>> = HashMap::new();

    let mut total = 0.0;
    for i in 0..data.n_matches() {
        let Some((lambda_home, lambda_away)) = match_rates(data, i, attack, defence, hfa) else {
            return NLL_PENALTY;
        };

        cache
            .entry(lambda_home.to_bits())
            .or_insert_with(|| poisson_pmf_table(lambda_home, bound));
        cache
            .entry(lambda_away.to_bits())
            .or_insert_with(|| poisson_pmf_table(lambda_away, bound));
        let (Some(pmf_home), Some(pmf_away)) = (
            cache.get(&lambda_home.to_bits()),
            cache.get(&lambda_away.to_bits()),
        ) else {
            return NLL_PENALTY;
        };

        let goals_home = data.goals_home[i] as usize;
        let goals_away = data.goals_away[i] as usize;
        let mut joint = 0.0;
        for k in 0..=goals_home.min(goals_away) {
            joint += pmf_home[goals_home - k] * pmf_away[goals_away - k] * pmf3[k];
        }

        total += data.weights[i] * joint.max(MIN_JOINT_PROB).ln();
    }

    -total
}
