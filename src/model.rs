use rayon::prelude::*;

use crate::bivariate::bivariate_nll;
use crate::dataset::MatchData;
use crate::dixon_coles::dixon_coles_nll;
use crate::negative_binomial::negative_binomial_nll;
use crate::numerics::NLL_PENALTY;
use crate::poisson::poisson_nll;
use crate::weibull_copula::weibull_copula_nll;
use crate::zero_inflated::zero_inflated_nll;

// Uniform call-site over the six evaluators. An optimizer probes one flat
// vector laid out as [attack(t) | defence(t) | hfa | model scalars...].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ModelKind {
    Poisson,
    DixonColes,
    NegativeBinomial,
    ZeroInflated,
    Bivariate,
    WeibullCopula { max_goals: usize },
}

impl ModelKind {
    pub fn scalar_names(&self) -> &'static [&'static str] {
        match self {
            ModelKind::Poisson => &[],
            ModelKind::DixonColes => &["rho"],
            ModelKind::NegativeBinomial => &["dispersion"],
            ModelKind::ZeroInflated => &["zero_inflation"],
            ModelKind::Bivariate => &["correlation"],
            ModelKind::WeibullCopula { .. } => &["shape", "kappa"],
        }
    }

    pub fn scalar_count(&self) -> usize {
        self.scalar_names().len()
    }

    pub fn param_len(&self, n_teams: usize) -> usize {
        2 * n_teams + 1 + self.scalar_count()
    }

    // Reasonable optimizer starting point: flat strengths, a small home
    // edge, and neutral model scalars.
    pub fn default_params(&self, n_teams: usize) -> Vec<f64> {
        let mut params = vec![0.0; 2 * n_teams];
        params.push(0.25);
        match self {
            ModelKind::Poisson => {}
            ModelKind::DixonColes => params.push(-0.1),
            ModelKind::NegativeBinomial => params.push(1.0),
            ModelKind::ZeroInflated => params.push(0.05),
            ModelKind::Bivariate => params.push(-2.3),
            ModelKind::WeibullCopula { .. } => params.extend([1.0, 0.0]),
        }
        params
    }

    pub fn nll(&self, data: &MatchData, params: &[f64]) -> f64 {
        let t = data.n_teams();
        if params.len() != self.param_len(t) {
            return NLL_PENALTY;
        }

        let (attack, rest) = params.split_at(t);
        let (defence, rest) = rest.split_at(t);
        let hfa = rest[0];
        let scalars = &rest[1..];

        match self {
            ModelKind::Poisson => poisson_nll(data, attack, defence, hfa),
            ModelKind::DixonColes => dixon_coles_nll(data, attack, defence, hfa, scalars[0]),
            ModelKind::NegativeBinomial => {
                negative_binomial_nll(data, attack, defence, hfa, scalars[0])
            }
            ModelKind::ZeroInflated => zero_inflated_nll(data, attack, defence, hfa, scalars[0]),
            ModelKind::Bivariate => bivariate_nll(data, attack, defence, hfa, scalars[0]),
            ModelKind::WeibullCopula { max_goals } => {
                weibull_copula_nll(data, attack, defence, hfa, scalars[0], scalars[1], *max_goals)
            }
        }
    }

    // Price a whole population of candidate vectors. Evaluations are pure,
    // so they fan out across threads with no shared state.
    pub fn evaluate_population(&self, data: &MatchData, candidates: &[Vec<f64>]) -> Vec<f64> {
        candidates
            .par_iter()
            .map(|params| self.nll(data, params))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::MatchData;

    fn season() -> MatchData {
        MatchData::from_results(
            &["A", "B", "C"],
            &["B", "C", "A"],
            &[2, 1, 0],
            &[1, 1, 2],
            None,
        )
        .unwrap()
    }

    #[test]
    fn packed_layout_round_trips_through_dispatch() {
        let data = season();
        let mut params = vec![0.1, -0.05, -0.05, 0.0, 0.02, -0.02, 0.2];
        let direct = crate::poisson::poisson_nll(
            &data,
            &params[0..3],
            &params[3..6],
            params[6],
        );
        assert_eq!(ModelKind::Poisson.nll(&data, &params), direct);

        params.push(-0.08);
        let dc_direct = crate::dixon_coles::dixon_coles_nll(
            &data,
            &[0.1, -0.05, -0.05],
            &[0.0, 0.02, -0.02],
            0.2,
            -0.08,
        );
        assert_eq!(ModelKind::DixonColes.nll(&data, &params), dc_direct);
    }

    #[test]
    fn wrong_length_vector_returns_penalty() {
        let data = season();
        assert_eq!(ModelKind::Poisson.nll(&data, &[0.0; 6]), NLL_PENALTY);
        assert_eq!(ModelKind::DixonColes.nll(&data, &[0.0; 7]), NLL_PENALTY);
    }

    #[test]
    fn default_params_are_finite_for_every_model() {
        let data = season();
        let kinds = [
            ModelKind::Poisson,
            ModelKind::DixonColes,
            ModelKind::NegativeBinomial,
            ModelKind::ZeroInflated,
            ModelKind::Bivariate,
            ModelKind::WeibullCopula { max_goals: 15 },
        ];
        for kind in kinds {
            let params = kind.default_params(data.n_teams());
            assert_eq!(params.len(), kind.param_len(data.n_teams()));
            let nll = kind.nll(&data, &params);
            assert!(nll.is_finite() && nll < NLL_PENALTY, "{kind:?} nll={nll}");
        }
    }

    #[test]
    fn population_results_line_up_with_serial_calls() {
        let data = season();
        let kind = ModelKind::DixonColes;
        let candidates: Vec<Vec<f64>> = (0..8)
            .map(|i| {
                let mut p = kind.default_params(data.n_teams());
                p[6] = 0.05 * i as f64;
                p
            })
            .collect();
        let parallel = kind.evaluate_population(&data, &candidates);
        for (params, got) in candidates.iter().zip(&parallel) {
            assert_eq!(*got, kind.nll(&data, params));
        }
    }
}
