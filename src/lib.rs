pub mod artifact;
pub mod bivariate;
pub mod dataset;
pub mod dixon_coles;
pub mod grid;
pub mod model;
pub mod negative_binomial;
pub mod numerics;
pub mod poisson;
mod validation;
pub mod weibull_copula;
pub mod zero_inflated;

pub use artifact::RatingsArtifact;
pub use bivariate::bivariate_nll;
pub use dataset::{MatchData, exponential_decay_weights};
pub use dixon_coles::dixon_coles_nll;
pub use grid::{Prob3, ScoreGrid};
pub use model::ModelKind;
pub use negative_binomial::negative_binomial_nll;
pub use numerics::NLL_PENALTY;
pub use poisson::poisson_nll;
pub use weibull_copula::weibull_copula_nll;
pub use zero_inflated::zero_inflated_nll;
