use crate::dixon_coles::tau;
use crate::negative_binomial::nb_log_pmf;
use crate::numerics::poisson_pmf_table;
use crate::weibull_copula;
use crate::zero_inflated::zip_log_pmf;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prob3 {
    pub home: f64,
    pub draw: f64,
    pub away: f64,
}

// Truncated home x away scoreline distribution for a single fixture,
// normalized so the grid is a proper distribution over 0..=max_goals.
#[derive(Debug, Clone)]
pub struct ScoreGrid {
    matrix: Vec<Vec<f64>>,
}

impl ScoreGrid {
    fn from_matrix(mut matrix: Vec<Vec<f64>>) -> Self {
        let mut total = 0.0;
        for row in &mut matrix {
            for cell in row.iter_mut() {
                *cell = cell.max(0.0);
                total += *cell;
            }
        }
        if total > 0.0 {
            for row in &mut matrix {
                for cell in row.iter_mut() {
                    *cell /= total;
                }
            }
        }
        Self { matrix }
    }

    pub fn from_poisson(lambda_home: f64, lambda_away: f64, max_goals: usize) -> Self {
        Self::from_dixon_coles(lambda_home, lambda_away, 0.0, max_goals)
    }

    pub fn from_dixon_coles(
        lambda_home: f64,
        lambda_away: f64,
        rho: f64,
        max_goals: usize,
    ) -> Self {
        let pmf_home = poisson_pmf_table(lambda_home, max_goals + 1);
        let pmf_away = poisson_pmf_table(lambda_away, max_goals + 1);
        let matrix = (0..=max_goals)
            .map(|h| {
                (0..=max_goals)
                    .map(|a| {
                        pmf_home[h]
                            * pmf_away[a]
                            * tau(h as u32, a as u32, lambda_home, lambda_away, rho)
                    })
                    .collect()
            })
            .collect();
        Self::from_matrix(matrix)
    }

    pub fn from_negative_binomial(
        lambda_home: f64,
        lambda_away: f64,
        dispersion: f64,
        max_goals: usize,
    ) -> Self {
        let p_home = dispersion / (dispersion + lambda_home);
        let p_away = dispersion / (dispersion + lambda_away);
        let pmf_home: Vec<f64> = (0..=max_goals)
            .map(|k| nb_log_pmf(k as u32, dispersion, p_home).exp())
            .collect();
        let pmf_away: Vec<f64> = (0..=max_goals)
            .map(|k| nb_log_pmf(k as u32, dispersion, p_away).exp())
            .collect();
        Self::from_independent(&pmf_home, &pmf_away)
    }

    pub fn from_zero_inflated(
        lambda_home: f64,
        lambda_away: f64,
        zero_inflation: f64,
        max_goals: usize,
    ) -> Self {
        let pmf_home: Vec<f64> = (0..=max_goals)
            .map(|k| zip_log_pmf(k as u32, lambda_home, zero_inflation).exp())
            .collect();
        let pmf_away: Vec<f64> = (0..=max_goals)
            .map(|k| zip_log_pmf(k as u32, lambda_away, zero_inflation).exp())
            .collect();
        Self::from_independent(&pmf_home, &pmf_away)
    }

    pub fn from_bivariate(
        lambda_home: f64,
        lambda_away: f64,
        lambda_shared: f64,
        max_goals: usize,
    ) -> Self {
        let pmf_home = poisson_pmf_table(lambda_home, max_goals + 1);
        let pmf_away = poisson_pmf_table(lambda_away, max_goals + 1);
        let pmf_shared = poisson_pmf_table(lambda_shared.max(0.0), max_goals + 1);
        let matrix = (0..=max_goals)
            .map(|h| {
                (0..=max_goals)
                    .map(|a| {
                        (0..=h.min(a))
                            .map(|k| pmf_home[h - k] * pmf_away[a - k] * pmf_shared[k])
                            .sum()
                    })
                    .collect()
            })
            .collect();
        Self::from_matrix(matrix)
    }

    // None when the alpha table for this shape is numerically unusable.
    pub fn from_weibull_copula(
        lambda_home: f64,
        lambda_away: f64,
        shape: f64,
        kappa: f64,
        max_goals: usize,
    ) -> Option<Self> {
        let (cdf_home, cdf_away) =
            weibull_copula::marginal_cdfs(lambda_home, lambda_away, shape, max_goals)?;
        let matrix = (0..=max_goals)
            .map(|h| {
                (0..=max_goals)
                    .map(|a| weibull_copula::copula_cell(&cdf_home, &cdf_away, h, a, kappa))
                    .collect()
            })
            .collect();
        Some(Self::from_matrix(matrix))
    }

    fn from_independent(pmf_home: &[f64], pmf_away: &[f64]) -> Self {
        let matrix = pmf_home
            .iter()
            .map(|ph| pmf_away.iter().map(|pa| ph * pa).collect())
            .collect();
        Self::from_matrix(matrix)
    }

    pub fn max_goals(&self) -> usize {
        self.matrix.len().saturating_sub(1)
    }

    pub fn prob(&self, goals_home: usize, goals_away: usize) -> f64 {
        self.matrix
            .get(goals_home)
            .and_then(|row| row.get(goals_away))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn home_draw_away(&self) -> Prob3 {
        let mut out = Prob3 {
            home: 0.0,
            draw: 0.0,
            away: 0.0,
        };
        for (h, row) in self.matrix.iter().enumerate() {
            for (a, p) in row.iter().enumerate() {
                if h > a {
                    out.home += p;
                } else if h < a {
                    out.away += p;
                } else {
                    out.draw += p;
                }
            }
        }
        out
    }

    // P(total goals > line). Use half-goal lines to avoid pushes.
    pub fn total_goals_over(&self, line: f64) -> f64 {
        self.sum_cells(|h, a| (h + a) as f64 > line)
    }

    pub fn total_goals_under(&self, line: f64) -> f64 {
        self.sum_cells(|h, a| ((h + a) as f64) < line)
    }

    // P(home beats the handicap), i.e. home margin strictly above `line`.
    pub fn asian_handicap_home(&self, line: f64) -> f64 {
        self.sum_cells(|h, a| (h as f64 - a as f64) > line)
    }

    pub fn asian_handicap_away(&self, line: f64) -> f64 {
        self.sum_cells(|h, a| (a as f64 - h as f64) > line)
    }

    pub fn both_teams_to_score(&self) -> f64 {
        self.sum_cells(|h, a| h > 0 && a > 0)
    }

    fn sum_cells<F: Fn(usize, usize) -> bool>(&self, keep: F) -> f64 {
        let mut total = 0.0;
        for (h, row) in self.matrix.iter().enumerate() {
            for (a, p) in row.iter().enumerate() {
                if keep(h, a) {
                    total += p;
                }
            }
        }
        total
    }
}
