use statrs::function::gamma::ln_gamma;

use crate::dataset::MatchData;
use crate::numerics::{MIN_JOINT_PROB, NLL_PENALTY, ln_factorial, safe_exp, safe_log};
use crate::validation::{inputs_are_usable, match_rates};

// Extra alternating-series terms kept beyond the largest count. The series
// for P(X = x) runs over j >= x; this tail is where it converges for the
// rate range the plausibility gate admits.
const SERIES_TAIL: usize = 25;

// Alpha coefficients for the discretized Weibull count PMF (McShane et al.):
//   alpha[0][j]   = Gamma(c*j + 1) / Gamma(j + 1)
//   alpha[x+1][j] = sum_{m=x}^{j-1} alpha[x][m] * Gamma(c*(j-m) + 1) / Gamma(j-m+1)
// Shape-dependent only, so one table per call covers every fixture. Returns
// None if any entry leaves the finite range.
fn alpha_table(shape: f64, max_count: usize) -> Option<Vec<Vec<f64>>> {
    let terms = max_count + 1 + SERIES_TAIL;
    let mut table = vec![vec![0.0_f64; terms]; max_count + 1];

    for j in 0..terms {
        table[0][j] = (ln_gamma(shape * j as f64 + 1.0) - ln_factorial(j as u32)).exp();
    }
    for x in 0..max_count {
        for j in (x + 1)..terms {
            let mut acc = 0.0;
            for m in x..j {
                let gap = (j - m) as f64;
                acc += table[x][m]
                    * (ln_gamma(shape * gap + 1.0) - ln_factorial((j - m) as u32)).exp();
            }
            table[x + 1][j] = acc;
        }
    }

    if table.iter().flatten().any(|v| !v.is_finite()) {
        return None;
    }
    Some(table)
}

// Truncated count PMF for one side. Cancellation in the alternating series
// can leave tiny negative residues; those are clamped and the vector is
// renormalized so the prefix-sum CDF ends at exactly 1.
fn weibull_count_pmf(lambda: f64, shape: f64, alpha: &[Vec<f64>]) -> Option<Vec<f64>> {
    let terms = alpha[0].len();
    let log_lambda = safe_log(lambda);

    let mut pmf = Vec::with_capacity(alpha.len());
    for (x, row) in alpha.iter().enumerate() {
        let mut p = 0.0;
        for j in x..terms {
            let magnitude =
                (j as f64 * log_lambda - ln_gamma(shape * j as f64 + 1.0)).exp() * row[j];
            if (x + j) % 2 == 0 {
                p += magnitude;
            } else {
                p -= magnitude;
            }
        }
        if !p.is_finite() {
            return None;
        }
        pmf.push(p.max(0.0));
    }

    let total: f64 = pmf.iter().sum();
    if !total.is_finite() || total <= 0.0 {
        return None;
    }
    for p in &mut pmf {
        *p /= total;
    }
    Some(pmf)
}

fn prefix_cdf(pmf: &[f64]) -> Vec<f64> {
    let mut running = 0.0;
    pmf.iter()
        .map(|p| {
            running += p;
            running.min(1.0)
        })
        .collect()
}

// Frank copula. kappa near zero is the independence limit.
fn frank_copula(u: f64, v: f64, kappa: f64) -> f64 {
    if kappa.abs() < 1e-8 {
        return u * v;
    }
    let num = (safe_exp(-kappa * u) - 1.0) * (safe_exp(-kappa * v) - 1.0);
    let den = safe_exp(-kappa) - 1.0;
    -safe_log(1.0 + num / den) / kappa
}

// P(X = x, Y = y) as the copula measure of the unit rectangle spanned by
// the two marginal CDF steps.
pub(crate) fn copula_cell(
    cdf_home: &[f64],
    cdf_away: &[f64],
    x: usize,
    y: usize,
    kappa: f64,
) -> f64 {
    let u_lo = if x == 0 { 0.0 } else { cdf_home[x - 1] };
    let u_hi = cdf_home[x];
    let v_lo = if y == 0 { 0.0 } else { cdf_away[y - 1] };
    let v_hi = cdf_away[y];

    frank_copula(u_hi, v_hi, kappa) - frank_copula(u_lo, v_hi, kappa)
        - frank_copula(u_hi, v_lo, kappa)
        + frank_copula(u_lo, v_lo, kappa)
}

// Marginal count CDFs for one fixture, shared with the prediction grid.
pub(crate) fn marginal_cdfs(
    lambda_home: f64,
    lambda_away: f64,
    shape: f64,
    max_goals: usize,
) -> Option<(Vec<f64>, Vec<f64>)> {
    if !shape.is_finite() || shape <= 0.0 {
        return None;
    }
    let alpha = alpha_table(shape, max_goals)?;
    let pmf_home = weibull_count_pmf(lambda_home, shape, &alpha)?;
    let pmf_away = weibull_count_pmf(lambda_away, shape, &alpha)?;
    Some((prefix_cdf(&pmf_home), prefix_cdf(&pmf_away)))
}

pub fn weibull_copula_nll(
    data: &MatchData,
    attack: &[f64],
    defence: &[f64],
    hfa: f64,
    shape: f64,
    kappa: f64,
    max_goals: usize,
) -> f64 {
    if !shape.is_finite() || shape <= 0.0 || !kappa.is_finite() {
        return NLL_PENALTY;
    }
    if !inputs_are_usable(data, attack, defence, hfa) {
        return NLL_PENALTY;
    }

    // The truncation bound must cover every observed score.
    let max_count = max_goals.max(data.max_observed_goals() as usize);
    let Some(alpha) = alpha_table(shape, max_count) else {
        return NLL_PENALTY;
    };

    let mut total = 0.0;
    for i in 0..data.n_matches() {
        let Some((lambda_home, lambda_away)) = match_rates(data, i, attack, defence, hfa) else {
            return NLL_PENALTY;
        };

        let Some(pmf_home) = weibull_count_pmf(lambda_home, shape, &alpha) else {
            return NLL_PENALTY;
        };
        let Some(pmf_away) = weibull_count_pmf(lambda_away, shape, &alpha) else {
            return NLL_PENALTY;
        };
        let cdf_home = prefix_cdf(&pmf_home);
        let cdf_away = prefix_cdf(&pmf_away);

        let joint = copula_cell(
            &cdf_home,
            &cdf_away,
            data.goals_home[i] as usize,
            data.goals_away[i] as usize,
            kappa,
        );
        total += data.weights[i] * joint.max(MIN_JOINT_PROB).ln();
    }

    -total
}
