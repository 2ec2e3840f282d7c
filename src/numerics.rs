use once_cell::sync::Lazy;
use statrs::function::gamma::ln_gamma;

// Canonical penalty returned by every evaluator for invalid inputs. Large
// enough to dominate any real NLL, small enough that optimizers can add or
// scale objective values without overflowing to infinity.
pub const NLL_PENALTY: f64 = 1e15;

// No plausible expected-goals rate exceeds this.
pub const MAX_GOAL_RATE: f64 = 100.0;

// exp(710) overflows an f64; saturate instead of producing inf.
pub const MAX_EXP_ARG: f64 = 700.0;
pub const EXP_SATURATION: f64 = 1e308;

// Sentinel for log of a non-positive or non-finite value.
pub const LOG_SENTINEL: f64 = -700.0;
pub const LOG_INPUT_FLOOR: f64 = 1e-15;

// Floor applied to joint probabilities before taking their log, so a
// true-zero cell costs a large finite penalty rather than -inf.
pub const MIN_JOINT_PROB: f64 = 1e-10;

pub fn safe_exp(x: f64) -> f64 {
    if !x.is_finite() {
        if x == f64::NEG_INFINITY {
            return 0.0;
        }
        return EXP_SATURATION;
    }
    if x > MAX_EXP_ARG {
        EXP_SATURATION
    } else if x < -MAX_EXP_ARG {
        0.0
    } else {
        x.exp()
    }
}

pub fn safe_log(x: f64) -> f64 {
    if !x.is_finite() || x <= 0.0 {
        LOG_SENTINEL
    } else if x < LOG_INPUT_FLOOR {
        LOG_INPUT_FLOOR.ln()
    } else {
        x.ln()
    }
}

pub fn is_valid_probability(p: f64) -> bool {
    p.is_finite() && (0.0..=1.0).contains(&p)
}

pub fn is_valid_log_likelihood(llk: f64) -> bool {
    llk.is_finite() && llk <= 0.0 && llk >= LOG_SENTINEL
}

// Goal counts stay tiny, so ln(k!) comes from a lookup table in the hot path.
static LN_FACTORIAL: Lazy<[f64; 171]> = Lazy::new(|| {
    let mut table = [0.0_f64; 171];
    for (k, slot) in table.iter_mut().enumerate() {
        *slot = ln_gamma(k as f64 + 1.0);
    }
    table
});

pub fn ln_factorial(k: u32) -> f64 {
    match LN_FACTORIAL.get(k as usize) {
        Some(v) => *v,
        None => ln_gamma(k as f64 + 1.0),
    }
}

pub fn poisson_log_pmf(k: u32, lambda: f64) -> f64 {
    (k as f64) * safe_log(lambda) - lambda - ln_factorial(k)
}

pub fn poisson_pmf(k: u32, lambda: f64) -> f64 {
    poisson_log_pmf(k, lambda).exp()
}

// Dense PMF vector for k = 0..len, built by the usual recurrence. No tail
// mass is folded back in: convolution models need the raw cell values.
pub fn poisson_pmf_table(lambda: f64, len: usize) -> Vec<f64> {
    let mut out = vec![0.0; len];
    if len == 0 {
        return out;
    }
    let lambda = lambda.max(0.0);
    out[0] = (-lambda).exp();
    for k in 1..len {
        out[k] = out[k - 1] * lambda / k as f64;
    }
    out
}
