//! Bayesian Sign and Signed-Rank Tests
//!
//! Posterior-probability estimators of which of two algorithms performs
//! better, given paired observations. Both tests sample a Dirichlet posterior
//! with a fresh `Xoshiro256PlusPlus` generator constructed from the caller's
//! seed, so identical (data, sample_size, seed) inputs reproduce bit-identical
//! output on every platform. No process-wide random state is ever used.
//!
//! - **Sign test**: each matched pair contributes one of three outcomes
//!   (first wins / tie within rope / second wins); the posterior over the
//!   outcome probabilities is Dirichlet with a symmetric pseudo-count prior.
//! - **Signed-rank test**: a Dirichlet-process posterior over the observed
//!   differences plus one pseudo-observation at zero; each Monte-Carlo draw
//!   weighs all Walsh averages `(z_i + z_j) / 2`, so posterior mass scales
//!   with the magnitude of the differences, not just their sign.

use crate::{DEFAULT_SAMPLE_SIZE, DEFAULT_TIE_TOLERANCE, StatError};
use rand::{RngCore, SeedableRng};
use rand_distr::{Distribution, Gamma};
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

/// Raw posterior draws, one `[p_less, p_equal, p_greater]` triple per draw
pub type PosteriorSamples = Vec<[f64; 3]>;

/// Configuration for the Bayesian tests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BayesianConfig {
    /// Number of Monte-Carlo draws from the posterior
    pub sample_size: usize,
    /// Seed for the per-call generator; required unless `allow_unseeded` is set
    pub seed: Option<u64>,
    /// Explicit opt-in to OS-entropy seeding (non-reproducible runs)
    pub allow_unseeded: bool,
    /// Total prior pseudo-count strength of the Dirichlet prior
    pub prior_strength: f64,
    /// Region of practical equivalence: differences within this magnitude count as ties
    pub rope: f64,
}

impl Default for BayesianConfig {
    fn default() -> Self {
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
            seed: None,
            allow_unseeded: false,
            prior_strength: 1.0,
            rope: DEFAULT_TIE_TOLERANCE,
        }
    }
}

impl BayesianConfig {
    /// Default configuration with an explicit seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }
}

/// Posterior probability triple; sums to 1 within floating tolerance
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BayesianResult {
    /// P(first algorithm's values < second's)
    pub p_less: f64,
    /// P(values practically equivalent)
    pub p_equal: f64,
    /// P(first algorithm's values > second's)
    pub p_greater: f64,
}

/// Bayesian sign test on matched value pairs `(a, b)`.
///
/// The prior adds `prior_strength / 3` pseudo-counts to each of the three
/// outcome categories. Returns the averaged probability triple and the raw
/// posterior sample matrix for downstream plotting.
pub fn bayesian_sign_test(
    pairs: &[(f64, f64)],
    config: &BayesianConfig,
) -> Result<(BayesianResult, PosteriorSamples), StatError> {
    let mut rng = make_rng("bayesian_sign", pairs.len(), config)?;

    let mut counts = [0usize; 3];
    for &(a, b) in pairs {
        let d = a - b;
        if d < -config.rope {
            counts[0] += 1;
        } else if d > config.rope {
            counts[2] += 1;
        } else {
            counts[1] += 1;
        }
    }

    let prior = config.prior_strength / 3.0;
    let shapes = [
        prior + counts[0] as f64,
        prior + counts[1] as f64,
        prior + counts[2] as f64,
    ];
    let gammas = dirichlet_components(&shapes)?;

    let mut samples = Vec::with_capacity(config.sample_size);
    for _ in 0..config.sample_size {
        let draws = [
            gammas[0].sample(&mut rng),
            gammas[1].sample(&mut rng),
            gammas[2].sample(&mut rng),
        ];
        let total = draws[0] + draws[1] + draws[2];
        samples.push([draws[0] / total, draws[1] / total, draws[2] / total]);
    }

    Ok((average_triples(&samples), samples))
}

/// Bayesian signed-rank test on matched value pairs `(a, b)`.
///
/// The Dirichlet-process posterior draws weights over one pseudo-observation
/// at zero (carrying the full `prior_strength`) plus the N observed
/// differences; each draw scores the three outcome probabilities as the
/// weight-products of all Walsh averages falling left of, inside, or right of
/// the rope. Magnitudes matter: a difference only counts toward a side when
/// its Walsh averages land there.
pub fn bayesian_signed_rank_test(
    pairs: &[(f64, f64)],
    config: &BayesianConfig,
) -> Result<(BayesianResult, PosteriorSamples), StatError> {
    let mut rng = make_rng("bayesian_signed_rank", pairs.len(), config)?;

    // z[0] is the prior pseudo-observation at zero
    let mut z = Vec::with_capacity(pairs.len() + 1);
    z.push(0.0);
    z.extend(pairs.iter().map(|&(a, b)| a - b));

    let mut shapes = vec![1.0; z.len()];
    shapes[0] = config.prior_strength;
    let gammas = dirichlet_components(&shapes)?;

    let mut weights = vec![0.0; z.len()];
    let mut samples = Vec::with_capacity(config.sample_size);
    for _ in 0..config.sample_size {
        let mut total = 0.0;
        for (w, g) in weights.iter_mut().zip(&gammas) {
            *w = g.sample(&mut rng);
            total += *w;
        }
        for w in &mut weights {
            *w /= total;
        }

        let mut triple = [0.0; 3];
        for (i, &zi) in z.iter().enumerate() {
            for (j, &zj) in z.iter().enumerate() {
                let m = (zi + zj) / 2.0;
                let w = weights[i] * weights[j];
                if m < -config.rope {
                    triple[0] += w;
                } else if m > config.rope {
                    triple[2] += w;
                } else {
                    triple[1] += w;
                }
            }
        }
        samples.push(triple);
    }

    Ok((average_triples(&samples), samples))
}

/// Validate the configuration and build the per-call generator
fn make_rng(
    test: &'static str,
    n_pairs: usize,
    config: &BayesianConfig,
) -> Result<Xoshiro256PlusPlus, StatError> {
    if n_pairs < 2 {
        return Err(StatError::InsufficientData {
            test,
            got: n_pairs,
            min: 2,
        });
    }
    if config.sample_size == 0 {
        return Err(StatError::InvalidSampleSize);
    }
    if config.prior_strength <= 0.0 {
        return Err(StatError::InvalidPriorStrength(config.prior_strength));
    }

    let seed = match (config.seed, config.allow_unseeded) {
        (Some(seed), _) => seed,
        (None, true) => rand::rngs::OsRng.next_u64(),
        (None, false) => return Err(StatError::SeedRequired),
    };

    Ok(Xoshiro256PlusPlus::seed_from_u64(seed))
}

fn dirichlet_components(shapes: &[f64]) -> Result<Vec<Gamma<f64>>, StatError> {
    shapes
        .iter()
        .map(|&s| {
            Gamma::new(s, 1.0).map_err(|_| StatError::InvalidPriorStrength(s))
        })
        .collect()
}

fn average_triples(samples: &PosteriorSamples) -> BayesianResult {
    let n = samples.len() as f64;
    let mut sums = [0.0; 3];
    for t in samples {
        sums[0] += t[0];
        sums[1] += t[1];
        sums[2] += t[2];
    }
    BayesianResult {
        p_less: sums[0] / n,
        p_equal: sums[1] / n,
        p_greater: sums[2] / n,
    }
}
