//! Drawing strictly positive quantities (diameters, flattenings, particle counts).
//!
//! Deterministic variations that produce a non-positive value are a configuration error.
//! Random variations are redrawn, at most [`MAX_POSITIVE_DRAWS`] times.
use rand::Rng as RngCore;
use tracing::{debug, error};

use crate::error::{Error, Result};
use crate::variation::Variation;

/// Upper bound on draws spent looking for a positive value from a random variation.
pub const MAX_POSITIVE_DRAWS: usize = 1000;

/// Draw a strictly positive value of `quantity` around `mean`.
pub fn sample_positive(
    variation: &mut Variation,
    mean: f64,
    quantity: &str,
    rng: &mut dyn RngCore,
) -> Result<f64> {
    draw_until_positive(variation, mean, quantity, rng, |v| v)
}

/// Draw a strictly positive count of `quantity` around `mean`, rounding each draw to the
/// nearest integer before the positivity check.
pub fn sample_positive_count(
    variation: &mut Variation,
    mean: f64,
    quantity: &str,
    rng: &mut dyn RngCore,
) -> Result<usize> {
    draw_until_positive(variation, mean, quantity, rng, f64::round).map(|v| v as usize)
}

fn draw_until_positive(
    variation: &mut Variation,
    mean: f64,
    quantity: &str,
    rng: &mut dyn RngCore,
    convert: impl Fn(f64) -> f64,
) -> Result<f64> {
    if !variation.is_random() {
        let value = convert(variation.sample(mean, rng));
        if value > 0.0 {
            return Ok(value);
        }
        error!("{} smaller-equals zero ({}).", quantity, value);
        return Err(Error::NonPositive {
            quantity: quantity.to_owned(),
            value,
        });
    }

    for attempt in 1..=MAX_POSITIVE_DRAWS {
        let value = convert(variation.sample(mean, rng));
        // Also rejects NaN.
        if value > 0.0 {
            return Ok(value);
        }
        debug!(
            "{} smaller-equals zero ({}), drawing again (attempt {}).",
            quantity, value, attempt
        );
    }

    Err(Error::SamplingExhausted {
        quantity: quantity.to_owned(),
        attempts: MAX_POSITIVE_DRAWS,
    })
}
