//! Per-shot variation of physical quantities around a configured mean.
//!
//! A [`Variation`] turns a mean value into one sample per call according to its
//! [`VariationMode`]. `None` and `Range` are deterministic; the remaining modes draw from a
//! distribution using the RNG passed by the caller.
use std::str::FromStr;

use rand::Rng as RngCore;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub mod positive;

pub use positive::{sample_positive, sample_positive_count, MAX_POSITIVE_DRAWS};

/// Above this mean, Poisson draws use a normal approximation.
const POISSON_NORMAL_THRESHOLD: f64 = 30.0;

/// Rule for sampling a quantity around its mean.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VariationMode {
    /// Always the mean.
    #[default]
    None,
    /// Uniform in `[mean - spread / 2, mean + spread / 2)`.
    Uniform,
    /// Normal with standard deviation `spread`.
    Normal,
    /// Poisson with expectation `mean`.
    Poisson,
    /// Normal with standard deviation `spread` around a Poisson draw.
    NormalPoisson,
    /// Deterministic sweep over `n` equally spaced values spanning `spread`.
    Range,
}

impl VariationMode {
    /// Whether the mode draws from a distribution.
    pub fn is_random(self) -> bool {
        !matches!(self, VariationMode::None | VariationMode::Range)
    }

    fn needs_spread(self) -> bool {
        matches!(
            self,
            VariationMode::Uniform
                | VariationMode::Normal
                | VariationMode::NormalPoisson
                | VariationMode::Range
        )
    }
}

impl FromStr for VariationMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "none" => Ok(VariationMode::None),
            "uniform" => Ok(VariationMode::Uniform),
            "normal" => Ok(VariationMode::Normal),
            "poisson" => Ok(VariationMode::Poisson),
            "normal_poisson" => Ok(VariationMode::NormalPoisson),
            "range" => Ok(VariationMode::Range),
            other => Err(Error::InvalidConfig(format!(
                "'{other}' is not a valid variation mode"
            ))),
        }
    }
}

/// Configuration of a [`Variation`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VariationConfig {
    pub mode: VariationMode,
    /// Width parameter; required by every mode except `None` and `Poisson`.
    pub spread: Option<f64>,
    /// Number of steps; required by `Range`.
    pub n: Option<usize>,
}

impl VariationConfig {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn uniform(spread: f64) -> Self {
        Self {
            mode: VariationMode::Uniform,
            spread: Some(spread),
            n: None,
        }
    }

    pub fn normal(spread: f64) -> Self {
        Self {
            mode: VariationMode::Normal,
            spread: Some(spread),
            n: None,
        }
    }

    pub fn poisson() -> Self {
        Self {
            mode: VariationMode::Poisson,
            spread: None,
            n: None,
        }
    }

    pub fn normal_poisson(spread: f64) -> Self {
        Self {
            mode: VariationMode::NormalPoisson,
            spread: Some(spread),
            n: None,
        }
    }

    pub fn range(spread: f64, n: usize) -> Self {
        Self {
            mode: VariationMode::Range,
            spread: Some(spread),
            n: Some(n),
        }
    }

    /// Validates the configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.mode.needs_spread() {
            match self.spread {
                Some(s) if s.is_finite() && s >= 0.0 => {}
                Some(s) => {
                    return Err(Error::InvalidConfig(format!(
                        "variation spread must be finite and >= 0, got {s}"
                    )))
                }
                None => {
                    return Err(Error::InvalidConfig(format!(
                        "variation mode {:?} requires a spread",
                        self.mode
                    )))
                }
            }
        }
        if self.mode == VariationMode::Range && !matches!(self.n, Some(n) if n >= 1) {
            return Err(Error::InvalidConfig(
                "range variation requires n >= 1".into(),
            ));
        }
        Ok(())
    }
}

/// Stateful sampler for one varied quantity.
#[derive(Clone, Debug)]
pub struct Variation {
    config: VariationConfig,
    step: usize,
}

impl Variation {
    /// Creates a variation from a validated configuration.
    pub fn new(config: VariationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, step: 0 })
    }

    /// A variation that always returns the mean.
    pub fn none() -> Self {
        Self {
            config: VariationConfig::none(),
            step: 0,
        }
    }

    pub fn mode(&self) -> VariationMode {
        self.config.mode
    }

    pub fn config(&self) -> &VariationConfig {
        &self.config
    }

    pub fn is_random(&self) -> bool {
        self.config.mode.is_random()
    }

    /// Draws the next value around `mean`.
    pub fn sample(&mut self, mean: f64, rng: &mut dyn RngCore) -> f64 {
        let spread = self.config.spread.unwrap_or(0.0);
        match self.config.mode {
            VariationMode::None => mean,
            VariationMode::Uniform => mean + (rand01(rng) - 0.5) * spread,
            VariationMode::Normal => mean + spread * standard_normal(rng),
            VariationMode::Poisson => poisson(mean, rng),
            VariationMode::NormalPoisson => poisson(mean, rng) + spread * standard_normal(rng),
            VariationMode::Range => {
                let n = self.config.n.unwrap_or(1).max(1);
                let i = self.step % n;
                self.step = self.step.wrapping_add(1);
                let start = mean - spread / 2.0;
                if n == 1 {
                    start
                } else {
                    start + spread * (i as f64) / ((n - 1) as f64)
                }
            }
        }
    }
}

impl Default for Variation {
    fn default() -> Self {
        Self::none()
    }
}

/// Generate a random float in the range [0, 1) with 53 bits of precision.
#[inline]
pub(crate) fn rand01(rng: &mut dyn RngCore) -> f64 {
    (rng.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
}

/// One standard normal deviate via Box–Muller.
pub(crate) fn standard_normal(rng: &mut dyn RngCore) -> f64 {
    let u1 = (1.0 - rand01(rng)).clamp(f64::MIN_POSITIVE, 1.0);
    let u2 = rand01(rng);
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

fn poisson(lambda: f64, rng: &mut dyn RngCore) -> f64 {
    if !lambda.is_finite() || lambda <= 0.0 {
        return 0.0;
    }
    if lambda > POISSON_NORMAL_THRESHOLD {
        return (lambda + lambda.sqrt() * standard_normal(rng))
            .round()
            .max(0.0);
    }

    let l = (-lambda).exp();
    let mut k: u32 = 0;
    let mut p: f64 = 1.0;
    loop {
        k += 1;
        p *= rand01(rng);
        if p <= l {
            return (k - 1) as f64;
        }
    }
}
