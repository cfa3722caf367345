//! Self-paced learning sample weights
//!
//! An example's weight is a decreasing function of its loss, cut off at the
//! age parameter `lam`. Growing `lam` every epoch lets harder examples in.

use crate::error::{ConfigError, Result};
use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Factor applied to `lam` by [`SplRegularizer::tighten`]
pub const SPL_GROWTH: f32 = 1.3;

/// Weighting function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplVariant {
    /// 0/1 weights
    Hard,
    /// Weights fall linearly to 0 at `lam`
    Linear,
    /// Hard below a lower cut, inverse-sqrt in between, 0 above `lam^2`
    Mixture,
}

impl SplVariant {
    /// Canonical name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hard => "hard",
            Self::Linear => "linear",
            Self::Mixture => "mixture",
        }
    }
}

impl FromStr for SplVariant {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "hard" => Ok(Self::Hard),
            "linear" => Ok(Self::Linear),
            "mixture" => Ok(Self::Mixture),
            other => Err(ConfigError::InvalidRegularizerName(other.to_string())),
        }
    }
}

impl fmt::Display for SplVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Self-paced regularizer state
///
/// # Example
///
/// ```
/// use escalera::curriculum::{SplRegularizer, SplVariant};
/// use ndarray::array;
///
/// let spl = SplRegularizer::new(SplVariant::Hard, 0.3).unwrap();
/// let w = spl.weights(array![0.1f32, 0.5].view());
/// assert_eq!(w, array![1.0f32, 0.0]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplRegularizer {
    variant: SplVariant,
    lam: f32,
    gam: Option<f32>,
}

impl SplRegularizer {
    /// Hard or linear regularizer (mixture also needs `gam`, see [`Self::mixture`])
    pub fn new(variant: SplVariant, lam: f32) -> Result<Self> {
        Self::build(variant, lam, None)
    }

    /// Mixture regularizer
    pub fn mixture(lam: f32, gam: f32) -> Result<Self> {
        Self::build(SplVariant::Mixture, lam, Some(gam))
    }

    /// Regularizer from its name (`hard`, `linear`, `mixture`)
    pub fn from_name(name: &str, lam: f32, gam: Option<f32>) -> Result<Self> {
        Self::build(name.parse()?, lam, gam)
    }

    fn build(variant: SplVariant, lam: f32, gam: Option<f32>) -> Result<Self> {
        if lam.is_nan() || lam <= 0.0 {
            return Err(ConfigError::InvalidHyperparameter {
                name: "lam",
                value: lam,
                reason: "must be > 0",
            }
            .into());
        }
        if variant == SplVariant::Mixture {
            match gam {
                None => return Err(ConfigError::MissingHyperparameter("gam".to_string()).into()),
                Some(g) if g.is_nan() || g <= 0.0 => {
                    return Err(ConfigError::InvalidHyperparameter {
                        name: "gam",
                        value: g,
                        reason: "must be > 0",
                    }
                    .into())
                }
                Some(_) => {}
            }
        }
        Ok(Self { variant, lam, gam })
    }

    /// Weighting function
    pub fn variant(&self) -> SplVariant {
        self.variant
    }

    /// Current age parameter
    pub fn lam(&self) -> f32 {
        self.lam
    }

    /// Mixture parameter
    pub fn gam(&self) -> Option<f32> {
        self.gam
    }

    /// Weight for a single loss
    pub fn weight(&self, loss: f32) -> f32 {
        let lam = self.lam;
        match self.variant {
            SplVariant::Hard => {
                if loss < lam {
                    1.0
                } else {
                    0.0
                }
            }
            SplVariant::Linear => {
                if loss < lam {
                    1.0 - loss / lam
                } else {
                    0.0
                }
            }
            SplVariant::Mixture => {
                // build() guarantees gam for mixture
                let gam = self.gam.unwrap_or(lam);
                let cut1 = (lam * gam / (lam + gam)).powi(2);
                let cut2 = lam * lam;
                if loss < cut1 {
                    1.0
                } else if loss < cut2 {
                    gam * (1.0 / loss.sqrt() - 1.0 / lam)
                } else {
                    0.0
                }
            }
        }
    }

    /// Weights for a vector of per-example losses
    pub fn weights(&self, losses: ArrayView1<'_, f32>) -> Array1<f32> {
        losses.mapv(|l| self.weight(l))
    }

    /// Grow `lam` once at the end of an epoch
    pub fn tighten(&mut self) {
        self.lam *= SPL_GROWTH;
    }
}
