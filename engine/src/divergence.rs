//! Divergence functions mapping a normalized frequency `x` and the term's
//! informativeness `f0 = ln(N / df)` to a partial relevance score.
//!
//! The family is indexed by a shape parameter `m`. Only three regions have a
//! closed form here:
//!
//! | m       | F(x)                                              |
//! |---------|---------------------------------------------------|
//! | `m > 2` | `1/(λ(2-m)) · (f0^(2-m) − x^((2-m)/(1-m)))`       |
//! | `m = 2` | `1/λ · (ln f0 − 1/(1-m) · ln x)`                  |
//! | `m = 1` | `1/λ · f0 · (1 − e^(−λx))`                        |
//!
//! Values of `m` outside these regions, including the `0.8 ≤ m < 1` range that
//! is often used for tuning, are rejected with [`ScoreError::UnsupportedShape`].
//! There is no interpolated branch for them.

use crate::error::ScoreError;
use serde::{Deserialize, Serialize};

/// Validated shape parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    /// `m == 1`
    Exponential,
    /// `m == 2`
    Logarithmic,
    /// `m > 2`
    Power(f64),
}

impl Shape {
    pub fn from_m(m: f64) -> Result<Self, ScoreError> {
        if m == 1.0 {
            Ok(Shape::Exponential)
        } else if m == 2.0 {
            Ok(Shape::Logarithmic)
        } else if m > 2.0 && m.is_finite() {
            Ok(Shape::Power(m))
        } else {
            Err(ScoreError::UnsupportedShape { m })
        }
    }

    pub fn m(&self) -> f64 {
        match *self {
            Shape::Exponential => 1.0,
            Shape::Logarithmic => 2.0,
            Shape::Power(m) => m,
        }
    }
}

/// Inverse document frequency weight `ln(N / df)`.
///
/// A term present in every document yields 0, which [`divergence`] rejects.
pub fn idf_weight(doc_count: u32, doc_frequency: u32) -> Result<f64, ScoreError> {
    if doc_frequency == 0 {
        return Err(ScoreError::domain("document frequency must be positive"));
    }
    if doc_count == 0 {
        return Err(ScoreError::domain("document count must be positive"));
    }
    Ok((doc_count as f64 / doc_frequency as f64).ln())
}

pub fn divergence(x: f64, f0: f64, shape: Shape, lambda: f64) -> Result<f64, ScoreError> {
    if !x.is_finite() || x <= 0.0 {
        return Err(ScoreError::domain(format!("normalized frequency must be positive, got {x}")));
    }
    if !f0.is_finite() || f0 <= 0.0 {
        return Err(ScoreError::domain(format!("idf weight must be positive, got {f0}")));
    }
    if !lambda.is_finite() || lambda == 0.0 {
        return Err(ScoreError::domain(format!("lambda must be finite and non-zero, got {lambda}")));
    }

    let value = match shape {
        Shape::Power(m) => {
            (1.0 / (lambda * (2.0 - m))) * (f0.powf(2.0 - m) - x.powf((2.0 - m) / (1.0 - m)))
        }
        Shape::Logarithmic => {
            let m = 2.0;
            (1.0 / lambda) * (f0.ln() - (1.0 / (1.0 - m)) * x.ln())
        }
        Shape::Exponential => (1.0 / lambda) * f0 * (1.0 - (-lambda * x).exp()),
    };
    Ok(value)
}
