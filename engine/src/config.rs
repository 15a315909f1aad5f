//! Tunables of the scoring model and their eager validation.
//!
//! A [`ScoringConfig`] is plain data that can come from CLI flags or a JSON
//! file. [`ScoringConfig::validate`] turns it into a [`ScoringModel`], which is
//! what the scorer takes; an invalid configuration never reaches scoring.

use crate::divergence::Shape;
use crate::error::ScoreError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_DELTA: f64 = 1.0;
/// `m = 1` is the nearest supported shape to the 0.8–1.0 tuning range.
pub const DEFAULT_M: f64 = 1.0;
pub const DEFAULT_LAMBDA: f64 = 0.4;
pub const DEFAULT_TOP_K: usize = 1000;
pub const DEFAULT_RUN_TAG: &str = "divrank";

/// What to do when a single term cannot be scored for a single document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaultPolicy {
    /// Log the fault and let the term contribute zero.
    #[default]
    Skip,
    /// Abort the query evaluation with the error.
    Abort,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringConfig {
    pub delta: f64,
    /// Reference average document length; the corpus average when unset.
    pub adl: Option<f64>,
    pub m: f64,
    pub lambda: f64,
    pub top_k: usize,
    pub fault_policy: FaultPolicy,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            delta: DEFAULT_DELTA,
            adl: None,
            m: DEFAULT_M,
            lambda: DEFAULT_LAMBDA,
            top_k: DEFAULT_TOP_K,
            fault_policy: FaultPolicy::Skip,
        }
    }
}

impl ScoringConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let cfg: ScoringConfig = serde_json::from_str(&text)?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<ScoringModel, ScoreError> {
        let shape = Shape::from_m(self.m)?;
        if !self.lambda.is_finite() || self.lambda == 0.0 {
            return Err(ScoreError::domain(format!("lambda must be finite and non-zero, got {}", self.lambda)));
        }
        if !(self.delta > 0.0) || !self.delta.is_finite() {
            return Err(ScoreError::domain(format!("delta must be positive, got {}", self.delta)));
        }
        if let Some(adl) = self.adl {
            if !(adl > 0.0) || !adl.is_finite() {
                return Err(ScoreError::domain(format!("adl must be positive, got {adl}")));
            }
        }
        if self.top_k == 0 {
            return Err(ScoreError::domain("top_k must be at least 1"));
        }
        Ok(ScoringModel {
            delta: self.delta,
            adl: self.adl,
            shape,
            lambda: self.lambda,
            top_k: self.top_k,
            fault_policy: self.fault_policy,
        })
    }
}

/// Validated, immutable scoring parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringModel {
    delta: f64,
    adl: Option<f64>,
    shape: Shape,
    lambda: f64,
    top_k: usize,
    fault_policy: FaultPolicy,
}

impl ScoringModel {
    pub fn delta(&self) -> f64 { self.delta }
    pub fn adl_override(&self) -> Option<f64> { self.adl }
    pub fn shape(&self) -> Shape { self.shape }
    pub fn lambda(&self) -> f64 { self.lambda }
    pub fn top_k(&self) -> usize { self.top_k }
    pub fn fault_policy(&self) -> FaultPolicy { self.fault_policy }
}
