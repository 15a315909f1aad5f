//! Frequency normalization for a single (term, document) pair.
//!
//! Two signals are produced:
//! - `nf1` damps the raw frequency against the term's collection-wide rate and
//!   ignores document length;
//! - `nf2` scales the frequency by how the document's length compares to the
//!   reference length, so shorter-than-average documents amplify it.

use crate::error::ScoreError;
use crate::stats::TermStats;

/// Compute `(nf1, nf2)`.
///
/// `tf` must be at least 1; absent terms are filtered before this point.
pub fn normalize(tf: u32, stats: &TermStats, doc_len: u32, adl: f64, delta: f64) -> Result<(f64, f64), ScoreError> {
    if tf == 0 {
        return Err(ScoreError::domain("term frequency must be at least 1"));
    }
    let mtf = stats
        .mean_term_frequency()
        .ok_or_else(|| ScoreError::domain("mean term frequency unavailable for a term absent from the corpus"))?;
    Ok((nf1(tf as f64, mtf, delta)?, nf2(tf as f64, doc_len as f64, adl)?))
}

/// `ln(1 + tf) / ln(delta + mtf)`
pub fn nf1(tf: f64, mtf: f64, delta: f64) -> Result<f64, ScoreError> {
    let base = delta + mtf;
    if !(base > 0.0) {
        return Err(ScoreError::domain(format!("delta + mtf must be positive, got {base}")));
    }
    let denom = base.ln();
    if !(denom > 0.0) {
        return Err(ScoreError::domain(format!("ln(delta + mtf) must be positive, got ln({base}) = {denom}")));
    }
    Ok((1.0 + tf).ln() / denom)
}

/// `tf * ln(1 + adl / l)`
pub fn nf2(tf: f64, doc_len: f64, adl: f64) -> Result<f64, ScoreError> {
    if !(doc_len > 0.0) {
        return Err(ScoreError::domain(format!("document length must be positive, got {doc_len}")));
    }
    if !(adl > 0.0) {
        return Err(ScoreError::domain(format!("average document length must be positive, got {adl}")));
    }
    Ok(tf * (1.0 + adl / doc_len).ln())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cat() -> TermStats {
        TermStats { doc_frequency: 1, total_term_frequency: 3, field_token_count: 10 }
    }

    #[test]
    fn worked_example() {
        let (a, b) = normalize(2, &cat(), 5, 5.0, 1.0).unwrap();
        assert!((a - 3f64.ln() / 1.3f64.ln()).abs() < 1e-12);
        assert!((a - 4.187).abs() < 1e-3);
        assert!((b - 2.0 * 2f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn zero_length_document_is_domain_error() {
        assert!(matches!(normalize(1, &cat(), 0, 5.0, 1.0), Err(ScoreError::Domain(_))));
    }

    #[test]
    fn absent_term_is_domain_error() {
        let absent = TermStats { doc_frequency: 0, total_term_frequency: 0, field_token_count: 10 };
        assert!(matches!(normalize(1, &absent, 5, 5.0, 1.0), Err(ScoreError::Domain(_))));
    }

    #[test]
    fn non_positive_log_base_is_domain_error() {
        assert!(nf1(1.0, 0.3, -0.5).is_err());
        // delta + mtf == 1 would divide by zero
        assert!(nf1(1.0, 0.5, 0.5).is_err());
    }

    #[test]
    fn zero_tf_rejected() {
        assert!(normalize(0, &cat(), 5, 5.0, 1.0).is_err());
    }
}
