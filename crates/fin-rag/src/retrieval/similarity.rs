//! Vector similarity

use crate::error::{Error, Result};

/// Cosine similarity of two equal-length vectors, in [-1, 1].
///
/// Returns exactly 0.0 when either vector has zero norm. Vectors of different
/// length fail with `DimensionMismatch`.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(Error::DimensionMismatch {
            expected: a.len(),
            got: b.len(),
        });
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (x as f64, y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denominator = norm_a.sqrt() * norm_b.sqrt();
    if denominator == 0.0 {
        return Ok(0.0);
    }

    Ok((dot / denominator).clamp(-1.0, 1.0) as f32)
}
