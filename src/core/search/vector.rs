//! Vector math for similarity scoring.
//!
//! Every function takes slices and returns new vectors; callers'
//! buffers are never mutated.

/// Cosine similarity of two vectors.
///
/// Returns 0.0 for empty or mismatched-length inputs and for
/// zero-norm vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || b.is_empty() || a.len() != b.len() {
        return 0.0;
    }

    let dot = a.iter().zip(b).map(|(x, y)| x * y).sum::<f32>();
    let a_norm = l2_norm(a);
    let b_norm = l2_norm(b);

    if a_norm == 0.0 || b_norm == 0.0 {
        return 0.0;
    }

    dot / (a_norm * b_norm)
}

pub fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Unit-length copy of `v`, or all zeros if `v` has zero norm
pub fn normalize(v: &[f32]) -> Vec<f32> {
    let norm = l2_norm(v);
    if norm == 0.0 {
        return vec![0.0; v.len()];
    }
    v.iter().map(|x| x / norm).collect()
}

/// `normalize(alpha * query + (1 - alpha) * memory)`.
///
/// Returns `None` if the dimensions differ or either is empty.
pub fn blend(query: &[f32], memory: &[f32], alpha: f32) -> Option<Vec<f32>> {
    if query.is_empty() || query.len() != memory.len() {
        return None;
    }
    let mixed: Vec<f32> = query
        .iter()
        .zip(memory)
        .map(|(q, m)| alpha * q + (1.0 - alpha) * m)
        .collect();
    Some(normalize(&mixed))
}

/// Element-wise mean of equal-length vectors
pub fn mean(vectors: &[Vec<f32>]) -> Option<Vec<f32>> {
    let first = vectors.first()?;
    let mut sum = vec![0.0f32; first.len()];
    for v in vectors {
        if v.len() != sum.len() {
            return None;
        }
        for (acc, x) in sum.iter_mut().zip(v) {
            *acc += x;
        }
    }
    let count = vectors.len() as f32;
    Some(sum.into_iter().map(|x| x / count).collect())
}
