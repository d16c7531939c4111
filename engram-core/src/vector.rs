//! Small dense-vector helpers shared by the storage scan and the
//! clustering paths. All math is done in f64 and narrowed at the edges.

/// Cosine similarity in [-1, 1]; zero-norm inputs yield 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let dot: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| (*x as f64) * (*y as f64))
        .sum();
    let norm_a = l2_norm(a);
    let norm_b = l2_norm(b);
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Euclidean norm.
pub fn l2_norm(v: &[f32]) -> f64 {
    v.iter().map(|x| (*x as f64) * (*x as f64)).sum::<f64>().sqrt()
}

/// Scale to unit norm. Zero vectors are returned unchanged.
pub fn normalize(v: &[f32]) -> Vec<f32> {
    let norm = l2_norm(v);
    if norm == 0.0 {
        return v.to_vec();
    }
    v.iter().map(|x| (*x as f64 / norm) as f32).collect()
}

/// Arithmetic-mean centroid of a non-empty set of equal-length vectors.
pub fn mean(vectors: &[Vec<f32>]) -> Vec<f32> {
    let dims = vectors.first().map(|v| v.len()).unwrap_or(0);
    let mut acc = vec![0.0f64; dims];
    for v in vectors {
        for (slot, x) in acc.iter_mut().zip(v.iter()) {
            *slot += *x as f64;
        }
    }
    let n = vectors.len().max(1) as f64;
    acc.into_iter().map(|x| (x / n) as f32).collect()
}
