use crate::db::models::DESCRIPTOR_LEN;

/// Euclidean distance between two face descriptors in normalized
/// embedding space. Garbage in (length mismatch, wrong length, NaN) yields
/// `f32::INFINITY`, which no threshold accepts.
pub fn descriptor_distance(lhs: &[f32], rhs: &[f32]) -> f32 {
    if lhs.len() != DESCRIPTOR_LEN || rhs.len() != DESCRIPTOR_LEN {
        return f32::INFINITY;
    }

    let mut sum = 0.0f32;
    for (a, b) in lhs.iter().zip(rhs.iter()) {
        let diff = a - b;
        sum += diff * diff;
    }

    let distance = sum.sqrt();
    if distance.is_nan() {
        f32::INFINITY
    } else {
        distance
    }
}
