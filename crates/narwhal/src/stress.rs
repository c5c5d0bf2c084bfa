use crate::matrix::{DistanceMatrix, WeightMatrix};
use narwhal_graphlib::Point;

/// `Σ_{i<j} W[i][j] · (‖p_i − p_j‖ − D[i][j])²` over the unordered pairs.
pub fn stress(positions: &[Point], distances: &DistanceMatrix, weights: &WeightMatrix) -> f64 {
    debug_assert_eq!(positions.len(), distances.len());
    debug_assert_eq!(positions.len(), weights.len());

    let n = positions.len();
    let mut total = 0.0;
    for i in 0..n {
        for j in (i + 1)..n {
            let w = weights.get(i, j);
            if w == 0.0 {
                continue;
            }
            let diff = positions[i].distance(&positions[j]) - distances.get(i, j);
            total += w * diff * diff;
        }
    }
    total
}
