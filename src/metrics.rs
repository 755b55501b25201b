use crate::cluster::nearest_centroid;
use crate::{Dataset, Point};

/// Within-cluster sum of squared distances: each point contributes its
/// squared distance to the nearest centroid. Saturates at `u128::MAX`.
pub fn inertia(dataset: &Dataset, centroids: &[Point]) -> u128 {
    if centroids.is_empty() {
        return 0;
    }

    dataset
        .points()
        .map(|p| p.squared_distance(&centroids[nearest_centroid(&p, centroids)]))
        .fold(0u128, u128::saturating_add)
}
