use std::fmt;
use std::str::FromStr;

use ndarray::{Array1, Array2};

use crate::error::KMeansError;
use crate::metrics;
use crate::{Dataset, Point};

/// What to do when a cluster ends an assignment pass with no points.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EmptyClusterPolicy {
    /// Keep the centroid the slot had before the pass.
    #[default]
    Retain,
    /// Abort the fit with [`KMeansError::EmptyCluster`].
    Fail,
}

impl FromStr for EmptyClusterPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "retain" => Ok(Self::Retain),
            "fail" => Ok(Self::Fail),
            _ => Err(format!(
                "Invalid empty cluster policy: {}. Must be 'retain' or 'fail'",
                s
            )),
        }
    }
}

impl fmt::Display for EmptyClusterPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Retain => f.write_str("retain"),
            Self::Fail => f.write_str("fail"),
        }
    }
}

/// Result of one assignment + update pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Step {
    /// Index into the centroid set the pass started from, per point.
    pub labels: Vec<usize>,
    /// Recomputed centroids, canonically sorted.
    pub centroids: Vec<Point>,
}

#[derive(Clone, Debug)]
pub struct KMeans {
    pub cluster_centers: Option<Vec<Point>>,
    pub labels: Option<Vec<usize>>,
    pub inertia: Option<u128>,
    pub n_iter: Option<usize>,
    n_clusters: usize,
    max_iter: usize,
    empty_cluster: EmptyClusterPolicy,
}

impl KMeans {
    pub fn new(n_clusters: usize) -> Self {
        Self {
            cluster_centers: None,
            labels: None,
            inertia: None,
            n_iter: None,
            n_clusters,
            max_iter: 300,
            empty_cluster: EmptyClusterPolicy::default(),
        }
    }

    pub fn max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn empty_cluster(mut self, policy: EmptyClusterPolicy) -> Self {
        self.empty_cluster = policy;
        self
    }

    /// Runs Lloyd's algorithm until the sorted centroid set stops changing.
    pub fn fit(&mut self, dataset: &Dataset) -> Result<(), KMeansError> {
        if self.max_iter == 0 {
            return Err(KMeansError::InvalidMaxIter);
        }

        let mut centroids = initial_centroids(dataset, self.n_clusters)?;
        log::debug!("initial centroids: {:?}", centroids);

        for iteration in 1..=self.max_iter {
            let Step {
                labels,
                centroids: next,
            } = step(dataset, &centroids, self.empty_cluster).inspect_err(|err| {
                log::debug!("iteration {} failed: {}", iteration, err);
            })?;

            if next == centroids {
                log::info!("Converged after {} iterations", iteration);
                self.inertia = Some(metrics::inertia(dataset, &centroids));
                self.cluster_centers = Some(centroids);
                self.labels = Some(labels);
                self.n_iter = Some(iteration);
                return Ok(());
            }

            log::debug!("iteration {}: centroids {:?}", iteration, next);
            centroids = next;
        }

        Err(KMeansError::NotConverged {
            max_iter: self.max_iter,
        })
    }

    pub fn predict(&self, dataset: &Dataset) -> Result<Vec<usize>, KMeansError> {
        let centroids = self
            .cluster_centers
            .as_ref()
            .ok_or(KMeansError::NotFitted)?;

        Ok(assign(dataset, centroids))
    }

    pub fn fit_predict(&mut self, dataset: &Dataset) -> Result<Vec<usize>, KMeansError> {
        self.fit(dataset)?;
        self.labels.clone().ok_or(KMeansError::NotFitted)
    }

    /// Squared distance from every point to every centroid, `n_samples x k`.
    pub fn transform(&self, dataset: &Dataset) -> Result<Array2<u128>, KMeansError> {
        let centroids = self
            .cluster_centers
            .as_ref()
            .ok_or(KMeansError::NotFitted)?;

        Ok(Array2::from_shape_fn(
            (dataset.n_samples(), centroids.len()),
            |(i, k)| dataset.point(i).squared_distance(&centroids[k]),
        ))
    }
}

/// Fits with default settings and returns the converged centroids.
pub fn run(dataset: &Dataset, k: usize) -> Result<Vec<Point>, KMeansError> {
    let mut kmeans = KMeans::new(k);
    kmeans.fit(dataset)?;
    kmeans.cluster_centers.ok_or(KMeansError::NotFitted)
}

/// The first `k` points in input order, canonically sorted.
pub fn initial_centroids(dataset: &Dataset, k: usize) -> Result<Vec<Point>, KMeansError> {
    let n_samples = dataset.n_samples();
    if k == 0 || k > n_samples {
        return Err(KMeansError::InvalidClusterCount { k, n_samples });
    }

    Ok(sort_centroids(dataset.points().take(k).collect()))
}

/// Index of the closest centroid. On ties the lowest index wins.
pub fn nearest_centroid(point: &Point, centroids: &[Point]) -> usize {
    debug_assert!(!centroids.is_empty());

    let mut best = 0;
    let mut best_distance = None;
    for (i, centroid) in centroids.iter().enumerate() {
        let distance = point.squared_distance(centroid);
        if best_distance.is_none_or(|d| distance < d) {
            best = i;
            best_distance = Some(distance);
        }
    }
    best
}

pub fn assign(dataset: &Dataset, centroids: &[Point]) -> Vec<usize> {
    dataset
        .points()
        .map(|p| nearest_centroid(&p, centroids))
        .collect()
}

/// Averages the points of each cluster with truncating integer division.
///
/// `previous` is the centroid set `labels` were computed against; it fixes
/// `k` and supplies the centroid for an empty slot under
/// [`EmptyClusterPolicy::Retain`]. The result is not sorted.
pub fn recompute_centroids(
    dataset: &Dataset,
    labels: &[usize],
    previous: &[Point],
    policy: EmptyClusterPolicy,
) -> Result<Vec<Point>, KMeansError> {
    let k = previous.len();
    let mut sums = Array2::<i128>::zeros((k, 2));
    let mut counts = Array1::<i128>::zeros(k);

    for (point, &label) in dataset.points().zip(labels) {
        sums[[label, 0]] += point.x as i128;
        sums[[label, 1]] += point.y as i128;
        counts[label] += 1;
    }

    let mut centroids = Vec::with_capacity(k);
    for (cluster, &count) in counts.iter().enumerate() {
        if count == 0 {
            match policy {
                EmptyClusterPolicy::Retain => {
                    log::warn!(
                        "cluster {} is empty, keeping centroid {}",
                        cluster,
                        previous[cluster]
                    );
                    centroids.push(previous[cluster]);
                    continue;
                }
                EmptyClusterPolicy::Fail => return Err(KMeansError::EmptyCluster { cluster }),
            }
        }

        // A mean of i64 values is within i64 range.
        centroids.push(Point::new(
            (sums[[cluster, 0]] / count) as i64,
            (sums[[cluster, 1]] / count) as i64,
        ));
    }

    Ok(centroids)
}

/// Canonical order: ascending `x`, then ascending `y`.
pub fn sort_centroids(mut centroids: Vec<Point>) -> Vec<Point> {
    centroids.sort_unstable();
    centroids
}

/// One Lloyd iteration starting from `centroids`.
pub fn step(
    dataset: &Dataset,
    centroids: &[Point],
    policy: EmptyClusterPolicy,
) -> Result<Step, KMeansError> {
    let labels = assign(dataset, centroids);
    let next = recompute_centroids(dataset, &labels, centroids, policy)?;

    Ok(Step {
        labels,
        centroids: sort_centroids(next),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use ndarray_rand::RandomExt;
    use rand::SeedableRng;
    use rand::distributions::Uniform;
    use rand::rngs::StdRng;

    fn two_blobs() -> Dataset {
        Dataset::new(array![[0, 0], [1, 0], [10, 10], [11, 10], [10, 11]]).unwrap()
    }

    fn random_dataset(seed: u64, n_samples: usize) -> Dataset {
        let mut rng = StdRng::seed_from_u64(seed);
        let features = Array2::random_using((n_samples, 2), Uniform::new(-50i64, 50), &mut rng);
        Dataset::new(features).unwrap()
    }

    #[test]
    fn test_kmeans_two_blobs() {
        let dataset = two_blobs();
        let mut kmeans = KMeans::new(2);
        kmeans.fit(&dataset).unwrap();

        assert_eq!(
            kmeans.cluster_centers.as_ref().unwrap(),
            &vec![Point::new(0, 0), Point::new(10, 10)]
        );
        assert_eq!(kmeans.labels.as_ref().unwrap(), &vec![0, 0, 1, 1, 1]);
        assert_eq!(kmeans.n_iter, Some(3));
        assert_eq!(kmeans.inertia, Some(3));
    }

    #[test]
    fn test_run_matches_fit() {
        let dataset = two_blobs();
        assert_eq!(
            run(&dataset, 2).unwrap(),
            vec![Point::new(0, 0), Point::new(10, 10)]
        );
    }

    #[test]
    fn test_initial_centroids_first_k_sorted() {
        let dataset = Dataset::new(array![[5, 5], [-1, 3], [-1, 2], [0, 0]]).unwrap();
        let centroids = initial_centroids(&dataset, 3).unwrap();

        assert_eq!(
            centroids,
            vec![Point::new(-1, 2), Point::new(-1, 3), Point::new(5, 5)]
        );
    }

    #[test]
    fn test_invalid_cluster_count() {
        let dataset = two_blobs();

        assert_eq!(
            KMeans::new(0).fit(&dataset),
            Err(KMeansError::InvalidClusterCount { k: 0, n_samples: 5 })
        );
        assert_eq!(
            KMeans::new(6).fit(&dataset),
            Err(KMeansError::InvalidClusterCount { k: 6, n_samples: 5 })
        );
    }

    #[test]
    fn test_empty_dataset() {
        let dataset = Dataset::from_points(&[]);
        assert_eq!(
            KMeans::new(3).fit(&dataset),
            Err(KMeansError::InvalidClusterCount { k: 3, n_samples: 0 })
        );
    }

    #[test]
    fn test_invalid_max_iter() {
        let dataset = two_blobs();
        assert_eq!(
            KMeans::new(2).max_iter(0).fit(&dataset),
            Err(KMeansError::InvalidMaxIter)
        );
    }

    #[test]
    fn test_not_converged_within_cap() {
        let dataset = two_blobs();

        assert_eq!(
            KMeans::new(2).max_iter(2).fit(&dataset),
            Err(KMeansError::NotConverged { max_iter: 2 })
        );
        assert!(KMeans::new(2).max_iter(3).fit(&dataset).is_ok());
    }

    #[test]
    fn test_nearest_centroid_tie_break() {
        let centroids = [Point::new(-1, 0), Point::new(1, 0)];
        assert_eq!(nearest_centroid(&Point::new(0, 0), &centroids), 0);

        let centroids = [Point::new(5, 5), Point::new(0, 1), Point::new(1, 0)];
        assert_eq!(nearest_centroid(&Point::new(0, 0), &centroids), 1);
    }

    #[test]
    fn test_recompute_truncates_toward_zero() {
        let dataset = Dataset::new(array![[-1, 3], [-2, 4], [0, 0], [1, 0]]).unwrap();
        let previous = [Point::new(-1, 3), Point::new(0, 0)];
        let labels = [0, 0, 1, 1];

        let centroids =
            recompute_centroids(&dataset, &labels, &previous, EmptyClusterPolicy::Fail).unwrap();

        // (-3 / 2, 7 / 2) and (1 / 2, 0 / 2)
        assert_eq!(centroids, vec![Point::new(-1, 3), Point::new(0, 0)]);
    }

    #[test]
    fn test_empty_cluster_retain() {
        let dataset = Dataset::new(array![[0, 0], [0, 0], [5, 5]]).unwrap();
        let mut kmeans = KMeans::new(2);
        kmeans.fit(&dataset).unwrap();

        assert_eq!(
            kmeans.cluster_centers.unwrap(),
            vec![Point::new(0, 0), Point::new(5, 5)]
        );
        assert_eq!(kmeans.n_iter, Some(3));
    }

    #[test]
    fn test_empty_cluster_fail() {
        let dataset = Dataset::new(array![[0, 0], [0, 0], [5, 5]]).unwrap();
        let mut kmeans = KMeans::new(2).empty_cluster(EmptyClusterPolicy::Fail);

        assert_eq!(
            kmeans.fit(&dataset),
            Err(KMeansError::EmptyCluster { cluster: 1 })
        );
        assert!(kmeans.cluster_centers.is_none());
    }

    #[test]
    fn test_k_equals_n_samples() {
        let dataset = Dataset::new(array![[3, 3], [0, 7], [-2, 1]]).unwrap();
        let mut kmeans = KMeans::new(3);
        kmeans.fit(&dataset).unwrap();

        assert_eq!(
            kmeans.cluster_centers.unwrap(),
            vec![Point::new(-2, 1), Point::new(0, 7), Point::new(3, 3)]
        );
        assert_eq!(kmeans.n_iter, Some(1));
        assert_eq!(kmeans.inertia, Some(0));
    }

    #[test]
    fn test_result_is_fixed_point() {
        let dataset = two_blobs();
        let centroids = run(&dataset, 2).unwrap();

        let next = step(&dataset, &centroids, EmptyClusterPolicy::Retain).unwrap();
        assert_eq!(next.centroids, centroids);
    }

    #[test]
    fn test_random_data_invariants() {
        for seed in 0..8 {
            let dataset = random_dataset(seed, 60);
            let k = 1 + seed as usize % 5;

            let first = KMeans::new(k).fit_predict(&dataset);
            let second = KMeans::new(k).fit_predict(&dataset);
            assert_eq!(first, second);

            let mut kmeans = KMeans::new(k);
            kmeans.fit(&dataset).unwrap();
            let centroids = kmeans.cluster_centers.clone().unwrap();

            assert_eq!(centroids.len(), k);
            assert!(centroids.windows(2).all(|w| w[0] <= w[1]));
            assert_eq!(
                step(&dataset, &centroids, EmptyClusterPolicy::Retain)
                    .unwrap()
                    .centroids,
                centroids
            );
            assert_eq!(kmeans.predict(&dataset).unwrap(), kmeans.labels.unwrap());
        }
    }

    #[test]
    fn test_every_iteration_keeps_k_sorted_centroids() {
        for seed in 0..8 {
            let dataset = random_dataset(100 + seed, 80);
            let k = 2 + seed as usize % 4;

            let mut centroids = initial_centroids(&dataset, k).unwrap();
            assert_eq!(centroids.len(), k);
            assert!(centroids.windows(2).all(|w| w[0] <= w[1]));

            let mut iterations = 0;
            loop {
                let next = step(&dataset, &centroids, EmptyClusterPolicy::Retain)
                    .unwrap()
                    .centroids;
                iterations += 1;

                assert_eq!(next.len(), k);
                assert!(next.windows(2).all(|w| w[0] <= w[1]));

                if next == centroids {
                    break;
                }
                assert!(iterations < 300, "seed {} did not converge", seed);
                centroids = next;
            }

            let mut kmeans = KMeans::new(k);
            kmeans.fit(&dataset).unwrap();
            assert_eq!(kmeans.cluster_centers.unwrap(), centroids);
            assert_eq!(kmeans.n_iter, Some(iterations));
        }
    }

    #[test]
    fn test_kmeans_predict() {
        let dataset = two_blobs();
        let mut kmeans = KMeans::new(2);
        kmeans.fit(&dataset).unwrap();

        let unseen = Dataset::from_points(&[Point::new(2, 1), Point::new(9, 12)]);
        assert_eq!(kmeans.predict(&unseen).unwrap(), vec![0, 1]);
    }

    #[test]
    fn test_kmeans_transform() {
        let dataset = two_blobs();
        let mut kmeans = KMeans::new(2);
        kmeans.fit(&dataset).unwrap();

        let distances = kmeans.transform(&dataset).unwrap();
        assert_eq!(distances.shape(), &[5, 2]);
        assert_eq!(distances[[0, 0]], 0);
        assert_eq!(distances[[0, 1]], 200);
        assert_eq!(distances[[4, 1]], 1);
    }

    #[test]
    fn test_kmeans_predict_without_fit() {
        let dataset = two_blobs();
        let kmeans = KMeans::new(2);

        assert_eq!(kmeans.predict(&dataset), Err(KMeansError::NotFitted));
        assert_eq!(kmeans.transform(&dataset), Err(KMeansError::NotFitted));
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!(
            "retain".parse::<EmptyClusterPolicy>(),
            Ok(EmptyClusterPolicy::Retain)
        );
        assert_eq!(
            "fail".parse::<EmptyClusterPolicy>(),
            Ok(EmptyClusterPolicy::Fail)
        );
        assert!("drop".parse::<EmptyClusterPolicy>().is_err());
    }
}
