//! Lloyd's k-means over integer points.
//!
//! Centroids start as the first `k` input points. Each iteration assigns
//! every point to its nearest centroid (lowest index on ties), averages the
//! clusters with truncating integer division and sorts the result by `x`
//! then `y`. The fit stops when the sorted set no longer changes.
//!
//! # Examples
//!
//! ```rust
//! use lloyd2d::{Dataset, KMeans, Point};
//! use ndarray::array;
//!
//! let dataset = Dataset::new(array![
//!     [0, 0],
//!     [1, 0],
//!     [10, 10],
//!     [11, 10],
//!     [10, 11]
//! ]).unwrap();
//!
//! let mut kmeans = KMeans::new(2).max_iter(100);
//! let labels = kmeans.fit_predict(&dataset).unwrap();
//! assert_eq!(labels, vec![0, 0, 1, 1, 1]);
//!
//! let centers = kmeans.cluster_centers.as_ref().unwrap();
//! assert_eq!(centers, &vec![Point::new(0, 0), Point::new(10, 10)]);
//! ```
//!
//! Empty clusters keep their previous centroid unless asked to fail:
//!
//! ```rust
//! use lloyd2d::{Dataset, EmptyClusterPolicy, KMeans, KMeansError, Point};
//!
//! let dataset = Dataset::from_points(&[Point::new(0, 0), Point::new(0, 0), Point::new(5, 5)]);
//!
//! let mut kmeans = KMeans::new(2).empty_cluster(EmptyClusterPolicy::Fail);
//! assert_eq!(kmeans.fit(&dataset), Err(KMeansError::EmptyCluster { cluster: 1 }));
//! ```

mod kmeans;

pub use kmeans::{
    EmptyClusterPolicy, KMeans, Step, assign, initial_centroids, nearest_centroid,
    recompute_centroids, run, sort_centroids, step,
};
