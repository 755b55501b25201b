pub use ndarray::Array2;

pub mod cluster;
pub mod dataset;
pub mod error;
pub mod metrics;
pub mod point;

pub use cluster::{EmptyClusterPolicy, KMeans};
pub use dataset::Dataset;
pub use error::{DatasetError, Field, KMeansError, ParsePointError};
pub use point::Point;
