use std::fmt;
use std::io;
use std::num::ParseIntError;
use std::str::Utf8Error;

use thiserror::Error;

/// Which coordinate of a `"x,y"` line failed to parse.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    X,
    Y,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::X => f.write_str("x"),
            Field::Y => f.write_str("y"),
        }
    }
}

/// An error produced while parsing a single `"x,y"` line.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParsePointError {
    /// The line did not split into exactly two comma-separated fields.
    #[error("invalid line format {line:?}")]
    InvalidFormat { line: String },
    /// One of the fields was not a decimal integer.
    #[error("failed to parse {field} value as int {value:?}")]
    InvalidCoordinate {
        field: Field,
        value: String,
        #[source]
        source: ParseIntError,
    },
    /// The line was not valid UTF-8. `line` holds a lossy decoding.
    #[error("line is not valid UTF-8 {line:?}")]
    InvalidUtf8 {
        line: String,
        #[source]
        source: Utf8Error,
    },
}

/// An error produced while reading a whole point stream.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read input")]
    Io(#[from] io::Error),
    #[error("point matrix must have 2 columns, got {ncols}")]
    InvalidShape { ncols: usize },
    #[error("invalid point on line {line_number}")]
    Parse {
        line_number: usize,
        #[source]
        source: ParsePointError,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum KMeansError {
    #[error("n_clusters={k} must be >= 1 and <= n_samples={n_samples}")]
    InvalidClusterCount { k: usize, n_samples: usize },
    #[error("max_iter must be > 0")]
    InvalidMaxIter,
    #[error("cluster {cluster} received no points")]
    EmptyCluster { cluster: usize },
    #[error("centroids did not converge within {max_iter} iterations")]
    NotConverged { max_iter: usize },
    #[error("KMeans not fitted. Call fit() first.")]
    NotFitted,
}
