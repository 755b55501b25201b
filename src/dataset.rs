use std::io::BufRead;

use ndarray::Array2;

use crate::Point;
use crate::error::{DatasetError, ParsePointError};

/// An immutable collection of points, stored as an `n_samples x 2` matrix
/// with `x` in column 0 and `y` in column 1.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dataset {
    features: Array2<i64>,
}

impl Dataset {
    pub fn new(features: Array2<i64>) -> Result<Self, DatasetError> {
        if features.ncols() != 2 {
            return Err(DatasetError::InvalidShape {
                ncols: features.ncols(),
            });
        }

        Ok(Self { features })
    }

    pub fn from_points(points: &[Point]) -> Self {
        let features = Array2::from_shape_fn((points.len(), 2), |(i, j)| match j {
            0 => points[i].x,
            _ => points[i].y,
        });
        Self { features }
    }

    /// Reads one `"x,y"` point per line. The first malformed line aborts the
    /// whole read.
    pub fn from_reader<R: BufRead>(mut reader: R) -> Result<Self, DatasetError> {
        let mut points = Vec::new();
        let mut buf = Vec::new();
        let mut line_number = 0;

        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf)? == 0 {
                break;
            }
            line_number += 1;

            let point = parse_line(strip_line_ending(&buf))
                .map_err(|source| DatasetError::Parse {
                    line_number,
                    source,
                })?;
            points.push(point);
        }

        log::debug!("read {} points", points.len());
        Ok(Self::from_points(&points))
    }

    pub fn n_samples(&self) -> usize {
        self.features.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.n_samples() == 0
    }

    pub fn features(&self) -> &Array2<i64> {
        &self.features
    }

    /// Returns the point at row `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.n_samples()`.
    pub fn point(&self, index: usize) -> Point {
        Point::new(self.features[[index, 0]], self.features[[index, 1]])
    }

    /// Points in input order.
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.features
            .rows()
            .into_iter()
            .map(|row| Point::new(row[0], row[1]))
    }
}

/// Drops a trailing `\n` and then a trailing `\r`.
fn strip_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

fn parse_line(line: &[u8]) -> Result<Point, ParsePointError> {
    std::str::from_utf8(line)
        .map_err(|source| ParsePointError::InvalidUtf8 {
            line: String::from_utf8_lossy(line).into_owned(),
            source,
        })?
        .parse()
}
