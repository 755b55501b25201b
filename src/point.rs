use std::fmt;
use std::str::FromStr;

use crate::error::{Field, ParsePointError};

/// A point on the integer plane.
///
/// The derived ordering compares `x` first and `y` second, which is the
/// canonical order centroid sets are kept in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl Point {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Squared euclidean distance, saturating at `u128::MAX` for points
    /// near opposite corners of the `i64` plane.
    pub fn squared_distance(&self, other: &Point) -> u128 {
        let dx = self.x.abs_diff(other.x) as u128;
        let dy = self.y.abs_diff(other.y) as u128;
        (dx * dx).saturating_add(dy * dy)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

impl FromStr for Point {
    type Err = ParsePointError;

    /// Parses `"x,y"`. No whitespace is trimmed.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut fields = s.split(',');
        let (x, y) = match (fields.next(), fields.next(), fields.next()) {
            (Some(x), Some(y), None) => (x, y),
            _ => {
                return Err(ParsePointError::InvalidFormat {
                    line: s.to_string(),
                });
            }
        };

        Ok(Self {
            x: parse_field(Field::X, x)?,
            y: parse_field(Field::Y, y)?,
        })
    }
}

fn parse_field(field: Field, value: &str) -> Result<i64, ParsePointError> {
    value
        .parse::<i64>()
        .map_err(|source| ParsePointError::InvalidCoordinate {
            field,
            value: value.to_string(),
            source,
        })
}
