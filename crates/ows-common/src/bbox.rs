//! Bounding box types and operations.

use serde::{Deserialize, Serialize};

/// A WGS84 bounding box stored in longitude/latitude order.
///
/// `min_x`/`max_x` are longitudes and `min_y`/`max_y` latitudes, in degrees.
/// Output formats that expect latitude first (GeoRSS, GML with EPSG:4326)
/// must go through [`BoundingBox::georss_box`] or [`BoundingBox::lat_lon_corners`]
/// rather than reading the fields directly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Parse a KVP bbox parameter string: "west,south,east,north"
    pub fn from_kvp_string(s: &str) -> Result<Self, BboxParseError> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return Err(BboxParseError::InvalidFormat(s.to_string()));
        }

        let parse = |part: &str| {
            part.parse::<f64>()
                .map_err(|_| BboxParseError::InvalidNumber(part.to_string()))
        };

        let bbox = Self {
            min_x: parse(parts[0])?,
            min_y: parse(parts[1])?,
            max_x: parse(parts[2])?,
            max_y: parse(parts[3])?,
        };

        if bbox.min_x > bbox.max_x || bbox.min_y > bbox.max_y {
            return Err(BboxParseError::InvertedCorners(s.to_string()));
        }

        Ok(bbox)
    }

    /// Check if this bbox intersects another. Touching edges count.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }

    /// GeoRSS box value: "south west north east".
    pub fn georss_box(&self) -> String {
        format!("{} {} {} {}", self.min_y, self.min_x, self.max_y, self.max_x)
    }

    /// Lower and upper corners in latitude/longitude order, as GML expects for EPSG:4326.
    pub fn lat_lon_corners(&self) -> (String, String) {
        (
            format!("{} {}", self.min_y, self.min_x),
            format!("{} {}", self.max_y, self.max_x),
        )
    }

    /// Closed exterior ring (counter-clockwise) as `[lon, lat]` pairs.
    pub fn to_ring(&self) -> Vec<[f64; 2]> {
        vec![
            [self.min_x, self.min_y],
            [self.max_x, self.min_y],
            [self.max_x, self.max_y],
            [self.min_x, self.max_y],
            [self.min_x, self.min_y],
        ]
    }

    /// Smallest bbox enclosing every `[lon, lat]` point, or `None` for no points.
    pub fn enclosing(points: &[[f64; 2]]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut bbox = Self::new(first[0], first[1], first[0], first[1]);
        for [x, y] in rest {
            bbox.min_x = bbox.min_x.min(*x);
            bbox.min_y = bbox.min_y.min(*y);
            bbox.max_x = bbox.max_x.max(*x);
            bbox.max_y = bbox.max_y.max(*y);
        }
        Some(bbox)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BboxParseError {
    #[error("Invalid bbox format: {0}. Expected 'west,south,east,north'")]
    InvalidFormat(String),

    #[error("Invalid number in bbox: {0}")]
    InvalidNumber(String),

    #[error("Lower corner exceeds upper corner in bbox: {0}")]
    InvertedCorners(String),
}
