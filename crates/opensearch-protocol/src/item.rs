//! Search result items.

use chrono::{DateTime, Utc};
use ows_common::{BoundingBox, OwsError, OwsResult, TimePeriod};
use serde::{Deserialize, Serialize};

/// Polygon footprint as a closed ring of `[lon, lat]` positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    pub exterior: Vec<[f64; 2]>,
}

impl Footprint {
    pub fn new(exterior: Vec<[f64; 2]>) -> Self {
        Self { exterior }
    }

    pub fn from_bbox(bbox: &BoundingBox) -> Self {
        Self::new(bbox.to_ring())
    }

    /// WGS84 extent of the ring.
    pub fn extent(&self) -> Option<BoundingBox> {
        BoundingBox::enclosing(&self.exterior)
    }
}

/// One coverage matched by a search.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultItem {
    pub identifier: String,
    pub footprint: Option<Footprint>,
    pub begin_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

impl ResultItem {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            footprint: None,
            begin_time: None,
            end_time: None,
        }
    }

    pub fn with_footprint(mut self, footprint: Footprint) -> Self {
        self.footprint = Some(footprint);
        self
    }

    pub fn with_begin_time(mut self, begin: DateTime<Utc>) -> Self {
        self.begin_time = Some(begin);
        self
    }

    pub fn with_end_time(mut self, end: DateTime<Utc>) -> Self {
        self.end_time = Some(end);
        self
    }

    /// Extent of the footprint as (minLon, minLat, maxLon, maxLat).
    pub fn extent_wgs84(&self) -> Option<BoundingBox> {
        self.footprint.as_ref().and_then(Footprint::extent)
    }

    /// Validity period; only defined when both ends are set.
    pub fn time_period(&self) -> Option<TimePeriod> {
        TimePeriod::from_parts(self.begin_time, self.end_time)
    }

    /// Check the fields every encoder depends on.
    pub fn validate(&self) -> OwsResult<()> {
        if self.identifier.trim().is_empty() {
            return Err(OwsError::MalformedItem(
                "result item has no identifier".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_extent_from_footprint() {
        let item = ResultItem::new("c1").with_footprint(Footprint::new(vec![
            [12.0, 41.0],
            [13.5, 40.0],
            [14.0, 42.5],
            [12.0, 41.0],
        ]));
        let extent = item.extent_wgs84().unwrap();
        assert_eq!(extent, BoundingBox::new(12.0, 40.0, 14.0, 42.5));
    }

    #[test]
    fn test_no_footprint_no_extent() {
        assert!(ResultItem::new("c1").extent_wgs84().is_none());
        let empty = ResultItem::new("c1").with_footprint(Footprint::new(Vec::new()));
        assert!(empty.extent_wgs84().is_none());
    }

    #[test]
    fn test_time_period_needs_both_ends() {
        let begin = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2020, 1, 2, 0, 0, 0).unwrap();

        assert!(ResultItem::new("c1").with_begin_time(begin).time_period().is_none());
        assert!(ResultItem::new("c1").with_end_time(end).time_period().is_none());

        let period = ResultItem::new("c1")
            .with_begin_time(begin)
            .with_end_time(end)
            .time_period()
            .unwrap();
        assert_eq!(period.begin, begin);
        assert_eq!(period.end, end);
    }

    #[test]
    fn test_validate_identifier() {
        assert!(ResultItem::new("c1").validate().is_ok());
        assert!(matches!(
            ResultItem::new("  ").validate(),
            Err(OwsError::MalformedItem(_))
        ));
    }
}
