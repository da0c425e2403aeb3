//! In-memory coverage catalog.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use opensearch_protocol::{Footprint, ResultItem};
use ows_common::{BoundingBox, TimePeriod};
use thiserror::Error;

use crate::config::{CollectionConfig, CoverageConfig};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Coverage '{0}' is defined more than once")]
    DuplicateCoverage(String),

    #[error("Collection '{0}' is defined more than once")]
    DuplicateCollection(String),

    #[error("Coverage '{id}' has an invalid extent: {message}")]
    InvalidExtent { id: String, message: String },
}

/// A coverage as served by the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct Coverage {
    pub id: String,
    pub collection: String,
    pub extent: Option<BoundingBox>,
    pub footprint: Option<Footprint>,
    pub begin_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub size: Option<[u32; 2]>,
    pub bands: Vec<String>,
}

impl Coverage {
    fn from_config(collection: &str, config: &CoverageConfig) -> Result<Self, CatalogError> {
        let invalid = |message: &str| CatalogError::InvalidExtent {
            id: config.id.clone(),
            message: message.to_string(),
        };

        let bbox = config
            .bbox
            .map(|[w, s, e, n]| BoundingBox::new(w, s, e, n));
        if let Some(bbox) = &bbox {
            if bbox.min_x > bbox.max_x || bbox.min_y > bbox.max_y {
                return Err(invalid("min corner exceeds max corner"));
            }
        }

        let footprint = match (&config.footprint, &bbox) {
            (Some(ring), _) if ring.len() < 4 => {
                return Err(invalid("footprint ring needs at least four positions"))
            }
            (Some(ring), _) => Some(Footprint::new(ring.clone())),
            (None, Some(bbox)) => Some(Footprint::from_bbox(bbox)),
            (None, None) => None,
        };
        let extent = bbox.or_else(|| footprint.as_ref().and_then(Footprint::extent));

        if let (Some(begin), Some(end)) = (config.begin_time, config.end_time) {
            if begin > end {
                return Err(invalid("begin_time is after end_time"));
            }
        }

        Ok(Self {
            id: config.id.clone(),
            collection: collection.to_string(),
            extent,
            footprint,
            begin_time: config.begin_time,
            end_time: config.end_time,
            size: config.size,
            bands: config.bands.clone(),
        })
    }

    fn matches(&self, query: &SearchQuery) -> bool {
        if let Some(bbox) = &query.bbox {
            match &self.extent {
                Some(extent) if extent.intersects(bbox) => {}
                _ => return false,
            }
        }

        if query.start.is_some() || query.end.is_some() {
            let begin = self.begin_time.or(self.end_time);
            let end = self.end_time.or(self.begin_time);
            match TimePeriod::from_parts(begin, end) {
                Some(period) if period.overlaps(query.start.as_ref(), query.end.as_ref()) => {}
                _ => return false,
            }
        }
        true
    }

    pub fn to_result_item(&self) -> ResultItem {
        ResultItem {
            identifier: self.id.clone(),
            footprint: self.footprint.clone(),
            begin_time: self.begin_time,
            end_time: self.end_time,
        }
    }
}

/// Filters and paging for a collection search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchQuery {
    pub bbox: Option<BoundingBox>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub count: usize,
    pub start_index: usize,
}

/// One page of matches.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPage {
    pub items: Vec<ResultItem>,
    pub total: usize,
}

/// Coverages grouped by collection, immutable after load.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    collections: BTreeMap<String, CollectionEntry>,
    coverages: HashMap<String, Coverage>,
}

#[derive(Debug, Clone)]
struct CollectionEntry {
    title: String,
    /// Coverage ids in configuration order.
    members: Vec<String>,
}

impl Catalog {
    pub fn from_config(collections: &[CollectionConfig]) -> Result<Self, CatalogError> {
        let mut catalog = Catalog::default();

        for collection in collections {
            if catalog.collections.contains_key(&collection.id) {
                return Err(CatalogError::DuplicateCollection(collection.id.clone()));
            }

            let mut members = Vec::with_capacity(collection.coverages.len());
            for config in &collection.coverages {
                let coverage = Coverage::from_config(&collection.id, config)?;
                if catalog.coverages.contains_key(&coverage.id) {
                    return Err(CatalogError::DuplicateCoverage(coverage.id));
                }
                members.push(coverage.id.clone());
                catalog.coverages.insert(coverage.id.clone(), coverage);
            }

            let title = if collection.title.is_empty() {
                collection.id.clone()
            } else {
                collection.title.clone()
            };
            catalog
                .collections
                .insert(collection.id.clone(), CollectionEntry { title, members });
        }

        Ok(catalog)
    }

    pub fn coverage(&self, id: &str) -> Option<&Coverage> {
        self.coverages.get(id)
    }

    /// All coverages, ordered by collection then configuration order.
    pub fn coverages(&self) -> impl Iterator<Item = &Coverage> {
        self.collections
            .values()
            .flat_map(|entry| entry.members.iter())
            .filter_map(|id| self.coverages.get(id))
    }

    /// Display title of a collection, defaulting to its id.
    pub fn collection_title(&self, id: &str) -> Option<&str> {
        self.collections.get(id).map(|entry| entry.title.as_str())
    }

    /// Matching coverages of a collection, paged. `None` for an unknown collection.
    pub fn search(&self, collection: &str, query: &SearchQuery) -> Option<SearchPage> {
        let entry = self.collections.get(collection)?;
        let matches: Vec<&Coverage> = entry
            .members
            .iter()
            .filter_map(|id| self.coverages.get(id))
            .filter(|coverage| coverage.matches(query))
            .collect();

        let items = matches
            .iter()
            .skip(query.start_index)
            .take(query.count)
            .map(|coverage| coverage.to_result_item())
            .collect();

        Some(SearchPage {
            items,
            total: matches.len(),
        })
    }

    pub fn len(&self) -> usize {
        self.coverages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coverages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn coverage(id: &str, bbox: [f64; 4], day: u32) -> CoverageConfig {
        CoverageConfig {
            id: id.to_string(),
            bbox: Some(bbox),
            footprint: None,
            begin_time: Some(Utc.with_ymd_and_hms(2020, 1, day, 0, 0, 0).unwrap()),
            end_time: Some(Utc.with_ymd_and_hms(2020, 1, day, 12, 0, 0).unwrap()),
            size: None,
            bands: Vec::new(),
        }
    }

    fn catalog() -> Catalog {
        Catalog::from_config(&[CollectionConfig {
            id: "s2".to_string(),
            title: String::new(),
            coverages: vec![
                coverage("a", [0.0, 0.0, 10.0, 10.0], 1),
                coverage("b", [20.0, 20.0, 30.0, 30.0], 2),
                coverage("c", [5.0, 5.0, 25.0, 25.0], 3),
            ],
        }])
        .unwrap()
    }

    fn query() -> SearchQuery {
        SearchQuery {
            count: 10,
            ..SearchQuery::default()
        }
    }

    fn ids(page: &SearchPage) -> Vec<&str> {
        page.items.iter().map(|i| i.identifier.as_str()).collect()
    }

    #[test]
    fn test_lookup() {
        let catalog = catalog();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.coverage("b").unwrap().collection, "s2");
        assert_eq!(catalog.collection_title("s2"), Some("s2"));
        assert!(catalog.coverage("z").is_none());
    }

    #[test]
    fn test_bbox_filter() {
        let page = catalog()
            .search(
                "s2",
                &SearchQuery {
                    bbox: Some(BoundingBox::new(0.0, 0.0, 6.0, 6.0)),
                    ..query()
                },
            )
            .unwrap();
        assert_eq!(ids(&page), vec!["a", "c"]);
        assert_eq!(page.total, 2);
    }

    #[test]
    fn test_time_filter() {
        let page = catalog()
            .search(
                "s2",
                &SearchQuery {
                    start: Some(Utc.with_ymd_and_hms(2020, 1, 2, 6, 0, 0).unwrap()),
                    ..query()
                },
            )
            .unwrap();
        assert_eq!(ids(&page), vec!["b", "c"]);
    }

    #[test]
    fn test_paging() {
        let page = catalog()
            .search(
                "s2",
                &SearchQuery {
                    count: 1,
                    start_index: 1,
                    ..query()
                },
            )
            .unwrap();
        assert_eq!(ids(&page), vec!["b"]);
        assert_eq!(page.total, 3);
    }

    #[test]
    fn test_unknown_collection() {
        assert!(catalog().search("landsat", &query()).is_none());
    }

    #[test]
    fn test_duplicate_coverage_rejected() {
        let result = Catalog::from_config(&[CollectionConfig {
            id: "s2".to_string(),
            title: String::new(),
            coverages: vec![
                coverage("a", [0.0, 0.0, 1.0, 1.0], 1),
                coverage("a", [0.0, 0.0, 1.0, 1.0], 2),
            ],
        }]);
        assert!(matches!(result, Err(CatalogError::DuplicateCoverage(_))));
    }

    #[test]
    fn test_inverted_extent_rejected() {
        let result = Catalog::from_config(&[CollectionConfig {
            id: "s2".to_string(),
            title: String::new(),
            coverages: vec![coverage("a", [10.0, 0.0, 0.0, 1.0], 1)],
        }]);
        assert!(matches!(result, Err(CatalogError::InvalidExtent { .. })));
    }
}
