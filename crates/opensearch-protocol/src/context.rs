//! Per-request search metadata passed to result formats.

use std::collections::BTreeMap;

use crate::namespaces::{Namespace, NamespaceMap};

/// What the search did to produce a page of results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchContext {
    /// Namespace bindings contributed by the query's extensions.
    pub namespaces: NamespaceMap,
    /// Parameters actually applied, grouped by extension prefix
    /// (e.g. `geo` → `box` → `"0,0,10,10"`).
    pub parameters: BTreeMap<String, BTreeMap<String, String>>,
    /// Number of matches before paging.
    pub total_results: usize,
    /// Requested page size.
    pub items_per_page: usize,
    /// Zero-based offset of the first item on this page.
    pub start_index: usize,
}

impl SearchContext {
    pub fn new(total_results: usize, items_per_page: usize, start_index: usize) -> Self {
        Self {
            total_results,
            items_per_page,
            start_index,
            ..Self::default()
        }
    }

    /// Record an applied extension parameter and bind its namespace.
    pub fn with_parameter(
        mut self,
        extension: Namespace,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.namespaces.insert(extension.prefix, extension.uri);
        self.parameters
            .entry(extension.prefix.to_string())
            .or_default()
            .insert(name.into(), value.into());
        self
    }

    /// Whether any parameter of the given extension was applied.
    pub fn uses(&self, extension: &str) -> bool {
        self.parameters.contains_key(extension)
    }

    /// Start indices of the neighbouring pages.
    pub fn paging(&self) -> Paging {
        let per_page = self.items_per_page;
        if per_page == 0 {
            return Paging {
                first: 0,
                previous: None,
                next: None,
                last: 0,
            };
        }

        let last = self.total_results.saturating_sub(1) / per_page * per_page;
        Paging {
            first: 0,
            previous: (self.start_index > 0).then(|| self.start_index.saturating_sub(per_page)),
            next: self
                .start_index
                .checked_add(per_page)
                .filter(|next| *next < self.total_results),
            last,
        }
    }
}

/// Zero-based start indices for feed navigation links.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paging {
    pub first: usize,
    pub previous: Option<usize>,
    pub next: Option<usize>,
    pub last: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::namespaces::GEO;

    #[test]
    fn test_with_parameter_binds_namespace() {
        let ctx = SearchContext::new(0, 10, 0).with_parameter(GEO, "box", "0,0,1,1");
        assert!(ctx.uses("geo"));
        assert!(!ctx.uses("time"));
        assert_eq!(ctx.namespaces.get("geo"), Some(GEO.uri));
        assert_eq!(ctx.parameters["geo"]["box"], "0,0,1,1");
    }

    #[test]
    fn test_paging_middle_page() {
        let paging = SearchContext::new(25, 10, 10).paging();
        assert_eq!(paging.first, 0);
        assert_eq!(paging.previous, Some(0));
        assert_eq!(paging.next, Some(20));
        assert_eq!(paging.last, 20);
    }

    #[test]
    fn test_paging_first_and_last_pages() {
        let first = SearchContext::new(25, 10, 0).paging();
        assert_eq!(first.previous, None);
        assert_eq!(first.next, Some(10));

        let last = SearchContext::new(25, 10, 20).paging();
        assert_eq!(last.previous, Some(10));
        assert_eq!(last.next, None);
    }

    #[test]
    fn test_paging_unaligned_offset() {
        let paging = SearchContext::new(25, 10, 5).paging();
        assert_eq!(paging.previous, Some(0));
        assert_eq!(paging.next, Some(15));
    }

    #[test]
    fn test_paging_offset_near_usize_max() {
        let paging = SearchContext::new(10, 10, usize::MAX).paging();
        assert_eq!(paging.next, None);
        assert_eq!(paging.previous, Some(usize::MAX - 10));
        assert_eq!(paging.last, 0);
    }

    #[test]
    fn test_paging_empty_result() {
        let paging = SearchContext::new(0, 10, 0).paging();
        assert_eq!(paging.next, None);
        assert_eq!(paging.last, 0);
    }
}
