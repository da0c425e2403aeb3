//! XML namespace bindings for feed documents.

use ows_common::{OwsError, OwsResult};

/// A prefix bound to a namespace URI. The empty prefix is the default namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Namespace {
    pub prefix: &'static str,
    pub uri: &'static str,
}

impl Namespace {
    pub const fn new(prefix: &'static str, uri: &'static str) -> Self {
        Self { prefix, uri }
    }

    /// Qualified name of `local` in this namespace.
    pub fn qname(&self, local: &str) -> String {
        if self.prefix.is_empty() {
            local.to_string()
        } else {
            format!("{}:{}", self.prefix, local)
        }
    }
}

pub const OPENSEARCH: Namespace = Namespace::new("os", "http://a9.com/-/spec/opensearch/1.1/");
pub const GEORSS: Namespace = Namespace::new("georss", "http://www.georss.org/georss");
pub const GML: Namespace = Namespace::new("gml", "http://www.opengis.net/gml");
pub const ATOM: Namespace = Namespace::new("atom", "http://www.w3.org/2005/Atom");
pub const GEO: Namespace = Namespace::new("geo", "http://a9.com/-/opensearch/extensions/geo/1.0/");
pub const TIME: Namespace = Namespace::new("time", "http://a9.com/-/opensearch/extensions/time/1.0/");

/// Prefixes XML itself reserves.
const XML_RESERVED: [&str; 2] = ["xml", "xmlns"];

/// Ordered prefix → URI bindings.
///
/// Insertion order is kept so that namespace declarations come out in a
/// stable order. Rebinding a prefix replaces its URI in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceMap {
    bindings: Vec<(String, String)>,
}

impl NamespaceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_namespaces(namespaces: &[Namespace]) -> Self {
        let mut map = Self::new();
        for ns in namespaces {
            map.insert(ns.prefix, ns.uri);
        }
        map
    }

    pub fn insert(&mut self, prefix: impl Into<String>, uri: impl Into<String>) {
        let prefix = prefix.into();
        let uri = uri.into();
        match self.bindings.iter_mut().find(|(p, _)| *p == prefix) {
            Some(binding) => binding.1 = uri,
            None => self.bindings.push((prefix, uri)),
        }
    }

    pub fn get(&self, prefix: &str) -> Option<&str> {
        self.bindings
            .iter()
            .find(|(p, _)| p == prefix)
            .map(|(_, u)| u.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.bindings.iter().map(|(p, u)| (p.as_str(), u.as_str()))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Layer `overlay` over these bindings.
    ///
    /// Overlay bindings win on collision, except that `reserved` prefixes (and
    /// `xml`/`xmlns`) may only be restated with the URI they already have.
    /// Any other rebinding, or a syntactically invalid prefix, fails with
    /// [`OwsError::UnsupportedContext`].
    pub fn merged(&self, overlay: &NamespaceMap, reserved: &[&str]) -> OwsResult<NamespaceMap> {
        let mut merged = self.clone();
        for (prefix, uri) in overlay.iter() {
            if XML_RESERVED.contains(&prefix) {
                return Err(OwsError::UnsupportedContext(format!(
                    "prefix '{}' is reserved by XML",
                    prefix
                )));
            }
            if prefix.contains(':') || prefix.chars().any(char::is_whitespace) {
                return Err(OwsError::UnsupportedContext(format!(
                    "'{}' is not a valid namespace prefix",
                    prefix
                )));
            }
            if reserved.contains(&prefix) && self.get(prefix) != Some(uri) {
                return Err(OwsError::UnsupportedContext(format!(
                    "prefix '{}' is reserved and cannot be bound to {}",
                    prefix, uri
                )));
            }
            merged.insert(prefix, uri);
        }
        Ok(merged)
    }

    /// `xmlns` attributes declaring every binding.
    pub fn declarations(&self) -> Vec<(String, String)> {
        self.iter()
            .map(|(prefix, uri)| {
                let name = if prefix.is_empty() {
                    "xmlns".to_string()
                } else {
                    format!("xmlns:{}", prefix)
                };
                (name, uri.to_string())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> NamespaceMap {
        let mut map = NamespaceMap::from_namespaces(&[GEORSS, GML]);
        map.insert("dc", "http://purl.org/dc/elements/1.1/");
        map
    }

    #[test]
    fn test_overlay_wins_and_keeps_order() {
        let mut overlay = NamespaceMap::new();
        overlay.insert("dc", "http://example.org/dc");
        overlay.insert("geo", GEO.uri);

        let merged = base().merged(&overlay, &["georss", "gml"]).unwrap();
        let prefixes: Vec<&str> = merged.iter().map(|(p, _)| p).collect();
        assert_eq!(prefixes, vec!["georss", "gml", "dc", "geo"]);
        assert_eq!(merged.get("dc"), Some("http://example.org/dc"));
    }

    #[test]
    fn test_reserved_prefix_may_be_restated() {
        let mut overlay = NamespaceMap::new();
        overlay.insert("gml", GML.uri);
        assert!(base().merged(&overlay, &["gml"]).is_ok());
    }

    #[test]
    fn test_reserved_prefix_collision_rejected() {
        let mut overlay = NamespaceMap::new();
        overlay.insert("gml", "http://www.opengis.net/gml/3.2");
        let err = base().merged(&overlay, &["gml"]).unwrap_err();
        assert!(matches!(err, OwsError::UnsupportedContext(_)));
    }

    #[test]
    fn test_xml_prefixes_rejected() {
        for prefix in ["xml", "xmlns"] {
            let mut overlay = NamespaceMap::new();
            overlay.insert(prefix, "http://example.org/");
            assert!(base().merged(&overlay, &[]).is_err());
        }
    }

    #[test]
    fn test_declarations() {
        let mut map = NamespaceMap::new();
        map.insert("", ATOM.uri);
        map.insert("os", OPENSEARCH.uri);
        assert_eq!(
            map.declarations(),
            vec![
                ("xmlns".to_string(), ATOM.uri.to_string()),
                ("xmlns:os".to_string(), OPENSEARCH.uri.to_string()),
            ]
        );
    }
}
