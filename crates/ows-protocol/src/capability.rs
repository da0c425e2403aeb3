//! Capability descriptors: the (service, version, operation) registry key.

use std::fmt;

/// Protocol version a capability is registered for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VersionSpec {
    /// Exactly this version string.
    Exact(String),
    /// Any version of the service; used when no exact registration matches.
    Any,
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionSpec::Exact(v) => f.write_str(v),
            VersionSpec::Any => f.write_str("*"),
        }
    }
}

/// Identifies which handler services a request.
///
/// Service names are stored upper-cased and operation names lower-cased so
/// that equality ignores case on both, while versions compare exactly.
/// The operation name as written at registration is kept for display.
#[derive(Debug, Clone)]
pub struct CapabilityDescriptor {
    service: String,
    version: VersionSpec,
    operation: String,
    operation_key: String,
}

impl CapabilityDescriptor {
    pub fn new(
        service: impl AsRef<str>,
        version: impl Into<String>,
        operation: impl Into<String>,
    ) -> Self {
        Self::with_version(service, VersionSpec::Exact(version.into()), operation)
    }

    /// A descriptor matching every version of `service`.
    pub fn any_version(service: impl AsRef<str>, operation: impl Into<String>) -> Self {
        Self::with_version(service, VersionSpec::Any, operation)
    }

    pub fn with_version(
        service: impl AsRef<str>,
        version: VersionSpec,
        operation: impl Into<String>,
    ) -> Self {
        let operation = operation.into();
        Self {
            service: service.as_ref().to_ascii_uppercase(),
            version,
            operation_key: operation.to_ascii_lowercase(),
            operation,
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn version(&self) -> &VersionSpec {
        &self.version
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub(crate) fn key(&self) -> (String, VersionSpec, String) {
        (
            self.service.clone(),
            self.version.clone(),
            self.operation_key.clone(),
        )
    }
}

impl PartialEq for CapabilityDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.service == other.service
            && self.version == other.version
            && self.operation_key == other.operation_key
    }
}

impl Eq for CapabilityDescriptor {}

impl fmt::Display for CapabilityDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.service, self.version, self.operation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_ignores_case_except_version() {
        let a = CapabilityDescriptor::new("wcs", "2.0.1", "DescribeCoverage");
        let b = CapabilityDescriptor::new("WCS", "2.0.1", "describecoverage");
        let c = CapabilityDescriptor::new("WCS", "2.0.0", "DescribeCoverage");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_display() {
        let d = CapabilityDescriptor::any_version("wcs", "GetCapabilities");
        assert_eq!(d.to_string(), "WCS/*/GetCapabilities");
    }
}
