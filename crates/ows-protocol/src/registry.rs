//! Capability registry: maps (service, version, operation) to handlers.
//!
//! The registry is assembled with a [`CapabilityRegistryBuilder`] during
//! startup. [`CapabilityRegistryBuilder::build`] consumes the builder, and the
//! resulting [`CapabilityRegistry`] exposes no way to add handlers, so it can
//! be shared across request tasks behind an `Arc` without locking.

use std::collections::HashMap;
use std::sync::Arc;

use ows_common::{OwsError, OwsResult};
use tracing::debug;

use crate::capability::{CapabilityDescriptor, VersionSpec};
use crate::handler::OwsHandler;

type CapabilityKey = (String, VersionSpec, String);

struct Registration {
    descriptor: CapabilityDescriptor,
    handler: Arc<dyn OwsHandler>,
}

/// Collects handler registrations before the registry is frozen.
#[derive(Default)]
pub struct CapabilityRegistryBuilder {
    registrations: HashMap<CapabilityKey, Registration>,
    default_versions: HashMap<String, String>,
}

impl CapabilityRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a descriptor.
    ///
    /// Fails with [`OwsError::DuplicateCapability`] when an equal descriptor
    /// is already registered.
    pub fn register(
        &mut self,
        descriptor: CapabilityDescriptor,
        handler: Arc<dyn OwsHandler>,
    ) -> OwsResult<&mut Self> {
        let key = descriptor.key();
        if self.registrations.contains_key(&key) {
            return Err(OwsError::DuplicateCapability(descriptor.to_string()));
        }
        debug!(capability = %descriptor, "Registered OWS capability");
        self.registrations
            .insert(key, Registration { descriptor, handler });
        Ok(self)
    }

    /// Declare the version used when a request for `service` names none.
    pub fn default_version(&mut self, service: &str, version: impl Into<String>) -> &mut Self {
        self.default_versions
            .insert(service.to_ascii_uppercase(), version.into());
        self
    }

    /// Freeze the registrations into an immutable registry.
    pub fn build(self) -> CapabilityRegistry {
        CapabilityRegistry {
            registrations: self.registrations,
            default_versions: self.default_versions,
        }
    }
}

/// Immutable lookup table from capability descriptors to handlers.
pub struct CapabilityRegistry {
    registrations: HashMap<CapabilityKey, Registration>,
    default_versions: HashMap<String, String>,
}

impl CapabilityRegistry {
    pub fn builder() -> CapabilityRegistryBuilder {
        CapabilityRegistryBuilder::new()
    }

    /// Find the handler for a request.
    ///
    /// Precedence:
    /// 1. exact (service, version, operation) match;
    /// 2. a wildcard-version registration for (service, operation);
    /// 3. when no version was requested, the service's default version.
    ///
    /// Anything else fails with [`OwsError::UnknownCapability`].
    pub fn resolve(
        &self,
        service: &str,
        version: Option<&str>,
        operation: &str,
    ) -> OwsResult<Arc<dyn OwsHandler>> {
        let service_key = service.to_ascii_uppercase();
        let operation_key = operation.to_ascii_lowercase();

        let lookup = |version: VersionSpec| {
            self.registrations
                .get(&(service_key.clone(), version, operation_key.clone()))
                .map(|r| Arc::clone(&r.handler))
        };

        let exact = version.and_then(|v| lookup(VersionSpec::Exact(v.to_string())));
        let resolved = exact.or_else(|| lookup(VersionSpec::Any)).or_else(|| {
            if version.is_some() {
                return None;
            }
            self.default_versions
                .get(&service_key)
                .and_then(|default| lookup(VersionSpec::Exact(default.clone())))
        });

        resolved.ok_or_else(|| OwsError::UnknownCapability {
            service: service.to_string(),
            version: version.map(str::to_string),
            operation: operation.to_string(),
        })
    }

    /// Exact versions registered for (service, operation), sorted.
    pub fn versions_for(&self, service: &str, operation: &str) -> Vec<&str> {
        let service_key = service.to_ascii_uppercase();
        let operation_key = operation.to_ascii_lowercase();
        let mut versions: Vec<&str> = self
            .registrations
            .keys()
            .filter(|(s, _, o)| *s == service_key && *o == operation_key)
            .filter_map(|(_, v, _)| match v {
                VersionSpec::Exact(v) => Some(v.as_str()),
                VersionSpec::Any => None,
            })
            .collect();
        versions.sort_unstable();
        versions
    }

    /// Operation names registered for a service, sorted and deduplicated.
    pub fn operations_for(&self, service: &str) -> Vec<&str> {
        let service_key = service.to_ascii_uppercase();
        let mut operations: Vec<&str> = self
            .registrations
            .values()
            .filter(|r| r.descriptor.service() == service_key)
            .map(|r| r.descriptor.operation())
            .collect();
        operations.sort_unstable();
        operations.dedup();
        operations
    }

    /// The declared default version of a service, if any.
    pub fn default_version(&self, service: &str) -> Option<&str> {
        self.default_versions
            .get(&service.to_ascii_uppercase())
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}
