//! Zeroconf (mDNS / DNS-SD) advertisement of the HTTP frontend.
//!
//! The [`Registrar`] owns two independent registration slots, one generic
//! `_http._tcp` record and one `_mopidy-http._tcp` record. Records travel
//! through a [`DiscoveryTransport`]; [`MdnsTransport`] is the real one.
//! Every discovery failure is logged and swallowed.

pub mod mdns;
pub mod registrar;

pub use mdns::MdnsTransport;
pub use registrar::Registrar;

use crate::error::Result;

/// Service type of the generic HTTP record.
pub const HTTP_SERVICE_TYPE: &str = "_http._tcp";

/// Service type of the protocol-specific record.
pub const MOPIDY_HTTP_SERVICE_TYPE: &str = "_mopidy-http._tcp";

/// A record to advertise on the local network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRegistration {
    /// DNS-SD service type, e.g. `_http._tcp`.
    pub service_type: String,
    /// Instance name, after template expansion.
    pub name: String,
    /// Host the service is bound to.
    pub host: String,
    /// TCP port the service listens on.
    pub port: u16,
}

/// Opaque token returned by a successful publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationHandle(String);

impl RegistrationHandle {
    /// Wraps a transport-specific identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Transport-specific identifier (the full DNS-SD name for mDNS).
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Publishes and withdraws service records.
pub trait DiscoveryTransport: Send + Sync + std::fmt::Debug {
    /// Advertises `registration`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::FrontendError::DiscoveryPublish`] when the
    /// record could not be announced.
    fn publish(&self, registration: &ServiceRegistration) -> Result<RegistrationHandle>;

    /// Withdraws a record previously returned by [`Self::publish`].
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::FrontendError::DiscoveryPublish`] when the
    /// goodbye could not be sent.
    fn unpublish(&self, handle: RegistrationHandle) -> Result<()>;
}
