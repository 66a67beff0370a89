//! [`DiscoveryTransport`] backed by the `mdns-sd` responder.
//!
//! The responder daemon is started on first publish, so a machine without
//! multicast support only loses discovery, not the frontend.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Mutex;

use mdns_sd::{ServiceDaemon, ServiceInfo};

use super::{DiscoveryTransport, RegistrationHandle, ServiceRegistration};
use crate::error::{FrontendError, Result};

/// mDNS / DNS-SD publisher.
pub struct MdnsTransport {
    daemon: Mutex<Option<ServiceDaemon>>,
}

impl std::fmt::Debug for MdnsTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let started = self.daemon.lock().map(|d| d.is_some()).unwrap_or(false);
        f.debug_struct("MdnsTransport")
            .field("started", &started)
            .finish()
    }
}

impl Default for MdnsTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MdnsTransport {
    /// Creates a transport; the responder starts on first use.
    #[must_use]
    pub fn new() -> Self {
        Self {
            daemon: Mutex::new(None),
        }
    }

    fn with_daemon<T>(
        &self,
        service_type: &str,
        f: impl FnOnce(&ServiceDaemon) -> std::result::Result<T, mdns_sd::Error>,
    ) -> Result<T> {
        let fail = |message: String| FrontendError::DiscoveryPublish {
            service_type: service_type.to_string(),
            message,
        };
        let mut guard = self
            .daemon
            .lock()
            .map_err(|_| fail("mdns daemon lock poisoned".to_string()))?;
        if guard.is_none() {
            *guard = Some(ServiceDaemon::new().map_err(|e| fail(e.to_string()))?);
        }
        match guard.as_ref() {
            Some(daemon) => f(daemon).map_err(|e| fail(e.to_string())),
            None => Err(fail("mdns daemon unavailable".to_string())),
        }
    }
}

impl DiscoveryTransport for MdnsTransport {
    fn publish(&self, registration: &ServiceRegistration) -> Result<RegistrationHandle> {
        self.with_daemon(&registration.service_type, |daemon| {
            let info = service_info(registration)?;
            let fullname = info.get_fullname().to_string();
            daemon.register(info)?;
            Ok(RegistrationHandle::new(fullname))
        })
    }

    fn unpublish(&self, handle: RegistrationHandle) -> Result<()> {
        self.with_daemon(handle.as_str(), |daemon| {
            daemon.unregister(handle.as_str()).map(|_| ())
        })
    }
}

impl Drop for MdnsTransport {
    fn drop(&mut self) {
        if let Ok(mut guard) = self.daemon.lock()
            && let Some(daemon) = guard.take()
            && let Err(err) = daemon.shutdown()
        {
            tracing::debug!(error = %err, "mdns daemon shutdown failed");
        }
    }
}

/// Service record for `registration` in the `.local.` domain.
///
/// A specific host address is announced as is; a wildcard or unparsable
/// host lets the responder announce every interface address.
fn service_info(
    registration: &ServiceRegistration,
) -> std::result::Result<ServiceInfo, mdns_sd::Error> {
    let ty_domain = format!("{}.local.", registration.service_type);
    let host_name = format!("{}.local.", host_label(&registration.name));
    let properties: HashMap<String, String> = HashMap::new();

    match registration.host.parse::<IpAddr>() {
        Ok(ip) if !ip.is_unspecified() => ServiceInfo::new(
            &ty_domain,
            &registration.name,
            &host_name,
            ip,
            registration.port,
            properties,
        ),
        _ => Ok(ServiceInfo::new(
            &ty_domain,
            &registration.name,
            &host_name,
            "",
            registration.port,
            properties,
        )?
        .enable_addr_auto()),
    }
}

/// DNS label derived from an instance name: lowercase alphanumerics and
/// dashes only.
fn host_label(name: &str) -> String {
    let label: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    let label = label.trim_matches('-');
    if label.is_empty() {
        "mopidy".to_string()
    } else {
        label.to_string()
    }
}
