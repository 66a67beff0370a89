//! Two-slot discovery registrar.

use std::sync::Arc;

use super::{
    DiscoveryTransport, HTTP_SERVICE_TYPE, MOPIDY_HTTP_SERVICE_TYPE, RegistrationHandle,
    ServiceRegistration,
};
use crate::config::FrontendConfig;

#[derive(Debug)]
enum SlotState {
    Unpublished,
    Published(RegistrationHandle),
}

#[derive(Debug)]
struct Slot {
    service_type: &'static str,
    label: &'static str,
    state: SlotState,
}

impl Slot {
    const fn new(service_type: &'static str, label: &'static str) -> Self {
        Self {
            service_type,
            label,
            state: SlotState::Unpublished,
        }
    }
}

/// Keeps the HTTP and Mopidy-HTTP records in step with the server.
///
/// Each slot moves `unpublished -> published -> unpublished` on its own;
/// one slot failing never affects the other.
#[derive(Debug)]
pub struct Registrar {
    transport: Arc<dyn DiscoveryTransport>,
    slots: [Slot; 2],
}

impl Registrar {
    /// Creates a registrar with both slots unpublished.
    #[must_use]
    pub fn new(transport: Arc<dyn DiscoveryTransport>) -> Self {
        Self {
            transport,
            slots: [
                Slot::new(HTTP_SERVICE_TYPE, "HTTP"),
                Slot::new(MOPIDY_HTTP_SERVICE_TYPE, "Mopidy-HTTP"),
            ],
        }
    }

    /// Publishes both records for `config`.
    ///
    /// Does nothing when `zeroconf_name` is unset or blank. Slots that are already
    /// published are left alone. Failures are logged, never returned.
    pub fn enable(&mut self, config: &FrontendConfig) {
        let Some(template) = config
            .zeroconf_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
        else {
            tracing::debug!("zeroconf disabled by configuration");
            return;
        };
        let Ok(port) = config.port_u16() else {
            tracing::warn!(port = config.port, "not registering with zeroconf: invalid port");
            return;
        };
        let name = expand_name(template, &config.hostname, port);

        for slot in &mut self.slots {
            if matches!(slot.state, SlotState::Published(_)) {
                continue;
            }
            let registration = ServiceRegistration {
                service_type: slot.service_type.to_string(),
                name: name.clone(),
                host: config.hostname.clone(),
                port,
            };
            match self.transport.publish(&registration) {
                Ok(handle) => {
                    tracing::debug!(
                        service = slot.label,
                        name = %registration.name,
                        "registered with zeroconf"
                    );
                    slot.state = SlotState::Published(handle);
                }
                Err(err) => {
                    tracing::warn!(
                        service = slot.label,
                        error = %err,
                        "registering with zeroconf failed"
                    );
                }
            }
        }
    }

    /// Withdraws every published record. Failures are logged.
    pub fn disable(&mut self) {
        for slot in &mut self.slots {
            let SlotState::Published(handle) =
                std::mem::replace(&mut slot.state, SlotState::Unpublished)
            else {
                continue;
            };
            match self.transport.unpublish(handle) {
                Ok(()) => tracing::debug!(service = slot.label, "unregistered from zeroconf"),
                Err(err) => tracing::warn!(
                    service = slot.label,
                    error = %err,
                    "unregistering from zeroconf failed"
                ),
            }
        }
    }

    /// Service types currently published.
    #[must_use]
    pub fn published(&self) -> Vec<&'static str> {
        self.slots
            .iter()
            .filter(|slot| matches!(slot.state, SlotState::Published(_)))
            .map(|slot| slot.service_type)
            .collect()
    }
}

/// Expands `$hostname` / `${hostname}` and `$port` / `${port}` in `template`.
///
/// Wildcard bind addresses are replaced by the machine's host name.
#[must_use]
pub fn expand_name(template: &str, hostname: &str, port: u16) -> String {
    let host = if is_wildcard(hostname) {
        system_hostname()
    } else {
        hostname.to_string()
    };
    let port = port.to_string();
    template
        .replace("${hostname}", &host)
        .replace("$hostname", &host)
        .replace("${port}", &port)
        .replace("$port", &port)
}

fn is_wildcard(hostname: &str) -> bool {
    matches!(hostname.trim(), "" | "0.0.0.0" | "::" | "[::]")
}

fn system_hostname() -> String {
    std::env::var("HOSTNAME")
        .ok()
        .or_else(|| std::fs::read_to_string("/etc/hostname").ok())
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| "localhost".to_string())
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::error::{FrontendError, Result};

    #[derive(Debug, Default)]
    struct RecordingTransport {
        fail_types: Vec<&'static str>,
        published: Mutex<Vec<ServiceRegistration>>,
        unpublished: Mutex<Vec<RegistrationHandle>>,
    }

    impl RecordingTransport {
        fn failing(service_type: &'static str) -> Self {
            Self {
                fail_types: vec![service_type],
                ..Self::default()
            }
        }

        fn published(&self) -> Vec<ServiceRegistration> {
            self.published.lock().map(|v| v.clone()).unwrap_or_default()
        }

        fn unpublished(&self) -> Vec<RegistrationHandle> {
            self.unpublished.lock().map(|v| v.clone()).unwrap_or_default()
        }
    }

    impl DiscoveryTransport for RecordingTransport {
        fn publish(&self, registration: &ServiceRegistration) -> Result<RegistrationHandle> {
            if let Ok(mut published) = self.published.lock() {
                published.push(registration.clone());
            }
            if self.fail_types.contains(&registration.service_type.as_str()) {
                return Err(FrontendError::DiscoveryPublish {
                    service_type: registration.service_type.clone(),
                    message: "no responder".to_string(),
                });
            }
            Ok(RegistrationHandle::new(format!(
                "{}.{}.local.",
                registration.name, registration.service_type
            )))
        }

        fn unpublish(&self, handle: RegistrationHandle) -> Result<()> {
            if let Ok(mut unpublished) = self.unpublished.lock() {
                unpublished.push(handle);
            }
            Ok(())
        }
    }

    fn config(name: Option<&str>) -> FrontendConfig {
        let config = FrontendConfig::new("127.0.0.1", 6680);
        match name {
            Some(name) => config.with_zeroconf_name(name),
            None => config,
        }
    }

    #[test]
    fn absent_name_never_publishes() {
        let transport = Arc::new(RecordingTransport::default());
        let mut registrar = Registrar::new(Arc::clone(&transport) as Arc<dyn DiscoveryTransport>);
        registrar.enable(&config(None));
        assert!(transport.published().is_empty());
        assert!(registrar.published().is_empty());
    }

    #[test]
    fn enable_publishes_both_records() {
        let transport = Arc::new(RecordingTransport::default());
        let mut registrar = Registrar::new(Arc::clone(&transport) as Arc<dyn DiscoveryTransport>);
        registrar.enable(&config(Some("Test")));

        let published = transport.published();
        assert_eq!(published.len(), 2);
        assert!(published.iter().all(|r| r.name == "Test" && r.port == 6680));
        let types: Vec<&str> = published.iter().map(|r| r.service_type.as_str()).collect();
        assert_eq!(types, vec![HTTP_SERVICE_TYPE, MOPIDY_HTTP_SERVICE_TYPE]);
        assert_eq!(registrar.published(), types);
    }

    #[test]
    fn one_failing_slot_does_not_block_the_other() {
        let transport = Arc::new(RecordingTransport::failing(HTTP_SERVICE_TYPE));
        let mut registrar = Registrar::new(Arc::clone(&transport) as Arc<dyn DiscoveryTransport>);
        registrar.enable(&config(Some("Test")));

        assert_eq!(transport.published().len(), 2);
        assert_eq!(registrar.published(), vec![MOPIDY_HTTP_SERVICE_TYPE]);
    }

    #[test]
    fn enable_twice_does_not_duplicate() {
        let transport = Arc::new(RecordingTransport::default());
        let mut registrar = Registrar::new(Arc::clone(&transport) as Arc<dyn DiscoveryTransport>);
        registrar.enable(&config(Some("Test")));
        registrar.enable(&config(Some("Test")));
        assert_eq!(transport.published().len(), 2);
    }

    #[test]
    fn disable_unpublishes_only_published_slots() {
        let transport = Arc::new(RecordingTransport::failing(MOPIDY_HTTP_SERVICE_TYPE));
        let mut registrar = Registrar::new(Arc::clone(&transport) as Arc<dyn DiscoveryTransport>);
        registrar.enable(&config(Some("Test")));
        registrar.disable();
        registrar.disable();

        let unpublished = transport.unpublished();
        assert_eq!(unpublished.len(), 1);
        assert_eq!(
            unpublished.first().map(RegistrationHandle::as_str),
            Some("Test._http._tcp.local.")
        );
        assert!(registrar.published().is_empty());
    }

    #[test]
    fn name_template_expands_host_and_port() {
        assert_eq!(
            expand_name("Mopidy on $hostname:${port}", "kitchen.lan", 6680),
            "Mopidy on kitchen.lan:6680"
        );
        let expanded = expand_name("Mopidy on $hostname", "0.0.0.0", 6680);
        assert!(!expanded.contains("0.0.0.0"));
        assert!(!expanded.contains('$'));
    }
}
