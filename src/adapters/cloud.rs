//! Cloud publisher adapter.
//!
//! Implements [`PublishPort`] on top of an MQTT session.  Each report is
//! enqueued on `<prefix>/<visibility>/<label>`; delivery happens on the
//! client's own task after `publish` returns.
//!
//! ## cfg gating
//!
//! - **`feature = "espidf"`**: `esp_idf_svc::mqtt::client::EspMqttClient`.
//!   The session flag is driven by the client's event callback.
//! - **otherwise**: an in-memory simulation that records every message.

use core::fmt::Write as _;

use log::{info, warn};

use crate::app::ports::{PublishPort, PublishRequest};
use crate::config::Visibility;
use crate::error::PublishError;

pub type Topic = heapless::String<64>;

/// `<prefix>/<private|public>/<label>`
pub fn topic_for(prefix: &str, request: &PublishRequest<'_>) -> Result<Topic, PublishError> {
    let scope = match request.visibility {
        Visibility::Private => "private",
        Visibility::Public => "public",
    };
    let mut topic = Topic::new();
    write!(topic, "{}/{}/{}", prefix, scope, request.label)
        .map_err(|_| PublishError::PayloadTooLong)?;
    Ok(topic)
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF implementation
// ───────────────────────────────────────────────────────────────

#[cfg(feature = "espidf")]
mod platform {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use esp_idf_svc::mqtt::client::{EspMqttClient, EventPayload, MqttClientConfiguration, QoS};
    use esp_idf_svc::sys::EspError;
    use log::{info, warn};

    use super::Topic;
    use crate::error::PublishError;

    pub struct Session {
        client: EspMqttClient<'static>,
        connected: Arc<AtomicBool>,
    }

    impl Session {
        pub fn open(broker_url: &str, client_id: &str) -> Result<Self, EspError> {
            let connected = Arc::new(AtomicBool::new(false));
            let flag = Arc::clone(&connected);
            let conf = MqttClientConfiguration {
                client_id: Some(client_id),
                ..Default::default()
            };

            let client = EspMqttClient::new_cb(broker_url, &conf, move |event| {
                match event.payload() {
                    EventPayload::Connected(_) => {
                        info!("Cloud: session up");
                        flag.store(true, Ordering::Release);
                    }
                    EventPayload::Disconnected => {
                        warn!("Cloud: session down");
                        flag.store(false, Ordering::Release);
                    }
                    _ => {}
                }
            })?;

            Ok(Self { client, connected })
        }

        pub fn is_connected(&self) -> bool {
            self.connected.load(Ordering::Acquire)
        }

        pub fn enqueue(&mut self, topic: &Topic, payload: &str) -> Result<(), PublishError> {
            self.client
                .enqueue(topic, QoS::AtLeastOnce, false, payload.as_bytes())
                .map(|_| ())
                .map_err(|e| {
                    warn!("Cloud: enqueue on {} failed: {}", topic, e);
                    PublishError::Rejected
                })
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Host simulation
// ───────────────────────────────────────────────────────────────

#[cfg(not(feature = "espidf"))]
mod platform {
    use super::Topic;
    use crate::error::PublishError;

    #[derive(Default)]
    pub struct Session {
        pub connected: bool,
        pub reject_next: bool,
        pub sent: Vec<(Topic, String)>,
    }

    impl Session {
        pub fn is_connected(&self) -> bool {
            self.connected
        }

        pub fn enqueue(&mut self, topic: &Topic, payload: &str) -> Result<(), PublishError> {
            if core::mem::take(&mut self.reject_next) {
                return Err(PublishError::Rejected);
            }
            self.sent.push((topic.clone(), payload.to_string()));
            Ok(())
        }
    }
}

// ───────────────────────────────────────────────────────────────
// CloudPublisher
// ───────────────────────────────────────────────────────────────

pub struct CloudPublisher {
    session: platform::Session,
    prefix: &'static str,
    published: u32,
}

impl CloudPublisher {
    /// Open the MQTT session.  Connection completes in the background;
    /// `is_connected` turns true once the broker acknowledges.
    #[cfg(feature = "espidf")]
    pub fn connect(
        broker_url: &str,
        client_id: &str,
        prefix: &'static str,
    ) -> Result<Self, esp_idf_svc::sys::EspError> {
        info!("Cloud: connecting to {} as {}", broker_url, client_id);
        Ok(Self {
            session: platform::Session::open(broker_url, client_id)?,
            prefix,
            published: 0,
        })
    }

    /// Simulation: a disconnected session.
    #[cfg(not(feature = "espidf"))]
    pub fn simulated(prefix: &'static str) -> Self {
        Self {
            session: platform::Session::default(),
            prefix,
            published: 0,
        }
    }

    #[cfg(not(feature = "espidf"))]
    pub fn set_connected(&mut self, connected: bool) {
        self.session.connected = connected;
    }

    #[cfg(not(feature = "espidf"))]
    pub fn reject_next(&mut self) {
        self.session.reject_next = true;
    }

    /// Simulation: everything enqueued so far.
    #[cfg(not(feature = "espidf"))]
    pub fn sent(&self) -> &[(Topic, String)] {
        &self.session.sent
    }

    /// Messages accepted by the transport since boot.
    pub fn published(&self) -> u32 {
        self.published
    }
}

impl PublishPort for CloudPublisher {
    fn is_connected(&self) -> bool {
        self.session.is_connected()
    }

    fn publish(&mut self, request: &PublishRequest<'_>) -> Result<(), PublishError> {
        if !self.session.is_connected() {
            return Err(PublishError::NotConnected);
        }
        let topic = topic_for(self.prefix, request)?;

        // MQTT 3.1.1 has no per-message expiry; the TTL is informational.
        self.session.enqueue(&topic, request.payload).inspect_err(|e| {
            warn!("Cloud: {} not sent ({})", topic, e);
        })?;

        self.published = self.published.wrapping_add(1);
        info!(
            "Cloud: {} <- {} (ttl {} s)",
            topic, request.payload, request.ttl_secs
        );
        Ok(())
    }
}
