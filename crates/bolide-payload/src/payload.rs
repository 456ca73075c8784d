//! The top-level payload document and notifier identity.

use serde::{Deserialize, Serialize};

use crate::event::Event;

/// Client name reported to the service.
pub const NOTIFIER_NAME: &str = "Bolide";

/// Homepage reported to the service.
pub const NOTIFIER_URL: &str = "https://github.com/bolide-rs/bolide";

/// Static identity of this client library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notifier {
    /// Client name.
    pub name: String,
    /// Client version.
    pub version: String,
    /// Client homepage.
    pub url: String,
}

impl Default for Notifier {
    fn default() -> Self {
        Self {
            name: NOTIFIER_NAME.to_owned(),
            version: env!("CARGO_PKG_VERSION").to_owned(),
            url: NOTIFIER_URL.to_owned(),
        }
    }
}

/// The serialised document handed to the transport.
///
/// The wire format supports several events per document; the reporting
/// pipeline emits exactly one per call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    /// API key identifying the receiving project.
    #[serde(rename = "apiKey")]
    pub api_key: String,

    /// Client identity.
    pub notifier: Notifier,

    /// Events carried by this document.
    pub events: Vec<Event>,
}

impl Payload {
    /// Wrap a single event into a payload.
    #[must_use]
    pub fn new(api_key: impl Into<String>, event: Event) -> Self {
        Self {
            api_key: api_key.into(),
            notifier: Notifier::default(),
            events: vec![event],
        }
    }

    /// Serialise the document for delivery.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notifier_identity() {
        let notifier = Notifier::default();
        assert_eq!(notifier.name, NOTIFIER_NAME);
        assert_eq!(notifier.url, NOTIFIER_URL);
        assert_eq!(notifier.version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn payload_wraps_one_event() {
        let payload = Payload::new("key-123", Event::new(vec![]));
        assert_eq!(payload.api_key, "key-123");
        assert_eq!(payload.events.len(), 1);
    }
}
