//! Versioned message envelope carried as the broker message body.

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::messaging::MessagingResult;

/// Versioned wrapper around an application payload.
///
/// The wire format is a JSON object `{"data_version": ..., "data": ...}`.
/// The concrete shape of `data` is contractually tied to `data_version`,
/// not to the exchange or routing key the envelope travels on, so consumers
/// must branch on the version before interpreting the payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    /// Schema version of the payload
    pub data_version: String,
    /// Opaque payload, interpreted according to `data_version`
    pub data: serde_json::Value,
}

impl Envelope {
    /// Wraps a payload under the given schema version.
    pub fn new<T: Serialize>(data_version: &str, data: &T) -> MessagingResult<Self> {
        Ok(Self {
            data_version: data_version.to_string(),
            data: serde_json::to_value(data)?,
        })
    }

    /// Deserializes the payload into a concrete type.
    ///
    /// Callers are expected to have checked `data_version` first.
    pub fn decode<T: DeserializeOwned>(&self) -> MessagingResult<T> {
        Ok(serde_json::from_value(self.data.clone())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Serialize, PartialEq)]
    struct Payload {
        id: String,
    }

    #[test]
    fn wire_format_uses_snake_case_fields() {
        let envelope = Envelope::new("1.0.0", &Payload { id: "t-1".into() }).unwrap();
        let json = serde_json::to_value(&envelope).unwrap();

        assert_eq!(json["data_version"], "1.0.0");
        assert_eq!(json["data"]["id"], "t-1");
    }

    #[test]
    fn decode_recovers_typed_payload() {
        let envelope = Envelope::new("1.0.0", &Payload { id: "t-2".into() }).unwrap();
        let payload: Payload = envelope.decode().unwrap();

        assert_eq!(payload, Payload { id: "t-2".into() });
    }

    #[test]
    fn decode_rejects_mismatched_shape() {
        let envelope = Envelope::new("1.0.0", &serde_json::json!({"id": 42})).unwrap();
        assert!(envelope.decode::<Payload>().is_err());
    }
}
