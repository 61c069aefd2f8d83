//! Envelope codec for typed event payloads.
//!
//! Events travel as opaque envelopes: a `type` discriminator plus a byte
//! payload encoding a typed record keyed by that discriminator. This module
//! defines the demo payload records, the [`EventPayload`] trait tying a
//! record to its type tag, and the [`PayloadRegistry`] used to decode
//! envelopes back into records.
//!
//! The transport and the queue never look inside `data`; an event whose
//! type has no registered decoder is stored and forwarded verbatim. Decoding
//! such an event is the only operation that fails, with
//! [`Error::UnknownEventType`].

use crate::{Error, Result, proto::Event};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::collections::HashMap;

/// A typed record that can be carried inside an [`Event`] envelope.
///
/// `TYPE` is the discriminator written into [`Event::type`]; the decoder
/// registered for that tag must be the exact inverse of [`encode`].
pub trait EventPayload: Serialize + DeserializeOwned {
    /// Type discriminator carried in the envelope's `type` field.
    const TYPE: &'static str;
}

/// Demo record emitted when a message is sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageSent {
    pub id: String,
    pub from: String,
    pub to: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Demo record emitted when a user is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserCreated {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl EventPayload for MessageSent {
    const TYPE: &'static str = "message_sent";
}

impl EventPayload for UserCreated {
    const TYPE: &'static str = "user_created";
}

/// A payload decoded from an envelope by one of the demo decoders.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    MessageSent(MessageSent),
    UserCreated(UserCreated),
}

/// Serializes `payload` into the opaque byte form carried by [`Event::data`].
pub fn encode<P: EventPayload>(payload: &P) -> Result<Bytes> {
    let encoded = serde_json::to_vec(payload).map_err(|source| Error::PayloadEncode {
        event_type: P::TYPE,
        source,
    })?;
    Ok(Bytes::from(encoded))
}

/// Wraps `payload` into a complete [`Event`] envelope.
pub fn envelope<P: EventPayload>(id: impl Into<String>, payload: &P) -> Result<Event> {
    Ok(Event {
        id: id.into(),
        r#type: P::TYPE.to_owned(),
        data: encode(payload)?,
    })
}

type DecodeFn = fn(&[u8]) -> Result<Payload>;

/// Registry mapping event type tags to decode functions.
///
/// Populated at startup, queried at decode time. Absence of a tag is the
/// [`Error::UnknownEventType`] condition, not a crash; malformed bytes for
/// a registered tag surface as [`Error::PayloadDecode`].
pub struct PayloadRegistry {
    decoders: HashMap<&'static str, DecodeFn>,
}

impl PayloadRegistry {
    /// Creates a registry with no decoders.
    pub fn new() -> Self {
        Self {
            decoders: HashMap::new(),
        }
    }

    /// Creates a registry with the demo decoders ([`MessageSent`] and
    /// [`UserCreated`]) registered.
    pub fn with_demo_payloads() -> Self {
        let mut registry = Self::new();
        registry.register(MessageSent::TYPE, |data| {
            Ok(Payload::MessageSent(decode_record::<MessageSent>(data)?))
        });
        registry.register(UserCreated::TYPE, |data| {
            Ok(Payload::UserCreated(decode_record::<UserCreated>(data)?))
        });
        registry
    }

    /// Registers `decode` for `event_type`, replacing any previous decoder
    /// for the same tag.
    pub fn register(&mut self, event_type: &'static str, decode: DecodeFn) {
        self.decoders.insert(event_type, decode);
    }

    /// Decodes `data` using the decoder registered for `event_type`.
    pub fn decode(&self, event_type: &str, data: &[u8]) -> Result<Payload> {
        let decode = self
            .decoders
            .get(event_type)
            .ok_or_else(|| Error::UnknownEventType {
                event_type: event_type.to_owned(),
            })?;
        decode(data)
    }

    /// Decodes a full envelope via [`decode`](Self::decode).
    pub fn decode_event(&self, event: &Event) -> Result<Payload> {
        self.decode(&event.r#type, &event.data)
    }
}

impl Default for PayloadRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn decode_record<P: EventPayload>(data: &[u8]) -> Result<P> {
    serde_json::from_slice(data).map_err(|source| Error::PayloadDecode {
        event_type: P::TYPE.to_owned(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message_sent() -> MessageSent {
        MessageSent {
            id: "m-1".to_owned(),
            from: "sender".to_owned(),
            to: "receiver".to_owned(),
            content: "hello".to_owned(),
            created_at: Utc::now(),
        }
    }

    fn user_created() -> UserCreated {
        UserCreated {
            id: "u-1".to_owned(),
            name: "user".to_owned(),
            email: "user@user.com".to_owned(),
        }
    }

    #[test]
    fn message_sent_round_trips() {
        let registry = PayloadRegistry::with_demo_payloads();
        let original = message_sent();

        let encoded = encode(&original).unwrap();
        let decoded = registry.decode(MessageSent::TYPE, &encoded).unwrap();

        assert_eq!(decoded, Payload::MessageSent(original));
    }

    #[test]
    fn user_created_round_trips() {
        let registry = PayloadRegistry::with_demo_payloads();
        let original = user_created();

        let encoded = encode(&original).unwrap();
        let decoded = registry.decode(UserCreated::TYPE, &encoded).unwrap();

        assert_eq!(decoded, Payload::UserCreated(original));
    }

    #[test]
    fn envelope_carries_tag_and_payload() {
        let registry = PayloadRegistry::with_demo_payloads();
        let original = user_created();

        let event = envelope("e-1", &original).unwrap();
        assert_eq!(event.id, "e-1");
        assert_eq!(event.r#type, UserCreated::TYPE);

        let decoded = registry.decode_event(&event).unwrap();
        assert_eq!(decoded, Payload::UserCreated(original));
    }

    #[test]
    fn unknown_type_is_reported_not_swallowed() {
        let registry = PayloadRegistry::with_demo_payloads();

        let err = registry.decode("nonexistent_type", b"{}").unwrap_err();
        assert!(matches!(
            err,
            Error::UnknownEventType { event_type } if event_type == "nonexistent_type"
        ));
    }

    #[test]
    fn malformed_payload_is_a_decode_failure() {
        let registry = PayloadRegistry::with_demo_payloads();

        let err = registry
            .decode(MessageSent::TYPE, b"not json at all")
            .unwrap_err();
        assert!(matches!(err, Error::PayloadDecode { .. }));
    }

    #[test]
    fn empty_registry_decodes_nothing() {
        let registry = PayloadRegistry::new();
        let encoded = encode(&user_created()).unwrap();

        let err = registry.decode(UserCreated::TYPE, &encoded).unwrap_err();
        assert!(matches!(err, Error::UnknownEventType { .. }));
    }
}
