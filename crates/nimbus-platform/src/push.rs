//! Push Service
//!
//! Subscription objects issued by the browser's push service, the seam for
//! creating/destroying them, and the application-server-key transform.

use std::sync::{Arc, Mutex};

use base64::alphabet;
use base64::engine::general_purpose::GeneralPurpose;
use base64::engine::GeneralPurposeConfig;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::error::PlatformError;

/// Raw length of an uncompressed P-256 public key
pub const SERVER_KEY_LEN: usize = 65;

/// A push subscription issued by the push service.
///
/// Serializes to the wire shape the backend expects:
/// `{"endpoint": ..., "keys": {"p256dh": ..., "auth": ...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushSubscription {
    pub endpoint: String,
    pub keys: SubscriptionKeys,
}

/// Key material carried by a subscription
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionKeys {
    pub p256dh: String,
    pub auth: String,
}

/// Seam over the browser push service
pub trait PushService {
    /// Create a subscription with the given raw application server key
    fn subscribe(&self, application_server_key: &[u8]) -> Result<PushSubscription, PlatformError>;

    /// The current subscription, if any
    fn subscription(&self) -> Option<PushSubscription>;

    /// Drop the current subscription. Returns false if none existed.
    fn unsubscribe(&self) -> bool;
}

/// Base64url decode failure
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid base64url input: {0}")]
pub struct KeyDecodeError(#[from] base64::DecodeError);

// `atob` ignores the unused low bits of the final symbol, so the decoder
// must too; the default engines reject them.
const LENIENT_STANDARD: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

/// Convert a URL-safe base64 server key to raw bytes.
///
/// Pads with `=` to a multiple of four characters, substitutes `-` -> `+`
/// and `_` -> `/`, then decodes as standard base64. The push service
/// validates the raw length downstream, so the transform itself must not
/// alter a single bit.
pub fn decode_server_key(encoded: &str) -> Result<Vec<u8>, KeyDecodeError> {
    let padding = "=".repeat((4 - encoded.len() % 4) % 4);
    let standard: String = encoded
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .chain(padding.chars())
        .collect();
    Ok(LENIENT_STANDARD.decode(standard.as_bytes())?)
}

/// In-memory push service with fabricated endpoints
#[derive(Clone, Default)]
pub struct InMemoryPushService {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    current: Option<PushSubscription>,
    issued: u64,
    unsubscribe_calls: u32,
}

impl InMemoryPushService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Service that already holds a subscription
    pub fn with_subscription(subscription: PushSubscription) -> Self {
        let service = Self::new();
        service.inner.lock().unwrap().current = Some(subscription);
        service
    }

    /// How many times `unsubscribe` has been called
    pub fn unsubscribe_calls(&self) -> u32 {
        self.inner.lock().unwrap().unsubscribe_calls
    }
}

impl PushService for InMemoryPushService {
    fn subscribe(&self, application_server_key: &[u8]) -> Result<PushSubscription, PlatformError> {
        if application_server_key.len() != SERVER_KEY_LEN {
            return Err(PlatformError::ServerKeyLength {
                expected: SERVER_KEY_LEN,
                actual: application_server_key.len(),
            });
        }

        let mut inner = self.inner.lock().unwrap();
        inner.issued += 1;
        let subscription = PushSubscription {
            endpoint: format!("https://push.example.net/send/{}", inner.issued),
            keys: SubscriptionKeys {
                p256dh: format!("p256dh-{}", inner.issued),
                auth: format!("auth-{}", inner.issued),
            },
        };
        inner.current = Some(subscription.clone());
        Ok(subscription)
    }

    fn subscription(&self) -> Option<PushSubscription> {
        self.inner.lock().unwrap().current.clone()
    }

    fn unsubscribe(&self) -> bool {
        let mut inner = self.inner.lock().unwrap();
        inner.unsubscribe_calls += 1;
        inner.current.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_server_key_pads_and_substitutes() {
        // "FOOBAR" needs two padding chars; atob-compatible decode
        let bytes = decode_server_key("FOOBAR").unwrap();
        assert_eq!(bytes, vec![0x14, 0xE3, 0x81, 0x01]);
    }

    #[test]
    fn test_decode_server_key_urlsafe_alphabet() {
        // '-' and '_' map onto '+' and '/'
        assert_eq!(decode_server_key("-_-_").unwrap(), decode_server_key("+/+/").unwrap());
    }

    #[test]
    fn test_decode_server_key_all_valid_lengths() {
        for encoded in ["QQ", "QUI", "QUJD", "QUJDRA"] {
            assert!(decode_server_key(encoded).is_ok(), "failed for {encoded}");
        }
    }

    #[test]
    fn test_decode_server_key_rejects_garbage() {
        assert!(decode_server_key("!!!").is_err());
    }

    #[test]
    fn test_subscribe_validates_key_length() {
        let service = InMemoryPushService::new();
        let err = service.subscribe(&[0u8; 64]).unwrap_err();
        assert!(matches!(err, PlatformError::ServerKeyLength { actual: 64, .. }));
        assert!(service.subscription().is_none());

        let subscription = service.subscribe(&[4u8; 65]).unwrap();
        assert_eq!(service.subscription().unwrap(), subscription);
    }

    #[test]
    fn test_unsubscribe_is_idempotent() {
        let service = InMemoryPushService::new();
        service.subscribe(&[4u8; 65]).unwrap();
        assert!(service.unsubscribe());
        assert!(!service.unsubscribe());
        assert_eq!(service.unsubscribe_calls(), 2);
    }

    #[test]
    fn test_subscription_wire_shape() {
        let subscription = PushSubscription {
            endpoint: "https://push.example.net/send/1".into(),
            keys: SubscriptionKeys {
                p256dh: "pk".into(),
                auth: "ak".into(),
            },
        };
        let json = serde_json::to_value(&subscription).unwrap();
        assert_eq!(json["endpoint"], "https://push.example.net/send/1");
        assert_eq!(json["keys"]["p256dh"], "pk");
        assert_eq!(json["keys"]["auth"], "ak");
    }
}
