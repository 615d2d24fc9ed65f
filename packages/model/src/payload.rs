//! Payload codecs.
//!
//! A payload is stored as a [`TypedValue`] whose type names the text encoding
//! of the raw bytes. Codecs are plain values handed to the operations that
//! need them; nothing here is global.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{ModelError, Result};
use crate::value::TypedValue;

/// Converts raw payload bytes to and from their stored text form.
pub trait PayloadCodec: Send + Sync {
    /// The payload type this codec writes (`"base64"`, `"none"`, ...).
    fn name(&self) -> &str;

    fn encode(&self, bytes: &[u8]) -> String;

    fn decode(&self, text: &str) -> Result<Vec<u8>>;

    /// Whether this codec handles payloads of the given type.
    fn supports(&self, payload_type: &str) -> bool {
        self.name().eq_ignore_ascii_case(payload_type)
    }
}

/// Standard base64 with padding.
#[derive(Debug, Clone, Copy, Default)]
pub struct Base64Codec;

impl PayloadCodec for Base64Codec {
    fn name(&self) -> &str {
        "base64"
    }

    fn encode(&self, bytes: &[u8]) -> String {
        STANDARD.encode(bytes)
    }

    fn decode(&self, text: &str) -> Result<Vec<u8>> {
        STANDARD.decode(text.trim()).map_err(|e| ModelError::Payload {
            codec: self.name().to_string(),
            message: e.to_string(),
        })
    }
}

/// UTF-8 text stored as is.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainCodec;

impl PayloadCodec for PlainCodec {
    fn name(&self) -> &str {
        "none"
    }

    fn encode(&self, bytes: &[u8]) -> String {
        String::from_utf8_lossy(bytes).into_owned()
    }

    fn decode(&self, text: &str) -> Result<Vec<u8>> {
        Ok(text.as_bytes().to_vec())
    }
}

/// A set of codecs, selected by payload type.
pub struct PayloadCodecs {
    codecs: Vec<Box<dyn PayloadCodec>>,
}

impl PayloadCodecs {
    pub fn new() -> Self {
        Self { codecs: Vec::new() }
    }

    pub fn add(&mut self, codec: impl PayloadCodec + 'static) {
        self.codecs.push(Box::new(codec));
    }

    pub fn get(&self, payload_type: &str) -> Option<&dyn PayloadCodec> {
        self.codecs
            .iter()
            .find(|c| c.supports(payload_type))
            .map(|c| c.as_ref())
    }

    /// Decode a payload with the codec registered for its type.
    pub fn decode(&self, payload: &TypedValue) -> Result<Vec<u8>> {
        match self.get(&payload.value_type) {
            Some(codec) => codec.decode(&payload.value),
            None => Err(ModelError::Payload {
                codec: payload.value_type.clone(),
                message: "no codec registered".to_string(),
            }),
        }
    }

    /// Render a payload as text.
    ///
    /// - `""`: the raw value
    /// - `"cdata"`: the value, trimmed
    /// - a registered codec type: the decoded bytes as UTF-8
    /// - anything else: the raw value
    pub fn payload_as_string(&self, payload: &TypedValue) -> String {
        match payload.value_type.as_str() {
            "" => payload.value.clone(),
            "cdata" => payload.value.trim().to_string(),
            other => match self.get(other) {
                Some(codec) => match codec.decode(&payload.value) {
                    Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                    Err(e) => {
                        log::warn!("Could not decode payload: {}", e);
                        payload.value.clone()
                    }
                },
                None => payload.value.clone(),
            },
        }
    }
}

impl Default for PayloadCodecs {
    /// Base64 and plain text.
    fn default() -> Self {
        let mut codecs = Self::new();
        codecs.add(Base64Codec);
        codecs.add(PlainCodec);
        codecs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base64_encodes_and_decodes() {
        let codec = Base64Codec;
        let text = codec.encode(b"hello");
        assert_eq!(text, "aGVsbG8=");
        assert_eq!(codec.decode(&text).unwrap(), b"hello");
    }

    #[test]
    fn base64_rejects_garbage() {
        let err = Base64Codec.decode("not base64!!").unwrap_err();
        assert!(matches!(err, ModelError::Payload { .. }));
    }

    #[test]
    fn codec_lookup_ignores_case() {
        let codecs = PayloadCodecs::default();
        assert_eq!(codecs.get("BASE64").map(|c| c.name()), Some("base64"));
        assert!(codecs.get("hex").is_none());
    }

    #[test]
    fn payload_as_string_rules() {
        let codecs = PayloadCodecs::default();
        assert_eq!(
            codecs.payload_as_string(&TypedValue::new("", " raw ")),
            " raw "
        );
        assert_eq!(
            codecs.payload_as_string(&TypedValue::new("cdata", "  trimmed \n")),
            "trimmed"
        );
        assert_eq!(
            codecs.payload_as_string(&TypedValue::new("base64", "aGVsbG8=")),
            "hello"
        );
        assert_eq!(
            codecs.payload_as_string(&TypedValue::new("none", "hello")),
            "hello"
        );
        assert_eq!(
            codecs.payload_as_string(&TypedValue::new("application/x-custom", "v")),
            "v"
        );
    }

    #[test]
    fn undecodable_base64_falls_back_to_raw_value() {
        let codecs = PayloadCodecs::default();
        assert_eq!(
            codecs.payload_as_string(&TypedValue::new("base64", "%%%")),
            "%%%"
        );
    }

    #[test]
    fn empty_registry_has_no_codecs() {
        let codecs = PayloadCodecs::new();
        assert!(codecs.decode(&TypedValue::new("base64", "aGVsbG8=")).is_err());
        assert_eq!(
            codecs.payload_as_string(&TypedValue::new("base64", "aGVsbG8=")),
            "aGVsbG8="
        );
    }
}
