use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::envelope::Envelope;
use crate::error::{CodecError, CodecResult};
use crate::references::ReferenceTable;

/// Envelope fields that must be present for a document to decode.
const REQUIRED_FIELDS: &[&str] = &["typeName", "jsonData"];

/// Codec for encoding/decoding config envelopes and their sub-documents.
///
/// Encoding is pure. Decoding validates the envelope shape but leaves the
/// payload and reference documents as opaque strings.
#[derive(Clone, Copy, Debug)]
pub struct EnvelopeCodec {
    pretty: bool,
}

impl Default for EnvelopeCodec {
    fn default() -> Self {
        Self::pretty()
    }
}

impl EnvelopeCodec {
    /// Codec that writes indented, human-diffable envelopes.
    pub const fn pretty() -> Self {
        Self { pretty: true }
    }

    /// Codec that writes single-line envelopes.
    pub const fn compact() -> Self {
        Self { pretty: false }
    }

    pub fn is_pretty(&self) -> bool {
        self.pretty
    }

    /// Encode an envelope to bytes.
    pub fn encode(&self, envelope: &Envelope) -> CodecResult<Vec<u8>> {
        let result = if self.pretty {
            serde_json::to_vec_pretty(envelope)
        } else {
            serde_json::to_vec(envelope)
        };
        result.map_err(|e| CodecError::Serialization(e.to_string()))
    }

    /// Decode an envelope from bytes.
    ///
    /// Fails when the bytes are not JSON, the top level is not an object,
    /// or a required field is absent.
    pub fn decode(data: &[u8]) -> CodecResult<Envelope> {
        let value = Self::parse_object(data)?;
        serde_json::from_value(value).map_err(|e| CodecError::Deserialization(e.to_string()))
    }

    /// Read only the `typeName` of an encoded envelope.
    pub fn peek_type_name(data: &[u8]) -> CodecResult<String> {
        let value = Self::parse_object(data)?;
        value
            .get("typeName")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| CodecError::Deserialization("typeName is not a string".into()))
    }

    fn parse_object(data: &[u8]) -> CodecResult<Value> {
        let value: Value =
            serde_json::from_slice(data).map_err(|e| CodecError::Malformed(e.to_string()))?;
        let obj = value.as_object().ok_or(CodecError::NotAnObject)?;
        for &field in REQUIRED_FIELDS {
            if !obj.contains_key(field) {
                return Err(CodecError::MissingField(field));
            }
        }
        Ok(value)
    }

    /// Encode a reference table document.
    pub fn encode_references(table: &ReferenceTable) -> CodecResult<String> {
        serde_json::to_string(table).map_err(|e| CodecError::Serialization(e.to_string()))
    }

    /// Decode a reference table document. An empty document is an empty table.
    pub fn decode_references(document: &str) -> CodecResult<ReferenceTable> {
        if document.trim().is_empty() {
            return Ok(ReferenceTable::new());
        }
        serde_json::from_str(document).map_err(|e| CodecError::Malformed(e.to_string()))
    }

    /// Encode a typed payload document.
    pub fn encode_payload<T: Serialize>(payload: &T) -> CodecResult<String> {
        serde_json::to_string(payload).map_err(|e| CodecError::Serialization(e.to_string()))
    }

    /// Decode a payload document into a concrete type.
    pub fn decode_payload<T: DeserializeOwned>(document: &str) -> CodecResult<T> {
        serde_json::from_str(document).map_err(|e| CodecError::Deserialization(e.to_string()))
    }

    /// Decode a payload document without knowing its type.
    pub fn decode_payload_dynamic(document: &str) -> CodecResult<Value> {
        serde_json::from_str(document).map_err(|e| CodecError::Malformed(e.to_string()))
    }
}
