//! Metadata Codec
//!
//! Pure translation between a [`CallerIdentity`] and gRPC metadata. No I/O,
//! no shared state: the codec holds only the configured key names.
//!
//! ## Wire contract
//!
//! Each identity field is one ASCII metadata entry whose value is the
//! canonical hyphenated UUID text. Nil identifiers are encoded as the
//! canonical nil string rather than omitted, so a decoded mapping can
//! distinguish "attached as nil" from "never attached". Only the first
//! value per key is consulted on decode.

use std::fmt;

use tonic::metadata::{AsciiMetadataValue, MetadataMap};
use uuid::Uuid;

use crate::config::MetadataKeys;
use crate::error::FieldError;
use crate::identity::CallerIdentity;

/// Selects which half of the identity pair an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    User,
    Player,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::User => f.write_str("user id"),
            Field::Player => f.write_str("player id"),
        }
    }
}

/// Encoder/decoder between identity values and metadata mappings.
#[derive(Debug, Clone, Default)]
pub struct IdentityCodec {
    keys: MetadataKeys,
}

impl IdentityCodec {
    pub fn new(keys: MetadataKeys) -> Self {
        Self { keys }
    }

    pub fn keys(&self) -> &MetadataKeys {
        &self.keys
    }

    /// Encode both identity fields into a fresh metadata map.
    ///
    /// Total: encoding never fails, nil ids included.
    pub fn encode(&self, identity: &CallerIdentity) -> MetadataMap {
        let mut metadata = MetadataMap::new();
        self.encode_into(identity, &mut metadata);
        metadata
    }

    /// Encode both identity fields into an existing metadata map, replacing
    /// any values already present under the configured keys. Unrelated
    /// entries are left alone.
    pub fn encode_into(&self, identity: &CallerIdentity, metadata: &mut MetadataMap) {
        metadata.insert(self.keys.user().clone(), Self::encode_value(identity.user_id));
        metadata.insert(
            self.keys.player().clone(),
            Self::encode_value(identity.player_id),
        );
    }

    fn encode_value(id: Uuid) -> AsciiMetadataValue {
        // Canonical hyphenated form is always printable ASCII.
        AsciiMetadataValue::try_from(id.to_string()).expect("canonical uuid text is valid metadata")
    }

    /// Strictly decode one identity field out of a metadata map.
    ///
    /// ## Errors
    ///
    /// - [`FieldError::Missing`] if the configured key is absent
    /// - [`FieldError::Malformed`] if the first value is not ASCII, does not
    ///   parse as a UUID, or parses to the nil UUID
    pub fn decode_field(&self, metadata: &MetadataMap, field: Field) -> Result<Uuid, FieldError> {
        let key = self.keys.key(field);
        let value = metadata.get(key).ok_or_else(|| FieldError::Missing {
            key: key.as_str().to_owned(),
        })?;

        let malformed = || FieldError::Malformed {
            key: key.as_str().to_owned(),
        };

        let text = value.to_str().map_err(|_| malformed())?;
        let id = Uuid::parse_str(text).map_err(|_| malformed())?;
        if id.is_nil() {
            return Err(malformed());
        }
        Ok(id)
    }

    /// Lenient variant of [`decode_field`](IdentityCodec::decode_field):
    /// returns the nil identifier on any failure instead of an error.
    pub fn decode_field_lenient(&self, metadata: &MetadataMap, field: Field) -> Uuid {
        self.decode_field(metadata, field).unwrap_or(Uuid::nil())
    }

    /// Strictly decode the full identity pair.
    pub fn decode(&self, metadata: &MetadataMap) -> Result<CallerIdentity, FieldError> {
        Ok(CallerIdentity::new(
            self.decode_field(metadata, Field::User)?,
            self.decode_field(metadata, Field::Player)?,
        ))
    }
}
