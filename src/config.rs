//! Configuration for identity propagation.
//!
//! The wire key names are configuration rather than process-wide constants,
//! so tests and bespoke deployments can rebind them without touching global
//! state.

use std::env;

use tonic::metadata::AsciiMetadataKey;

use crate::codec::Field;
use crate::error::ConfigError;

/// Default wire key carrying the user id.
///
/// gRPC metadata keys are case-insensitive and transmitted lowercase, so
/// this matches `X-API-USER` on the wire.
pub const DEFAULT_USER_KEY: &str = "x-api-user";

/// Default wire key carrying the player id (`X-API-PLAYER` on the wire).
pub const DEFAULT_PLAYER_KEY: &str = "x-api-player";

/// The pair of metadata keys the identity travels under.
///
/// Immutable after construction. Keys are validated and normalized to
/// lowercase up front so encoding never fails later.
#[derive(Debug, Clone)]
pub struct MetadataKeys {
    user: AsciiMetadataKey,
    player: AsciiMetadataKey,
}

impl Default for MetadataKeys {
    fn default() -> Self {
        Self {
            user: AsciiMetadataKey::from_static(DEFAULT_USER_KEY),
            player: AsciiMetadataKey::from_static(DEFAULT_PLAYER_KEY),
        }
    }
}

impl MetadataKeys {
    /// Build a key pair from custom key names.
    pub fn new(user: &str, player: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            user: Self::parse_key(user)?,
            player: Self::parse_key(player)?,
        })
    }

    /// Load key names from `IDENTITY_USER_METADATA_KEY` /
    /// `IDENTITY_PLAYER_METADATA_KEY`, falling back to the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let user =
            env::var("IDENTITY_USER_METADATA_KEY").unwrap_or_else(|_| DEFAULT_USER_KEY.to_string());
        let player = env::var("IDENTITY_PLAYER_METADATA_KEY")
            .unwrap_or_else(|_| DEFAULT_PLAYER_KEY.to_string());
        Self::new(&user, &player)
    }

    fn parse_key(key: &str) -> Result<AsciiMetadataKey, ConfigError> {
        AsciiMetadataKey::from_bytes(key.as_bytes()).map_err(|err| ConfigError::InvalidKey {
            key: key.to_owned(),
            reason: err.to_string(),
        })
    }

    /// The key for one identity field.
    pub fn key(&self, field: Field) -> &AsciiMetadataKey {
        match field {
            Field::User => &self.user,
            Field::Player => &self.player,
        }
    }

    pub fn user(&self) -> &AsciiMetadataKey {
        &self.user
    }

    pub fn player(&self) -> &AsciiMetadataKey {
        &self.player
    }
}

/// Listen configuration for the bundled server bootstrap.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 9080,
        }
    }
}

impl ServerConfig {
    /// Load from `GRPC_HOST` / `GRPC_PORT`, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env::var("GRPC_HOST").unwrap_or(defaults.host),
            port: env::var("GRPC_PORT")
                .ok()
                .and_then(|port| port.parse().ok())
                .unwrap_or(defaults.port),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
