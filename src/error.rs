//! Error types for identity resolution and propagation.
//!
//! Field-level failures stay local to the codec; the resolver wraps them
//! with the slot and field being consulted, and the interceptors wrap once
//! more with their role before crossing the RPC boundary. A bare parsing
//! error is never exposed to a handler or caller.

use thiserror::Error;
use tonic::Status;

use crate::codec::Field;
use crate::context::Slot;

/// Decode failures for a single identity field within one metadata mapping.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    /// The expected metadata key is absent.
    #[error("identity key {key:?} missing from metadata")]
    Missing { key: String },

    /// The key is present but its first value is not a valid, non-nil
    /// identifier.
    #[error("identity key {key:?} contains a malformed or nil identifier")]
    Malformed { key: String },
}

/// Failures raised while resolving identity out of a call context.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    /// The consulted slot carries no metadata at all (distinct from a
    /// mapping that is present but lacks the identity keys).
    #[error("no {slot} metadata attached to call context")]
    MetadataUnavailable { slot: Slot },

    /// A metadata mapping was found in the slot but the field could not be
    /// decoded from it.
    #[error("unable to extract {field} from {slot} metadata: {source}")]
    Field {
        field: Field,
        slot: Slot,
        source: FieldError,
    },

    /// Direction-agnostic resolution exhausted both the outgoing and
    /// incoming slots without success.
    #[error("unable to resolve {field} from either outgoing or incoming metadata")]
    ContextUnresolvable { field: Field },
}

/// Terminal interceptor failures surfaced to the RPC framework.
///
/// Converts into `Status::unauthenticated`; the wrapped [`ResolveError`]
/// keeps the failure traceable to a role, slot, and field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropagationError {
    /// The server-side interceptor could not resolve a valid identity from
    /// the incoming request; the handler was never invoked.
    #[error("failed to extract caller identity in server interceptor: {0}")]
    ExtractionFailed(#[source] ResolveError),

    /// The client-side interceptor could not resolve a valid identity to
    /// forward; the downstream call was never dispatched.
    #[error("failed to copy caller identity in client interceptor: {0}")]
    CopyFailed(#[source] ResolveError),
}

impl From<PropagationError> for Status {
    fn from(err: PropagationError) -> Self {
        Status::unauthenticated(err.to_string())
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The supplied string is not usable as a gRPC metadata key.
    #[error("invalid metadata key {key:?}: {reason}")]
    InvalidKey { key: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_propagation_error_becomes_unauthenticated() {
        let err = PropagationError::ExtractionFailed(ResolveError::MetadataUnavailable {
            slot: Slot::Incoming,
        });

        let status = Status::from(err);
        assert_eq!(status.code(), tonic::Code::Unauthenticated);
        assert!(status.message().contains("extract"));
        assert!(status.message().contains("incoming"));
    }

    #[test]
    fn test_resolve_error_names_field_and_slot() {
        let err = ResolveError::Field {
            field: Field::Player,
            slot: Slot::Outgoing,
            source: FieldError::Malformed {
                key: "x-api-player".to_string(),
            },
        };

        let rendered = err.to_string();
        assert!(rendered.contains("player id"));
        assert!(rendered.contains("outgoing"));
        assert!(rendered.contains("malformed"));
    }
}
