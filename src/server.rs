//! Server-side Extraction Interceptor
//!
//! Gates every incoming call on the presence of a valid caller identity in
//! the request metadata.

use tonic::service::Interceptor;
use tonic::{Request, Status};
use tracing::{debug, warn};

use crate::codec::Field;
use crate::config::MetadataKeys;
use crate::context::Slot;
use crate::error::PropagationError;
use crate::resolver::IdentityResolver;

/// Server-side interceptor that refuses to invoke a handler unless both
/// identity fields strictly resolve from the incoming metadata.
///
/// This interceptor:
/// 1. Strictly resolves the user id from the request metadata
/// 2. Strictly resolves the player id the same way
/// 3. Passes the request through untouched on success
///
/// ## Design
///
/// - **Fail-fast**: any resolution failure returns `Status::unauthenticated`
///   and the handler never runs
/// - **Pass-through**: the handler receives exactly the request the
///   transport delivered, plus the guarantee that a valid identity is
///   resolvable from it (see `CallerIdentityExt`)
/// - **Structured logging**: rejections logged at WARN level
///
/// ## Usage
///
/// ```rust,no_run
/// use grpc_identity_propagation::IdentityExtractionInterceptor;
///
/// // let service = ProfileServiceServer::with_interceptor(
/// //     ProfileService::default(),
/// //     IdentityExtractionInterceptor::new(),
/// // );
/// ```
#[derive(Debug, Clone, Default)]
pub struct IdentityExtractionInterceptor {
    resolver: IdentityResolver,
}

impl IdentityExtractionInterceptor {
    /// Interceptor resolving under the default wire keys.
    pub fn new() -> Self {
        Self::default()
    }

    /// Interceptor resolving under rebound wire keys.
    pub fn with_keys(keys: MetadataKeys) -> Self {
        Self {
            resolver: IdentityResolver::with_keys(keys),
        }
    }
}

impl Interceptor for IdentityExtractionInterceptor {
    fn call(&mut self, request: Request<()>) -> Result<Request<()>, Status> {
        let metadata = request.metadata();

        let user_id = self
            .resolver
            .try_resolve_in(metadata, Field::User, Slot::Incoming)
            .map_err(|err| {
                warn!(error = %err, "rejecting call without extractable identity");
                PropagationError::ExtractionFailed(err)
            })?;

        let player_id = self
            .resolver
            .try_resolve_in(metadata, Field::Player, Slot::Incoming)
            .map_err(|err| {
                warn!(error = %err, "rejecting call without extractable identity");
                PropagationError::ExtractionFailed(err)
            })?;

        debug!(user_id = %user_id, player_id = %player_id, "caller identity extracted");

        Ok(request)
    }
}
