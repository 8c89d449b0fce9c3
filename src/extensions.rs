//! Request Extension Trait for Caller Identity Access
//!
//! Ergonomic helpers for reading the caller identity from gRPC request
//! handlers. Resolution happens against the request's own metadata under
//! the default wire keys; services with rebound keys should hold an
//! [`IdentityResolver`] instead.

use tonic::{Request, Status};
use uuid::Uuid;

use crate::codec::Field;
use crate::context::Slot;
use crate::error::PropagationError;
use crate::identity::CallerIdentity;
use crate::resolver::IdentityResolver;

/// Identity accessors on server-side requests.
///
/// Behind `IdentityExtractionInterceptor` the strict accessors cannot fail:
/// the gate has already refused any call they would fail on. On an ungated
/// service they double as the gate for a single handler.
///
/// ## Usage
///
/// ```rust,no_run
/// use grpc_identity_propagation::CallerIdentityExt;
/// use tonic::{Request, Response, Status};
///
/// async fn grant_reward(request: Request<()>) -> Result<Response<()>, Status> {
///     let identity = request.caller_identity()?;
///     // ... load the player's wallet by identity.player_id
///     Ok(Response::new(()))
/// }
/// ```
pub trait CallerIdentityExt {
    /// Strictly resolve the full identity pair.
    fn caller_identity(&self) -> Result<CallerIdentity, Status>;

    /// Strictly resolve the user id.
    fn try_user_id(&self) -> Result<Uuid, Status>;

    /// Strictly resolve the player id.
    fn try_player_id(&self) -> Result<Uuid, Status>;

    /// Lenient: the user id, or nil when absent or malformed.
    fn user_id(&self) -> Uuid;

    /// Lenient: the player id, or nil when absent or malformed.
    fn player_id(&self) -> Uuid;
}

impl<T> CallerIdentityExt for Request<T> {
    fn caller_identity(&self) -> Result<CallerIdentity, Status> {
        Ok(CallerIdentity::new(self.try_user_id()?, self.try_player_id()?))
    }

    fn try_user_id(&self) -> Result<Uuid, Status> {
        resolve_field(self, Field::User)
    }

    fn try_player_id(&self) -> Result<Uuid, Status> {
        resolve_field(self, Field::Player)
    }

    fn user_id(&self) -> Uuid {
        self.try_user_id().unwrap_or(Uuid::nil())
    }

    fn player_id(&self) -> Uuid {
        self.try_player_id().unwrap_or(Uuid::nil())
    }
}

fn resolve_field<T>(request: &Request<T>, field: Field) -> Result<Uuid, Status> {
    IdentityResolver::default()
        .try_resolve_in(request.metadata(), field, Slot::Incoming)
        .map_err(|err| PropagationError::ExtractionFailed(err).into())
}
