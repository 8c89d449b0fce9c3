//! Client-side Copy Interceptor
//!
//! Re-attaches the current call's identity to every outgoing request, so
//! business logic never handles identity explicitly on the way out.

use tonic::service::Interceptor;
use tonic::{Request, Status};
use tracing::{debug, warn};

use crate::codec::Field;
use crate::config::MetadataKeys;
use crate::context::CallContext;
use crate::error::PropagationError;
use crate::identity::CallerIdentity;
use crate::resolver::IdentityResolver;

/// Client-side interceptor that copies the caller identity into the
/// metadata of every outgoing request.
///
/// The interceptor is built from the call context of the hop it serves: a
/// pure client stages the identity in the outgoing slot, a relaying service
/// snapshots the request it received (see
/// [`for_request`](IdentityCopyInterceptor::for_request)). Resolution is
/// direction-agnostic with the outgoing slot preferred, so a forwarder that
/// deliberately staged a different identity wins over the one it received.
///
/// If either identifier fails strict resolution, the downstream call is
/// aborted before dispatch; the downstream service is never contacted.
///
/// ## Usage
///
/// ```rust,no_run
/// use grpc_identity_propagation::{
///     CallContext, CallerIdentity, IdentityCodec, IdentityCopyInterceptor,
/// };
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let codec = IdentityCodec::default();
/// let identity = CallerIdentity::new(Uuid::new_v4(), Uuid::new_v4());
/// let ctx = CallContext::new().with_outgoing_identity(&codec, &identity);
///
/// let interceptor = IdentityCopyInterceptor::new(ctx);
///
/// let channel = tonic::transport::Channel::from_static("http://[::1]:9080")
///     .connect()
///     .await?;
///
/// // Every request on this client now carries the identity pair.
/// // let mut client = ProfileServiceClient::with_interceptor(channel, interceptor);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct IdentityCopyInterceptor {
    resolver: IdentityResolver,
    context: CallContext,
}

impl IdentityCopyInterceptor {
    /// Interceptor forwarding identity out of `context` under the default
    /// wire keys.
    pub fn new(context: CallContext) -> Self {
        Self {
            resolver: IdentityResolver::default(),
            context,
        }
    }

    /// Interceptor forwarding identity out of `context` under rebound keys.
    pub fn with_keys(context: CallContext, keys: MetadataKeys) -> Self {
        Self {
            resolver: IdentityResolver::with_keys(keys),
            context,
        }
    }

    /// Relay constructor: snapshot the incoming slot of a server-side
    /// request, for a service forwarding the call it is currently handling.
    ///
    /// ```rust,no_run
    /// use grpc_identity_propagation::IdentityCopyInterceptor;
    /// use tonic::Request;
    ///
    /// fn forward_identity<T>(request: &Request<T>) -> IdentityCopyInterceptor {
    ///     IdentityCopyInterceptor::for_request(request)
    /// }
    /// ```
    pub fn for_request<T>(request: &Request<T>) -> Self {
        Self::new(CallContext::from_request(request))
    }
}

impl Interceptor for IdentityCopyInterceptor {
    fn call(&mut self, mut request: Request<()>) -> Result<Request<()>, Status> {
        let user_id = self
            .resolver
            .try_resolve_either(&self.context, Field::User)
            .map_err(|err| {
                warn!(error = %err, "aborting outbound call without forwardable identity");
                PropagationError::CopyFailed(err)
            })?;

        let player_id = self
            .resolver
            .try_resolve_either(&self.context, Field::Player)
            .map_err(|err| {
                warn!(error = %err, "aborting outbound call without forwardable identity");
                PropagationError::CopyFailed(err)
            })?;

        let identity = CallerIdentity::new(user_id, player_id);
        self.resolver
            .codec()
            .encode_into(&identity, request.metadata_mut());

        debug!(
            user_id = %identity.user_id,
            player_id = %identity.player_id,
            "caller identity copied to outbound metadata"
        );

        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::IdentityCodec;
    use uuid::Uuid;

    fn identity() -> CallerIdentity {
        CallerIdentity::new(Uuid::new_v4(), Uuid::new_v4())
    }

    #[test]
    fn test_copies_staged_outgoing_identity() {
        let codec = IdentityCodec::default();
        let id = identity();
        let ctx = CallContext::new().with_outgoing_identity(&codec, &id);

        let mut interceptor = IdentityCopyInterceptor::new(ctx);
        let request = interceptor.call(Request::new(())).unwrap();

        assert_eq!(codec.decode(request.metadata()).unwrap(), id);
    }

    #[test]
    fn test_relays_received_identity() {
        let codec = IdentityCodec::default();
        let id = identity();

        let mut inbound = Request::new(());
        codec.encode_into(&id, inbound.metadata_mut());

        let mut interceptor = IdentityCopyInterceptor::for_request(&inbound);
        let outbound = interceptor.call(Request::new(())).unwrap();

        assert_eq!(codec.decode(outbound.metadata()).unwrap(), id);
    }

    #[test]
    fn test_staged_identity_wins_over_received() {
        let codec = IdentityCodec::default();
        let received = identity();
        let staged = identity();

        let ctx = CallContext::new()
            .with_incoming_identity(&codec, &received)
            .with_outgoing_identity(&codec, &staged);

        let mut interceptor = IdentityCopyInterceptor::new(ctx);
        let request = interceptor.call(Request::new(())).unwrap();

        assert_eq!(codec.decode(request.metadata()).unwrap(), staged);
    }

    #[test]
    fn test_aborts_without_identity() {
        let mut interceptor = IdentityCopyInterceptor::new(CallContext::new());
        let status = interceptor.call(Request::new(())).unwrap_err();

        assert_eq!(status.code(), tonic::Code::Unauthenticated);
        assert!(status.message().contains("copy"));
    }

    #[test]
    fn test_aborts_on_nil_player() {
        let codec = IdentityCodec::default();
        let id = CallerIdentity::new(Uuid::new_v4(), Uuid::nil());
        let ctx = CallContext::new().with_outgoing_identity(&codec, &id);

        let mut interceptor = IdentityCopyInterceptor::new(ctx);
        let status = interceptor.call(Request::new(())).unwrap_err();

        assert_eq!(status.code(), tonic::Code::Unauthenticated);
        assert!(status.message().contains("player id"));
    }

    #[test]
    fn test_overwrites_stale_identity_on_request() {
        let codec = IdentityCodec::default();
        let stale = identity();
        let fresh = identity();

        let mut request = Request::new(());
        codec.encode_into(&stale, request.metadata_mut());

        let ctx = CallContext::new().with_outgoing_identity(&codec, &fresh);
        let mut interceptor = IdentityCopyInterceptor::new(ctx);
        let request = interceptor.call(request).unwrap();

        assert_eq!(codec.decode(request.metadata()).unwrap(), fresh);
        assert_eq!(request.metadata().get_all("x-api-user").iter().count(), 1);
    }
}
