//! Integration Tests for Identity Propagation
//!
//! These tests verify the complete flow:
//! Gateway attaches identity -> client interceptor copies it outbound ->
//! server interceptor gates the call -> handler reads the identity.

use grpc_identity_propagation::{
    CallContext, CallerIdentity, CallerIdentityExt, IdentityCodec, IdentityCopyInterceptor,
    IdentityExtractionInterceptor, MetadataKeys,
};
use tonic::service::Interceptor;
use tonic::{Request, Status};
use uuid::Uuid;

fn test_identity() -> CallerIdentity {
    CallerIdentity::new(Uuid::new_v4(), Uuid::new_v4())
}

/// Simulate one hop: the client interceptor stamps outbound metadata, the
/// request crosses the wire unchanged, the server interceptor gates it.
fn simulate_hop(ctx: CallContext) -> Result<Request<()>, Status> {
    let mut client_interceptor = IdentityCopyInterceptor::new(ctx);
    let request = client_interceptor.call(Request::new(()))?;

    // Metadata travels as-is; for testing we hand the request over directly.

    let mut server_interceptor = IdentityExtractionInterceptor::new();
    server_interceptor.call(request)
}

/// Stand-in for the RPC framework invoking a handler behind the gate.
fn dispatch(
    request: Request<()>,
    interceptor: &mut IdentityExtractionInterceptor,
    handled: &mut bool,
) -> Result<CallerIdentity, Status> {
    let request = interceptor.call(request)?;
    *handled = true;
    request.caller_identity()
}

#[test]
fn test_identity_survives_single_hop() {
    let identity = test_identity();
    let codec = IdentityCodec::default();
    let ctx = CallContext::new().with_outgoing_identity(&codec, &identity);

    let request = simulate_hop(ctx).expect("flow should succeed");

    assert_eq!(request.caller_identity().unwrap(), identity);
    assert_eq!(request.try_user_id().unwrap(), identity.user_id);
    assert_eq!(request.try_player_id().unwrap(), identity.player_id);
}

#[test]
fn test_identity_survives_relay_hop() {
    let identity = test_identity();
    let codec = IdentityCodec::default();

    // Hop 1: gateway -> service A.
    let gateway_ctx = CallContext::new().with_outgoing_identity(&codec, &identity);
    let request_at_a = simulate_hop(gateway_ctx).expect("first hop should succeed");

    // Service A relays to service B using the request it received, without
    // its business logic touching identity.
    let mut copy = IdentityCopyInterceptor::for_request(&request_at_a);
    let request_to_b = copy.call(Request::new(())).expect("copy should succeed");

    let mut gate = IdentityExtractionInterceptor::new();
    let request_at_b = gate.call(request_to_b).expect("second hop should succeed");

    assert_eq!(request_at_b.caller_identity().unwrap(), identity);
}

#[test]
fn test_copy_preserves_textual_encoding() {
    let identity = test_identity();
    let codec = IdentityCodec::default();
    let ctx = CallContext::new().with_outgoing_identity(&codec, &identity);

    let mut interceptor = IdentityCopyInterceptor::new(ctx);
    let request = interceptor.call(Request::new(())).unwrap();

    assert_eq!(
        request.metadata().get("x-api-user").unwrap().to_str().unwrap(),
        identity.user_id.to_string()
    );
    assert_eq!(
        request
            .metadata()
            .get("x-api-player")
            .unwrap()
            .to_str()
            .unwrap(),
        identity.player_id.to_string()
    );
}

#[test]
fn test_missing_identity_never_reaches_handler() {
    let mut gate = IdentityExtractionInterceptor::new();
    let mut handled = false;

    let result = dispatch(Request::new(()), &mut gate, &mut handled);

    let status = result.unwrap_err();
    assert_eq!(status.code(), tonic::Code::Unauthenticated);
    assert!(!handled, "handler must not run without identity");
}

#[test]
fn test_malformed_identity_never_reaches_handler() {
    let mut request = Request::new(());
    request
        .metadata_mut()
        .insert("x-api-user", "not-a-uuid".parse().unwrap());
    request
        .metadata_mut()
        .insert("x-api-player", Uuid::new_v4().to_string().parse().unwrap());

    let mut gate = IdentityExtractionInterceptor::new();
    let mut handled = false;

    assert!(dispatch(request, &mut gate, &mut handled).is_err());
    assert!(!handled);
}

#[test]
fn test_valid_identity_reaches_handler_once() {
    let identity = test_identity();
    let codec = IdentityCodec::default();
    let ctx = CallContext::new().with_outgoing_identity(&codec, &identity);

    let mut client_interceptor = IdentityCopyInterceptor::new(ctx);
    let request = client_interceptor.call(Request::new(())).unwrap();

    let mut gate = IdentityExtractionInterceptor::new();
    let mut handled = false;

    let resolved = dispatch(request, &mut gate, &mut handled).unwrap();
    assert!(handled);
    assert_eq!(resolved, identity);
}

#[test]
fn test_nil_player_aborts_before_dispatch() {
    let identity = CallerIdentity::new(Uuid::new_v4(), Uuid::nil());
    let codec = IdentityCodec::default();
    let ctx = CallContext::new().with_outgoing_identity(&codec, &identity);

    let mut interceptor = IdentityCopyInterceptor::new(ctx);
    let status = interceptor.call(Request::new(())).unwrap_err();

    assert_eq!(status.code(), tonic::Code::Unauthenticated);
}

#[test]
fn test_relay_prefers_staged_identity_over_received() {
    let received = test_identity();
    let staged = test_identity();
    let codec = IdentityCodec::default();

    // A service that both received a call and deliberately staged a
    // different identity for the next hop forwards the staged one.
    let ctx = CallContext::new()
        .with_incoming_identity(&codec, &received)
        .with_outgoing_identity(&codec, &staged);

    let mut copy = IdentityCopyInterceptor::new(ctx);
    let request = copy.call(Request::new(())).unwrap();

    assert_eq!(codec.decode(request.metadata()).unwrap(), staged);
}

#[test]
fn test_custom_keys_end_to_end() {
    let keys = MetadataKeys::new("x-game-user", "x-game-player").unwrap();
    let codec = IdentityCodec::new(keys.clone());
    let identity = test_identity();

    let ctx = CallContext::new().with_outgoing_identity(&codec, &identity);
    let mut client_interceptor = IdentityCopyInterceptor::with_keys(ctx, keys.clone());
    let request = client_interceptor.call(Request::new(())).unwrap();

    let mut gate = IdentityExtractionInterceptor::with_keys(keys);
    let request = gate.call(request).expect("gate should pass custom keys");

    assert_eq!(codec.decode(request.metadata()).unwrap(), identity);

    // The default-keyed gate knows nothing about these entries.
    let mut default_gate = IdentityExtractionInterceptor::new();
    let mut request_again = Request::new(());
    codec.encode_into(&identity, request_again.metadata_mut());
    assert!(default_gate.call(request_again).is_err());
}
