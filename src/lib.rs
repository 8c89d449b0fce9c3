//! Caller-Identity Propagation for gRPC Microservices
//!
//! This library carries a caller identity (user id + player id) across
//! gRPC service boundaries as call metadata, so service methods never take
//! identity as an explicit parameter and multi-hop call chains forward it
//! transparently.
//!
//! ## Core Components
//!
//! - **CallerIdentity**: the (user id, player id) pair propagated per call
//! - **IdentityCodec**: encodes/decodes the pair to and from gRPC metadata
//! - **CallContext**: immutable carrier of incoming/outgoing metadata slots
//! - **IdentityResolver**: strict and lenient accessors over a context,
//!   direction-specific or direction-agnostic
//! - **IdentityCopyInterceptor**: re-attaches identity to outgoing requests
//! - **IdentityExtractionInterceptor**: refuses incoming calls without a
//!   valid identity before the handler runs
//! - **CallerIdentityExt**: request extension trait for handler access
//!
//! Identity is assumed to be authenticated upstream; this library only
//! carries it forward. It does not verify, sign, or encrypt anything.
//!
//! ## Usage Example
//!
//! ### Client Side (gateway or upstream service)
//!
//! ```rust,no_run
//! use grpc_identity_propagation::{
//!     CallContext, CallerIdentity, IdentityCodec, IdentityCopyInterceptor,
//! };
//! use uuid::Uuid;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let codec = IdentityCodec::default();
//! let identity = CallerIdentity::new(Uuid::new_v4(), Uuid::new_v4());
//! let ctx = CallContext::new().with_outgoing_identity(&codec, &identity);
//!
//! let interceptor = IdentityCopyInterceptor::new(ctx);
//!
//! let channel = tonic::transport::Channel::from_static("http://[::1]:9080")
//!     .connect()
//!     .await?;
//!
//! // All requests will automatically carry the identity pair
//! // let mut client = ProfileServiceClient::with_interceptor(channel, interceptor);
//! # Ok(())
//! # }
//! ```
//!
//! ### Server Side (backend service)
//!
//! ```rust,no_run
//! use grpc_identity_propagation::{CallerIdentityExt, IdentityExtractionInterceptor};
//! use tonic::{Request, Response, Status};
//!
//! // In endpoint handler
//! async fn grant_reward(request: Request<()>) -> Result<Response<()>, Status> {
//!     // The extraction interceptor has already refused calls without a
//!     // resolvable identity.
//!     let identity = request.caller_identity()?;
//!
//!     // ... load state by identity.user_id / identity.player_id
//!     Ok(Response::new(()))
//! }
//! ```
//!
//! ### Relay (service calling a downstream service)
//!
//! ```rust,no_run
//! use grpc_identity_propagation::IdentityCopyInterceptor;
//! use tonic::Request;
//!
//! fn forward<T>(inbound: &Request<T>) -> IdentityCopyInterceptor {
//!     // Snapshot the identity this call arrived with and forward it on
//!     // the next hop.
//!     IdentityCopyInterceptor::for_request(inbound)
//! }
//! ```
//!
//! ## Guarantees
//!
//! - Missing or malformed identity = `Status::unauthenticated`, before the
//!   handler runs (server side) or before dispatch (client side)
//! - Nil identifiers are rejected by every strict path, never silently
//!   treated as "no identity"
//! - Contexts are immutable; attachment always produces a new context

mod bootstrap;
mod client;
mod codec;
mod config;
mod context;
mod error;
mod extensions;
mod identity;
mod resolver;
mod server;

pub use bootstrap::{run_grpc_server, run_grpc_server_with_identity};
pub use client::IdentityCopyInterceptor;
pub use codec::{Field, IdentityCodec};
pub use config::{MetadataKeys, ServerConfig, DEFAULT_PLAYER_KEY, DEFAULT_USER_KEY};
pub use context::{CallContext, Slot};
pub use error::{ConfigError, FieldError, PropagationError, ResolveError};
pub use extensions::CallerIdentityExt;
pub use identity::CallerIdentity;
pub use resolver::IdentityResolver;
pub use server::IdentityExtractionInterceptor;

// Re-export tonic Status for convenience
pub use tonic::Status;
