//! Server bootstrap: bind, attach the health endpoint, serve.

use std::convert::Infallible;

use anyhow::{Context, Result};
use tonic::body::BoxBody;
use tonic::codegen::http::{Request as HttpRequest, Response as HttpResponse};
use tonic::server::NamedService;
use tonic::service::interceptor::InterceptedService;
use tonic::transport::Server;
use tonic_health::server::health_reporter;
use tonic_health::ServingStatus;
use tower::Service;
use tracing::info;

use crate::config::ServerConfig;
use crate::server::IdentityExtractionInterceptor;

/// Serve a single gRPC service with the standard grpc.health.v1 endpoint
/// attached, marked serving for the hosted service. Serves until the task
/// is cancelled or the transport fails.
pub async fn run_grpc_server<S>(config: &ServerConfig, service: S) -> Result<()>
where
    S: Service<HttpRequest<BoxBody>, Response = HttpResponse<BoxBody>, Error = Infallible>
        + NamedService
        + Clone
        + Send
        + 'static,
    S::Future: Send + 'static,
{
    let addr = config
        .bind_addr()
        .parse()
        .context("invalid gRPC listen address")?;

    let (mut health_reporter, health_service) = health_reporter();
    health_reporter
        .set_service_status(S::NAME, ServingStatus::Serving)
        .await;

    info!("gRPC server listening on {}", addr);

    Server::builder()
        .add_service(health_service)
        .add_service(service)
        .serve(addr)
        .await
        .context("gRPC server failed")?;

    Ok(())
}

/// Same as [`run_grpc_server`], with the identity extraction gate wrapped
/// around the hosted service. The health endpoint stays open to
/// unauthenticated probes.
pub async fn run_grpc_server_with_identity<S>(
    config: &ServerConfig,
    interceptor: IdentityExtractionInterceptor,
    service: S,
) -> Result<()>
where
    S: Service<HttpRequest<BoxBody>, Response = HttpResponse<BoxBody>, Error = Infallible>
        + NamedService
        + Clone
        + Send
        + 'static,
    S::Future: Send + 'static,
{
    run_grpc_server(config, InterceptedService::new(service, interceptor)).await
}
