use crate::security::DosProtection;
use crate::telemetry::{
    handle_metrics, health_check_response, not_found_response, stats_response, RespBody,
};
use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::{Request, Response};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use prometheus::Registry;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

fn internal_error() -> Response<RespBody> {
    let body = Full::new(Bytes::from("Internal Server Error"))
        .map_err(|never| match never {})
        .boxed();
    let mut resp = Response::new(body);
    *resp.status_mut() = hyper::StatusCode::INTERNAL_SERVER_ERROR;
    resp
}

fn route(path: &str, registry: &Registry, protection: &DosProtection) -> Response<RespBody> {
    let result = match path {
        "/health" => health_check_response(),
        "/metrics" => handle_metrics(registry),
        "/stats" => stats_response(protection),
        _ => not_found_response(),
    };
    result.unwrap_or_else(|e| {
        warn!(error = %e, path, "Observability server: failed to build response");
        internal_error()
    })
}

/// Start the observability server on `0.0.0.0:port`
/// This server serves:
/// - `/metrics` - Prometheus metrics
/// - `/health` - Health check endpoint
/// - `/stats` - Tracked actors per category and spam counters
pub async fn start_observability_server(
    port: u16,
    registry: Registry,
    protection: Arc<DosProtection>,
    cancel: CancellationToken,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    serve_observability(listener, registry, protection, cancel).await
}

/// Serve observability endpoints on an already bound listener until `cancel` fires
pub async fn serve_observability(
    listener: TcpListener,
    registry: Registry,
    protection: Arc<DosProtection>,
    cancel: CancellationToken,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let registry = Arc::new(registry);
    let addr = listener.local_addr()?;

    info!(?addr, "Observability server started (metrics + stats)");

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("Observability server: cancellation requested, shutting down");
                break;
            }
            result = listener.accept() => {
                let (stream, peer) = match result {
                    Ok((stream, peer)) => (stream, peer),
                    Err(e) => {
                        warn!(error = %e, "Observability server: accept error");
                        continue;
                    }
                };

                let registry = registry.clone();
                let protection = protection.clone();
                tokio::spawn(async move {
                    let svc = hyper::service::service_fn(move |req: Request<Incoming>| {
                        let resp = route(req.uri().path(), &registry, &protection);
                        async move { Ok::<_, hyper::Error>(resp) }
                    });

                    let builder = ConnBuilder::new(TokioExecutor::new());
                    if let Err(e) = builder.serve_connection(TokioIo::new(stream), svc).await {
                        warn!(?peer, error = %e, "Observability server: serve_connection error");
                    }
                });
            }
        }
    }

    info!("Observability server stopped");
    Ok(())
}
