mod account;
mod error;

pub use error::*;

use crate::domain::AccountRepository;
use anyhow::{Context, Result};
use axum::{
    body::Body,
    error_handling::HandleErrorLayer,
    http::{HeaderMap, Request, StatusCode, Uri},
    routing::get,
    BoxError, Router,
};
use error_ext::StdErrorExt;
use opentelemetry::{
    global,
    propagation::Extractor,
    trace::{TraceContextExt, TraceId},
};
use serde::Deserialize;
use serde_with::{serde_as, DurationSeconds};
use std::{future::pending, net::IpAddr, time::Duration};
use tokio::{
    net::TcpListener,
    select,
    signal::unix::{signal, SignalKind},
};
use tower::{timeout::error::Elapsed, ServiceBuilder};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, field, info, info_span, warn, Span};
use tracing_opentelemetry::OpenTelemetrySpanExt;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[serde_as]
#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    addr: IpAddr,
    port: u16,
    /// Requests taking longer are answered with 408 Request Timeout.
    #[serde_as(as = "DurationSeconds<u64>")]
    request_timeout: Duration,
}

pub async fn serve<R>(config: Config, account_repository: R) -> Result<()>
where
    R: AccountRepository,
{
    let Config {
        addr,
        port,
        request_timeout,
    } = config;

    let app = app(account_repository, request_timeout);

    let listener = TcpListener::bind((addr, port))
        .await
        .context("bind TcpListener")?;
    info!(%addr, port, "listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("run server")
}

#[derive(Clone)]
struct AppState<R> {
    account_repository: R,
}

fn app<R>(account_repository: R, request_timeout: Duration) -> Router
where
    R: AccountRepository,
{
    let app_state = AppState { account_repository };

    Router::new()
        .route("/", get(ready))
        .merge(account::app())
        .merge(SwaggerUi::new("/api-doc").url("/openapi.json", account::ApiDoc::openapi()))
        .fallback(no_route)
        .with_state(app_state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(CorsLayer::permissive())
                .layer(HandleErrorLayer::new(handle_error))
                .timeout(request_timeout)
                .map_request(accept_trace)
                .map_request(record_trace_id),
        )
}

async fn ready() -> StatusCode {
    StatusCode::OK
}

async fn no_route(uri: Uri) -> Error {
    Error::NoRoute(uri.path().to_string())
}

async fn handle_error(error: BoxError) -> Error {
    if error.is::<Elapsed>() {
        Error::Timeout
    } else {
        Error::Internal(error)
    }
}

async fn shutdown_signal() {
    select! {
        _ = recv_signal(SignalKind::terminate()) => info!("received SIGTERM"),
        _ = recv_signal(SignalKind::interrupt()) => info!("received SIGINT"),
    }
}

async fn recv_signal(kind: SignalKind) {
    match signal(kind) {
        Ok(mut signal) => {
            signal.recv().await;
        }

        Err(error) => {
            error!(error = error.as_chain(), ?kind, "cannot install signal handler");
            pending::<()>().await
        }
    }
}

fn make_span(request: &Request<Body>) -> Span {
    let headers = request.headers();
    let method = request.method().as_str();
    let path = request.uri().path();
    info_span!("incoming request", method, path, ?headers, trace_id = field::Empty)
}

struct HeaderExtractor<'a>(&'a HeaderMap);

impl<'a> Extractor for HeaderExtractor<'a> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| {
            let s = v.to_str();
            if let Err(ref error) = s {
                warn!(%error, ?v, "cannot convert header value to ASCII")
            };
            s.ok()
        })
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(|k| k.as_str()).collect()
    }
}

fn accept_trace(request: Request<Body>) -> Request<Body> {
    // Current context, if no or invalid data is received.
    let parent_context = global::get_text_map_propagator(|propagator| {
        propagator.extract(&HeaderExtractor(request.headers()))
    });
    Span::current().set_parent(parent_context);

    request
}

fn record_trace_id(request: Request<Body>) -> Request<Body> {
    let span = Span::current();

    let trace_id = span.context().span().span_context().trace_id();
    if trace_id != TraceId::INVALID {
        span.record("trace_id", trace_id.to_string());
    }

    request
}
