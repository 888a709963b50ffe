//! Custom middleware for HTTP access logging
//!
//! Logs every request with the client address resolved from proxy headers,
//! so access logs stay accurate when the dashboard sits behind Caddy/nginx.

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{HeaderMap, Request},
    response::Response,
};
use futures::future::BoxFuture;
use std::{
    net::SocketAddr,
    task::{Context, Poll},
    time::Instant,
};
use tower::{Layer, Service};

/// Path prefixes to exclude from logging (asset noise)
const EXCLUDED_PREFIXES: &[&str] = &["/static"];

/// Get the real client IP address, checking proxy headers first
/// Priority: X-Real-IP > X-Forwarded-For (first IP) > ConnectInfo
fn get_real_ip(headers: &HeaderMap, fallback_ip: &str) -> String {
    if let Some(real_ip) = headers.get("x-real-ip") {
        if let Ok(ip) = real_ip.to_str() {
            let ip = ip.trim();
            if !ip.is_empty() {
                return ip.to_string();
            }
        }
    }

    // X-Forwarded-For may carry a chain of IPs, first is the original client
    if let Some(forwarded) = headers.get("x-forwarded-for") {
        if let Ok(ips) = forwarded.to_str() {
            if let Some(first_ip) = ips.split(',').next() {
                let ip = first_ip.trim();
                if !ip.is_empty() {
                    return ip.to_string();
                }
            }
        }
    }

    fallback_ip.to_string()
}

/// Layer for HTTP access logging
#[derive(Clone, Default)]
pub struct AccessLogLayer;

impl AccessLogLayer {
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for AccessLogLayer {
    type Service = AccessLogMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AccessLogMiddleware { inner }
    }
}

/// Middleware service for HTTP access logging
#[derive(Clone)]
pub struct AccessLogMiddleware<S> {
    inner: S,
}

impl<S> Service<Request<Body>> for AccessLogMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Send + Clone + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let method = request.method().to_string();
            let path = request.uri().path().to_string();
            let query = request
                .uri()
                .query()
                .map(|q| format!("?{}", q))
                .unwrap_or_default();

            let fallback_ip = request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            let ip = get_real_ip(request.headers(), &fallback_ip);

            let should_log = !EXCLUDED_PREFIXES
                .iter()
                .any(|prefix| path.starts_with(prefix));

            let started = Instant::now();
            let response = inner.call(request).await?;

            if should_log {
                tracing::info!(
                    "{} {}{} {} from {} in {}ms",
                    method,
                    path,
                    query,
                    response.status().as_u16(),
                    ip,
                    started.elapsed().as_millis()
                );
            }

            Ok(response)
        })
    }
}
