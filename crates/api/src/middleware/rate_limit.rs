//! Rate limiting middleware using governor and `tower_governor`.
//!
//! Only the authentication endpoints are limited (~10/min per client IP).
//! The client IP is the socket peer address. `X-Forwarded-For` and
//! `X-Real-IP` are read only when `AMORK_TRUST_PROXY` is set, because any
//! client can put arbitrary values in them when nothing in front of the
//! server overwrites them.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, Request};
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

/// Key extractor for the client IP.
///
/// With `trust_proxy` the order is: first entry of `X-Forwarded-For`, then
/// `X-Real-IP`, then the peer address from `ConnectInfo`. Without it only
/// the peer address counts.
#[derive(Clone, Copy)]
pub struct ClientIpKeyExtractor {
    pub trust_proxy: bool,
}

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        let forwarded = self.trust_proxy.then(|| forwarded_ip(req.headers()));
        if let Some(ip) = forwarded.flatten() {
            return Ok(ip);
        }

        req.extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

fn forwarded_ip(headers: &HeaderMap) -> Option<IpAddr> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .and_then(|s| s.trim().parse::<IpAddr>().ok())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<IpAddr>().ok())
        })
}

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Create rate limiter for auth endpoints: ~10 requests per minute per IP.
///
/// One token every 6 seconds, burst of 5.
///
/// # Panics
///
/// This function will not panic. `per_second(6)` and `burst_size(5)` are
/// positive integers, which `GovernorConfigBuilder` always accepts.
#[must_use]
pub fn auth_rate_limiter(trust_proxy: bool) -> RateLimiterLayer {
    let config = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor { trust_proxy })
        .per_second(6)
        .burst_size(5)
        .finish()
        .expect("rate limiter config with per_second(6) and burst_size(5) is valid");
    GovernorLayer::new(Arc::new(config))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tower_governor::key_extractor::KeyExtractor;

    use super::*;

    fn request(headers: &[(&str, &str)]) -> Request<()> {
        let mut builder = Request::builder().uri("/api/auth/login");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap()
    }

    const TRUSTED: ClientIpKeyExtractor = ClientIpKeyExtractor { trust_proxy: true };
    const DIRECT: ClientIpKeyExtractor = ClientIpKeyExtractor { trust_proxy: false };

    fn peer() -> SocketAddr {
        "192.0.2.10:5555".parse().unwrap()
    }

    #[test]
    fn test_forwarded_for_takes_first_hop_behind_proxy() {
        let req = request(&[
            ("x-forwarded-for", "203.0.113.7, 10.0.0.1"),
            ("x-real-ip", "198.51.100.2"),
        ]);
        let ip = TRUSTED.extract(&req).unwrap();
        assert_eq!(ip, "203.0.113.7".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_real_ip_fallback_behind_proxy() {
        let req = request(&[("x-real-ip", "198.51.100.2")]);
        let ip = TRUSTED.extract(&req).unwrap();
        assert_eq!(ip, "198.51.100.2".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_forwarded_headers_ignored_without_proxy() {
        for spoofed in ["203.0.113.7", "203.0.113.8"] {
            let mut req = request(&[("x-forwarded-for", spoofed), ("x-real-ip", spoofed)]);
            req.extensions_mut().insert(ConnectInfo(peer()));
            assert_eq!(DIRECT.extract(&req).unwrap(), peer().ip());
        }
    }

    #[test]
    fn test_connect_info_fallback() {
        let mut req = request(&[("x-forwarded-for", "not-an-ip")]);
        req.extensions_mut().insert(ConnectInfo(peer()));
        assert_eq!(TRUSTED.extract(&req).unwrap(), peer().ip());
    }

    #[test]
    fn test_no_source_is_an_error() {
        let req = request(&[("x-forwarded-for", "203.0.113.7")]);
        assert!(DIRECT.extract(&req).is_err());
        let req = request(&[("x-forwarded-for", "not-an-ip")]);
        assert!(TRUSTED.extract(&req).is_err());
    }
}
