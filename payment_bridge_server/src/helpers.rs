use std::{net::IpAddr, str::FromStr};

use actix_web::HttpRequest;
use log::{debug, trace};

/// Get the remote IP address from the request, for logging.
///
/// If `use_x_forwarded_for` is set, the first address in the `X-Forwarded-For` header is used when present. Otherwise
/// (or if the header is missing or invalid), the peer address from the connection info is used.
pub fn get_remote_ip(req: &HttpRequest, use_x_forwarded_for: bool) -> Option<IpAddr> {
    let mut result = None;
    if use_x_forwarded_for {
        trace!("Checking X-Forwarded-For header");
        result = req
            .headers()
            .get("X-Forwarded-For")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .and_then(|s| IpAddr::from_str(s.trim()).ok());
        if let Some(ip) = result {
            debug!("Using X-Forwarded-For header for remote address: {ip}");
        }
    }
    result.or_else(|| {
        let peer_addr = req.peer_addr();
        trace!("Using Peer address for remote address: {:?}", peer_addr);
        peer_addr.map(|a| a.ip())
    })
}

/// [`get_remote_ip`], rendered for a log line.
pub fn remote_ip_for_log(req: &HttpRequest, use_x_forwarded_for: bool) -> String {
    get_remote_ip(req, use_x_forwarded_for).map(|ip| ip.to_string()).unwrap_or_else(|| "unknown".to_string())
}
