//! TCP listener binding with port fallback.

use std::io::ErrorKind;
use std::net::{IpAddr, SocketAddr};

use tokio::net::TcpListener;

/// Binds `host:port`, moving on to the next port while the current one is in
/// use, for at most `attempts` ports.
///
/// # Errors
///
/// Returns the last bind error once `attempts` ports have been tried, or the
/// first error that is not [`ErrorKind::AddrInUse`].
pub async fn bind_with_fallback(
    host: IpAddr,
    port: u16,
    attempts: u16,
) -> std::io::Result<TcpListener> {
    let mut candidate = port;
    let mut remaining = attempts.max(1);
    loop {
        match TcpListener::bind(SocketAddr::new(host, candidate)).await {
            Ok(listener) => return Ok(listener),
            Err(e) if e.kind() == ErrorKind::AddrInUse && remaining > 1 => {
                let Some(next) = candidate.checked_add(1) else {
                    return Err(e);
                };
                tracing::warn!(port = candidate, next, "Port is in use, trying the next one");
                candidate = next;
                remaining -= 1;
            }
            Err(e) => return Err(e),
        }
    }
}
