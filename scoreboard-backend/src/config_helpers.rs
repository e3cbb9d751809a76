use std::net::{IpAddr, Ipv6Addr, SocketAddr};

/// Parse host:port into a SocketAddr, with fallback to 0.0.0.0.
pub fn parse_bind_address(host: &str, port: u16) -> SocketAddr {
    host.parse::<IpAddr>()
        .map(|ip| SocketAddr::new(ip, port))
        .or_else(|_| host.parse::<SocketAddr>())
        .or_else(|_| host.parse::<Ipv6Addr>().map(|ip| SocketAddr::new(IpAddr::V6(ip), port)))
        .unwrap_or_else(|_| {
            if host != "localhost" {
                tracing::warn!(%host, "host is not an IP address; binding all interfaces");
                return SocketAddr::from(([0, 0, 0, 0], port));
            }
            SocketAddr::from(([127, 0, 0, 1], port))
        })
}
