use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use serde::Deserialize;

use crate::{cors::CorsConfig, health::HealthConfig};

/// Address the server binds to when none is configured
pub const DEFAULT_LISTEN_ADDRESS: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 5002);

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default = "default_listen_address")]
    pub listen_address: SocketAddr,
    #[serde(default)]
    pub health: HealthConfig,
    #[serde(default)]
    pub cors: CorsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_address: DEFAULT_LISTEN_ADDRESS,
            health: HealthConfig::default(),
            cors: CorsConfig::default(),
        }
    }
}

const fn default_listen_address() -> SocketAddr {
    DEFAULT_LISTEN_ADDRESS
}
