use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::fs::File;
use tokio::io::AsyncReadExt;

use crate::error::Result;
use crate::pool::StaticServerPool;
use crate::server::Backend;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerConfig {
    /// `host:port`
    pub address: String,

    #[serde(default = "default_true")]
    pub alive: bool,

    #[serde(default = "default_true")]
    pub ready_to_serve: bool,
}

impl ServerConfig {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            alive: true,
            ready_to_serve: true,
        }
    }
}

/// Client-side settings for one backend pool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientConfig {
    /// Used as the pool name in log events
    pub name: String,

    #[serde(default)]
    pub servers: Vec<ServerConfig>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            name: "backend".to_string(),
            servers: (1..=8)
                .map(|i| ServerConfig::new(format!("127.0.0.1:{}", 8000 + i)))
                .collect(),
        }
    }
}

impl ClientConfig {
    pub async fn from_file(path: &str) -> Result<Self> {
        let mut file = File::open(path).await?;
        let mut content = String::new();
        file.read_to_string(&mut content).await?;
        Self::from_content(&content)
    }

    pub fn from_content(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Builds a pool holding one [`Backend`] per configured server, in order.
    pub fn build_pool(&self) -> Result<StaticServerPool<Backend>> {
        let servers = self
            .servers
            .iter()
            .map(|sc| -> Result<Arc<Backend>> {
                let backend = Backend::parse(&sc.address)?;
                backend.set_alive(sc.alive);
                backend.set_ready_to_serve(sc.ready_to_serve);
                Ok(Arc::new(backend))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(StaticServerPool::from_servers(self.name.clone(), servers))
    }
}

fn default_true() -> bool {
    true
}
