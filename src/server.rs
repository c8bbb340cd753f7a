use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};

use http::uri::Authority;

use crate::error::{Error, Result};

/// A backend endpoint as seen by a selection rule.
///
/// Rules only ever read these flags; whoever owns the pool is responsible for
/// flipping them.
pub trait Server: Send + Sync {
    /// Network-level reachability.
    fn is_alive(&self) -> bool;

    /// Application-level readiness.
    fn is_ready_to_serve(&self) -> bool;
}

pub struct Backend {
    pub authority: Authority,
    alive: AtomicBool,
    ready_to_serve: AtomicBool,
}

impl Backend {
    pub fn new(authority: Authority) -> Self {
        Self {
            authority,
            alive: AtomicBool::new(true),
            ready_to_serve: AtomicBool::new(true),
        }
    }

    /// Parses a `host:port` address.
    pub fn parse(address: &str) -> Result<Self> {
        let authority = Authority::from_str(address).map_err(|source| Error::InvalidAddress {
            address: address.to_string(),
            source,
        })?;
        Ok(Self::new(authority))
    }

    pub fn set_alive(&self, alive: bool) {
        self.alive.store(alive, Ordering::Relaxed);
    }

    pub fn set_ready_to_serve(&self, ready: bool) {
        self.ready_to_serve.store(ready, Ordering::Relaxed);
    }
}

impl Server for Backend {
    #[inline]
    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Relaxed)
    }

    #[inline]
    fn is_ready_to_serve(&self) -> bool {
        self.ready_to_serve.load(Ordering::Relaxed)
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.authority.as_str())
    }
}

impl fmt::Debug for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Backend")
            .field("authority", &self.authority.as_str())
            .field("alive", &self.is_alive())
            .field("ready_to_serve", &self.is_ready_to_serve())
            .finish()
    }
}
