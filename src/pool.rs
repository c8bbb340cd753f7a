use std::sync::Arc;

use parking_lot::RwLock;

use crate::server::{Backend, Server};

/// The view of the backend pool a selection rule works against.
///
/// Implementations may change between any two calls; rules must not assume
/// that `reachable_servers`, `all_servers` and `server_at` agree with each
/// other.
pub trait ServerPool: Send + Sync {
    type Server: Server + ?Sized;

    /// Used in log events.
    fn name(&self) -> &str;

    fn reachable_servers(&self) -> Vec<Arc<Self::Server>>;

    fn all_servers(&self) -> Vec<Arc<Self::Server>>;

    /// `None` when `index` is past the end of the pool as it is right now.
    fn server_at(&self, index: usize) -> Option<Arc<Self::Server>> {
        self.all_servers().get(index).cloned()
    }
}

/// In-memory pool, mutated by whoever owns it.
pub struct StaticServerPool<S: ?Sized = Backend> {
    name: String,
    servers: RwLock<Vec<Arc<S>>>,
}

impl<S: Server + ?Sized> StaticServerPool<S> {
    pub fn new(name: impl Into<String>) -> Self {
        Self::from_servers(name, Vec::new())
    }

    pub fn from_servers(name: impl Into<String>, servers: Vec<Arc<S>>) -> Self {
        Self {
            name: name.into(),
            servers: RwLock::new(servers),
        }
    }

    pub fn add_server(&self, server: Arc<S>) {
        self.servers.write().push(server);
    }

    /// Removes the server at `index`, shifting the rest down.
    pub fn remove_server(&self, index: usize) -> Option<Arc<S>> {
        let mut servers = self.servers.write();
        if index < servers.len() {
            Some(servers.remove(index))
        } else {
            None
        }
    }

    pub fn replace_servers(&self, servers: Vec<Arc<S>>) -> Vec<Arc<S>> {
        std::mem::replace(&mut *self.servers.write(), servers)
    }

    pub fn len(&self) -> usize {
        self.servers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.read().is_empty()
    }
}

impl<S: Server + ?Sized> ServerPool for StaticServerPool<S> {
    type Server = S;

    fn name(&self) -> &str {
        &self.name
    }

    fn reachable_servers(&self) -> Vec<Arc<S>> {
        self.servers
            .read()
            .iter()
            .filter(|s| s.is_alive())
            .cloned()
            .collect()
    }

    fn all_servers(&self) -> Vec<Arc<S>> {
        self.servers.read().clone()
    }

    fn server_at(&self, index: usize) -> Option<Arc<S>> {
        self.servers.read().get(index).cloned()
    }
}
