use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use parking_lot::RwLock;
use tracing::{debug, trace, warn};

use super::strategy::ServerSelectionStrategy;
use crate::config::ClientConfig;
use crate::pool::ServerPool;
use crate::server::Server;

/// Health checks a single `choose` call may spend before giving up.
pub const MAX_ATTEMPTS: usize = 10;

/// Lock-free cycling index shared by every caller of one rule.
#[derive(Debug, Default)]
pub struct CyclicCursor {
    value: AtomicUsize,
}

impl CyclicCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> usize {
        self.value.load(Ordering::Relaxed)
    }

    /// Advances to `(current + 1) % modulo` and returns the new value.
    ///
    /// Concurrent callers using the same `modulo` each get a distinct step. If
    /// another caller advanced with a different `modulo`, the result is still
    /// in `[0, modulo)` for this caller, only the strict rotation order slips.
    ///
    /// `modulo` must be non-zero.
    pub fn increment_and_get_modulo(&self, modulo: usize) -> usize {
        debug_assert!(modulo > 0, "cursor modulo must be positive");
        loop {
            let current = self.value.load(Ordering::Relaxed);
            let next = (current + 1) % modulo;
            if self
                .value
                .compare_exchange_weak(current, next, Ordering::Relaxed, Ordering::Relaxed)
                .is_ok()
            {
                return next;
            }
        }
    }
}

/// Result of one selection, including why nothing was picked.
#[derive(Debug)]
pub enum Selection<S: ?Sized> {
    Selected { server: Arc<S>, attempts: usize },
    /// No pool was given or bound.
    NoPool,
    /// The pool reported zero reachable or zero total servers. `attempts` is
    /// nonzero when the pool drained after some candidates were already checked.
    EmptyPool {
        reachable: usize,
        total: usize,
        attempts: usize,
    },
    /// Every candidate inspected was unhealthy.
    Exhausted { attempts: usize },
}

impl<S: ?Sized> Selection<S> {
    pub fn into_server(self) -> Option<Arc<S>> {
        match self {
            Selection::Selected { server, .. } => Some(server),
            _ => None,
        }
    }

    /// Health checks spent before the call returned.
    pub fn attempts(&self) -> usize {
        match self {
            Selection::Selected { attempts, .. }
            | Selection::EmptyPool { attempts, .. }
            | Selection::Exhausted { attempts } => *attempts,
            Selection::NoPool => 0,
        }
    }
}

/// Round-robin over all known servers, skipping ones that are not both alive
/// and ready to serve.
///
/// The rotation runs over `all_servers`, not only the reachable ones, so a dead
/// server still takes its turn and costs an attempt. A slot that disappears
/// because the pool shrank between reads is retried for free.
pub struct RoundRobinRule<P: ?Sized> {
    cursor: CyclicCursor,
    pool: RwLock<Option<Arc<P>>>,
}

impl<P: ServerPool + ?Sized> RoundRobinRule<P> {
    pub fn new() -> Self {
        Self {
            cursor: CyclicCursor::new(),
            pool: RwLock::new(None),
        }
    }

    pub fn with_pool(pool: Arc<P>) -> Self {
        let rule = Self::new();
        rule.set_pool(pool);
        rule
    }

    pub fn set_pool(&self, pool: Arc<P>) {
        *self.pool.write() = Some(pool);
    }

    pub fn pool(&self) -> Option<Arc<P>> {
        self.pool.read().clone()
    }

    /// Accepts client configuration. Round-robin has nothing to tune.
    pub fn init_with_client_config(&self, config: &ClientConfig) {
        debug!(client = %config.name, "client config accepted");
    }

    pub fn cursor(&self) -> &CyclicCursor {
        &self.cursor
    }

    pub fn choose(&self, pool: Option<&P>) -> Option<Arc<P::Server>> {
        self.choose_with_outcome(pool).into_server()
    }

    /// Selects from the pool bound with [`with_pool`](Self::with_pool) or
    /// [`set_pool`](Self::set_pool).
    pub fn choose_bound(&self) -> Option<Arc<P::Server>> {
        let pool = self.pool();
        self.choose(pool.as_deref())
    }

    pub fn choose_with_outcome(&self, pool: Option<&P>) -> Selection<P::Server> {
        let Some(pool) = pool else {
            warn!("no server pool bound to round-robin rule");
            return Selection::NoPool;
        };

        let mut attempts = 0;
        while attempts < MAX_ATTEMPTS {
            let reachable = pool.reachable_servers().len();
            let total = pool.all_servers().len();
            if reachable == 0 || total == 0 {
                warn!(pool = pool.name(), reachable, total, attempts, "no up servers available");
                return Selection::EmptyPool {
                    reachable,
                    total,
                    attempts,
                };
            }

            let index = self.cursor.increment_and_get_modulo(total);
            let Some(server) = pool.server_at(index) else {
                // pool shrank since `all_servers`; not the server's fault
                trace!(pool = pool.name(), index, total, "slot vanished, retrying");
                thread::yield_now();
                continue;
            };

            attempts += 1;
            if server.is_alive() && server.is_ready_to_serve() {
                debug!(pool = pool.name(), index, attempts, "selected server");
                return Selection::Selected { server, attempts };
            }
            trace!(pool = pool.name(), index, attempts, "skipping unhealthy server");
        }

        warn!(
            pool = pool.name(),
            attempts,
            max_attempts = MAX_ATTEMPTS,
            "no available alive servers"
        );
        Selection::Exhausted { attempts }
    }
}

impl<P: ServerPool + ?Sized> Default for RoundRobinRule<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: ServerPool + ?Sized> ServerSelectionStrategy<P> for RoundRobinRule<P> {
    fn choose(&self, pool: Option<&P>) -> Option<Arc<P::Server>> {
        RoundRobinRule::choose(self, pool)
    }

    fn debug_snapshot(&self) -> Option<String> {
        Some(format!("cursor: {}", self.cursor.current()))
    }
}
