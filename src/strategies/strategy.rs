use std::sync::Arc;

use crate::pool::ServerPool;

pub trait ServerSelectionStrategy<P: ServerPool + ?Sized>: Send + Sync {
    /// Picks a healthy server from `pool`, or `None` if there is no pool or
    /// nothing in it can serve right now.
    fn choose(&self, pool: Option<&P>) -> Option<Arc<P::Server>>;

    // Optional debug info to be logged per request (e.g., cursor position)
    fn debug_snapshot(&self) -> Option<String> {
        None
    }
}
