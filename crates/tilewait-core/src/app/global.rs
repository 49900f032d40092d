//! Process-wide default queue.
//!
//! Library code takes an injected `Arc<TileExampleQueue>`. Only the outermost
//! composition point (the CLI) reaches for the global one.

use std::sync::{Arc, OnceLock};

use super::queue::TileExampleQueue;

static GLOBAL_QUEUE: OnceLock<Arc<TileExampleQueue>> = OnceLock::new();

impl TileExampleQueue {
    /// The shared queue, created with the default policy on first use.
    pub fn global() -> Arc<TileExampleQueue> {
        Arc::clone(GLOBAL_QUEUE.get_or_init(|| Arc::new(TileExampleQueue::default())))
    }

    /// Install `queue` as the global one. Fails (handing the queue back) if
    /// the global queue already exists.
    pub fn install_global(queue: Arc<TileExampleQueue>) -> Result<(), Arc<TileExampleQueue>> {
        GLOBAL_QUEUE.set(queue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QueuePolicy;

    #[test]
    fn global_is_created_once() {
        let a = TileExampleQueue::global();
        let b = TileExampleQueue::global();
        assert!(Arc::ptr_eq(&a, &b));

        let other = Arc::new(TileExampleQueue::new(QueuePolicy::manual()));
        assert!(TileExampleQueue::install_global(other).is_err());
    }
}
