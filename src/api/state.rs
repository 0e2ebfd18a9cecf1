//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use crate::config::ApiConfig;
use crate::storage::Store;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// The in-memory store
    pub store: Arc<Store>,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
    /// Cleared while the startup dataset is still loading
    ready: Arc<AtomicBool>,
}

impl AppState {
    /// Create a state that is ready to serve
    pub fn new(store: Arc<Store>, config: ApiConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
            start_time: Instant::now(),
            ready: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Create a state that reports not-ready until `mark_ready` is called
    pub fn loading(store: Arc<Store>, config: ApiConfig) -> Self {
        let state = Self::new(store, config);
        state.ready.store(false, Ordering::Release);
        state
    }

    /// Flag the startup import as finished
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
