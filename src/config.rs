//! Heap configuration
//!
//! [`HeapConfig`] controls arena pre-sizing and whether the heap emits
//! `tracing` events. Tracing is off by default.
//!
//! # Example
//!
//! ```rust
//! use fibheap::config::HeapConfig;
//! use fibheap::fibonacci::FibonacciHeap;
//!
//! let config = HeapConfig::default().with_trace(true).with_capacity(1024);
//! let heap: FibonacciHeap<&str, u32> = FibonacciHeap::with_config(config);
//! assert!(heap.config().trace);
//! ```

/// Environment variable read by [`HeapConfig::from_env`]
pub const TRACE_ENV_VAR: &str = "FIBHEAP_TRACE";

/// Configuration for a [`FibonacciHeap`](crate::fibonacci::FibonacciHeap)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HeapConfig {
    /// Emit `tracing` events for consolidation, cuts and unions
    pub trace: bool,
    /// Number of nodes to reserve in the arena up front
    pub capacity: usize,
}

impl HeapConfig {
    /// Sets whether structural tracing is enabled.
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    /// Sets the initial arena capacity.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Builds a config from the process environment.
    ///
    /// `FIBHEAP_TRACE` set to `1`, `true`, `yes` or `on` (any case) enables
    /// tracing. Anything else, or an unset variable, leaves it off.
    pub fn from_env() -> Self {
        let trace = std::env::var(TRACE_ENV_VAR)
            .map(|value| parse_flag(&value))
            .unwrap_or(false);
        Self::default().with_trace(trace)
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
