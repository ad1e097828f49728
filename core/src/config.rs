/// Namespace the reconciler's `Debugger` reports under unless configured otherwise
pub const DEFAULT_DEBUG_NAMESPACE: &str = "datasync::reconciler";

/// Tuning knobs for a `Reconciler`. Cloned into the reconciler at construction and never
/// mutated afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReconcilerConfig {
    /// Initial capacity of each of the two snapshot buffers
    pub snapshot_capacity: usize,
    /// Emit a `warn!` when two entities in the same pass map to one key. The later entity wins
    /// either way; this only controls the log line.
    pub warn_on_duplicate_keys: bool,
    /// Emit a `trace!` line for every dispatched callback
    pub trace_callbacks: bool,
    /// Namespace matched against the `DATASYNC_*_INCLUDE/EXCLUDE` patterns
    pub debug_namespace: String,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            snapshot_capacity: 0,
            warn_on_duplicate_keys: true,
            trace_callbacks: false,
            debug_namespace: DEFAULT_DEBUG_NAMESPACE.to_string(),
        }
    }
}

impl ReconcilerConfig {
    pub fn snapshot_capacity(mut self, capacity: usize) -> Self {
        self.snapshot_capacity = capacity;
        self
    }

    pub fn warn_on_duplicate_keys(mut self, enabled: bool) -> Self {
        self.warn_on_duplicate_keys = enabled;
        self
    }

    pub fn trace_callbacks(mut self, enabled: bool) -> Self {
        self.trace_callbacks = enabled;
        self
    }

    pub fn debug_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.debug_namespace = namespace.into();
        self
    }
}
