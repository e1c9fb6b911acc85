//! Construction-time machine configuration.

/// Default call-stack depth limit.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 1024;

/// Settings fixed when a [`Machine`](crate::Machine) is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MachineConfig {
    /// Emit extra diagnostics from profiling instructions and on halt.
    /// Never changes program semantics.
    pub debug: bool,
    /// Maximum number of live user call frames.
    pub max_call_depth: usize,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            debug: false,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}

impl MachineConfig {
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }
}
