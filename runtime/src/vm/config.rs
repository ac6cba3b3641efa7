//! Machine configuration options

/// Configuration options for the wafer machine
#[derive(Clone, Debug)]
pub struct MachineConfig {
    /// Print every dispatched instruction and the operand stack
    pub trace: bool,
    /// Abort with `StepLimitExceeded` after this many instructions.
    /// `None` means a non-terminating program runs forever.
    pub step_limit: Option<u64>,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            trace: false,
            step_limit: None,
        }
    }
}

impl MachineConfig {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable instruction tracing
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    /// Set an instruction budget
    pub fn with_step_limit(mut self, limit: u64) -> Self {
        self.step_limit = Some(limit);
        self
    }
}
