use thiserror::Error;

/// Error type for machine execution.
///
/// Every fault identifies its kind and the index of the faulting
/// instruction. The machine aborts at the first fault; the state left
/// behind is useful for diagnostics only.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VmError {
    #[error("Stack underflow at instruction {pc}")]
    StackUnderflow { pc: usize },

    #[error("Variable '{name}' is not bound at instruction {pc}")]
    UnboundVariable { name: String, pc: usize },

    #[error("Division by zero at instruction {pc}")]
    DivisionByZero { pc: usize },

    #[error("Unknown callable '{name}' at instruction {pc}")]
    UnknownCallable { name: String, pc: usize },

    #[error("Callable '{name}' expects {expected} arguments, got {found} at instruction {pc}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
        pc: usize,
    },

    #[error("Invalid jump target {target} at instruction {pc}")]
    InvalidJumpTarget { target: usize, pc: usize },

    #[error("Step limit of {limit} instructions exceeded")]
    StepLimitExceeded { limit: u64 },
}

/// Result type for machine operations
pub type VmResult<T> = Result<T, VmError>;
