// Wafer - a stack-machine runtime for a small imperative scripting language

pub mod bytecode;
pub mod utils;
pub mod vm;

pub use bytecode::{BinOp, Instruction};
pub use vm::{Machine, MachineConfig, Registry, VmError, VmResult};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
