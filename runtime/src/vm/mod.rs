mod config;
mod error;
mod machine;
mod registry;

pub use config::MachineConfig;
pub use error::{VmError, VmResult};
pub use machine::Machine;
pub use registry::{Callable, NativeFn, Registry};
