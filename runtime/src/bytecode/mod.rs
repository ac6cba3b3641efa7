mod instruction;

pub use instruction::{BinOp, Instruction};
