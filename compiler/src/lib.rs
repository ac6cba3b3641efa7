pub mod cli;
pub mod codegen;
pub mod lexer;
pub mod parser;

pub use cli::*;
pub use codegen::*;
pub use lexer::*;
pub use parser::*;
