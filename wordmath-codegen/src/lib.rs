pub mod codegen;
pub mod value;
pub mod vm;

pub use codegen::Codegen;
pub use vm::{InterpretResult, Vm};
