//! Analysis passes over the AST shared by code generation and tooling.

pub mod infer;
pub mod naming;
pub mod resolve;
