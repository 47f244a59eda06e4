//! Target program representation and the source emitters.

pub mod emit;
pub mod unit;

pub use emit::{Emitter, Language};
pub use unit::Unit;
