//! Scoped lifecycles for spawned helper processes.

mod child;
pub mod errors;

pub use child::ScopedChild;
pub use errors::ProcessError;
