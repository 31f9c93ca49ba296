//! Command implementations.

pub mod browse;
pub mod register;

pub use browse::run_browse;
pub use register::run_register;
