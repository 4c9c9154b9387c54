//! # plugctl Kernel
//!
//! Shared foundations for the rest of the crate: the crate-wide [`Error`]
//! type with its [`Result`] alias, and the path and naming constants used
//! when walking project and engine trees.
pub mod constants;
pub mod error;

pub use error::{Error, Result};

#[cfg(test)]
mod tests;
