pub mod builtin;
pub mod error;
pub mod event;
pub mod execute;
pub mod jobs;
pub mod lexer;
pub mod pipeline;
pub mod prelude;
pub mod prompt;
pub mod shellenv;
pub mod shopt;
pub mod signal;
pub mod terminal;

#[cfg(test)]
mod tests;

pub use crate::error::{JcshErr, JcshResult};
