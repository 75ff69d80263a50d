//! Logging setup

pub mod output;
#[cfg(test)]
mod tests;

pub use output::setup_output;
