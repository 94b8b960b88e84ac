pub mod app;
pub mod cli;
pub mod config;
pub mod output;
pub mod pool;
pub mod probe;
pub mod runner;
pub mod utils;

#[cfg(test)]
mod tests;
