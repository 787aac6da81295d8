pub mod calculator;
pub mod config;
pub mod coordinator;
pub mod engine;
pub mod error;
pub mod executor;
pub mod segment;
pub mod sieve;
