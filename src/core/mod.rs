pub mod addrgen;
pub mod config;
pub mod harness;
pub mod monitor;
pub mod stream;
pub mod types;
