pub mod core;
pub mod macros;

// Re-export commonly used types
pub use crate::core::addrgen::{AddressGenerator, GeneratorInputs, GeneratorOutputs};
pub use crate::core::config::{ConfigError, DimensionConfig, GeneratorConfig};
pub use crate::core::harness::{HarnessError, ReadyDriver, RunTrace, StreamHarness};
pub use crate::core::monitor::{CopyMonitor, ParitySink, ParitySource, ZeroMonitor};
pub use crate::core::stream::{StreamBeat, STRB_FULL};
