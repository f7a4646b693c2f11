//! Multi-dimensional address generator driving a valid/ready stream.
//!
//! The generator walks an N-dimensional nested-loop iteration space one
//! element per advancing clock cycle, dimension 0 fastest-varying. Each
//! dimension owns a step counter and an accumulated partial address; a carry
//! ripples outward when a dimension completes its configured length. The
//! emitted address is the base address plus every partial address, wrapping
//! mod 2^32.
//!
//! All state is committed exactly once per [`AddressGenerator::step`] call,
//! from the current state and the sampled control inputs; the outputs
//! returned by `step` are what a downstream consumer observes during that
//! same cycle.

use log::debug;

use super::config::{ConfigError, GeneratorConfig};
use super::stream::{StreamBeat, STRB_FULL};
use super::types::{mask32, mask64};

/// Control inputs sampled once per clock tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeneratorInputs {
    /// Downstream consumer readiness.
    pub ready: bool,
    /// Master enable; state freezes while deasserted.
    pub enable: bool,
    /// Synchronous restart without priming: next cycle holds the start state
    /// with valid deasserted.
    pub clear: bool,
    /// One-shot priming pulse: next cycle presents the first element of the
    /// run as valid. Takes priority over `clear`.
    pub presample: bool,
}

impl GeneratorInputs {
    /// Normal advancing cycle: consumer ready, generator enabled.
    pub fn advance() -> Self {
        Self {
            ready: true,
            enable: true,
            ..Self::default()
        }
    }

    /// Consumer not ready; state holds.
    pub fn stall() -> Self {
        Self {
            enable: true,
            ..Self::default()
        }
    }

    /// Priming pulse, issued one cycle before a run begins.
    pub fn presample() -> Self {
        Self {
            ready: true,
            enable: true,
            presample: true,
            ..Self::default()
        }
    }

    /// Abort pulse; restarts iteration with no valid first element.
    pub fn clear() -> Self {
        Self {
            ready: true,
            enable: true,
            clear: true,
            ..Self::default()
        }
    }
}

/// Outputs observed by the consumer during the cycle `step` was called for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorOutputs {
    /// The held address is a legitimate element of the run.
    pub valid: bool,
    /// Summed output address: base plus every partial address, mod 2^32.
    pub addr: u32,
    /// Constant all-ones lane mask accompanying each address.
    pub strb: u8,
    /// One-cycle completion pulse; high on the advancing cycle that observes
    /// the overall count reaching the configured total.
    pub done: bool,
}

impl GeneratorOutputs {
    /// The output side viewed as a stream payload.
    pub fn beat(&self) -> StreamBeat {
        StreamBeat::with_strb(self.addr, self.strb)
    }
}

/// Carry-propagating odometer over the configured dimensions, with a
/// registered valid/address pipeline and completion detection.
#[derive(Debug, Clone)]
pub struct AddressGenerator {
    config: GeneratorConfig,
    trans_mask: u64,
    cnt_mask: u32,
    total: u64,
    dim_count: Vec<u32>,
    partial_addr: Vec<i32>,
    overall_count: u64,
    output_valid: bool,
}

impl AddressGenerator {
    /// Build a generator for the given configuration. Configurations without
    /// dimensions or with out-of-range counter widths are rejected outright.
    pub fn new(config: GeneratorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let dims = config.dimensions.len();
        let trans_mask = mask64(config.trans_bits);
        let cnt_mask = mask32(config.cnt_bits);
        let total = config.total_count & trans_mask;
        Ok(Self {
            config,
            trans_mask,
            cnt_mask,
            total,
            dim_count: vec![0; dims],
            partial_addr: vec![0; dims],
            overall_count: 0,
            output_valid: false,
        })
    }

    /// Power-on state: counters at their start, nothing valid.
    pub fn reset(&mut self) {
        self.prime(false);
    }

    /// Advance one clock tick.
    ///
    /// The returned outputs are what the consumer sees during this cycle;
    /// the internal state is then committed for the next one. A transfer
    /// occurs on cycles where `valid` here meets `ready` in the inputs.
    pub fn step(&mut self, inputs: GeneratorInputs) -> GeneratorOutputs {
        let advancing = inputs.ready && inputs.enable && !inputs.clear && !inputs.presample;

        let outputs = GeneratorOutputs {
            valid: self.output_valid,
            addr: self.summed_address(),
            strb: STRB_FULL,
            done: advancing && self.overall_count == self.total,
        };

        if inputs.presample {
            self.prime(true);
            debug!("generator primed, first element 0x{:08x}", self.summed_address());
        } else if inputs.clear {
            self.prime(false);
            debug!("generator cleared");
        } else if advancing {
            if self.overall_count < self.total {
                self.advance_dimensions();
            }
            self.overall_count = (self.overall_count + 1) & self.trans_mask;
            self.output_valid = self.overall_count < self.total;
            if outputs.done {
                debug!("iteration exhausted after {} elements", self.total);
            }
        }

        outputs
    }

    /// The address currently held by the output pipeline.
    pub fn current_address(&self) -> u32 {
        self.summed_address()
    }

    /// Whether the held address is a legitimate element this cycle.
    pub fn output_valid(&self) -> bool {
        self.output_valid
    }

    /// Elements advanced past so far in this run, mod 2^trans_bits.
    pub fn overall_count(&self) -> u64 {
        self.overall_count
    }

    /// The configuration this generator was built from.
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    fn prime(&mut self, valid: bool) {
        for count in &mut self.dim_count {
            *count = 0;
        }
        for partial in &mut self.partial_addr {
            *partial = 0;
        }
        self.overall_count = 0;
        self.output_valid = valid;
    }

    /// One advancing step of the counter bank. Dimensions are visited
    /// fastest-varying first; the first enabled dimension that has steps
    /// left absorbs the carry, completed dimensions roll back to their
    /// start and pass the carry outward. A carry falling off the last
    /// dimension means a full outer cycle and is silent.
    fn advance_dimensions(&mut self) {
        for (i, dim) in self.config.dimensions.iter().enumerate() {
            if !dim.enabled {
                continue;
            }
            let length = (dim.length & self.cnt_mask) as u64;
            if (self.dim_count[i] as u64) + 1 < length {
                self.dim_count[i] = self.dim_count[i].wrapping_add(1) & self.cnt_mask;
                self.partial_addr[i] = self.partial_addr[i].wrapping_add(dim.stride);
                return;
            }
            self.dim_count[i] = 0;
            self.partial_addr[i] = 0;
        }
    }

    fn summed_address(&self) -> u32 {
        self.partial_addr
            .iter()
            .fold(self.config.base_address, |acc, partial| {
                acc.wrapping_add(*partial as u32)
            })
    }
}
