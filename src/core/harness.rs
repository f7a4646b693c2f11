//! Driving harness for the address generator and its stream taps.
//!
//! The harness is the free-running clock: it invokes `step()` on every owned
//! component once per discrete time unit, in a fixed order, and records what
//! the downstream consumer would accept. The primary generator runs in
//! lockstep with a shadow copy through a [`CopyMonitor`], and its output is
//! checksummed through a [`ParitySource`]/[`ParitySink`] pair, mirroring the
//! duplicate-stream fault scheme the generator is deployed with.

use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Bernoulli, Distribution};
use uuid::Uuid;

use super::addrgen::{AddressGenerator, GeneratorInputs, GeneratorOutputs};
use super::config::{ConfigError, GeneratorConfig};
use super::monitor::{CopyMonitor, ParitySink, ParitySource};
use super::types::SimulationTime;

/// Per-cycle consumer readiness.
pub struct ReadyDriver {
    kind: DriverKind,
}

enum DriverKind {
    Always,
    Scripted(Vec<bool>),
    Random { pattern: Bernoulli, rng: StdRng },
}

impl ReadyDriver {
    /// Consumer ready on every cycle.
    pub fn always() -> Self {
        Self {
            kind: DriverKind::Always,
        }
    }

    /// Readiness follows the given pattern, repeated. An empty pattern means
    /// always ready.
    pub fn scripted(pattern: Vec<bool>) -> Self {
        Self {
            kind: DriverKind::Scripted(pattern),
        }
    }

    /// Seeded Bernoulli backpressure: ready with the given probability each
    /// cycle.
    pub fn random(ready_probability: f64, seed: u64) -> Result<Self, HarnessError> {
        let pattern = Bernoulli::new(ready_probability)
            .map_err(|_| HarnessError::InvalidReadyProbability(ready_probability))?;
        Ok(Self {
            kind: DriverKind::Random {
                pattern,
                rng: StdRng::seed_from_u64(seed),
            },
        })
    }

    fn sample(&mut self, cycle: SimulationTime) -> bool {
        match &mut self.kind {
            DriverKind::Always => true,
            DriverKind::Scripted(pattern) => {
                if pattern.is_empty() {
                    true
                } else {
                    pattern[(cycle as usize) % pattern.len()]
                }
            }
            DriverKind::Random { pattern, rng } => pattern.sample(rng),
        }
    }
}

/// Everything observed during one harness cycle.
#[derive(Debug, Clone, Copy)]
struct CycleRecord {
    outputs: GeneratorOutputs,
    transferred: bool,
    copy_fault: bool,
    parity_fault: bool,
}

/// What one run produced, as seen by the consumer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunTrace {
    /// Addresses accepted (valid met ready), in order.
    pub accepted: Vec<u32>,
    /// Cycle on which the completion pulse was observed.
    pub done_cycle: Option<SimulationTime>,
    /// Cycles where the lockstep copy monitor raised a fault.
    pub copy_faults: u64,
    /// Cycles where the parity sink raised a fault.
    pub parity_faults: u64,
}

/// Errors raised while driving a run.
#[derive(Debug, Clone, PartialEq)]
pub enum HarnessError {
    /// Ready probability outside [0, 1].
    InvalidReadyProbability(f64),
    /// The generator did not complete within the cycle budget.
    CycleBudgetExhausted { budget: u64 },
}

impl std::fmt::Display for HarnessError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HarnessError::InvalidReadyProbability(p) => {
                write!(f, "ready probability {} outside [0, 1]", p)
            }
            HarnessError::CycleBudgetExhausted { budget } => {
                write!(f, "run did not complete within {} cycles", budget)
            }
        }
    }
}

impl std::error::Error for HarnessError {}

/// Clock source and wiring for one generator instance and its taps.
pub struct StreamHarness {
    run_id: Uuid,
    generator: AddressGenerator,
    shadow: AddressGenerator,
    copy_monitor: CopyMonitor,
    parity_source: ParitySource,
    parity_sink: ParitySink,
    ready: ReadyDriver,
    cycle: SimulationTime,
}

impl StreamHarness {
    /// Build the harness: a primary and a lockstep shadow generator from the
    /// same configuration, plus the monitor taps.
    pub fn new(config: GeneratorConfig, ready: ReadyDriver) -> Result<Self, ConfigError> {
        let generator = AddressGenerator::new(config.clone())?;
        let shadow = AddressGenerator::new(config)?;
        Ok(Self {
            run_id: Uuid::new_v4(),
            generator,
            shadow,
            copy_monitor: CopyMonitor::new(),
            parity_source: ParitySource::new(),
            parity_sink: ParitySink::new(),
            ready,
            cycle: 0,
        })
    }

    /// Prime the generator and drive advancing cycles until the completion
    /// pulse, or fail once `max_cycles` advancing cycles have elapsed.
    pub fn run_once(&mut self, max_cycles: u64) -> Result<RunTrace, HarnessError> {
        let mut trace = RunTrace::default();
        info!(
            "[{}] priming run of {} elements",
            self.run_id,
            self.generator.config().masked_total()
        );

        let ready = self.ready.sample(self.cycle);
        self.step_cycle(GeneratorInputs {
            ready,
            enable: true,
            clear: false,
            presample: true,
        });

        for _ in 0..max_cycles {
            let at = self.cycle;
            let ready = self.ready.sample(at);
            let record = self.step_cycle(GeneratorInputs {
                ready,
                enable: true,
                ..GeneratorInputs::default()
            });
            if record.transferred {
                trace.accepted.push(record.outputs.addr);
            }
            if record.copy_fault {
                trace.copy_faults += 1;
            }
            if record.parity_fault {
                trace.parity_faults += 1;
            }
            if record.outputs.done {
                trace.done_cycle = Some(at);
                info!(
                    "[{}] run complete: {} beats, done on cycle {}",
                    self.run_id,
                    trace.accepted.len(),
                    at
                );
                return Ok(trace);
            }
        }
        Err(HarnessError::CycleBudgetExhausted { budget: max_cycles })
    }

    /// Drive advancing cycles without re-priming. Returns the cycle of the
    /// first unexpected event (a transfer or a completion pulse), if any.
    pub fn coast(&mut self, cycles: u64) -> Option<SimulationTime> {
        for _ in 0..cycles {
            let at = self.cycle;
            let ready = self.ready.sample(at);
            let record = self.step_cycle(GeneratorInputs {
                ready,
                enable: true,
                ..GeneratorInputs::default()
            });
            if record.outputs.done || record.transferred {
                return Some(at);
            }
        }
        None
    }

    /// Pulse clear for one cycle, aborting any run in flight.
    pub fn clear(&mut self) {
        let ready = self.ready.sample(self.cycle);
        self.step_cycle(GeneratorInputs {
            ready,
            enable: true,
            clear: true,
            presample: false,
        });
    }

    /// Unique id of this harness instance, for log correlation.
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn current_cycle(&self) -> SimulationTime {
        self.cycle
    }

    /// Drive every component for one cycle, primary first, taps after.
    fn step_cycle(&mut self, inputs: GeneratorInputs) -> CycleRecord {
        debug!("=== Simulation Cycle {} ===", self.cycle);

        let outputs = self.generator.step(inputs);
        let shadow_outputs = self.shadow.step(inputs);

        let copy_fault = self.copy_monitor.observe(
            outputs.valid,
            outputs.beat(),
            shadow_outputs.valid,
            shadow_outputs.beat(),
        );
        let (checksum_valid, checksum) = self.parity_source.tick(outputs.valid, outputs.beat());
        let parity_fault =
            self.parity_sink
                .tick(outputs.valid, outputs.beat(), checksum_valid, checksum);

        let transferred = outputs.valid && inputs.ready;
        if transferred {
            debug!(
                "[{}] transfer 0x{:08x} on cycle {}",
                self.run_id, outputs.addr, self.cycle
            );
        }

        self.cycle += 1;
        CycleRecord {
            outputs,
            transferred,
            copy_fault,
            parity_fault,
        }
    }
}
