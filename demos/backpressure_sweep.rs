//! Parallel sweep of random configurations under random backpressure.
//!
//! Every case drives the cycle model through the harness and checks the
//! accepted stream against the closed-form walk.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use stridesim::{DimensionConfig, GeneratorConfig, ReadyDriver, StreamHarness};

const CASES: u64 = 256;
const CYCLE_BUDGET: u64 = 100_000;

fn random_config(rng: &mut StdRng) -> GeneratorConfig {
    let dims = rng.gen_range(1..=4);
    let dimensions = (0..dims)
        .map(|_| {
            if rng.gen_bool(0.2) {
                DimensionConfig::disabled()
            } else {
                DimensionConfig::new(rng.gen_range(1..=5), rng.gen_range(-64..=64))
            }
        })
        .collect();
    GeneratorConfig {
        base_address: rng.gen(),
        total_count: rng.gen_range(1..=40),
        trans_bits: 32,
        cnt_bits: 16,
        dimensions,
    }
}

fn run_case(seed: u64) -> bool {
    let mut rng = StdRng::seed_from_u64(seed);
    let config = random_config(&mut rng);
    let expected: Vec<u32> = config.iter().collect();

    let ready = match ReadyDriver::random(rng.gen_range(0.2..=1.0), seed) {
        Ok(driver) => driver,
        Err(err) => {
            eprintln!("case {}: {}", seed, err);
            return false;
        }
    };
    let mut harness = match StreamHarness::new(config, ready) {
        Ok(harness) => harness,
        Err(err) => {
            eprintln!("case {}: {}", seed, err);
            return false;
        }
    };
    let trace = match harness.run_once(CYCLE_BUDGET) {
        Ok(trace) => trace,
        Err(err) => {
            eprintln!("case {}: {}", seed, err);
            return false;
        }
    };

    if trace.accepted != expected {
        eprintln!(
            "case {}: stream diverged from closed form ({} vs {} beats)",
            seed,
            trace.accepted.len(),
            expected.len()
        );
        return false;
    }
    if trace.copy_faults != 0 || trace.parity_faults != 0 {
        eprintln!("case {}: spurious monitor faults", seed);
        return false;
    }
    true
}

fn main() {
    env_logger::init();

    let passed = (0..CASES).into_par_iter().filter(|&seed| run_case(seed)).count();

    println!("{}/{} cases matched the closed-form walk", passed, CASES);
    if passed as u64 != CASES {
        std::process::exit(1);
    }
}
