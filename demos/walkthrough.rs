//! Walks a small two-dimensional pattern and prints the accepted stream.
//!
//! Run with `RUST_LOG=debug` to see the per-cycle engine trace.

use stridesim::{dims, GeneratorConfig, ReadyDriver, StreamHarness};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = GeneratorConfig {
        base_address: 1000,
        total_count: 6,
        trans_bits: 32,
        cnt_bits: 16,
        dimensions: dims![
            { len: 3, stride: 4 },
            { len: 2, stride: 100 },
        ],
    };

    println!(
        "walking {} elements from base {}",
        config.masked_total(),
        config.base_address
    );

    let mut harness = StreamHarness::new(config.clone(), ReadyDriver::always())?;
    let trace = harness.run_once(1000)?;

    println!("  n  address   closed-form");
    for (n, addr) in trace.accepted.iter().enumerate() {
        println!("  {}  {:>7}   {:>11}", n, addr, config.address_at(n as u64));
    }
    match trace.done_cycle {
        Some(cycle) => println!("done pulsed on cycle {}", cycle),
        None => println!("done never pulsed"),
    }
    println!(
        "copy faults: {}, parity faults: {}",
        trace.copy_faults, trace.parity_faults
    );

    Ok(())
}
