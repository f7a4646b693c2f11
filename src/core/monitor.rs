//! Fault-detection taps for handshake streams.
//!
//! Each monitor observes a stream (read-only) alongside a second stream that
//! is asserted to be an exact duplicate, its per-lane parity checksum, or
//! structurally empty, and raises a per-cycle fault flag on disagreement.
//! The copy and zero variants are combinational; the parity pair registers
//! its output/fault one cycle after the observed beat. Monitors never halt
//! or correct the stream they watch.

use log::warn;

use super::stream::{parity_of, StreamBeat};

/// Compares two streams asserted to carry identical traffic.
///
/// Fault is combinational: high exactly on cycles where `valid` disagrees,
/// or both sides are valid with differing data or strobes.
#[derive(Debug, Default)]
pub struct CopyMonitor {
    fault: bool,
}

impl CopyMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe both streams for one cycle; returns the fault flag.
    pub fn observe(
        &mut self,
        primary_valid: bool,
        primary: StreamBeat,
        shadow_valid: bool,
        shadow: StreamBeat,
    ) -> bool {
        self.fault = primary_valid != shadow_valid
            || (primary_valid && (primary.data != shadow.data || primary.strb != shadow.strb));
        if self.fault {
            warn!(
                "copy monitor fault: primary {}/0x{:08x} shadow {}/0x{:08x}",
                primary_valid, primary.data, shadow_valid, shadow.data
            );
        }
        self.fault
    }

    pub fn fault(&self) -> bool {
        self.fault
    }
}

/// Watches a stream asserted to be structurally empty.
///
/// Fault is combinational: any activity on the stream (valid, nonzero data,
/// nonzero strobe) raises it.
#[derive(Debug, Default)]
pub struct ZeroMonitor {
    fault: bool,
}

impl ZeroMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe the stream for one cycle; returns the fault flag.
    pub fn observe(&mut self, valid: bool, beat: StreamBeat) -> bool {
        self.fault = valid || beat.data != 0 || beat.strb != 0;
        if self.fault {
            warn!("zero monitor fault: valid={} data=0x{:08x}", valid, beat.data);
        }
        self.fault
    }

    pub fn fault(&self) -> bool {
        self.fault
    }
}

/// Taps a stream and emits its per-lane parity checksum, registered one
/// cycle after the observed beat.
#[derive(Debug, Default)]
pub struct ParitySource {
    out_valid: bool,
    out_parity: u8,
}

impl ParitySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe the stream for one cycle. Returns the registered checksum
    /// output for this cycle (computed from the previous cycle's beat).
    pub fn tick(&mut self, valid: bool, beat: StreamBeat) -> (bool, u8) {
        let current = (self.out_valid, self.out_parity);
        self.out_valid = valid;
        self.out_parity = parity_of(beat.data) & beat.strb;
        current
    }
}

/// Compares a checksum stream against the parity of a monitored stream.
///
/// The monitored beat is held one cycle so it lines up with a registered
/// checksum source; the fault flag therefore trails the offending beat by
/// one cycle. Lanes with a deasserted strobe are ignored.
#[derive(Debug, Default)]
pub struct ParitySink {
    held_valid: bool,
    held_beat: StreamBeat,
    fault: bool,
}

impl ParitySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe the monitored stream and the checksum stream for one cycle;
    /// returns the fault flag.
    pub fn tick(
        &mut self,
        monitored_valid: bool,
        monitored: StreamBeat,
        checksum_valid: bool,
        checksum: u8,
    ) -> bool {
        self.fault = self.held_valid != checksum_valid
            || (self.held_valid
                && (parity_of(self.held_beat.data) ^ checksum) & self.held_beat.strb != 0);
        if self.fault {
            warn!(
                "parity monitor fault: data=0x{:08x} checksum=0x{:x}",
                self.held_beat.data, checksum
            );
        }
        self.held_valid = monitored_valid;
        self.held_beat = monitored;
        self.fault
    }

    pub fn fault(&self) -> bool {
        self.fault
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::stream::STRB_FULL;

    #[test]
    fn test_copy_monitor_agreeing_streams() {
        let mut monitor = CopyMonitor::new();
        let beat = StreamBeat::new(0x1234);
        assert!(!monitor.observe(true, beat, true, beat));
        assert!(!monitor.observe(false, beat, false, beat));
        assert!(!monitor.fault());
    }

    #[test]
    fn test_copy_monitor_data_mismatch() {
        let mut monitor = CopyMonitor::new();
        let fault = monitor.observe(true, StreamBeat::new(0x1234), true, StreamBeat::new(0x1235));
        assert!(fault);
    }

    #[test]
    fn test_copy_monitor_valid_mismatch() {
        let mut monitor = CopyMonitor::new();
        let beat = StreamBeat::new(0);
        assert!(monitor.observe(true, beat, false, beat));
    }

    #[test]
    fn test_copy_monitor_strobe_mismatch() {
        let mut monitor = CopyMonitor::new();
        let fault = monitor.observe(
            true,
            StreamBeat::new(7),
            true,
            StreamBeat::with_strb(7, 0x3),
        );
        assert!(fault);
    }

    #[test]
    fn test_copy_monitor_ignores_idle_payload() {
        let mut monitor = CopyMonitor::new();
        // Both sides idle; payload is a don't-care
        let fault = monitor.observe(
            false,
            StreamBeat::new(0xAAAA),
            false,
            StreamBeat::new(0x5555),
        );
        assert!(!fault);
    }

    #[test]
    fn test_zero_monitor_quiet_stream() {
        let mut monitor = ZeroMonitor::new();
        assert!(!monitor.observe(false, StreamBeat::with_strb(0, 0)));
    }

    #[test]
    fn test_zero_monitor_flags_activity() {
        let mut monitor = ZeroMonitor::new();
        assert!(monitor.observe(true, StreamBeat::with_strb(0, 0)));
        assert!(monitor.observe(false, StreamBeat::with_strb(1, 0)));
        assert!(monitor.observe(false, StreamBeat::with_strb(0, 1)));
    }

    #[test]
    fn test_parity_pair_matching_stream() {
        let mut source = ParitySource::new();
        let mut sink = ParitySink::new();
        let beats = [0x0102_0408u32, 0xDEAD_BEEF, 0x0000_0000, 0xFFFF_FFFF];

        for &data in &beats {
            let beat = StreamBeat::new(data);
            let (cv, cs) = source.tick(true, beat);
            assert!(!sink.tick(true, beat, cv, cs));
        }
        // Drain the last registered beat
        let (cv, cs) = source.tick(false, StreamBeat::default());
        assert!(!sink.tick(false, StreamBeat::default(), cv, cs));
    }

    #[test]
    fn test_parity_sink_flags_corruption_one_cycle_later() {
        let mut source = ParitySource::new();
        let mut sink = ParitySink::new();

        // Source taps the good beat while the sink sees a corrupted copy
        let good = StreamBeat::new(0x0000_0001);
        let corrupted = StreamBeat::new(0x0000_0003);
        let (cv, cs) = source.tick(true, good);
        assert!(!sink.tick(true, corrupted, cv, cs));

        // The mismatch surfaces on the following tick
        let (cv, cs) = source.tick(false, StreamBeat::default());
        assert!(sink.tick(false, StreamBeat::default(), cv, cs));
    }

    #[test]
    fn test_parity_sink_ignores_disabled_lanes() {
        let mut sink = ParitySink::new();
        // Only lane 0 enabled; corruption in lane 3 is masked out
        let beat = StreamBeat::with_strb(0x0100_0001, 0x1);
        sink.tick(true, beat, false, 0);
        let fault = sink.tick(false, StreamBeat::default(), true, 0x1);
        assert!(!fault);
    }

    #[test]
    fn test_parity_full_strobe_roundtrip() {
        let mut source = ParitySource::new();
        let beat = StreamBeat::new(0x8000_0001);
        source.tick(true, beat);
        let (valid, checksum) = source.tick(false, StreamBeat::default());
        assert!(valid);
        assert_eq!(checksum, parity_of(0x8000_0001) & STRB_FULL);
    }
}
