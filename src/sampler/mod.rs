//! # Sampling Loop Module
//!
//! Drives the hardware: every cycle reads the four stick channels, reads every
//! bound button line, and writes one report to the virtual device, then sleeps
//! for the sampling interval.
//!
//! ## Cycle
//!
//! 1. ADC channels 0, 4, 1, 5 -> scale (right stick inverted)
//! 2. GPIO line of each binding, in binding order
//! 3. One batch: 4 axis events, N key events, `SYN_REPORT`
//! 4. Sleep for the interval; a shutdown request ends the loop here
//!
//! There is no catch-up: if a cycle overruns the interval the next one still
//! waits a full interval after it.
//!
//! ## Fault Handling
//!
//! Hardware faults never stop the loop:
//!
//! | Fault | Reported value |
//! |-------|----------------|
//! | ADC transfer fails | Last good value of that axis (center before the first) |
//! | GPIO read fails | Released |
//! | Batch write fails | Batch dropped |
//!
//! Every fault is counted in [`LoopStats`].

use evdev::InputEvent;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::adc::{read_channel, AdcBus};
use crate::axis::{scale, StickAxis, AXIS_CENTER};
use crate::bindings::ButtonMap;
use crate::config::SamplingConfig;
use crate::gpio::LineReader;
use crate::uinput::{EventSink, Report, AXIS_EVENTS};

/// Fault and progress counters for one run of the loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    /// Completed cycles (a cycle with faults still counts)
    pub cycles: u64,
    /// Failed ADC transfers
    pub adc_faults: u64,
    /// Failed GPIO reads
    pub gpio_faults: u64,
    /// Batches that could not be written
    pub emit_failures: u64,
}

impl LoopStats {
    /// Total faults of any kind.
    #[must_use]
    pub fn faults(&self) -> u64 {
        self.adc_faults + self.gpio_faults + self.emit_failures
    }
}

/// The sampling loop and the hardware it owns.
///
/// The bus, line reader and sink are owned for the lifetime of the loop; the
/// bindings are shared read-only.
pub struct SamplingLoop<'a, B, L, S> {
    bus: B,
    lines: L,
    sink: S,
    bindings: &'a ButtonMap,
    interval: Duration,
    log_interval_cycles: u64,
    /// Latest snapshot; axes keep their last good value across cycles
    report: Report,
    batch: Vec<InputEvent>,
    stats: LoopStats,
}

impl<'a, B, L, S> SamplingLoop<'a, B, L, S>
where
    B: AdcBus,
    L: LineReader,
    S: EventSink,
{
    /// Create a loop over the given hardware.
    pub fn new(bus: B, lines: L, sink: S, bindings: &'a ButtonMap, config: &SamplingConfig) -> Self {
        Self {
            bus,
            lines,
            sink,
            bindings,
            interval: Duration::from_micros(config.interval_us),
            log_interval_cycles: config.log_interval_cycles.max(1),
            report: Report::new([AXIS_CENTER; AXIS_EVENTS], Vec::with_capacity(bindings.len())),
            batch: Vec::with_capacity(AXIS_EVENTS + bindings.len() + 1),
            stats: LoopStats::default(),
        }
    }

    /// Counters so far.
    pub fn stats(&self) -> LoopStats {
        self.stats
    }

    /// Sleep between cycles.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// The event sink, e.g. to inspect it after a run.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Hand back the owned hardware.
    pub fn into_parts(self) -> (B, L, S) {
        (self.bus, self.lines, self.sink)
    }

    /// Read all four stick axes, holding the last good value on a fault.
    fn sample_axes(&mut self) {
        for axis in StickAxis::ALL {
            match read_channel(&mut self.bus, axis.channel()) {
                Ok(raw) => self.report.axes[axis.index()] = scale(raw, axis.inverted()),
                Err(e) => {
                    self.stats.adc_faults += 1;
                    if self.stats.adc_faults == 1 {
                        warn!("ADC read for {:?} failed, holding last value: {}", axis, e);
                    } else {
                        debug!("ADC read for {:?} failed: {}", axis, e);
                    }
                }
            }
        }
    }

    /// Read every bound button, reporting unreadable lines as released.
    fn sample_buttons(&mut self) {
        self.report.buttons.clear();
        for binding in self.bindings {
            let pressed = match self.lines.read_level(binding.line) {
                Ok(level) => level,
                Err(e) => {
                    self.stats.gpio_faults += 1;
                    if self.stats.gpio_faults == 1 {
                        warn!("Button {} reads as released: {}", binding.name, e);
                    } else {
                        debug!("Button {}: {}", binding.name, e);
                    }
                    false
                }
            };
            self.report.buttons.push((binding.key(), pressed));
        }
    }

    /// Run one cycle: sample everything and write one report.
    ///
    /// Never fails; faults are counted in [`LoopStats`].
    pub fn run_cycle(&mut self) {
        self.sample_axes();
        self.sample_buttons();

        self.report.encode_into(&mut self.batch);
        if let Err(e) = self.sink.write_batch(&self.batch) {
            self.stats.emit_failures += 1;
            if self.stats.emit_failures == 1 {
                warn!("Dropped report: {}", e);
            } else {
                debug!("Dropped report: {}", e);
            }
        }

        self.stats.cycles += 1;
        if self.stats.cycles % self.log_interval_cycles == 0 {
            info!(
                "Sent {} reports (ADC faults: {}, GPIO faults: {}, write failures: {})",
                self.stats.cycles, self.stats.adc_faults, self.stats.gpio_faults, self.stats.emit_failures
            );
        }
    }

    /// Run cycles until `shutdown` completes.
    ///
    /// `shutdown` is polled only while sleeping between cycles, so a cycle is
    /// never interrupted halfway through a report. At least one cycle runs.
    pub async fn run<F>(&mut self, shutdown: F) -> LoopStats
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        info!(
            "Sampling {} axes and {} buttons every {} us",
            AXIS_EVENTS,
            self.bindings.len(),
            self.interval.as_micros()
        );

        loop {
            self.run_cycle();

            tokio::select! {
                biased;

                _ = &mut shutdown => {
                    info!("Shutdown requested, stopping after {} cycles", self.stats.cycles);
                    break;
                }

                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        self.stats
    }
}
