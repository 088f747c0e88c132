//! # GPIO Module
//!
//! Button levels are read from the legacy sysfs GPIO interface.
//!
//! This module handles:
//! - Exporting each configured line and setting it to input (once, at startup)
//! - Reading the instantaneous level of a line from `gpio<N>/value`
//!
//! ## Sysfs Layout
//!
//! ```text
//! /sys/class/gpio/export          <- write "17" to export line 17
//! /sys/class/gpio/gpio17/direction <- write "in"
//! /sys/class/gpio/gpio17/value     <- reads "0\n" or "1\n"
//! ```

use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::bindings::ButtonMap;
use crate::config::GpioConfig;
use crate::error::{GamepadError, Result};

/// Reads the logic level of one digital input line.
pub trait LineReader {
    /// Returns `true` when the line reads high (button pressed).
    ///
    /// # Errors
    ///
    /// Returns `Gpio` if the line cannot be read. The sampling loop reports
    /// such a line as released.
    fn read_level(&mut self, line: u32) -> Result<bool>;
}

/// GPIO lines exposed under a sysfs root such as `/sys/class/gpio`.
#[derive(Debug, Clone)]
pub struct SysfsGpio {
    root: PathBuf,
    export_settle: Duration,
}

impl SysfsGpio {
    /// Create a reader for the sysfs root named in the settings.
    #[must_use]
    pub fn new(config: &GpioConfig) -> Self {
        Self::with_root(&config.sysfs_root, Duration::from_millis(config.export_settle_ms))
    }

    /// Create a reader for an arbitrary root, e.g. a fake tree in tests.
    #[must_use]
    pub fn with_root<P: AsRef<Path>>(root: P, export_settle: Duration) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            export_settle,
        }
    }

    /// Path of the value file for `line`.
    #[must_use]
    pub fn value_path(&self, line: u32) -> PathBuf {
        self.line_dir(line).join("value")
    }

    fn line_dir(&self, line: u32) -> PathBuf {
        self.root.join(format!("gpio{}", line))
    }

    /// Export `line` and configure it as an input.
    ///
    /// Does nothing if the line's value file already exists. Otherwise writes
    /// the line number to `export`, waits for udev to create the line
    /// directory, then writes `in` to its `direction` file. Blocks for the
    /// settle delay.
    ///
    /// # Errors
    ///
    /// Returns `Gpio` if the export or direction file cannot be written.
    pub fn export_input(&self, line: u32) -> Result<()> {
        if self.value_path(line).exists() {
            debug!("GPIO {} already exported", line);
            return Ok(());
        }

        let export_path = self.root.join("export");
        fs::write(&export_path, line.to_string()).map_err(|e| {
            GamepadError::Gpio(format!("Failed to export GPIO {} via {}: {}", line, export_path.display(), e))
        })?;

        if !self.export_settle.is_zero() {
            thread::sleep(self.export_settle);
        }

        let direction_path = self.line_dir(line).join("direction");
        fs::write(&direction_path, "in").map_err(|e| {
            GamepadError::Gpio(format!("Failed to set {} to input: {}", direction_path.display(), e))
        })?;

        debug!("Exported GPIO {} as input", line);
        Ok(())
    }

    /// Export every distinct line used by `bindings`.
    ///
    /// Failures are logged and skipped; a line that could not be exported
    /// reads as released. Returns the number of lines that failed.
    pub fn export_inputs(&self, bindings: &ButtonMap) -> usize {
        let lines: BTreeSet<u32> = bindings.iter().map(|b| b.line).collect();
        let mut failed = 0;

        for line in &lines {
            if let Err(e) = self.export_input(*line) {
                warn!("{}", e);
                failed += 1;
            }
        }

        info!("Prepared {} of {} GPIO input lines", lines.len() - failed, lines.len());
        failed
    }
}

impl LineReader for SysfsGpio {
    fn read_level(&mut self, line: u32) -> Result<bool> {
        let path = self.value_path(line);
        let mut file = File::open(&path)
            .map_err(|e| GamepadError::Gpio(format!("Failed to open {}: {}", path.display(), e)))?;

        let mut value = [0u8; 1];
        let read = file
            .read(&mut value)
            .map_err(|e| GamepadError::Gpio(format!("Failed to read {}: {}", path.display(), e)))?;

        Ok(read == 1 && value[0] == b'1')
    }
}

#[cfg(test)]
pub mod mocks {
    use super::*;
    use std::collections::{HashMap, HashSet};

    /// In-memory GPIO lines
    #[derive(Debug, Default)]
    pub struct MockLines {
        /// Current level per line; unknown lines read low
        pub levels: HashMap<u32, bool>,
        /// Lines whose read fails
        pub failing: HashSet<u32>,
        /// Every line read, in order
        pub reads: Vec<u32>,
    }

    impl MockLines {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set(&mut self, line: u32, level: bool) {
            self.levels.insert(line, level);
        }

        pub fn fail_line(&mut self, line: u32) {
            self.failing.insert(line);
        }
    }

    impl LineReader for MockLines {
        fn read_level(&mut self, line: u32) -> Result<bool> {
            self.reads.push(line);
            if self.failing.contains(&line) {
                return Err(GamepadError::Gpio(format!("Mock read error on GPIO {}", line)));
            }
            Ok(self.levels.get(&line).copied().unwrap_or(false))
        }
    }
}
