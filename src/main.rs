//! # MAX186 Gamepad
//!
//! User-space driver exposing a MAX186 SPI ADC (two analog sticks) and GPIO
//! buttons as a virtual gamepad through uinput.

use anyhow::Result;
use std::future::Future;
use tokio::signal::unix::{signal, SignalKind};
use tokio::time::Duration;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;

use max186_gamepad::adc::SpidevBus;
use max186_gamepad::bindings::ButtonMap;
use max186_gamepad::config::{Config, LoggingConfig, DEFAULT_SETTINGS_PATH};
use max186_gamepad::gpio::SysfsGpio;
use max186_gamepad::sampler::SamplingLoop;
use max186_gamepad::uinput::UinputGamepad;

/// File name prefix of the rolling log file
const LOG_FILE_NAME: &str = "max186-gamepad.log";

/// Main entry point for the gamepad driver
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Load settings (`gamepad.toml`, defaults if absent) and set up logging
///    - Load button bindings (`gamepad.conf`, no buttons if absent)
///    - Open the SPI device, export GPIO lines, create the uinput device
///
/// 2. **Main Loop**
///    - Sample sticks and buttons and send one report every interval (1 ms)
///    - Log status every `log_interval_cycles` reports
///
/// 3. **Graceful Shutdown**
///    - Ctrl+C or SIGTERM stops the loop between reports
///    - Dropping the handles destroys the virtual device and closes the bus
///
/// # Errors
///
/// Returns error (non-zero exit) if:
/// - The settings file exists but is invalid
/// - The SPI device cannot be opened or configured
/// - The virtual device cannot be created
///
/// Expected output:
/// ```text
/// INFO max186_gamepad: MAX186 Gamepad v0.1.0 starting...
/// INFO max186_gamepad::bindings: Button 0 (A) = GPIO 17 (keycode 304)
/// INFO max186_gamepad::adc::bus_trait: Opened SPI device /dev/spidev0.0 at 2000000 Hz
/// INFO max186_gamepad::uinput::device: Created virtual device "MAX186 Gamepad" (6969:9696) with 1 buttons
/// INFO max186_gamepad::sampler: Sampling 4 axes and 1 buttons every 1000 us
/// ```
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let (config, from_file) = Config::load_or_default(DEFAULT_SETTINGS_PATH)?;
    let _log_guard = init_logging(&config.logging);

    info!("MAX186 Gamepad v{} starting...", env!("CARGO_PKG_VERSION"));
    if from_file {
        info!("Loaded settings from {}", DEFAULT_SETTINGS_PATH);
    } else {
        info!("No {} found, using default settings", DEFAULT_SETTINGS_PATH);
    }

    let bindings = ButtonMap::load(&config.buttons.path).unwrap_or_else(|e| {
        warn!("Could not read button file {}: {}", config.buttons.path, e);
        ButtonMap::default()
    });
    info!("Loaded {} button bindings from {}", bindings.len(), config.buttons.path);

    let bus = SpidevBus::open(&config.spi)?;

    let gpio = SysfsGpio::new(&config.gpio);
    gpio.export_inputs(&bindings);

    let gamepad = UinputGamepad::create(&config.device, &bindings)?;
    // Give udev and consumers time to pick up the new device
    tokio::time::sleep(Duration::from_millis(config.device.create_settle_ms)).await;

    let shutdown = shutdown_signal()?;
    info!("Press Ctrl+C to exit");

    let mut sampler = SamplingLoop::new(bus, gpio, gamepad, &bindings, &config.sampling);
    let stats = sampler.run(shutdown).await;

    info!(
        "Total reports sent: {} (ADC faults: {}, GPIO faults: {}, write failures: {})",
        stats.cycles, stats.adc_faults, stats.gpio_faults, stats.emit_failures
    );
    Ok(())
}

/// Initialize the tracing subscriber
///
/// Logs go to stdout, or to a daily-rolling file when a log directory is
/// configured. The returned guard must be held until exit so buffered lines
/// are flushed.
fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    match &config.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, LOG_FILE_NAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
            None
        }
    }
}

/// Install SIGINT and SIGTERM handlers
///
/// Handlers are installed immediately; the returned future completes on the
/// first of either signal.
fn shutdown_signal() -> std::io::Result<impl Future<Output = ()>> {
    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;

    Ok(async move {
        tokio::select! {
            _ = interrupt.recv() => info!("Received Ctrl+C, shutting down..."),
            _ = terminate.recv() => info!("Received SIGTERM, shutting down..."),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_shutdown_signal_installs_handlers() {
        assert!(shutdown_signal().is_ok());
    }
}
