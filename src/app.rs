//! One acquisition run: device setup, sink setup, forwarding, shutdown.

use tracing::{error, info, warn};

use crate::config::BridgeConfig;
use crate::error::{AppResult, BridgeError};
use crate::forwarder::{forward, ForwardStats, QuitSignal};
use crate::hardware::mock::MockMpDev;
use crate::hardware::mpdev::DynamicMpDev;
use crate::hardware::{MpDevApi, MpDevSession};
use crate::operator::{KeyboardQuit, RawModeGuard};
use crate::sink::{SampleSink, StreamDeclaration};

/// Which driver to run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DriverChoice {
    /// The vendor library.
    #[default]
    Hardware,
    /// The built-in mock, paced by the sample interval.
    Simulated,
}

/// Open the production sink for `declaration`.
#[cfg(feature = "lsl-support")]
pub fn open_sink(declaration: StreamDeclaration) -> AppResult<Box<dyn SampleSink>> {
    let sink = crate::sink::lsl::LslOutletSink::open(declaration)?;
    Ok(Box::new(sink))
}

/// Open the production sink for `declaration`.
#[cfg(not(feature = "lsl-support"))]
pub fn open_sink(_declaration: StreamDeclaration) -> AppResult<Box<dyn SampleSink>> {
    Err(BridgeError::FeatureNotEnabled("lsl-support".to_string()))
}

/// Run the bridge with the keyboard as quit signal and the production sink.
pub fn run(config: &BridgeConfig, driver: DriverChoice) -> AppResult<ForwardStats> {
    match driver {
        DriverChoice::Hardware => {
            let dll_dir = config.device.dll_dir.as_deref();
            let mpdev = DynamicMpDev::load(dll_dir)?;
            run_interactive(mpdev, config)
        }
        DriverChoice::Simulated => {
            info!("Running against simulated MP device");
            run_interactive(MockMpDev::simulated(), config)
        }
    }
}

fn run_interactive<D: MpDevApi>(driver: D, config: &BridgeConfig) -> AppResult<ForwardStats> {
    run_with(driver, config, open_sink, || {
        println!("Acquisition running, press Q to stop");
        let guard = RawModeGuard::enable().map_err(BridgeError::Console)?;
        Ok((guard, KeyboardQuit::default()))
    })
}

/// Run the bridge with caller-supplied sink and quit signal.
///
/// `open_sink` is called after the device is configured, with the stream
/// metadata for the session's channel count. `open_quit` is called right
/// before the loop; whatever it returns alongside the signal (a terminal
/// guard, say) is dropped as soon as the loop ends, before anything about
/// the outcome is logged.
///
/// The device is shut down after the loop whether or not it ended cleanly.
/// If the loop failed, that error is returned and a shutdown error is only
/// logged.
pub fn run_with<D, K, Q, G>(
    driver: D,
    config: &BridgeConfig,
    open_sink: impl FnOnce(StreamDeclaration) -> AppResult<K>,
    open_quit: impl FnOnce() -> AppResult<(G, Q)>,
) -> AppResult<ForwardStats>
where
    D: MpDevApi,
    K: SampleSink,
    Q: QuitSignal,
{
    let settings = config.acquisition_settings();
    let mut session = MpDevSession::connect(driver, &settings)?;

    let prepared = StreamDeclaration::new(&config.sink, settings.channels.sample_len())
        .map_err(BridgeError::from)
        .and_then(open_sink)
        .and_then(|sink| open_quit().map(|(guard, quit)| (sink, guard, quit)));

    let outcome = prepared.and_then(|(mut sink, guard, mut quit)| {
        let outcome = forward(&mut session, &mut sink, &mut quit);
        drop(guard);
        outcome
    });

    match outcome {
        Ok(stats) => {
            info!(
                samples = stats.samples,
                rate_hz = stats.rate_hz(),
                "Forwarding stopped by operator"
            );
            session.shutdown()?;
            Ok(stats)
        }
        Err(err) => {
            error!(
                samples = session.samples_read(),
                error = %err,
                "Acquisition aborted"
            );
            if let Err(shutdown_err) = session.shutdown() {
                warn!(error = %shutdown_err, "Device shutdown after failure also failed");
            }
            Err(err)
        }
    }
}
