//! End-to-end runs of the bridge against the mock driver.
//!
//! `app::run_with` is driven with an in-memory sink and a quit signal that
//! fires after a fixed number of checks, so a whole acquisition run is
//! exercised without a terminal or liblsl.

use std::io;
use std::sync::Arc;

use biopac_lsl::app::run_with;
use biopac_lsl::config::{BridgeConfig, DeviceConfig, LoggingConfig, SinkConfig};
use biopac_lsl::forwarder::QuitSignal;
use biopac_lsl::hardware::mock::MockMpDev;
use biopac_lsl::hardware::{DeviceError, DeviceModel, MpCall, MpReturnCode};
use biopac_lsl::sink::{SampleSink, SinkError, StreamDeclaration};
use biopac_lsl::{BridgeError, Sample};
use parking_lot::Mutex;
use tracing_test::traced_test;

// =============================================================================
// Fixtures
// =============================================================================

fn config(analog: &[u32], digital: &[u32]) -> BridgeConfig {
    BridgeConfig {
        device: DeviceConfig {
            dll_dir: None,
            sampletime: 1.0,
            channels: analog.to_vec(),
            digital_channels: digital.to_vec(),
        },
        sink: SinkConfig::default(),
        logging: LoggingConfig::default(),
    }
}

/// Sink that keeps every published sample, shared with the test body.
#[derive(Clone, Default)]
struct RecordingSink {
    published: Arc<Mutex<Vec<Sample>>>,
    declaration: Arc<Mutex<Option<StreamDeclaration>>>,
}

impl RecordingSink {
    fn opener(&self) -> impl FnOnce(StreamDeclaration) -> Result<Self, BridgeError> {
        let sink = self.clone();
        move |declaration| {
            *sink.declaration.lock() = Some(declaration);
            Ok(sink)
        }
    }

    fn published(&self) -> Vec<Sample> {
        self.published.lock().clone()
    }

    fn declaration(&self) -> Option<StreamDeclaration> {
        self.declaration.lock().clone()
    }
}

impl SampleSink for RecordingSink {
    fn push_sample(&mut self, sample: &Sample) -> Result<(), SinkError> {
        if let Some(declaration) = self.declaration.lock().as_ref() {
            declaration.check_sample(sample)?;
        }
        self.published.lock().push(sample.clone());
        Ok(())
    }
}

/// Requests a stop on the n-th check.
struct QuitAfter(usize);

impl QuitSignal for QuitAfter {
    fn quit_requested(&mut self) -> io::Result<bool> {
        self.0 = self.0.saturating_sub(1);
        Ok(self.0 == 0)
    }
}

fn quit_after(n: usize) -> impl FnOnce() -> Result<((), QuitAfter), BridgeError> {
    move || Ok(((), QuitAfter(n)))
}

// =============================================================================
// Clean runs
// =============================================================================

#[test]
fn test_publishes_until_quit_then_shuts_down() {
    let mock = MockMpDev::new();
    mock.push_sample(vec![0.5, -0.5, 1.0]);
    mock.push_sample(vec![0.6, -0.4, 0.0]);
    mock.push_sample(vec![0.7, -0.3, 1.0]);
    let sink = RecordingSink::default();

    let stats = run_with(mock.clone(), &config(&[1, 3], &[2]), sink.opener(), quit_after(3))
        .unwrap();

    assert_eq!(stats.samples, 3);
    let published: Vec<Vec<f64>> = sink.published().into_iter().map(Sample::into_values).collect();
    assert_eq!(
        published,
        vec![
            vec![0.5, -0.5, 1.0],
            vec![0.6, -0.4, 0.0],
            vec![0.7, -0.3, 1.0],
        ]
    );
    assert_eq!(mock.call_count(MpCall::ReceiveData), 3);
    assert_eq!(mock.call_count(MpCall::StopAcquisition), 1);
    assert_eq!(mock.call_count(MpCall::Disconnect), 1);
    assert!(!mock.is_connected());
}

#[test]
fn test_stream_declares_analog_plus_digital_channels() {
    let mock = MockMpDev::new();
    let sink = RecordingSink::default();

    run_with(mock, &config(&[1, 2, 3], &[1, 2]), sink.opener(), quit_after(1)).unwrap();

    let declaration = sink.declaration().unwrap();
    assert_eq!(declaration.channel_count, 5);
    assert_eq!(declaration.name, "biopac");
    assert_eq!(declaration.content_type, "float");
    assert_eq!(declaration.nominal_rate, 0.0);
    assert_eq!(sink.published()[0].len(), 5);
}

#[test]
fn test_quit_after_first_sample_publishes_exactly_one() {
    let mock = MockMpDev::new();
    let sink = RecordingSink::default();

    let stats = run_with(mock.clone(), &config(&[1], &[]), sink.opener(), quit_after(1)).unwrap();

    assert_eq!(stats.samples, 1);
    assert_eq!(sink.published().len(), 1);
    assert_eq!(mock.call_count(MpCall::ReceiveData), 1);
}

#[test]
fn test_fallback_device_streams_normally() {
    let mock = MockMpDev::new();
    mock.accept_models(&[DeviceModel::FALLBACK]);
    let sink = RecordingSink::default();

    let stats = run_with(mock.clone(), &config(&[1], &[]), sink.opener(), quit_after(2)).unwrap();

    assert_eq!(stats.samples, 2);
    assert_eq!(mock.connect_attempts().last(), Some(&DeviceModel::FALLBACK));
}

// =============================================================================
// Failures
// =============================================================================

#[test]
#[traced_test]
fn test_read_failure_stops_polling_and_still_shuts_down() {
    let mock = MockMpDev::new();
    mock.fail_call(MpCall::ReceiveData, MpReturnCode::CommunicationError);
    let sink = RecordingSink::default();

    let err = run_with(mock.clone(), &config(&[1], &[]), sink.opener(), quit_after(100))
        .unwrap_err();

    assert_eq!(
        err.as_device_error(),
        Some(&DeviceError::ReadFailed(
            MpReturnCode::CommunicationError.into()
        ))
    );
    assert_eq!(mock.call_count(MpCall::ReceiveData), 1);
    assert!(sink.published().is_empty());
    assert_eq!(mock.call_count(MpCall::StopAcquisition), 1);
    assert_eq!(mock.call_count(MpCall::Disconnect), 1);
    assert!(logs_contain("Acquisition aborted"));
}

#[test]
fn test_setup_failure_opens_no_stream() {
    let mock = MockMpDev::new();
    mock.fail_call(MpCall::StartAcquisition, MpReturnCode::Busy);
    let sink = RecordingSink::default();

    let err = run_with(mock.clone(), &config(&[1], &[]), sink.opener(), quit_after(1))
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Failed to start data acquisition: MPBUSY"
    );
    assert!(sink.declaration().is_none());
    assert_eq!(mock.call_count(MpCall::ReceiveData), 0);
}

#[test]
fn test_both_connects_refused_reports_both_statuses() {
    let mock = MockMpDev::new();
    mock.accept_models(&[]);
    let sink = RecordingSink::default();

    let err = run_with(mock.clone(), &config(&[1], &[]), sink.opener(), quit_after(1))
        .unwrap_err();

    assert!(matches!(
        err.as_device_error(),
        Some(DeviceError::ConnectFailed { .. })
    ));
    assert_eq!(mock.calls(), vec![MpCall::Connect, MpCall::Connect]);
}

#[test]
#[traced_test]
fn test_shutdown_failure_after_read_failure_keeps_read_error() {
    let mock = MockMpDev::new();
    mock.fail_call(MpCall::ReceiveData, MpReturnCode::SocketError);
    mock.fail_call(MpCall::Disconnect, MpReturnCode::NotConnected);
    let sink = RecordingSink::default();

    let err = run_with(mock.clone(), &config(&[1], &[]), sink.opener(), quit_after(5))
        .unwrap_err();

    assert_eq!(
        err.as_device_error(),
        Some(&DeviceError::ReadFailed(MpReturnCode::SocketError.into()))
    );
    assert!(logs_contain("Device shutdown after failure also failed"));
}

#[test]
fn test_shutdown_failure_after_clean_run_is_reported() {
    let mock = MockMpDev::new();
    mock.fail_call(MpCall::Disconnect, MpReturnCode::NotConnected);
    let sink = RecordingSink::default();

    let err = run_with(mock.clone(), &config(&[1], &[]), sink.opener(), quit_after(1))
        .unwrap_err();

    assert_eq!(
        err.as_device_error(),
        Some(&DeviceError::DisconnectFailed(
            MpReturnCode::NotConnected.into()
        ))
    );
    assert_eq!(sink.published().len(), 1);
}

#[test]
fn test_sink_failure_stops_run_and_still_shuts_down() {
    struct RejectingSink;

    impl SampleSink for RejectingSink {
        fn push_sample(&mut self, sample: &Sample) -> Result<(), SinkError> {
            Err(SinkError::ChannelCountMismatch {
                expected: 9,
                actual: sample.len(),
            })
        }
    }

    let mock = MockMpDev::new();

    let err = run_with(
        mock.clone(),
        &config(&[1, 2], &[]),
        |_| Ok(RejectingSink),
        quit_after(100),
    )
    .unwrap_err();

    assert!(matches!(
        err,
        BridgeError::Sink(SinkError::ChannelCountMismatch { expected: 9, actual: 2 })
    ));
    assert_eq!(mock.call_count(MpCall::ReceiveData), 1);
    assert_eq!(mock.call_count(MpCall::StopAcquisition), 1);
    assert_eq!(mock.call_count(MpCall::Disconnect), 1);
}

#[test]
#[traced_test]
fn test_outcome_is_logged_after_console_guard_is_released() {
    struct ConsoleGuard;

    impl Drop for ConsoleGuard {
        fn drop(&mut self) {
            tracing::info!("console guard released");
        }
    }

    let mock = MockMpDev::new();
    mock.fail_call(MpCall::ReceiveData, MpReturnCode::Underflow);
    let sink = RecordingSink::default();

    run_with(mock, &config(&[1], &[]), sink.opener(), || {
        Ok((ConsoleGuard, QuitAfter(100)))
    })
    .unwrap_err();

    logs_assert(|lines: &[&str]| {
        let released = lines
            .iter()
            .position(|line| line.contains("console guard released"))
            .ok_or("guard never released")?;
        let aborted = lines
            .iter()
            .position(|line| line.contains("Acquisition aborted"))
            .ok_or("abort never logged")?;
        if released < aborted {
            Ok(())
        } else {
            Err(format!("abort logged at line {aborted}, guard released at {released}"))
        }
    });
}

#[test]
fn test_console_failure_ends_run() {
    struct BrokenConsole;

    impl QuitSignal for BrokenConsole {
        fn quit_requested(&mut self) -> io::Result<bool> {
            Err(io::Error::new(io::ErrorKind::Other, "no tty"))
        }
    }

    let mock = MockMpDev::new();
    let sink = RecordingSink::default();

    let err = run_with(mock.clone(), &config(&[1], &[]), sink.opener(), || {
        Ok(((), BrokenConsole))
    })
    .unwrap_err();

    assert!(matches!(err, BridgeError::Console(_)));
    assert_eq!(mock.call_count(MpCall::Disconnect), 1);
}
