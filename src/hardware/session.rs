//! Connected, configured MP device.
//!
//! [`MpDevSession::connect`] runs the vendor setup sequence and only returns
//! once acquisition has started; there is no half-configured session value.
//! The session owns its driver, so exactly one live session exists per
//! driver instance, and [`MpDevSession::shutdown`] consumes it.

use std::time::Instant;

use tracing::{debug, info, instrument, warn};

use super::channels::ChannelSelection;
use super::error::{DeviceError, MaskFault, Result};
use super::status::DriverStatus;
use super::{DeviceModel, MpCall, MpDevApi, AUTO_ADDRESS};
use crate::sample::Sample;

/// What to acquire and how fast.
#[derive(Debug, Clone, PartialEq)]
pub struct AcquisitionSettings {
    /// Milliseconds per sample, passed to `setSampleRate`.
    pub sample_interval_ms: f64,
    /// Channels to enable.
    pub channels: ChannelSelection,
}

impl AcquisitionSettings {
    /// Create settings.
    pub fn new(sample_interval_ms: f64, channels: ChannelSelection) -> Self {
        Self {
            sample_interval_ms,
            channels,
        }
    }
}

/// Log a driver call outcome at debug level and hand it back.
fn traced(call: MpCall, status: DriverStatus) -> DriverStatus {
    debug!(call = %call, status = %status, "MP driver call");
    status
}

/// A connected device with acquisition running.
pub struct MpDevSession<D: MpDevApi> {
    driver: D,
    channels: ChannelSelection,
    model: DeviceModel,
    started_at: Instant,
    samples_read: u64,
}

impl<D: MpDevApi> MpDevSession<D> {
    /// Connect and configure the device.
    ///
    /// Tries [`DeviceModel::PRIMARY`] and, on any failure, retries once with
    /// [`DeviceModel::FALLBACK`]. Then sets the sample interval, the analog
    /// and digital masks, starts the acquisition daemon and starts
    /// acquisition, stopping at the first step the driver refuses. Earlier
    /// steps are not undone.
    ///
    /// # Errors
    ///
    /// `ConnectFailed` if both product pairs are refused, otherwise the error
    /// for the first failing step.
    #[instrument(skip_all, fields(interval_ms = settings.sample_interval_ms))]
    pub fn connect(driver: D, settings: &AcquisitionSettings) -> Result<Self> {
        let model = Self::connect_any(&driver)?;
        info!(product = model.product, transport = model.transport, "Connected to MP device");

        traced(
            MpCall::SetSampleRate,
            driver.set_sample_rate(settings.sample_interval_ms),
        )
        .check()
        .map_err(DeviceError::SampleRateRejected)?;

        let channels = &settings.channels;
        let analog_mask = channels
            .analog_mask()
            .map_err(|e| DeviceError::ChannelMaskRejected(MaskFault::OutOfRange(e)))?;
        traced(MpCall::SetAcqChannels, driver.set_acq_channels(&analog_mask))
            .check()
            .map_err(|s| DeviceError::ChannelMaskRejected(MaskFault::Driver(s)))?;

        let digital_mask = channels
            .digital_mask()
            .map_err(|e| DeviceError::DigitalChannelMaskRejected(MaskFault::OutOfRange(e)))?;
        traced(
            MpCall::SetDigitalAcqChannels,
            driver.set_digital_acq_channels(&digital_mask),
        )
        .check()
        .map_err(|s| DeviceError::DigitalChannelMaskRejected(MaskFault::Driver(s)))?;

        traced(MpCall::StartAcqDaemon, driver.start_acq_daemon())
            .check()
            .map_err(DeviceError::DaemonStartFailed)?;

        traced(MpCall::StartAcquisition, driver.start_acquisition())
            .check()
            .map_err(DeviceError::AcquisitionStartFailed)?;

        info!(
            analog = ?channels.analog,
            digital = ?channels.digital,
            "MP acquisition started"
        );

        Ok(Self {
            driver,
            channels: channels.clone(),
            model,
            started_at: Instant::now(),
            samples_read: 0,
        })
    }

    fn connect_any(driver: &D) -> Result<DeviceModel> {
        let primary = traced(
            MpCall::Connect,
            driver.connect(DeviceModel::PRIMARY, AUTO_ADDRESS),
        );
        if primary.is_success() {
            return Ok(DeviceModel::PRIMARY);
        }
        warn!(status = %primary, "Primary MP product refused, trying fallback");

        let fallback = traced(
            MpCall::Connect,
            driver.connect(DeviceModel::FALLBACK, AUTO_ADDRESS),
        );
        if fallback.is_success() {
            return Ok(DeviceModel::FALLBACK);
        }

        Err(DeviceError::ConnectFailed { primary, fallback })
    }

    /// Read one sample.
    ///
    /// Requests `analog + digital` doubles and returns them exactly as the
    /// driver wrote them. Blocks for as long as the driver does.
    ///
    /// # Errors
    ///
    /// `ReadFailed` on any non-success status, including an unreachable entry
    /// point.
    pub fn poll_sample(&mut self) -> Result<Sample> {
        let requested = self.channels.sample_len();
        let mut values = vec![0.0; requested];
        let mut received = 0u32;

        let status = self.driver.receive_data(&mut values, &mut received);
        if let Err(status) = status.check() {
            debug!(call = %MpCall::ReceiveData, status = %status, "MP driver call");
            return Err(DeviceError::ReadFailed(status));
        }
        if received as usize != requested {
            warn!(requested, received, "MP driver returned a short sample");
        }

        self.samples_read += 1;
        Ok(Sample::new(values))
    }

    /// Stop acquisition, then disconnect.
    ///
    /// A failure at either step is reported as-is; nothing is retried.
    pub fn shutdown(self) -> Result<()> {
        let elapsed = self.started_at.elapsed();

        traced(MpCall::StopAcquisition, self.driver.stop_acquisition())
            .check()
            .map_err(DeviceError::StopFailed)?;

        traced(MpCall::Disconnect, self.driver.disconnect())
            .check()
            .map_err(DeviceError::DisconnectFailed)?;

        info!(
            samples = self.samples_read,
            elapsed_s = elapsed.as_secs_f64(),
            "Disconnected from MP device"
        );
        Ok(())
    }

    /// Channels this session acquires.
    pub fn channels(&self) -> &ChannelSelection {
        &self.channels
    }

    /// Product pair that accepted the connection.
    pub fn model(&self) -> DeviceModel {
        self.model
    }

    /// Samples read so far.
    pub fn samples_read(&self) -> u64 {
        self.samples_read
    }
}
