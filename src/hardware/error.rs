//! Error types for MP device operations.
//!
//! Every variant is terminal for the current run. The payload is the driver's
//! own status (or the "failed to call" sentinel) so the operator can tell a
//! cabling problem from a driver fault.

use std::fmt;

use thiserror::Error;

use super::channels::ChannelOutOfRange;
use super::status::DriverStatus;

/// Result type alias for device operations.
pub type Result<T> = std::result::Result<T, DeviceError>;

/// Why a channel mask was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskFault {
    /// A configured index does not fit the mask; the driver was not called.
    OutOfRange(ChannelOutOfRange),
    /// The driver refused the mask.
    Driver(DriverStatus),
}

impl fmt::Display for MaskFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange(err) => err.fmt(f),
            Self::Driver(status) => status.fmt(f),
        }
    }
}

/// Errors raised by the device binding.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DeviceError {
    /// The driver library could not be loaded from any candidate location.
    #[error("Could not load MP driver (tried {attempted}): {message}")]
    DriverUnavailable {
        /// Every location tried, in order.
        attempted: String,
        /// The loader's message for each location.
        message: String,
    },

    /// Both product identifiers were refused.
    #[error("Failed to connect to MP device: {fallback} (primary attempt: {primary})")]
    ConnectFailed {
        /// Status of the MP160 attempt.
        primary: DriverStatus,
        /// Status of the MP150 attempt.
        fallback: DriverStatus,
    },

    /// `setSampleRate` was refused.
    #[error("Failed to set sample rate: {0}")]
    SampleRateRejected(DriverStatus),

    /// The analog channel mask was not applied.
    #[error("Failed to set channels to acquire: {0}")]
    ChannelMaskRejected(MaskFault),

    /// The digital channel mask was not applied.
    #[error("Failed to set digital channels to acquire: {0}")]
    DigitalChannelMaskRejected(MaskFault),

    /// `startMPAcqDaemon` failed.
    #[error("Failed to start acquisition daemon: {0}")]
    DaemonStartFailed(DriverStatus),

    /// `startAcquisition` failed.
    #[error("Failed to start data acquisition: {0}")]
    AcquisitionStartFailed(DriverStatus),

    /// `receiveMPData` failed.
    #[error("Failed to obtain a sample: {0}")]
    ReadFailed(DriverStatus),

    /// `stopAcquisition` failed.
    #[error("Failed to stop data acquisition: {0}")]
    StopFailed(DriverStatus),

    /// `disconnectMPDev` failed.
    #[error("Failed to disconnect from MP device: {0}")]
    DisconnectFailed(DriverStatus),
}

impl DeviceError {
    /// Whether this error came from the setup sequence.
    pub fn is_setup_failure(&self) -> bool {
        matches!(
            self,
            Self::DriverUnavailable { .. }
                | Self::ConnectFailed { .. }
                | Self::SampleRateRejected(_)
                | Self::ChannelMaskRejected(_)
                | Self::DigitalChannelMaskRejected(_)
                | Self::DaemonStartFailed(_)
                | Self::AcquisitionStartFailed(_)
        )
    }

    /// Whether this error came from stopping or disconnecting.
    pub fn is_shutdown_failure(&self) -> bool {
        matches!(self, Self::StopFailed(_) | Self::DisconnectFailed(_))
    }
}
