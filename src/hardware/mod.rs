//! BIOPAC MP device binding.
//!
//! The vendor driver dictates a fixed call sequence:
//!
//! ```text
//! connectMPDev -> setSampleRate -> setAcqChannels -> setDigitalAcqChannels
//!   -> startMPAcqDaemon -> startAcquisition -> receiveMPData* -> stopAcquisition
//!   -> disconnectMPDev
//! ```
//!
//! # Layout
//!
//! - [`MpDevApi`] - the driver's call surface, one method per entry point
//! - [`mpdev::DynamicMpDev`] - the real driver, loaded at runtime
//! - [`mock::MockMpDev`] - scriptable stand-in for tests and `--simulate`
//! - [`session::MpDevSession`] - connect/configure, poll, shutdown
//! - [`status`] - `MPRETURNCODE` translation
//! - [`channels`] - channel selection and 16-slot masks

pub mod channels;
pub mod error;
pub mod mock;
pub mod mpdev;
pub mod session;
pub mod status;

use std::fmt;

use mpdev_sys as ffi;

pub use channels::{ChannelMask, ChannelOutOfRange, ChannelSelection};
pub use error::{DeviceError, MaskFault};
pub use session::{AcquisitionSettings, MpDevSession};
pub use status::{DriverStatus, MpReturnCode};

/// Identifies one driver entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MpCall {
    /// `connectMPDev`
    Connect,
    /// `setSampleRate`
    SetSampleRate,
    /// `setAcqChannels`
    SetAcqChannels,
    /// `setDigitalAcqChannels`
    SetDigitalAcqChannels,
    /// `startMPAcqDaemon`
    StartAcqDaemon,
    /// `startAcquisition`
    StartAcquisition,
    /// `receiveMPData`
    ReceiveData,
    /// `stopAcquisition`
    StopAcquisition,
    /// `disconnectMPDev`
    Disconnect,
}

impl MpCall {
    /// Exported symbol name.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Connect => "connectMPDev",
            Self::SetSampleRate => "setSampleRate",
            Self::SetAcqChannels => "setAcqChannels",
            Self::SetDigitalAcqChannels => "setDigitalAcqChannels",
            Self::StartAcqDaemon => "startMPAcqDaemon",
            Self::StartAcquisition => "startAcquisition",
            Self::ReceiveData => "receiveMPData",
            Self::StopAcquisition => "stopAcquisition",
            Self::Disconnect => "disconnectMPDev",
        }
    }
}

impl fmt::Display for MpCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Product/transport pair passed to `connectMPDev`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceModel {
    /// `MPTYPE`
    pub product: i32,
    /// `MPCOMTYPE`
    pub transport: i32,
}

impl DeviceModel {
    /// MP160 over UDP, tried first.
    pub const PRIMARY: Self = Self {
        product: ffi::MP160,
        transport: ffi::MPUDP,
    };

    /// MP150 over UDP, tried when the primary pair fails.
    pub const FALLBACK: Self = Self {
        product: ffi::MP150,
        transport: ffi::MPUDP,
    };
}

/// Serial-number argument meaning "first unit found".
pub const AUTO_ADDRESS: &str = "auto";

/// Call surface of the MP driver.
///
/// Every method reports a [`DriverStatus`]; implementations never panic or
/// return a separate error type. If the underlying entry point cannot be
/// reached the method returns [`DriverStatus::Undispatched`].
pub trait MpDevApi {
    /// `connectMPDev(product, transport, address)`
    fn connect(&self, model: DeviceModel, address: &str) -> DriverStatus;

    /// `setSampleRate(ms)`
    fn set_sample_rate(&self, interval_ms: f64) -> DriverStatus;

    /// `setAcqChannels(mask)`
    fn set_acq_channels(&self, mask: &ChannelMask) -> DriverStatus;

    /// `setDigitalAcqChannels(mask)`
    fn set_digital_acq_channels(&self, mask: &ChannelMask) -> DriverStatus;

    /// `startMPAcqDaemon()`
    fn start_acq_daemon(&self) -> DriverStatus;

    /// `startAcquisition()`
    fn start_acquisition(&self) -> DriverStatus;

    /// `receiveMPData(buffer, buffer.len(), &received)`
    ///
    /// May block until the driver has data.
    fn receive_data(&self, buffer: &mut [f64], received: &mut u32) -> DriverStatus;

    /// `stopAcquisition()`
    fn stop_acquisition(&self) -> DriverStatus;

    /// `disconnectMPDev()`
    fn disconnect(&self) -> DriverStatus;
}

impl<T: MpDevApi + ?Sized> MpDevApi for Box<T> {
    fn connect(&self, model: DeviceModel, address: &str) -> DriverStatus {
        (**self).connect(model, address)
    }

    fn set_sample_rate(&self, interval_ms: f64) -> DriverStatus {
        (**self).set_sample_rate(interval_ms)
    }

    fn set_acq_channels(&self, mask: &ChannelMask) -> DriverStatus {
        (**self).set_acq_channels(mask)
    }

    fn set_digital_acq_channels(&self, mask: &ChannelMask) -> DriverStatus {
        (**self).set_digital_acq_channels(mask)
    }

    fn start_acq_daemon(&self) -> DriverStatus {
        (**self).start_acq_daemon()
    }

    fn start_acquisition(&self) -> DriverStatus {
        (**self).start_acquisition()
    }

    fn receive_data(&self, buffer: &mut [f64], received: &mut u32) -> DriverStatus {
        (**self).receive_data(buffer, received)
    }

    fn stop_acquisition(&self) -> DriverStatus {
        (**self).stop_acquisition()
    }

    fn disconnect(&self) -> DriverStatus {
        (**self).disconnect()
    }
}
