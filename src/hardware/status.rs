//! Translation of `MPRETURNCODE` values into readable status labels.

use std::fmt;

use mpdev_sys as ffi;

/// A return code reported by the MP driver.
///
/// Codes 1 through 19 are the documented `MPRETURNCODE` values. Anything else
/// is preserved as [`MpReturnCode::Unrecognized`] so it can be shown to the
/// operator unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MpReturnCode {
    /// Call completed.
    Success,
    /// Internal driver error.
    DriverError,
    /// The driver library is busy with another call.
    DllBusy,
    /// Invalid parameter.
    InvalidParameter,
    /// Not connected to an MP unit.
    NotConnected,
    /// Unit is ready.
    Ready,
    /// Waiting for pre-trigger.
    WaitingPreTrigger,
    /// Waiting for trigger.
    WaitingTrigger,
    /// Unit is busy.
    Busy,
    /// No acquisition channels enabled.
    NoActiveChannels,
    /// Generic communication error.
    CommunicationError,
    /// Invalid MP type.
    InvalidType,
    /// Unit not found on the network.
    NotInNetwork,
    /// Sample download error.
    SampleDownloadError,
    /// Driver failed to allocate memory.
    MemoryAllocationError,
    /// Socket error.
    SocketError,
    /// Buffer underflow.
    Underflow,
    /// Preset file error.
    PresetError,
    /// Preset file parse error.
    ParserError,
    /// A code outside the documented range.
    Unrecognized(i32),
}

impl MpReturnCode {
    /// Map a raw integer returned by the driver.
    pub fn from_raw(code: i32) -> Self {
        match code {
            ffi::MPSUCCESS => Self::Success,
            ffi::MPDRVERR => Self::DriverError,
            ffi::MPDLLBUSY => Self::DllBusy,
            ffi::MPINVPARA => Self::InvalidParameter,
            ffi::MPNOTCON => Self::NotConnected,
            ffi::MPREADY => Self::Ready,
            ffi::MPWPRETRIG => Self::WaitingPreTrigger,
            ffi::MPWTRIG => Self::WaitingTrigger,
            ffi::MPBUSY => Self::Busy,
            ffi::MPNOACTCH => Self::NoActiveChannels,
            ffi::MPCOMERR => Self::CommunicationError,
            ffi::MPINVTYPE => Self::InvalidType,
            ffi::MPNOTINNET => Self::NotInNetwork,
            ffi::MPSMPLDLERR => Self::SampleDownloadError,
            ffi::MPMEMALLOCERR => Self::MemoryAllocationError,
            ffi::MPSOCKERR => Self::SocketError,
            ffi::MPUNDRFLOW => Self::Underflow,
            ffi::MPPRESETERR => Self::PresetError,
            ffi::MPPARSERERR => Self::ParserError,
            other => Self::Unrecognized(other),
        }
    }

    /// The raw integer value.
    pub fn raw(self) -> i32 {
        match self {
            Self::Success => ffi::MPSUCCESS,
            Self::DriverError => ffi::MPDRVERR,
            Self::DllBusy => ffi::MPDLLBUSY,
            Self::InvalidParameter => ffi::MPINVPARA,
            Self::NotConnected => ffi::MPNOTCON,
            Self::Ready => ffi::MPREADY,
            Self::WaitingPreTrigger => ffi::MPWPRETRIG,
            Self::WaitingTrigger => ffi::MPWTRIG,
            Self::Busy => ffi::MPBUSY,
            Self::NoActiveChannels => ffi::MPNOACTCH,
            Self::CommunicationError => ffi::MPCOMERR,
            Self::InvalidType => ffi::MPINVTYPE,
            Self::NotInNetwork => ffi::MPNOTINNET,
            Self::SampleDownloadError => ffi::MPSMPLDLERR,
            Self::MemoryAllocationError => ffi::MPMEMALLOCERR,
            Self::SocketError => ffi::MPSOCKERR,
            Self::Underflow => ffi::MPUNDRFLOW,
            Self::PresetError => ffi::MPPRESETERR,
            Self::ParserError => ffi::MPPARSERERR,
            Self::Unrecognized(code) => code,
        }
    }

    /// Driver label for documented codes, `None` for unrecognized ones.
    pub fn label(self) -> Option<&'static str> {
        let label = match self {
            Self::Success => "MPSUCCESS",
            Self::DriverError => "MPDRVERR",
            Self::DllBusy => "MPDLLBUSY",
            Self::InvalidParameter => "MPINVPARA",
            Self::NotConnected => "MPNOTCON",
            Self::Ready => "MPREADY",
            Self::WaitingPreTrigger => "MPWPRETRIG",
            Self::WaitingTrigger => "MPWTRIG",
            Self::Busy => "MPBUSY",
            Self::NoActiveChannels => "MPNOACTCH",
            Self::CommunicationError => "MPCOMERR",
            Self::InvalidType => "MPINVTYPE",
            Self::NotInNetwork => "MPNOTINNET",
            Self::SampleDownloadError => "MPSMPLDLERR",
            Self::MemoryAllocationError => "MPMEMALLOCERR",
            Self::SocketError => "MPSOCKERR",
            Self::Underflow => "MPUNDRFLOW",
            Self::PresetError => "MPPRESETERR",
            Self::ParserError => "MPPARSERERR",
            Self::Unrecognized(_) => return None,
        };
        Some(label)
    }

    /// Whether this is `MPSUCCESS`.
    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}

impl fmt::Display for MpReturnCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.label() {
            Some(label) => f.write_str(label),
            None => write!(f, "{}", self.raw()),
        }
    }
}

/// Outcome of one attempted driver call.
///
/// A call that could not be dispatched at all (missing symbol, unloaded
/// library, unreachable mock) is folded into the same type as a genuine
/// return code, so every call site goes through a single success check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverStatus {
    /// The driver returned a code.
    Returned(MpReturnCode),
    /// The named entry point could not be invoked.
    Undispatched(&'static str),
}

impl DriverStatus {
    /// Status for a raw return value.
    pub fn from_raw(code: i32) -> Self {
        Self::Returned(MpReturnCode::from_raw(code))
    }

    /// Shorthand for a successful call.
    pub fn success() -> Self {
        Self::Returned(MpReturnCode::Success)
    }

    /// Whether the call went through and returned `MPSUCCESS`.
    pub fn is_success(self) -> bool {
        matches!(self, Self::Returned(code) if code.is_success())
    }

    /// `Ok(())` on success, otherwise the status itself as the error.
    pub fn check(self) -> Result<(), DriverStatus> {
        if self.is_success() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<MpReturnCode> for DriverStatus {
    fn from(code: MpReturnCode) -> Self {
        Self::Returned(code)
    }
}

impl fmt::Display for DriverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Returned(code) => code.fmt(f),
            Self::Undispatched(symbol) => write!(f, "failed to call {symbol}"),
        }
    }
}
