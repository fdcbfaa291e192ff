//! Custom error types for the application.
//!
//! This module defines the primary error type, `BridgeError`. Using the
//! `thiserror` crate, it gathers every failure the bridge can hit into one
//! enum so `main` can report it and exit.
//!
//! ## Error Hierarchy
//!
//! - **`Config`**: Wraps errors from `figment` (file parsing, missing keys,
//!   type mismatches).
//! - **`Configuration`**: Semantic configuration problems that pass parsing.
//! - **`Device`**: Anything the MP device binding reports. Always terminal.
//! - **`Sink`**: Stream declaration or publishing failures.
//! - **`Console`**: The operator terminal could not be read or reset.
//! - **`FeatureNotEnabled`**: Functionality compiled out via cargo features.
//!
//! By using `#[from]`, `BridgeError` can be created from the underlying
//! error types with the `?` operator.

use thiserror::Error;

use crate::hardware::DeviceError;
use crate::sink::SinkError;

/// Convenience alias for results using the application error type.
pub type AppResult<T> = std::result::Result<T, BridgeError>;

/// Primary error type for the bridge.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// The configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    /// The configuration loaded but is not usable.
    #[error("Configuration validation error: {0}")]
    Configuration(String),

    /// The device binding failed.
    #[error(transparent)]
    Device(#[from] DeviceError),

    /// The sink failed.
    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),

    /// Terminal input could not be read or restored.
    #[error("Operator console error: {0}")]
    Console(#[source] std::io::Error),

    /// The operation needs a cargo feature this build lacks.
    #[error("Feature '{0}' is not enabled. Please build with --features {0}")]
    FeatureNotEnabled(String),
}

impl From<figment::Error> for BridgeError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl BridgeError {
    /// The device error, if this is one.
    pub fn as_device_error(&self) -> Option<&DeviceError> {
        match self {
            Self::Device(err) => Some(err),
            _ => None,
        }
    }

    /// Which part of a run failed, for the exit report.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Config(_) | Self::Configuration(_) | Self::FeatureNotEnabled(_) => {
                "configuration"
            }
            Self::Device(err) if err.is_setup_failure() => "device setup",
            Self::Device(err) if err.is_shutdown_failure() => "device shutdown",
            Self::Device(_) => "acquisition",
            Self::Sink(_) => "stream",
            Self::Console(_) => "operator console",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::{DriverStatus, MpReturnCode};

    #[test]
    fn device_errors_display_unchanged() {
        let err: BridgeError = DeviceError::ReadFailed(MpReturnCode::CommunicationError.into()).into();
        assert_eq!(err.to_string(), "Failed to obtain a sample: MPCOMERR");
        assert!(err.as_device_error().is_some());
    }

    #[test]
    fn feature_message_names_the_flag() {
        let err = BridgeError::FeatureNotEnabled("lsl-support".into());
        assert_eq!(
            err.to_string(),
            "Feature 'lsl-support' is not enabled. Please build with --features lsl-support"
        );
        assert!(err.as_device_error().is_none());
    }

    #[test]
    fn stage_follows_device_error_kind() {
        let setup: BridgeError = DeviceError::ConnectFailed {
            primary: MpReturnCode::InvalidType.into(),
            fallback: MpReturnCode::CommunicationError.into(),
        }
        .into();
        let read: BridgeError = DeviceError::ReadFailed(MpReturnCode::Underflow.into()).into();
        let teardown: BridgeError =
            DeviceError::DisconnectFailed(MpReturnCode::NotConnected.into()).into();

        assert_eq!(setup.stage(), "device setup");
        assert_eq!(read.stage(), "acquisition");
        assert_eq!(teardown.stage(), "device shutdown");
        assert_eq!(
            BridgeError::FeatureNotEnabled("lsl-support".into()).stage(),
            "configuration"
        );
    }

    #[test]
    fn stop_failure_is_a_device_error() {
        let err: BridgeError =
            DeviceError::StopFailed(DriverStatus::Undispatched("stopAcquisition")).into();
        assert_eq!(
            err.to_string(),
            "Failed to stop data acquisition: failed to call stopAcquisition"
        );
    }
}
