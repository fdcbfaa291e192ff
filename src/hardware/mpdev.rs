//! Runtime-loaded BIOPAC `mpdev` driver.
//!
//! The library is searched the same way the vendor samples do it: the bare
//! library name through the system search path first, then inside the
//! configured driver directory. Entry points are resolved one by one when the
//! library loads; a symbol that is missing only fails the call that needs it.

#![allow(unsafe_code)]

use std::ffi::CString;
use std::path::{Path, PathBuf};

use libloading::Library;
use mpdev_sys as ffi;
use tracing::{debug, info, warn};

use super::channels::ChannelMask;
use super::error::{DeviceError, Result};
use super::status::DriverStatus;
use super::{DeviceModel, MpCall, MpDevApi};

/// Resolved entry points. `None` means the symbol was not exported.
#[derive(Default)]
struct EntryPoints {
    connect: Option<ffi::connectMPDev>,
    set_sample_rate: Option<ffi::setSampleRate>,
    set_acq_channels: Option<ffi::setAcqChannels>,
    set_digital_acq_channels: Option<ffi::setDigitalAcqChannels>,
    start_acq_daemon: Option<ffi::startMPAcqDaemon>,
    start_acquisition: Option<ffi::startAcquisition>,
    receive_data: Option<ffi::receiveMPData>,
    stop_acquisition: Option<ffi::stopAcquisition>,
    disconnect: Option<ffi::disconnectMPDev>,
}

/// The vendor driver loaded from disk.
///
/// The function pointers in `entry` borrow from `_library`; both are dropped
/// together, library last.
pub struct DynamicMpDev {
    entry: EntryPoints,
    path: PathBuf,
    _library: Library,
}

impl DynamicMpDev {
    /// Platform file name of the driver (`mpdev.dll`, `libmpdev.so`, ...).
    pub fn library_file_name() -> PathBuf {
        PathBuf::from(libloading::library_filename(ffi::LIBRARY_NAME))
    }

    /// Locations tried by [`DynamicMpDev::load`], in order.
    pub fn candidate_paths(dll_dir: Option<&Path>) -> Vec<PathBuf> {
        let file_name = Self::library_file_name();
        let mut candidates = vec![file_name.clone()];
        if let Some(dir) = dll_dir {
            candidates.push(dir.join(file_name));
        }
        candidates
    }

    /// Load the driver, trying the system search path then `dll_dir`.
    pub fn load(dll_dir: Option<&Path>) -> Result<Self> {
        let candidates = Self::candidate_paths(dll_dir);
        let mut failures = Vec::with_capacity(candidates.len());

        for candidate in &candidates {
            // SAFETY: loading runs the library's initialisers. mpdev has no
            // initialisation side effects beyond its own globals.
            match unsafe { Library::new(candidate) } {
                Ok(library) => {
                    info!(path = %candidate.display(), "Loaded MP driver");
                    return Ok(Self::from_library(library, candidate.clone()));
                }
                Err(err) => {
                    debug!(path = %candidate.display(), error = %err, "MP driver not loadable here");
                    failures.push(format!("{}: {err}", candidate.display()));
                }
            }
        }

        let attempted = candidates
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        Err(DeviceError::DriverUnavailable {
            attempted,
            message: failures.join("; "),
        })
    }

    fn from_library(library: Library, path: PathBuf) -> Self {
        // SAFETY: each symbol is looked up with the signature declared in
        // mpdev-sys, which mirrors the vendor header.
        let entry = unsafe {
            EntryPoints {
                connect: resolve(&library, ffi::SYM_CONNECT_MP_DEV),
                set_sample_rate: resolve(&library, ffi::SYM_SET_SAMPLE_RATE),
                set_acq_channels: resolve(&library, ffi::SYM_SET_ACQ_CHANNELS),
                set_digital_acq_channels: resolve(&library, ffi::SYM_SET_DIGITAL_ACQ_CHANNELS),
                start_acq_daemon: resolve(&library, ffi::SYM_START_MP_ACQ_DAEMON),
                start_acquisition: resolve(&library, ffi::SYM_START_ACQUISITION),
                receive_data: resolve(&library, ffi::SYM_RECEIVE_MP_DATA),
                stop_acquisition: resolve(&library, ffi::SYM_STOP_ACQUISITION),
                disconnect: resolve(&library, ffi::SYM_DISCONNECT_MP_DEV),
            }
        };

        Self {
            entry,
            path,
            _library: library,
        }
    }

    /// Path the library was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Copy a function pointer out of the library, or `None` if it is not exported.
unsafe fn resolve<T: Copy>(library: &Library, symbol: &[u8]) -> Option<T> {
    match library.get::<T>(symbol) {
        Ok(sym) => Some(*sym),
        Err(err) => {
            let name = String::from_utf8_lossy(symbol.strip_suffix(b"\0").unwrap_or(symbol));
            warn!(symbol = %name, error = %err, "MP driver entry point missing");
            None
        }
    }
}

/// Invoke `f` if the entry point was resolved, otherwise report it as undispatched.
fn dispatch<F>(call: MpCall, entry: Option<F>, invoke: impl FnOnce(F) -> i32) -> DriverStatus {
    match entry {
        Some(f) => DriverStatus::from_raw(invoke(f)),
        None => DriverStatus::Undispatched(call.symbol()),
    }
}

impl MpDevApi for DynamicMpDev {
    fn connect(&self, model: DeviceModel, address: &str) -> DriverStatus {
        let Ok(address) = CString::new(address) else {
            return DriverStatus::Undispatched(MpCall::Connect.symbol());
        };
        // SAFETY: `address` outlives the call.
        dispatch(MpCall::Connect, self.entry.connect, |f| unsafe {
            f(model.product, model.transport, address.as_ptr())
        })
    }

    fn set_sample_rate(&self, interval_ms: f64) -> DriverStatus {
        // SAFETY: plain value argument.
        dispatch(MpCall::SetSampleRate, self.entry.set_sample_rate, |f| unsafe {
            f(interval_ms)
        })
    }

    fn set_acq_channels(&self, mask: &ChannelMask) -> DriverStatus {
        let mut mask = *mask;
        // SAFETY: the driver reads exactly 16 BOOLs from the pointer.
        dispatch(MpCall::SetAcqChannels, self.entry.set_acq_channels, |f| unsafe {
            f(mask.as_mut_ptr())
        })
    }

    fn set_digital_acq_channels(&self, mask: &ChannelMask) -> DriverStatus {
        let mut mask = *mask;
        // SAFETY: the driver reads exactly 16 BOOLs from the pointer.
        dispatch(
            MpCall::SetDigitalAcqChannels,
            self.entry.set_digital_acq_channels,
            |f| unsafe { f(mask.as_mut_ptr()) },
        )
    }

    fn start_acq_daemon(&self) -> DriverStatus {
        // SAFETY: no arguments.
        dispatch(MpCall::StartAcqDaemon, self.entry.start_acq_daemon, |f| unsafe { f() })
    }

    fn start_acquisition(&self) -> DriverStatus {
        // SAFETY: no arguments.
        dispatch(MpCall::StartAcquisition, self.entry.start_acquisition, |f| unsafe { f() })
    }

    fn receive_data(&self, buffer: &mut [f64], received: &mut u32) -> DriverStatus {
        let Ok(count) = ffi::DWORD::try_from(buffer.len()) else {
            return DriverStatus::Undispatched(MpCall::ReceiveData.symbol());
        };
        // SAFETY: the driver writes at most `count` doubles into `buffer`.
        dispatch(MpCall::ReceiveData, self.entry.receive_data, |f| unsafe {
            f(buffer.as_mut_ptr(), count, received as *mut ffi::DWORD)
        })
    }

    fn stop_acquisition(&self) -> DriverStatus {
        // SAFETY: no arguments.
        dispatch(MpCall::StopAcquisition, self.entry.stop_acquisition, |f| unsafe { f() })
    }

    fn disconnect(&self) -> DriverStatus {
        // SAFETY: no arguments.
        dispatch(MpCall::Disconnect, self.entry.disconnect, |f| unsafe { f() })
    }
}
