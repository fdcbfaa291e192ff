//! Raw declarations for the BIOPAC `mpdev` hardware API.
//!
//! The vendor ships `mpdev` only as a prebuilt dynamic library, so nothing here
//! links against it. This crate describes the entry points (symbol names and
//! function-pointer signatures) and the integer constants the library uses.
//! Resolving and calling the symbols at runtime is the job of the
//! `biopac_lsl::hardware::mpdev` module.
//!
//! # Safety
//!
//! Every function-pointer type is `unsafe extern "system"`. Callers are
//! responsible for passing buffers that stay valid for the duration of the
//! call and that are at least as long as the count passed alongside them.

#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
#![allow(missing_docs)]

use std::os::raw::{c_char, c_double, c_int};

/// Win32 `DWORD`.
pub type DWORD = u32;

/// Win32 `BOOL`, used by the channel mask arrays.
pub type BOOL = c_int;

/// `MPRETURNCODE` as returned by every entry point.
pub type MPRETURNCODE = c_int;

/// Number of slots in an acquisition channel mask.
pub const MP_CHANNEL_SLOTS: usize = 16;

// -----------------------------------------------------------------------------
// MPRETURNCODE values
// -----------------------------------------------------------------------------

pub const MPSUCCESS: MPRETURNCODE = 1;
pub const MPDRVERR: MPRETURNCODE = 2;
pub const MPDLLBUSY: MPRETURNCODE = 3;
pub const MPINVPARA: MPRETURNCODE = 4;
pub const MPNOTCON: MPRETURNCODE = 5;
pub const MPREADY: MPRETURNCODE = 6;
pub const MPWPRETRIG: MPRETURNCODE = 7;
pub const MPWTRIG: MPRETURNCODE = 8;
pub const MPBUSY: MPRETURNCODE = 9;
pub const MPNOACTCH: MPRETURNCODE = 10;
pub const MPCOMERR: MPRETURNCODE = 11;
pub const MPINVTYPE: MPRETURNCODE = 12;
pub const MPNOTINNET: MPRETURNCODE = 13;
pub const MPSMPLDLERR: MPRETURNCODE = 14;
pub const MPMEMALLOCERR: MPRETURNCODE = 15;
pub const MPSOCKERR: MPRETURNCODE = 16;
pub const MPUNDRFLOW: MPRETURNCODE = 17;
pub const MPPRESETERR: MPRETURNCODE = 18;
pub const MPPARSERERR: MPRETURNCODE = 19;

// -----------------------------------------------------------------------------
// MPTYPE / MPCOMTYPE values
// -----------------------------------------------------------------------------

/// MP150 product family.
pub const MP150: c_int = 101;
/// MP160 product family.
pub const MP160: c_int = 103;
/// Ethernet (UDP) transport.
pub const MPUDP: c_int = 11;

// -----------------------------------------------------------------------------
// Entry points
// -----------------------------------------------------------------------------

pub const SYM_CONNECT_MP_DEV: &[u8] = b"connectMPDev\0";
pub const SYM_SET_SAMPLE_RATE: &[u8] = b"setSampleRate\0";
pub const SYM_SET_ACQ_CHANNELS: &[u8] = b"setAcqChannels\0";
pub const SYM_SET_DIGITAL_ACQ_CHANNELS: &[u8] = b"setDigitalAcqChannels\0";
pub const SYM_START_MP_ACQ_DAEMON: &[u8] = b"startMPAcqDaemon\0";
pub const SYM_START_ACQUISITION: &[u8] = b"startAcquisition\0";
pub const SYM_RECEIVE_MP_DATA: &[u8] = b"receiveMPData\0";
pub const SYM_STOP_ACQUISITION: &[u8] = b"stopAcquisition\0";
pub const SYM_DISCONNECT_MP_DEV: &[u8] = b"disconnectMPDev\0";

/// `MPRETURNCODE connectMPDev(MPTYPE type, MPCOMTYPE method, const char* sn)`
pub type connectMPDev =
    unsafe extern "system" fn(mp_type: c_int, method: c_int, sn: *const c_char) -> MPRETURNCODE;

/// `MPRETURNCODE setSampleRate(double rate)`, `rate` in milliseconds per sample.
pub type setSampleRate = unsafe extern "system" fn(rate: c_double) -> MPRETURNCODE;

/// `MPRETURNCODE setAcqChannels(BOOL* analogCH)`, 16-slot array.
pub type setAcqChannels = unsafe extern "system" fn(analog_ch: *mut BOOL) -> MPRETURNCODE;

/// `MPRETURNCODE setDigitalAcqChannels(BOOL* digitalCH)`, 16-slot array.
pub type setDigitalAcqChannels = unsafe extern "system" fn(digital_ch: *mut BOOL) -> MPRETURNCODE;

/// `MPRETURNCODE startMPAcqDaemon(void)`
pub type startMPAcqDaemon = unsafe extern "system" fn() -> MPRETURNCODE;

/// `MPRETURNCODE startAcquisition(void)`
pub type startAcquisition = unsafe extern "system" fn() -> MPRETURNCODE;

/// `MPRETURNCODE receiveMPData(double* buff, DWORD numSamples, DWORD* numReceived)`
pub type receiveMPData = unsafe extern "system" fn(
    buff: *mut c_double,
    num_samples: DWORD,
    num_received: *mut DWORD,
) -> MPRETURNCODE;

/// `MPRETURNCODE stopAcquisition(void)`
pub type stopAcquisition = unsafe extern "system" fn() -> MPRETURNCODE;

/// `MPRETURNCODE disconnectMPDev(void)`
pub type disconnectMPDev = unsafe extern "system" fn() -> MPRETURNCODE;

/// Base name of the driver library, without platform prefix or extension.
pub const LIBRARY_NAME: &str = "mpdev";
