//! Mock MP Driver
//!
//! Simulated `mpdev` call surface for testing without a BIOPAC unit.
//!
//! `MockMpDev` behaves like a well-connected MP160 by default:
//!
//! - `connectMPDev` accepts the primary product pair only
//! - every configuration call succeeds once connected
//! - `receiveMPData` returns queued samples first, then synthetic waveforms
//!
//! Failures are scripted per call with [`MockMpDev::fail_call`] and
//! [`MockMpDev::remove_symbol`]. The mock is cheaply cloneable; clones share
//! state, so a test can keep a handle while a session owns another.
//!
//! # Example
//!
//! ```rust,ignore
//! let mock = MockMpDev::new();
//! mock.push_sample(vec![0.5, 1.0]);
//! let session = MpDevSession::connect(mock.clone(), &settings)?;
//! assert_eq!(mock.calls()[0], MpCall::Connect);
//! ```

use std::collections::{HashMap, HashSet, VecDeque};
use std::f64::consts::TAU;
use std::sync::Arc;
use std::time::Duration;

use mpdev_sys::MP_CHANNEL_SLOTS;
use parking_lot::Mutex;

use super::channels::ChannelMask;
use super::status::{DriverStatus, MpReturnCode};
use super::{DeviceModel, MpCall, MpDevApi};

#[derive(Debug)]
struct MockState {
    accepted_models: Vec<DeviceModel>,
    failures: HashMap<MpCall, MpReturnCode>,
    missing: HashSet<MpCall>,
    calls: Vec<MpCall>,
    connect_attempts: Vec<DeviceModel>,
    connected: bool,
    daemon_running: bool,
    acquiring: bool,
    sample_interval_ms: Option<f64>,
    analog_mask: Option<ChannelMask>,
    digital_mask: Option<ChannelMask>,
    queued: VecDeque<Vec<f64>>,
    samples_delivered: u64,
    pacing: bool,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            accepted_models: vec![DeviceModel::PRIMARY],
            failures: HashMap::new(),
            missing: HashSet::new(),
            calls: Vec::new(),
            connect_attempts: Vec::new(),
            connected: false,
            daemon_running: false,
            acquiring: false,
            sample_interval_ms: None,
            analog_mask: None,
            digital_mask: None,
            queued: VecDeque::new(),
            samples_delivered: 0,
            pacing: false,
        }
    }
}

impl MockState {
    /// Record the call and return the scripted outcome, if any.
    fn enter(&mut self, call: MpCall) -> Option<DriverStatus> {
        self.calls.push(call);
        if self.missing.contains(&call) {
            return Some(DriverStatus::Undispatched(call.symbol()));
        }
        self.failures.get(&call).copied().map(DriverStatus::Returned)
    }

    fn require_connection(&self) -> Option<DriverStatus> {
        (!self.connected).then(|| MpReturnCode::NotConnected.into())
    }

    /// Synthetic value for `slot`: a sine per analog slot, square wave per
    /// digital slot.
    fn synthesize(&self, buffer: &mut [f64]) {
        let interval_s = self.sample_interval_ms.unwrap_or(1.0) / 1000.0;
        let t = self.samples_delivered as f64 * interval_s;

        let analog = self.analog_mask.map(|m| m.enabled_slots()).unwrap_or_default();
        let digital = self.digital_mask.map(|m| m.enabled_slots()).unwrap_or_default();

        let analog_values = analog.iter().map(|&slot| {
            let freq = 1.0 + slot as f64;
            (TAU * freq * t).sin()
        });
        let digital_values = digital.iter().map(|&slot| {
            let period = 0.5 + 0.25 * slot as f64;
            if (t / period).fract() < 0.5 {
                1.0
            } else {
                0.0
            }
        });

        for (value, out) in analog_values.chain(digital_values).zip(buffer.iter_mut()) {
            *out = value;
        }
    }
}

/// Scriptable in-process stand-in for the `mpdev` driver.
#[derive(Debug, Clone, Default)]
pub struct MockMpDev {
    state: Arc<Mutex<MockState>>,
}

impl MockMpDev {
    /// Mock that accepts the primary product pair.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mock for `--simulate`: paces `receiveMPData` by the configured sample
    /// interval so the stream runs at a realistic rate.
    pub fn simulated() -> Self {
        let mock = Self::new();
        mock.state.lock().pacing = true;
        mock
    }

    /// Replace the set of product pairs `connectMPDev` accepts.
    pub fn accept_models(&self, models: &[DeviceModel]) -> &Self {
        self.state.lock().accepted_models = models.to_vec();
        self
    }

    /// Make `call` return `code` from now on.
    pub fn fail_call(&self, call: MpCall, code: MpReturnCode) -> &Self {
        self.state.lock().failures.insert(call, code);
        self
    }

    /// Undo [`MockMpDev::fail_call`].
    pub fn clear_failure(&self, call: MpCall) -> &Self {
        self.state.lock().failures.remove(&call);
        self
    }

    /// Pretend the driver does not export `call`.
    pub fn remove_symbol(&self, call: MpCall) -> &Self {
        self.state.lock().missing.insert(call);
        self
    }

    /// Queue a sample for the next `receiveMPData`.
    pub fn push_sample(&self, values: Vec<f64>) -> &Self {
        self.state.lock().queued.push_back(values);
        self
    }

    /// Simulate the unit dropping off the network. Acquisition flags are left
    /// as they were.
    pub fn drop_link(&self) -> &Self {
        self.state.lock().connected = false;
        self
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<MpCall> {
        self.state.lock().calls.clone()
    }

    /// How many times `call` was made.
    pub fn call_count(&self, call: MpCall) -> usize {
        self.state.lock().calls.iter().filter(|&&c| c == call).count()
    }

    /// Product pairs passed to `connectMPDev`, in order.
    pub fn connect_attempts(&self) -> Vec<DeviceModel> {
        self.state.lock().connect_attempts.clone()
    }

    /// Last interval passed to `setSampleRate`.
    pub fn sample_interval_ms(&self) -> Option<f64> {
        self.state.lock().sample_interval_ms
    }

    /// Last mask passed to `setAcqChannels`.
    pub fn analog_mask(&self) -> Option<ChannelMask> {
        self.state.lock().analog_mask
    }

    /// Last mask passed to `setDigitalAcqChannels`.
    pub fn digital_mask(&self) -> Option<ChannelMask> {
        self.state.lock().digital_mask
    }

    /// Whether the mock considers itself connected.
    pub fn is_connected(&self) -> bool {
        self.state.lock().connected
    }

    /// Whether acquisition is running.
    pub fn is_acquiring(&self) -> bool {
        self.state.lock().acquiring
    }
}

impl MpDevApi for MockMpDev {
    fn connect(&self, model: DeviceModel, _address: &str) -> DriverStatus {
        let mut state = self.state.lock();
        if let Some(status) = state.enter(MpCall::Connect) {
            return status;
        }
        state.connect_attempts.push(model);
        if state.accepted_models.contains(&model) {
            state.connected = true;
            DriverStatus::success()
        } else {
            MpReturnCode::InvalidType.into()
        }
    }

    fn set_sample_rate(&self, interval_ms: f64) -> DriverStatus {
        let mut state = self.state.lock();
        if let Some(status) = state.enter(MpCall::SetSampleRate) {
            return status;
        }
        if let Some(status) = state.require_connection() {
            return status;
        }
        if !(interval_ms.is_finite() && interval_ms > 0.0) {
            return MpReturnCode::InvalidParameter.into();
        }
        state.sample_interval_ms = Some(interval_ms);
        DriverStatus::success()
    }

    fn set_acq_channels(&self, mask: &ChannelMask) -> DriverStatus {
        let mut state = self.state.lock();
        if let Some(status) = state.enter(MpCall::SetAcqChannels) {
            return status;
        }
        if let Some(status) = state.require_connection() {
            return status;
        }
        state.analog_mask = Some(*mask);
        DriverStatus::success()
    }

    fn set_digital_acq_channels(&self, mask: &ChannelMask) -> DriverStatus {
        let mut state = self.state.lock();
        if let Some(status) = state.enter(MpCall::SetDigitalAcqChannels) {
            return status;
        }
        if let Some(status) = state.require_connection() {
            return status;
        }
        state.digital_mask = Some(*mask);
        DriverStatus::success()
    }

    fn start_acq_daemon(&self) -> DriverStatus {
        let mut state = self.state.lock();
        if let Some(status) = state.enter(MpCall::StartAcqDaemon) {
            return status;
        }
        if let Some(status) = state.require_connection() {
            return status;
        }
        state.daemon_running = true;
        DriverStatus::success()
    }

    fn start_acquisition(&self) -> DriverStatus {
        let mut state = self.state.lock();
        if let Some(status) = state.enter(MpCall::StartAcquisition) {
            return status;
        }
        if let Some(status) = state.require_connection() {
            return status;
        }
        let any_channel = [state.analog_mask, state.digital_mask]
            .iter()
            .flatten()
            .any(|m| (0..MP_CHANNEL_SLOTS).any(|s| m.is_set(s)));
        if !any_channel {
            return MpReturnCode::NoActiveChannels.into();
        }
        state.acquiring = true;
        DriverStatus::success()
    }

    fn receive_data(&self, buffer: &mut [f64], received: &mut u32) -> DriverStatus {
        let pace = {
            let mut state = self.state.lock();
            if let Some(status) = state.enter(MpCall::ReceiveData) {
                return status;
            }
            if let Some(status) = state.require_connection() {
                return status;
            }
            if !state.acquiring {
                return MpReturnCode::Busy.into();
            }

            match state.queued.pop_front() {
                Some(values) => {
                    let n = values.len().min(buffer.len());
                    buffer[..n].copy_from_slice(&values[..n]);
                    *received = n as u32;
                }
                None => {
                    state.synthesize(buffer);
                    *received = buffer.len() as u32;
                }
            }
            state.samples_delivered += 1;

            state
                .pacing
                .then(|| state.sample_interval_ms.unwrap_or(1.0))
        };

        if let Some(interval_ms) = pace {
            std::thread::sleep(Duration::from_secs_f64(interval_ms / 1000.0));
        }
        DriverStatus::success()
    }

    fn stop_acquisition(&self) -> DriverStatus {
        let mut state = self.state.lock();
        if let Some(status) = state.enter(MpCall::StopAcquisition) {
            return status;
        }
        if !state.acquiring {
            return MpReturnCode::Busy.into();
        }
        state.acquiring = false;
        state.daemon_running = false;
        DriverStatus::success()
    }

    fn disconnect(&self) -> DriverStatus {
        let mut state = self.state.lock();
        if let Some(status) = state.enter(MpCall::Disconnect) {
            return status;
        }
        if let Some(status) = state.require_connection() {
            return status;
        }
        state.connected = false;
        DriverStatus::success()
    }
}
