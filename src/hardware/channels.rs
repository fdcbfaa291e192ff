//! Channel selection and the fixed 16-slot masks the driver expects.

use std::fmt;

use mpdev_sys::{BOOL, MP_CHANNEL_SLOTS};
use serde::{Deserialize, Serialize};

/// A channel index that does not fit in the 16-slot mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("channel {channel} is outside 1..=16")]
pub struct ChannelOutOfRange {
    /// The offending 1-based index.
    pub channel: u32,
}

/// Fixed-length on/off array indexed by `channel - 1`.
///
/// The layout matches the driver's `BOOL[16]` argument bit for bit.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ChannelMask([BOOL; MP_CHANNEL_SLOTS]);

impl ChannelMask {
    /// Mask with every slot off.
    pub const fn empty() -> Self {
        Self([0; MP_CHANNEL_SLOTS])
    }

    /// Build a mask from 1-based channel indices.
    ///
    /// Duplicate indices are harmless. Index 0 and anything above 16 are
    /// rejected.
    pub fn from_channels(channels: &[u32]) -> Result<Self, ChannelOutOfRange> {
        let mut mask = Self::empty();
        for &channel in channels {
            let slot = channel
                .checked_sub(1)
                .map(|s| s as usize)
                .filter(|&s| s < MP_CHANNEL_SLOTS)
                .ok_or(ChannelOutOfRange { channel })?;
            mask.0[slot] = 1;
        }
        Ok(mask)
    }

    /// Whether the 0-based `slot` is enabled.
    pub fn is_set(&self, slot: usize) -> bool {
        self.0.get(slot).is_some_and(|&v| v != 0)
    }

    /// Enabled 0-based slots, ascending.
    pub fn enabled_slots(&self) -> Vec<usize> {
        (0..MP_CHANNEL_SLOTS).filter(|&s| self.is_set(s)).collect()
    }

    /// The raw array.
    pub fn as_array(&self) -> &[BOOL; MP_CHANNEL_SLOTS] {
        &self.0
    }

    /// Mutable pointer for the driver call.
    pub(crate) fn as_mut_ptr(&mut self) -> *mut BOOL {
        self.0.as_mut_ptr()
    }
}

impl Default for ChannelMask {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for ChannelMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bits: String = self.0.iter().map(|&v| if v != 0 { '1' } else { '0' }).collect();
        write!(f, "ChannelMask({bits})")
    }
}

/// Analog and digital channels to acquire, in configuration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSelection {
    /// 1-based analog channel indices.
    pub analog: Vec<u32>,
    /// 1-based digital channel indices.
    pub digital: Vec<u32>,
}

impl ChannelSelection {
    /// Create a selection.
    pub fn new(analog: Vec<u32>, digital: Vec<u32>) -> Self {
        Self { analog, digital }
    }

    /// Values per sample: one per listed analog channel followed by one per
    /// listed digital channel.
    pub fn sample_len(&self) -> usize {
        self.analog.len() + self.digital.len()
    }

    /// Mask for `setAcqChannels`.
    pub fn analog_mask(&self) -> Result<ChannelMask, ChannelOutOfRange> {
        ChannelMask::from_channels(&self.analog)
    }

    /// Mask for `setDigitalAcqChannels`.
    pub fn digital_mask(&self) -> Result<ChannelMask, ChannelOutOfRange> {
        ChannelMask::from_channels(&self.digital)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_indices_map_to_zero_based_slots() {
        let selection = ChannelSelection::new(vec![1, 3], vec![2]);

        let analog = selection.analog_mask().unwrap();
        assert_eq!(analog.enabled_slots(), vec![0, 2]);
        assert_eq!(analog.as_array()[0], 1);
        assert_eq!(analog.as_array()[1], 0);
        assert_eq!(analog.as_array()[2], 1);

        let digital = selection.digital_mask().unwrap();
        assert_eq!(digital.enabled_slots(), vec![1]);
    }

    #[test]
    fn duplicates_set_the_slot_once() {
        let mask = ChannelMask::from_channels(&[4, 4, 4]).unwrap();
        assert_eq!(mask.enabled_slots(), vec![3]);
        assert_eq!(mask.as_array().iter().sum::<i32>(), 1);
    }

    #[test]
    fn slot_range_is_one_through_sixteen() {
        assert!(ChannelMask::from_channels(&[1, 16]).is_ok());
        assert_eq!(
            ChannelMask::from_channels(&[2, 17]),
            Err(ChannelOutOfRange { channel: 17 })
        );
        assert_eq!(
            ChannelMask::from_channels(&[0]),
            Err(ChannelOutOfRange { channel: 0 })
        );
    }

    #[test]
    fn sample_len_counts_every_listed_channel() {
        let selection = ChannelSelection::new(vec![1, 2, 2], vec![5]);
        assert_eq!(selection.sample_len(), 4);
        assert_eq!(ChannelSelection::default().sample_len(), 0);
    }

    #[test]
    fn debug_shows_bit_pattern() {
        let mask = ChannelMask::from_channels(&[1, 16]).unwrap();
        assert_eq!(format!("{mask:?}"), "ChannelMask(1000000000000001)");
    }
}
