//! Network sinks for acquired samples.
//!
//! The only production sink is the Lab Streaming Layer outlet in [`lsl`],
//! compiled with the `lsl-support` feature. [`StreamDeclaration`] is
//! independent of the feature so the stream metadata can be built and
//! checked without liblsl.

#[cfg(feature = "lsl-support")]
pub mod lsl;

use thiserror::Error;
use uuid::Uuid;

use crate::config::SinkConfig;
use crate::sample::Sample;

/// Errors raised while declaring a stream or publishing to it.
#[derive(Error, Debug)]
pub enum SinkError {
    /// A stream needs at least one channel.
    #[error("Stream '{0}' declares no channels")]
    EmptyStream(String),

    /// The sample does not match the declared channel count.
    #[error("Sample has {actual} values but the stream declares {expected} channels")]
    ChannelCountMismatch {
        /// Declared channel count.
        expected: usize,
        /// Values in the rejected sample.
        actual: usize,
    },

    /// The streaming library refused an operation.
    #[error("Lab Streaming Layer {operation} failed: {message}")]
    Lsl {
        /// What was being attempted.
        operation: &'static str,
        /// liblsl's error, as reported by the binding.
        message: String,
    },
}

/// Metadata of the outgoing stream.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamDeclaration {
    /// Stream name seen by consumers.
    pub name: String,
    /// Content-type label.
    pub content_type: String,
    /// Values per sample.
    pub channel_count: usize,
    /// Nominal rate in Hz; 0.0 declares an irregular stream.
    pub nominal_rate: f64,
    /// Per-run source identifier.
    pub source_id: String,
}

impl StreamDeclaration {
    /// Declare a double-precision stream with a fresh random source id.
    pub fn new(sink: &SinkConfig, channel_count: usize) -> Result<Self, SinkError> {
        if channel_count == 0 {
            return Err(SinkError::EmptyStream(sink.stream_name.clone()));
        }
        Ok(Self {
            name: sink.stream_name.clone(),
            content_type: sink.stream_type.clone(),
            channel_count,
            nominal_rate: 0.0,
            source_id: Uuid::new_v4().to_string(),
        })
    }

    /// Reject samples whose length differs from the declared channel count.
    pub fn check_sample(&self, sample: &Sample) -> Result<(), SinkError> {
        if sample.len() == self.channel_count {
            Ok(())
        } else {
            Err(SinkError::ChannelCountMismatch {
                expected: self.channel_count,
                actual: sample.len(),
            })
        }
    }
}

/// Destination for acquired samples.
pub trait SampleSink {
    /// Publish one sample.
    fn push_sample(&mut self, sample: &Sample) -> Result<(), SinkError>;
}

impl<T: SampleSink + ?Sized> SampleSink for Box<T> {
    fn push_sample(&mut self, sample: &Sample) -> Result<(), SinkError> {
        (**self).push_sample(sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declaration_uses_sink_naming() {
        let decl = StreamDeclaration::new(&SinkConfig::default(), 3).unwrap();
        assert_eq!(decl.name, "biopac");
        assert_eq!(decl.content_type, "float");
        assert_eq!(decl.channel_count, 3);
        assert_eq!(decl.nominal_rate, 0.0);
    }

    #[test]
    fn source_id_is_a_fresh_uuid_per_run() {
        let a = StreamDeclaration::new(&SinkConfig::default(), 1).unwrap();
        let b = StreamDeclaration::new(&SinkConfig::default(), 1).unwrap();
        let parsed = Uuid::parse_str(&a.source_id).unwrap();
        assert_eq!(parsed.get_version_num(), 4);
        assert_ne!(a.source_id, b.source_id);
    }

    #[test]
    fn zero_channels_is_rejected() {
        let err = StreamDeclaration::new(&SinkConfig::default(), 0).unwrap_err();
        assert!(matches!(err, SinkError::EmptyStream(name) if name == "biopac"));
    }

    #[test]
    fn sample_length_must_match() {
        let decl = StreamDeclaration::new(&SinkConfig::default(), 2).unwrap();
        assert!(decl.check_sample(&Sample::new(vec![1.0, 2.0])).is_ok());
        assert!(matches!(
            decl.check_sample(&Sample::new(vec![1.0])),
            Err(SinkError::ChannelCountMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }
}
