//! Lab Streaming Layer outlet.
//!
//! Publishes each sample as one double64 push on a stream outlet. The outlet
//! makes the stream visible on the local network for as long as it lives.

use lsl::{ChannelFormat, Pushable, StreamInfo, StreamOutlet};
use tracing::info;

use super::{SampleSink, SinkError, StreamDeclaration};
use crate::sample::Sample;

/// Outlet chunk size; 0 lets each push go out on its own.
const CHUNK_SIZE: i32 = 0;

/// Seconds of data the outlet keeps for slow consumers.
const MAX_BUFFERED_SECS: i32 = 360;

fn lsl_error(operation: &'static str, err: lsl::Error) -> SinkError {
    SinkError::Lsl {
        operation,
        message: format!("{err:?}"),
    }
}

/// Stream outlet for one acquisition run.
pub struct LslOutletSink {
    outlet: StreamOutlet,
    declaration: StreamDeclaration,
}

impl LslOutletSink {
    /// Declare the stream and open the outlet.
    pub fn open(declaration: StreamDeclaration) -> Result<Self, SinkError> {
        let channel_count =
            u32::try_from(declaration.channel_count).map_err(|_| SinkError::Lsl {
                operation: "stream declaration",
                message: format!("{} channels is too many", declaration.channel_count),
            })?;

        let info = StreamInfo::new(
            &declaration.name,
            &declaration.content_type,
            channel_count,
            declaration.nominal_rate,
            ChannelFormat::Double64,
            &declaration.source_id,
        )
        .map_err(|e| lsl_error("stream declaration", e))?;

        let outlet = StreamOutlet::new(&info, CHUNK_SIZE, MAX_BUFFERED_SECS)
            .map_err(|e| lsl_error("outlet creation", e))?;

        info!(
            name = %declaration.name,
            content_type = %declaration.content_type,
            channels = declaration.channel_count,
            source_id = %declaration.source_id,
            "LSL outlet open"
        );

        Ok(Self {
            outlet,
            declaration,
        })
    }
}

impl SampleSink for LslOutletSink {
    fn push_sample(&mut self, sample: &Sample) -> Result<(), SinkError> {
        self.declaration.check_sample(sample)?;
        self.outlet
            .push_sample(sample.as_vec())
            .map_err(|e| lsl_error("push", e))
    }
}
