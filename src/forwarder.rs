//! Poll-and-publish loop.
//!
//! Each iteration polls exactly one sample, publishes it, then checks whether
//! the operator asked to stop. Nothing is buffered between iterations. A
//! failed poll ends the loop at once: a degraded readout must not be hidden
//! from downstream consumers, so there is no retry.

use std::time::{Duration, Instant};

use crate::error::{AppResult, BridgeError};
use crate::hardware::{DeviceError, MpDevApi, MpDevSession};
use crate::sample::Sample;
use crate::sink::SampleSink;

/// Something that yields one sample per call.
pub trait SampleSource {
    /// Block until the next sample is available.
    fn poll_sample(&mut self) -> Result<Sample, DeviceError>;
}

impl<D: MpDevApi> SampleSource for MpDevSession<D> {
    fn poll_sample(&mut self) -> Result<Sample, DeviceError> {
        MpDevSession::poll_sample(self)
    }
}

/// Operator stop request, checked once per iteration without blocking.
pub trait QuitSignal {
    /// Whether the loop should end after the current iteration.
    fn quit_requested(&mut self) -> std::io::Result<bool>;
}

/// Result of a loop that ended on operator request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForwardStats {
    /// Samples polled and published.
    pub samples: u64,
    /// Wall time spent in the loop.
    pub elapsed: Duration,
}

impl ForwardStats {
    /// Average samples per second.
    pub fn rate_hz(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.samples as f64 / secs
        } else {
            0.0
        }
    }
}

/// Run until the operator quits or a poll or publish fails.
///
/// Nothing is logged here: the caller may still hold the terminal in raw
/// mode when this returns.
///
/// # Errors
///
/// The first device, sink or console error; the loop does not continue past
/// it.
pub fn forward<S, K, Q>(source: &mut S, sink: &mut K, quit: &mut Q) -> AppResult<ForwardStats>
where
    S: SampleSource + ?Sized,
    K: SampleSink + ?Sized,
    Q: QuitSignal + ?Sized,
{
    let started = Instant::now();
    let mut samples = 0u64;

    loop {
        let sample = source.poll_sample()?;
        sink.push_sample(&sample)?;
        samples += 1;

        if quit.quit_requested().map_err(BridgeError::Console)? {
            break;
        }
    }

    Ok(ForwardStats {
        samples,
        elapsed: started.elapsed(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::MpReturnCode;
    use crate::sink::SinkError;
    use std::collections::VecDeque;

    struct Scripted(VecDeque<Result<Sample, DeviceError>>);

    impl SampleSource for Scripted {
        fn poll_sample(&mut self) -> Result<Sample, DeviceError> {
            self.0
                .pop_front()
                .unwrap_or_else(|| Ok(Sample::new(vec![0.0])))
        }
    }

    #[derive(Default)]
    struct Collect(Vec<Sample>);

    impl SampleSink for Collect {
        fn push_sample(&mut self, sample: &Sample) -> Result<(), SinkError> {
            self.0.push(sample.clone());
            Ok(())
        }
    }

    struct AfterChecks(u32);

    impl QuitSignal for AfterChecks {
        fn quit_requested(&mut self) -> std::io::Result<bool> {
            self.0 = self.0.saturating_sub(1);
            Ok(self.0 == 0)
        }
    }

    #[test]
    fn quit_ends_loop_after_current_sample() {
        let mut source = Scripted(VecDeque::new());
        let mut sink = Collect::default();
        let stats = forward(&mut source, &mut sink, &mut AfterChecks(3)).unwrap();
        assert_eq!(stats.samples, 3);
        assert_eq!(sink.0.len(), 3);
    }

    #[test]
    fn poll_failure_is_not_published() {
        let mut source = Scripted(VecDeque::from([
            Ok(Sample::new(vec![1.0])),
            Err(DeviceError::ReadFailed(MpReturnCode::Underflow.into())),
        ]));
        let mut sink = Collect::default();
        let err = forward(&mut source, &mut sink, &mut AfterChecks(10)).unwrap_err();
        assert!(matches!(
            err.as_device_error(),
            Some(DeviceError::ReadFailed(_))
        ));
        assert_eq!(sink.0, vec![Sample::new(vec![1.0])]);
    }

    #[test]
    fn rate_is_zero_without_elapsed_time() {
        let stats = ForwardStats {
            samples: 10,
            elapsed: Duration::ZERO,
        };
        assert_eq!(stats.rate_hz(), 0.0);
    }
}
