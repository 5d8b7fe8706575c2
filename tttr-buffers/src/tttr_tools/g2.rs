use crate::{
    buffers::{FixedWindowRingBuffer, SequentialEventQueue, TimestampFifo},
    errors::Error,
    Click,
};
use std::convert::TryFrom;
use tracing::debug;

pub const MAX_BUFFER_SIZE: usize = 4096;

/// Click history used while correlating.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum G2Backend {
    /// Last `buffer_size` clicks per channel in a mirrored ring.
    MirroredRing,
    /// Every click still inside the correlation window, in a growable queue.
    EventQueue,
}

/// Result from the g2 algorithm
#[derive(Debug, Clone, PartialEq)]
pub struct G2Result {
    pub t: Vec<f64>,
    pub hist: Vec<u64>,
}

/// Parameters for the g2 algorithm
///
/// # Parameters
///    - channel_1: The number of the first input channel into the TCSPC
///    - channel_2: The number of the second input channel into the TCSPC
///    - correlation_window: Length of the correlation window of interest in seconds
///    - resolution: Resolution of the g2 histogram in seconds
///    - time_resolution: Duration of one time tag tick in seconds
///    - buffer_size: Clicks kept per channel by the `MirroredRing` backend. Only
///      checked when that backend is built, `EventQueue` ignores it.
///    - record_ranges: Optional `[start, stop)` index ranges into the clicks. Each
///      range is correlated on its own and accumulated into the same histogram.
#[derive(Debug, Clone)]
pub struct G2Params {
    pub channel_1: i32,
    pub channel_2: i32,
    pub correlation_window: f64,
    pub resolution: f64,
    pub time_resolution: f64,
    pub buffer_size: usize,
    pub record_ranges: Option<Vec<(usize, usize)>>,
}

impl Default for G2Params {
    fn default() -> Self {
        Self {
            channel_1: 0,
            channel_2: 1,
            correlation_window: 50_000e-12,
            resolution: 600e-12,
            time_resolution: 1e-12,
            buffer_size: MAX_BUFFER_SIZE,
            record_ranges: None,
        }
    }
}

impl G2Params {
    pub fn validate(&self) -> Result<(), Error> {
        if self.channel_1 == self.channel_2 {
            return Err(Error::InvalidParams(format!(
                "channel_1 and channel_2 must differ, both are {}.",
                self.channel_1
            )));
        }
        if !(self.time_resolution > 0.0) || !self.time_resolution.is_finite() {
            return Err(Error::InvalidParams(String::from(
                "time_resolution must be positive and finite.",
            )));
        }
        if !self.correlation_window.is_finite() || !self.resolution.is_finite() {
            return Err(Error::InvalidParams(format!(
                "correlation_window ({} s) and resolution ({} s) must be finite.",
                self.correlation_window, self.resolution
            )));
        }
        if !(self.resolution > 0.0) || !(self.correlation_window >= self.resolution) {
            return Err(Error::InvalidParams(format!(
                "The correlation window ({} s) must span at least one bin of {} s.",
                self.correlation_window, self.resolution
            )));
        }
        Ok(())
    }
}

struct G2 {
    central_bin: u64,
    n_bins: u64,
    resolution: u64,
    correlation_window: u64,
    real_resolution: f64,
    channel_1: i32,
    channel_2: i32,
}

impl G2 {
    fn init(params: &G2Params) -> Result<Self, Error> {
        params.validate()?;
        let real_resolution = params.resolution;
        let n_bins = (params.correlation_window / params.resolution) as u64;
        let correlation_window = params.correlation_window / params.time_resolution;

        let resolution = (correlation_window / (n_bins as f64)) as u64;
        if resolution == 0 {
            return Err(Error::InvalidParams(format!(
                "Resolution of {} s is finer than one time tag tick of {} s.",
                params.resolution, params.time_resolution
            )));
        }
        let too_many_bins = || {
            Error::InvalidParams(format!(
                "A correlation window of {} s at {} s resolution needs too many bins.",
                params.correlation_window, params.resolution
            ))
        };
        let correlation_window = n_bins.checked_mul(resolution).ok_or_else(too_many_bins)?;
        let n_bins = n_bins.checked_mul(2).ok_or_else(too_many_bins)?;
        // The histogram is indexed by `usize`.
        usize::try_from(n_bins).map_err(|_| too_many_bins())?;

        let central_bin = n_bins / 2;

        Ok(Self {
            central_bin,
            n_bins,
            resolution,
            correlation_window,
            real_resolution,
            channel_1: params.channel_1,
            channel_2: params.channel_2,
        })
    }

    fn compute<C: Click, F: TimestampFifo>(
        &self,
        clicks: &[C],
        buff_1: &mut F,
        buff_2: &mut F,
        out_hist: &mut [u64],
    ) {
        // Substractions between u64 below are safe from over/underflows due to
        // algorithm invariants.
        //   1. `rec.tof` is always the most recent click on the detector.
        //   2. The `if` guard on `delta`.
        for rec in clicks {
            let (tof, channel) = (*rec.tof(), *rec.channel());

            if channel == self.channel_1 {
                buff_1.push_tof(tof);
                self.expire(tof, buff_1, buff_2);

                let (older, newer) = buff_2.as_slices();
                for click in newer.iter().rev().chain(older.iter().rev()) {
                    let delta = tof - click;
                    if delta < self.correlation_window {
                        let hist_idx = self.central_bin - delta / self.resolution - 1;
                        out_hist[hist_idx as usize] += 1;
                    } else {
                        break;
                    }
                }
            } else if channel == self.channel_2 {
                buff_2.push_tof(tof);
                self.expire(tof, buff_1, buff_2);

                let (older, newer) = buff_1.as_slices();
                for click in newer.iter().rev().chain(older.iter().rev()) {
                    let delta = tof - click;
                    if delta < self.correlation_window {
                        let hist_idx = self.central_bin + delta / self.resolution;
                        out_hist[hist_idx as usize] += 1;
                    } else {
                        break;
                    }
                }
            }
        }
    }

    // Clicks at or before `tof - correlation_window` can never land in the
    // histogram again since every later click is at least as recent.
    #[inline(always)]
    fn expire<F: TimestampFifo>(&self, tof: u64, buff_1: &mut F, buff_2: &mut F) {
        if let Some(horizon) = tof.checked_sub(self.correlation_window) {
            buff_1.expire_through(horizon);
            buff_2.expire_through(horizon);
        }
    }

    fn run<C: Click, F: TimestampFifo>(
        &self,
        clicks: &[C],
        record_ranges: &Option<Vec<(usize, usize)>>,
        buff_1: &mut F,
        buff_2: &mut F,
    ) -> Result<Vec<u64>, Error> {
        let mut g2_histogram = vec![0; self.n_bins as usize];

        if let Some(record_ranges) = record_ranges {
            for &(start_record, stop_record) in record_ranges {
                if start_record > stop_record || stop_record > clicks.len() {
                    return Err(Error::InvalidParams(format!(
                        "Record range ({}, {}) is out of bounds for {} clicks.",
                        start_record,
                        stop_record,
                        clicks.len()
                    )));
                }
                buff_1.reset();
                buff_2.reset();
                self.compute(
                    &clicks[start_record..stop_record],
                    buff_1,
                    buff_2,
                    &mut g2_histogram,
                );
            }
        } else {
            self.compute(clicks, buff_1, buff_2, &mut g2_histogram);
        }
        Ok(g2_histogram)
    }

    fn time_axis(&self) -> Vec<f64> {
        (0..self.n_bins)
            .map(|i| ((i as f64) - (self.central_bin as f64)) * self.real_resolution)
            .collect()
    }
}

/// Computes the second order autocorrelation (g2) between two channels on a TCSPC module.
///
/// ## Parameters
///
/// The parameters to the algorithm are passed via a `G2Params` struct, see its
/// documentation. Clicks must be ordered by time tag.
///
/// ## Algorithm description
///
/// The streaming g2 algorithm measures the time difference between a
/// photon arriving at a channel and all the photons that came before it and arrived
/// at the other channel. A histogram of time differences is then built and is the output
/// we are after.
///
/// Past clicks on each channel are kept in a `TimestampFifo`. The `backend` picks
/// which one:
///    - `MirroredRing` keeps the last `buffer_size` clicks per channel. Reading them
///      newest to oldest is a walk over one contiguous slice.
///    - `EventQueue` keeps every click still inside the correlation window and
///      drops older ones from the front as time advances.
///
/// ## Finite buffer artifacts
/// With `MirroredRing` only the last `buffer_size` photons can be looked back at.
/// At it's most extreme if N=1 we only look into the immediately previous photon,
/// which introduces an exponential decay artifact on the g2. The artifact free window
/// is roughly `buffer_size` over the click rate, e.g. 4096 photons at 10e6 Hz give
/// 0.4 milliseconds. When the ring holds every click inside the window both
/// backends produce identical histograms.
pub fn g2<C: Click>(
    clicks: &[C],
    params: &G2Params,
    backend: G2Backend,
) -> Result<G2Result, Error> {
    let tt = G2::init(params)?;
    debug!(
        ?backend,
        n_bins = tt.n_bins,
        window_ticks = tt.correlation_window,
        bin_ticks = tt.resolution,
        clicks = clicks.len(),
        "starting g2"
    );

    let hist = match backend {
        G2Backend::MirroredRing => {
            let mut buff_1 = FixedWindowRingBuffer::try_new(params.buffer_size)?;
            let mut buff_2 = FixedWindowRingBuffer::try_new(params.buffer_size)?;
            tt.run(clicks, &params.record_ranges, &mut buff_1, &mut buff_2)?
        }
        G2Backend::EventQueue => {
            let mut buff_1 = SequentialEventQueue::new();
            let mut buff_2 = SequentialEventQueue::new();
            tt.run(clicks, &params.record_ranges, &mut buff_1, &mut buff_2)?
        }
    };

    debug!(coincidences = hist.iter().sum::<u64>(), "g2 finished");
    Ok(G2Result {
        t: tt.time_axis(),
        hist,
    })
}
