//! Waveform Peak Processing
//!
//! Reduces a mono sample buffer to one peak (maximum absolute amplitude) per
//! fixed-size bucket for timeline rendering, and answers snapping queries
//! against those peaks.
//!
//! Only the peaks are kept; raw samples are never retained.

use tracing::debug;

use crate::core::TimeMs;

/// Default number of peak buckets per second of audio
pub const DEFAULT_BUCKETS_PER_SECOND: u32 = 100;

/// Peak extractor owning the most recent peak buffer
#[derive(Debug, Clone)]
pub struct WaveformProcessor {
    sample_rate: u32,
    /// Samples per peak bucket
    bucket_size: usize,
    peaks: Vec<f32>,
}

impl WaveformProcessor {
    /// Creates a processor producing `DEFAULT_BUCKETS_PER_SECOND` peaks per second
    pub fn new(sample_rate: u32) -> Self {
        Self::with_resolution(sample_rate, DEFAULT_BUCKETS_PER_SECOND)
    }

    /// Creates a processor with a custom peak resolution.
    ///
    /// Buckets are at least one sample wide.
    pub fn with_resolution(sample_rate: u32, buckets_per_second: u32) -> Self {
        let bucket_size = (sample_rate / buckets_per_second.max(1)).max(1) as usize;
        Self {
            sample_rate,
            bucket_size,
            peaks: Vec::new(),
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn bucket_size(&self) -> usize {
        self.bucket_size
    }

    /// Computes one max-abs peak per bucket, replacing any previous peaks.
    ///
    /// The final bucket may be partial. Non-finite samples count as silence.
    pub fn process_audio_buffer(&mut self, samples: &[f32]) {
        self.peaks = samples
            .chunks(self.bucket_size)
            .map(|chunk| {
                chunk
                    .iter()
                    .map(|s| if s.is_finite() { s.abs() } else { 0.0 })
                    .fold(0.0f32, f32::max)
            })
            .collect();

        debug!(
            samples = samples.len(),
            buckets = self.peaks.len(),
            bucket_size = self.bucket_size,
            "Processed audio buffer"
        );
    }

    /// Returns the peak array from the last processing pass
    pub fn get_waveform_data(&self) -> &[f32] {
        &self.peaks
    }

    /// Returns indices of buckets whose peak exceeds `threshold`
    pub fn get_peaks(&self, threshold: f32) -> Vec<usize> {
        self.peaks
            .iter()
            .enumerate()
            .filter(|(_, &peak)| peak > threshold)
            .map(|(index, _)| index)
            .collect()
    }

    /// Duration of one bucket in milliseconds
    pub fn bucket_duration_ms(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.bucket_size as f64 * 1000.0 / self.sample_rate as f64
    }

    /// Approximate duration of the processed audio (whole buckets)
    pub fn duration_ms(&self) -> TimeMs {
        (self.peaks.len() as f64 * self.bucket_duration_ms()).round() as TimeMs
    }

    /// Start time of a bucket
    pub fn bucket_to_ms(&self, bucket: usize) -> TimeMs {
        (bucket as f64 * self.bucket_duration_ms()).round() as TimeMs
    }

    /// Bucket containing a time (may be past the last bucket)
    pub fn ms_to_bucket(&self, time_ms: TimeMs) -> usize {
        let width = self.bucket_duration_ms();
        if width <= 0.0 {
            return 0;
        }
        (time_ms as f64 / width).floor() as usize
    }

    /// Finds the bucket nearest to `time_ms` (within `search_buckets`) matching
    /// `predicate`; earlier buckets win ties.
    fn find_nearest(
        &self,
        time_ms: TimeMs,
        search_buckets: usize,
        predicate: impl Fn(f32) -> bool,
    ) -> Option<TimeMs> {
        if self.peaks.is_empty() {
            return None;
        }
        let center = self.ms_to_bucket(time_ms).min(self.peaks.len() - 1);

        // No match can lie further away than the buffer is long
        let search_buckets = search_buckets.min(self.peaks.len());

        (0..=search_buckets)
            .flat_map(|distance| {
                let before = center.checked_sub(distance);
                let after = (distance > 0)
                    .then(|| center.checked_add(distance))
                    .flatten()
                    .filter(|&b| b < self.peaks.len());
                before.into_iter().chain(after)
            })
            .find(|&bucket| predicate(self.peaks[bucket]))
            .map(|bucket| self.bucket_to_ms(bucket))
    }

    /// Time of the nearest bucket louder than `threshold`, for snapping a
    /// caption edge to speech onset.
    pub fn find_nearest_peak(
        &self,
        time_ms: TimeMs,
        threshold: f32,
        search_buckets: usize,
    ) -> Option<TimeMs> {
        self.find_nearest(time_ms, search_buckets, |peak| peak > threshold)
    }

    /// Time of the nearest bucket at or below `threshold`, for snapping a
    /// caption edge into a pause.
    pub fn find_nearest_silence(
        &self,
        time_ms: TimeMs,
        threshold: f32,
        search_buckets: usize,
    ) -> Option<TimeMs> {
        self.find_nearest(time_ms, search_buckets, |peak| peak <= threshold)
    }
}
