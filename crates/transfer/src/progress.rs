use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::types::UploadStatus;

// ---------------------------------------------------------------------------
// UploadStats
// ---------------------------------------------------------------------------

/// Counters for one upload run.
#[derive(Debug, Clone)]
pub struct UploadStats {
    status: UploadStatus,
    chunks_total: usize,
    chunks_uploaded: usize,
    chunks_skipped: usize,
    bytes_sent: u64,
    started_at: Option<Instant>,
    completed_at: Option<Instant>,
    error: Option<String>,
}

impl UploadStats {
    /// Creates pending stats for an upload of `chunks_total` chunks.
    pub fn new(chunks_total: usize) -> Self {
        Self {
            status: UploadStatus::Pending,
            chunks_total,
            chunks_uploaded: 0,
            chunks_skipped: 0,
            bytes_sent: 0,
            started_at: None,
            completed_at: None,
            error: None,
        }
    }

    /// Marks the run as in progress.
    pub fn start(&mut self) {
        self.status = UploadStatus::InProgress;
        self.started_at = Some(Instant::now());
    }

    /// Records a chunk that was transferred.
    pub fn chunk_uploaded(&mut self, bytes: u64) {
        self.chunks_uploaded += 1;
        self.bytes_sent += bytes;
    }

    /// Records a chunk that was already stored remotely.
    pub fn chunk_skipped(&mut self) {
        self.chunks_skipped += 1;
    }

    /// Records bytes sent that do not belong to a chunk (the manifest object).
    pub fn add_bytes(&mut self, bytes: u64) {
        self.bytes_sent += bytes;
    }

    /// Marks the run as completed.
    pub fn complete(&mut self) {
        self.status = UploadStatus::Completed;
        self.completed_at = Some(Instant::now());
    }

    /// Marks the run as failed.
    pub fn fail(&mut self, err: &str) {
        self.status = UploadStatus::Failed;
        self.error = Some(err.to_string());
        self.completed_at = Some(Instant::now());
    }

    pub fn status(&self) -> UploadStatus {
        self.status
    }

    pub fn chunks_total(&self) -> usize {
        self.chunks_total
    }

    pub fn chunks_uploaded(&self) -> usize {
        self.chunks_uploaded
    }

    pub fn chunks_skipped(&self) -> usize {
        self.chunks_skipped
    }

    pub fn bytes_sent(&self) -> u64 {
        self.bytes_sent
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Chunks neither uploaded nor skipped yet.
    pub fn chunks_remaining(&self) -> usize {
        self.chunks_total
            .saturating_sub(self.chunks_uploaded + self.chunks_skipped)
    }

    /// Wall time between `start` and completion (or now, if still running).
    pub fn elapsed(&self) -> Duration {
        match (self.started_at, self.completed_at) {
            (Some(start), Some(end)) => end.duration_since(start),
            (Some(start), None) => start.elapsed(),
            _ => Duration::ZERO,
        }
    }
}

// ---------------------------------------------------------------------------
// SpeedCalculator
// ---------------------------------------------------------------------------

/// Window used by [`SpeedCalculator::default`].
pub const DEFAULT_SPEED_WINDOW: Duration = Duration::from_secs(30);

/// Throughput over the most recent uploads, used for the remaining-time
/// estimate.
///
/// Each sample is the instant a chunk finished and its size. The bytes of a
/// sample were sent between the previous sample and this one, so the rate
/// needs a baseline: [`start`](Self::start) records one.
#[derive(Debug, Clone)]
pub struct SpeedCalculator {
    window: Duration,
    samples: VecDeque<(Instant, u64)>,
}

impl Default for SpeedCalculator {
    fn default() -> Self {
        Self::new(DEFAULT_SPEED_WINDOW)
    }
}

impl SpeedCalculator {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            samples: VecDeque::new(),
        }
    }

    /// Records the baseline instant, before the first chunk is sent.
    pub fn start(&mut self) {
        self.record_at(Instant::now(), 0);
    }

    /// Records a chunk of `bytes` that just finished.
    pub fn record(&mut self, bytes: u64) {
        self.record_at(Instant::now(), bytes);
    }

    fn record_at(&mut self, at: Instant, bytes: u64) {
        self.samples.push_back((at, bytes));

        // Keep one sample at or before the cutoff as the window's baseline.
        if let Some(cutoff) = at.checked_sub(self.window) {
            while self.samples.len() > 2 && self.samples[1].0 <= cutoff {
                self.samples.pop_front();
            }
        }
    }

    /// Bytes per second across the window, or `None` until two samples
    /// span a non-zero interval.
    pub fn bytes_per_second(&self) -> Option<f64> {
        let (first, _) = *self.samples.front()?;
        let (last, _) = *self.samples.back()?;
        let span = last.duration_since(first);
        if span.is_zero() {
            return None;
        }
        let sent: u64 = self.samples.iter().skip(1).map(|(_, bytes)| bytes).sum();
        Some(sent as f64 / span.as_secs_f64())
    }

    /// Estimated time to send `remaining_bytes` at the current rate.
    pub fn eta(&self, remaining_bytes: u64) -> Option<Duration> {
        if remaining_bytes == 0 {
            return Some(Duration::ZERO);
        }
        let rate = self.bytes_per_second().filter(|r| *r > 0.0)?;
        Some(Duration::from_secs_f64(remaining_bytes as f64 / rate))
    }
}
