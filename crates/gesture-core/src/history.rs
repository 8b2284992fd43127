//! Fixed-capacity sample history and the dispersion statistic shared by
//! every region analyzer.
//!
//! ## Jitter
//!
//! For one tracked point the jitter over a window is
//!
//! J = (σx + σy + σz) / 3
//!
//! where σ is the population standard deviation of that coordinate over
//! the buffered samples. Using one statistic everywhere keeps region
//! scores comparable.

use std::collections::VecDeque;

use crate::types::Position3D;

/// Upper bound on the warm-up length before jitter is reported
pub const MAX_JITTER_WARMUP: usize = 10;

/// Bounded FIFO of recent samples, oldest evicted first
#[derive(Debug, Clone)]
pub struct RollingHistory<T> {
    samples: VecDeque<T>,
    capacity: usize,
}

impl<T> RollingHistory<T> {
    /// `capacity` must be positive; configuration validation guarantees it
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, sample: T) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// Samples in insertion order
    pub fn values(&self) -> impl ExactSizeIterator<Item = &T> + '_ {
        self.samples.iter()
    }

    pub fn latest(&self) -> Option<&T> {
        self.samples.back()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// True once `capacity` samples have been pushed since the last clear
    pub fn is_full(&self) -> bool {
        self.samples.len() == self.capacity
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Number of samples needed before jitter is meaningful
    pub fn jitter_warmup(&self) -> usize {
        MAX_JITTER_WARMUP.min(self.capacity / 3)
    }

    /// Jitter of one point channel extracted from each sample; zero while
    /// the window is still warming up.
    pub fn jitter_by<F>(&self, channel: F) -> f64
    where
        F: Fn(&T) -> Position3D,
    {
        if self.samples.len() < self.jitter_warmup().max(1) {
            return 0.0;
        }
        positional_jitter(self.samples.iter().map(channel))
    }
}

/// Mean per-axis population standard deviation of a point sequence
pub fn positional_jitter<I>(points: I) -> f64
where
    I: IntoIterator<Item = Position3D>,
{
    let points: Vec<Position3D> = points.into_iter().collect();
    if points.len() < 2 {
        return 0.0;
    }

    let n = points.len() as f64;
    let axes: [fn(&Position3D) -> f64; 3] = [|p| p.x, |p| p.y, |p| p.z];

    // Deviations from the first sample: a still point yields exactly zero
    axes.iter()
        .map(|axis| {
            let origin = axis(&points[0]);
            let shift = |p: &Position3D| axis(p) - origin;
            let mean = points.iter().map(shift).sum::<f64>() / n;
            let variance = points.iter().map(|p| (shift(p) - mean).powi(2)).sum::<f64>() / n;
            variance.sqrt()
        })
        .sum::<f64>()
        / 3.0
}
