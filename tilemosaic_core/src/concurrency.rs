//! Worker limits for the batch tools.
//!
//! Reading and writing rasters spends most of its time waiting on the disk, while compositing and
//! resampling keep a core busy. The batch runner therefore distinguishes two limits:
//!
//! ```
//! use tilemosaic_core::ConcurrencyLimits;
//!
//! let limits = ConcurrencyLimits::default();
//! assert!(limits.io_bound > limits.cpu_bound);
//!
//! let pinned = limits.with_cpu_bound(Some(2));
//! assert_eq!(pinned.cpu_bound, 2);
//! ```

/// Number of units processed at the same time, per workload type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConcurrencyLimits {
	/// Parallel raster reads whose results are consumed in order (e.g. by the full merge).
	pub io_bound: usize,

	/// Parallel units that decode, composite or resample pixels (groups, downsampled tiles).
	pub cpu_bound: usize,
}

impl ConcurrencyLimits {
	/// Creates limits with custom values. Zero is raised to one.
	pub fn new(io_bound: usize, cpu_bound: usize) -> Self {
		Self {
			io_bound: io_bound.max(1),
			cpu_bound: cpu_bound.max(1),
		}
	}

	/// Replaces the CPU-bound limit if `cpu_bound` is set; the I/O limit keeps its ratio to it.
	#[must_use]
	pub fn with_cpu_bound(self, cpu_bound: Option<usize>) -> Self {
		match cpu_bound {
			Some(n) => Self::new(n * 3, n),
			None => self,
		}
	}
}

impl Default for ConcurrencyLimits {
	/// One CPU-bound worker per logical CPU, three times as many concurrent reads.
	fn default() -> Self {
		let cpus = num_cpus::get();
		Self::new(cpus * 3, cpus)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_limits() {
		let limits = ConcurrencyLimits::default();
		let cpus = num_cpus::get();

		assert_eq!(limits.cpu_bound, cpus);
		assert_eq!(limits.io_bound, cpus * 3);
	}

	#[test]
	fn limits_are_at_least_one() {
		assert_eq!(ConcurrencyLimits::new(0, 0), ConcurrencyLimits::new(1, 1));
		assert_eq!(ConcurrencyLimits::default().with_cpu_bound(Some(0)).cpu_bound, 1);
	}

	#[test]
	fn override_cpu_bound() {
		let limits = ConcurrencyLimits::new(12, 4);
		assert_eq!(limits.with_cpu_bound(None), limits);
		assert_eq!(limits.with_cpu_bound(Some(2)), ConcurrencyLimits::new(6, 2));
	}
}
