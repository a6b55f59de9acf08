//! Parallel execution of independent units (groups, tiles, rasters) with per-unit reporting.
//!
//! Every unit runs as a blocking task on the tokio runtime. A failing or panicking unit is
//! recorded in the [`BatchReport`] and never stops its siblings.

use anyhow::{Result, bail};
use futures::{StreamExt, stream};
use std::{fmt, path::PathBuf, sync::Arc};

/// Result of a single unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitOutcome {
	/// An output file was written.
	Written(PathBuf),
	/// Nothing to do, e.g. a group without tiles.
	Skipped(String),
	Failed(String),
}

impl fmt::Display for UnitOutcome {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			UnitOutcome::Written(path) => write!(f, "written to {path:?}"),
			UnitOutcome::Skipped(reason) => write!(f, "skipped: {reason}"),
			UnitOutcome::Failed(reason) => write!(f, "failed: {reason}"),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitReport {
	pub name: String,
	pub outcome: UnitOutcome,
}

/// Outcomes of all units, in the order the units were submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
	pub units: Vec<UnitReport>,
}

impl BatchReport {
	pub fn len(&self) -> usize {
		self.units.len()
	}

	pub fn is_empty(&self) -> bool {
		self.units.is_empty()
	}

	pub fn written(&self) -> Vec<&PathBuf> {
		self
			.units
			.iter()
			.filter_map(|unit| match &unit.outcome {
				UnitOutcome::Written(path) => Some(path),
				_ => None,
			})
			.collect()
	}

	pub fn written_count(&self) -> usize {
		self.count(|outcome| matches!(outcome, UnitOutcome::Written(_)))
	}

	pub fn skipped_count(&self) -> usize {
		self.count(|outcome| matches!(outcome, UnitOutcome::Skipped(_)))
	}

	pub fn failed_count(&self) -> usize {
		self.count(|outcome| matches!(outcome, UnitOutcome::Failed(_)))
	}

	pub fn failures(&self) -> impl Iterator<Item = &UnitReport> {
		self
			.units
			.iter()
			.filter(|unit| matches!(unit.outcome, UnitOutcome::Failed(_)))
	}

	fn count(&self, predicate: impl Fn(&UnitOutcome) -> bool) -> usize {
		self.units.iter().filter(|unit| predicate(&unit.outcome)).count()
	}

	pub fn log_summary(&self, task: &str) {
		log::info!(
			"{task}: {} written, {} skipped, {} failed",
			self.written_count(),
			self.skipped_count(),
			self.failed_count()
		);
	}

	/// Fails if at least one unit failed. The error lists the names of the failed units.
	pub fn ensure_success(&self, task: &str) -> Result<()> {
		let failed: Vec<&str> = self.failures().map(|unit| unit.name.as_str()).collect();
		if !failed.is_empty() {
			bail!(
				"{task}: {} of {} units failed: {}",
				failed.len(),
				self.len(),
				failed.join(", ")
			);
		}
		Ok(())
	}
}

/// Runs `work` for every unit on blocking threads, at most `concurrency` at a time.
///
/// Units are `(name, input)` pairs. The returned report keeps the submission order, regardless
/// of the order in which units finish.
pub async fn run_batch<T, F>(units: Vec<(String, T)>, concurrency: usize, work: F) -> BatchReport
where
	T: Send + 'static,
	F: Fn(T) -> Result<UnitOutcome> + Send + Sync + 'static,
{
	let work = Arc::new(work);

	let mut results: Vec<(usize, UnitReport)> = stream::iter(units.into_iter().enumerate())
		.map(|(index, (name, input))| {
			let work = Arc::clone(&work);
			async move {
				let outcome = match tokio::task::spawn_blocking(move || work(input)).await {
					Ok(Ok(outcome)) => outcome,
					Ok(Err(err)) => UnitOutcome::Failed(format!("{err:#}")),
					Err(err) => UnitOutcome::Failed(format!("task did not complete: {err}")),
				};
				match &outcome {
					UnitOutcome::Written(path) => log::info!("{name}: written {path:?}"),
					UnitOutcome::Skipped(reason) => log::debug!("{name}: skipped, {reason}"),
					UnitOutcome::Failed(reason) => log::warn!("{name}: failed, {reason}"),
				}
				(index, UnitReport { name, outcome })
			}
		})
		.buffer_unordered(concurrency.max(1))
		.collect()
		.await;

	results.sort_by_key(|(index, _)| *index);
	BatchReport {
		units: results.into_iter().map(|(_, report)| report).collect(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use anyhow::anyhow;
	use pretty_assertions::assert_eq;
	use std::{thread::sleep, time::Duration};

	fn units(count: u64) -> Vec<(String, u64)> {
		(0..count).map(|i| (format!("unit {i}"), i)).collect()
	}

	#[tokio::test]
	async fn keeps_submission_order() {
		let report = run_batch(units(8), 4, |i| {
			sleep(Duration::from_millis((8 - i) * 3));
			Ok(UnitOutcome::Written(PathBuf::from(format!("{i}.tif"))))
		})
		.await;

		let names: Vec<&str> = report.units.iter().map(|unit| unit.name.as_str()).collect();
		assert_eq!(names, (0..8).map(|i| format!("unit {i}")).collect::<Vec<_>>());
		assert_eq!(report.written_count(), 8);
		assert_eq!(report.written()[3], &PathBuf::from("3.tif"));
		report.ensure_success("test").unwrap();
	}

	#[tokio::test]
	async fn failures_do_not_stop_siblings() {
		let report = run_batch(units(5), 2, |i| match i {
			1 => Err(anyhow!("broken input")),
			3 => panic!("worker crashed"),
			4 => Ok(UnitOutcome::Skipped(String::from("empty"))),
			_ => Ok(UnitOutcome::Written(PathBuf::from("out.tif"))),
		})
		.await;

		assert_eq!(report.len(), 5);
		assert_eq!(report.written_count(), 2);
		assert_eq!(report.skipped_count(), 1);
		assert_eq!(report.failed_count(), 2);
		assert_eq!(
			report.units[1].outcome,
			UnitOutcome::Failed(String::from("broken input"))
		);
		assert!(matches!(report.units[3].outcome, UnitOutcome::Failed(_)));

		let err = report.ensure_success("demo").unwrap_err().to_string();
		assert_eq!(err, "demo: 2 of 5 units failed: unit 1, unit 3");
	}

	#[tokio::test]
	async fn empty_batch() {
		let report = run_batch(Vec::<(String, u8)>::new(), 0, |_| unreachable!()).await;
		assert!(report.is_empty());
		report.ensure_success("nothing").unwrap();
	}

	#[test]
	fn outcome_display() {
		assert_eq!(UnitOutcome::Skipped(String::from("no tiles")).to_string(), "skipped: no tiles");
		assert_eq!(UnitOutcome::Written(PathBuf::from("a.tif")).to_string(), "written to \"a.tif\"");
	}
}
