use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Progress counters shared across worker partitions. Monotonic; correctness
/// of the batch never depends on their exact values, only the catalog does.
#[derive(Debug, Default)]
pub struct Counters {
	remains: AtomicU64,
	finished: AtomicU64,
}

impl Counters {
	pub fn new(remains: u64) -> Arc<Self> {
		Arc::new(Self {
			remains: AtomicU64::new(remains),
			finished: AtomicU64::new(0),
		})
	}

	pub fn add_remains(&self, n: u64) {
		self.remains.fetch_add(n, Ordering::Relaxed);
	}

	pub fn mark_finished(&self, n: u64) {
		self.finished.fetch_add(n, Ordering::Relaxed);
		self.remains.fetch_sub(n, Ordering::Relaxed);
	}

	pub fn remains(&self) -> u64 {
		self.remains.load(Ordering::Relaxed)
	}

	pub fn finished(&self) -> u64 {
		self.finished.load(Ordering::Relaxed)
	}
}
