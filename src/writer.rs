//! Materialization of a destination map onto storage.
//!
//! Destinations that already exist are trusted as-is and never rewritten.

use std::fs;
use std::io;
use std::path::Path;
use tracing::debug;

use crate::error::Error;
use crate::naming::DestinationMap;

/// Storage capabilities used by the materializer.
pub trait OutputStore {
	/// Create `dir` and any missing parents. Must be idempotent.
	fn ensure_dir(&self, dir: &Path) -> io::Result<()>;

	fn exists(&self, path: &Path) -> bool;

	/// Copy the full contents of `src` to `dest`, returning bytes copied.
	fn copy(&self, src: &Path, dest: &Path) -> io::Result<u64>;
}

/// The local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStore;

impl OutputStore for LocalStore {
	fn ensure_dir(&self, dir: &Path) -> io::Result<()> {
		fs::create_dir_all(dir)
	}

	fn exists(&self, path: &Path) -> bool {
		path.exists()
	}

	fn copy(&self, src: &Path, dest: &Path) -> io::Result<u64> {
		fs::copy(src, dest)
	}
}

/// Outcome of one materialization run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WriteStats {
	/// Destinations created by this run
	pub written: usize,
	/// Destinations that already existed
	pub skipped: usize,
	pub bytes_written: u64,
}

impl WriteStats {
	pub fn total(&self) -> usize {
		self.written + self.skipped
	}
}

/// Copy every source to its destination unless the destination exists.
///
/// Entries are processed in map order. The first copy failure aborts the
/// run; files written before it are kept.
pub fn materialize<S: OutputStore + ?Sized>(
	map: &DestinationMap,
	output_dir: &Path,
	store: &S,
) -> Result<WriteStats, Error> {
	debug!("writing all the hash files");

	store
		.ensure_dir(output_dir)
		.map_err(|source| Error::Directory {
			path: output_dir.to_path_buf(),
			source,
		})?;

	let mut stats = WriteStats::default();
	for (src, dest) in map.iter() {
		if store.exists(dest) {
			debug!("{} found, moving on without copying", dest.display());
			stats.skipped += 1;
			continue;
		}

		debug!("copying the contents of {} out to {}", src.display(), dest.display());
		let bytes = store.copy(src, dest).map_err(|source| Error::Copy {
			src: src.to_path_buf(),
			dest: dest.to_path_buf(),
			source,
		})?;
		stats.written += 1;
		stats.bytes_written += bytes;
	}

	debug!("started with {} source files", map.len());
	debug!("found {} existing hash files", stats.skipped);
	debug!("ended with {} generated hash files", stats.written);
	Ok(stats)
}
