//! Content-addressed file naming.
//!
//! Copies a set of input files into an output directory under names taken
//! from their content hash, using the shortest hash prefix that never gives
//! two files with different content the same name.

pub mod digest;
pub mod error;
pub mod inputs;
pub mod naming;
pub mod project_config;
pub mod writer;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::debug;

pub use digest::{DigestCache, FileHasher, Md5Hasher};
pub use error::Error;
pub use naming::DestinationMap;
pub use writer::{LocalStore, OutputStore, WriteStats};

/// Configuration for the naming engine
#[derive(Debug, Clone, Default)]
pub struct Config {
	/// Directory the hashed files are written to
	pub output_dir: PathBuf,
	/// Lower bound for the hash prefix length
	pub min_hash_len: usize,
	/// Whether to append the source extension to destination names
	pub preserve_ext: bool,
	/// Whether to hash uncached files on the rayon pool
	pub parallel: bool,
}

impl Config {
	pub fn new(output_dir: impl Into<PathBuf>) -> Self {
		Self {
			output_dir: output_dir.into(),
			..Self::default()
		}
	}
}

/// Whether the cached destination map can be returned as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
	Dirty,
	Clean,
}

/// Timing stats for profiling
#[derive(Debug, Default)]
pub struct TimingStats {
	pub hash: Duration,
	pub resolve: Duration,
	pub write: Duration,
}

/// Result of a successful `resolve` call.
#[derive(Debug)]
pub struct Resolution<'a> {
	pub map: &'a DestinationMap,
	/// Present only when files were materialized during this call
	pub written: Option<WriteStats>,
}

/// Main naming engine
pub struct Hashonym<H = Md5Hasher, S = LocalStore> {
	config: Config,
	/// Registered files, in registration order
	files: Vec<PathBuf>,
	registered: HashSet<PathBuf>,
	digests: DigestCache,
	destinations: DestinationMap,
	state: EngineState,
	hasher: H,
	store: S,
	/// Timing stats
	pub timing: TimingStats,
}

impl Hashonym {
	pub fn new(config: Config) -> Self {
		Self::with_backends(config, Md5Hasher, LocalStore)
	}
}

impl<H: FileHasher, S: OutputStore> Hashonym<H, S> {
	pub fn with_backends(config: Config, hasher: H, store: S) -> Self {
		Self {
			config,
			files: Vec::new(),
			registered: HashSet::new(),
			digests: DigestCache::new(),
			destinations: DestinationMap::default(),
			state: EngineState::Dirty,
			hasher,
			store,
			timing: TimingStats::default(),
		}
	}

	pub fn config(&self) -> &Config {
		&self.config
	}

	pub fn state(&self) -> EngineState {
		self.state
	}

	pub fn is_dirty(&self) -> bool {
		self.state == EngineState::Dirty
	}

	pub fn files(&self) -> &[PathBuf] {
		&self.files
	}

	/// Cached digest for `path`, if it has been hashed.
	pub fn digest(&self, path: &Path) -> Option<&str> {
		self.digests.get(path)
	}

	/// Register a single file. See [`Hashonym::register`].
	pub fn add(&mut self, file: impl Into<PathBuf>) -> usize {
		self.register([file])
	}

	/// Register files, returning how many were new.
	///
	/// Always marks the engine dirty: any new file may collide at the
	/// previously chosen prefix length.
	pub fn register<I, P>(&mut self, files: I) -> usize
	where
		I: IntoIterator<Item = P>,
		P: Into<PathBuf>,
	{
		self.state = EngineState::Dirty;

		let mut added = 0;
		for file in files {
			let file = file.into();
			if self.registered.insert(file.clone()) {
				self.files.push(file);
				added += 1;
			}
		}
		added
	}

	/// Return the destination map, recomputing it if dirty.
	///
	/// When dirty and not `dry_run`, the files are also materialized. The
	/// engine only becomes clean once the whole pass has succeeded; on error
	/// it stays dirty and no new map is published.
	pub fn resolve(&mut self, dry_run: bool) -> Result<Resolution<'_>, Error> {
		if self.state == EngineState::Clean {
			debug!("returning the cached hash directory mapping");
			return Ok(Resolution {
				map: &self.destinations,
				written: None,
			});
		}

		let t = Instant::now();
		let hashed = self
			.digests
			.ensure(&self.files, &self.hasher, self.config.parallel);
		self.timing.hash += t.elapsed();
		hashed?;

		let t = Instant::now();
		let map = self.build_map();
		self.timing.resolve += t.elapsed();
		debug!("finished generating the hash directory mapping");

		let written = if dry_run {
			debug!("DRY RUN: returning the hash directory mapping without writing");
			None
		} else {
			let t = Instant::now();
			let stats = writer::materialize(&map, &self.config.output_dir, &self.store);
			self.timing.write += t.elapsed();
			Some(stats?)
		};

		self.destinations = map;
		self.state = EngineState::Clean;

		Ok(Resolution {
			map: &self.destinations,
			written,
		})
	}

	fn build_map(&self) -> DestinationMap {
		// Every registered file has a digest once `ensure` succeeded
		let entries: Vec<(&Path, &str)> = self
			.files
			.iter()
			.filter_map(|f| self.digests.get(f).map(|d| (f.as_path(), d)))
			.collect();
		let digests: Vec<&str> = entries.iter().map(|(_, d)| *d).collect();

		let hash_len = naming::resolve_hash_len(&digests, self.config.min_hash_len);
		naming::build_destination_map(
			entries,
			hash_len,
			&self.config.output_dir,
			self.config.preserve_ext,
		)
	}
}

/// Format bytes as human-readable string
pub fn format_bytes(bytes: u64) -> String {
	if bytes >= 1024 * 1024 {
		format!("{:.2} MB", bytes as f64 / 1024.0 / 1024.0)
	} else {
		format!("{} KB", (bytes as f64 / 1024.0).round() as u64)
	}
}
