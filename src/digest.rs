//! Full-content digests for registered files.
//!
//! Digests are computed lazily and never recomputed for a path that has
//! already been hashed: a path's content is assumed stable for the lifetime
//! of the engine.

use rayon::prelude::*;
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::Error;

/// Capability that turns a file into a fixed-length digest string.
pub trait FileHasher: Sync {
	fn hash_file(&self, path: &Path) -> io::Result<String>;
}

/// Lowercase hex MD5 of the file's bytes (32 chars).
#[derive(Debug, Default, Clone, Copy)]
pub struct Md5Hasher;

impl FileHasher for Md5Hasher {
	fn hash_file(&self, path: &Path) -> io::Result<String> {
		use md5::{Digest, Md5};
		let mut file = File::open(path)?;
		let mut hasher = Md5::new();
		let mut buf = [0u8; 64 * 1024];
		loop {
			let n = file.read(&mut buf)?;
			if n == 0 {
				break;
			}
			hasher.update(&buf[..n]);
		}
		Ok(format!("{:x}", hasher.finalize()))
	}
}

/// Map from file path to its full digest.
#[derive(Debug, Default)]
pub struct DigestCache {
	digests: HashMap<PathBuf, String>,
}

impl DigestCache {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get(&self, path: &Path) -> Option<&str> {
		self.digests.get(path).map(String::as_str)
	}

	pub fn contains(&self, path: &Path) -> bool {
		self.digests.contains_key(path)
	}

	pub fn len(&self) -> usize {
		self.digests.len()
	}

	pub fn is_empty(&self) -> bool {
		self.digests.is_empty()
	}

	/// Hash every file in `files` that has no cached digest yet.
	///
	/// Returns the number of files hashed by this call. On failure the
	/// digests computed so far stay cached and the first failing file (in
	/// `files` order) is reported.
	pub fn ensure<H: FileHasher + ?Sized>(
		&mut self,
		files: &[PathBuf],
		hasher: &H,
		parallel: bool,
	) -> Result<usize, Error> {
		debug!("generating full hashes for each file");

		if parallel {
			return self.ensure_parallel(files, hasher);
		}

		let mut hashed = 0;
		for path in files {
			if self.contains(path) {
				continue;
			}
			let digest = hash_one(hasher, path)?;
			self.digests.insert(path.clone(), digest);
			hashed += 1;
		}
		Ok(hashed)
	}

	fn ensure_parallel<H: FileHasher + ?Sized>(
		&mut self,
		files: &[PathBuf],
		hasher: &H,
	) -> Result<usize, Error> {
		let missing: Vec<&PathBuf> = files.iter().filter(|p| !self.contains(p)).collect();

		// Parallel: hash, then join before touching the cache
		let results: Vec<_> = missing
			.par_iter()
			.map(|path| (*path, hash_one(hasher, path)))
			.collect();

		let mut hashed = 0;
		let mut first_err = None;
		for (path, result) in results {
			match result {
				Ok(digest) => {
					self.digests.insert(path.clone(), digest);
					hashed += 1;
				}
				Err(e) => {
					if first_err.is_none() {
						first_err = Some(e);
					}
				}
			}
		}

		match first_err {
			Some(e) => Err(e),
			None => Ok(hashed),
		}
	}
}

fn hash_one<H: FileHasher + ?Sized>(hasher: &H, path: &Path) -> Result<String, Error> {
	debug!("hashing {}", path.display());
	hasher.hash_file(path).map_err(|source| Error::Hash {
		path: path.to_path_buf(),
		source,
	})
}
