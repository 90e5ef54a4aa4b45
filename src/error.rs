//! Error types surfaced by `Hashonym::resolve`.

use std::io;
use std::path::PathBuf;

/// Errors that abort a resolve pass.
///
/// The engine stays dirty after any of these, so calling `resolve` again
/// retries the whole pass. Files already copied before a failure are left
/// in place.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// A registered file could not be read or hashed.
	#[error("failed to hash {path}: {source}")]
	Hash { path: PathBuf, source: io::Error },

	/// The output directory could not be created.
	#[error("failed to create output directory {path}: {source}")]
	Directory { path: PathBuf, source: io::Error },

	/// A source file could not be copied to its destination.
	#[error("failed to copy {src} to {dest}: {source}")]
	Copy {
		src: PathBuf,
		dest: PathBuf,
		source: io::Error,
	},
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_hash_error_display() {
		let err = Error::Hash {
			path: PathBuf::from("assets/logo.png"),
			source: io::Error::new(io::ErrorKind::NotFound, "file not found"),
		};
		let msg = err.to_string();
		assert!(msg.contains("failed to hash"));
		assert!(msg.contains("logo.png"));
		assert!(msg.contains("file not found"));
	}

	#[test]
	fn test_copy_error_names_both_paths() {
		let err = Error::Copy {
			src: PathBuf::from("in/app.js"),
			dest: PathBuf::from("out/a1b.js"),
			source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
		};
		let msg = err.to_string();
		assert!(msg.contains("app.js"));
		assert!(msg.contains("a1b.js"));
	}
}
