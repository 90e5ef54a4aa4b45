//! Expansion of command-line paths into an ordered list of input files.

use anyhow::{bail, Context, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Expand files and directories into the files to register.
///
/// Directories are walked recursively in file-name order. Anything under
/// `exclude` (normally the output directory) is skipped so previous outputs
/// are never hashed again, and excluded directories are not descended into.
/// Duplicates are detected on the canonical path and keep their first
/// position and spelling.
pub fn collect_files(paths: &[PathBuf], exclude: Option<&Path>) -> Result<Vec<PathBuf>> {
	let exclude = exclude.map(normalize);
	let is_excluded =
		|p: &Path| exclude.as_ref().map(|ex| normalize(p).starts_with(ex)).unwrap_or(false);

	let mut seen = HashSet::new();
	let mut files = Vec::new();

	for path in paths {
		if !path.exists() {
			bail!("Input path does not exist: {}", path.display());
		}

		if path.is_file() {
			if seen.insert(normalize(path)) {
				files.push(path.clone());
			}
			continue;
		}

		let walker = WalkDir::new(path)
			.sort_by_file_name()
			.into_iter()
			.filter_entry(|e| !is_excluded(e.path()));
		for entry in walker {
			let entry = entry.with_context(|| format!("Failed to walk {}", path.display()))?;
			if !entry.file_type().is_file() {
				continue;
			}
			let file = entry.into_path();
			if seen.insert(normalize(&file)) {
				files.push(file);
			}
		}
	}

	Ok(files)
}

/// Absolute form of `path` when it exists, for prefix comparisons.
fn normalize(path: &Path) -> PathBuf {
	path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fs;
	use tempfile::tempdir;

	#[test]
	fn test_collect_files_walks_directories_in_order() {
		let temp = tempdir().unwrap();
		let root = temp.path();
		fs::create_dir_all(root.join("assets/img")).unwrap();
		fs::write(root.join("assets/b.css"), "b").unwrap();
		fs::write(root.join("assets/a.js"), "a").unwrap();
		fs::write(root.join("assets/img/logo.png"), "png").unwrap();

		let files = collect_files(&[root.join("assets")], None).unwrap();
		assert_eq!(
			files,
			vec![
				root.join("assets/a.js"),
				root.join("assets/b.css"),
				root.join("assets/img/logo.png"),
			]
		);
	}

	#[test]
	fn test_collect_files_skips_output_dir_and_duplicates() {
		let temp = tempdir().unwrap();
		let root = temp.path();
		fs::create_dir_all(root.join("out")).unwrap();
		fs::write(root.join("a.js"), "a").unwrap();
		fs::write(root.join("out/0cc"), "a").unwrap();

		let files = collect_files(
			&[root.join("a.js"), root.to_path_buf()],
			Some(&root.join("out")),
		)
		.unwrap();
		assert_eq!(files, vec![root.join("a.js")]);
	}

	#[test]
	fn test_collect_files_dedupes_differently_spelled_paths() {
		let temp = tempdir().unwrap();
		let root = temp.path();
		fs::create_dir_all(root.join("sub")).unwrap();
		fs::write(root.join("a.txt"), "a").unwrap();

		let files = collect_files(
			&[root.join("sub/../a.txt"), root.to_path_buf(), root.join("a.txt")],
			None,
		)
		.unwrap();
		assert_eq!(files, vec![root.join("sub/../a.txt")]);
	}

	#[test]
	fn test_collect_files_excluded_dir_inside_walked_root() {
		let temp = tempdir().unwrap();
		let root = temp.path();
		fs::create_dir_all(root.join("out/nested")).unwrap();
		fs::write(root.join("out/nested/0cc"), "a").unwrap();
		fs::write(root.join("b.js"), "b").unwrap();

		let files = collect_files(&[root.to_path_buf()], Some(&root.join("out"))).unwrap();
		assert_eq!(files, vec![root.join("b.js")]);

		// Passing the output directory itself yields nothing
		let files = collect_files(&[root.join("out")], Some(&root.join("out"))).unwrap();
		assert!(files.is_empty());
	}

	#[test]
	fn test_collect_files_missing_path() {
		let temp = tempdir().unwrap();
		assert!(collect_files(&[temp.path().join("missing")], None).is_err());
	}
}
