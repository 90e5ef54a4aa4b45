//! Hash-length resolution and destination naming.
//!
//! Destination names are `<output_dir>/<prefix>[.ext]` where `prefix` is the
//! shortest leading slice of each digest that keeps files with different
//! content apart. Files with identical content are allowed to share a name.

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// First `len` characters of `digest`, or the whole digest if it is shorter.
pub fn truncate(digest: &str, len: usize) -> &str {
	match digest.char_indices().nth(len) {
		Some((idx, _)) => &digest[..idx],
		None => digest,
	}
}

/// Check whether `len` separates every pair of differing digests.
///
/// Groups digests by their truncated prefix and compares each against the
/// first full digest seen for that prefix. A length of zero is never valid.
pub fn is_valid_hash_len<'a, I>(digests: I, len: usize) -> bool
where
	I: IntoIterator<Item = &'a str>,
{
	if len == 0 {
		return false;
	}

	let mut seen: HashMap<&str, &str> = HashMap::new();
	for full in digests {
		let short = truncate(full, len);
		match seen.get(short) {
			Some(&first) if first != full => {
				debug!("[hash length {}] hash collision detected", len);
				return false;
			}
			Some(_) => {}
			None => {
				seen.insert(short, full);
			}
		}
	}

	debug!("[hash length {}] is a valid hash length", len);
	true
}

/// Smallest length `>= 1` at which no two differing digests collide.
///
/// Always terminates: at the longest digest length every prefix is the
/// full digest, which is trivially valid.
pub fn find_min_hash_len(digests: &[&str]) -> usize {
	let max_len = digests.iter().map(|d| d.chars().count()).max().unwrap_or(0);

	let mut len = 1;
	while len < max_len && !is_valid_hash_len(digests.iter().copied(), len) {
		len += 1;
	}

	debug!("minimum possible hash length is {}", len);
	len
}

/// Minimal collision-free length, clamped up to `floor`.
///
/// The floor itself is not re-verified; any length at or above the minimal
/// valid one is also valid, so clamping up never introduces a collision.
pub fn resolve_hash_len(digests: &[&str], floor: usize) -> usize {
	let mut len = find_min_hash_len(digests);

	if len < floor {
		debug!("using the minimum configured hash length of {} instead", floor);
		len = floor;
	}

	debug!("using {} as the minimum calculated hash length", len);
	len
}

/// Mapping from source file to destination path, in registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DestinationMap {
	hash_len: usize,
	entries: Vec<(PathBuf, PathBuf)>,
}

impl DestinationMap {
	/// Prefix length the destinations were built with.
	pub fn hash_len(&self) -> usize {
		self.hash_len
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn get(&self, src: &Path) -> Option<&Path> {
		self.entries
			.iter()
			.find(|(s, _)| s == src)
			.map(|(_, d)| d.as_path())
	}

	pub fn iter(&self) -> impl Iterator<Item = (&Path, &Path)> {
		self.entries.iter().map(|(s, d)| (s.as_path(), d.as_path()))
	}

	/// Number of distinct destination paths.
	pub fn unique_destinations(&self) -> usize {
		let mut dests: Vec<&Path> = self.entries.iter().map(|(_, d)| d.as_path()).collect();
		dests.sort();
		dests.dedup();
		dests.len()
	}

	/// `{ "<source>": "<destination>" }`
	pub fn to_json(&self) -> Value {
		let map: Map<String, Value> = self
			.entries
			.iter()
			.map(|(s, d)| {
				(
					s.to_string_lossy().into_owned(),
					Value::String(d.to_string_lossy().into_owned()),
				)
			})
			.collect();
		Value::Object(map)
	}
}

/// Build the destination for each `(source, digest)` pair.
pub fn build_destination_map<'a, I>(
	files: I,
	hash_len: usize,
	output_dir: &Path,
	preserve_ext: bool,
) -> DestinationMap
where
	I: IntoIterator<Item = (&'a Path, &'a str)>,
{
	let entries = files
		.into_iter()
		.map(|(src, digest)| {
			let mut name = truncate(digest, hash_len).to_string();
			if preserve_ext {
				if let Some(ext) = src.extension() {
					name.push('.');
					name.push_str(&ext.to_string_lossy());
				}
			}
			(src.to_path_buf(), output_dir.join(name))
		})
		.collect();

	debug!("generated hash-based file names for each file");
	DestinationMap { hash_len, entries }
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_truncate() {
		assert_eq!(truncate("abcdef", 3), "abc");
		assert_eq!(truncate("abc", 10), "abc");
		assert_eq!(truncate("abc", 0), "");
	}

	#[test]
	fn test_zero_length_is_invalid() {
		assert!(!is_valid_hash_len(["abc"], 0));
		assert!(!is_valid_hash_len(Vec::<&str>::new(), 0));
	}

	#[test]
	fn test_identical_digests_may_share_prefix() {
		assert!(is_valid_hash_len(["abcd", "abcd"], 1));
	}

	#[test]
	fn test_collision_detected() {
		assert!(!is_valid_hash_len(["abcd", "abef"], 2));
		assert!(is_valid_hash_len(["abcd", "abef"], 3));
	}

	#[test]
	fn test_find_min_hash_len_extends_on_shared_prefix() {
		// Shares 3 chars, diverges at the 4th
		assert_eq!(find_min_hash_len(&["abc1234", "abc5678"]), 4);
	}

	#[test]
	fn test_find_min_hash_len_multiple_collisions() {
		let digests = ["abc12345", "abcd1234", "abcde123", "abcdf789"];
		assert_eq!(find_min_hash_len(&digests), 5);
	}

	#[test]
	fn test_find_min_hash_len_edge_sets() {
		assert_eq!(find_min_hash_len(&[]), 1);
		assert_eq!(find_min_hash_len(&["abcd"]), 1);
		assert_eq!(find_min_hash_len(&["abcd", "abcd", "abcd"]), 1);
	}

	#[test]
	fn test_find_min_hash_len_terminates_on_prefix_digests() {
		// One digest is a prefix of another: only the full length separates them
		assert_eq!(find_min_hash_len(&["abc", "abcd"]), 4);
	}

	#[test]
	fn test_resolve_hash_len_clamps_to_floor() {
		assert_eq!(resolve_hash_len(&["a000", "b000"], 0), 1);
		assert_eq!(resolve_hash_len(&["a000", "b000"], 8), 8);
		assert_eq!(resolve_hash_len(&["aa00", "ab00"], 1), 2);
		assert_eq!(resolve_hash_len(&[], 3), 3);
	}

	#[test]
	fn test_build_destination_map() {
		let map = build_destination_map(
			[
				(Path::new("src/app.js"), "abc123"),
				(Path::new("src/style.css"), "def456"),
			],
			2,
			Path::new("out"),
			false,
		);

		assert_eq!(map.hash_len(), 2);
		assert_eq!(map.get(Path::new("src/app.js")), Some(Path::new("out/ab")));
		assert_eq!(map.get(Path::new("src/style.css")), Some(Path::new("out/de")));
	}

	#[test]
	fn test_build_destination_map_preserves_extension() {
		let map = build_destination_map(
			[
				(Path::new("src/app.min.js"), "abc123"),
				(Path::new("LICENSE"), "def456"),
			],
			3,
			Path::new("out/"),
			true,
		);

		assert_eq!(map.get(Path::new("src/app.min.js")), Some(Path::new("out/abc.js")));
		assert_eq!(map.get(Path::new("LICENSE")), Some(Path::new("out/def")));
	}

	#[test]
	fn test_destination_map_json_and_uniques() {
		let map = build_destination_map(
			[
				(Path::new("a.txt"), "ab"),
				(Path::new("b.txt"), "ab"),
				(Path::new("c.txt"), "cd"),
			],
			1,
			Path::new("out"),
			false,
		);

		assert_eq!(map.unique_destinations(), 2);
		let json = map.to_json();
		assert_eq!(json["a.txt"], Value::String("out/a".to_string()));
		assert_eq!(json["b.txt"], json["a.txt"]);
	}
}
