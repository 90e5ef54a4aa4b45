//! Project configuration detection.
//!
//! Finds `hashonym.json`, or a `package.json` with a `"hashonym"` key, and
//! reads the defaults it provides for the CLI.

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Settings read from a project config file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectConfig {
	/// Output directory, resolved against the config file's directory
	pub output_dir: Option<PathBuf>,
	pub min_hash_len: Option<usize>,
	/// Whether to keep source extensions
	pub ext: Option<bool>,
	/// Path to the config file that was found
	pub config_path: PathBuf,
}

/// Find project config by searching upward from a starting directory.
///
/// Searches for:
/// 1. `hashonym.json` in the directory or any parent
/// 2. `package.json` with a `"hashonym"` key in the directory or any parent
///
/// Returns `Ok(None)` if no config is found, and an error if a config is
/// found but malformed.
pub fn find_project_config(start_dir: &Path) -> Result<Option<ProjectConfig>> {
	for dir in start_dir.ancestors() {
		let config_path = dir.join("hashonym.json");
		if config_path.exists() {
			let json = read_json(&config_path)?;
			return parse_project_config(&json, dir, config_path).map(Some);
		}

		let package_json_path = dir.join("package.json");
		if package_json_path.exists() {
			// Unparseable package.json files belong to someone else; keep looking
			let Ok(content) = fs::read_to_string(&package_json_path) else {
				continue;
			};
			let Ok(json) = serde_json::from_str::<Value>(&content) else {
				continue;
			};
			if let Some(section) = json.get("hashonym") {
				return parse_project_config(section, dir, package_json_path).map(Some);
			}
		}
	}

	Ok(None)
}

fn read_json(path: &Path) -> Result<Value> {
	let content = fs::read_to_string(path)
		.with_context(|| format!("Failed to read {}", path.display()))?;
	serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

fn parse_project_config(json: &Value, dir: &Path, config_path: PathBuf) -> Result<ProjectConfig> {
	if !json.is_object() {
		bail!("Hashonym config in {} must be an object", config_path.display());
	}

	let output_dir = match json.get("outputDir") {
		None | Some(Value::Null) => None,
		Some(Value::String(s)) => Some(dir.join(s)),
		Some(other) => bail!(
			"\"outputDir\" in {} must be a string, got {}",
			config_path.display(),
			other
		),
	};

	let min_hash_len = match json.get("minHashLen") {
		None | Some(Value::Null) => None,
		Some(v) => {
			let n = v.as_u64().ok_or_else(|| {
				anyhow::anyhow!(
					"\"minHashLen\" in {} must be a non-negative integer, got {}",
					config_path.display(),
					v
				)
			})?;
			Some(usize::try_from(n).context("\"minHashLen\" is too large")?)
		}
	};

	let ext = match json.get("ext") {
		None | Some(Value::Null) => None,
		Some(Value::Bool(b)) => Some(*b),
		Some(other) => bail!(
			"\"ext\" in {} must be a boolean, got {}",
			config_path.display(),
			other
		),
	};

	Ok(ProjectConfig {
		output_dir,
		min_hash_len,
		ext,
		config_path,
	})
}
