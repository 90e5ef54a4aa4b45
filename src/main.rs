//! Hashonym CLI
//!
//! Copies files into an output directory under the shortest content-hash
//! names that keep distinct contents apart.

use anyhow::{bail, Result};
use clap::Parser;
use hashonym::inputs::collect_files;
use hashonym::project_config::find_project_config;
use hashonym::{format_bytes, Config, Hashonym};
use std::env;
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "hashonym")]
#[command(author = "Fellow <engineering@fellow.app>")]
#[command(version)]
#[command(about = "Copy files to short content-hash names", long_about = None)]
struct Args {
	/// Files or directories to hash (directories are walked recursively)
	#[arg(value_name = "PATHS", required = true)]
	paths: Vec<PathBuf>,

	/// Directory to write hashed files to (optional if project config has outputDir)
	#[arg(short, long, value_name = "DIR")]
	output_dir: Option<PathBuf>,

	/// Minimum number of hash characters in generated names
	#[arg(long, value_name = "N")]
	min_hash_len: Option<usize>,

	/// Keep the source file extension on generated names
	#[arg(long)]
	ext: bool,

	/// Show the mapping without writing files
	#[arg(short = 'n', long)]
	dry_run: bool,

	/// Print the mapping as JSON instead of a summary
	#[arg(long)]
	json: bool,

	/// Hash files in parallel
	#[arg(long)]
	parallel: bool,

	/// Print debug logging
	#[arg(short, long)]
	verbose: bool,

	/// Show timing breakdown
	#[arg(long)]
	show_timing: bool,

	/// Skip hashonym.json / package.json discovery
	#[arg(long)]
	no_config: bool,
}

fn main() -> Result<()> {
	let args = Args::parse();

	let level = if args.verbose { "debug" } else { "warn" };
	let filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(format!("hashonym={}", level)));
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.init();

	// Find project config
	let project_config = if args.no_config {
		None
	} else {
		find_project_config(&env::current_dir()?)?
	};

	// CLI flags take precedence over the project config
	let output_dir = if let Some(dir) = args.output_dir.clone() {
		dir
	} else if let Some(ref config) = project_config {
		config.output_dir.clone().ok_or_else(|| {
			anyhow::anyhow!(
				"No --output-dir specified and project config ({}) has no outputDir.\n\
				 Either specify a directory: hashonym -o ./dist/hashed <PATHS>\n\
				 Or add outputDir to your project config.",
				config.config_path.display()
			)
		})?
	} else {
		bail!(
			"No --output-dir specified and no project config found.\n\
			 Usage: hashonym -o <DIR> <PATHS>...\n\
			 Example: hashonym -o ./dist/hashed ./src/assets"
		);
	};

	let min_hash_len = args
		.min_hash_len
		.or_else(|| project_config.as_ref().and_then(|c| c.min_hash_len))
		.unwrap_or(0);
	let preserve_ext = args.ext
		|| project_config
			.as_ref()
			.and_then(|c| c.ext)
			.unwrap_or(false);

	let files = collect_files(&args.paths, Some(&output_dir))?;

	let config = Config {
		output_dir,
		min_hash_len,
		preserve_ext,
		parallel: args.parallel,
	};

	let start_time = Instant::now();
	let mut engine = Hashonym::new(config);
	engine.register(files);
	let resolution = engine.resolve(args.dry_run)?;
	let total_time = start_time.elapsed();

	let map = resolution.map;
	let time_str = format!("{:.2}s", total_time.as_secs_f64());

	if args.json {
		println!("{}", serde_json::to_string_pretty(&map.to_json())?);
	} else if let Some(stats) = resolution.written {
		println!(
			"Hashed {} files into {} names ({}-char hashes), wrote {} ({}), reused {} in {}",
			map.len(),
			map.unique_destinations(),
			map.hash_len(),
			stats.written,
			format_bytes(stats.bytes_written),
			stats.skipped,
			time_str
		);
	} else {
		for (src, dest) in map.iter() {
			println!("{} -> {}", src.display(), dest.display());
		}
		println!(
			"Dry run: {} files would map to {} names ({}-char hashes)",
			map.len(),
			map.unique_destinations(),
			map.hash_len()
		);
	}

	// Print timing breakdown if requested
	if args.show_timing {
		let t = &engine.timing;
		eprintln!("\n=== Timing breakdown ===");
		eprintln!("  hash:    {:>7.1}ms", t.hash.as_secs_f64() * 1000.0);
		eprintln!("  resolve: {:>7.1}ms", t.resolve.as_secs_f64() * 1000.0);
		eprintln!("  write:   {:>7.1}ms", t.write.as_secs_f64() * 1000.0);
		eprintln!("  --- total: {}", time_str);
	}

	Ok(())
}
