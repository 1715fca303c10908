// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! prodmap CLI - rewrite production source maps
//!
//! Replaces minified third-party library builds found in a bundle's source
//! maps with the unminified reference maps of those exact builds.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use prodmap_cli_config::{
	load_config_with_cli,
	runtime::{LogFormat, LogLevel},
	sources::CliOverrides,
	ProdmapConfig,
};
use prodmap_core::{Fingerprint, VersionRegistry};
use prodmap_remap::{FsReferenceStore, RemapOptions, Remapper};

mod rewrite;

use rewrite::{rewrite_assets, RewriteOptions};

/// prodmap - production source map remapper
#[derive(Parser, Debug)]
#[command(name = "prodmap", version, about, long_about = None)]
struct Args {
	/// Path to custom configuration file
	#[arg(short, long, global = true)]
	config: Option<PathBuf>,

	/// Log level (overrides config)
	#[arg(short, long, global = true)]
	log_level: Option<String>,

	/// Output logs as JSON (overrides config)
	#[arg(long, global = true)]
	json_logs: bool,

	/// Directory holding the packaged reference maps
	#[arg(long, global = true)]
	assets_dir: Option<PathBuf>,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Rewrite the source maps among a build's emitted assets
	Rewrite {
		/// Emitted asset paths; anything not ending in .map is ignored
		assets: Vec<PathBuf>,

		/// Write <name>.remapped.map instead of overwriting
		#[arg(long)]
		preserve: bool,

		/// Fail if no source map was rewritten
		#[arg(long)]
		strict: bool,

		/// Fail on recognized library files that cannot be identified
		#[arg(long)]
		error_on_missing_versions: bool,

		/// Log each identification decision
		#[arg(short, long)]
		verbose: bool,
	},

	/// Remap a single source map
	Remap {
		input: PathBuf,

		/// Output file (defaults to stdout)
		#[arg(short, long)]
		output: Option<PathBuf>,

		#[arg(long)]
		error_on_missing_versions: bool,

		#[arg(short, long)]
		verbose: bool,
	},

	/// List the known library builds
	Versions {
		#[arg(long)]
		json: bool,
	},

	/// Print the fingerprint of a minified file and the build it matches
	Fingerprint { file: PathBuf },
}

impl From<&Args> for CliOverrides {
	fn from(args: &Args) -> Self {
		let mut overrides = CliOverrides {
			assets_dir: args.assets_dir.clone(),
			log_level: args.log_level.clone(),
			log_format: args.json_logs.then(|| "json".to_string()),
			config_file: args.config.clone(),
			..Default::default()
		};

		let flag = |set: bool| set.then_some(true);
		match &args.command {
			Command::Rewrite {
				preserve,
				strict,
				error_on_missing_versions,
				verbose,
				..
			} => {
				overrides.preserve = flag(*preserve);
				overrides.strict = flag(*strict);
				overrides.error_on_missing_versions = flag(*error_on_missing_versions);
				overrides.verbose = flag(*verbose);
			}
			Command::Remap {
				error_on_missing_versions,
				verbose,
				..
			} => {
				overrides.error_on_missing_versions = flag(*error_on_missing_versions);
				overrides.verbose = flag(*verbose);
			}
			Command::Versions { .. } | Command::Fingerprint { .. } => {}
		}

		overrides
	}
}

fn log_level_to_tracing(level: LogLevel) -> tracing::Level {
	match level {
		LogLevel::Trace => tracing::Level::TRACE,
		LogLevel::Debug => tracing::Level::DEBUG,
		LogLevel::Info => tracing::Level::INFO,
		LogLevel::Warn => tracing::Level::WARN,
		LogLevel::Error => tracing::Level::ERROR,
	}
}

/// Logs go to stderr; stdout carries command output.
fn init_tracing(logging: &prodmap_cli_config::runtime::LoggingConfig, verbose: bool) {
	let level = if verbose && logging.level == LogLevel::Warn {
		LogLevel::Info
	} else {
		logging.level
	};
	let filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(format!("prodmap={}", log_level_to_tracing(level))));

	match logging.format {
		LogFormat::Json => {
			tracing_subscriber::registry()
				.with(filter)
				.with(fmt::layer().json().with_writer(io::stderr))
				.init();
		}
		LogFormat::Compact => {
			tracing_subscriber::registry()
				.with(filter)
				.with(fmt::layer().compact().with_writer(io::stderr))
				.init();
		}
		LogFormat::Pretty => {
			tracing_subscriber::registry()
				.with(filter)
				.with(fmt::layer().with_writer(io::stderr))
				.init();
		}
	}
}

fn build_remapper(config: &ProdmapConfig) -> Remapper<FsReferenceStore> {
	Remapper::new(
		VersionRegistry::builtin(),
		FsReferenceStore::new(&config.assets_dir),
	)
	.with_options(RemapOptions {
		verbose: config.remap.verbose,
		error_on_missing_versions: config.remap.error_on_missing_versions,
		max_depth: config.remap.max_depth,
	})
}

fn main() -> Result<()> {
	let args = Args::parse();

	let config = load_config_with_cli(CliOverrides::from(&args))
		.context("failed to load configuration")?;

	init_tracing(&config.logging, config.remap.verbose);

	match &args.command {
		Command::Rewrite { assets, .. } => {
			let remapper = build_remapper(&config);
			let options = RewriteOptions {
				preserve: config.remap.preserve,
				strict: config.remap.strict,
			};
			let stats = rewrite_assets(&remapper, assets, options)?;
			println!(
				"found {} source maps, remapped {}, skipped {}",
				stats.found, stats.remapped, stats.skipped
			);
			Ok(())
		}
		Command::Remap { input, output, .. } => run_remap(&config, input, output.as_deref()),
		Command::Versions { json } => run_versions(*json),
		Command::Fingerprint { file } => run_fingerprint(file),
	}
}

fn run_remap(config: &ProdmapConfig, input: &Path, output: Option<&Path>) -> Result<()> {
	let data =
		std::fs::read(input).with_context(|| format!("failed to read {}", input.display()))?;

	let result = build_remapper(config)
		.remap_slice(&data)
		.with_context(|| format!("failed to remap {}", input.display()))?;

	for diagnostic in &result.diagnostics {
		warn!(
			source = %diagnostic.source,
			depth = diagnostic.depth,
			error = %diagnostic.error,
			"source left unchanged"
		);
	}
	for record in &result.matched_records {
		info!(version = %record.label(), "substituted reference map");
	}

	let bytes = result
		.output_map
		.to_vec_pretty()
		.context("failed to serialize source map")?;

	match output {
		Some(path) => std::fs::write(path, bytes)
			.with_context(|| format!("failed to write {}", path.display()))?,
		None => {
			let mut stdout = io::stdout().lock();
			stdout.write_all(&bytes)?;
			stdout.write_all(b"\n")?;
		}
	}

	Ok(())
}

fn run_versions(json: bool) -> Result<()> {
	let registry = VersionRegistry::builtin();

	if json {
		let out = serde_json::to_string_pretty(registry.records())?;
		println!("{out}");
		return Ok(());
	}

	for record in registry.records() {
		println!(
			"{:<12} {:<10} {:<12} {:<32} {}",
			record.library,
			record.version,
			record.variant,
			record.artifact_filename,
			record.fingerprint
		);
	}
	Ok(())
}

fn run_fingerprint(file: &Path) -> Result<()> {
	let data = std::fs::read(file).with_context(|| format!("failed to read {}", file.display()))?;
	let fingerprint = Fingerprint::of(&data);
	let registry = VersionRegistry::builtin();

	match registry.lookup_by_fingerprint(&fingerprint) {
		Some(record) => println!("{fingerprint}  {}", record.label()),
		None => println!("{fingerprint}  unknown"),
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_rewrite_flags_become_overrides() {
		let args = Args::parse_from([
			"prodmap",
			"--json-logs",
			"rewrite",
			"--strict",
			"dist/app.js.map",
		]);
		let overrides = CliOverrides::from(&args);

		assert_eq!(overrides.strict, Some(true));
		assert_eq!(overrides.preserve, None);
		assert_eq!(overrides.log_format.as_deref(), Some("json"));
	}

	#[test]
	fn test_global_flags_after_subcommand() {
		let args = Args::parse_from([
			"prodmap",
			"versions",
			"--assets-dir",
			"/opt/assets",
			"--json",
		]);
		let overrides = CliOverrides::from(&args);

		assert_eq!(overrides.assets_dir, Some(PathBuf::from("/opt/assets")));
		assert!(matches!(args.command, Command::Versions { json: true }));
	}

	#[test]
	fn test_args_are_consistent() {
		use clap::CommandFactory;
		Args::command().debug_assert();
	}
}
