// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: keyedhash
// File: app.rs
// Author: Volker Schwaberow <volker@schwaberow.de>
// Copyright (c) 2025 Volker Schwaberow

//! `khmac` command line: compute MACs, list primitives, run the self-test.

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{crate_name, Arg, ArgAction, ArgMatches};
use serde_json::json;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::kh::hmac::{parse_template_name, HmacInstance};
use crate::kh::primitive::HashAlgorithm;
use crate::kh::registry::Registry;
use crate::kh::selftest::{
	self, SelfTestConfig, SelfTestOutcome, SystemPlatform, Watchdog,
};

const HELP_TEMPLATE: &str = "{before-help}{name} {version}
Written by {author-with-newline}{about-with-newline}
Primary commands:
  khmac mac <algorithm> -k <key> <message>   HMAC of a message (e.g. khmac mac sha256 -k Jefe 'text')
  khmac selftest                             Run the known-answer gate in the foreground
{usage-heading} {usage}

{all-args}{after-help}
";

pub fn build_cli() -> clap::Command {
	clap::Command::new(crate_name!())
		.color(clap::ColorChoice::Never)
		.help_template(HELP_TEMPLATE)
		.bin_name("khmac")
		.version(clap::crate_version!())
		.author(clap::crate_authors!())
		.about("Keyed-hash (HMAC) utility over pluggable hash primitives")
		.subcommand_required(true)
		.arg_required_else_help(true)
		.subcommand(
			clap::command!("mac")
				.about("Compute an HMAC over a message")
				.arg(
					Arg::new("algorithm")
						.help("Underlying hash (sha256) or full name (hmac(sha256))")
						.required(true),
				)
				.arg(
					Arg::new("key")
						.short('k')
						.long("key")
						.help("Key material")
						.required(true),
				)
				.arg(
					Arg::new("hex-key")
						.long("hex-key")
						.help("Decode --key as hex")
						.action(ArgAction::SetTrue),
				)
				.arg(
					Arg::new("json")
						.long("json")
						.help("Emit JSON")
						.action(ArgAction::SetTrue),
				)
				.arg(Arg::new("message").required(true)),
		)
		.subcommand(
			clap::command!("list")
				.about("List registered hash primitives")
				.arg(
					Arg::new("json")
						.long("json")
						.help("Emit JSON")
						.action(ArgAction::SetTrue),
				),
		)
		.subcommand(
			clap::command!("selftest")
				.about("Run the HMAC known-answer test in the foreground")
				.arg(
					Arg::new("config")
						.long("config")
						.help("JSON configuration file")
						.value_parser(clap::value_parser!(PathBuf)),
				)
				.arg(
					Arg::new("fail-test")
						.long("fail-test")
						.help("Force the named vector to fail (debug)"),
				)
				.arg(
					Arg::new("vector")
						.long("vector")
						.help("Known-answer vector identifier"),
				)
				.arg(
					Arg::new("fault-log")
						.long("fault-log")
						.help("Where to persist the failure reason")
						.value_parser(clap::value_parser!(PathBuf)),
				),
		)
}

pub fn run() -> Result<(), Box<dyn Error>> {
	let matches = build_cli().get_matches();
	let registry = Arc::new(Registry::with_builtins());

	match matches.subcommand() {
		Some(("selftest", args)) => run_selftest(registry, args),
		Some((command, args)) => {
			let config = SelfTestConfig::from_env()?;
			let platform =
				Arc::new(SystemPlatform::new(config.fault_log.clone()));
			let watchdog = selftest::schedule_startup_selftest(
				Arc::clone(&registry),
				config,
				platform,
			)?;
			let result = match command {
				"mac" => run_mac(&registry, args),
				"list" => run_list(&registry, args),
				other => Err(format!("unknown command `{}`", other).into()),
			};
			if let Some(handle) = watchdog {
				match handle.join() {
					Ok(outcome) => debug!(?outcome, "startup self-test"),
					Err(_) => warn!("self-test thread panicked"),
				}
			}
			result
		}
		None => Ok(()),
	}
}

fn run_mac(
	registry: &Registry,
	args: &ArgMatches,
) -> Result<(), Box<dyn Error>> {
	let algorithm = args
		.get_one::<String>("algorithm")
		.ok_or("missing algorithm")?;
	let raw_key = args.get_one::<String>("key").ok_or("missing key")?;
	let message = args
		.get_one::<String>("message")
		.ok_or("missing message")?;

	let key = Zeroizing::new(if args.get_flag("hex-key") {
		hex::decode(raw_key)?
	} else {
		raw_key.as_bytes().to_vec()
	});

	let underlying = parse_template_name(algorithm).unwrap_or(algorithm);
	let instance: HmacInstance = registry.create_hmac(underlying)?;
	instance.set_key(&key)?;
	let digest = hex::encode(instance.mac(message.as_bytes())?);

	if args.get_flag("json") {
		let payload = json!({
			"algorithm": instance.name(),
			"digest": digest,
			"input": message,
		});
		println!("{}", payload);
	} else {
		println!("{} {}", digest, message);
	}
	Ok(())
}

fn run_list(
	registry: &Registry,
	args: &ArgMatches,
) -> Result<(), Box<dyn Error>> {
	let descriptors = registry.descriptors();
	if args.get_flag("json") {
		println!("{}", serde_json::to_string_pretty(&descriptors)?);
		return Ok(());
	}
	for d in descriptors {
		let hmac = registry.create_hmac(&d.name)?;
		println!(
			"{:<10} block {:>3}  digest {:>2}  state {:>3}  {}",
			d.name,
			d.block_size,
			d.digest_size,
			d.state_size,
			hmac.descriptor().name
		);
	}
	Ok(())
}

fn run_selftest(
	registry: Arc<Registry>,
	args: &ArgMatches,
) -> Result<(), Box<dyn Error>> {
	let mut config = match args.get_one::<PathBuf>("config") {
		Some(path) => SelfTestConfig::from_json_file(path)?,
		None => SelfTestConfig::from_env()?,
	};
	config.enabled = true;
	if let Some(name) = args.get_one::<String>("fail-test") {
		config.forced_failure = Some(name.clone());
	}
	if let Some(vector) = args.get_one::<String>("vector") {
		config.vector = vector.clone();
	}
	if let Some(path) = args.get_one::<PathBuf>("fault-log") {
		config.fault_log = path.clone();
	}
	config.validate()?;

	let platform = Arc::new(SystemPlatform::new(config.fault_log.clone()));
	match Watchdog::new(registry, config, platform).run_once() {
		SelfTestOutcome::Passed => {
			println!("self-test passed");
			Ok(())
		}
		SelfTestOutcome::Skipped => {
			println!("self-test skipped");
			Ok(())
		}
		SelfTestOutcome::Failed { reason } => Err(reason.into()),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn cli_definition_is_consistent() {
		build_cli().debug_assert();
	}

	#[test]
	fn mac_arguments_parse() {
		let matches = build_cli()
			.try_get_matches_from([
				"khmac", "mac", "sha1", "-k", "30313233", "--hex-key",
				"Sample #2",
			])
			.unwrap();
		let (name, args) = matches.subcommand().unwrap();
		assert_eq!(name, "mac");
		assert!(args.get_flag("hex-key"));
		assert_eq!(
			args.get_one::<String>("message").map(String::as_str),
			Some("Sample #2")
		);
	}
}
