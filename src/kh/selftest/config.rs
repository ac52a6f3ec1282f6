// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: keyedhash
// File: config.rs
// Author: Volker Schwaberow <volker@schwaberow.de>

//! Watchdog configuration, from defaults, environment or a JSON file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::vectors;
use crate::kh::error::{Error, Result};

pub const ENV_ENABLED: &str = "KH_SELFTEST";
pub const ENV_FAIL_TEST: &str = "KH_FAIL_TEST";
pub const ENV_FAULT_LOG: &str = "KH_FAULT_LOG";

pub const DEFAULT_VECTOR: &str = "hmac-sha1";
pub const DEFAULT_FAULT_LOG: &str = "kat-reboot-reason.log";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelfTestConfig {
	/// Runtime switch; the `selftest` cargo feature gates compilation.
	pub enabled: bool,
	/// Debug switch: a vector whose identifier matches always fails.
	pub forced_failure: Option<String>,
	pub fault_log: PathBuf,
	/// Identifier of the vector the watchdog runs.
	pub vector: String,
}

impl Default for SelfTestConfig {
	fn default() -> Self {
		Self {
			enabled: true,
			forced_failure: None,
			fault_log: PathBuf::from(DEFAULT_FAULT_LOG),
			vector: DEFAULT_VECTOR.to_string(),
		}
	}
}

impl SelfTestConfig {
	pub fn from_env() -> Result<Self> {
		Self::from_lookup(|key| std::env::var(key).ok())
	}

	pub fn from_lookup<F>(lookup: F) -> Result<Self>
	where
		F: Fn(&str) -> Option<String>,
	{
		let mut config = Self::default();
		if let Some(raw) = lookup(ENV_ENABLED) {
			config.enabled = parse_switch(&raw).ok_or_else(|| {
				Error::Config(format!(
					"{} must be on/off, got `{}`",
					ENV_ENABLED, raw
				))
			})?;
		}
		config.forced_failure =
			lookup(ENV_FAIL_TEST).filter(|v| !v.is_empty());
		if let Some(path) = lookup(ENV_FAULT_LOG) {
			config.fault_log = PathBuf::from(path);
		}
		config.validate()?;
		Ok(config)
	}

	pub fn from_json_file(path: &Path) -> Result<Self> {
		let contents = fs::read_to_string(path)?;
		let config: Self = serde_json::from_str(&contents).map_err(|err| {
			Error::Config(format!(
				"failed to parse `{}`: {}",
				path.display(),
				err
			))
		})?;
		config.validate()?;
		Ok(config)
	}

	pub fn validate(&self) -> Result<()> {
		if vectors::find(&self.vector).is_none() {
			return Err(Error::Config(format!(
				"unknown self-test vector `{}`",
				self.vector
			)));
		}
		Ok(())
	}

	/// True when the debug switch names `identifier`.
	pub fn forces_failure_of(&self, identifier: &str) -> bool {
		self.forced_failure
			.as_deref()
			.is_some_and(|name| name.eq_ignore_ascii_case(identifier))
	}
}

fn parse_switch(raw: &str) -> Option<bool> {
	match raw.trim().to_ascii_lowercase().as_str() {
		"1" | "on" | "true" | "yes" => Some(true),
		"0" | "off" | "false" | "no" => Some(false),
		_ => None,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap;

	fn lookup(
		pairs: &[(&str, &str)],
	) -> impl Fn(&str) -> Option<String> {
		let map: HashMap<String, String> = pairs
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect();
		move |key| map.get(key).cloned()
	}

	#[test]
	fn defaults_without_environment() {
		let config = SelfTestConfig::from_lookup(lookup(&[])).unwrap();
		assert_eq!(config, SelfTestConfig::default());
		assert!(config.enabled);
		assert!(!config.forces_failure_of("hmac-sha1"));
	}

	#[test]
	fn environment_overrides() {
		let config = SelfTestConfig::from_lookup(lookup(&[
			(ENV_ENABLED, "off"),
			(ENV_FAIL_TEST, "HMAC-SHA1"),
			(ENV_FAULT_LOG, "/tmp/reason"),
		]))
		.unwrap();
		assert!(!config.enabled);
		assert!(config.forces_failure_of("hmac-sha1"));
		assert!(!config.forces_failure_of("hmac-sha256"));
		assert_eq!(config.fault_log, PathBuf::from("/tmp/reason"));
	}

	#[test]
	fn bad_switch_is_rejected() {
		let err =
			SelfTestConfig::from_lookup(lookup(&[(ENV_ENABLED, "maybe")]))
				.unwrap_err();
		assert!(matches!(err, Error::Config(_)));
	}

	#[test]
	fn json_file_with_partial_fields() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("selftest.json");
		fs::write(
			&path,
			r#"{ "forced_failure": "hmac-sha1", "vector": "hmac-sha256" }"#,
		)
		.unwrap();
		let config = SelfTestConfig::from_json_file(&path).unwrap();
		assert!(config.enabled);
		assert_eq!(config.vector, "hmac-sha256");
		assert_eq!(config.forced_failure.as_deref(), Some("hmac-sha1"));
	}

	#[test]
	fn unknown_vector_is_rejected() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("selftest.json");
		fs::write(&path, r#"{ "vector": "hmac-md5" }"#).unwrap();
		assert!(matches!(
			SelfTestConfig::from_json_file(&path),
			Err(Error::Config(_))
		));
	}
}
