// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: keyedhash
// Module: selftest (known-answer watchdog)
// Author: Volker Schwaberow <volker@schwaberow.de>
// Copyright (c) 2025 Volker Schwaberow

//! Boot-time known-answer test for the HMAC construction.
//!
//! The watchdog runs one fixed vector through a fresh instance on its own
//! thread. A mismatch, or a forced failure naming the vector, persists a
//! reason through the [`Platform`] and restarts the system. The failure
//! path never returns an error to whoever scheduled the test.

pub mod config;
pub mod platform;
pub mod vectors;

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use subtle::ConstantTimeEq;
use tracing::{error, info, warn};

pub use config::SelfTestConfig;
pub use platform::{Platform, SystemPlatform};
pub use vectors::{KnownAnswer, HMAC_SHA1_SAMPLE_2};

use crate::kh::error::Error;
use crate::kh::hmac::HmacInstance;
use crate::kh::primitive::HashSession;
use crate::kh::registry::Registry;

const WATCHDOG_THREAD: &str = "kh-selftest";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelfTestOutcome {
	Passed,
	/// The platform was asked to restart with this reason.
	Failed { reason: String },
	Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Failure {
	Instance,
	Session,
	Computation,
}

impl Failure {
	fn reason(&self, vector: &KnownAnswer) -> String {
		match self {
			Failure::Instance => "TFM alloc failed".to_string(),
			Failure::Session => {
				format!("{} Alloc Failed", vector.display_name)
			}
			Failure::Computation => {
				format!("{} Computation Failed", vector.display_name)
			}
		}
	}
}

/// Runs `vector` against a fresh instance from `registry`.
pub fn run_known_answer(
	registry: &Registry,
	vector: &KnownAnswer,
	force_failure: bool,
) -> Result<(), String> {
	let instance = registry.create_hmac(vector.underlying).map_err(|err| {
		warn!(%err, "self-test instance allocation failed");
		Failure::Instance.reason(vector)
	})?;
	check_instance(&instance, vector, force_failure)
		.map_err(|failure| failure.reason(vector))
}

fn check_instance(
	instance: &HmacInstance,
	vector: &KnownAnswer,
	force_failure: bool,
) -> Result<(), Failure> {
	let mut session =
		instance.open_session().map_err(|_| Failure::Session)?;
	instance.set_key(vector.key).map_err(|err| {
		warn!(%err, "self-test key schedule failed");
		Failure::Computation
	})?;
	session.init().map_err(|_| Failure::Session)?;
	let actual = session.finup(vector.message).map_err(|err: Error| {
		warn!(%err, "self-test digest failed");
		Failure::Computation
	})?;

	let matches = bool::from(actual.ct_eq(vector.expected));
	if !matches || force_failure {
		return Err(Failure::Computation);
	}
	Ok(())
}

/// One-shot known-answer gate bound to a platform.
pub struct Watchdog {
	registry: Arc<Registry>,
	config: SelfTestConfig,
	platform: Arc<dyn Platform>,
}

impl Watchdog {
	pub fn new(
		registry: Arc<Registry>,
		config: SelfTestConfig,
		platform: Arc<dyn Platform>,
	) -> Self {
		Self {
			registry,
			config,
			platform,
		}
	}

	/// The configured vector. An unknown identifier is a failed self-test,
	/// never a silent fallback to another vector.
	fn vector(&self) -> Result<&'static KnownAnswer, String> {
		vectors::find(&self.config.vector).ok_or_else(|| {
			format!("unknown self-test vector `{}`", self.config.vector)
		})
	}

	/// Runs the test on the calling thread and escalates on failure.
	pub fn run_once(&self) -> SelfTestOutcome {
		if !self.config.enabled {
			info!("hmac self-test disabled");
			return SelfTestOutcome::Skipped;
		}
		let result = self.vector().and_then(|vector| {
			info!(
				vector = vector.identifier,
				"starting {} KAT", vector.display_name
			);
			let forced = self.config.forces_failure_of(vector.identifier);
			run_known_answer(&self.registry, vector, forced).map(|()| vector)
		});
		match result {
			Ok(vector) => {
				info!("completed {} KAT", vector.display_name);
				SelfTestOutcome::Passed
			}
			Err(reason) => {
				error!(
					vector = %self.config.vector,
					%reason,
					"hmac self-test failed"
				);
				self.platform.save_fault_reason(&reason);
				self.platform.fatal_restart(&reason);
				SelfTestOutcome::Failed { reason }
			}
		}
	}

	/// Fire-and-forget: runs the test on a dedicated thread.
	pub fn spawn(self) -> std::io::Result<JoinHandle<SelfTestOutcome>> {
		thread::Builder::new()
			.name(WATCHDOG_THREAD.to_string())
			.spawn(move || self.run_once())
	}
}

/// Schedules the boot self-test when the `selftest` feature is compiled in.
#[cfg(feature = "selftest")]
pub fn schedule_startup_selftest(
	registry: Arc<Registry>,
	config: SelfTestConfig,
	platform: Arc<dyn Platform>,
) -> std::io::Result<Option<JoinHandle<SelfTestOutcome>>> {
	Watchdog::new(registry, config, platform).spawn().map(Some)
}

#[cfg(not(feature = "selftest"))]
pub fn schedule_startup_selftest(
	_registry: Arc<Registry>,
	_config: SelfTestConfig,
	_platform: Arc<dyn Platform>,
) -> std::io::Result<Option<JoinHandle<SelfTestOutcome>>> {
	Ok(None)
}
