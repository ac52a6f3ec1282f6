// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: keyedhash
// File: platform.rs
// Author: Volker Schwaberow <volker@schwaberow.de>

//! Platform hooks the watchdog escalates through on a failed self-test.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::error;

pub trait Platform: Send + Sync {
	/// Persists a human-readable reason to non-volatile fault storage.
	fn save_fault_reason(&self, reason: &str);

	/// Restarts the whole system. Production implementations do not return.
	fn fatal_restart(&self, reason: &str);
}

/// Appends fault reasons to a log file and aborts the process.
#[derive(Debug, Clone)]
pub struct SystemPlatform {
	fault_log: PathBuf,
}

impl SystemPlatform {
	pub fn new(fault_log: impl Into<PathBuf>) -> Self {
		Self {
			fault_log: fault_log.into(),
		}
	}

	pub fn fault_log(&self) -> &std::path::Path {
		&self.fault_log
	}

	fn append(&self, reason: &str) -> std::io::Result<()> {
		let stamp = SystemTime::now()
			.duration_since(UNIX_EPOCH)
			.map(|d| d.as_secs())
			.unwrap_or(0);
		let mut file = OpenOptions::new()
			.create(true)
			.append(true)
			.open(&self.fault_log)?;
		writeln!(file, "{} {}", stamp, reason)?;
		file.sync_all()
	}
}

impl Platform for SystemPlatform {
	fn save_fault_reason(&self, reason: &str) {
		if let Err(err) = self.append(reason) {
			error!(
				path = %self.fault_log.display(),
				%err,
				"failed to persist self-test fault reason"
			);
		}
	}

	fn fatal_restart(&self, reason: &str) {
		error!(reason, "self-test failed, restarting");
		std::process::abort();
	}
}
