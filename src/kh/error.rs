// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: keyedhash
// File: error.rs
// Author: Volker Schwaberow <volker@schwaberow.de>
// Copyright (c) 2025 Volker Schwaberow

//! Error taxonomy shared by the registry, the HMAC construction and the
//! self-test watchdog.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
	/// The underlying primitive cannot carry an HMAC. Permanent.
	#[error(
		"`{name}` cannot back an HMAC: digest size {digest_size}, block size {block_size}, state size {state_size}"
	)]
	StructuralMismatch {
		name: String,
		digest_size: usize,
		block_size: usize,
		state_size: usize,
	},

	#[error("unknown hash algorithm `{0}`")]
	UnknownAlgorithm(String),

	#[error("failed to instantiate `{name}`: {reason}")]
	InstantiationFailed { name: String, reason: String },

	#[error("key schedule failed: {0}")]
	KeyScheduleFailed(#[source] Box<Error>),

	#[error("instance has no key; call set_key first")]
	NotKeyed,

	#[error("session is not initialized")]
	NotInitialized,

	#[error("session already finalized")]
	AlreadyFinalized,

	#[error("cannot rotate key while {active} session(s) are streaming")]
	ConcurrentRekey { active: usize },

	#[error("instance key was rotated while the session was streaming")]
	KeyRotated,

	#[error(
		"incompatible state blob: expected {expected} bytes, got {actual}"
	)]
	IncompatibleState { expected: usize, actual: usize },

	#[error("algorithm `{name}` already registered")]
	AlreadyRegistered { name: String },

	#[error("invalid configuration: {0}")]
	Config(String),

	#[error(transparent)]
	Io(#[from] std::io::Error),
}

impl Error {
	pub fn instantiation(
		name: impl Into<String>,
		reason: impl Into<String>,
	) -> Self {
		Self::InstantiationFailed {
			name: name.into(),
			reason: reason.into(),
		}
	}

	/// Caller errors are reported as-is and never retried internally.
	pub fn is_caller_error(&self) -> bool {
		matches!(
			self,
			Self::NotKeyed
				| Self::NotInitialized
				| Self::AlreadyFinalized
				| Self::ConcurrentRekey { .. }
				| Self::KeyRotated
				| Self::IncompatibleState { .. }
		)
	}

	/// Only resource exhaustion during instantiation is worth retrying.
	pub fn is_retryable(&self) -> bool {
		matches!(self, Self::InstantiationFailed { .. })
	}
}
