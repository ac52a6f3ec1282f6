// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: keyedhash
// File: session.rs
// Author: Volker Schwaberow <volker@schwaberow.de>

//! Per-message HMAC session.
//!
//! `Uninitialized -> Streaming -> Finalized`. `init` never leaves
//! `Finalized`; only `import` of an exported state opens a new span. The
//! session owns its underlying scratch session exclusively
//! and reuses it for the outer pass.
//!
//! An exported state is the underlying state followed by the key
//! generation it was taken under, zero-padded to the instance state size.
//! Importing a state stamped with any other generation fails with
//! [`Error::KeyRotated`].

use std::sync::Arc;

use zeroize::Zeroizing;

use super::instance::{KeyedState, Shared};
use super::template::GENERATION_BYTES;
use crate::kh::error::{Error, Result};
use crate::kh::primitive::HashSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
	Uninitialized,
	Streaming,
	Finalized,
}

pub struct HmacSession {
	shared: Arc<Shared>,
	scratch: Box<dyn HashSession>,
	phase: Phase,
	keyed: Option<Arc<KeyedState>>,
}

impl HmacSession {
	pub(crate) fn new(
		shared: Arc<Shared>,
		scratch: Box<dyn HashSession>,
	) -> Self {
		Self {
			shared,
			scratch,
			phase: Phase::Uninitialized,
			keyed: None,
		}
	}

	pub fn phase(&self) -> Phase {
		self.phase
	}

	fn enter_streaming(&mut self) -> Result<Arc<KeyedState>> {
		match self.phase {
			Phase::Finalized => Err(Error::AlreadyFinalized),
			Phase::Streaming => {
				// already counted; only refresh the key snapshot
				let fresh = self.shared.begin_streaming()?;
				self.shared.end_streaming();
				Ok(fresh)
			}
			Phase::Uninitialized => self.shared.begin_streaming(),
		}
	}

	fn streaming_key(&self) -> Result<&Arc<KeyedState>> {
		match (self.phase, self.keyed.as_ref()) {
			(Phase::Uninitialized, _) => Err(Error::NotInitialized),
			(Phase::Finalized, _) => Err(Error::AlreadyFinalized),
			(Phase::Streaming, Some(keyed)) => {
				if self.shared.is_current(keyed) {
					Ok(keyed)
				} else {
					Err(Error::KeyRotated)
				}
			}
			(Phase::Streaming, None) => Err(Error::NotInitialized),
		}
	}

	/// Drops back to `Uninitialized` after a failed `init`/`import`.
	fn abandon(&mut self) {
		self.shared.end_streaming();
		self.phase = Phase::Uninitialized;
		self.keyed = None;
	}

	fn finish(&mut self) {
		if self.phase == Phase::Streaming {
			self.shared.end_streaming();
		}
		self.phase = Phase::Finalized;
		self.keyed = None;
	}

	/// Closes the inner hash and runs the outer pass over its digest.
	fn outer_pass(
		&mut self,
		keyed: &KeyedState,
		inner: Zeroizing<Vec<u8>>,
	) -> Result<Vec<u8>> {
		self.scratch.import(&keyed.checkpoints.outer)?;
		self.scratch.finup(&inner)
	}

	fn close(&mut self, data: Option<&[u8]>) -> Result<Vec<u8>> {
		let keyed = Arc::clone(self.streaming_key()?);
		let result = match data {
			Some(data) => self.scratch.finup(data),
			None => self.scratch.finalize(),
		}
		.map(Zeroizing::new)
		.and_then(|inner| self.outer_pass(&keyed, inner));
		self.finish();
		result
	}
}

impl HashSession for HmacSession {
	/// Restores the inner checkpoint of the instance's current key.
	fn init(&mut self) -> Result<()> {
		let keyed = self.enter_streaming()?;
		if let Err(err) = self.scratch.import(&keyed.checkpoints.inner) {
			self.abandon();
			return Err(err);
		}
		self.keyed = Some(keyed);
		self.phase = Phase::Streaming;
		Ok(())
	}

	fn update(&mut self, data: &[u8]) -> Result<()> {
		self.streaming_key()?;
		self.scratch.update(data)
	}

	fn finalize(&mut self) -> Result<Vec<u8>> {
		self.close(None)
	}

	fn finup(&mut self, data: &[u8]) -> Result<Vec<u8>> {
		self.close(Some(data))
	}

	/// Underlying state and key generation, zero-padded to the aligned
	/// HMAC state size.
	fn export(&self) -> Result<Vec<u8>> {
		let generation = self.streaming_key()?.generation;
		let mut state = self.scratch.export()?;
		state.resize(self.shared.underlying_state_size(), 0);
		state.extend_from_slice(&generation.to_be_bytes());
		state.resize(self.shared.descriptor.state_size, 0);
		Ok(state)
	}

	/// Resumes from an exported state, provided it was taken under the
	/// instance's current key. Accepted in every phase, which lets an HMAC
	/// session serve as the reusable scratch of an outer HMAC.
	fn import(&mut self, state: &[u8]) -> Result<()> {
		let expected = self.shared.descriptor.state_size;
		let parsed = if state.len() == expected {
			split_state(state, self.shared.underlying_state_size())
		} else {
			None
		};
		let (raw, generation) = parsed.ok_or(Error::IncompatibleState {
			expected,
			actual: state.len(),
		})?;
		// an import opens a new resume span, even after completion
		let keyed = match self.phase {
			Phase::Streaming => self.enter_streaming()?,
			Phase::Uninitialized | Phase::Finalized => {
				self.shared.begin_streaming()?
			}
		};
		if keyed.generation != generation {
			self.abandon();
			return Err(Error::KeyRotated);
		}
		if let Err(err) = self.scratch.import(raw) {
			self.abandon();
			return Err(err);
		}
		self.keyed = Some(keyed);
		self.phase = Phase::Streaming;
		Ok(())
	}
}

/// Splits an exported state into the underlying state and its generation.
fn split_state(state: &[u8], raw_len: usize) -> Option<(&[u8], u64)> {
	let raw = state.get(..raw_len)?;
	let stamp = state
		.get(raw_len..raw_len + GENERATION_BYTES)?
		.try_into()
		.ok()?;
	Some((raw, u64::from_be_bytes(stamp)))
}

impl Drop for HmacSession {
	fn drop(&mut self) {
		if self.phase == Phase::Streaming {
			self.shared.end_streaming();
		}
	}
}
