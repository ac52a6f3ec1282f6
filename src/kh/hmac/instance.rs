// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: keyedhash
// File: instance.rs
// Author: Volker Schwaberow <volker@schwaberow.de>

//! Keyed-hash instance: one underlying primitive plus the two pad
//! checkpoints of the current key.
//!
//! Cloning an instance yields another handle to the same key material.
//! Every successful `set_key` stamps a new generation; sessions opened under
//! an older generation fail with [`Error::KeyRotated`] instead of mixing key
//! material.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use subtle::ConstantTimeEq;
use tracing::{debug, info};

use super::key::{self, Checkpoints};
use super::session::HmacSession;
use super::template::{check_structure, derive_descriptor};
use crate::kh::error::{Error, Result};
use crate::kh::primitive::{HashAlgorithm, HashDescriptor, HashSession};

pub(crate) struct KeyedState {
	pub(crate) generation: u64,
	pub(crate) checkpoints: Checkpoints,
}

pub(crate) struct Shared {
	pub(crate) descriptor: HashDescriptor,
	pub(crate) underlying: Box<dyn HashAlgorithm>,
	keyed: RwLock<Option<Arc<KeyedState>>>,
	generation: AtomicU64,
	streaming: AtomicUsize,
}

impl Shared {
	/// Snapshot of the current key, counted as one more streaming session.
	pub(crate) fn begin_streaming(&self) -> Result<Arc<KeyedState>> {
		let keyed = self.keyed.read();
		let state = keyed.as_ref().ok_or(Error::NotKeyed)?.clone();
		self.streaming.fetch_add(1, Ordering::AcqRel);
		Ok(state)
	}

	pub(crate) fn end_streaming(&self) {
		self.streaming.fetch_sub(1, Ordering::AcqRel);
	}

	pub(crate) fn is_current(&self, state: &KeyedState) -> bool {
		self.generation.load(Ordering::Acquire) == state.generation
	}

	/// Real state length of the underlying primitive.
	pub(crate) fn underlying_state_size(&self) -> usize {
		self.underlying.descriptor().state_size
	}
}

#[derive(Clone)]
pub struct HmacInstance {
	shared: Arc<Shared>,
}

impl HmacInstance {
	/// Wraps an underlying primitive directly, outside any registry.
	pub fn new(underlying: Box<dyn HashAlgorithm>) -> Result<Self> {
		let descriptor = derive_descriptor(underlying.descriptor())?;
		Self::from_parts(descriptor, underlying)
	}

	pub(crate) fn from_parts(
		descriptor: HashDescriptor,
		underlying: Box<dyn HashAlgorithm>,
	) -> Result<Self> {
		check_structure(underlying.descriptor())?;
		Ok(Self {
			shared: Arc::new(Shared {
				descriptor,
				underlying,
				keyed: RwLock::new(None),
				generation: AtomicU64::new(0),
				streaming: AtomicUsize::new(0),
			}),
		})
	}

	pub fn name(&self) -> &str {
		&self.shared.descriptor.name
	}

	pub fn underlying(&self) -> &dyn HashAlgorithm {
		&*self.shared.underlying
	}

	pub fn is_keyed(&self) -> bool {
		self.shared.keyed.read().is_some()
	}

	/// Generation of the current key; zero until the first `set_key`.
	pub fn key_generation(&self) -> u64 {
		self.shared.generation.load(Ordering::Acquire)
	}

	/// Sessions currently between `init`/`import` and completion.
	pub fn streaming_sessions(&self) -> usize {
		self.shared.streaming.load(Ordering::Acquire)
	}

	/// Installs a new key. Sessions still streaming under the previous key
	/// fail with `KeyRotated` on their next operation.
	pub fn set_key(&self, key: &[u8]) -> Result<()> {
		let checkpoints =
			key::schedule(&*self.shared.underlying, key)?;
		let mut keyed = self.shared.keyed.write();
		self.install(&mut keyed, checkpoints);
		Ok(())
	}

	/// Like [`set_key`](Self::set_key) but refuses to rotate while any
	/// session of this instance is streaming.
	pub fn try_set_key(&self, key: &[u8]) -> Result<()> {
		let checkpoints =
			key::schedule(&*self.shared.underlying, key)?;
		let mut keyed = self.shared.keyed.write();
		let active = self.shared.streaming.load(Ordering::Acquire);
		if active > 0 {
			return Err(Error::ConcurrentRekey { active });
		}
		self.install(&mut keyed, checkpoints);
		Ok(())
	}

	fn install(
		&self,
		keyed: &mut Option<Arc<KeyedState>>,
		checkpoints: Checkpoints,
	) {
		let generation =
			self.shared.generation.load(Ordering::Acquire) + 1;
		*keyed = Some(Arc::new(KeyedState {
			generation,
			checkpoints,
		}));
		self.shared.generation.store(generation, Ordering::Release);
		let active = self.shared.streaming.load(Ordering::Acquire);
		if generation > 1 && active > 0 {
			info!(
				name = %self.shared.descriptor.name,
				generation,
				active,
				"hmac key rotated with sessions in flight"
			);
		} else {
			debug!(
				name = %self.shared.descriptor.name,
				generation,
				"hmac key installed"
			);
		}
	}

	pub fn open_session(&self) -> Result<HmacSession> {
		let scratch = self.shared.underlying.new_session()?;
		Ok(HmacSession::new(Arc::clone(&self.shared), scratch))
	}

	/// MAC of a complete message.
	pub fn mac(&self, message: &[u8]) -> Result<Vec<u8>> {
		let mut session = self.open_session()?;
		session.init()?;
		session.finup(message)
	}

	/// Recomputes the MAC and compares it in constant time.
	pub fn verify(&self, message: &[u8], tag: &[u8]) -> Result<bool> {
		let expected = self.mac(message)?;
		Ok(bool::from(expected.ct_eq(tag)))
	}
}

impl HashAlgorithm for HmacInstance {
	fn descriptor(&self) -> &HashDescriptor {
		&self.shared.descriptor
	}

	fn new_session(&self) -> Result<Box<dyn HashSession>> {
		Ok(Box::new(self.open_session()?))
	}
}

impl std::fmt::Debug for HmacInstance {
	fn fmt(
		&self,
		f: &mut std::fmt::Formatter<'_>,
	) -> std::fmt::Result {
		f.debug_struct("HmacInstance")
			.field("descriptor", &self.shared.descriptor)
			.field("generation", &self.key_generation())
			.finish_non_exhaustive()
	}
}
