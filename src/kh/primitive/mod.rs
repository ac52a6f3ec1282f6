// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: keyedhash
// Module: primitive (streaming hash capability)
// Author: Volker Schwaberow <volker@schwaberow.de>
// Copyright (c) 2025 Volker Schwaberow

//! The streaming-hash capability consumed by the HMAC construction.
//!
//! An algorithm is split in two: a [`HashAlgorithm`] handle carrying static
//! metadata that can spawn any number of independent [`HashSession`]s, and
//! the session itself, which owns all per-computation scratch state. A
//! session can be suspended with [`HashSession::export`] and resumed on
//! another session of the same algorithm with [`HashSession::import`].

pub mod md;
pub mod sha;

use std::sync::Arc;

use serde::Serialize;

use crate::kh::error::Result;

/// Static facts about a hash primitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HashDescriptor {
	/// Generic algorithm name, e.g. `sha1` or `hmac(sha1)`.
	pub name: String,
	/// Implementation name, e.g. `sha1-compress`.
	pub driver: String,
	pub priority: u32,
	pub block_size: usize,
	pub digest_size: usize,
	/// Length of an exported state blob.
	pub state_size: usize,
	/// Size of the per-session scratch data.
	pub descriptor_size: usize,
	/// Required alignment minus one.
	pub alignmask: usize,
}

pub trait HashAlgorithm: Send + Sync {
	fn descriptor(&self) -> &HashDescriptor;

	/// Opens an independent session. Sessions never share scratch state.
	fn new_session(&self) -> Result<Box<dyn HashSession>>;

	/// One-shot digest of `data`.
	fn digest(&self, data: &[u8]) -> Result<Vec<u8>> {
		let mut session = self.new_session()?;
		session.init()?;
		session.finup(data)
	}
}

pub trait HashSession: Send {
	fn init(&mut self) -> Result<()>;
	fn update(&mut self, data: &[u8]) -> Result<()>;
	fn finalize(&mut self) -> Result<Vec<u8>>;

	fn finup(&mut self, data: &[u8]) -> Result<Vec<u8>> {
		self.update(data)?;
		self.finalize()
	}

	fn export(&self) -> Result<Vec<u8>>;
	fn import(&mut self, state: &[u8]) -> Result<()>;
}

impl<T: HashAlgorithm + ?Sized> HashAlgorithm for Arc<T> {
	fn descriptor(&self) -> &HashDescriptor {
		(**self).descriptor()
	}

	fn new_session(&self) -> Result<Box<dyn HashSession>> {
		(**self).new_session()
	}
}

impl<T: HashAlgorithm + ?Sized> HashAlgorithm for Box<T> {
	fn descriptor(&self) -> &HashDescriptor {
		(**self).descriptor()
	}

	fn new_session(&self) -> Result<Box<dyn HashSession>> {
		(**self).new_session()
	}
}
