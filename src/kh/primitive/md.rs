// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: keyedhash
// File: md.rs
// Author: Volker Schwaberow <volker@schwaberow.de>

//! Merkle–Damgård streaming engine shared by the SHA-1/SHA-2 primitives.
//!
//! The compression functions come from the RustCrypto crates; this module
//! owns the block buffering, the length padding and an exportable state
//! layout:
//!
//! ```text
//! chaining value (big endian) | byte count (big endian) | block buffer
//! ```

use std::marker::PhantomData;

use zeroize::Zeroize;

use super::{HashAlgorithm, HashDescriptor, HashSession};
use crate::kh::error::{Error, Result};

const MAX_BLOCK_SIZE: usize = 128;

/// A compression function plus the constants that turn it into a hash.
pub trait Compression: Send + Sync + 'static {
	const NAME: &'static str;
	const DRIVER: &'static str;
	const PRIORITY: u32;
	const ALIGNMASK: usize;
	const BLOCK_SIZE: usize;
	const DIGEST_SIZE: usize;
	/// Width of the trailing bit-length field.
	const LENGTH_BYTES: usize;
	/// Serialized width of the full chaining value.
	const CHAIN_BYTES: usize;

	type Chain: Copy + Send + Sync + 'static;

	fn iv() -> Self::Chain;
	fn compress(chain: &mut Self::Chain, block: &[u8]);
	fn store_chain(chain: &Self::Chain, out: &mut [u8]);
	fn load_chain(bytes: &[u8]) -> Self::Chain;

	fn state_size() -> usize {
		Self::CHAIN_BYTES + Self::LENGTH_BYTES + Self::BLOCK_SIZE
	}
}

pub struct MdAlgorithm<C: Compression> {
	descriptor: HashDescriptor,
	_compression: PhantomData<fn() -> C>,
}

impl<C: Compression> MdAlgorithm<C> {
	pub fn new() -> Self {
		Self {
			descriptor: HashDescriptor {
				name: C::NAME.to_string(),
				driver: C::DRIVER.to_string(),
				priority: C::PRIORITY,
				block_size: C::BLOCK_SIZE,
				digest_size: C::DIGEST_SIZE,
				state_size: C::state_size(),
				descriptor_size: std::mem::size_of::<MdSession<C>>(),
				alignmask: C::ALIGNMASK,
			},
			_compression: PhantomData,
		}
	}
}

impl<C: Compression> Default for MdAlgorithm<C> {
	fn default() -> Self {
		Self::new()
	}
}

impl<C: Compression> HashAlgorithm for MdAlgorithm<C> {
	fn descriptor(&self) -> &HashDescriptor {
		&self.descriptor
	}

	fn new_session(&self) -> Result<Box<dyn HashSession>> {
		Ok(Box::new(MdSession::<C>::new()))
	}
}

pub struct MdSession<C: Compression> {
	chain: C::Chain,
	/// Total bytes absorbed so far.
	length: u128,
	buffer: [u8; MAX_BLOCK_SIZE],
}

impl<C: Compression> MdSession<C> {
	pub fn new() -> Self {
		Self {
			chain: C::iv(),
			length: 0,
			buffer: [0u8; MAX_BLOCK_SIZE],
		}
	}

	fn buffered(&self) -> usize {
		(self.length % C::BLOCK_SIZE as u128) as usize
	}

	fn absorb(&mut self, mut data: &[u8]) {
		let block_size = C::BLOCK_SIZE;
		let mut used = self.buffered();
		self.length = self.length.wrapping_add(data.len() as u128);

		if used > 0 {
			let take = (block_size - used).min(data.len());
			self.buffer[used..used + take]
				.copy_from_slice(&data[..take]);
			used += take;
			data = &data[take..];
			if used < block_size {
				return;
			}
			C::compress(&mut self.chain, &self.buffer[..block_size]);
		}

		let mut blocks = data.chunks_exact(block_size);
		for block in &mut blocks {
			C::compress(&mut self.chain, block);
		}
		let rest = blocks.remainder();
		self.buffer[..rest.len()].copy_from_slice(rest);
	}

	fn pad_and_close(&mut self) -> Vec<u8> {
		let block_size = C::BLOCK_SIZE;
		let used = self.buffered();
		let bit_length = self.length.wrapping_mul(8).to_be_bytes();

		self.buffer[used] = 0x80;
		self.buffer[used + 1..block_size].fill(0);
		if used + 1 > block_size - C::LENGTH_BYTES {
			C::compress(&mut self.chain, &self.buffer[..block_size]);
			self.buffer[..block_size].fill(0);
		}
		self.buffer[block_size - C::LENGTH_BYTES..block_size]
			.copy_from_slice(&bit_length[16 - C::LENGTH_BYTES..]);
		C::compress(&mut self.chain, &self.buffer[..block_size]);

		let mut full = vec![0u8; C::CHAIN_BYTES];
		C::store_chain(&self.chain, &mut full);
		full.truncate(C::DIGEST_SIZE);
		self.reset();
		full
	}

	fn reset(&mut self) {
		self.chain = C::iv();
		self.length = 0;
		self.buffer.zeroize();
	}
}

impl<C: Compression> Default for MdSession<C> {
	fn default() -> Self {
		Self::new()
	}
}

impl<C: Compression> Drop for MdSession<C> {
	fn drop(&mut self) {
		self.buffer.zeroize();
	}
}

impl<C: Compression> HashSession for MdSession<C> {
	fn init(&mut self) -> Result<()> {
		self.reset();
		Ok(())
	}

	fn update(&mut self, data: &[u8]) -> Result<()> {
		self.absorb(data);
		Ok(())
	}

	fn finalize(&mut self) -> Result<Vec<u8>> {
		Ok(self.pad_and_close())
	}

	fn export(&self) -> Result<Vec<u8>> {
		let mut state = vec![0u8; C::state_size()];
		let (chain, rest) = state.split_at_mut(C::CHAIN_BYTES);
		let (length, buffer) = rest.split_at_mut(C::LENGTH_BYTES);
		C::store_chain(&self.chain, chain);
		length.copy_from_slice(
			&self.length.to_be_bytes()[16 - C::LENGTH_BYTES..],
		);
		let used = self.buffered();
		buffer[..used].copy_from_slice(&self.buffer[..used]);
		Ok(state)
	}

	fn import(&mut self, state: &[u8]) -> Result<()> {
		if state.len() != C::state_size() {
			return Err(Error::IncompatibleState {
				expected: C::state_size(),
				actual: state.len(),
			});
		}
		let (chain, rest) = state.split_at(C::CHAIN_BYTES);
		let (length, buffer) = rest.split_at(C::LENGTH_BYTES);
		let mut wide = [0u8; 16];
		wide[16 - C::LENGTH_BYTES..].copy_from_slice(length);

		self.reset();
		self.chain = C::load_chain(chain);
		self.length = u128::from_be_bytes(wide);
		let used = self.buffered();
		self.buffer[..used].copy_from_slice(&buffer[..used]);
		Ok(())
	}
}

pub(crate) fn store_be32(words: &[u32], out: &mut [u8]) {
	for (word, bytes) in words.iter().zip(out.chunks_exact_mut(4)) {
		bytes.copy_from_slice(&word.to_be_bytes());
	}
}

pub(crate) fn load_be32(bytes: &[u8], words: &mut [u32]) {
	for (word, chunk) in words.iter_mut().zip(bytes.chunks_exact(4)) {
		*word = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
	}
}

pub(crate) fn store_be64(words: &[u64], out: &mut [u8]) {
	for (word, bytes) in words.iter().zip(out.chunks_exact_mut(8)) {
		bytes.copy_from_slice(&word.to_be_bytes());
	}
}

pub(crate) fn load_be64(bytes: &[u8], words: &mut [u64]) {
	for (word, chunk) in words.iter_mut().zip(bytes.chunks_exact(8)) {
		let mut raw = [0u8; 8];
		raw.copy_from_slice(chunk);
		*word = u64::from_be_bytes(raw);
	}
}
