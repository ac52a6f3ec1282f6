// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: keyedhash
// File: key.rs
// Author: Volker Schwaberow <volker@schwaberow.de>

//! HMAC key schedule: pad derivation and the hashed pad checkpoints.

use zeroize::Zeroizing;

use crate::kh::error::{Error, Result};
use crate::kh::primitive::HashAlgorithm;

pub const IPAD_BYTE: u8 = 0x36;
pub const OPAD_BYTE: u8 = 0x5c;

/// Exported underlying states after absorbing one pad block each.
pub struct Checkpoints {
	pub inner: Zeroizing<Vec<u8>>,
	pub outer: Zeroizing<Vec<u8>>,
}

/// Keys longer than a block are replaced by their digest; the result is
/// zero-padded to exactly one block.
pub fn effective_key(
	underlying: &dyn HashAlgorithm,
	key: &[u8],
) -> Result<Zeroizing<Vec<u8>>> {
	let block_size = underlying.descriptor().block_size;
	let mut block = Zeroizing::new(vec![0u8; block_size]);
	if key.len() > block_size {
		let digest = Zeroizing::new(underlying.digest(key)?);
		block
			.get_mut(..digest.len())
			.ok_or_else(|| {
				Error::instantiation(
					underlying.descriptor().name.clone(),
					"digest longer than block",
				)
			})?
			.copy_from_slice(&digest);
	} else {
		block[..key.len()].copy_from_slice(key);
	}
	Ok(block)
}

/// Returns `(ipad, opad)` for a block-sized effective key.
pub fn pads(
	effective_key: &[u8],
) -> (Zeroizing<Vec<u8>>, Zeroizing<Vec<u8>>) {
	let ipad = effective_key.iter().map(|b| b ^ IPAD_BYTE).collect();
	let opad = effective_key.iter().map(|b| b ^ OPAD_BYTE).collect();
	(Zeroizing::new(ipad), Zeroizing::new(opad))
}

/// Runs the full schedule; any primitive failure is a `KeyScheduleFailed`.
pub fn schedule(
	underlying: &dyn HashAlgorithm,
	key: &[u8],
) -> Result<Checkpoints> {
	derive(underlying, key)
		.map_err(|err| Error::KeyScheduleFailed(Box::new(err)))
}

fn derive(underlying: &dyn HashAlgorithm, key: &[u8]) -> Result<Checkpoints> {
	let block = effective_key(underlying, key)?;
	let (ipad, opad) = pads(&block);

	let mut session = underlying.new_session()?;
	session.init()?;
	session.update(&ipad)?;
	let inner = Zeroizing::new(session.export()?);
	session.init()?;
	session.update(&opad)?;
	let outer = Zeroizing::new(session.export()?);

	Ok(Checkpoints { inner, outer })
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::kh::primitive::sha::{Sha1, Sha256};
	use crate::kh::primitive::HashSession;

	#[test]
	fn long_key_is_hashed() {
		let sha1 = Sha1::new();
		let key = [0xaau8; 80];
		let block = effective_key(&sha1, &key).unwrap();
		let digest = sha1.digest(&key).unwrap();
		assert_eq!(block.len(), 64);
		assert_eq!(&block[..20], &digest[..]);
		assert!(block[20..].iter().all(|b| *b == 0));
	}

	#[test]
	fn short_key_is_zero_padded() {
		let sha256 = Sha256::new();
		let block = effective_key(&sha256, b"Jefe").unwrap();
		assert_eq!(&block[..4], b"Jefe");
		assert!(block[4..].iter().all(|b| *b == 0));
	}

	#[test]
	fn block_sized_key_is_used_verbatim() {
		let sha1 = Sha1::new();
		let key = [0x11u8; 64];
		let block = effective_key(&sha1, &key).unwrap();
		assert_eq!(&block[..], &key[..]);
	}

	#[test]
	fn empty_key_equals_zero_block() {
		let sha1 = Sha1::new();
		let empty = schedule(&sha1, b"").unwrap();
		let zeros = schedule(&sha1, &[0u8; 64]).unwrap();
		assert_eq!(*empty.inner, *zeros.inner);
		assert_eq!(*empty.outer, *zeros.outer);
	}

	#[test]
	fn pads_xor_constants() {
		let (ipad, opad) = pads(&[0x00, 0xff, 0x36]);
		assert_eq!(&ipad[..], &[0x36, 0xc9, 0x00]);
		assert_eq!(&opad[..], &[0x5c, 0xa3, 0x6a]);
	}

	#[test]
	fn checkpoints_resume_pad_hash() {
		let sha1 = Sha1::new();
		let checkpoints = schedule(&sha1, b"key").unwrap();
		let (ipad, _) = pads(&effective_key(&sha1, b"key").unwrap());

		let mut resumed = sha1.new_session().unwrap();
		resumed.import(&checkpoints.inner).unwrap();
		let from_checkpoint = resumed.finup(b"message").unwrap();

		let mut direct = sha1.new_session().unwrap();
		direct.init().unwrap();
		direct.update(&ipad).unwrap();
		let from_scratch = direct.finup(b"message").unwrap();
		assert_eq!(from_checkpoint, from_scratch);
	}
}
