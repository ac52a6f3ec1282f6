// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: keyedhash
// File: sha.rs
// Author: Volker Schwaberow <volker@schwaberow.de>

//! SHA-1 and SHA-2 primitives built on the RustCrypto compression functions.

use digest::generic_array::GenericArray;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use super::md::{
	load_be32, load_be64, store_be32, store_be64, Compression,
	MdAlgorithm,
};
use super::HashAlgorithm;

const SHA1_IV: [u32; 5] =
	[0x67452301, 0xefcdab89, 0x98badcfe, 0x10325476, 0xc3d2e1f0];

const SHA224_IV: [u32; 8] = [
	0xc1059ed8, 0x367cd507, 0x3070dd17, 0xf70e5939, 0xffc00b31,
	0x68581511, 0x64f98fa7, 0xbefa4fa4,
];

const SHA256_IV: [u32; 8] = [
	0x6a09e667, 0xbb67ae85, 0x3c6ef372, 0xa54ff53a, 0x510e527f,
	0x9b05688c, 0x1f83d9ab, 0x5be0cd19,
];

const SHA384_IV: [u64; 8] = [
	0xcbbb9d5dc1059ed8,
	0x629a292a367cd507,
	0x9159015a3070dd17,
	0x152fecd8f70e5939,
	0x67332667ffc00b31,
	0x8eb44a8768581511,
	0xdb0c2e0d64f98fa7,
	0x47b5481dbefa4fa4,
];

const SHA512_IV: [u64; 8] = [
	0x6a09e667f3bcc908,
	0xbb67ae8584caa73b,
	0x3c6ef372fe94f82b,
	0xa54ff53a5f1d36f1,
	0x510e527fade682d1,
	0x9b05688c2b3e6c1f,
	0x1f83d9abfb41bd6b,
	0x5be0cd19137e2179,
];

pub struct Sha1Compression;

impl Compression for Sha1Compression {
	const NAME: &'static str = "sha1";
	const DRIVER: &'static str = "sha1-compress";
	const PRIORITY: u32 = 100;
	const ALIGNMASK: usize = 3;
	const BLOCK_SIZE: usize = 64;
	const DIGEST_SIZE: usize = 20;
	const LENGTH_BYTES: usize = 8;
	const CHAIN_BYTES: usize = 20;

	type Chain = [u32; 5];

	fn iv() -> Self::Chain {
		SHA1_IV
	}

	fn compress(chain: &mut Self::Chain, block: &[u8]) {
		sha1::compress(
			chain,
			std::slice::from_ref(GenericArray::from_slice(block)),
		);
	}

	fn store_chain(chain: &Self::Chain, out: &mut [u8]) {
		store_be32(chain, out);
	}

	fn load_chain(bytes: &[u8]) -> Self::Chain {
		let mut chain = [0u32; 5];
		load_be32(bytes, &mut chain);
		chain
	}
}

pub struct Sha224Compression;

impl Compression for Sha224Compression {
	const NAME: &'static str = "sha224";
	const DRIVER: &'static str = "sha224-compress";
	const PRIORITY: u32 = 100;
	const ALIGNMASK: usize = 3;
	const BLOCK_SIZE: usize = 64;
	const DIGEST_SIZE: usize = 28;
	const LENGTH_BYTES: usize = 8;
	const CHAIN_BYTES: usize = 32;

	type Chain = [u32; 8];

	fn iv() -> Self::Chain {
		SHA224_IV
	}

	fn compress(chain: &mut Self::Chain, block: &[u8]) {
		compress256(chain, block);
	}

	fn store_chain(chain: &Self::Chain, out: &mut [u8]) {
		store_be32(chain, out);
	}

	fn load_chain(bytes: &[u8]) -> Self::Chain {
		let mut chain = [0u32; 8];
		load_be32(bytes, &mut chain);
		chain
	}
}

pub struct Sha256Compression;

impl Compression for Sha256Compression {
	const NAME: &'static str = "sha256";
	const DRIVER: &'static str = "sha256-compress";
	const PRIORITY: u32 = 100;
	const ALIGNMASK: usize = 3;
	const BLOCK_SIZE: usize = 64;
	const DIGEST_SIZE: usize = 32;
	const LENGTH_BYTES: usize = 8;
	const CHAIN_BYTES: usize = 32;

	type Chain = [u32; 8];

	fn iv() -> Self::Chain {
		SHA256_IV
	}

	fn compress(chain: &mut Self::Chain, block: &[u8]) {
		compress256(chain, block);
	}

	fn store_chain(chain: &Self::Chain, out: &mut [u8]) {
		store_be32(chain, out);
	}

	fn load_chain(bytes: &[u8]) -> Self::Chain {
		let mut chain = [0u32; 8];
		load_be32(bytes, &mut chain);
		chain
	}
}

pub struct Sha384Compression;

impl Compression for Sha384Compression {
	const NAME: &'static str = "sha384";
	const DRIVER: &'static str = "sha384-compress";
	const PRIORITY: u32 = 100;
	const ALIGNMASK: usize = 7;
	const BLOCK_SIZE: usize = 128;
	const DIGEST_SIZE: usize = 48;
	const LENGTH_BYTES: usize = 16;
	const CHAIN_BYTES: usize = 64;

	type Chain = [u64; 8];

	fn iv() -> Self::Chain {
		SHA384_IV
	}

	fn compress(chain: &mut Self::Chain, block: &[u8]) {
		compress512(chain, block);
	}

	fn store_chain(chain: &Self::Chain, out: &mut [u8]) {
		store_be64(chain, out);
	}

	fn load_chain(bytes: &[u8]) -> Self::Chain {
		let mut chain = [0u64; 8];
		load_be64(bytes, &mut chain);
		chain
	}
}

pub struct Sha512Compression;

impl Compression for Sha512Compression {
	const NAME: &'static str = "sha512";
	const DRIVER: &'static str = "sha512-compress";
	const PRIORITY: u32 = 100;
	const ALIGNMASK: usize = 7;
	const BLOCK_SIZE: usize = 128;
	const DIGEST_SIZE: usize = 64;
	const LENGTH_BYTES: usize = 16;
	const CHAIN_BYTES: usize = 64;

	type Chain = [u64; 8];

	fn iv() -> Self::Chain {
		SHA512_IV
	}

	fn compress(chain: &mut Self::Chain, block: &[u8]) {
		compress512(chain, block);
	}

	fn store_chain(chain: &Self::Chain, out: &mut [u8]) {
		store_be64(chain, out);
	}

	fn load_chain(bytes: &[u8]) -> Self::Chain {
		let mut chain = [0u64; 8];
		load_be64(bytes, &mut chain);
		chain
	}
}

fn compress256(chain: &mut [u32; 8], block: &[u8]) {
	sha2::compress256(
		chain,
		std::slice::from_ref(GenericArray::from_slice(block)),
	);
}

fn compress512(chain: &mut [u64; 8], block: &[u8]) {
	sha2::compress512(
		chain,
		std::slice::from_ref(GenericArray::from_slice(block)),
	);
}

pub type Sha1 = MdAlgorithm<Sha1Compression>;
pub type Sha224 = MdAlgorithm<Sha224Compression>;
pub type Sha256 = MdAlgorithm<Sha256Compression>;
pub type Sha384 = MdAlgorithm<Sha384Compression>;
pub type Sha512 = MdAlgorithm<Sha512Compression>;

/// Primitives every registry starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum BuiltinHash {
	Sha1,
	Sha224,
	Sha256,
	Sha384,
	Sha512,
}

impl BuiltinHash {
	pub fn algorithm(self) -> Box<dyn HashAlgorithm> {
		match self {
			BuiltinHash::Sha1 => Box::new(Sha1::new()),
			BuiltinHash::Sha224 => Box::new(Sha224::new()),
			BuiltinHash::Sha256 => Box::new(Sha256::new()),
			BuiltinHash::Sha384 => Box::new(Sha384::new()),
			BuiltinHash::Sha512 => Box::new(Sha512::new()),
		}
	}

	pub fn catalog() -> impl Iterator<Item = BuiltinHash> {
		BuiltinHash::iter()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::kh::primitive::HashSession;
	use hex_literal::hex;
	use sha2::Digest;

	const PHRASE: &str =
		"Jeder wackere Bayer vertilgt bequem zwo Pfund Kalbshaxen.";

	#[test]
	fn sha1_phrase() {
		let digest = Sha1::new().digest(PHRASE.as_bytes()).unwrap();
		assert_eq!(
			digest[..],
			hex!("1C90817FE5067AB226A331D4E7454858F6DD966A")
		);
	}

	#[test]
	fn sha1_empty() {
		let digest = Sha1::new().digest(b"").unwrap();
		assert_eq!(
			digest[..],
			hex!("da39a3ee5e6b4b0d3255bfef95601890afd80709")
		);
	}

	#[test]
	fn sha256_abc() {
		let digest = Sha256::new().digest(b"abc").unwrap();
		assert_eq!(
			digest[..],
			hex!("ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad")
		);
	}

	#[test]
	fn matches_rustcrypto_across_padding_boundaries() {
		for len in [0usize, 1, 55, 56, 63, 64, 65, 111, 112, 127, 128, 129, 300]
		{
			let data: Vec<u8> = (0..len).map(|i| i as u8).collect();
			assert_eq!(
				Sha1::new().digest(&data).unwrap(),
				sha1::Sha1::digest(&data).to_vec(),
				"sha1 len {}",
				len
			);
			assert_eq!(
				Sha224::new().digest(&data).unwrap(),
				sha2::Sha224::digest(&data).to_vec(),
				"sha224 len {}",
				len
			);
			assert_eq!(
				Sha256::new().digest(&data).unwrap(),
				sha2::Sha256::digest(&data).to_vec(),
				"sha256 len {}",
				len
			);
			assert_eq!(
				Sha384::new().digest(&data).unwrap(),
				sha2::Sha384::digest(&data).to_vec(),
				"sha384 len {}",
				len
			);
			assert_eq!(
				Sha512::new().digest(&data).unwrap(),
				sha2::Sha512::digest(&data).to_vec(),
				"sha512 len {}",
				len
			);
		}
	}

	#[test]
	fn export_import_resumes_mid_block() {
		let algorithm = Sha256::new();
		let mut first = algorithm.new_session().unwrap();
		first.init().unwrap();
		first.update(&[7u8; 100]).unwrap();
		let state = first.export().unwrap();
		assert_eq!(state.len(), algorithm.descriptor().state_size);

		let mut second = algorithm.new_session().unwrap();
		second.import(&state).unwrap();
		second.update(b"tail").unwrap();
		first.update(b"tail").unwrap();
		assert_eq!(first.finalize().unwrap(), second.finalize().unwrap());
	}

	#[test]
	fn import_rejects_wrong_length() {
		let mut session = Sha1::new().new_session().unwrap();
		let err = session.import(&[0u8; 12]).unwrap_err();
		assert!(matches!(
			err,
			crate::kh::error::Error::IncompatibleState {
				expected: 92,
				actual: 12
			}
		));
	}

	#[test]
	fn builtin_names_parse() {
		assert_eq!("SHA256".parse::<BuiltinHash>().unwrap(), BuiltinHash::Sha256);
		assert_eq!(BuiltinHash::Sha1.to_string(), "sha1");
		assert_eq!(BuiltinHash::catalog().count(), 5);
	}

	#[test]
	fn descriptors_hold_hmac_constraints() {
		for builtin in BuiltinHash::catalog() {
			let algorithm = builtin.algorithm();
			let d = algorithm.descriptor();
			assert!(d.digest_size <= d.block_size, "{}", d.name);
			assert!(d.state_size >= d.block_size, "{}", d.name);
		}
	}
}
