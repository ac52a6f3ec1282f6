// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: keyedhash
// File: vectors.rs
// Author: Volker Schwaberow <volker@schwaberow.de>

//! Known-answer vectors for the HMAC construction.

use hex_literal::hex;

#[derive(Debug, Clone, Copy)]
pub struct KnownAnswer {
	/// Identifier matched by the forced-failure switch, e.g. `hmac-sha1`.
	pub identifier: &'static str,
	/// Label used in fault reasons, e.g. `HMAC-SHA1`.
	pub display_name: &'static str,
	/// Registry name of the underlying primitive.
	pub underlying: &'static str,
	pub key: &'static [u8],
	pub message: &'static [u8],
	pub expected: &'static [u8],
}

/// The vector the boot watchdog gates on.
pub const HMAC_SHA1_SAMPLE_2: KnownAnswer = KnownAnswer {
	identifier: "hmac-sha1",
	display_name: "HMAC-SHA1",
	underlying: "sha1",
	key: b"0123456789:;<=>?@ABC",
	message: b"Sample #2",
	expected: &hex!("0922d3405faa3d194f82a45830737d5cc6c75d24"),
};

const RFC2202_SHA1_CASE_1: KnownAnswer = KnownAnswer {
	identifier: "hmac-sha1-rfc2202-1",
	display_name: "HMAC-SHA1",
	underlying: "sha1",
	key: &[0x0b; 20],
	message: b"Hi There",
	expected: &hex!("b617318655057264e28bc0b6fb378c8ef146be00"),
};

const RFC2202_SHA1_CASE_2: KnownAnswer = KnownAnswer {
	identifier: "hmac-sha1-rfc2202-2",
	display_name: "HMAC-SHA1",
	underlying: "sha1",
	key: b"Jefe",
	message: b"what do ya want for nothing?",
	expected: &hex!("effcdf6ae5eb2fa2d27416d5f184df9c259a7c79"),
};

const RFC4231_SHA224_CASE_2: KnownAnswer = KnownAnswer {
	identifier: "hmac-sha224",
	display_name: "HMAC-SHA224",
	underlying: "sha224",
	key: b"Jefe",
	message: b"what do ya want for nothing?",
	expected: &hex!(
		"a30e01098bc6dbbf45690f3a7e9e6d0f8bbea2a39e6148008fd05e44"
	),
};

const RFC4231_SHA256_CASE_2: KnownAnswer = KnownAnswer {
	identifier: "hmac-sha256",
	display_name: "HMAC-SHA256",
	underlying: "sha256",
	key: b"Jefe",
	message: b"what do ya want for nothing?",
	expected: &hex!(
		"5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
	),
};

const RFC4231_SHA384_CASE_2: KnownAnswer = KnownAnswer {
	identifier: "hmac-sha384",
	display_name: "HMAC-SHA384",
	underlying: "sha384",
	key: b"Jefe",
	message: b"what do ya want for nothing?",
	expected: &hex!(
		"af45d2e376484031617f78d2b58a6b1b9c7ef464f5a01b47e42ec3736322445e8e2240ca5e69e2c78b3239ecfab21649"
	),
};

const RFC4231_SHA512_CASE_2: KnownAnswer = KnownAnswer {
	identifier: "hmac-sha512",
	display_name: "HMAC-SHA512",
	underlying: "sha512",
	key: b"Jefe",
	message: b"what do ya want for nothing?",
	expected: &hex!(
		"164b7a7bfcf819e2e395fbe73b56e0a387bd64222e831fd610270cd7ea2505549758bf75c05a994a6d034f65f8f0e6fdcaeab1a34d4a6b4b636e070a38bce737"
	),
};

pub fn catalog() -> &'static [KnownAnswer] {
	const VECTORS: &[KnownAnswer] = &[
		HMAC_SHA1_SAMPLE_2,
		RFC2202_SHA1_CASE_1,
		RFC2202_SHA1_CASE_2,
		RFC4231_SHA224_CASE_2,
		RFC4231_SHA256_CASE_2,
		RFC4231_SHA384_CASE_2,
		RFC4231_SHA512_CASE_2,
	];
	VECTORS
}

pub fn find(identifier: &str) -> Option<&'static KnownAnswer> {
	catalog()
		.iter()
		.find(|v| v.identifier.eq_ignore_ascii_case(identifier))
}
