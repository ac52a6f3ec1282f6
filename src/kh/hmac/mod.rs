// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: keyedhash
// Module: hmac (keyed-hash construction, RFC 2104)
// Author: Volker Schwaberow <volker@schwaberow.de>
// Copyright (c) 2025 Volker Schwaberow

//! HMAC over any registered streaming hash.
//!
//! The template validates the underlying primitive and builds an
//! [`HmacInstance`]; the key schedule precomputes the hashed inner and outer
//! pad blocks once per key; every [`HmacSession`] resumes from those
//! checkpoints instead of re-hashing the pads.

pub mod instance;
pub mod key;
pub mod session;
pub mod template;

pub use instance::HmacInstance;
pub use session::{HmacSession, Phase};
pub use template::{
	check_structure, create, derive_descriptor, parse_template_name,
	template_name, GENERATION_BYTES, TEMPLATE_NAME,
};
