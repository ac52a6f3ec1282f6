// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: keyedhash
// File: lib.rs
// Author: Volker Schwaberow <volker@schwaberow.de>
// Copyright (c) 2025 Volker Schwaberow

//! Generic HMAC over pluggable streaming hash primitives, with a boot-time
//! known-answer gate.
//!
//! ```
//! use keyedhash::kh::registry::Registry;
//!
//! let registry = Registry::with_builtins();
//! let hmac = registry.create_hmac("sha1").unwrap();
//! hmac.set_key(b"0123456789:;<=>?@ABC").unwrap();
//! let mac = hmac.mac(b"Sample #2").unwrap();
//! assert_eq!(hex::encode(mac), "0922d3405faa3d194f82a45830737d5cc6c75d24");
//! ```

pub mod kh {
	pub mod app;
	pub mod error;
	pub mod hmac;
	pub mod primitive;
	pub mod registry;
	pub mod selftest;
}

pub use kh::error::{Error, Result};
pub use kh::hmac::{HmacInstance, HmacSession, Phase};
pub use kh::primitive::{HashAlgorithm, HashDescriptor, HashSession};
pub use kh::registry::Registry;
