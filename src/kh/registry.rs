// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: keyedhash
// File: registry.rs
// Author: Volker Schwaberow <volker@schwaberow.de>
// Copyright (c) 2025 Volker Schwaberow

//! Named-algorithm catalog. Plain names resolve to registered factories;
//! `hmac(<inner>)` names resolve through the HMAC template, recursively.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::kh::error::{Error, Result};
use crate::kh::hmac::{self, HmacInstance};
use crate::kh::primitive::sha::BuiltinHash;
use crate::kh::primitive::{HashAlgorithm, HashDescriptor};

pub type AlgorithmFactory =
	Arc<dyn Fn() -> Result<Box<dyn HashAlgorithm>> + Send + Sync>;

pub fn factory<F>(f: F) -> AlgorithmFactory
where
	F: Fn() -> Result<Box<dyn HashAlgorithm>> + Send + Sync + 'static,
{
	Arc::new(f)
}

#[derive(Clone)]
pub struct AlgorithmEntry {
	pub descriptor: HashDescriptor,
	factory: AlgorithmFactory,
}

impl AlgorithmEntry {
	pub fn new(
		descriptor: HashDescriptor,
		factory: AlgorithmFactory,
	) -> Self {
		Self {
			descriptor,
			factory,
		}
	}

	pub fn instantiate(&self) -> Result<Box<dyn HashAlgorithm>> {
		(self.factory)()
	}
}

impl std::fmt::Debug for AlgorithmEntry {
	fn fmt(
		&self,
		f: &mut std::fmt::Formatter<'_>,
	) -> std::fmt::Result {
		f.debug_struct("AlgorithmEntry")
			.field("descriptor", &self.descriptor)
			.finish_non_exhaustive()
	}
}

#[derive(Default)]
pub struct Registry {
	entries: RwLock<BTreeMap<String, AlgorithmEntry>>,
}

impl Registry {
	pub fn empty() -> Self {
		Self::default()
	}

	/// Registry preloaded with the SHA-1/SHA-2 primitives.
	pub fn with_builtins() -> Self {
		let registry = Self::empty();
		for builtin in BuiltinHash::catalog() {
			let descriptor = builtin.algorithm().descriptor().clone();
			let spawn = factory(move || Ok(builtin.algorithm()));
			registry.entries.write().insert(
				descriptor.name.clone(),
				AlgorithmEntry::new(descriptor, spawn),
			);
		}
		registry
	}

	pub fn register(
		&self,
		descriptor: HashDescriptor,
		factory: AlgorithmFactory,
	) -> Result<()> {
		let mut entries = self.entries.write();
		if entries.contains_key(&descriptor.name) {
			return Err(Error::AlreadyRegistered {
				name: descriptor.name,
			});
		}
		info!(
			name = %descriptor.name,
			driver = %descriptor.driver,
			"registered hash algorithm"
		);
		entries.insert(
			descriptor.name.clone(),
			AlgorithmEntry::new(descriptor, factory),
		);
		Ok(())
	}

	/// Registers an algorithm value; every lookup hands out a clone.
	pub fn register_algorithm<A>(&self, algorithm: A) -> Result<()>
	where
		A: HashAlgorithm + Clone + 'static,
	{
		let descriptor = algorithm.descriptor().clone();
		self.register(
			descriptor,
			factory(move || Ok(Box::new(algorithm.clone()))),
		)
	}

	/// Registers an HMAC instance back into the catalog under `name`.
	///
	/// Handles resolved from `name` share the instance's key material, so
	/// the instance can serve as the underlying primitive of another HMAC.
	pub fn register_instance(
		&self,
		name: &str,
		instance: &HmacInstance,
	) -> Result<()> {
		let mut descriptor = instance.descriptor().clone();
		descriptor.name = name.to_string();
		let instance = instance.clone();
		self.register(
			descriptor,
			factory(move || Ok(Box::new(instance.clone()))),
		)
	}

	pub fn unregister(&self, name: &str) -> bool {
		self.entries.write().remove(name).is_some()
	}

	pub fn lookup(&self, name: &str) -> Option<AlgorithmEntry> {
		self.entries.read().get(name).cloned()
	}

	pub fn names(&self) -> Vec<String> {
		self.entries.read().keys().cloned().collect()
	}

	pub fn descriptors(&self) -> Vec<HashDescriptor> {
		self.entries
			.read()
			.values()
			.map(|entry| entry.descriptor.clone())
			.collect()
	}

	/// Resolves metadata for `name` without instantiating anything.
	pub fn resolve_descriptor(
		&self,
		name: &str,
	) -> Result<HashDescriptor> {
		if let Some(entry) = self.lookup(name) {
			return Ok(entry.descriptor);
		}
		match hmac::parse_template_name(name) {
			Some(inner) => {
				hmac::derive_descriptor(&self.resolve_descriptor(inner)?)
			}
			None => Err(Error::UnknownAlgorithm(name.to_string())),
		}
	}

	pub fn instantiate(
		&self,
		name: &str,
	) -> Result<Box<dyn HashAlgorithm>> {
		if let Some(entry) = self.lookup(name) {
			debug!(name, "instantiating registered algorithm");
			return entry.instantiate();
		}
		match hmac::parse_template_name(name) {
			Some(inner) => Ok(Box::new(self.create_hmac(inner)?)),
			None => Err(Error::UnknownAlgorithm(name.to_string())),
		}
	}

	/// `create_hmac("sha1")` builds an `hmac(sha1)` instance.
	pub fn create_hmac(
		&self,
		underlying: &str,
	) -> Result<HmacInstance> {
		hmac::create(self, underlying)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn builtins_are_listed() {
		let registry = Registry::with_builtins();
		assert_eq!(
			registry.names(),
			vec!["sha1", "sha224", "sha256", "sha384", "sha512"]
		);
	}

	#[test]
	fn unknown_name_is_reported() {
		let registry = Registry::with_builtins();
		assert!(matches!(
			registry.instantiate("md5"),
			Err(Error::UnknownAlgorithm(name)) if name == "md5"
		));
		assert!(matches!(
			registry.create_hmac("whirlpool"),
			Err(Error::UnknownAlgorithm(_))
		));
	}

	#[test]
	fn duplicate_registration_fails() {
		let registry = Registry::with_builtins();
		let descriptor =
			BuiltinHash::Sha1.algorithm().descriptor().clone();
		let err = registry
			.register(
				descriptor,
				factory(|| Ok(BuiltinHash::Sha1.algorithm())),
			)
			.unwrap_err();
		assert!(matches!(err, Error::AlreadyRegistered { .. }));
	}

	#[test]
	fn template_descriptor_resolves_without_instance() {
		let registry = Registry::with_builtins();
		let d =
			registry.resolve_descriptor("hmac(hmac(sha256))").unwrap();
		assert_eq!(d.name, "hmac(hmac(sha256))");
		assert_eq!(d.digest_size, 32);
		assert_eq!(d.block_size, 64);
	}

	#[test]
	fn unregister_removes_entry() {
		let registry = Registry::with_builtins();
		assert!(registry.unregister("sha224"));
		assert!(!registry.unregister("sha224"));
		assert!(registry.lookup("sha224").is_none());
	}
}
