// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: keyedhash
// File: template.rs
// Author: Volker Schwaberow <volker@schwaberow.de>

//! `hmac(<inner>)` template: structural validation and metadata derivation.

use tracing::debug;

use super::instance::HmacInstance;
use crate::kh::error::{Error, Result};
use crate::kh::primitive::HashDescriptor;
use crate::kh::registry::Registry;

pub const TEMPLATE_NAME: &str = "hmac";

/// Big-endian key generation trailing every exported HMAC state.
pub const GENERATION_BYTES: usize = 8;

pub fn template_name(inner: &str) -> String {
	format!("{}({})", TEMPLATE_NAME, inner)
}

/// Returns the inner name of `hmac(<inner>)`, or `None` for other names.
pub fn parse_template_name(name: &str) -> Option<&str> {
	let inner = name
		.strip_prefix(TEMPLATE_NAME)?
		.strip_prefix('(')?
		.strip_suffix(')')?;
	if inner.is_empty() {
		None
	} else {
		Some(inner)
	}
}

pub fn check_structure(descriptor: &HashDescriptor) -> Result<()> {
	if descriptor.digest_size > descriptor.block_size
		|| descriptor.state_size < descriptor.block_size
	{
		return Err(Error::StructuralMismatch {
			name: descriptor.name.clone(),
			digest_size: descriptor.digest_size,
			block_size: descriptor.block_size,
			state_size: descriptor.state_size,
		});
	}
	Ok(())
}

/// Metadata of `hmac(<underlying>)`.
pub fn derive_descriptor(
	underlying: &HashDescriptor,
) -> Result<HashDescriptor> {
	check_structure(underlying)?;
	Ok(HashDescriptor {
		name: template_name(&underlying.name),
		driver: template_name(&underlying.driver),
		priority: underlying.priority,
		block_size: underlying.block_size,
		digest_size: underlying.digest_size,
		state_size: align_up(
			underlying.state_size + GENERATION_BYTES,
			underlying.alignmask,
		),
		descriptor_size: underlying.descriptor_size,
		alignmask: underlying.alignmask,
	})
}

fn align_up(size: usize, alignmask: usize) -> usize {
	(size + alignmask) & !alignmask
}

/// Builds an unkeyed `hmac(<underlying>)` instance.
///
/// The structure check runs on registry metadata before the underlying
/// primitive is instantiated.
pub fn create(
	registry: &Registry,
	underlying: &str,
) -> Result<HmacInstance> {
	let descriptor =
		derive_descriptor(&registry.resolve_descriptor(underlying)?)?;
	let algorithm =
		registry.instantiate(underlying).map_err(|err| match err {
			passthrough @ (Error::UnknownAlgorithm(_)
			| Error::StructuralMismatch { .. }
			| Error::InstantiationFailed { .. }) => passthrough,
			other => {
				Error::instantiation(underlying, other.to_string())
			}
		})?;
	debug!(name = %descriptor.name, "created hmac instance");
	HmacInstance::from_parts(descriptor, algorithm)
}
