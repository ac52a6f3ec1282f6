// SPDX-License-Identifier: MIT OR Apache-2.0
// Project: keyedhash

use std::thread;

use keyedhash::kh::registry::Registry;
use keyedhash::{Error, HashSession};

#[test]
fn sessions_share_one_instance_across_threads() {
	let registry = Registry::with_builtins();
	let hmac = registry.create_hmac("sha256").unwrap();
	hmac.set_key(b"shared key").unwrap();
	let expected: Vec<Vec<u8>> = (0..8u8)
		.map(|i| hmac.mac(&[i; 1000]).unwrap())
		.collect();

	let handles: Vec<_> = (0..8u8)
		.map(|i| {
			let hmac = hmac.clone();
			thread::spawn(move || {
				let mut session = hmac.open_session().unwrap();
				session.init().unwrap();
				for chunk in [i; 1000].chunks(37) {
					session.update(chunk).unwrap();
				}
				session.finalize().unwrap()
			})
		})
		.collect();

	for (handle, expected) in handles.into_iter().zip(expected) {
		assert_eq!(handle.join().unwrap(), expected);
	}
	assert_eq!(hmac.streaming_sessions(), 0);
}

#[test]
fn try_set_key_refuses_while_streaming() {
	let registry = Registry::with_builtins();
	let hmac = registry.create_hmac("sha1").unwrap();
	hmac.set_key(b"first").unwrap();

	let mut session = hmac.open_session().unwrap();
	session.init().unwrap();
	assert!(matches!(
		hmac.try_set_key(b"second"),
		Err(Error::ConcurrentRekey { active: 1 })
	));
	let mac = session.finup(b"payload").unwrap();
	assert_eq!(mac, hmac.mac(b"payload").unwrap());

	hmac.try_set_key(b"second").unwrap();
	assert_eq!(hmac.key_generation(), 2);
}

#[test]
fn set_key_rotation_is_detected_by_in_flight_sessions() {
	let registry = Registry::with_builtins();
	let hmac = registry.create_hmac("sha1").unwrap();
	hmac.set_key(b"old").unwrap();

	let mut stale = hmac.open_session().unwrap();
	stale.init().unwrap();
	stale.update(b"half").unwrap();
	let parked = stale.export().unwrap();
	assert_eq!(parked.len(), 100);

	hmac.set_key(b"new").unwrap();
	assert!(matches!(stale.finup(b" done"), Err(Error::KeyRotated)));
	assert!(matches!(stale.export(), Err(Error::KeyRotated)));

	// fresh sessions see only the new key
	let mut fresh = hmac.open_session().unwrap();
	fresh.init().unwrap();
	let new_mac = fresh.finup(b"half done").unwrap();
	assert_eq!(new_mac, hmac.mac(b"half done").unwrap());
	drop(stale);
	assert_eq!(hmac.streaming_sessions(), 0);
}

#[test]
fn state_parked_before_rotation_cannot_resume() {
	let registry = Registry::with_builtins();
	let hmac = registry.create_hmac("sha1").unwrap();
	hmac.set_key(b"old").unwrap();

	let mut parked_session = hmac.open_session().unwrap();
	parked_session.init().unwrap();
	parked_session.update(b"half").unwrap();
	let parked = parked_session.export().unwrap();

	hmac.set_key(b"new").unwrap();
	let mut fresh = hmac.open_session().unwrap();
	assert!(matches!(fresh.import(&parked), Err(Error::KeyRotated)));
	assert!(matches!(
		parked_session.import(&parked),
		Err(Error::KeyRotated)
	));

	// reinstalling the same key bytes is still a new generation
	hmac.set_key(b"old").unwrap();
	assert!(matches!(fresh.import(&parked), Err(Error::KeyRotated)));
	assert_eq!(hmac.streaming_sessions(), 0);

	// a state taken under the current key resumes normally
	let mut current = hmac.open_session().unwrap();
	current.init().unwrap();
	current.update(b"half").unwrap();
	fresh.import(&current.export().unwrap()).unwrap();
	assert_eq!(
		fresh.finup(b" done").unwrap(),
		hmac.mac(b"half done").unwrap()
	);
}

#[test]
fn clones_share_key_material() {
	let registry = Registry::with_builtins();
	let hmac = registry.create_hmac("sha224").unwrap();
	let handle = hmac.clone();
	handle.set_key(b"through the clone").unwrap();
	assert!(hmac.is_keyed());
	assert_eq!(
		hmac.mac(b"m").unwrap(),
		handle.mac(b"m").unwrap()
	);
}
