//! Password hashing.
//!
//! Salted SHA-256, stored as `hex(salt)$hex(digest)`. The algorithm choice
//! is intentionally simple; swapping it only touches this module.

use rand::RngCore;
use sha2::{Digest, Sha256};

const SALT_BYTES: usize = 16;

pub fn hash_password(plain: &str) -> String {
    let mut salt = [0u8; SALT_BYTES];
    rand::thread_rng().fill_bytes(&mut salt);
    let digest = salted_digest(&salt, plain);
    format!("{}${}", hex::encode(salt), hex::encode(digest))
}

pub fn verify_password(plain: &str, stored: &str) -> bool {
    let Some((salt_hex, digest_hex)) = stored.split_once('$') else {
        return false;
    };
    let Ok(salt) = hex::decode(salt_hex) else {
        return false;
    };
    hex::encode(salted_digest(&salt, plain)) == digest_hex
}

fn salted_digest(salt: &[u8], plain: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(plain.as_bytes());
    hasher.finalize().into()
}
