//! HMAC-SHA1 following RFC 2104
//!
//! The OTP truncation in this crate must match the server's OATH
//! reference implementation bit-for-bit, so the MAC construction is
//! spelled out here over the bare SHA-1 digest rather than hidden
//! behind a higher-level crate.
//!
//! Reference: https://www.ietf.org/rfc/rfc2104.txt
//! Block size: 64 bytes for SHA-1
//! Inner pad (ipad): 0x36
//! Outer pad (opad): 0x5C

use sha1::{Digest, Sha1};

const BLOCK_SIZE: usize = 64;
const IPAD: u8 = 0x36;
const OPAD: u8 = 0x5C;

/// Compute HMAC-SHA1 over `message` with `key`
///
/// Keys longer than the 64-byte block are hashed first; shorter keys
/// are zero-padded to the block size, per RFC 2104.
pub fn hmac_sha1(key: &[u8], message: &[u8]) -> [u8; 20] {
    let mut key_block = [0u8; BLOCK_SIZE];

    if key.len() > BLOCK_SIZE {
        let digest = Sha1::digest(key);
        key_block[..digest.len()].copy_from_slice(&digest);
    } else {
        key_block[..key.len()].copy_from_slice(key);
    }

    let mut ipad_key = [0u8; BLOCK_SIZE];
    let mut opad_key = [0u8; BLOCK_SIZE];

    for (i, byte) in key_block.iter().enumerate() {
        ipad_key[i] = byte ^ IPAD;
        opad_key[i] = byte ^ OPAD;
    }

    let mut inner = Sha1::new();
    inner.update(ipad_key);
    inner.update(message);
    let inner_hash = inner.finalize();

    let mut outer = Sha1::new();
    outer.update(opad_key);
    outer.update(inner_hash);

    outer.finalize().into()
}
