//! Lisk addresses: 20 raw bytes and their `lsk…` lisk32 rendering.
//!
//! lisk32 is base32 over a custom alphabet with a 6-character BCH checksum
//! (the bech32 generator polynomial, without the human-readable part).

use bech32::primitives::checksum::{Checksum, Engine};
use bech32::primitives::iter::{ByteIterExt, Fe32IterExt};
use bech32::{Bech32, Fe32};
use sha2::{Digest, Sha256};

use crate::blockchain::types::{ChainError, ChainResult};

const PREFIX: &str = "lsk";
const CHARSET: &[u8; 32] = b"zxvcpmbn3465o978uyrtkqew2adsjhfg";

/// Length of a binary Lisk address.
pub const ADDRESS_LENGTH: usize = 20;

/// Data characters in an address body; the checksum follows.
const DATA_LENGTH: usize = 32;

/// Binary address of an ed25519 public key: first 20 bytes of its SHA-256.
pub fn address_from_public_key(public_key: &[u8; 32]) -> [u8; ADDRESS_LENGTH] {
    let digest = Sha256::digest(public_key);
    let mut address = [0u8; ADDRESS_LENGTH];
    address.copy_from_slice(&digest[..ADDRESS_LENGTH]);
    address
}

/// lisk32 rendering of an ed25519 public key's address.
pub fn lisk32_from_public_key(public_key: &[u8; 32]) -> String {
    encode_lisk32(&address_from_public_key(public_key))
}

// No human-readable part is fed to the checksum.
fn checksum_engine(groups: &[Fe32]) -> Engine<Bech32> {
    let mut engine = Engine::new();
    for group in groups {
        engine.input_fe(*group);
    }
    engine
}

/// Encode a binary address as lisk32.
pub fn encode_lisk32(address: &[u8; ADDRESS_LENGTH]) -> String {
    let groups: Vec<Fe32> = address.iter().copied().bytes_to_fes().collect();
    let mut engine = checksum_engine(&groups);
    engine.input_target_residue();
    let residue = *engine.residue();
    let checksum = (0..Bech32::CHECKSUM_LENGTH).map(|i| {
        ((residue >> (5 * (Bech32::CHECKSUM_LENGTH - 1 - i))) & 31) as u8
    });

    let body: String = groups
        .iter()
        .map(|g| g.to_u8())
        .chain(checksum)
        .map(|g| CHARSET[usize::from(g)] as char)
        .collect();
    format!("{}{}", PREFIX, body)
}

/// Decode a lisk32 address, verifying prefix, alphabet, and checksum.
pub fn decode_lisk32(address: &str) -> ChainResult<[u8; ADDRESS_LENGTH]> {
    let invalid = |reason: &str| ChainError::InvalidAddress {
        address: address.to_string(),
        reason: reason.to_string(),
    };

    let body = address
        .strip_prefix(PREFIX)
        .ok_or_else(|| invalid("missing lsk prefix"))?;
    if body.len() != 38 {
        return Err(invalid("expected 38 characters after the prefix"));
    }

    let groups = body
        .bytes()
        .map(|c| {
            CHARSET
                .iter()
                .position(|x| *x == c)
                .and_then(|p| Fe32::try_from(p as u8).ok())
        })
        .collect::<Option<Vec<Fe32>>>()
        .ok_or_else(|| invalid("character outside the lisk32 alphabet"))?;

    if *checksum_engine(&groups).residue() != Bech32::TARGET_RESIDUE {
        return Err(invalid("checksum mismatch"));
    }

    let bytes: Vec<u8> = groups[..DATA_LENGTH].iter().copied().fes_to_bytes().collect();
    <[u8; ADDRESS_LENGTH]>::try_from(bytes.as_slice())
        .map_err(|_| invalid("unexpected payload length"))
}
