//! Address derivation from public keys.
//!
//! Address format: `psp_` + base32(public_key, 52 chars) + base32(checksum, 8 chars)
//!
//! Checksum: first 5 bytes of Blake2b-256(public_key).
//! Base32 alphabet: `13456789abcdefghijkmnopqrstuwxyz` (avoids ambiguous chars).
//! Total address length: 4 (prefix) + 52 + 8 = 64 characters.

use passport_types::{Address, PublicKey};

const BASE32_ALPHABET: &[u8; 32] = b"13456789abcdefghijkmnopqrstuwxyz";

/// ASCII byte → 5-bit value (0xFF = invalid).
const BASE32_DECODE: [u8; 128] = {
    let mut table = [0xFFu8; 128];
    let mut i = 0;
    while i < 32 {
        table[BASE32_ALPHABET[i] as usize] = i as u8;
        i += 1;
    }
    table
};

const PUBKEY_CHARS: usize = 52;
const CHECKSUM_CHARS: usize = 8;
const CHECKSUM_BYTES: usize = 5;

fn encode_base32(bytes: &[u8]) -> String {
    let mut result = String::with_capacity((bytes.len() * 8).div_ceil(5));
    let mut buffer: u64 = 0;
    let mut bits = 0;

    for &byte in bytes {
        buffer = (buffer << 8) | byte as u64;
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            result.push(BASE32_ALPHABET[((buffer >> bits) & 0x1F) as usize] as char);
        }
    }
    if bits > 0 {
        result.push(BASE32_ALPHABET[((buffer << (5 - bits)) & 0x1F) as usize] as char);
    }
    result
}

/// Decode into exactly `N` bytes; trailing pad bits are ignored.
fn decode_base32_fixed<const N: usize>(s: &str) -> Option<[u8; N]> {
    let mut buffer: u64 = 0;
    let mut bits = 0;
    let mut result = [0u8; N];
    let mut pos = 0;

    for c in s.bytes() {
        let val = *BASE32_DECODE.get(c as usize)?;
        if val == 0xFF {
            return None;
        }
        buffer = (buffer << 5) | val as u64;
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            if pos < N {
                result[pos] = (buffer >> bits) as u8;
                pos += 1;
            }
        }
    }
    (pos == N).then_some(result)
}

fn checksum(public_key: &[u8; 32]) -> [u8; CHECKSUM_BYTES] {
    let hash = crate::blake2b_256(public_key);
    let mut out = [0u8; CHECKSUM_BYTES];
    out.copy_from_slice(&hash[..CHECKSUM_BYTES]);
    out
}

/// Derive the `psp_` address of a public key.
pub fn derive_address(public_key: &PublicKey) -> Address {
    let body = encode_base32(public_key.as_bytes());
    let check = encode_base32(&checksum(public_key.as_bytes()));
    Address::new(format!("{}{}{}", Address::PREFIX, body, check))
}

/// Recover the public key encoded in an address.
///
/// Returns `None` if the address is malformed or its checksum does not match.
pub fn decode_address(address: &Address) -> Option<PublicKey> {
    let encoded = address.as_str().strip_prefix(Address::PREFIX)?;
    if encoded.len() != PUBKEY_CHARS + CHECKSUM_CHARS {
        return None;
    }
    let (body, check) = encoded.split_at(PUBKEY_CHARS);
    let key: [u8; 32] = decode_base32_fixed(body)?;
    let sum: [u8; CHECKSUM_BYTES] = decode_base32_fixed(check)?;
    (sum == checksum(&key)).then_some(PublicKey(key))
}

/// Whether an address is well-formed and its checksum is correct.
pub fn validate_address(address: &Address) -> bool {
    decode_address(address).is_some()
}
