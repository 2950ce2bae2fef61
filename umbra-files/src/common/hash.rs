//! 64 bit FNV-1a, evaluated at compile time for the keyword tables of the readers.
//!
//! Readers hash every word or key once and `match` the result against `const` hashes of the keywords
//! they understand, instead of running a chain of string comparisons.

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

pub const fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET_BASIS;
    let mut i = 0;
    while i < bytes.len() {
        hash ^= bytes[i] as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
        i += 1;
    }
    hash
}

pub const fn fnv1a_str(s: &str) -> u64 {
    fnv1a(s.as_bytes())
}
