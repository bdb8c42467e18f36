use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const HASH_SIZE: usize = 32;

pub const ZERO_HASH: Hash = Hash([0u8; HASH_SIZE]);

/// A 32-byte block hash.
///
/// Proof-of-work reads it as a 256-bit integer made of four little-endian `u64`
/// words, word 0 being the lowest-order 8 bytes.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Hash([u8; HASH_SIZE]);

impl Hash {
    pub const fn from_bytes(bytes: [u8; HASH_SIZE]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; HASH_SIZE] {
        &self.0
    }

    /// Constructs a hash from four little-endian words.
    pub const fn from_le_u64(words: [u64; 4]) -> Self {
        let mut bytes = [0u8; HASH_SIZE];
        let mut i = 0;
        while i < 4 {
            let le = words[i].to_le_bytes();
            let mut j = 0;
            while j < 8 {
                bytes[i * 8 + j] = le[j];
                j += 1;
            }
            i += 1;
        }
        Self(bytes)
    }

    /// Splits the hash into its four little-endian words, lowest first.
    pub fn to_le_u64(&self) -> [u64; 4] {
        let mut words = [0u64; 4];
        for (word, chunk) in words.iter_mut().zip(self.0.chunks_exact(8)) {
            let mut le = [0u8; 8];
            le.copy_from_slice(chunk);
            *word = u64::from_le_bytes(le);
        }
        words
    }

    pub fn try_from_slice(slice: &[u8]) -> Result<Self, std::array::TryFromSliceError> {
        let array: [u8; HASH_SIZE] = slice.try_into()?;
        Ok(Self(array))
    }
}

impl From<[u8; HASH_SIZE]> for Hash {
    fn from(bytes: [u8; HASH_SIZE]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", hex::encode(self.0))
    }
}

impl FromStr for Hash {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; HASH_SIZE];
        hex::decode_to_slice(s, &mut bytes)?;
        Ok(Self(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_words_are_little_endian() {
        let hash = Hash::from_le_u64([1, 2, 3, 0x0102_0304_0506_0708]);
        assert_eq!(hash.as_bytes()[0], 1);
        assert_eq!(hash.as_bytes()[8], 2);
        assert_eq!(hash.as_bytes()[31], 0x01);
        assert_eq!(hash.to_le_u64(), [1, 2, 3, 0x0102_0304_0506_0708]);
    }

    #[test]
    fn test_hex_roundtrip() {
        let hash = Hash::from_le_u64([u64::MAX, 0, 7, 1 << 63]);
        let parsed: Hash = hash.to_string().parse().unwrap();
        assert_eq!(parsed, hash);
        assert!("abcd".parse::<Hash>().is_err());
    }
}
