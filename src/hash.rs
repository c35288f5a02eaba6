use super::Error;
use sha1::{Digest, Sha1};
use std::fmt;
use std::str::FromStr;

pub const SHA1_HASH_SIZE: usize = 20;
pub const SHA1_HEX_SIZE: usize = SHA1_HASH_SIZE * 2;

/// A SHA-1 object id.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; SHA1_HASH_SIZE]);

impl ObjectId {
    pub fn hasher() -> Sha1 {
        Sha1::new()
    }

    pub fn new(hasher: Sha1) -> Self {
        Self(hasher.finalize().into())
    }

    /// Digest of `bytes` as-is. Callers hash canonical encodings, not raw content.
    pub fn digest(bytes: &[u8]) -> Self {
        Self::new(Self::hasher().chain_update(bytes))
    }

    pub fn hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn short(&self) -> String {
        self.hex()[..7].to_string()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl TryFrom<&[u8]> for ObjectId {
    type Error = Error;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let raw: [u8; SHA1_HASH_SIZE] = bytes.try_into().map_err(|_| {
            Error::corrupt(format!(
                "object id must be {SHA1_HASH_SIZE} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(raw))
    }
}

impl From<[u8; SHA1_HASH_SIZE]> for ObjectId {
    fn from(value: [u8; SHA1_HASH_SIZE]) -> Self {
        Self(value)
    }
}

impl FromStr for ObjectId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != SHA1_HEX_SIZE {
            return Err(Error::InvalidObjectId(format!(
                "{s:?} is not {SHA1_HEX_SIZE} hex characters"
            )));
        }
        let mut raw = [0u8; SHA1_HASH_SIZE];
        hex::decode_to_slice(s, &mut raw)
            .map_err(|err| Error::InvalidObjectId(format!("{s:?}: {err}")))?;
        Ok(Self(raw))
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_renders_lowercase_hex() {
        // sha1("blob 5\0hello")
        let id = ObjectId::digest(b"blob 5\0hello");
        assert_eq!(id.hex(), "b6fc4c620b67d95f953a5c1c1230aaab5db5a1b0");
        assert_eq!(id.short(), "b6fc4c6");
    }

    #[test]
    fn it_parses_hex() {
        let hex = "e88f7a929cd70b0274c4ea33b209c97fa845fdbc";
        let id: ObjectId = hex.parse().unwrap();
        assert_eq!(id.to_string(), hex);
    }

    #[test]
    fn it_rejects_bad_hex() {
        assert!(matches!(
            "e88f".parse::<ObjectId>(),
            Err(Error::InvalidObjectId(_))
        ));
        assert!(matches!(
            "z88f7a929cd70b0274c4ea33b209c97fa845fdbc".parse::<ObjectId>(),
            Err(Error::InvalidObjectId(_))
        ));
    }

    #[test]
    fn it_converts_from_raw_slices() {
        let raw = [7u8; SHA1_HASH_SIZE];
        let id = ObjectId::try_from(&raw[..]).unwrap();
        assert_eq!(id.as_bytes(), &raw);
        assert!(matches!(
            ObjectId::try_from(&raw[..19]),
            Err(Error::CorruptObject(_))
        ));
    }
}
