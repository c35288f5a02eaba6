use bytes::Bytes;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Blob(Bytes);

impl Blob {
    pub fn serialize(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    pub fn deserialize(content: &[u8]) -> Self {
        Self(Bytes::copy_from_slice(content))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for Blob {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}

impl From<Bytes> for Blob {
    fn from(value: Bytes) -> Self {
        Self(value)
    }
}

impl From<Vec<u8>> for Blob {
    fn from(value: Vec<u8>) -> Self {
        Self(Bytes::from(value))
    }
}

impl fmt::Display for Blob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(self.0.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_implements_to_string() {
        let blob = Blob(Bytes::from_static(b"hello"));
        assert_eq!(blob.to_string(), "hello");
    }

    #[test]
    fn it_round_trips_arbitrary_bytes() {
        for content in [&b""[..], b"\0\xff\x00binary", b"line\nline\n"] {
            let blob = Blob::deserialize(content);
            assert_eq!(blob.serialize(), content);
            assert_eq!(Blob::deserialize(&blob.serialize()), blob);
        }
    }
}
