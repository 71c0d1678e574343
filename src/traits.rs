use crate::errors::MdsResult;
use bytes::{Bytes, BytesMut};

/// Decode a value from a binary payload, consuming the bytes it reads.
pub trait MdsParser {
    fn from_bytes(data: &mut Bytes) -> MdsResult<Self>
    where
        Self: Sized;
}

/// Encode a value into a binary payload.
pub trait MdsWriter {
    fn to_bytes(&self, buffer: &mut BytesMut) -> MdsResult<()>;
}
