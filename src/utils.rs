use byteorder::{ByteOrder, LittleEndian};
use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::errors::{MdsError, MdsResult, SourceLocation};
use crate::tables::ChunkType;

/// Size of a chunk header: `tag: u16` followed by `length: u32`
pub const CHUNK_HEADER_SIZE: usize = 6;

/// Little-endian bytes of the root chunk tag, the first two bytes of every compiled script
pub const ROOT_MAGIC: [u8; 2] = [0x00, 0xF0];

/// Detect a compiled script by its leading root tag
pub fn is_binary(data: &[u8]) -> bool {
    data.len() >= 2 && data[0..2] == ROOT_MAGIC
}

/// Payload-level error; the chunk dispatcher fills in the tag and offset.
fn payload_error(reason: String) -> MdsError {
    MdsError::MalformedChunk {
        tag: 0,
        offset: 0,
        reason,
    }
}

fn ensure_remaining(data: &Bytes, needed: usize, what: &str) -> MdsResult<()> {
    if data.remaining() < needed {
        return Err(payload_error(format!(
            "payload too short for {}: needed {} bytes, only {} left",
            what,
            needed,
            data.remaining()
        )));
    }
    Ok(())
}

pub fn read_u8(data: &mut Bytes) -> MdsResult<u8> {
    ensure_remaining(data, 1, "u8")?;
    Ok(data.get_u8())
}

pub fn read_u16(data: &mut Bytes) -> MdsResult<u16> {
    ensure_remaining(data, 2, "u16")?;
    let value = LittleEndian::read_u16(&data[..2]);
    data.advance(2);
    Ok(value)
}

pub fn read_u32(data: &mut Bytes) -> MdsResult<u32> {
    ensure_remaining(data, 4, "u32")?;
    let value = LittleEndian::read_u32(&data[..4]);
    data.advance(4);
    Ok(value)
}

pub fn read_i32(data: &mut Bytes) -> MdsResult<i32> {
    ensure_remaining(data, 4, "i32")?;
    let value = LittleEndian::read_i32(&data[..4]);
    data.advance(4);
    Ok(value)
}

pub fn read_f32(data: &mut Bytes) -> MdsResult<f32> {
    ensure_remaining(data, 4, "f32")?;
    let value = LittleEndian::read_f32(&data[..4]);
    data.advance(4);
    Ok(value)
}

pub fn read_bool(data: &mut Bytes) -> MdsResult<bool> {
    Ok(read_u32(data)? != 0)
}

/// Read a newline-terminated string. The newline is consumed but not returned.
pub fn read_line(data: &mut Bytes) -> MdsResult<String> {
    let end = data
        .iter()
        .position(|&b| b == b'\n')
        .ok_or_else(|| payload_error("unterminated string".to_string()))?;

    let raw = data.split_to(end);
    data.advance(1);

    String::from_utf8(raw.to_vec())
        .map_err(|e| payload_error(format!("string is not valid UTF-8: {}", e)))
}

pub fn write_line(buffer: &mut BytesMut, value: &str) {
    buffer.put(value.as_bytes());
    buffer.put_u8(b'\n');
}

pub fn write_bool(buffer: &mut BytesMut, value: bool) {
    buffer.put_u32_le(value as u32);
}

/// Write a chunk header with a zero length and return its position for [`end_chunk`].
pub fn begin_chunk(buffer: &mut BytesMut, chunk: ChunkType) -> usize {
    let index = buffer.len();
    buffer.put_u16_le(chunk.to_u16());
    // reserve to write length
    buffer.put_u32_le(0);
    index
}

/// Backpatch the length of the chunk started at `index` with the bytes written since.
pub fn end_chunk(buffer: &mut BytesMut, index: usize) {
    let payload_start = index + CHUNK_HEADER_SIZE;
    let data_length = (buffer.len() - payload_start) as u32;
    LittleEndian::write_u32(&mut buffer[index + 2..payload_start], data_length);
}

/// Write a complete chunk whose payload is produced by `f`.
pub fn write_chunk<F>(buffer: &mut BytesMut, chunk: ChunkType, f: F) -> MdsResult<()>
where
    F: FnOnce(&mut BytesMut) -> MdsResult<()>,
{
    let index = begin_chunk(buffer, chunk);
    f(buffer)?;
    end_chunk(buffer, index);
    Ok(())
}

/// Attach chunk coordinates to errors raised while decoding a payload.
pub trait ChunkErrorContext<T> {
    fn at_chunk(self, tag: u16, offset: usize) -> MdsResult<T>;
}

impl<T> ChunkErrorContext<T> for MdsResult<T> {
    fn at_chunk(self, tag: u16, offset: usize) -> MdsResult<T> {
        self.map_err(|e| match e {
            MdsError::MalformedChunk { reason, .. } => MdsError::MalformedChunk {
                tag,
                offset,
                reason,
            },
            MdsError::InvalidEnumValue { field, value, .. } => MdsError::InvalidEnumValue {
                field,
                value,
                location: SourceLocation::Offset(offset),
            },
            other => other,
        })
    }
}
