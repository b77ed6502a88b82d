//! Pointer-following container reader
//!
//! Deserializers walk an asset graph from its root pointer. A
//! [`FieldReader`] reads one record sequentially; pointer fields are then
//! followed through the [`ZoneReader`].

use crate::container::Container;
use crate::error::ContainerError;
use crate::intern::InternRef;
use crate::stream::decode_pointer;
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Cursor, Read};

/// Reader over a parsed container
#[derive(Debug, Clone, Copy)]
pub struct ZoneReader<'a> {
    container: &'a Container,
}

impl<'a> ZoneReader<'a> {
    /// Reader over `container`
    pub fn new(container: &'a Container) -> Self {
        ZoneReader { container }
    }

    /// Bytes from the pointed location to the end of its stream
    fn tail(&self, ptr: u32) -> Result<Option<&'a [u8]>, ContainerError> {
        let (stream, offset) = match decode_pointer(ptr) {
            Some(location) => location,
            None => return Ok(None),
        };
        let data = &self
            .container
            .stream(stream)
            .ok_or(ContainerError::BadPointer(ptr))?
            .data;
        data.get(offset as usize..)
            .map(Some)
            .ok_or(ContainerError::BadPointer(ptr))
    }

    /// Record at `ptr`, or `None` for a null pointer
    pub fn record(&self, ptr: u32) -> Result<Option<FieldReader<'a>>, ContainerError> {
        Ok(self.tail(ptr)?.map(FieldReader::new))
    }

    /// Record at a pointer that must not be null
    pub fn require(&self, ptr: u32, what: &'static str) -> Result<FieldReader<'a>, ContainerError> {
        self.record(ptr)?.ok_or(ContainerError::Truncated(what))
    }

    /// NUL-terminated string at `ptr`
    pub fn string(&self, ptr: u32) -> Result<Option<String>, ContainerError> {
        let tail = match self.tail(ptr)? {
            Some(tail) => tail,
            None => return Ok(None),
        };
        let end = tail
            .iter()
            .position(|&b| b == 0)
            .ok_or(ContainerError::Truncated("string"))?;
        String::from_utf8(tail[..end].to_vec())
            .map(Some)
            .map_err(|_| ContainerError::InvalidUtf8("string"))
    }

    /// `len` bytes at `ptr`
    pub fn bytes(&self, ptr: u32, len: usize) -> Result<Option<&'a [u8]>, ContainerError> {
        match self.tail(ptr)? {
            Some(tail) => tail
                .get(..len)
                .map(Some)
                .ok_or(ContainerError::Truncated("byte array")),
            None => Ok(None),
        }
    }

    /// Interned value
    pub fn interned(&self, iref: InternRef) -> Result<&'a [u8], ContainerError> {
        self.container
            .interned
            .get(iref.index())
            .map(Vec::as_slice)
            .ok_or(ContainerError::BadIntern(iref.0))
    }

    /// Interned value as UTF-8
    pub fn interned_str(&self, iref: InternRef) -> Result<String, ContainerError> {
        String::from_utf8(self.interned(iref)?.to_vec())
            .map_err(|_| ContainerError::InvalidUtf8("interned value"))
    }
}

/// Sequential reader over one record
#[derive(Debug, Clone)]
pub struct FieldReader<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> FieldReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        FieldReader {
            cursor: Cursor::new(data),
        }
    }

    /// Read a byte
    pub fn u8(&mut self) -> Result<u8, ContainerError> {
        self.cursor
            .read_u8()
            .map_err(|_| ContainerError::Truncated("record"))
    }

    /// Read a bool byte
    pub fn bool(&mut self) -> Result<bool, ContainerError> {
        Ok(self.u8()? != 0)
    }

    /// Read a little-endian u16
    pub fn u16(&mut self) -> Result<u16, ContainerError> {
        self.cursor
            .read_u16::<LittleEndian>()
            .map_err(|_| ContainerError::Truncated("record"))
    }

    /// Read a little-endian i16
    pub fn i16(&mut self) -> Result<i16, ContainerError> {
        self.cursor
            .read_i16::<LittleEndian>()
            .map_err(|_| ContainerError::Truncated("record"))
    }

    /// Read a little-endian u32
    pub fn u32(&mut self) -> Result<u32, ContainerError> {
        self.cursor
            .read_u32::<LittleEndian>()
            .map_err(|_| ContainerError::Truncated("record"))
    }

    /// Read a little-endian i32
    pub fn i32(&mut self) -> Result<i32, ContainerError> {
        self.cursor
            .read_i32::<LittleEndian>()
            .map_err(|_| ContainerError::Truncated("record"))
    }

    /// Read a little-endian f32
    pub fn f32(&mut self) -> Result<f32, ContainerError> {
        self.cursor
            .read_f32::<LittleEndian>()
            .map_err(|_| ContainerError::Truncated("record"))
    }

    /// Read a pointer field's raw value
    pub fn pointer(&mut self) -> Result<u32, ContainerError> {
        self.u32()
    }

    /// Read an interned value reference
    pub fn intern(&mut self) -> Result<InternRef, ContainerError> {
        Ok(InternRef(self.u32()?))
    }

    /// Read `N` raw bytes
    pub fn array<const N: usize>(&mut self) -> Result<[u8; N], ContainerError> {
        let mut buf = [0u8; N];
        self.cursor
            .read_exact(&mut buf)
            .map_err(|_| ContainerError::Truncated("record"))?;
        Ok(buf)
    }

    /// Bytes consumed so far
    pub fn position(&self) -> u64 {
        self.cursor.position()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{RecordWriter, ZoneBuffer};
    use crate::stream::StreamId;
    use zonekit_core::AssetKind;

    #[test]
    fn test_follow_pointers_through_container() {
        let mut buf = ZoneBuffer::default();
        let name = buf.push_str(StreamId::VIRTUAL, "maps/mp/sample.gsc").unwrap();
        let data = buf.push_bytes(StreamId::DELAY_VIRTUAL, &[1, 2, 3], 1).unwrap();
        let tag = buf.intern(b"tag_origin");
        let mut rec = RecordWriter::new();
        rec.pointer(Some(name)).u32(3).pointer(Some(data)).intern(tag).pointer(None);
        let root = buf.commit(StreamId::VIRTUAL, &rec).unwrap();
        buf.add_asset(AssetKind::RawFile, root);

        let bytes = buf.finalize("reader").unwrap();
        let container = Container::parse(&bytes).unwrap();
        container.verify().unwrap();
        let reader = container.reader();

        let mut header = reader.require(container.assets[0].root, "header").unwrap();
        let name_ptr = header.pointer().unwrap();
        assert_eq!(
            reader.string(name_ptr).unwrap().as_deref(),
            Some("maps/mp/sample.gsc")
        );
        let len = header.u32().unwrap() as usize;
        let data_ptr = header.pointer().unwrap();
        assert_eq!(reader.bytes(data_ptr, len).unwrap(), Some(&[1u8, 2, 3][..]));
        let tag = header.intern().unwrap();
        assert_eq!(reader.interned_str(tag).unwrap(), "tag_origin");
        assert_eq!(header.pointer().unwrap(), 0);
        assert!(reader.record(0).unwrap().is_none());
    }

    #[test]
    fn test_bad_pointer() {
        let container = Container::parse(&ZoneBuffer::default().finalize("empty").unwrap()).unwrap();
        let reader = container.reader();
        let ptr = crate::stream::encode_pointer(StreamId::VIRTUAL, 64);
        assert!(matches!(reader.record(ptr), Err(ContainerError::BadPointer(_))));
    }
}
