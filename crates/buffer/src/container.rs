//! Zone container format
//!
//! # Layout
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ Magic "ZKZN" (4) │ Version (4) │ Streams (4) │
//! ├──────────────────────────────────────────────┤
//! │ Per stream: alignment (4) + length (4)       │
//! ├──────────────────────────────────────────────┤
//! │ Assets (4) │ Relocations (4) │ Interned (4)  │
//! ├──────────────────────────────────────────────┤
//! │ Name length (2) │ Zone name                  │
//! ├──────────────────────────────────────────────┤
//! │ Stream data, each aligned from section start │
//! ├──────────────────────────────────────────────┤
//! │ Asset table: kind (2) + root pointer (4)     │
//! ├──────────────────────────────────────────────┤
//! │ Interned table: length (4) + bytes           │
//! ├──────────────────────────────────────────────┤
//! │ Relocations: stream (1) + offset (4)         │
//! │              + target stream (1) + off (4)   │
//! ├──────────────────────────────────────────────┤
//! │ CRC32 (4) over everything above              │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! All integers are little-endian.

use crate::error::ContainerError;
use crate::reader::ZoneReader;
use crate::stream::{decode_pointer, encode_pointer, StreamId};
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Cursor, Read};

/// Magic bytes identifying a zone container: "ZKZN"
pub const CONTAINER_MAGIC: [u8; 4] = *b"ZKZN";

/// Current container format version
pub const CONTAINER_VERSION: u32 = 1;

/// Smallest possible container: header counts, name length and CRC
const MIN_CONTAINER_SIZE: usize = 4 + 4 + 4 + 12 + 2 + 4;

/// One stream's bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamData {
    /// Stream index
    pub id: StreamId,
    /// Alignment of the stream start within the data section
    pub alignment: u32,
    /// Stream contents
    pub data: Vec<u8>,
}

/// Asset table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetEntry {
    /// Numeric asset kind
    pub kind: u16,
    /// Encoded pointer to the asset header
    pub root: u32,
}

/// Relocation table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Relocation {
    /// Stream holding the pointer field
    pub stream: StreamId,
    /// Offset of the pointer field
    pub offset: u32,
    /// Stream the pointer targets
    pub target_stream: StreamId,
    /// Offset the pointer targets
    pub target_offset: u32,
}

/// A finalized zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    /// Zone name
    pub name: String,
    /// Streams in container order
    pub streams: Vec<StreamData>,
    /// Asset table
    pub assets: Vec<AssetEntry>,
    /// Interned values, indexed by `InternRef`
    pub interned: Vec<Vec<u8>>,
    /// Relocation table
    pub relocations: Vec<Relocation>,
}

fn padding(pos: usize, alignment: u32) -> usize {
    let align = alignment.max(1) as usize;
    (align - pos % align) % align
}

fn read_u8(cur: &mut Cursor<&[u8]>, what: &'static str) -> Result<u8, ContainerError> {
    cur.read_u8().map_err(|_| ContainerError::Truncated(what))
}

fn read_u16(cur: &mut Cursor<&[u8]>, what: &'static str) -> Result<u16, ContainerError> {
    cur.read_u16::<LittleEndian>()
        .map_err(|_| ContainerError::Truncated(what))
}

fn read_u32(cur: &mut Cursor<&[u8]>, what: &'static str) -> Result<u32, ContainerError> {
    cur.read_u32::<LittleEndian>()
        .map_err(|_| ContainerError::Truncated(what))
}

fn read_vec(
    cur: &mut Cursor<&[u8]>,
    len: usize,
    what: &'static str,
) -> Result<Vec<u8>, ContainerError> {
    let remaining = cur.get_ref().len().saturating_sub(cur.position() as usize);
    if len > remaining {
        return Err(ContainerError::Truncated(what));
    }
    let mut buf = vec![0u8; len];
    cur.read_exact(&mut buf)
        .map_err(|_| ContainerError::Truncated(what))?;
    Ok(buf)
}

impl Container {
    /// Serialize to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, ContainerError> {
        let name_len = u16::try_from(self.name.len())
            .map_err(|_| ContainerError::NameTooLong { len: self.name.len() })?;
        let data_len: usize = self.streams.iter().map(|s| s.data.len() + 128).sum();
        let mut out = Vec::with_capacity(64 + self.name.len() + data_len);

        out.extend_from_slice(&CONTAINER_MAGIC);
        out.extend_from_slice(&CONTAINER_VERSION.to_le_bytes());
        out.extend_from_slice(&(self.streams.len() as u32).to_le_bytes());
        for stream in &self.streams {
            out.extend_from_slice(&stream.alignment.to_le_bytes());
            out.extend_from_slice(&(stream.data.len() as u32).to_le_bytes());
        }
        out.extend_from_slice(&(self.assets.len() as u32).to_le_bytes());
        out.extend_from_slice(&(self.relocations.len() as u32).to_le_bytes());
        out.extend_from_slice(&(self.interned.len() as u32).to_le_bytes());
        out.extend_from_slice(&name_len.to_le_bytes());
        out.extend_from_slice(self.name.as_bytes());

        let section_start = out.len();
        for stream in &self.streams {
            let pad = padding(out.len() - section_start, stream.alignment);
            out.resize(out.len() + pad, 0);
            out.extend_from_slice(&stream.data);
        }

        for asset in &self.assets {
            out.extend_from_slice(&asset.kind.to_le_bytes());
            out.extend_from_slice(&asset.root.to_le_bytes());
        }
        for value in &self.interned {
            out.extend_from_slice(&(value.len() as u32).to_le_bytes());
            out.extend_from_slice(value);
        }
        for reloc in &self.relocations {
            out.push(reloc.stream.0);
            out.extend_from_slice(&reloc.offset.to_le_bytes());
            out.push(reloc.target_stream.0);
            out.extend_from_slice(&reloc.target_offset.to_le_bytes());
        }

        let crc = crc32fast::hash(&out);
        out.extend_from_slice(&crc.to_le_bytes());
        Ok(out)
    }

    /// Parse and checksum-validate a container
    pub fn parse(bytes: &[u8]) -> Result<Self, ContainerError> {
        if bytes.len() < MIN_CONTAINER_SIZE {
            return Err(ContainerError::TooSmall { size: bytes.len() });
        }

        let mut magic = [0u8; 4];
        magic.copy_from_slice(&bytes[0..4]);
        if magic != CONTAINER_MAGIC {
            return Err(ContainerError::InvalidMagic(magic));
        }

        let (body, footer) = bytes.split_at(bytes.len() - 4);
        let stored = u32::from_le_bytes([footer[0], footer[1], footer[2], footer[3]]);
        let computed = crc32fast::hash(body);
        if stored != computed {
            return Err(ContainerError::CrcMismatch { stored, computed });
        }

        let mut cur = Cursor::new(body);
        cur.set_position(4);
        let version = read_u32(&mut cur, "header")?;
        if version != CONTAINER_VERSION {
            return Err(ContainerError::UnsupportedVersion(version));
        }

        let stream_count = read_u32(&mut cur, "header")?;
        if stream_count == 0 || stream_count as usize > StreamId::ALL.len() {
            return Err(ContainerError::InvalidStreamCount(stream_count));
        }
        let mut layout = Vec::with_capacity(stream_count as usize);
        for _ in 0..stream_count {
            let alignment = read_u32(&mut cur, "stream table")?;
            let len = read_u32(&mut cur, "stream table")?;
            layout.push((alignment, len));
        }

        let asset_count = read_u32(&mut cur, "header")?;
        let reloc_count = read_u32(&mut cur, "header")?;
        let interned_count = read_u32(&mut cur, "header")?;
        let name_len = read_u16(&mut cur, "zone name")? as usize;
        let name = String::from_utf8(read_vec(&mut cur, name_len, "zone name")?)
            .map_err(|_| ContainerError::InvalidUtf8("zone name"))?;

        let section_start = cur.position() as usize;
        let mut streams = Vec::with_capacity(layout.len());
        for (index, (alignment, len)) in layout.into_iter().enumerate() {
            let pad = padding(cur.position() as usize - section_start, alignment);
            read_vec(&mut cur, pad, "stream padding")?;
            streams.push(StreamData {
                id: StreamId(index as u8),
                alignment,
                data: read_vec(&mut cur, len as usize, "stream data")?,
            });
        }

        let mut assets = Vec::new();
        for _ in 0..asset_count {
            let kind = read_u16(&mut cur, "asset table")?;
            let root = read_u32(&mut cur, "asset table")?;
            assets.push(AssetEntry { kind, root });
        }

        let mut interned = Vec::new();
        for _ in 0..interned_count {
            let len = read_u32(&mut cur, "interned table")? as usize;
            interned.push(read_vec(&mut cur, len, "interned table")?);
        }

        let mut relocations = Vec::new();
        for _ in 0..reloc_count {
            let stream = StreamId(read_u8(&mut cur, "relocation table")?);
            let offset = read_u32(&mut cur, "relocation table")?;
            let target_stream = StreamId(read_u8(&mut cur, "relocation table")?);
            let target_offset = read_u32(&mut cur, "relocation table")?;
            relocations.push(Relocation {
                stream,
                offset,
                target_stream,
                target_offset,
            });
        }

        Ok(Container {
            name,
            streams,
            assets,
            interned,
            relocations,
        })
    }

    /// Stream by id
    pub fn stream(&self, id: StreamId) -> Option<&StreamData> {
        self.streams.get(id.index())
    }

    fn check_target(&self, stream: StreamId, offset: u32) -> bool {
        self.stream(stream)
            .map_or(false, |s| offset as usize <= s.data.len())
    }

    /// Check every relocation against the field it patches, and every asset
    /// root against the stream layout
    pub fn verify(&self) -> Result<(), ContainerError> {
        for reloc in &self.relocations {
            let data = &self
                .stream(reloc.stream)
                .ok_or(ContainerError::RelocationMismatch {
                    stream: reloc.stream.0,
                    offset: reloc.offset,
                })?
                .data;
            let start = reloc.offset as usize;
            let field = data
                .get(start..start + 4)
                .ok_or(ContainerError::RelocationMismatch {
                    stream: reloc.stream.0,
                    offset: reloc.offset,
                })?;
            let value = u32::from_le_bytes([field[0], field[1], field[2], field[3]]);
            if !self.check_target(reloc.target_stream, reloc.target_offset) {
                return Err(ContainerError::BadPointer(value));
            }
            if value != encode_pointer(reloc.target_stream, reloc.target_offset) {
                return Err(ContainerError::RelocationMismatch {
                    stream: reloc.stream.0,
                    offset: reloc.offset,
                });
            }
        }
        for asset in &self.assets {
            match decode_pointer(asset.root) {
                Some((stream, offset)) if self.check_target(stream, offset) => {}
                _ => return Err(ContainerError::BadPointer(asset.root)),
            }
        }
        Ok(())
    }

    /// Pointer-following reader over this container
    pub fn reader(&self) -> ZoneReader<'_> {
        ZoneReader::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Container {
        Container {
            name: "mp_sample".to_string(),
            streams: StreamId::ALL
                .iter()
                .map(|&id| StreamData {
                    id,
                    alignment: id.alignment(),
                    data: if id == StreamId::VIRTUAL {
                        let mut d = vec![0u8; 8];
                        d[0..4].copy_from_slice(&encode_pointer(StreamId::VIRTUAL, 4).to_le_bytes());
                        d
                    } else {
                        vec![id.0; id.0 as usize]
                    },
                })
                .collect(),
            assets: vec![AssetEntry {
                kind: 17,
                root: encode_pointer(StreamId::VIRTUAL, 0),
            }],
            interned: vec![b"tag_origin".to_vec()],
            relocations: vec![Relocation {
                stream: StreamId::VIRTUAL,
                offset: 0,
                target_stream: StreamId::VIRTUAL,
                target_offset: 4,
            }],
        }
    }

    #[test]
    fn test_container_roundtrip() {
        let container = sample();
        let bytes = container.to_bytes().unwrap();
        let parsed = Container::parse(&bytes).unwrap();
        assert_eq!(parsed, container);
        parsed.verify().unwrap();
    }

    #[test]
    fn test_crc_detects_corruption() {
        let mut bytes = sample().to_bytes().unwrap();
        let mid = bytes.len() / 2;
        bytes[mid] ^= 0xFF;
        assert!(matches!(
            Container::parse(&bytes),
            Err(ContainerError::CrcMismatch { .. })
        ));
    }

    #[test]
    fn test_rejects_bad_magic_and_short_input() {
        let mut bytes = sample().to_bytes().unwrap();
        bytes[0] = b'X';
        assert!(matches!(
            Container::parse(&bytes),
            Err(ContainerError::InvalidMagic(_))
        ));
        assert!(matches!(
            Container::parse(&bytes[..10]),
            Err(ContainerError::TooSmall { size: 10 })
        ));
    }

    #[test]
    fn test_oversized_name_is_rejected() {
        let mut container = sample();
        container.name = "z".repeat(u16::MAX as usize + 1);
        assert_eq!(
            container.to_bytes(),
            Err(ContainerError::NameTooLong { len: u16::MAX as usize + 1 })
        );

        container.name = "z".repeat(u16::MAX as usize);
        let parsed = Container::parse(&container.to_bytes().unwrap()).unwrap();
        assert_eq!(parsed.name.len(), u16::MAX as usize);
    }

    #[test]
    fn test_verify_catches_mismatched_relocation() {
        let mut container = sample();
        container.relocations[0].target_offset = 0;
        assert!(matches!(
            container.verify(),
            Err(ContainerError::RelocationMismatch { .. })
        ));
    }

    #[test]
    fn test_stream_starts_are_aligned() {
        let container = sample();
        let bytes = container.to_bytes().unwrap();
        let header_len = 12 + 8 * 7 + 12 + 2 + container.name.len();
        // virtual stream is the sixth; its start must honour its alignment
        let mut pos = 0usize;
        for stream in &container.streams {
            pos += padding(pos, stream.alignment);
            assert_eq!(pos % stream.alignment as usize, 0);
            if stream.id == StreamId::VIRTUAL {
                assert_eq!(&bytes[header_len + pos..header_len + pos + 8], &stream.data[..]);
            }
            pos += stream.data.len();
        }
    }
}
