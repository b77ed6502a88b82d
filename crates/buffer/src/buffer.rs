//! Multi-stream zone buffer
//!
//! The buffer packs an asset graph into a fixed set of streams. Every
//! allocation lives in exactly one stream for its whole lifetime and is
//! addressed through a [`Handle`], an index into the buffer's slot arena.
//! Pointer fields are recorded as pending relocations and are only patched
//! when the buffer is finalized, so a pointer may target a handle that is
//! reserved now and bound later.
//!
//! ## Invariants
//!
//! - Allocation within a stream is monotonic. [`ZoneBuffer::rewind`] is the
//!   only way to give space back, and only to a [`Mark`] taken earlier.
//! - Every pointer field written with [`ZoneBuffer::write_pointer`] produces
//!   exactly one relocation entry. Fields written with
//!   [`ZoneBuffer::write_null`] produce none.
//! - A pointer to a reserved handle that was never bound makes
//!   [`ZoneBuffer::finalize`] fail; no container is produced.

use crate::config::{BufferConfig, BufferConfigError};
use crate::container::{AssetEntry, Container, Relocation, StreamData};
use crate::error::BufferError;
use crate::intern::{InternRef, InternTable};
use crate::stream::{encode_pointer, StreamId};
use byteorder::{ByteOrder, LittleEndian};
use tracing::debug;
use zonekit_core::AssetKind;

/// Handle to an allocation (or a reserved, not yet bound, slot)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handle(u32);

impl Handle {
    /// Arena index
    pub fn index(&self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, Copy)]
struct Slot {
    stream: StreamId,
    offset: u32,
    len: u32,
}

#[derive(Debug, Clone, Copy)]
struct PendingPointer {
    stream: StreamId,
    offset: u32,
    target: Handle,
}

/// Snapshot of buffer state used to drop a failed asset's allocations
#[derive(Debug, Clone)]
pub struct Mark {
    stream_lens: Vec<usize>,
    slots: usize,
    pointers: usize,
    assets: usize,
    interned: usize,
}

/// Sequentially built record, committed into a stream in one allocation
///
/// Pointer fields are remembered by their offset within the record and
/// registered as relocations on commit.
#[derive(Debug, Default, Clone)]
pub struct RecordWriter {
    bytes: Vec<u8>,
    pointers: Vec<(u32, Handle)>,
}

impl RecordWriter {
    /// Empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a byte
    pub fn u8(&mut self, v: u8) -> &mut Self {
        self.bytes.push(v);
        self
    }

    /// Append a bool as one byte
    pub fn bool(&mut self, v: bool) -> &mut Self {
        self.u8(v as u8)
    }

    /// Append a little-endian u16
    pub fn u16(&mut self, v: u16) -> &mut Self {
        self.bytes.extend_from_slice(&v.to_le_bytes());
        self
    }

    /// Append a little-endian i16
    pub fn i16(&mut self, v: i16) -> &mut Self {
        self.bytes.extend_from_slice(&v.to_le_bytes());
        self
    }

    /// Append a little-endian u32
    pub fn u32(&mut self, v: u32) -> &mut Self {
        self.bytes.extend_from_slice(&v.to_le_bytes());
        self
    }

    /// Append a little-endian i32
    pub fn i32(&mut self, v: i32) -> &mut Self {
        self.bytes.extend_from_slice(&v.to_le_bytes());
        self
    }

    /// Append a little-endian f32
    pub fn f32(&mut self, v: f32) -> &mut Self {
        self.bytes.extend_from_slice(&v.to_le_bytes());
        self
    }

    /// Append raw bytes
    pub fn bytes(&mut self, v: &[u8]) -> &mut Self {
        self.bytes.extend_from_slice(v);
        self
    }

    /// Append a pointer field; `None` is written as null
    pub fn pointer(&mut self, target: Option<Handle>) -> &mut Self {
        if let Some(target) = target {
            self.pointers.push((self.bytes.len() as u32, target));
        }
        self.u32(0)
    }

    /// Append an interned value reference
    pub fn intern(&mut self, iref: InternRef) -> &mut Self {
        self.u32(iref.0)
    }

    /// Current record size
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether nothing was appended
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Multi-stream packer for one build pass
pub struct ZoneBuffer {
    config: BufferConfig,
    streams: Vec<Vec<u8>>,
    slots: Vec<Option<Slot>>,
    pointers: Vec<PendingPointer>,
    assets: Vec<(AssetKind, Handle)>,
    interned: InternTable,
}

impl ZoneBuffer {
    /// Create a buffer with the given configuration
    pub fn new(config: BufferConfig) -> Result<Self, BufferConfigError> {
        config.validate()?;
        Ok(ZoneBuffer {
            streams: vec![Vec::new(); config.stream_count],
            config,
            slots: Vec::new(),
            pointers: Vec::new(),
            assets: Vec::new(),
            interned: InternTable::new(),
        })
    }

    /// Buffer configuration
    pub fn config(&self) -> &BufferConfig {
        &self.config
    }

    fn place(&mut self, stream: StreamId, len: u32, align: u32) -> Result<Slot, BufferError> {
        if stream.index() >= self.streams.len() {
            return Err(BufferError::InvalidStream {
                stream: stream.0,
                count: self.streams.len(),
            });
        }
        let data = &mut self.streams[stream.index()];
        let align = align.max(1) as u64;
        let start = (data.len() as u64 + align - 1) / align * align;
        let end = start + len as u64;
        if end > self.config.max_stream_size as u64 {
            return Err(BufferError::Exhausted {
                stream,
                requested: end,
                capacity: self.config.max_stream_size,
            });
        }
        data.resize(end as usize, 0);
        Ok(Slot {
            stream,
            offset: start as u32,
            len,
        })
    }

    /// Allocate `len` zeroed bytes in `stream`
    pub fn alloc(&mut self, stream: StreamId, len: u32, align: u32) -> Result<Handle, BufferError> {
        let slot = self.place(stream, len, align)?;
        let handle = Handle(self.slots.len() as u32);
        self.slots.push(Some(slot));
        Ok(handle)
    }

    /// Reserve a handle to be bound later
    pub fn reserve(&mut self) -> Handle {
        let handle = Handle(self.slots.len() as u32);
        self.slots.push(None);
        handle
    }

    /// Bind a reserved handle to a fresh allocation
    pub fn bind(
        &mut self,
        handle: Handle,
        stream: StreamId,
        len: u32,
        align: u32,
    ) -> Result<(), BufferError> {
        match self.slots.get(handle.0 as usize) {
            Some(None) => {}
            _ => return Err(BufferError::InvalidHandle(handle.0)),
        }
        let slot = self.place(stream, len, align)?;
        self.slots[handle.0 as usize] = Some(slot);
        Ok(())
    }

    fn slot(&self, handle: Handle) -> Result<Slot, BufferError> {
        self.slots
            .get(handle.0 as usize)
            .copied()
            .flatten()
            .ok_or(BufferError::InvalidHandle(handle.0))
    }

    /// Location of a bound handle
    pub fn location(&self, handle: Handle) -> Option<(StreamId, u32)> {
        self.slot(handle).ok().map(|s| (s.stream, s.offset))
    }

    /// Bytes currently used in `stream`
    pub fn stream_len(&self, stream: StreamId) -> usize {
        self.streams.get(stream.index()).map_or(0, Vec::len)
    }

    /// Write raw bytes into an allocation
    pub fn write_bytes(&mut self, handle: Handle, offset: u32, bytes: &[u8]) -> Result<(), BufferError> {
        let slot = self.slot(handle)?;
        let len = bytes.len() as u32;
        if offset as u64 + len as u64 > slot.len as u64 {
            return Err(BufferError::OutOfBounds {
                offset,
                len,
                size: slot.len,
            });
        }
        let start = (slot.offset + offset) as usize;
        self.streams[slot.stream.index()][start..start + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    /// Write a little-endian u32 into an allocation
    pub fn write_u32(&mut self, handle: Handle, offset: u32, value: u32) -> Result<(), BufferError> {
        let mut bytes = [0u8; 4];
        LittleEndian::write_u32(&mut bytes, value);
        self.write_bytes(handle, offset, &bytes)
    }

    /// Write a little-endian f32 into an allocation
    pub fn write_f32(&mut self, handle: Handle, offset: u32, value: f32) -> Result<(), BufferError> {
        let mut bytes = [0u8; 4];
        LittleEndian::write_f32(&mut bytes, value);
        self.write_bytes(handle, offset, &bytes)
    }

    /// Record a pointer field at `from + field_offset` targeting `target`
    pub fn write_pointer(&mut self, from: Handle, field_offset: u32, target: Handle) -> Result<(), BufferError> {
        if target.0 as usize >= self.slots.len() {
            return Err(BufferError::InvalidHandle(target.0));
        }
        self.write_u32(from, field_offset, 0)?;
        let slot = self.slot(from)?;
        self.pointers.push(PendingPointer {
            stream: slot.stream,
            offset: slot.offset + field_offset,
            target,
        });
        Ok(())
    }

    /// Write an explicit null pointer; no relocation is recorded
    pub fn write_null(&mut self, from: Handle, field_offset: u32) -> Result<(), BufferError> {
        self.write_u32(from, field_offset, 0)
    }

    /// Allocate a NUL-terminated string
    pub fn push_str(&mut self, stream: StreamId, s: &str) -> Result<Handle, BufferError> {
        let handle = self.alloc(stream, s.len() as u32 + 1, 1)?;
        self.write_bytes(handle, 0, s.as_bytes())?;
        Ok(handle)
    }

    /// Allocate a copy of `bytes`
    pub fn push_bytes(&mut self, stream: StreamId, bytes: &[u8], align: u32) -> Result<Handle, BufferError> {
        let handle = self.alloc(stream, bytes.len() as u32, align)?;
        self.write_bytes(handle, 0, bytes)?;
        Ok(handle)
    }

    /// Intern a shared value
    pub fn intern(&mut self, bytes: &[u8]) -> InternRef {
        self.interned.intern(bytes)
    }

    /// The pass's interned-value table
    pub fn interned(&self) -> &InternTable {
        &self.interned
    }

    fn register_pointers(&mut self, slot: Slot, pointers: &[(u32, Handle)]) -> Result<(), BufferError> {
        for &(field_offset, target) in pointers {
            if target.0 as usize >= self.slots.len() {
                return Err(BufferError::InvalidHandle(target.0));
            }
            self.pointers.push(PendingPointer {
                stream: slot.stream,
                offset: slot.offset + field_offset,
                target,
            });
        }
        Ok(())
    }

    /// Allocate and fill a record in `stream`
    pub fn commit(&mut self, stream: StreamId, record: &RecordWriter) -> Result<Handle, BufferError> {
        let handle = self.alloc(stream, record.bytes.len() as u32, 4)?;
        self.write_bytes(handle, 0, &record.bytes)?;
        let slot = self.slot(handle)?;
        self.register_pointers(slot, &record.pointers)?;
        Ok(handle)
    }

    /// Bind a reserved handle to a record in `stream`
    pub fn commit_reserved(
        &mut self,
        handle: Handle,
        stream: StreamId,
        record: &RecordWriter,
    ) -> Result<(), BufferError> {
        self.bind(handle, stream, record.bytes.len() as u32, 4)?;
        self.write_bytes(handle, 0, &record.bytes)?;
        let slot = self.slot(handle)?;
        self.register_pointers(slot, &record.pointers)
    }

    /// Add an entry to the asset table
    pub fn add_asset(&mut self, kind: AssetKind, root: Handle) {
        self.assets.push((kind, root));
    }

    /// Number of assets added so far
    pub fn asset_count(&self) -> usize {
        self.assets.len()
    }

    /// Take a mark to rewind to
    pub fn mark(&self) -> Mark {
        Mark {
            stream_lens: self.streams.iter().map(Vec::len).collect(),
            slots: self.slots.len(),
            pointers: self.pointers.len(),
            assets: self.assets.len(),
            interned: self.interned.len(),
        }
    }

    /// Drop everything allocated since `mark`
    pub fn rewind(&mut self, mark: Mark) {
        for (data, len) in self.streams.iter_mut().zip(mark.stream_lens) {
            data.truncate(len);
        }
        self.slots.truncate(mark.slots);
        self.pointers.truncate(mark.pointers);
        self.assets.truncate(mark.assets);
        self.interned.truncate(mark.interned);
    }

    /// Resolve every pointer and produce the container
    pub fn into_container(mut self, zone_name: &str) -> Result<Container, BufferError> {
        let mut relocations = Vec::with_capacity(self.pointers.len());
        for pending in std::mem::take(&mut self.pointers) {
            let target = match self.slots.get(pending.target.0 as usize).copied().flatten() {
                Some(target) => target,
                None => {
                    return Err(BufferError::UnresolvedPointer {
                        stream: pending.stream,
                        offset: pending.offset,
                        handle: pending.target.0,
                    })
                }
            };
            let value = encode_pointer(target.stream, target.offset);
            let start = pending.offset as usize;
            LittleEndian::write_u32(
                &mut self.streams[pending.stream.index()][start..start + 4],
                value,
            );
            relocations.push(Relocation {
                stream: pending.stream,
                offset: pending.offset,
                target_stream: target.stream,
                target_offset: target.offset,
            });
        }

        let mut assets = Vec::with_capacity(self.assets.len());
        for &(kind, root) in &self.assets {
            let slot = self.slot(root)?;
            assets.push(AssetEntry {
                kind: kind.id(),
                root: encode_pointer(slot.stream, slot.offset),
            });
        }

        let streams: Vec<StreamData> = self
            .streams
            .into_iter()
            .enumerate()
            .map(|(index, data)| {
                let id = StreamId(index as u8);
                StreamData {
                    id,
                    alignment: id.alignment(),
                    data,
                }
            })
            .collect();

        debug!(
            target: "zonekit::build",
            zone = zone_name,
            assets = assets.len(),
            relocations = relocations.len(),
            interned = self.interned.len(),
            "Finalized zone buffer"
        );

        Ok(Container {
            name: zone_name.to_string(),
            streams,
            assets,
            interned: self.interned.values().map(<[u8]>::to_vec).collect(),
            relocations,
        })
    }

    /// Resolve every pointer and serialize the container
    pub fn finalize(self, zone_name: &str) -> Result<Vec<u8>, BufferError> {
        Ok(self.into_container(zone_name)?.to_bytes()?)
    }
}

impl Default for ZoneBuffer {
    fn default() -> Self {
        ZoneBuffer {
            config: BufferConfig::default(),
            streams: vec![Vec::new(); StreamId::ALL.len()],
            slots: Vec::new(),
            pointers: Vec::new(),
            assets: Vec::new(),
            interned: InternTable::new(),
        }
    }
}

impl std::fmt::Debug for ZoneBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZoneBuffer")
            .field("streams", &self.streams.iter().map(Vec::len).collect::<Vec<_>>())
            .field("slots", &self.slots.len())
            .field("pointers", &self.pointers.len())
            .field("assets", &self.assets.len())
            .field("interned", &self.interned.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer() -> ZoneBuffer {
        ZoneBuffer::new(BufferConfig::default()).unwrap()
    }

    #[test]
    fn test_eighth_stream_is_fatal() {
        let mut buf = buffer();
        let err = buf.alloc(StreamId(7), 4, 4).unwrap_err();
        assert_eq!(err, BufferError::InvalidStream { stream: 7, count: 7 });
        let core: zonekit_core::Error = err.into();
        assert!(core.is_fatal());
    }

    #[test]
    fn test_allocation_is_monotonic_and_aligned() {
        let mut buf = buffer();
        let a = buf.alloc(StreamId::VIRTUAL, 3, 1).unwrap();
        let b = buf.alloc(StreamId::VIRTUAL, 8, 8).unwrap();
        assert_eq!(buf.location(a), Some((StreamId::VIRTUAL, 0)));
        assert_eq!(buf.location(b), Some((StreamId::VIRTUAL, 8)));
        assert_eq!(buf.stream_len(StreamId::VIRTUAL), 16);
    }

    #[test]
    fn test_exhausted_stream() {
        let config = BufferConfig::default().with_max_stream_size(16);
        let mut buf = ZoneBuffer::new(config).unwrap();
        buf.alloc(StreamId::TEMP, 12, 4).unwrap();
        let err = buf.alloc(StreamId::TEMP, 8, 4).unwrap_err();
        assert!(matches!(err, BufferError::Exhausted { requested: 20, .. }));
    }

    #[test]
    fn test_unresolved_pointer_fails_finalize() {
        let mut buf = buffer();
        let header = buf.alloc(StreamId::VIRTUAL, 4, 4).unwrap();
        let pending = buf.reserve();
        buf.write_pointer(header, 0, pending).unwrap();
        let err = buf.finalize("broken").unwrap_err();
        assert!(matches!(err, BufferError::UnresolvedPointer { offset: 0, .. }));
    }

    #[test]
    fn test_forward_reference_resolves_after_bind() {
        let mut buf = buffer();
        let header = buf.alloc(StreamId::VIRTUAL, 8, 4).unwrap();
        let later = buf.reserve();
        buf.write_pointer(header, 4, later).unwrap();
        buf.bind(later, StreamId::TEMP, 4, 4).unwrap();
        let container = buf.into_container("fwd").unwrap();
        assert_eq!(container.relocations.len(), 1);
        let field = &container.streams[StreamId::VIRTUAL.index()].data[4..8];
        assert_eq!(
            LittleEndian::read_u32(field),
            encode_pointer(StreamId::TEMP, 0)
        );
    }

    #[test]
    fn test_null_pointer_has_no_relocation() {
        let mut buf = buffer();
        let header = buf.alloc(StreamId::VIRTUAL, 4, 4).unwrap();
        buf.write_null(header, 0).unwrap();
        let container = buf.into_container("null").unwrap();
        assert!(container.relocations.is_empty());
    }

    #[test]
    fn test_bind_twice_is_invalid() {
        let mut buf = buffer();
        let h = buf.reserve();
        buf.bind(h, StreamId::TEMP, 4, 4).unwrap();
        assert_eq!(
            buf.bind(h, StreamId::TEMP, 4, 4),
            Err(BufferError::InvalidHandle(h.index()))
        );
    }

    #[test]
    fn test_write_out_of_bounds() {
        let mut buf = buffer();
        let h = buf.alloc(StreamId::VIRTUAL, 4, 4).unwrap();
        assert!(matches!(
            buf.write_u32(h, 2, 1),
            Err(BufferError::OutOfBounds { offset: 2, len: 4, size: 4 })
        ));
    }

    #[test]
    fn test_rewind_drops_failed_asset() {
        let mut buf = buffer();
        let kept = buf.push_str(StreamId::VIRTUAL, "kept").unwrap();
        buf.add_asset(AssetKind::RawFile, kept);
        let mark = buf.mark();
        let dropped = buf.push_str(StreamId::VIRTUAL, "dropped").unwrap();
        buf.intern(b"only_in_dropped");
        buf.add_asset(AssetKind::RawFile, dropped);
        buf.rewind(mark);
        assert_eq!(buf.asset_count(), 1);
        assert_eq!(buf.stream_len(StreamId::VIRTUAL), 5);
        assert!(buf.interned().is_empty());
        assert!(buf.location(dropped).is_none());
    }

    #[test]
    fn test_record_writer_pointers_become_relocations() {
        let mut buf = buffer();
        let name = buf.push_str(StreamId::VIRTUAL, "asset").unwrap();
        let mut rec = RecordWriter::new();
        rec.u32(7).pointer(Some(name)).pointer(None).f32(1.5);
        assert_eq!(rec.len(), 16);
        let header = buf.commit(StreamId::VIRTUAL, &rec).unwrap();
        buf.add_asset(AssetKind::RawFile, header);
        let container = buf.into_container("rec").unwrap();
        assert_eq!(container.relocations.len(), 1);
        assert_eq!(container.relocations[0].offset, 8 + 4);
    }
}
