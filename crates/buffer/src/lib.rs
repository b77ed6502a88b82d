//! Zone buffer for zonekit
//!
//! This crate packs asset graphs into relocatable zone containers and reads
//! them back:
//! - ZoneBuffer: multi-stream packer with pointer relocation
//! - InternTable: per-pass deduplication of shared values
//! - Container: the on-disk format (header, streams, tables, CRC32)
//! - ZoneReader: pointer-following deserialization over a container

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod buffer;
pub mod config;
pub mod container;
pub mod error;
pub mod intern;
pub mod reader;
pub mod stream;

pub use buffer::{Handle, Mark, RecordWriter, ZoneBuffer};
pub use config::{BufferConfig, BufferConfigError};
pub use container::{AssetEntry, Container, Relocation, StreamData, CONTAINER_MAGIC, CONTAINER_VERSION};
pub use error::{BufferError, ContainerError};
pub use intern::{InternRef, InternTable};
pub use reader::{FieldReader, ZoneReader};
pub use stream::{decode_pointer, encode_pointer, StreamId, MAX_STREAM_OFFSET};
