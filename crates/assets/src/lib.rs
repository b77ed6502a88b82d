//! Asset codecs for zonekit
//!
//! This crate holds the per-kind knowledge of the native schema:
//! - TypeRegistry: kind name lookup and dispatch
//! - AssetOps: the dispatch record of one kind (load, write, read, layout)
//! - dump: writing records back into a source-compatible tree

#![warn(missing_docs)]
#![warn(clippy::all)]

mod codec;
pub mod dump;
pub mod ops;
pub mod registry;

pub use codec::native_ops;
pub use dump::{dump_record, encode_record};
pub use ops::{AssetOps, DumpFormat, DumpLayout, LoadFn, ReadFn, WriteFn};
pub use registry::TypeRegistry;
