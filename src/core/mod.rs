//! Archive engine
//!
//! - [`owner`] - open modes and the ownership link carried by every node
//! - [`payload`] - versioned JSON envelope for the two required entries
//! - [`container`] - engram container reader and writer
//! - [`staging`] - per-session working directory
//! - [`transaction`] - backup-and-restore guard used by `save`
//! - [`document`] - sections and items
//! - [`resource_index`] - external file ids to storage names
//! - [`archive`] - the archive handle tying it together
//!
//! [`blob`], [`compression`] and [`encryption`] implement standalone
//! serialized blobs and do not touch archive files.

pub mod archive;
pub mod blob;
pub mod compression;
pub mod container;
pub mod document;
pub mod encryption;
pub mod error;
#[cfg(feature = "image")]
pub mod imaging;
pub mod owner;
pub mod payload;
pub mod resource_index;
pub mod staging;
pub mod stream;
pub mod transaction;
pub mod validation;
