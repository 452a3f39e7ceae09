//! Archive access for tarbro.
//!
//! Opens a tar archive (plain, gzip or zstd), snapshots its members,
//! classifies them and computes directory contents. Everything here is
//! blocking; async callers run it on the blocking pool.

pub mod classify;
pub mod compression;
pub mod indexer;
pub mod reader;

pub use classify::classify;
pub use compression::Compression;
pub use indexer::{
    build_directory_entry, build_entry, compute_children, immediate_child, index_all, summarize,
};
pub use reader::{ArchiveHandle, ArchiveReader, Member, MemberStream, normalize_path};
