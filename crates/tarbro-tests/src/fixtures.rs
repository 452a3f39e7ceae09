//! Fixture archives built in memory with the `tar` crate.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Modification time stamped on every fixture member.
pub const FIXTURE_MTIME: u64 = 1_700_000_000;

/// Formatted form of [`FIXTURE_MTIME`].
pub const FIXTURE_MTIME_DISPLAY: &str = "2023-11-14 22:13";

/// Start of a PNG file; not valid UTF-8.
pub const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

enum Node {
    Dir(String),
    File(String, Vec<u8>),
    Symlink(String, String),
    HardLink(String, String),
    Fifo(String),
}

/// Builder for tar archives used in tests. Members are written in the
/// order they are added.
#[derive(Default)]
pub struct ArchiveFixture {
    nodes: Vec<Node>,
}

impl ArchiveFixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dir(mut self, path: &str) -> Self {
        self.nodes.push(Node::Dir(path.to_string()));
        self
    }

    pub fn file(mut self, path: &str, data: impl Into<Vec<u8>>) -> Self {
        self.nodes.push(Node::File(path.to_string(), data.into()));
        self
    }

    pub fn symlink(mut self, path: &str, target: &str) -> Self {
        self.nodes
            .push(Node::Symlink(path.to_string(), target.to_string()));
        self
    }

    pub fn hard_link(mut self, path: &str, target: &str) -> Self {
        self.nodes
            .push(Node::HardLink(path.to_string(), target.to_string()));
        self
    }

    pub fn fifo(mut self, path: &str) -> Self {
        self.nodes.push(Node::Fifo(path.to_string()));
        self
    }

    /// `docs/`, a 120-byte `docs/readme.txt`, `docs/img/` and a PNG in it.
    pub fn docs() -> Self {
        Self::new()
            .dir("docs")
            .file("docs/readme.txt", vec![b'r'; 120])
            .dir("docs/img")
            .file("docs/img/a.png", PNG_BYTES)
    }

    /// `b/c/` with two files and a root symlink `link -> b/c`.
    pub fn linked() -> Self {
        Self::new()
            .dir("b")
            .dir("b/c")
            .file("b/c/one.txt", "one")
            .file("b/c/two.txt", "two")
            .symlink("link", "b/c")
    }

    pub fn to_tar_bytes(&self) -> Vec<u8> {
        let mut builder = tar::Builder::new(Vec::new());
        for node in &self.nodes {
            let mut header = tar::Header::new_gnu();
            header.set_mtime(FIXTURE_MTIME);
            header.set_mode(0o644);
            header.set_size(0);
            let appended = match node {
                Node::Dir(path) => {
                    header.set_entry_type(tar::EntryType::Directory);
                    header.set_mode(0o755);
                    builder.append_data(&mut header, format!("{}/", path), io::empty())
                }
                Node::File(path, data) => {
                    header.set_entry_type(tar::EntryType::Regular);
                    header.set_size(data.len() as u64);
                    builder.append_data(&mut header, path, data.as_slice())
                }
                Node::Symlink(path, target) => {
                    header.set_entry_type(tar::EntryType::Symlink);
                    builder.append_link(&mut header, path, target)
                }
                Node::HardLink(path, target) => {
                    header.set_entry_type(tar::EntryType::Link);
                    builder.append_link(&mut header, path, target)
                }
                Node::Fifo(path) => {
                    header.set_entry_type(tar::EntryType::Fifo);
                    builder.append_data(&mut header, path, io::empty())
                }
            };
            appended.expect("Failed to append fixture member");
        }
        builder.into_inner().expect("Failed to finish fixture archive")
    }

    /// Write an uncompressed archive to `dir/name`.
    pub fn write(&self, dir: &Path, name: &str) -> PathBuf {
        write_file(dir, name, &self.to_tar_bytes())
    }

    /// Write a gzip-compressed archive to `dir/name`.
    pub fn write_gzip(&self, dir: &Path, name: &str) -> PathBuf {
        let mut encoder =
            flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder
            .write_all(&self.to_tar_bytes())
            .expect("Failed to gzip fixture");
        let bytes = encoder.finish().expect("Failed to gzip fixture");
        write_file(dir, name, &bytes)
    }

    /// Write a zstd-compressed archive to `dir/name`.
    pub fn write_zstd(&self, dir: &Path, name: &str) -> PathBuf {
        let bytes =
            zstd::encode_all(self.to_tar_bytes().as_slice(), 0).expect("Failed to zstd fixture");
        write_file(dir, name, &bytes)
    }
}

fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).expect("Failed to write fixture archive");
    path
}
