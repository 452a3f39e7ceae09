//! Archive handles and member snapshots.

use crate::classify::classify;
use crate::compression::Compression;
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tarbro_core::{Error, Kind, Result};
use tracing::debug;

/// Opens handles on one archive file.
///
/// The reader itself holds no open file; every `open` call produces an
/// independent handle owned by its caller.
#[derive(Debug, Clone)]
pub struct ArchiveReader {
    path: PathBuf,
}

impl ArchiveReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open the archive and snapshot every member.
    pub fn open(&self) -> Result<ArchiveHandle> {
        let mut file = File::open(&self.path).map_err(|e| self.open_error(e))?;
        let compression = Compression::sniff(&mut file).map_err(|e| self.open_error(e))?;

        let (members, index) = scan_members(&mut file, compression).map_err(|e| self.open_error(e))?;

        debug!(
            archive = %self.path.display(),
            members = members.len(),
            ?compression,
            "Opened archive"
        );

        Ok(ArchiveHandle {
            path: self.path.clone(),
            file,
            compression,
            members,
            index,
        })
    }

    /// Open the archive file itself, unparsed, for whole-archive downloads.
    pub fn open_raw(&self) -> Result<File> {
        File::open(&self.path).map_err(|e| self.open_error(e))
    }

    fn open_error(&self, err: io::Error) -> Error {
        Error::ArchiveOpen {
            path: self.path.display().to_string(),
            reason: err.to_string(),
        }
    }
}

/// Metadata of one archive member, as read at open time.
#[derive(Debug, Clone)]
pub struct Member {
    /// Normalized archive-relative path.
    pub path: String,
    pub entry_type: tar::EntryType,
    /// Modification time, unix seconds.
    pub mtime: u64,
    pub size: u64,
    pub link_target: Option<String>,
    data_offset: u64,
}

impl Member {
    pub fn kind(&self) -> Result<Kind> {
        classify(self)
    }
}

/// An open archive with its member snapshot.
///
/// Not shared between concurrent operations. Dropping the handle closes
/// the file.
#[derive(Debug)]
pub struct ArchiveHandle {
    path: PathBuf,
    file: File,
    compression: Compression,
    members: Vec<Member>,
    index: HashMap<String, usize>,
}

impl ArchiveHandle {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn compression(&self) -> Compression {
        self.compression
    }

    /// Member paths in archive order.
    pub fn list_members(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|m| m.path.as_str())
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn get_member(&self, path: &str) -> Result<&Member> {
        self.index
            .get(normalize_path(path))
            .map(|&i| &self.members[i])
            .ok_or_else(|| Error::MemberNotFound(path.to_string()))
    }

    /// Open a content stream for a regular file. Consumes the handle; the
    /// stream owns the file and closes it when dropped.
    pub fn extract(mut self, path: &str) -> Result<MemberStream> {
        let member = self.get_member(path)?;
        match member.kind() {
            Ok(Kind::File) => {}
            Ok(kind) => {
                return Err(Error::Extract {
                    path: path.to_string(),
                    reason: format!("member is a {}", kind),
                });
            }
            Err(e) => {
                return Err(Error::Extract {
                    path: path.to_string(),
                    reason: e.to_string(),
                });
            }
        }
        let (offset, size) = (member.data_offset, member.size);
        let extract_error = |e: io::Error| Error::Extract {
            path: path.to_string(),
            reason: e.to_string(),
        };

        let inner: Box<dyn Read + Send> = if self.compression.is_seekable() {
            self.file
                .seek(SeekFrom::Start(offset))
                .map_err(extract_error)?;
            Box::new(self.file.take(size))
        } else {
            self.file.seek(SeekFrom::Start(0)).map_err(extract_error)?;
            let mut decoder = self.compression.decoder(self.file).map_err(extract_error)?;
            let skipped = io::copy(&mut decoder.by_ref().take(offset), &mut io::sink())
                .map_err(extract_error)?;
            if skipped < offset {
                return Err(extract_error(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "archive ended before member data",
                )));
            }
            Box::new(decoder.take(size))
        };

        Ok(MemberStream { inner, size })
    }
}

/// Blocking byte stream over one member's content.
pub struct MemberStream {
    inner: Box<dyn Read + Send>,
    size: u64,
}

impl MemberStream {
    /// Declared size of the member in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }
}

impl Read for MemberStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

/// Strip `./` and `/` prefixes and trailing slashes.
pub fn normalize_path(path: &str) -> &str {
    let mut p = path;
    loop {
        if let Some(rest) = p.strip_prefix("./") {
            p = rest;
        } else if let Some(rest) = p.strip_prefix('/') {
            p = rest;
        } else {
            break;
        }
    }
    let p = p.trim_end_matches('/');
    if p == "." { "" } else { p }
}

fn scan_members(
    file: &mut File,
    compression: Compression,
) -> io::Result<(Vec<Member>, HashMap<String, usize>)> {
    let decoder = compression.decoder(&mut *file)?;
    let mut archive = tar::Archive::new(decoder);

    let mut members: Vec<Member> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for entry in archive.entries()? {
        let entry = entry?;
        let raw_path = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
        let path = normalize_path(&raw_path).to_string();
        if path.is_empty() {
            // The archive's own "./" entry; the root is implicit.
            continue;
        }

        let header = entry.header();
        let member = Member {
            entry_type: header.entry_type(),
            mtime: header.mtime()?,
            size: entry.size(),
            link_target: entry
                .link_name_bytes()
                .map(|b| String::from_utf8_lossy(&b).into_owned()),
            data_offset: entry.raw_file_position(),
            path: path.clone(),
        };

        // Later entries replace earlier ones with the same path, like tar
        // extraction would.
        match index.get(&path) {
            Some(&i) => members[i] = member,
            None => {
                index.insert(path, members.len());
                members.push(member);
            }
        }
    }

    Ok((members, index))
}
