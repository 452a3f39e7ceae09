//! Compression detection for archive files.

use std::io::{self, BufReader, Read, Seek, SeekFrom};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const ZSTD_MAGIC: [u8; 4] = [0x28, 0xb5, 0x2f, 0xfd];

/// Outer compression of a tar archive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Compression {
    #[default]
    None,
    Gzip,
    Zstd,
}

impl Compression {
    /// Detect from the first bytes of `header`.
    pub fn from_magic(header: &[u8]) -> Self {
        if header.starts_with(&ZSTD_MAGIC) {
            Compression::Zstd
        } else if header.starts_with(&GZIP_MAGIC) {
            Compression::Gzip
        } else {
            Compression::None
        }
    }

    /// Sniff the magic bytes of a seekable source and rewind it.
    pub fn sniff<R: Read + Seek>(source: &mut R) -> io::Result<Self> {
        let mut header = [0u8; 4];
        let mut filled = 0;
        while filled < header.len() {
            match source.read(&mut header[filled..])? {
                0 => break,
                n => filled += n,
            }
        }
        source.seek(SeekFrom::Start(0))?;
        Ok(Self::from_magic(&header[..filled]))
    }

    /// Wrap `source` in the matching decoder.
    pub fn decoder<'a, R: Read + Send + 'a>(self, source: R) -> io::Result<Box<dyn Read + Send + 'a>> {
        Ok(match self {
            Compression::None => Box::new(source),
            Compression::Gzip => Box::new(flate2::read::MultiGzDecoder::new(source)),
            Compression::Zstd => Box::new(zstd::stream::read::Decoder::with_buffer(BufReader::new(source))?),
        })
    }

    pub fn is_seekable(self) -> bool {
        matches!(self, Compression::None)
    }
}
