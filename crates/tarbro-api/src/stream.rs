//! Chunked streaming of blocking readers.

use bytes::Bytes;
use futures::Stream;
use std::io::{self, Read};
use std::pin::Pin;
use tokio::sync::mpsc;
use tracing::debug;

/// Fixed chunk size for streamed content.
pub const CHUNK_SIZE: usize = 256;

/// Stream of content chunks.
pub type ChunkStream = Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send>>;

/// Stream `reader` in `CHUNK_SIZE` chunks.
pub fn chunked<R: Read + Send + 'static>(reader: R) -> ChunkStream {
    chunked_with(reader, CHUNK_SIZE)
}

/// Stream `reader` in chunks of `chunk_size` bytes; only the last chunk
/// may be shorter.
///
/// The reader is driven on the blocking pool and dropped as soon as it is
/// exhausted, fails, or the stream is dropped by the consumer.
pub fn chunked_with<R: Read + Send + 'static>(mut reader: R, chunk_size: usize) -> ChunkStream {
    let (tx, mut rx) = mpsc::channel::<io::Result<Bytes>>(8);

    tokio::task::spawn_blocking(move || {
        let mut buf = vec![0u8; chunk_size];
        loop {
            let item = match read_chunk(&mut reader, &mut buf) {
                Ok(0) => break,
                Ok(n) => Ok(Bytes::copy_from_slice(&buf[..n])),
                Err(e) => Err(e),
            };
            let failed = item.is_err();
            if tx.blocking_send(item).is_err() {
                debug!("Stream consumer went away, releasing reader");
                break;
            }
            if failed {
                break;
            }
        }
    });

    Box::pin(async_stream::stream! {
        while let Some(item) = rx.recv().await {
            yield item;
        }
    })
}

/// Fill `buf` as far as the reader allows; short only at end of input.
fn read_chunk<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
