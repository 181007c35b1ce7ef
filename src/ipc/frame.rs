//! Exact-length binary frame reading.
//!
//! After a `transcribe` command the input stream carries exactly the
//! declared number of raw audio bytes with no delimiter. The reader
//! must consume that many bytes and not one more; anything left over
//! would corrupt the next command line.

use std::io::{ErrorKind, Read};

use crate::error::{Result, WhisperdError};

/// Growth step for the frame buffer. Memory is committed as bytes
/// arrive, never from the declared length alone.
const FRAME_CHUNK: usize = 256 * 1024;

/// Read exactly `expected` bytes from `reader`.
///
/// Short reads are accumulated until the full count arrives; interrupted
/// reads are retried. A zero-length read means the stream ended, in
/// which case the shortfall is reported with both the expected and the
/// obtained byte counts. Partial frames are never returned. The buffer
/// grows in `FRAME_CHUNK` steps as data arrives, so a corrupt declared
/// length is reported as a shortfall instead of being allocated up
/// front.
pub fn read_frame<R: Read>(reader: &mut R, expected: usize) -> Result<Vec<u8>> {
    let mut buf: Vec<u8> = Vec::new();
    let mut filled = 0;
    while filled < expected {
        if filled == buf.len() {
            let step = (expected - filled).min(FRAME_CHUNK);
            if buf.try_reserve(step).is_err() {
                return Err(WhisperdError::FrameTruncated {
                    expected,
                    got: filled,
                });
            }
            buf.resize(filled + step, 0);
        }
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    buf.truncate(filled);
    if filled < expected {
        return Err(WhisperdError::FrameTruncated {
            expected,
            got: filled,
        });
    }
    Ok(buf)
}
