use std::io::{ErrorKind, Read};

use super::{Decoder, Frame};
use crate::Result;

/// Reads [Frame]s from a byte stream such as a log file, serial port or socket.
///
/// Bytes are pulled from the reader in chunks and fed to an owned [Decoder]. Frames are
/// produced in stream order. The iterator ends at EOF, after any frames still in the
/// buffer. At EOF a candidate header still waiting for its payload is given up on (see
/// [Decoder::finish]) so frames buffered behind it are not lost. Non-EOF read errors are
/// passed on to the consumer.
pub struct FrameReader<R>
where
    R: Read,
{
    reader: R,
    decoder: Decoder,
    chunk: Vec<u8>,
    eof: bool,
}

impl<R> FrameReader<R>
where
    R: Read,
{
    pub const DEFAULT_CHUNK_SIZE: usize = 4096;

    pub fn new(reader: R) -> Self {
        Self::with_decoder(reader, Decoder::new())
    }

    /// Create a reader that uses a pre-configured decoder.
    pub fn with_decoder(reader: R, decoder: Decoder) -> Self {
        FrameReader {
            reader,
            decoder,
            chunk: vec![0u8; Self::DEFAULT_CHUNK_SIZE],
            eof: false,
        }
    }

    /// Set the max number of bytes requested from the reader at a time.
    ///
    /// # Panics
    /// If `size` is zero.
    #[must_use]
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        assert!(size > 0, "chunk size must be non-zero");
        self.chunk = vec![0u8; size];
        self
    }

    /// The decoder, e.g., to get [Decoder::crc_errors] after reading.
    pub fn decoder(&self) -> &Decoder {
        &self.decoder
    }

    /// Read the next frame, returning `Ok(None)` at the end of the stream.
    ///
    /// # Errors
    /// Any [std::io::Error] from the reader other than [ErrorKind::Interrupted], which
    /// is retried.
    pub fn read_frame(&mut self) -> Result<Option<Frame>> {
        loop {
            if self.eof {
                return Ok(self.decoder.finish());
            }
            if let Some(frame) = self.decoder.decode() {
                return Ok(Some(frame));
            }
            match self.reader.read(&mut self.chunk) {
                Ok(0) => self.eof = true,
                Ok(n) => self.decoder.add_data(&self.chunk[..n]),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            }
        }
    }
}

impl<R> Iterator for FrameReader<R>
where
    R: Read,
{
    type Item = Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_frame().transpose()
    }
}

/// Creates an iterator over all valid frames in `reader` using a default [Decoder].
///
/// # Examples
/// ```
/// use anpp::framing::{read_frames, Frame};
///
/// let mut dat = Frame::encode(1, 1, vec![0x02]).to_bytes();
/// dat.extend(Frame::encode(1, 3, vec![0x02, 0x03, 0xb6]).to_bytes());
/// let frames: Vec<Frame> = read_frames(&dat[..]).filter_map(Result::ok).collect();
/// assert_eq!(frames.len(), 2);
/// ```
pub fn read_frames<R>(reader: R) -> impl Iterator<Item = Result<Frame>>
where
    R: Read,
{
    FrameReader::new(reader)
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;
    use crate::{framing::header_lrc, Error};

    // Yields one byte per read with interruptions in between.
    struct Trickle<'a> {
        dat: &'a [u8],
        interrupt: bool,
    }

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.interrupt = !self.interrupt;
            if self.interrupt {
                return Err(io::Error::from(ErrorKind::Interrupted));
            }
            if self.dat.is_empty() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.dat[0];
            self.dat = &self.dat[1..];
            Ok(1)
        }
    }

    struct Broken;

    impl Read for Broken {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(ErrorKind::BrokenPipe, "gone"))
        }
    }

    fn stream() -> Vec<u8> {
        let mut dat = vec![0xde, 0xad];
        for id in [20u8, 21, 22] {
            dat.extend(Frame::new(id, vec![id; usize::from(id)]).unwrap().to_bytes());
        }
        dat.push(0xbe);
        dat
    }

    #[test]
    fn test_read_chunked() {
        let dat = stream();
        for size in [1, 3, 7, 4096] {
            let ids: Vec<u8> = FrameReader::new(&dat[..])
                .with_chunk_size(size)
                .map(|r| r.unwrap().id())
                .collect();
            assert_eq!(ids, vec![20, 21, 22], "chunk size {size}");
        }
    }

    #[test]
    fn test_read_interrupted() {
        let dat = stream();
        let reader = Trickle {
            dat: &dat,
            interrupt: false,
        };
        let frames: Vec<Frame> = read_frames(reader).collect::<Result<_>>().unwrap();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[2].payload(), &[22u8; 22][..]);
    }

    #[test]
    fn test_read_error() {
        let mut frames = FrameReader::new(Broken);
        let zult = frames.next().expect("an error item");
        assert!(matches!(zult, Err(Error::Io(_))), "{zult:?}");
    }

    #[test]
    fn test_false_header_at_end_of_input() {
        let fields = [0x33, 200, 0x12, 0x34];
        let mut dat = vec![header_lrc(&fields)];
        dat.extend(fields);
        let frame = Frame::new(20, vec![7; 100]).unwrap();
        dat.extend(frame.to_bytes());

        let mut frames = FrameReader::new(&dat[..]);
        let got: Vec<Frame> = frames.by_ref().collect::<Result<_>>().unwrap();

        assert_eq!(got, vec![frame]);
        assert_eq!(frames.decoder().crc_errors(), 1);
        assert_eq!(frames.decoder().buffered(), 0);
    }

    #[test]
    fn test_read_empty() {
        let mut frames = FrameReader::new(io::empty());
        assert!(frames.next().is_none());
        assert_eq!(frames.decoder().frames_decoded(), 0);
    }
}
