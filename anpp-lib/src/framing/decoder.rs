use tracing::{debug, trace};
use typed_builder::TypedBuilder;

use super::{crc16, header_lrc, Frame, HEADER_LEN, MAX_PAYLOAD_LEN};
use crate::packets::PacketId;

/// [Decoder] tuning parameters.
///
/// # Examples
/// ```
/// use anpp::framing::{Decoder, DecoderOpts};
///
/// let decoder = Decoder::with_opts(DecoderOpts::builder().known_ids_only(true).build());
/// ```
#[derive(TypedBuilder, Debug, Clone)]
pub struct DecoderOpts {
    /// Number of consumed bytes after which the consumed prefix is dropped from the
    /// buffer following a successful decode.
    #[builder(default = Decoder::DEFAULT_COMPACT_THRESHOLD)]
    pub compact_threshold: usize,
    /// Buffer size after which [Decoder::add_data] drops the consumed prefix before
    /// appending. Keeps a stream that never synchronizes from growing the buffer
    /// without bound.
    #[builder(default = Decoder::DEFAULT_STREAM_THRESHOLD)]
    pub stream_threshold: usize,
    /// Skip CRC valid frames whose id is not a known [PacketId].
    #[builder(default = false)]
    pub known_ids_only: bool,
}

impl Default for DecoderOpts {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Stateful scanner that extracts validated [Frame]s from an incrementally fed byte
/// stream.
///
/// Bytes are appended with [Decoder::add_data] and frames are pulled one at a time
/// with [Decoder::decode] until it returns `None`. Frames come out in stream order and
/// no byte is ever part of more than one frame.
///
/// Corrupt input is never an error. The header LRC is only a cheap filter, so a
/// candidate header is not committed to until the payload CRC matches. On any mismatch
/// the scanner moves forward a single byte and tries again. CRC failures are counted
/// and available via [Decoder::crc_errors].
///
/// # Examples
/// ```
/// use anpp::framing::{Decoder, Frame};
///
/// let frame = Frame::encode(1, 1, vec![0x02]);
/// let mut decoder = Decoder::new();
/// decoder.add_data(&[0x00, 0x13]); // noise
/// decoder.add_data(&frame.to_bytes());
/// assert_eq!(decoder.decode(), Some(frame));
/// assert_eq!(decoder.decode(), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    opts: DecoderOpts,
    buf: Vec<u8>,
    // Index of the next unexamined byte; everything before it is consumed.
    cursor: usize,
    crc_errors: u64,
    unknown_ids: u64,
    frames: u64,
}

impl Decoder {
    /// Ten maximum size frames.
    pub const DEFAULT_COMPACT_THRESHOLD: usize = 10 * (MAX_PAYLOAD_LEN + HEADER_LEN);
    pub const DEFAULT_STREAM_THRESHOLD: usize = 16 * 1024;

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_opts(opts: DecoderOpts) -> Self {
        Decoder {
            opts,
            ..Default::default()
        }
    }

    /// Append stream bytes. No decoding happens here.
    pub fn add_data(&mut self, dat: &[u8]) {
        if self.buf.len() > self.opts.stream_threshold {
            self.compact();
        }
        self.buf.extend_from_slice(dat);
    }

    /// Extract the next valid frame, or `None` if the buffered bytes do not contain
    /// one yet.
    ///
    /// When `None` is returned the bytes of any incomplete candidate frame are kept, so
    /// calling again after more data has been added picks up the same candidate.
    pub fn decode(&mut self) -> Option<Frame> {
        loop {
            let start = self.cursor;
            if self.buf.len() - start < HEADER_LEN {
                self.compact();
                return None;
            }

            let lrc = self.buf[start];
            let fields = [
                self.buf[start + 1],
                self.buf[start + 2],
                self.buf[start + 3],
                self.buf[start + 4],
            ];
            if header_lrc(&fields) != lrc {
                self.cursor += 1;
                continue;
            }

            let [id, length, crc_lo, crc_hi] = fields;
            let end = start + HEADER_LEN + usize::from(length);
            if end > self.buf.len() {
                // Starved; wait for the rest of this candidate
                self.compact();
                return None;
            }

            let payload = &self.buf[start + HEADER_LEN..end];
            if crc16(payload) != u16::from_le_bytes([crc_lo, crc_hi]) {
                self.crc_errors += 1;
                trace!(offset = start, id, length, "crc mismatch, resyncing");
                self.cursor += 1;
                continue;
            }

            if self.opts.known_ids_only && !PacketId::is_known(id) {
                self.unknown_ids += 1;
                debug!(id, length, "skipping frame with unknown id");
                self.cursor = end;
                continue;
            }

            let frame = Frame {
                id,
                length,
                header: [lrc, id, length, crc_lo, crc_hi],
                payload: payload.to_vec(),
            };
            self.cursor = end;
            self.frames += 1;
            if self.cursor > self.opts.compact_threshold {
                self.compact();
            }
            return Some(frame);
        }
    }

    /// Extract the next frame once no more data will be added.
    ///
    /// Works like [Decoder::decode] except that a candidate waiting for its payload can
    /// no longer complete. It is counted as a CRC error and scanning resumes one byte
    /// later, so valid frames behind a false header are still returned. `None` means
    /// fewer than [HEADER_LEN] bytes remain.
    pub fn finish(&mut self) -> Option<Frame> {
        loop {
            if let Some(frame) = self.decode() {
                return Some(frame);
            }
            if self.buffered() < HEADER_LEN {
                return None;
            }
            self.crc_errors += 1;
            trace!(offset = self.cursor, "incomplete candidate at end of input, resyncing");
            self.cursor += 1;
        }
    }

    /// Iterator over the frames currently decodable from the buffer.
    pub fn drain(&mut self) -> Drain<'_> {
        Drain { decoder: self }
    }

    /// Number of LRC valid candidate headers rejected by the payload CRC, including
    /// those abandoned by [Decoder::finish].
    #[must_use]
    pub fn crc_errors(&self) -> u64 {
        self.crc_errors
    }

    /// Number of valid frames skipped because of [DecoderOpts::known_ids_only].
    #[must_use]
    pub fn unknown_ids(&self) -> u64 {
        self.unknown_ids
    }

    /// Number of frames returned so far.
    #[must_use]
    pub fn frames_decoded(&self) -> u64 {
        self.frames
    }

    /// Number of buffered bytes not yet consumed.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.buf.len() - self.cursor
    }

    // Drop the consumed prefix.
    fn compact(&mut self) {
        if self.cursor == 0 {
            return;
        }
        trace!(consumed = self.cursor, remaining = self.buffered(), "compacting");
        self.buf.drain(..self.cursor);
        self.cursor = 0;
    }
}

/// Created by [Decoder::drain].
pub struct Drain<'a> {
    decoder: &'a mut Decoder,
}

impl Iterator for Drain<'_> {
    type Item = Frame;

    fn next(&mut self) -> Option<Self::Item> {
        self.decoder.decode()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn frame_bytes(id: u8, payload: &[u8]) -> Vec<u8> {
        Frame::new(id, payload.to_vec()).unwrap().to_bytes()
    }

    #[test]
    fn test_empty_buffer() {
        let mut decoder = Decoder::new();
        assert_eq!(decoder.decode(), None);
        decoder.add_data(&[]);
        assert_eq!(decoder.decode(), None);
        assert_eq!(decoder.crc_errors(), 0);
    }

    #[test]
    fn test_header_only_frame() {
        // a zero length frame is exactly HEADER_LEN bytes and must not starve
        let dat = frame_bytes(20, &[]);
        let mut decoder = Decoder::new();
        decoder.add_data(&dat);
        let frame = decoder.decode().expect("zero length frame");
        assert_eq!(frame.id(), 20);
        assert_eq!(frame.length(), 0);
    }

    #[test]
    fn test_back_to_back() {
        let mut decoder = Decoder::new();
        decoder.add_data(&frame_bytes(1, &[2]));
        decoder.add_data(&frame_bytes(1, &[2, 3, 182]));

        assert_eq!(decoder.decode().unwrap().payload(), &[2]);
        assert_eq!(decoder.decode().unwrap().payload(), &[2, 3, 182]);
        assert_eq!(decoder.decode(), None);
        assert_eq!(decoder.frames_decoded(), 2);
        assert_eq!(decoder.buffered(), 0);
    }

    #[test]
    fn test_zero_noise_resync() {
        // Every 5 zero bytes form an LRC valid header for an empty payload whose CRC
        // must be 0xFFFF, so each such window is a false positive.
        let mut decoder = Decoder::new();
        decoder.add_data(&[0u8; 32]);
        decoder.add_data(&frame_bytes(1, &[2]));

        let frame = decoder.decode().expect("frame after noise");
        assert_eq!(frame.payload(), &[2]);
        assert_eq!(decoder.crc_errors(), 28);
        assert_eq!(decoder.decode(), None);
    }

    #[test]
    fn test_starved_keeps_candidate() {
        let dat = frame_bytes(3, &[0xaa; 24]);
        let mut decoder = Decoder::new();
        decoder.add_data(&dat[..10]);

        assert_eq!(decoder.decode(), None);
        assert_eq!(decoder.buffered(), 10);
        assert_eq!(decoder.decode(), None);
        assert_eq!(decoder.buffered(), 10);

        decoder.add_data(&dat[10..]);
        let frame = decoder.decode().expect("complete frame");
        assert_eq!(frame.id(), 3);
        assert_eq!(frame.payload(), &[0xaa; 24]);
        assert_eq!(decoder.crc_errors(), 0);
    }

    #[test]
    fn test_short_tail_kept() {
        let mut decoder = Decoder::new();
        decoder.add_data(&[0x82, 0x00, 0x04]);
        assert_eq!(decoder.decode(), None);
        assert_eq!(decoder.buffered(), 3);
        decoder.add_data(&[0x79, 0x01, 0xb8, 0xc0, 0x84, 0x00]);
        assert_eq!(decoder.decode().unwrap().payload(), &[0xb8, 0xc0, 0x84, 0x00]);
    }

    #[test]
    fn test_corrupt_frame_skipped() {
        let mut bad = frame_bytes(20, &[1, 2, 3, 4]);
        bad[7] ^= 0xff;
        let mut decoder = Decoder::new();
        decoder.add_data(&bad);
        decoder.add_data(&frame_bytes(21, &[5, 6, 7, 8, 9, 10, 11, 12]));

        let frame = decoder.decode().expect("second frame");
        assert_eq!(frame.id(), 21);
        assert!(decoder.crc_errors() >= 1);
        assert_eq!(decoder.decode(), None);
    }

    #[test]
    fn test_byte_at_a_time() {
        let mut stream = frame_bytes(1, &[2]);
        stream.extend(frame_bytes(30, &[0x11; 13]));
        stream.extend(frame_bytes(0, &[0xb8, 0xc0, 0x84, 0x00]));

        let mut decoder = Decoder::new();
        let mut ids = Vec::new();
        for b in &stream {
            decoder.add_data(&[*b]);
            ids.extend(decoder.drain().map(|f| f.id()));
        }
        assert_eq!(ids, vec![1, 30, 0]);
        assert_eq!(decoder.crc_errors(), 0);
    }

    #[test]
    fn test_random_noise_between_frames() {
        let mut rng = StdRng::seed_from_u64(0x414e5050);
        let mut decoder = Decoder::new();
        let mut expected = Vec::new();
        for i in 0..50u8 {
            let noise: Vec<u8> = (0..rng.gen_range(0..40)).map(|_| rng.gen()).collect();
            decoder.add_data(&noise);
            let payload: Vec<u8> = (0..rng.gen_range(1..64)).map(|_| rng.gen()).collect();
            decoder.add_data(&frame_bytes(i, &payload));
            expected.push((i, payload));
        }

        let got: Vec<(u8, Vec<u8>)> = std::iter::from_fn(|| decoder.finish())
            .map(|f| (f.id(), f.into_payload()))
            .collect();
        assert_eq!(got, expected);
        assert!(decoder.buffered() < HEADER_LEN);
    }

    // LRC valid header claiming a 200 byte payload that never arrives.
    fn false_header() -> Vec<u8> {
        let fields = [0x33, 200, 0x12, 0x34];
        let mut dat = vec![header_lrc(&fields)];
        dat.extend(fields);
        dat
    }

    #[test]
    fn test_false_header_waits_for_data() {
        let mut decoder = Decoder::new();
        decoder.add_data(&false_header());
        decoder.add_data(&frame_bytes(20, &[7; 100]));

        assert_eq!(decoder.decode(), None);
        assert_eq!(decoder.buffered(), 110);

        let frame = decoder.finish().expect("frame behind false header");
        assert_eq!(frame.id(), 20);
        assert_eq!(frame.payload(), &[7; 100]);
        assert_eq!(decoder.crc_errors(), 1);
        assert_eq!(decoder.finish(), None);
        assert_eq!(decoder.buffered(), 0);
    }

    #[test]
    fn test_long_false_header_before_frames() {
        let mut decoder = Decoder::new();
        decoder.add_data(&false_header());
        let mut expected = Vec::new();
        for i in 0..10u8 {
            let payload = vec![i; 40];
            decoder.add_data(&frame_bytes(i, &payload));
            expected.push((i, payload));
        }

        let got: Vec<(u8, Vec<u8>)> = decoder
            .drain()
            .map(|f| (f.id(), f.into_payload()))
            .collect();
        assert_eq!(got, expected);
        assert_eq!(decoder.crc_errors(), 1);
        assert_eq!(decoder.buffered(), 0);
    }

    #[test]
    fn test_finish_drops_short_tail() {
        let mut decoder = Decoder::new();
        decoder.add_data(&frame_bytes(1, &[2]));
        decoder.add_data(&[0x82, 0x00, 0x04]);

        assert_eq!(decoder.finish().unwrap().payload(), &[2]);
        assert_eq!(decoder.finish(), None);
        assert_eq!(decoder.buffered(), 3);
        assert_eq!(decoder.crc_errors(), 0);
    }

    #[test]
    fn test_compaction_preserves_stream() {
        let opts = DecoderOpts::builder()
            .compact_threshold(16)
            .stream_threshold(32)
            .build();
        let mut decoder = Decoder::with_opts(opts);
        let dat = frame_bytes(22, &[7; 14]);
        let mut count = 0;
        for _ in 0..100 {
            decoder.add_data(&dat[..9]);
            count += decoder.drain().count();
            decoder.add_data(&dat[9..]);
            count += decoder.drain().count();
            assert!(decoder.buf.len() <= 64, "buffer len {}", decoder.buf.len());
        }
        assert_eq!(count, 100);
        assert_eq!(decoder.crc_errors(), 0);
    }

    #[test]
    fn test_stream_threshold_bounds_garbage() {
        let opts = DecoderOpts::builder().stream_threshold(1024).build();
        let mut decoder = Decoder::with_opts(opts);
        let garbage = [0x5au8; 128];
        for _ in 0..100 {
            decoder.add_data(&garbage);
            assert_eq!(decoder.decode(), None);
        }
        assert!(decoder.buf.len() <= 1024 + 128);
    }

    #[test]
    fn test_known_ids_only() {
        let mut stream = frame_bytes(12, &[1, 2, 3]); // undeclared id
        stream.extend(frame_bytes(20, &[4, 5, 6]));

        let mut permissive = Decoder::new();
        permissive.add_data(&stream);
        assert_eq!(permissive.drain().map(|f| f.id()).collect::<Vec<_>>(), vec![12, 20]);

        let mut strict = Decoder::with_opts(DecoderOpts::builder().known_ids_only(true).build());
        strict.add_data(&stream);
        assert_eq!(strict.drain().map(|f| f.id()).collect::<Vec<_>>(), vec![20]);
        assert_eq!(strict.unknown_ids(), 1);
        assert_eq!(strict.crc_errors(), 0);
    }
}
