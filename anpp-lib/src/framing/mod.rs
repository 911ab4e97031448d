//! ANPP frame container, stream decoder and reader.
//!
//! A frame on the wire is a 5 byte header followed by the payload:
//!
//! | Offset | Field   | Width | |
//! |---|---|---|---|
//! | 0 | LRC | 1 | two's complement of the sum of bytes 1..5 |
//! | 1 | id | 1 | packet type identifier |
//! | 2 | length | 1 | payload byte count |
//! | 3 | crc16 | 2 | CRC-CCITT over the payload, little-endian |
//! | 5 | payload | length | packet specific layout |
mod decoder;
mod integrity;
mod reader;

use std::fmt::Display;

use crate::{Error, Result};

pub use decoder::{Decoder, DecoderOpts, Drain};
pub use integrity::{crc16, header_lrc};
pub use reader::{read_frames, FrameReader};

/// Size of a frame header.
pub const HEADER_LEN: usize = 5;
/// Largest payload a single frame can carry.
pub const MAX_PAYLOAD_LEN: usize = u8::MAX as usize;

/// A single validated ANPP frame.
///
/// Frames produced by [Frame::encode], [Frame::new], [Frame::decode] or a [Decoder]
/// always satisfy `header[0] == header_lrc(header[1..5])` and
/// `crc16(payload) == crc()`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Frame {
    id: u8,
    length: u8,
    header: [u8; HEADER_LEN],
    #[cfg_attr(feature = "serde", serde(with = "serde_bytes"))]
    payload: Vec<u8>,
}

impl Display for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Frame{{id={}, length={}, crc={:#06x}}}",
            self.id,
            self.length,
            self.crc()
        )
    }
}

impl Frame {
    /// Build a frame, computing the payload CRC and the header LRC.
    ///
    /// # Panics
    /// If `length` does not equal `payload.len()`. Use [Frame::new] to have the length
    /// derived and checked.
    #[must_use]
    pub fn encode(id: u8, length: u8, payload: impl Into<Vec<u8>>) -> Frame {
        let payload = payload.into();
        assert_eq!(
            usize::from(length),
            payload.len(),
            "frame length does not match payload length"
        );
        let [crc_lo, crc_hi] = crc16(&payload).to_le_bytes();
        let lrc = header_lrc(&[id, length, crc_lo, crc_hi]);
        Frame {
            id,
            length,
            header: [lrc, id, length, crc_lo, crc_hi],
            payload,
        }
    }

    /// Build a frame with the length taken from `payload`.
    ///
    /// # Errors
    /// [Error::PayloadTooLarge] if the payload is longer than [MAX_PAYLOAD_LEN].
    pub fn new(id: u8, payload: impl Into<Vec<u8>>) -> Result<Frame> {
        let payload = payload.into();
        let length =
            u8::try_from(payload.len()).map_err(|_| Error::PayloadTooLarge { len: payload.len() })?;
        Ok(Frame::encode(id, length, payload))
    }

    /// Validate a single frame at the start of `dat`.
    ///
    /// Returns `None` if the header LRC or payload CRC do not match, or if `dat` is too
    /// short for the header or the payload the header declares. Bytes beyond the frame
    /// are ignored.
    #[must_use]
    pub fn decode(dat: &[u8]) -> Option<Frame> {
        if dat.len() < HEADER_LEN {
            return None;
        }
        let fields = [dat[1], dat[2], dat[3], dat[4]];
        if header_lrc(&fields) != dat[0] {
            return None;
        }
        let end = HEADER_LEN + usize::from(fields[1]);
        let payload = dat.get(HEADER_LEN..end)?;
        if crc16(payload) != u16::from_le_bytes([fields[2], fields[3]]) {
            return None;
        }
        Some(Frame {
            id: fields[0],
            length: fields[1],
            header: [dat[0], fields[0], fields[1], fields[2], fields[3]],
            payload: payload.to_vec(),
        })
    }

    #[must_use]
    pub fn id(&self) -> u8 {
        self.id
    }

    /// Payload byte count as declared by the header.
    #[must_use]
    pub fn length(&self) -> u8 {
        self.length
    }

    #[must_use]
    pub fn header(&self) -> &[u8; HEADER_LEN] {
        &self.header
    }

    #[must_use]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    #[must_use]
    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }

    #[must_use]
    pub fn lrc(&self) -> u8 {
        self.header[0]
    }

    #[must_use]
    pub fn crc(&self) -> u16 {
        u16::from_le_bytes([self.header[3], self.header[4]])
    }

    /// Total on-wire size, header included.
    #[must_use]
    pub fn wire_len(&self) -> usize {
        HEADER_LEN + self.payload.len()
    }

    /// Header followed by payload, as it is written to a transport.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut dat = Vec::with_capacity(self.wire_len());
        dat.extend_from_slice(&self.header);
        dat.extend_from_slice(&self.payload);
        dat
    }
}
