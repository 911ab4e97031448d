use crate::packets::DecodeError;

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Frame payloads are limited to what fits in the single length byte.
    #[error("payload of {len} bytes exceeds the 255 byte frame maximum")]
    PayloadTooLarge { len: usize },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Packet(#[from] DecodeError),

    #[error("Invalid timecode: {0}")]
    Timecode(String),
}

pub type Result<T> = std::result::Result<T, Error>;
