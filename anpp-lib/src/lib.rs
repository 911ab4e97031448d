#![doc = include_str!("../README.md")]

mod bytes;
mod error;

pub mod framing;
pub mod packets;

#[cfg(feature = "timecode")]
pub mod timecode;

pub use error::{Error, Result};
pub use framing::Frame;
