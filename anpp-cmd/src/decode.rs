use std::io::{Read, Write};

use anpp::framing::read_frames;
use anpp::packets::{Packet, PacketId};
use anpp::Frame;
use anyhow::{Context, Result};
use serde::Serialize;

use crate::filter::IdFilter;

#[derive(Debug, Serialize)]
struct Record {
    id: u8,
    name: Option<&'static str>,
    length: u8,
    crc: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    packet: Option<Packet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl From<&Frame> for Record {
    fn from(frame: &Frame) -> Self {
        let (packet, error) = match Packet::decode(frame) {
            Ok(packet) => (Some(packet), None),
            Err(err) => (None, Some(err.to_string())),
        };
        Record {
            id: frame.id(),
            name: PacketId::try_from(frame.id()).ok().map(PacketId::name),
            length: frame.length(),
            crc: frame.crc(),
            packet,
            error,
        }
    }
}

/// Write each selected frame from `input` as a line of JSON.
pub fn decode<R, W>(input: R, mut writer: W, ids: &IdFilter) -> Result<()>
where
    R: Read,
    W: Write,
{
    for frame in read_frames(input) {
        let frame = frame.context("reading input")?;
        if !ids.accepts(frame.id()) {
            continue;
        }
        serde_json::to_writer(&mut writer, &Record::from(&frame)).context("serializing frame")?;
        writer.write_all(b"\n").context("writing output")?;
    }
    writer.flush()?;
    Ok(())
}
