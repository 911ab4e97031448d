use std::io::Write;

use anpp::packets::{Encode, PacketId, Request};
use anpp::Frame;
use anyhow::{anyhow, Context, Result};
use tracing::info;

fn encode(ids: &[u8]) -> Result<Frame> {
    let packets = ids
        .iter()
        .map(|id| PacketId::try_from(*id).map_err(|_| anyhow!("{id} is not a declared packet id")))
        .collect::<Result<Vec<_>>>()?;
    info!(
        "requesting {}",
        packets.iter().map(|id| id.name()).collect::<Vec<_>>().join(", ")
    );
    Request::new(packets)
        .encode()
        .context("encoding request")
}

/// Write the encoded request frame as a line of hex.
pub fn write_hex<W: Write>(ids: &[u8], mut writer: W) -> Result<()> {
    let frame = encode(ids)?;
    writeln!(writer, "{}", hex::encode(frame.to_bytes())).context("writing output")
}

/// Write the encoded request frame as raw bytes, ready for a serial port or socket.
pub fn write_raw<W: Write>(ids: &[u8], mut writer: W) -> Result<()> {
    let frame = encode(ids)?;
    writer.write_all(&frame.to_bytes()).context("writing output")?;
    writer.flush().context("writing output")
}
