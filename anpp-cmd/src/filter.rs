use std::{
    collections::HashSet,
    io::{Read, Write},
};

use anpp::framing::FrameReader;
use anyhow::{Context, Result};
use tracing::trace;

/// Include/exclude selection of packet ids. Ids are first included, then excluded;
/// an empty include set includes everything.
#[derive(Debug, Default)]
pub struct IdFilter {
    include: HashSet<u8>,
    exclude: HashSet<u8>,
}

impl IdFilter {
    pub fn new(include: &[u8], exclude: &[u8]) -> Self {
        IdFilter {
            include: include.iter().copied().collect(),
            exclude: exclude.iter().copied().collect(),
        }
    }

    pub fn accepts(&self, id: u8) -> bool {
        if !self.include.is_empty() && !self.include.contains(&id) {
            trace!(id, "skip not included");
            return false;
        }
        if self.exclude.contains(&id) {
            trace!(id, "skip excluded");
            return false;
        }
        true
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Stats {
    pub kept: usize,
    pub skipped: usize,
    pub crc_errors: u64,
}

pub fn filter<R, W>(input: R, mut writer: W, ids: &IdFilter) -> Result<Stats>
where
    R: Read,
    W: Write,
{
    let mut reader = FrameReader::new(input);
    let mut stats = Stats::default();
    for frame in reader.by_ref() {
        let frame = frame.context("reading input")?;
        if !ids.accepts(frame.id()) {
            stats.skipped += 1;
            continue;
        }
        writer
            .write_all(&frame.to_bytes())
            .context("writing output")?;
        stats.kept += 1;
    }
    writer.flush()?;
    stats.crc_errors = reader.decoder().crc_errors();

    Ok(stats)
}
