use anpp::framing::{Decoder, DecoderOpts, FrameReader};
use anpp::packets::{Packet, PacketId};
use anyhow::{Context, Result};
use handlebars::handlebars_helper;
use hifitime::{Duration, Epoch};
use serde::Serialize;
use std::{
    cmp,
    collections::BTreeMap,
    io::{stdout, Read, Write},
    path::Path,
};
use tracing::debug;

#[derive(Debug, Clone)]
pub enum Format {
    Json,
    Text,
}

impl clap::ValueEnum for Format {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Json, Self::Text]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        match self {
            Self::Json => Some(clap::builder::PossibleValue::new("json")),
            Self::Text => Some(clap::builder::PossibleValue::new("text")),
        }
    }
}

#[derive(Default, Debug, Clone, Serialize)]
struct Summary {
    total_frames: u64,
    total_bytes: u64,
    crc_errors: u64,
    unknown_ids: u64,
    first_time: Option<Epoch>,
    last_time: Option<Epoch>,
    duration: Duration,
}

#[derive(Default, Debug, Clone, Serialize)]
struct IdSummary {
    name: Option<&'static str>,
    count: u64,
    bytes: u64,
    decode_errors: u64,
}

#[derive(Debug, Clone, Serialize)]
struct Info {
    filename: String,
    summary: Summary,
    ids: BTreeMap<u8, IdSummary>,
}

fn device_time(packet: &Packet) -> Option<Epoch> {
    let zult = match packet {
        Packet::SystemState(state) => state.epoch(),
        Packet::UnixTime(time) => time.epoch(),
        _ => return None,
    };
    zult.inspect_err(|err| debug!("invalid device time: {err}")).ok()
}

fn summarize<R: Read>(reader: R, known_only: bool) -> Result<(Summary, BTreeMap<u8, IdSummary>)> {
    let decoder = Decoder::with_opts(DecoderOpts::builder().known_ids_only(known_only).build());
    let mut frames = FrameReader::with_decoder(reader, decoder);

    let mut ids: BTreeMap<u8, IdSummary> = BTreeMap::default();
    let mut summary = Summary::default();

    for frame in frames.by_ref() {
        let frame = frame.context("reading input")?;
        summary.total_frames += 1;
        summary.total_bytes += frame.wire_len() as u64;

        let id = ids.entry(frame.id()).or_insert_with(|| IdSummary {
            name: PacketId::try_from(frame.id()).ok().map(PacketId::name),
            ..Default::default()
        });
        id.count += 1;
        id.bytes += frame.wire_len() as u64;

        let packet = match Packet::decode(&frame) {
            Ok(packet) => packet,
            Err(err) => {
                if Packet::is_supported(frame.id()) {
                    debug!("failed to decode {frame}: {err}");
                    id.decode_errors += 1;
                }
                continue;
            }
        };

        if let Some(epoch) = device_time(&packet) {
            summary.first_time = summary
                .first_time
                .map_or(Some(epoch), |cur| Some(cmp::min(epoch, cur)));
            summary.last_time = summary
                .last_time
                .map_or(Some(epoch), |cur| Some(cmp::max(epoch, cur)));
            if let (Some(first), Some(last)) = (summary.first_time, summary.last_time) {
                summary.duration = last - first;
            }
        }
    }

    summary.crc_errors = frames.decoder().crc_errors();
    summary.unknown_ids = frames.decoder().unknown_ids();

    Ok((summary, ids))
}

pub fn info(fpath: &Path, format: &Format, known_only: bool) -> Result<()> {
    let reader = std::fs::File::open(fpath).context("opening input")?;
    let (summary, ids) = summarize(reader, known_only)?;
    let info = Info {
        filename: fpath.to_string_lossy().to_string(),
        summary,
        ids,
    };

    match format {
        Format::Json => {
            serde_json::to_writer_pretty(stdout(), &info).context("serializing to json")
        }
        Format::Text => {
            let data = render_text(&info).context("serializing info")?;
            stdout()
                .write_all(str::as_bytes(&data))
                .context("writing to stdout")
        }
    }
}

fn json_text(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::String(s) => s.to_owned(),
        serde_json::Value::Null => String::new(),
        _ => v.to_string(),
    }
}

fn render_text(info: &Info) -> Result<String> {
    handlebars_helper!(left_pad: |num: u64, v: Json| {
        let num = usize::try_from(num).unwrap_or(0);
        format!("{:>num$}", json_text(v))
    });
    handlebars_helper!(right_pad: |num: u64, v: Json| {
        let num = usize::try_from(num).unwrap_or(0);
        format!("{:<num$}", json_text(v))
    });
    let mut hb = handlebars::Handlebars::new();
    hb.register_helper("lpad", Box::new(left_pad));
    hb.register_helper("rpad", Box::new(right_pad));
    hb.register_template_string("info", TEXT_TEMPLATE)
        .context("compiling text template")?;

    hb.render("info", &info).context("rendering text")
}

const TEXT_TEMPLATE: &str = r"{{ filename }}
===============================================================================
First:      {{ summary.first_time }}
Last:       {{ summary.last_time }}
Duration:   {{ summary.duration }}
Frames:     {{ summary.total_frames }}
Bytes:      {{ summary.total_bytes }}
CRC errors: {{ summary.crc_errors }}
Unknown:    {{ summary.unknown_ids }}
-------------------------------------------------------------------------------
 ID  Name                                      Count        Bytes  Decode errors
-------------------------------------------------------------------------------
{{ #each ids }}{{ lpad 3 @key }}  {{ rpad 40 name }}  {{ lpad 7 count }}  {{ lpad 11 bytes }}  {{ lpad 13 decode_errors }}
{{/each }}
";

#[cfg(test)]
mod tests {
    use super::*;
    use anpp::Frame;

    fn state(seconds: u32) -> Frame {
        let mut payload = vec![0u8; 100];
        payload[4..8].copy_from_slice(&seconds.to_le_bytes());
        Frame::new(20, payload).unwrap()
    }

    fn log() -> Vec<u8> {
        let mut dat = state(1_700_000_010).to_bytes();
        dat.extend([0x00, 0x00, 0x00, 0x00, 0x00, 0x33]);
        dat.extend(state(1_700_000_000).to_bytes());
        dat.extend(Frame::new(12, vec![9; 4]).unwrap().to_bytes());
        // wrong length for unix time
        dat.extend(Frame::new(21, vec![0; 7]).unwrap().to_bytes());
        dat
    }

    #[test]
    fn summary() {
        let (summary, ids) = summarize(&log()[..], false).unwrap();

        assert_eq!(summary.total_frames, 4);
        assert_eq!(summary.total_bytes, 105 + 105 + 9 + 12);
        assert_eq!(summary.crc_errors, 1);
        assert_eq!(summary.unknown_ids, 0);
        assert_eq!(
            summary.first_time,
            Some(Epoch::from_unix_seconds(1_700_000_000.0))
        );
        assert_eq!(summary.duration, Duration::from_seconds(10.0));

        assert_eq!(ids[&20].count, 2);
        assert_eq!(ids[&20].name, Some("system_state"));
        assert_eq!(ids[&12].name, None);
        assert_eq!(ids[&12].decode_errors, 0);
        assert_eq!(ids[&21].decode_errors, 1);
    }

    #[test]
    fn summary_known_only() {
        let (summary, ids) = summarize(&log()[..], true).unwrap();

        assert_eq!(summary.total_frames, 3);
        assert_eq!(summary.unknown_ids, 1);
        assert!(!ids.contains_key(&12));
    }

    #[test]
    fn text() {
        let (summary, ids) = summarize(&log()[..], false).unwrap();
        let info = Info {
            filename: "device.anpp".to_string(),
            summary,
            ids,
        };
        let text = render_text(&info).unwrap();

        assert!(text.starts_with("device.anpp\n"), "{text}");
        assert!(text.contains("system_state"), "{text}");
        assert!(text.contains("CRC errors: 1"), "{text}");
    }
}
