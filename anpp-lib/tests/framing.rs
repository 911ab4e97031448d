mod common;

use anpp::framing::{Decoder, DecoderOpts};
use anpp::Frame;
use rand::{rngs::StdRng, Rng, SeedableRng};

use common::{encode_noisy_stream, encode_stream, sample_frames};

fn decode_all(decoder: &mut Decoder) -> Vec<Frame> {
    decoder.drain().collect()
}

#[test]
fn known_vectors() {
    let stream = hex::decode(
        [
            "8b0101b2c1", "02",
            "1a0103b230", "0203b6",
            "8200047901", "b8c08400",
        ]
        .concat(),
    )
    .unwrap();
    let mut decoder = Decoder::new();
    decoder.add_data(&stream);

    let frames = decode_all(&mut decoder);
    assert_eq!(frames.len(), 3);
    assert_eq!(frames[0].payload(), &[0x02]);
    assert_eq!(frames[1].payload(), &[0x02, 0x03, 0xb6]);
    assert_eq!(frames[2].id(), 0);
    assert_eq!(frames[2].crc(), 0x0179);
    assert_eq!(decoder.crc_errors(), 0);
    assert_eq!(decoder.buffered(), 0);
}

#[test]
fn noisy_stream_recovers_every_frame() {
    let frames = sample_frames(60);
    let mut decoder = Decoder::new();
    decoder.add_data(&encode_noisy_stream(&frames));

    assert_eq!(decode_all(&mut decoder), frames);
    assert_eq!(decoder.crc_errors(), 2);
    assert_eq!(decoder.frames_decoded(), 60);
}

#[test]
fn random_chunking_matches_single_write() {
    let frames = sample_frames(120);
    let stream = encode_noisy_stream(&frames);
    let mut rng = StdRng::seed_from_u64(0x414e_5050);

    let mut decoder = Decoder::with_opts(
        DecoderOpts::builder()
            .compact_threshold(512)
            .stream_threshold(1024)
            .build(),
    );
    let mut got = Vec::new();
    let mut rest = &stream[..];
    while !rest.is_empty() {
        let n = rng.gen_range(1..=rest.len().min(600));
        let (chunk, tail) = rest.split_at(n);
        decoder.add_data(chunk);
        got.extend(decoder.drain());
        rest = tail;
    }

    // every frame exactly once, in order
    assert_eq!(got, frames);
    assert_eq!(decoder.buffered(), 0);
}

#[test]
fn truncated_tail_is_held() {
    let frames = sample_frames(60);
    let stream = encode_stream(&frames);
    let mut decoder = Decoder::new();
    decoder.add_data(&stream[..stream.len() - 10]);

    assert_eq!(decode_all(&mut decoder), frames[..59]);
    assert_eq!(decoder.buffered(), 31);

    decoder.add_data(&stream[stream.len() - 10..]);
    assert_eq!(decoder.decode().as_ref(), frames.last());
    assert_eq!(decoder.decode(), None);
}

#[test]
fn corrupt_payload_byte_drops_only_that_frame() {
    let frames = sample_frames(12);
    let mut stream = encode_stream(&frames);
    let offset: usize = frames[..4].iter().map(Frame::wire_len).sum();
    // payload byte of the fifth frame
    stream[offset + 7] ^= 0x40;

    let mut decoder = Decoder::new();
    decoder.add_data(&stream);
    let got = decode_all(&mut decoder);

    let mut expected = frames.clone();
    expected.remove(4);
    assert_eq!(got, expected);
    assert!(decoder.crc_errors() >= 1);
}
