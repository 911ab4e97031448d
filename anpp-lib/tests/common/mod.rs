use std::path::{Path, PathBuf};

use anpp::Frame;

const IDS: [u8; 6] = [20, 21, 23, 28, 30, 41];
const LENS: [usize; 6] = [100, 8, 4, 48, 13, 36];

/// Frames for packets whose codecs accept any payload bytes, cycling through system
/// state, unix time, status, raw sensors, satellites and DCM orientation.
pub fn sample_frames(n: usize) -> Vec<Frame> {
    (0..n)
        .map(|i| {
            let k = i % IDS.len();
            let payload: Vec<u8> = (0..LENS[k]).map(|j| ((i * 31 + j * 7) % 256) as u8).collect();
            Frame::new(IDS[k], payload).unwrap()
        })
        .collect()
}

/// Deterministic filler placed before frame `i` in a noisy stream.
pub fn noise(i: usize) -> Vec<u8> {
    (0..(i % 7) * 3).map(|j| ((i * 53 + j * 11) % 256) as u8).collect()
}

pub fn encode_stream(frames: &[Frame]) -> Vec<u8> {
    frames.iter().flat_map(Frame::to_bytes).collect()
}

pub fn encode_noisy_stream(frames: &[Frame]) -> Vec<u8> {
    frames
        .iter()
        .enumerate()
        .flat_map(|(i, frame)| {
            let mut dat = noise(i);
            dat.extend(frame.to_bytes());
            dat
        })
        .collect()
}

pub fn write_log(dir: &Path, name: &str, dat: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, dat).unwrap();
    path
}
