use crate::jump_table::{distance_for_jump, jump_for_distance};
use crate::words::DELIMITER;
use std::ops::Range;
use tracing::{debug, trace};

pub const MIN_MATCH: usize = 4;
pub const MAX_MATCH: usize = 35;

/// How far back into already-written output the compressor looks.
pub const WINDOW_SIZE: usize = 3792;

/// A back-reference: copy `length` bytes starting `distance` bytes before
/// the pointer itself.
///
/// On disc this is three bytes, `0xF0 | len_hi`, `len_lo << 5 | jump_hi`,
/// `jump_lo`, where `len = length - 4` and `jump` is the distance run
/// through the jump table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pointer {
    pub length: usize,
    pub distance: usize,
}

impl Pointer {
    pub fn is_lead(byte: u8) -> bool {
        matches!(byte, 0xF0..=0xF3)
    }

    pub fn from_bytes(bytes: [u8; 3]) -> Self {
        let length = (((bytes[0] & 0x03) as usize) << 3) + (((bytes[1] & 0xE0) as usize) >> 5) + 4;
        let jump = (((bytes[1] & 0x1F) as u16) << 8) | bytes[2] as u16;

        Pointer {
            length,
            distance: distance_for_jump(jump),
        }
    }

    /// Returns `None` when the length is outside 4..=35 or the distance has
    /// no jump value.
    pub fn to_bytes(&self) -> Option<[u8; 3]> {
        if !(MIN_MATCH..=MAX_MATCH).contains(&self.length) {
            return None;
        }
        let len = (self.length - MIN_MATCH) as u8;
        let jump = jump_for_distance(self.distance)?;

        Some([
            0xF0 | ((len & 0x18) >> 3),
            ((len & 0x07) << 5) | ((jump & 0x1F00) >> 8) as u8,
            (jump & 0xFF) as u8,
        ])
    }

    /// Range of the referenced bytes for a pointer found at `position`.
    pub fn source(&self, position: usize) -> Option<Range<usize>> {
        let start = position.checked_sub(self.distance)?;
        Some(start..start + self.length)
    }
}

/// Expands the pointers in `window`, which starts at `start` within `full`.
///
/// Pointers resolve against the raw bytes of `full`, not against the
/// expanded output. A pointer whose source falls outside `full` is copied
/// through as three literal bytes.
pub fn decompress(full: &[u8], window: &[u8], start: usize) -> Vec<u8> {
    let mut out: Vec<u8> = Vec::with_capacity(window.len() * 2);
    let mut i = 0usize;

    while i < window.len() {
        let frame = window[i];

        match frame {
            0xF0..=0xF3 if i + 2 < window.len() => {
                let raw = [frame, window[i + 1], window[i + 2]];
                let pointer = Pointer::from_bytes(raw);

                match pointer.source(start + i).filter(|src| src.end <= full.len()) {
                    Some(src) => out.extend_from_slice(&full[src]),
                    None => {
                        debug!(
                            offset = start + i,
                            length = pointer.length,
                            distance = pointer.distance,
                            "pointer source out of range, copying literally"
                        );
                        out.extend_from_slice(&raw);
                    }
                }
                i += 3;
            }
            _ => {
                out.push(frame);
                i += 1;
            }
        }
    }

    out
}

/// Greedily replaces repeated runs with pointers into the output written so
/// far. Delimiters are always written literally and never matched across.
///
/// `decompress(&c, &c, 0)` returns the input again for any `c` produced by
/// this function, provided the input holds no pointer lead bytes.
pub fn compress(data: &[u8]) -> Vec<u8> {
    let mut out: Vec<u8> = Vec::with_capacity(data.len());
    let mut i = 0usize;

    while i < data.len() {
        let byte = data[i];
        if byte == DELIMITER {
            out.push(byte);
            i += 1;
            continue;
        }

        let limit = (i + MAX_MATCH).min(data.len());
        let boundary = data[i..limit]
            .iter()
            .position(|&b| b == DELIMITER)
            .map_or(limit, |p| i + p);

        match longest_match(&out, &data[i..boundary]).and_then(|p| Some((p, p.to_bytes()?))) {
            Some((pointer, raw)) => {
                trace!(
                    offset = out.len(),
                    length = pointer.length,
                    distance = pointer.distance,
                    "back-reference"
                );
                out.extend_from_slice(&raw);
                i += pointer.length;
            }
            None => {
                out.push(byte);
                i += 1;
            }
        }
    }

    debug!(input = data.len(), output = out.len(), "compressed text");
    out
}

/// Finds the longest prefix of `needle` (at least four bytes) lying wholly
/// inside the trailing window of `out`. Equal lengths go to the nearest one.
fn longest_match(out: &[u8], needle: &[u8]) -> Option<Pointer> {
    if needle.len() < MIN_MATCH {
        return None;
    }

    let window_start = out.len().saturating_sub(WINDOW_SIZE);
    let mut best: Option<Pointer> = None;

    for pos in (window_start..out.len()).rev() {
        let available = (out.len() - pos).min(needle.len());
        let length = out[pos..pos + available]
            .iter()
            .zip(needle)
            .take_while(|(a, b)| a == b)
            .count();

        if length >= MIN_MATCH && best.is_none_or(|b| length > b.length) {
            best = Some(Pointer {
                length,
                distance: out.len() - pos,
            });
            if length == needle.len() {
                break;
            }
        }
    }

    best
}
