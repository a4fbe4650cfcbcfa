use crate::error::{Error, Result};
use std::borrow::Cow;
use std::collections::HashMap;
use std::ops::RangeInclusive;
use std::sync::LazyLock;

/// Offset between a single-byte glyph and its two-byte duplicate in the
/// 0xD0xx page.
const WIDE: u32 = 0xD000;

/// Number of codes the PSX table defines.
const PSX_ENTRIES: usize = 1073;

static PSX: LazyLock<CharMap> = LazyLock::new(|| CharMap::from_entries(psx_entries()));
static PSP: LazyLock<CharMap> = LazyLock::new(|| CharMap::from_entries(psp_entries()));

/// Which release's text encoding to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CharMapKind {
    #[default]
    Psx,
    Psp,
}

impl CharMapKind {
    pub fn charmap(self) -> &'static CharMap {
        match self {
            CharMapKind::Psx => &PSX,
            CharMapKind::Psp => &PSP,
        }
    }
}

/// Bidirectional table between game codes and display tokens.
///
/// Several codes may share a token. Encoding always picks the smallest of
/// them, so decoding then re-encoding a string normalizes duplicates.
#[derive(Debug, Clone)]
pub struct CharMap {
    forward: HashMap<u32, String>,
    reverse: HashMap<String, u32>,
}

impl CharMap {
    pub fn psx() -> &'static CharMap {
        &PSX
    }

    pub fn psp() -> &'static CharMap {
        &PSP
    }

    /// Builds a map from `(code, token)` pairs. A repeated code keeps the
    /// last token given for it.
    pub fn from_entries<I: IntoIterator<Item = (u32, String)>>(entries: I) -> Self {
        let forward: HashMap<u32, String> = entries.into_iter().collect();

        let mut reverse: HashMap<String, u32> = HashMap::with_capacity(forward.len());
        for (&code, token) in &forward {
            reverse
                .entry(token.clone())
                .and_modify(|existing| *existing = (*existing).min(code))
                .or_insert(code);
        }

        CharMap { forward, reverse }
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    pub fn token(&self, code: u32) -> Option<&str> {
        self.forward.get(&code).map(String::as_str)
    }

    pub fn code(&self, token: &str) -> Option<u32> {
        self.reverse.get(token).copied()
    }

    pub fn codes(&self) -> impl Iterator<Item = u32> + '_ {
        self.forward.keys().copied()
    }

    /// Decodes the token starting at `pos`, returning it along with the
    /// position of the next token. Returns `None` once `pos` reaches the end.
    ///
    /// Codes missing from the map come back as `{0xNN}` escapes. One and two
    /// byte escapes encode back to the same bytes; three byte ones do not,
    /// see [`CharMap::encode`].
    pub fn decode_next<'a>(&'a self, bytes: &[u8], pos: usize) -> Option<(Cow<'a, str>, usize)> {
        let lead = *bytes.get(pos)?;
        let remaining = bytes.len() - pos - 1;

        let width = match lead {
            0xD0..=0xDA | 0xE2 | 0xE3 if remaining >= 1 => 2,
            0xF0..=0xF3 if remaining >= 2 => 3,
            _ => 1,
        };
        let code = bytes[pos..pos + width]
            .iter()
            .fold(0u32, |acc, &b| (acc << 8) | b as u32);

        let token = match self.forward.get(&code) {
            Some(token) => Cow::Borrowed(token.as_str()),
            None => Cow::Owned(format!("{{0x{:0digits$X}}}", code, digits = width * 2)),
        };

        Some((token, pos + width))
    }

    /// Decodes one delimiter-free word into display text.
    pub fn decode_word(&self, word: &[u8]) -> String {
        let mut text = String::with_capacity(word.len());
        let mut pos = 0;
        while let Some((token, next)) = self.decode_next(word, pos) {
            text.push_str(&token);
            pos = next;
        }
        text
    }

    /// Encodes display text into game bytes.
    ///
    /// `{0x..}` escapes are written as one, two or three bytes depending on
    /// their value. A three byte escape keeps only the low nibble of its top
    /// byte, so `{0xF10203}` (an unresolved pointer as printed by
    /// [`CharMap::decode_next`]) is written as `01 02 03`, not `F1 02 03`.
    pub fn encode(&self, text: &str) -> Result<Vec<u8>> {
        let mut data = Vec::with_capacity(text.len());
        let mut chars = text.char_indices().peekable();

        while let Some((position, ch)) = chars.next() {
            match ch {
                '{' => {
                    let end = text[position..]
                        .find('}')
                        .map(|offset| position + offset)
                        .ok_or(Error::UnterminatedToken { position })?;
                    let token = &text[position..=end];

                    let code = match self.code(token) {
                        Some(code) => code,
                        None => parse_hex_escape(token).ok_or_else(|| Error::UnknownToken {
                            token: token.to_owned(),
                        })?,
                    };
                    push_code(&mut data, code);

                    while chars.next_if(|&(i, _)| i <= end).is_some() {}
                }
                '\r' if matches!(chars.peek(), Some((_, '\n'))) => {
                    chars.next();
                    let code = self
                        .code("\r\n")
                        .ok_or(Error::UnrepresentableChar { ch, position })?;
                    push_code(&mut data, code);
                }
                _ => {
                    let mut buf = [0u8; 4];
                    let code = self
                        .code(ch.encode_utf8(&mut buf))
                        .ok_or(Error::UnrepresentableChar { ch, position })?;
                    push_code(&mut data, code);
                }
            }
        }

        Ok(data)
    }
}

/// Parses `{0x1F}`-style escapes.
fn parse_hex_escape(token: &str) -> Option<u32> {
    let digits = token.strip_prefix("{0x")?.strip_suffix('}')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(digits, 16).ok()
}

fn push_code(data: &mut Vec<u8>, code: u32) {
    if code < 0x100 {
        data.push(code as u8);
    } else if code < 0x10000 {
        data.extend_from_slice(&[(code >> 8) as u8, code as u8]);
    } else {
        // only the low nibble of the top byte survives
        data.extend_from_slice(&[((code >> 16) & 0x0F) as u8, (code >> 8) as u8, code as u8]);
    }
}

struct Table(HashMap<u32, String>);

impl Table {
    fn add(&mut self, code: u32, token: impl Into<String>) {
        self.0.insert(code, token.into());
    }

    fn add_all(&mut self, codes: &[u32], token: &str) {
        for &code in codes {
            self.add(code, token);
        }
    }

    /// Adds `token` at `code` and at its 0xD0xx duplicate.
    fn add_mirrored(&mut self, code: u32, token: &str) {
        self.add(code, token);
        self.add(code + WIDE, token);
    }

    /// Assigns consecutive characters starting at `first` to `codes`.
    fn add_run(&mut self, codes: RangeInclusive<u32>, first: char) {
        for (code, ch) in codes.zip(first..) {
            self.add(code, ch);
        }
    }

    fn add_mirrored_run(&mut self, codes: RangeInclusive<u32>, first: char) {
        for (code, ch) in codes.zip(first..) {
            self.add(code, ch);
            self.add(code + WIDE, ch);
        }
    }
}

fn psx_entries() -> HashMap<u32, String> {
    let mut t = Table(HashMap::with_capacity(PSX_ENTRIES));

    t.add_mirrored_run(0x00..=0x09, '0');
    t.add_mirrored_run(0x0A..=0x23, 'A');
    t.add_mirrored_run(0x24..=0x3D, 'a');

    // punctuation, with every page that carries a copy
    t.add_all(&[0x3E, 0xD03E, 0xD0EA, 0xD11A], "!");
    t.add_all(&[0x40, 0xD040, 0xD9C9], "?");
    t.add_all(&[0x42, 0xD042, 0xD0EE, 0xD11E], "+");
    t.add_all(&[0x44, 0xD044, 0xD9C6], "/");
    t.add_all(&[0x46, 0xD046, 0xD9BD], ":");
    t.add_all(&[0x5F, 0xD05F, 0xD0E9, 0xD119, 0xD0EC, 0xD11C, 0xD9B6], ".");
    t.add_all(&[0x8B, 0xD08B, 0xD9BC], "\u{B7}");
    t.add_all(&[0x8D, 0xD08D, 0xD9BE], "(");
    t.add_all(&[0x8E, 0xD08E, 0xD9BF], ")");
    t.add_all(&[0x91, 0xD091, 0xD9C0, 0xDA77], "\"");
    t.add_all(&[0x93, 0xD093, 0xD9C1, 0xDA76], "'");
    t.add_all(&[0xB2, 0xD0B2], "\u{266A}");
    t.add_all(
        &[
            0xB5, 0xD0B5, 0xD0E1, 0xD111, 0xD0F9, 0xD129, 0xD0FB, 0xD12B, 0xD0FC, 0xD12C, 0xD0FD,
            0xD12D, 0xD0FE, 0xD12E, 0xD0FF, 0xD12F, 0xD130, 0xD131, 0xD132,
        ],
        "*",
    );
    t.add_all(&[0xFA, 0xD0FA, 0xD12A, 0xDA73], " ");
    t.add_all(&[0xD0E7, 0xD117], "\u{2014}");
    t.add_all(&[0xD0E8, 0xD118], "\u{300C}");
    t.add_all(&[0xD0EB, 0xD11B], "\u{22EF}");
    t.add_all(&[0xD0ED, 0xD11D], "-");
    t.add_all(&[0xD0EF, 0xD11F], "\u{D7}");
    t.add_all(&[0xD0F4, 0xD124], "\u{2260}");
    t.add_all(&[0xD0F5, 0xD125], ">");
    t.add_all(&[0xD0F6, 0xD126], "<");
    t.add_all(&[0xD0F7, 0xD127], "\u{2267}");
    t.add_all(&[0xD123, 0xDA70], "=");
    t.add(0xD120, "\u{F7}");
    t.add(0xD121, "\u{2229}");
    t.add(0xD122, "\u{222A}");
    t.add(0xD128, "\u{2266}");

    t.add(0xD9B5, "\u{221E}");
    t.add(0xD9B7, "&");
    t.add(0xD9B8, "%");
    t.add(0xD9B9, "\u{25CB}");
    t.add(0xD9BA, "\u{2190}");
    t.add(0xD9BB, "\u{2192}");
    t.add(0xD9C2, "\u{300E}");
    t.add(0xD9C3, "\u{300F}");
    t.add(0xD9C4, "\u{300D}");
    t.add(0xD9C5, "\u{FF5E}");
    t.add(0xD9C7, "\u{25B3}");
    t.add(0xD9C8, "\u{25A1}");
    t.add(0xD9CA, "\u{2665}");
    t.add_run(0xD9CB..=0xD9CF, '\u{2160}');

    // zodiac signs
    t.add_run(0xDA00..=0xDA0B, '\u{2648}');
    t.add(0xDA0C, "{Serpentarius}");

    t.add(0xDA71, "$");
    t.add(0xDA72, "\u{A5}");
    t.add(0xDA74, ",");
    t.add(0xDA75, ";");

    // control codes
    t.add(0xE0, "{Ramza}");
    t.add(0xF8, "\r\n");
    t.add(0xFB, "{Begin List}");
    t.add(0xFC, "{End List}");
    t.add(0xFE, "{END}");
    t.add(0xFF, "{Close}");
    for arg in 0..=0xFFu32 {
        t.add(0xE200 + arg, format!("{{Delay {:02X}}}", arg));
        t.add(0xE300 + arg, format!("{{Color {:02X}}}", arg));
    }

    // hiragana
    t.add_mirrored(0x3F, "\u{3042}");
    t.add_mirrored(0x41, "\u{3044}");
    t.add_mirrored(0x43, "\u{3046}");
    t.add_mirrored(0x45, "\u{3048}");
    t.add_mirrored_run(0x47..=0x5E, '\u{304A}');
    t.add_mirrored_run(0x60..=0x8A, '\u{3063}');
    t.add_mirrored(0x8C, "\u{308F}");
    t.add_mirrored(0x8F, "\u{3092}");
    t.add_mirrored(0x90, "\u{3093}");

    // katakana
    t.add_mirrored(0x92, "\u{30A2}");
    t.add_mirrored_run(0x94..=0xB1, '\u{30A4}');
    t.add_mirrored(0xB3, "\u{30C3}");
    t.add_mirrored(0xB4, "\u{30C4}");
    t.add_mirrored_run(0xB6..=0xCF, '\u{30C6}');
    t.add_run(0xD0D0..=0xD0DB, '\u{30E0}');
    t.add_run(0xD100..=0xD10B, '\u{30E0}');
    t.add(0xD10C, "\u{30EC}");
    t.add(0xD10D, "\u{30ED}");
    t.add_all(&[0xD0DE, 0xD10E], "\u{30EE}");
    t.add_all(&[0xD0DF, 0xD10F], "\u{30EF}");
    t.add_run(0xD0E2..=0xD0E6, '\u{30F2}');
    t.add_run(0xD112..=0xD116, '\u{30F2}');

    t.0
}

fn psp_entries() -> HashMap<u32, String> {
    let mut entries = psx_entries();
    entries.reserve(7);
    let mut t = Table(entries);

    t.add(0x95, " ");
    t.add(0xDA60, "\u{E1}");
    t.add(0xDA61, "\u{E0}");
    t.add(0xDA62, "\u{E9}");
    t.add(0xDA63, "\u{E8}");
    t.add(0xDA64, "\u{ED}");
    t.add(0xDA65, "\u{FA}");
    t.add(0xDA66, "\u{F9}");

    t.0
}
