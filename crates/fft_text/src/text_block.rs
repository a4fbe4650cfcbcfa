use crate::charmap::CharMapKind;
use crate::compression::{compress, decompress};
use crate::error::{Error, Result};
use crate::words::{join, split};

/// Decodes a delimiter-separated stream into one string per entry.
pub fn decode_list(data: &[u8], kind: CharMapKind) -> Vec<String> {
    let charmap = kind.charmap();
    split(data)
        .into_iter()
        .map(|word| charmap.decode_word(word))
        .collect()
}

/// Encodes each entry and joins them with delimiters.
pub fn encode_list<S: AsRef<str>>(entries: &[S], kind: CharMapKind) -> Result<Vec<u8>> {
    let charmap = kind.charmap();
    let words = entries
        .iter()
        .map(|entry| charmap.encode(entry.as_ref()))
        .collect::<Result<Vec<_>>>()?;
    Ok(join(&words))
}

/// The strings of one text section along with how it is stored on disc.
///
/// `fill` is the byte the rest of the region is padded with. Trailing fill
/// bytes are dropped when reading, so a block that was written shorter than
/// its region reads back with only the entries it was written with.
#[derive(Debug, Clone)]
pub struct TextBlock {
    pub kind: CharMapKind,
    pub entries: Vec<String>,
    pub compressed: bool,
    pub max_length: Option<usize>,
    pub fill: Option<u8>,
}

impl TextBlock {
    pub fn new(kind: CharMapKind) -> Self {
        Self {
            kind,
            entries: vec![],
            compressed: false,
            max_length: None,
            fill: None,
        }
    }

    /// Reads the entries stored in `window`, which sits at `start` within
    /// `full`.
    pub fn from_region(full: &[u8], window: &[u8], start: usize, kind: CharMapKind, compressed: bool) -> Self {
        Self::new(kind).compressed(compressed).read(full, window, start)
    }

    /// Replaces the entries with the ones stored in `window`.
    pub fn read(mut self, full: &[u8], window: &[u8], start: usize) -> Self {
        let mut data = if self.compressed {
            decompress(full, window, start)
        } else {
            window.to_vec()
        };

        if let Some(fill) = self.fill {
            let end = data.iter().rposition(|&b| b != fill).map_or(0, |i| i + 1);
            data.truncate(end);
        }

        self.entries = decode_list(&data, self.kind);
        self
    }

    pub fn compressed(mut self, compressed: bool) -> Self {
        self.compressed = compressed;
        self
    }

    pub fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn fill(mut self, fill: u8) -> Self {
        self.fill = Some(fill);
        self
    }

    pub fn set_entries<S: Into<String>>(&mut self, entries: impl IntoIterator<Item = S>) {
        self.entries = entries.into_iter().map(Into::into).collect();
    }

    /// Replaces one entry, returning the previous text. Out-of-range
    /// indices leave the block untouched.
    pub fn set_entry(&mut self, index: usize, text: impl Into<String>) -> Option<String> {
        let entry = self.entries.get_mut(index)?;
        Some(std::mem::replace(entry, text.into()))
    }

    fn encode(&self) -> Result<Vec<u8>> {
        let data = encode_list(&self.entries, self.kind)?;
        Ok(if self.compressed { compress(&data) } else { data })
    }

    /// Bytes as they go back on disc, without padding.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let data = self.encode()?;

        match self.max_length {
            Some(max_length) if data.len() > max_length => Err(Error::CapacityExceeded {
                length: data.len(),
                max_length,
            }),
            _ => Ok(data),
        }
    }

    /// On-disc length of the current entries, ignoring `max_length`.
    /// Encodes (and compresses) the whole block.
    pub fn disc_len(&self) -> Result<usize> {
        Ok(self.encode()?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_list() {
        let entries = decode_list(&[0x0A, 0x0B, 0xFE], CharMapKind::Psx);
        assert_eq!(entries, vec!["AB".to_owned(), String::new()]);
    }

    #[test]
    fn test_encode_list() {
        let data = encode_list(&["AB", "", "c"], CharMapKind::Psx).expect("encodes");
        assert_eq!(data, vec![0x0A, 0x0B, 0xFE, 0xFE, 0x26]);
    }

    #[test]
    fn test_encode_list_reports_bad_entry() {
        let result = encode_list(&["fine", "bad\u{263A}"], CharMapKind::Psx);
        assert_eq!(result, Err(Error::UnrepresentableChar { ch: '\u{263A}', position: 3 }));
    }

    #[test]
    fn test_block_round_trip() {
        let mut block = TextBlock::new(CharMapKind::Psx).compressed(true);
        block.set_entries([
            "Ramza is a squire.",
            "Delita is a squire.",
            "Agrias is a holy knight.",
            "",
        ]);

        let data = block.to_bytes().expect("fits");
        assert_eq!(block.disc_len(), Ok(data.len()));

        let read = TextBlock::from_region(&data, &data, 0, CharMapKind::Psx, true);
        assert_eq!(read.entries, block.entries);
    }

    #[test]
    fn test_block_capacity() {
        let mut block = TextBlock::new(CharMapKind::Psx).max_length(4);
        block.set_entries(["ABCD"]);
        assert_eq!(block.to_bytes(), Ok(vec![0x0A, 0x0B, 0x0C, 0x0D]));

        block.set_entry(0, "ABCDE");
        assert_eq!(
            block.to_bytes(),
            Err(Error::CapacityExceeded { length: 5, max_length: 4 })
        );
    }

    #[test]
    fn test_set_entry_out_of_range() {
        let mut block = TextBlock::new(CharMapKind::Psp);
        assert_eq!(block.set_entry(3, "x"), None);
        assert!(block.entries.is_empty());
    }

    #[test]
    fn test_read_drops_fill() {
        let mut window = vec![0x0A, 0x0B, 0xFE, 0x0C];
        window.extend_from_slice(&[0xFE; 6]);

        let block = TextBlock::new(CharMapKind::Psx).fill(0xFE).read(&window, &window, 0);
        assert_eq!(block.entries, vec!["AB".to_owned(), "C".to_owned()]);

        let unpadded = TextBlock::from_region(&window, &window, 0, CharMapKind::Psx, false);
        assert_eq!(unpadded.entries.len(), 8);
    }

    #[test]
    fn test_read_compressed_drops_fill_after_expanding() {
        let mut block = TextBlock::new(CharMapKind::Psx).compressed(true);
        block.set_entries(["Hello there", "Hello there"]);
        let mut window = block.to_bytes().expect("fits");
        window.extend_from_slice(&[0xFE; 16]);

        let read = TextBlock::new(CharMapKind::Psx)
            .compressed(true)
            .fill(0xFE)
            .read(&window, &window, 0);
        assert_eq!(read.entries, block.entries);
    }

    #[test]
    fn test_disc_len_of_empty_entry() {
        let mut block = TextBlock::new(CharMapKind::Psx);
        block.set_entries([""]);
        assert_eq!(block.disc_len(), Ok(0));
        assert_eq!(block.entries.len(), 1);
    }
}
