/// Separates entries within a text section.
pub const DELIMITER: u8 = 0xFE;

/// Splits a section into its entries. Consecutive delimiters produce empty
/// entries, and a trailing delimiter produces a final empty entry.
pub fn split(data: &[u8]) -> Vec<&[u8]> {
    data.split(|&b| b == DELIMITER).collect()
}

/// Joins entries with a delimiter between each pair; the inverse of [`split`].
pub fn join<W: AsRef<[u8]>>(words: &[W]) -> Vec<u8> {
    let size = words.iter().map(|w| w.as_ref().len() + 1).sum::<usize>();
    let mut data = Vec::with_capacity(size);
    for (i, word) in words.iter().enumerate() {
        if i > 0 {
            data.push(DELIMITER);
        }
        data.extend_from_slice(word.as_ref());
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split() {
        let expected: Vec<&[u8]> = vec![&[0x0A, 0x0B][..], &[][..]];
        assert_eq!(split(&[0x0A, 0x0B, 0xFE]), expected);

        let expected: Vec<&[u8]> = vec![&[][..], &[][..], &[0x01][..]];
        assert_eq!(split(&[0xFE, 0xFE, 0x01]), expected);

        let expected: Vec<&[u8]> = vec![&[][..]];
        assert_eq!(split(&[]), expected);
    }

    #[test]
    fn test_join_inverts_split() {
        let cases: [&[u8]; 4] = [&[0x0A, 0x0B, 0xFE], &[0xFE, 0xFE, 0x01], &[], &[0x05]];
        for data in cases {
            assert_eq!(join(&split(data)), data);
        }
    }
}
