use std::io::{Read, Seek, SeekFrom, Write};
use thiserror::Error;
use tracing::debug;

pub mod builder;

pub use builder::RegionSetBuilder;

#[derive(Debug, Error)]
pub enum RegionError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{length:#x} bytes do not fit in region at {offset:#x} (max {max_length:#x})")]
    TooLong {
        offset: u64,
        length: usize,
        max_length: usize,
    },

    #[error("missing field: {0}")]
    MissingField(String),
}

pub type Result<T> = std::result::Result<T, RegionError>;

/// A fixed-size window of a disc image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub offset: u64,
    pub max_length: usize,
}

impl Region {
    pub fn new(offset: u64, max_length: usize) -> Self {
        Region { offset, max_length }
    }

    /// Reads the whole region. Fails if the image ends before the region
    /// does.
    pub fn read<R: Read + Seek>(&self, reader: &mut R) -> Result<Vec<u8>> {
        reader.seek(SeekFrom::Start(self.offset))?;
        let mut data = vec![0u8; self.max_length];
        reader.read_exact(&mut data)?;
        Ok(data)
    }

    /// Writes `data` at the start of the region. Bytes past the end of
    /// `data` are left as they were.
    pub fn write<W: Write + Seek>(&self, writer: &mut W, data: &[u8]) -> Result<()> {
        if data.len() > self.max_length {
            return Err(RegionError::TooLong {
                offset: self.offset,
                length: data.len(),
                max_length: self.max_length,
            });
        }

        writer.seek(SeekFrom::Start(self.offset))?;
        writer.write_all(data)?;
        debug!(offset = self.offset, length = data.len(), "wrote region");
        Ok(())
    }

    /// Writes `data` and fills the rest of the region with `fill`.
    pub fn write_padded<W: Write + Seek>(&self, writer: &mut W, data: &[u8], fill: u8) -> Result<()> {
        self.write(writer, data)?;
        writer.write_all(&vec![fill; self.max_length - data.len()])?;
        Ok(())
    }
}

/// One logical file that the game keeps copies of at several offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionSet {
    pub locations: Vec<u64>,
    pub max_length: usize,
    /// Pads every copy out to `max_length` when set.
    pub fill: Option<u8>,
}

impl RegionSet {
    pub fn builder() -> RegionSetBuilder {
        RegionSetBuilder::new()
    }

    pub fn regions(&self) -> impl Iterator<Item = Region> + '_ {
        self.locations
            .iter()
            .map(|&offset| Region::new(offset, self.max_length))
    }

    /// Reads the copy at the first location.
    pub fn read<R: Read + Seek>(&self, reader: &mut R) -> Result<Vec<u8>> {
        let region = self
            .regions()
            .next()
            .ok_or_else(|| RegionError::MissingField("location".to_owned()))?;
        region.read(reader)
    }

    /// Writes `data` to every location. Nothing is written if it does not fit.
    pub fn write_all<W: Write + Seek>(&self, writer: &mut W, data: &[u8]) -> Result<()> {
        if data.len() > self.max_length {
            return Err(RegionError::TooLong {
                offset: self.locations.first().copied().unwrap_or_default(),
                length: data.len(),
                max_length: self.max_length,
            });
        }

        for region in self.regions() {
            match self.fill {
                Some(fill) => region.write_padded(writer, data, fill)?,
                None => region.write(writer, data)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_region() {
        let mut image = Cursor::new((0u8..32).collect::<Vec<u8>>());
        let data = Region::new(4, 3).read(&mut image).expect("in bounds");
        assert_eq!(data, vec![4, 5, 6]);
    }

    #[test]
    fn test_read_past_end() {
        let mut image = Cursor::new(vec![0u8; 8]);
        let result = Region::new(6, 4).read(&mut image);
        assert!(matches!(result, Err(RegionError::Io(_))));
    }

    #[test]
    fn test_write_region_keeps_tail() {
        let mut image = Cursor::new(vec![0xAAu8; 8]);
        Region::new(2, 4).write(&mut image, &[1, 2]).expect("fits");
        assert_eq!(image.into_inner(), vec![0xAA, 0xAA, 1, 2, 0xAA, 0xAA, 0xAA, 0xAA]);
    }

    #[test]
    fn test_write_too_long() {
        let mut image = Cursor::new(vec![0u8; 8]);
        let result = Region::new(0, 2).write(&mut image, &[1, 2, 3]);
        assert!(matches!(
            result,
            Err(RegionError::TooLong { offset: 0, length: 3, max_length: 2 })
        ));
        assert_eq!(image.into_inner(), vec![0u8; 8]);
    }

    #[test]
    fn test_write_all_locations() {
        let set = RegionSet {
            locations: vec![1, 6],
            max_length: 2,
            fill: None,
        };
        let mut image = Cursor::new(vec![0u8; 8]);
        set.write_all(&mut image, &[7, 8]).expect("fits");
        assert_eq!(set.read(&mut image).expect("readable"), vec![7, 8]);
        assert_eq!(image.into_inner(), vec![0, 7, 8, 0, 0, 0, 7, 8]);
    }

    #[test]
    fn test_write_all_rejects_before_writing() {
        let set = RegionSet {
            locations: vec![0, 4],
            max_length: 2,
            fill: None,
        };
        let mut image = Cursor::new(vec![0u8; 8]);
        assert!(set.write_all(&mut image, &[1, 2, 3]).is_err());
        assert_eq!(image.into_inner(), vec![0u8; 8]);
    }

    #[test]
    fn test_write_padded() {
        let mut image = Cursor::new(vec![0xAAu8; 8]);
        Region::new(2, 4).write_padded(&mut image, &[1], 0xFE).expect("fits");
        assert_eq!(image.into_inner(), vec![0xAA, 0xAA, 1, 0xFE, 0xFE, 0xFE, 0xAA, 0xAA]);
    }

    #[test]
    fn test_write_all_pads_every_copy() {
        let set = RegionSet {
            locations: vec![0, 4],
            max_length: 3,
            fill: Some(0xFE),
        };
        let mut image = Cursor::new(vec![0x11u8; 8]);
        set.write_all(&mut image, &[5]).expect("fits");
        assert_eq!(image.into_inner(), vec![5, 0xFE, 0xFE, 0x11, 5, 0xFE, 0xFE, 0x11]);
    }
}
