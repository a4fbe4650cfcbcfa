use crate::{RegionError, RegionSet};

pub struct RegionSetBuilder {
    locations: Vec<u64>,
    max_length: Option<usize>,
    fill: Option<u8>,
}

impl RegionSetBuilder {
    pub fn new() -> Self {
        RegionSetBuilder {
            locations: Vec::new(),
            max_length: None,
            fill: None,
        }
    }

    pub fn location(mut self, offset: u64) -> Self {
        self.locations.push(offset);
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

    pub fn build(self) -> Result<RegionSet, RegionError> {
        if self.locations.is_empty() {
            return Err(RegionError::MissingField("location".to_owned()));
        }
        let max_length = self
            .max_length
            .ok_or(RegionError::MissingField("max_length".to_owned()))?;

        Ok(RegionSet {
            locations: self.locations,
            max_length,
            fill: self.fill,
        })
    }
}

impl Default for RegionSetBuilder {
    fn default() -> Self {
        Self::new()
    }
}
