use crate::error::LoadError;

/// A contiguous `(offset, length)` window into a byte arena.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct ByteRange {
    pub offset: usize,
    pub length: usize,
}

impl ByteRange {
    pub fn new(offset: usize, length: usize) -> Self {
        Self { offset, length }
    }

    /// Exclusive end of the range, `None` on overflow.
    pub fn end(&self) -> Option<usize> {
        self.offset.checked_add(self.length)
    }

    /// Narrows `self` to a sub-range expressed relative to its start.
    pub fn sub_range(&self, relative: ByteRange) -> Option<ByteRange> {
        let end = relative.end()?;
        if end > self.length {
            return None;
        }

        Some(ByteRange {
            offset: self.offset.checked_add(relative.offset)?,
            length: relative.length,
        })
    }

    /// Fails with a bounds error unless the range lies inside `0..limit`.
    pub fn check_within(&self, limit: usize, context: &str) -> Result<(), LoadError> {
        match self.end() {
            Some(end) if end <= limit => Ok(()),
            _ => Err(LoadError::OutOfBounds {
                context: context.to_string(),
                offset: self.offset,
                length: self.length,
                limit,
            }),
        }
    }

    pub fn slice<'a>(&self, data: &'a [u8], context: &str) -> Result<&'a [u8], LoadError> {
        self.check_within(data.len(), context)?;
        Ok(&data[self.offset..self.offset + self.length])
    }
}

impl From<ByteRange> for std::ops::Range<usize> {
    fn from(value: ByteRange) -> Self {
        value.offset..value.offset + value.length
    }
}
