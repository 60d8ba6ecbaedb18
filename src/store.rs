use crate::error::{MapperError, MapperResult};

/// Append-only, insertion-ordered collection of mapped records.
#[derive(Debug, Clone)]
pub struct RecordStore<T> {
    records: Vec<T>,
}

impl<T> Default for RecordStore<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
        }
    }
}

impl<T> RecordStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends records after those already stored. An empty batch is a no-op.
    pub fn append<I>(&mut self, records: I) -> usize
    where
        I: IntoIterator<Item = T>,
    {
        let before = self.records.len();
        self.records.extend(records);
        self.records.len() - before
    }

    /// Like [`RecordStore::append`], for callers whose batch may be absent.
    pub fn try_append(&mut self, records: Option<Vec<T>>) -> MapperResult<usize> {
        let records = records
            .ok_or_else(|| MapperError::InvalidArgument("The data can not be absent".to_string()))?;
        Ok(self.append(records))
    }

    pub fn all(&self) -> &[T] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

impl<T> FromIterator<T> for RecordStore<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}
