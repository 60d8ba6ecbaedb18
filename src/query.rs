//! Extremal queries over a record store.
//!
//! An [`ExtremalQuery`] pairs a comparator with an optional validity filter and
//! returns the stored record with the lowest or highest key among those the
//! filter keeps. Sorting is stable, so among tied records the first survivor in
//! insertion order wins for [`Direction::Lowest`] and the last survivor wins for
//! [`Direction::Highest`].

use std::{cmp::Ordering, fmt};

use crate::{
    error::{MapperError, MapperResult},
    record::Record,
    store::RecordStore,
};

type Comparator<'q, T> = Box<dyn Fn(&T, &T) -> Ordering + 'q>;
type Filter<'q, T> = Box<dyn Fn(&T) -> bool + 'q>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Lowest,
    Highest,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Lowest => write!(f, "lowest"),
            Direction::Highest => write!(f, "highest"),
        }
    }
}

pub struct ExtremalQuery<'q, T> {
    compare: Option<Comparator<'q, T>>,
    filter: Option<Filter<'q, T>>,
}

impl<T> Default for ExtremalQuery<'_, T> {
    fn default() -> Self {
        Self {
            compare: None,
            filter: None,
        }
    }
}

impl<'q, T> ExtremalQuery<'q, T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compare<F>(mut self, compare: F) -> Self
    where
        F: Fn(&T, &T) -> Ordering + 'q,
    {
        self.compare = Some(Box::new(compare));
        self
    }

    pub fn compare_by_key<K, F>(self, key: F) -> Self
    where
        K: Ord,
        F: Fn(&T) -> K + 'q,
    {
        self.compare(move |a, b| key(a).cmp(&key(b)))
    }

    /// Records for which `filter` returns false do not take part in the query.
    pub fn filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&T) -> bool + 'q,
    {
        self.filter = Some(Box::new(filter));
        self
    }

    pub fn select<'s>(
        &self,
        store: &'s RecordStore<T>,
        direction: Direction,
    ) -> MapperResult<Option<&'s T>> {
        let compare = self.compare.as_ref().ok_or_else(|| {
            MapperError::InvalidArgument("Comparator cannot be absent".to_string())
        })?;
        if store.is_empty() {
            return Ok(None);
        }

        let mut survivors = store
            .all()
            .iter()
            .filter(|record| self.filter.as_ref().is_none_or(|keep| keep(*record)))
            .collect::<Vec<_>>();
        survivors.sort_by(|a, b| compare(*a, *b));

        Ok(match direction {
            Direction::Lowest => survivors.first().copied(),
            Direction::Highest => survivors.last().copied(),
        })
    }

    pub fn lowest<'s>(&self, store: &'s RecordStore<T>) -> MapperResult<Option<&'s T>> {
        self.select(store, Direction::Lowest)
    }

    pub fn highest<'s>(&self, store: &'s RecordStore<T>) -> MapperResult<Option<&'s T>> {
        self.select(store, Direction::Highest)
    }
}

/// Orders dynamic records by one field. Records lacking the field sort first.
pub fn by_field(name: &str) -> impl Fn(&Record, &Record) -> Ordering + '_ {
    move |a: &Record, b: &Record| match (a.get(name), b.get(name)) {
        (Some(left), Some(right)) => left.total_cmp(right),
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
    }
}

pub fn field_not_sentinel(name: &str) -> impl Fn(&Record) -> bool + '_ {
    move |record: &Record| record.get(name).is_some_and(|value| !value.is_sentinel())
}
