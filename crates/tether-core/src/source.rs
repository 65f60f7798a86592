#![forbid(unsafe_code)]

//! Remote sources and canonical references.
//!
//! A [`Source`] is an opaque handle to either a single addressable remote
//! value or an ordered query over a remote collection. The binder never looks
//! inside a source; it derives exactly one thing from it — the
//! [`SourceRef`], the canonical reference of the underlying location, used
//! for display and debugging only. Query directives (ordering, windowing)
//! are carried opaquely for the synchronization engine to interpret.

use std::fmt;

/// Ordering directive for a collection query.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum OrderBy {
    /// Order by each child's key.
    Key,
    /// Order by each child's primitive value.
    Value,
    /// Order by a named field of each child.
    Child(String),
}

/// Canonical reference of a source's underlying remote location.
///
/// Two sources that address the same location compare equal here even when
/// their query directives differ, the same way a query's reference collapses
/// to its root location.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct SourceRef(String);

impl SourceRef {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Terminal path segment, if any.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.0.rsplit('/').next().filter(|segment| !segment.is_empty())
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Handle to a remote value or an ordered query over a remote collection.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Source {
    path: String,
    order: Option<OrderBy>,
    limit_first: Option<u32>,
    limit_last: Option<u32>,
}

impl Source {
    /// A source addressing a single remote value.
    #[must_use]
    pub fn reference(path: impl AsRef<str>) -> Self {
        Self {
            path: normalize(path.as_ref()),
            order: None,
            limit_first: None,
            limit_last: None,
        }
    }

    /// A source addressing an ordered collection. Directives are attached
    /// with the builder methods below; a bare query mirrors the collection
    /// in key order.
    #[must_use]
    pub fn query(path: impl AsRef<str>) -> Self {
        Self::reference(path)
    }

    #[must_use]
    pub fn order_by_key(mut self) -> Self {
        self.order = Some(OrderBy::Key);
        self
    }

    #[must_use]
    pub fn order_by_value(mut self) -> Self {
        self.order = Some(OrderBy::Value);
        self
    }

    #[must_use]
    pub fn order_by_child(mut self, field: impl Into<String>) -> Self {
        self.order = Some(OrderBy::Child(field.into()));
        self
    }

    /// Keep only the first `n` children of the ordered window.
    #[must_use]
    pub fn limit_to_first(mut self, n: u32) -> Self {
        self.limit_first = Some(n);
        self
    }

    /// Keep only the last `n` children of the ordered window.
    #[must_use]
    pub fn limit_to_last(mut self, n: u32) -> Self {
        self.limit_last = Some(n);
        self
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn order(&self) -> Option<&OrderBy> {
        self.order.as_ref()
    }

    #[must_use]
    pub fn limits(&self) -> (Option<u32>, Option<u32>) {
        (self.limit_first, self.limit_last)
    }

    /// The canonical reference of the underlying location (query directives
    /// stripped).
    #[must_use]
    pub fn canonical_ref(&self) -> SourceRef {
        SourceRef(self.path.clone())
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)?;
        match &self.order {
            Some(OrderBy::Key) => f.write_str(" [by-key]")?,
            Some(OrderBy::Value) => f.write_str(" [by-value]")?,
            Some(OrderBy::Child(field)) => write!(f, " [by-child:{field}]")?,
            None => {}
        }
        if let Some(n) = self.limit_first {
            write!(f, " [first:{n}]")?;
        }
        if let Some(n) = self.limit_last {
            write!(f, " [last:{n}]")?;
        }
        Ok(())
    }
}

fn normalize(path: &str) -> String {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
