//! Element paths: hierarchical addresses into the rendered element tree.
//!
//! A path is the ordered sequence of UIDs from a component root down to one
//! element instance. Paths are immutable values — every operation returns a
//! new path — and compare segment-by-segment on interned UIDs, so equality
//! and prefix tests never rebuild strings.

use crate::uid::Uid;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// A hierarchical address identifying one element instance.
#[derive(Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ElementPath {
    parts: SmallVec<[Uid; 8]>,
}

impl ElementPath {
    /// The empty path (no segments). Resolves to nothing on its own; used as
    /// the starting point for `append`.
    pub fn empty() -> Self {
        Self {
            parts: SmallVec::new(),
        }
    }

    /// Build a path from UID segments, root first.
    pub fn from_parts(parts: impl IntoIterator<Item = Uid>) -> Self {
        Self {
            parts: parts.into_iter().collect(),
        }
    }

    /// Build a path from string segments, interning each.
    pub fn from_strs(parts: &[&str]) -> Self {
        Self::from_parts(parts.iter().map(|p| Uid::intern(p)))
    }

    /// Return a new path with `uid` appended.
    #[must_use]
    pub fn append(&self, uid: Uid) -> Self {
        let mut parts = self.parts.clone();
        parts.push(uid);
        Self { parts }
    }

    /// The parent path (empty for a single-segment path), or `None` for the
    /// empty path.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.parts.is_empty() {
            return None;
        }
        Some(Self {
            parts: self.parts[..self.parts.len() - 1].into(),
        })
    }

    /// The last segment — the UID of the addressed element itself.
    pub fn to_uid(&self) -> Option<Uid> {
        self.parts.last().copied()
    }

    /// The first segment — the UID of the component root.
    pub fn head(&self) -> Option<Uid> {
        self.parts.first().copied()
    }

    pub fn parts(&self) -> &[Uid] {
        &self.parts
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// True when `self` is a strict descendant of `ancestor`.
    pub fn is_descendant_of(&self, ancestor: &ElementPath) -> bool {
        self.parts.len() > ancestor.parts.len()
            && self.parts[..ancestor.parts.len()] == ancestor.parts[..]
    }

    /// True when `prefix` equals `self` or is an ancestor of it.
    pub fn starts_with(&self, prefix: &ElementPath) -> bool {
        self.parts.len() >= prefix.parts.len()
            && self.parts[..prefix.parts.len()] == prefix.parts[..]
    }
}

impl fmt::Display for ElementPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                write!(f, "/")?;
            }
            write!(f, "{part}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ElementPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Same as Display — paths read as `a/b/c` in assertion failures.
        write!(f, "{self}")
    }
}
