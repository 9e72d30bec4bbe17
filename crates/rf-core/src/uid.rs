use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

/// Global string interner for element UIDs — fast comparisons, low memory.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// A lightweight, interned element identifier.
/// Internally a `Spur` index — 4 bytes, Copy, Eq, Hash in O(1).
///
/// A UID is attached to every node of a parsed component file and is the unit
/// of element identity: paths are sequences of UIDs, and the fix-up pass keeps
/// them stable across re-parses.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Uid(Spur);

impl Uid {
    /// Intern a new string as a Uid, or return existing if already interned.
    pub fn intern(s: &str) -> Self {
        Uid(INTERNER.get_or_intern(s))
    }

    /// Resolve back to a string slice.
    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }
}

impl fmt::Debug for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for Uid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Uid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Uid::intern(&s))
    }
}

/// The working set of UIDs known to exist in some scope (a file, a project).
pub type UidSet = HashSet<Uid>;

const UID_ALPHABET: &[u8; 36] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Encode a counter value as a short base-36 mnemonic, at least three chars.
fn encode_uid(mut n: u64) -> String {
    let mut buf = Vec::with_capacity(3);
    loop {
        buf.push(UID_ALPHABET[(n % 36) as usize]);
        n /= 36;
        if n == 0 {
            break;
        }
    }
    while buf.len() < 3 {
        buf.push(b'a');
    }
    buf.reverse();
    buf.iter().map(|&b| b as char).collect()
}

/// Generate a fresh UID guaranteed absent from `existing`.
pub fn generate_uid(existing: &UidSet) -> Uid {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    loop {
        let n = COUNTER.fetch_add(1, Ordering::Relaxed);
        let candidate = Uid::intern(&encode_uid(n));
        if !existing.contains(&candidate) {
            return candidate;
        }
    }
}

/// Generate a deterministic replacement for `original` that collides with
/// nothing in `existing` and steals nothing from `expected`.
///
/// Used by the UID fix-up pass when a re-parse produced a duplicate: the
/// replacement must be stable across repeated runs, so it is derived from
/// the original by a numeric suffix rather than drawn from the fresh-UID
/// counter.
pub fn generate_consistent_uid(original: Uid, existing: &UidSet, expected: &UidSet) -> Uid {
    if !existing.contains(&original) && !expected.contains(&original) {
        return original;
    }
    let base = original.as_str();
    let mut n: u64 = 2;
    loop {
        let candidate = Uid::intern(&format!("{base}-{n}"));
        if !existing.contains(&candidate) && !expected.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}
