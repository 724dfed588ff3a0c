//! Per-index membership transitions
//!
//! A put compares the normalized index value of the stored record with the
//! value of the incoming record, one index at a time, and turns the pair
//! into a bucket operation:
//!
//! | old  | new  | transition            |
//! |------|------|-----------------------|
//! | ""   | ""   | `Unchanged`           |
//! | V    | V    | `Refresh(V)`          |
//! | V1   | V2   | `Move { V1 -> V2 }`   |
//! | V    | ""   | `Drop(V)`             |
//! | ""   | V    | `Insert(V)`           |
//!
//! A first insertion is the `"" -> V` row with no old record. The empty
//! value never gets a bucket on any path.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexTransition<'a> {
    /// Record stays outside the index
    Unchanged,
    /// Same bucket, replace the stored snapshot
    Refresh(&'a str),
    /// Leave `from`, join `to`
    Move { from: &'a str, to: &'a str },
    /// Join a bucket the key was not in
    Insert(&'a str),
    /// Leave the index entirely
    Drop(&'a str),
}

impl<'a> IndexTransition<'a> {
    /// Both values must already be normalized. Pass `""` as `old` when the
    /// key has no stored record.
    pub fn between(old: &'a str, new: &'a str) -> Self {
        match (old.is_empty(), new.is_empty()) {
            (true, true) => Self::Unchanged,
            (true, false) => Self::Insert(new),
            (false, true) => Self::Drop(old),
            (false, false) if old == new => Self::Refresh(new),
            (false, false) => Self::Move { from: old, to: new },
        }
    }

    /// Variant name without the index values, for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Unchanged => "unchanged",
            Self::Refresh(_) => "refresh",
            Self::Move { .. } => "move",
            Self::Insert(_) => "insert",
            Self::Drop(_) => "drop",
        }
    }

    /// Bucket the key belongs to afterwards, if any.
    pub fn target(&self) -> Option<&'a str> {
        match *self {
            Self::Refresh(value) | Self::Insert(value) | Self::Move { to: value, .. } => {
                Some(value)
            }
            Self::Unchanged | Self::Drop(_) => None,
        }
    }

    /// Bucket the key must be removed from, if any.
    pub fn stale(&self) -> Option<&'a str> {
        match *self {
            Self::Move { from, .. } | Self::Drop(from) => Some(from),
            _ => None,
        }
    }
}
