// id.rs — Entity identifiers for modules and chunks
//
// Ids are assigned outside this crate (by the bundler's id-assignment
// phase) and are only compared here. An id is either numeric or text;
// the two kinds never compare equal: numeric ids order before text ids,
// and within a kind the native value order applies.

use std::cmp::Ordering;
use std::fmt;

/// Identifier of a module or chunk within one compilation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Id {
    Number(u64),
    Text(String),
}

impl Id {
    /// Kind precedence: numeric ids sort before text ids.
    /// Rank 1 is reserved for absent ids (see `compare_id_options`).
    pub(crate) fn kind_rank(&self) -> u8 {
        match self {
            Id::Number(_) => 0,
            Id::Text(_) => 2,
        }
    }
}

impl Ord for Id {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Id::Number(a), Id::Number(b)) => a.cmp(b),
            (Id::Text(a), Id::Text(b)) => a.cmp(b),
            _ => self.kind_rank().cmp(&other.kind_rank()),
        }
    }
}

impl PartialOrd for Id {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Id::Number(n) => write!(f, "{}", n),
            Id::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<u64> for Id {
    fn from(n: u64) -> Self {
        Id::Number(n)
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Id::Text(s.to_string())
    }
}

impl From<String> for Id {
    fn from(s: String) -> Self {
        Id::Text(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_ids_order_by_value() {
        assert_eq!(Id::Number(1).cmp(&Id::Number(2)), Ordering::Less);
        assert_eq!(Id::Number(7).cmp(&Id::Number(7)), Ordering::Equal);
        assert_eq!(Id::Number(9).cmp(&Id::Number(3)), Ordering::Greater);
    }

    #[test]
    fn text_ids_order_lexicographically() {
        assert_eq!(Id::from("alpha").cmp(&Id::from("beta")), Ordering::Less);
        assert_eq!(Id::from("same").cmp(&Id::from("same")), Ordering::Equal);
    }

    #[test]
    fn numeric_ids_sort_before_text_ids() {
        // Mixed kinds never tie, whatever the values look like.
        assert_eq!(Id::Number(999).cmp(&Id::from("0")), Ordering::Less);
        assert_eq!(Id::from("a").cmp(&Id::Number(0)), Ordering::Greater);
    }

    #[test]
    fn display_matches_underlying_value() {
        assert_eq!(Id::Number(42).to_string(), "42");
        assert_eq!(Id::from("main").to_string(), "main");
    }
}
