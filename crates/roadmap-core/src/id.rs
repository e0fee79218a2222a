use serde::{Deserialize, Serialize};
use std::fmt;

const MILESTONE_ID_PREFIX: &str = "milestone-";
const ITEM_ID_PREFIX: &str = "item-";

/// Largest suffix read back as a counter value. Ids above it are kept as opaque
/// strings so the counter always has room to grow.
pub const MAX_COUNTER: u64 = i64::MAX as u64;

fn parse_counter(digits: &str) -> Option<u64> {
    digits.parse().ok().filter(|n| *n <= MAX_COUNTER)
}

#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MilestoneId(String);

impl MilestoneId {
    pub fn from_counter(n: u64) -> Self {
        Self(format!("{MILESTONE_ID_PREFIX}{n}"))
    }

    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric suffix of a `milestone-<n>` id, if it has that shape.
    pub fn counter(&self) -> Option<u64> {
        parse_counter(self.0.strip_prefix(MILESTONE_ID_PREFIX)?)
    }
}

impl fmt::Display for MilestoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for MilestoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MilestoneId({})", self.0)
    }
}

#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// `item-<milestoneId>-<n>`, `n` drawn from the roadmap-wide item counter.
    pub fn new(milestone: &MilestoneId, n: u64) -> Self {
        Self(format!("{ITEM_ID_PREFIX}{milestone}-{n}"))
    }

    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Trailing numeric component, e.g. `7` for `item-milestone-2-7`.
    pub fn counter(&self) -> Option<u64> {
        let rest = self.0.strip_prefix(ITEM_ID_PREFIX)?;
        parse_counter(rest.rsplit('-').next()?)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ItemId({})", self.0)
    }
}

/// Strictly increasing counter. Only a full reset (new roadmap) moves it back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdCounter {
    last: u64,
}

impl IdCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self) -> u64 {
        self.last += 1;
        self.last
    }

    /// Guarantee that the next value handed out is greater than `seen`.
    /// Values above [`MAX_COUNTER`] are ignored.
    pub fn observe(&mut self, seen: u64) {
        if seen > self.last && seen <= MAX_COUNTER {
            self.last = seen;
        }
    }

    pub fn last(&self) -> u64 {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn next_exceeds_everything_observed(seen in proptest::collection::vec(0u64..10_000, 0..20)) {
            let mut c = IdCounter::new();
            let mut handed_out = Vec::new();
            for s in &seen {
                c.observe(*s);
                handed_out.push(c.next());
            }
            let max_seen = seen.iter().copied().max().unwrap_or(0);
            let after = c.next();
            prop_assert!(after > max_seen);
            prop_assert!(handed_out.iter().all(|n| *n < after));
        }
    }

    #[test]
    fn milestone_counter_parses_suffix() {
        assert_eq!(MilestoneId::from_counter(12).counter(), Some(12));
        assert_eq!(MilestoneId::from_string("milestone-x").counter(), None);
        assert_eq!(MilestoneId::from_string("period-3").counter(), None);
    }

    #[test]
    fn item_counter_uses_trailing_component() {
        let m = MilestoneId::from_counter(4);
        let item = ItemId::new(&m, 9);
        assert_eq!(item.as_str(), "item-milestone-4-9");
        assert_eq!(item.counter(), Some(9));
    }

    #[test]
    fn oversized_suffix_is_not_a_counter() {
        assert_eq!(MilestoneId::from_string("milestone-18446744073709551615").counter(), None);
        assert_eq!(MilestoneId::from_counter(MAX_COUNTER).counter(), Some(MAX_COUNTER));
        assert_eq!(
            ItemId::from_string("item-milestone-1-18446744073709551615").counter(),
            None
        );

        let mut c = IdCounter::new();
        c.observe(u64::MAX);
        assert_eq!(c.next(), 1);
    }

    #[test]
    fn observe_never_moves_backwards() {
        let mut c = IdCounter::new();
        c.observe(5);
        c.observe(2);
        assert_eq!(c.next(), 6);
    }
}
