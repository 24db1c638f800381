//! Overlay of cached records on durable records.

use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::record::Record;

/// Whether accessors hand out owned copies of cached records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GetCopyType {
    /// Clone cached records so callers can mutate them freely.
    #[default]
    Copy,
    /// Borrow cached records. Callers only read.
    NoCopyCache,
}

/// Merge durable and cached records by primary key.
///
/// A cached record replaces a durable record with the same key. The result
/// is ordered by key. Durable records are always owned; cached records are
/// cloned or borrowed according to `copy`.
pub fn merge_by_pk<'a, R, I>(from_db: Vec<R>, from_cache: I, copy: GetCopyType) -> Vec<Cow<'a, R>>
where
    R: Record,
    I: IntoIterator<Item = &'a R>,
{
    let mut merged: BTreeMap<R::Key, Cow<'a, R>> = from_db
        .into_iter()
        .map(|r| (r.key(), Cow::Owned(r)))
        .collect();

    for r in from_cache {
        let value = match copy {
            GetCopyType::Copy => Cow::Owned(r.clone()),
            GetCopyType::NoCopyCache => Cow::Borrowed(r),
        };
        merged.insert(r.key(), value);
    }

    merged.into_values().collect()
}

/// Keep the last `limit` entries.
pub fn last_entries<T>(mut items: Vec<T>, limit: usize) -> Vec<T> {
    let excess = items.len().saturating_sub(limit);
    items.drain(..excess);
    items
}

#[cfg(test)]
mod tests {
    use franchise_types::{Message, Mid};

    use super::*;

    fn message(mid: u32, text: &str) -> Message {
        Message {
            mid: Mid::new(mid),
            from: "The Owner".to_owned(),
            season: 2025,
            text: text.to_owned(),
            read: false,
            subject: None,
        }
    }

    #[test]
    fn cache_wins_on_shared_key() {
        let db = vec![message(1, "old"), message(2, "db only")];
        let cache = [message(1, "new"), message(3, "cache only")];

        let merged = merge_by_pk(db, cache.iter(), GetCopyType::NoCopyCache);
        let texts: Vec<&str> = merged.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["new", "db only", "cache only"]);
        assert!(matches!(merged.first(), Some(Cow::Borrowed(_))));
    }

    #[test]
    fn copy_policy_clones_cache_records() {
        let cache = [message(4, "cached")];
        let merged = merge_by_pk(Vec::new(), cache.iter(), GetCopyType::Copy);
        assert!(matches!(merged.first(), Some(Cow::Owned(_))));
    }

    #[test]
    fn last_entries_trims_from_front() {
        assert_eq!(last_entries(vec![1, 2, 3, 4], 2), vec![3, 4]);
        assert_eq!(last_entries(vec![1, 2], 5), vec![1, 2]);
    }
}
