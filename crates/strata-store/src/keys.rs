//! Key encoding for the `RocksDB` document backend.
//!
//! Both replaced documents and appended metadata live under a
//! `{collection}/` prefix; `/` is forbidden in collection names, so
//! prefixes never collide. Replaced documents use a zero-padded row
//! index as the suffix (stable insertion order for pagination);
//! appended documents use a ULID (time-ordered, unique).

use ulid::Ulid;

/// Key for the `index`-th document of a replaced collection.
#[must_use]
pub fn document_key(collection: &str, index: u64) -> Vec<u8> {
    format!("{collection}/{index:020}").into_bytes()
}

/// Key for an appended document.
#[must_use]
pub fn appended_key(collection: &str, id: Ulid) -> Vec<u8> {
    format!("{collection}/{id}").into_bytes()
}

/// Prefix covering every document of a collection.
#[must_use]
pub fn collection_prefix(collection: &str) -> Vec<u8> {
    format!("{collection}/").into_bytes()
}

/// Key for a collection's document count.
#[must_use]
pub fn count_key(collection: &str) -> Vec<u8> {
    collection.as_bytes().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_keys_sort_by_index() {
        let k1 = document_key("gold_kpis", 1);
        let k2 = document_key("gold_kpis", 2);
        let k10 = document_key("gold_kpis", 10);

        assert!(k1 < k2);
        assert!(k2 < k10);
    }

    #[test]
    fn prefixes_do_not_collide_across_collections() {
        let prefix = collection_prefix("gold_kpis");
        let other = document_key("gold_kpis_v2", 0);

        assert!(!other.starts_with(&prefix));
        assert!(document_key("gold_kpis", 0).starts_with(&prefix));
    }

    #[test]
    fn appended_keys_share_the_collection_prefix() {
        let prefix = collection_prefix("_refresh_metadata");
        let key = appended_key("_refresh_metadata", Ulid::new());

        assert!(key.starts_with(&prefix));
    }
}
