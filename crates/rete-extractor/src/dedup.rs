//! Deduplication
//!
//! Entities and relationships use opposite merge policies: an entity keeps
//! the first record seen for its name key, a relationship keeps the last
//! record seen for its composite key. Both preserve the position of the
//! first occurrence of each key.

use indexmap::IndexMap;
use std::hash::Hash;

use crate::normalize::normalize;
use crate::{CanonicalEntity, CanonicalRelationship, ExtractedEntity, ExtractedRelationship};

/// What happens when a key is seen again
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStrategy {
    /// Insert-if-absent: later duplicates are dropped
    KeepFirst,
    /// Insert-or-overwrite: later duplicates replace the stored record
    KeepLast,
}

/// Collapse `items` to one per key, in first-occurrence order
pub fn dedup_by_key<T, K, F>(
    items: impl IntoIterator<Item = T>,
    key_fn: F,
    strategy: MergeStrategy,
) -> Vec<T>
where
    K: Hash + Eq,
    F: Fn(&T) -> K,
{
    let mut unique: IndexMap<K, T> = IndexMap::new();

    for item in items {
        let key = key_fn(&item);
        match strategy {
            MergeStrategy::KeepFirst => {
                unique.entry(key).or_insert(item);
            }
            MergeStrategy::KeepLast => {
                unique.insert(key, item);
            }
        }
    }

    unique.into_values().collect()
}

/// One canonical entity per normalized name, first occurrence wins
pub fn dedup_entities(
    entities: impl IntoIterator<Item = ExtractedEntity>,
) -> Vec<CanonicalEntity> {
    dedup_by_key(entities, |e| normalize(&e.name), MergeStrategy::KeepFirst)
}

/// Composite identity of a relationship
///
/// Endpoint names go through `normalize`; relation type and context are
/// only lower-cased, so their word order still matters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelationshipKey {
    pub subject: String,
    pub counterpart: String,
    pub relation_type: String,
    pub weight: String,
    pub context: String,
}

pub fn relationship_key(rel: &ExtractedRelationship) -> RelationshipKey {
    RelationshipKey {
        subject: normalize(&rel.subject_name),
        counterpart: normalize(&rel.counterpart_name),
        relation_type: rel.relation_type.to_lowercase(),
        weight: rel.weight.clone(),
        context: rel.context.to_lowercase(),
    }
}

/// One canonical relationship per composite key, last occurrence wins
pub fn dedup_relationships(
    relationships: impl IntoIterator<Item = ExtractedRelationship>,
) -> Vec<CanonicalRelationship> {
    dedup_by_key(relationships, relationship_key, MergeStrategy::KeepLast)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(name: &str, role: &str, source: &str) -> ExtractedEntity {
        let mut e = ExtractedEntity::new(name, role);
        e.source_document = source.to_string();
        e
    }

    fn rel(a: &str, b: &str, kind: &str, context: &str, source: &str) -> ExtractedRelationship {
        let mut r = ExtractedRelationship::new(a, b, kind).with_context(context);
        r.source_document = source.to_string();
        r
    }

    #[test]
    fn test_generic_strategies() {
        let items = vec![("a", 1), ("b", 2), ("a", 3), ("c", 4), ("b", 5)];

        let first = dedup_by_key(items.clone(), |(k, _)| *k, MergeStrategy::KeepFirst);
        assert_eq!(first, vec![("a", 1), ("b", 2), ("c", 4)]);

        let last = dedup_by_key(items, |(k, _)| *k, MergeStrategy::KeepLast);
        assert_eq!(last, vec![("a", 3), ("b", 5), ("c", 4)]);
    }

    #[test]
    fn test_entity_first_write_wins() {
        let out = dedup_entities(vec![
            entity("ROSSI Mario", "capo", "a.pdf"),
            entity("Anna Verdi", "", "a.pdf"),
            entity("Mario Rossi", "gregario", "b.pdf"),
        ]);

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].name, "ROSSI Mario");
        assert_eq!(out[0].role_or_status, "capo");
        assert_eq!(out[0].source_document, "a.pdf");
        assert_eq!(out[1].name, "Anna Verdi");
    }

    #[test]
    fn test_entity_dedup_idempotent() {
        let once = dedup_entities(vec![
            entity("Mario Rossi", "capo", "a.pdf"),
            entity("rossi mario", "x", "b.pdf"),
            entity("Anna Verdi", "", "b.pdf"),
        ]);
        let twice = dedup_entities(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_relationship_last_write_wins() {
        let out = dedup_relationships(vec![
            rel("Mario Rossi", "Luigi Bianchi", "alleato", "affari", "a.pdf"),
            rel("Anna Verdi", "Mario Rossi", "cugina", "", "a.pdf"),
            rel("ROSSI mario", "bianchi LUIGI", "Alleato", "AFFARI", "b.pdf"),
        ]);

        assert_eq!(out.len(), 2);
        // position of the first occurrence, payload of the last
        assert_eq!(out[0].subject_name, "ROSSI mario");
        assert_eq!(out[0].source_document, "b.pdf");
        assert_eq!(out[1].subject_name, "Anna Verdi");
    }

    #[test]
    fn test_relationship_direction_matters() {
        let out = dedup_relationships(vec![
            rel("Mario Rossi", "Luigi Bianchi", "socio", "", "a.pdf"),
            rel("Luigi Bianchi", "Mario Rossi", "socio", "", "a.pdf"),
        ]);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_relationship_type_is_case_folded_not_reordered() {
        let a = rel("Mario Rossi", "Luigi Bianchi", "socio in affari", "", "a.pdf");
        let b = rel("Mario Rossi", "Luigi Bianchi", "affari in socio", "", "a.pdf");
        assert_ne!(relationship_key(&a), relationship_key(&b));

        let c = rel("Mario Rossi", "Luigi Bianchi", "SOCIO IN AFFARI", "", "b.pdf");
        assert_eq!(relationship_key(&a), relationship_key(&c));
    }

    #[test]
    fn test_weight_is_part_of_key() {
        let a = rel("Mario Rossi", "Luigi Bianchi", "socio", "", "a.pdf");
        let mut b = a.clone();
        b.weight = "3".to_string();
        assert_eq!(dedup_relationships(vec![a, b]).len(), 2);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn name() -> impl Strategy<Value = String> {
            "[a-cA-C]{1,3}( [a-cA-C]{1,3}){0,2}"
        }

        proptest! {
            #[test]
            fn entity_dedup_is_idempotent_with_unique_keys(
                names in prop::collection::vec(name(), 0..12),
            ) {
                let entities: Vec<_> = names.iter().map(|n| entity(n, "", "a.pdf")).collect();
                let once = dedup_entities(entities);
                let twice = dedup_entities(once.clone());
                prop_assert_eq!(&once, &twice);

                let keys: std::collections::HashSet<_> =
                    once.iter().map(|e| normalize(&e.name)).collect();
                prop_assert_eq!(keys.len(), once.len());
            }

            #[test]
            fn relationship_dedup_is_idempotent(
                triples in prop::collection::vec((name(), name(), "[a-c]{1,2}"), 0..12),
            ) {
                let rels: Vec<_> = triples
                    .iter()
                    .map(|(a, b, t)| rel(a, b, t, "", "a.pdf"))
                    .collect();
                let once = dedup_relationships(rels);
                let twice = dedup_relationships(once.clone());
                prop_assert_eq!(&once, &twice);
            }
        }
    }
}
