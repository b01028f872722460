//! Report rows
//!
//! The primary report lists every canonical relationship followed by every
//! canonical entity that takes part in none of them ("isolated"), numbered
//! contiguously from 1. The profile report has one row per entity.

use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::export::CsvRow;
use crate::{CanonicalEntity, CanonicalRelationship};

/// Row discriminator of the primary report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RowKind {
    #[serde(rename = "Relazione")]
    Relationship,
    #[serde(rename = "Persona Isolata")]
    IsolatedEntity,
}

/// One line of the primary report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    #[serde(rename = "ID")]
    pub id: usize,
    #[serde(rename = "Tipo")]
    pub kind: RowKind,
    #[serde(rename = "Nome_A")]
    pub name_a: String,
    #[serde(rename = "Stato_A")]
    pub status_a: String,
    #[serde(rename = "FontePDF_A")]
    pub source_a: String,
    #[serde(rename = "TipoRel")]
    pub relation_type: String,
    #[serde(rename = "Peso")]
    pub weight: String,
    #[serde(rename = "Contesto")]
    pub context: String,
    #[serde(rename = "FontePDF_Rel")]
    pub relation_source: String,
    #[serde(rename = "Nome_B")]
    pub name_b: String,
    #[serde(rename = "Stato_B")]
    pub status_b: String,
    #[serde(rename = "FontePDF_B")]
    pub source_b: String,
}

impl CsvRow for ReportRow {
    const COLUMNS: &'static [&'static str] = &[
        "ID",
        "Tipo",
        "Nome_A",
        "Stato_A",
        "FontePDF_A",
        "TipoRel",
        "Peso",
        "Contesto",
        "FontePDF_Rel",
        "Nome_B",
        "Stato_B",
        "FontePDF_B",
    ];
}

/// One line of the extended profile report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileRow {
    pub nome: String,
    pub ruolo: String,
    pub organizzazione: String,
    pub localita_principali: String,
    pub attivita_criminali_note: String,
    pub scambi_economici_sospetti: String,
    pub accuse_formali: String,
    pub coinvolgimento_omicidi: String,
    pub altro_rilevante: String,
    pub relazioni: String,
}

impl CsvRow for ProfileRow {
    const COLUMNS: &'static [&'static str] = &[
        "nome",
        "ruolo",
        "organizzazione",
        "localita_principali",
        "attivita_criminali_note",
        "scambi_economici_sospetti",
        "accuse_formali",
        "coinvolgimento_omicidi",
        "altro_rilevante",
        "relazioni",
    ];
}

/// Build the primary report rows
pub fn build_rows(
    entities: &[CanonicalEntity],
    relationships: &[CanonicalRelationship],
) -> Vec<ReportRow> {
    // Exact display name, not the normalized key: enrichment misses are
    // expected when the two sides spell a name differently.
    let by_name: HashMap<&str, &CanonicalEntity> =
        entities.iter().map(|e| (e.name.as_str(), e)).collect();

    let enrich = |name: &str| -> (String, String) {
        by_name
            .get(name)
            .map(|e| (e.role_or_status.clone(), e.source_document.clone()))
            .unwrap_or_default()
    };

    let mut rows = Vec::with_capacity(relationships.len() + entities.len());

    for rel in relationships {
        let (status_a, source_a) = enrich(&rel.subject_name);
        let (status_b, source_b) = enrich(&rel.counterpart_name);

        rows.push(ReportRow {
            id: rows.len() + 1,
            kind: RowKind::Relationship,
            name_a: rel.subject_name.clone(),
            status_a,
            source_a,
            relation_type: rel.relation_type.clone(),
            weight: rel.weight.clone(),
            context: rel.context.clone(),
            relation_source: rel.source_document.clone(),
            name_b: rel.counterpart_name.clone(),
            status_b,
            source_b,
        });
    }

    let involved: HashSet<&str> = relationships
        .iter()
        .flat_map(|r| [r.subject_name.as_str(), r.counterpart_name.as_str()])
        .collect();

    for entity in entities.iter().filter(|e| !involved.contains(e.name.as_str())) {
        rows.push(ReportRow {
            id: rows.len() + 1,
            kind: RowKind::IsolatedEntity,
            name_a: entity.name.clone(),
            status_a: entity.role_or_status.clone(),
            source_a: entity.source_document.clone(),
            relation_type: String::new(),
            weight: String::new(),
            context: String::new(),
            relation_source: String::new(),
            name_b: String::new(),
            status_b: String::new(),
            source_b: String::new(),
        });
    }

    rows
}

/// Build the extended profile rows
///
/// The `relazioni` column summarises only the relationships in which the
/// entity is the subject, matched on case-insensitive exact name.
pub fn build_profile_rows(
    entities: &[CanonicalEntity],
    relationships: &[CanonicalRelationship],
) -> Vec<ProfileRow> {
    entities
        .iter()
        .map(|entity| {
            let name = entity.name.to_lowercase();
            let summary = relationships
                .iter()
                .filter(|r| r.subject_name.to_lowercase() == name)
                .map(|r| {
                    format!(
                        "{} con {} ({})",
                        r.relation_type, r.counterpart_name, r.context
                    )
                })
                .collect::<Vec<_>>()
                .join("; ");

            let profile = &entity.profile;
            ProfileRow {
                nome: entity.name.clone(),
                ruolo: entity.role_or_status.clone(),
                organizzazione: profile.organization.clone(),
                localita_principali: profile.main_locations.render(),
                attivita_criminali_note: profile.criminal_activities.render(),
                scambi_economici_sospetti: profile.suspicious_exchanges.render(),
                accuse_formali: profile.formal_accusations.render(),
                coinvolgimento_omicidi: profile.homicide_involvement.render(),
                altro_rilevante: profile.other_notes.clone(),
                relazioni: summary,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EntityProfile, ExtractedEntity, ExtractedRelationship, FieldValue};

    fn entity(name: &str, role: &str, source: &str) -> CanonicalEntity {
        let mut e = ExtractedEntity::new(name, role);
        e.source_document = source.to_string();
        e
    }

    fn rel(a: &str, b: &str, kind: &str, context: &str, source: &str) -> CanonicalRelationship {
        let mut r = ExtractedRelationship::new(a, b, kind).with_context(context);
        r.source_document = source.to_string();
        r
    }

    #[test]
    fn test_relationship_rows_are_enriched() {
        let entities = vec![
            entity("Mario Rossi", "capo", "a.pdf"),
            entity("Luigi Bianchi", "gregario", "b.pdf"),
        ];
        let relationships = vec![rel("Mario Rossi", "Luigi Bianchi", "alleato", "affari", "c.pdf")];

        let rows = build_rows(&entities, &relationships);
        assert_eq!(rows.len(), 1);

        let row = &rows[0];
        assert_eq!(row.id, 1);
        assert_eq!(row.kind, RowKind::Relationship);
        assert_eq!(row.status_a, "capo");
        assert_eq!(row.source_a, "a.pdf");
        assert_eq!(row.relation_type, "alleato");
        assert_eq!(row.context, "affari");
        assert_eq!(row.relation_source, "c.pdf");
        assert_eq!(row.name_b, "Luigi Bianchi");
        assert_eq!(row.status_b, "gregario");
        assert_eq!(row.source_b, "b.pdf");
    }

    #[test]
    fn test_unknown_endpoint_enriches_empty() {
        let entities = vec![entity("Mario Rossi", "capo", "a.pdf")];
        // Counterpart spelled differently from any canonical entity
        let relationships = vec![rel("Mario Rossi", "ROSSI Mario", "alias", "", "a.pdf")];

        let rows = build_rows(&entities, &relationships);
        assert_eq!(rows[0].status_b, "");
        assert_eq!(rows[0].source_b, "");
    }

    #[test]
    fn test_isolated_entity_row() {
        let entities = vec![
            entity("Mario Rossi", "capo", "a.pdf"),
            entity("Anna Verdi", "cassiera", "b.pdf"),
        ];
        let relationships = vec![rel("Mario Rossi", "Luigi Bianchi", "alleato", "", "a.pdf")];

        let rows = build_rows(&entities, &relationships);
        assert_eq!(rows.len(), 2);

        let isolated = &rows[1];
        assert_eq!(isolated.id, 2);
        assert_eq!(isolated.kind, RowKind::IsolatedEntity);
        assert_eq!(isolated.name_a, "Anna Verdi");
        assert_eq!(isolated.status_a, "cassiera");
        assert_eq!(isolated.source_a, "b.pdf");
        for field in [
            &isolated.relation_type,
            &isolated.weight,
            &isolated.context,
            &isolated.relation_source,
            &isolated.name_b,
            &isolated.status_b,
            &isolated.source_b,
        ] {
            assert!(field.is_empty());
        }
    }

    #[test]
    fn test_ids_contiguous_and_grouped() {
        let entities = vec![
            entity("A Uno", "", "a.pdf"),
            entity("B Due", "", "a.pdf"),
            entity("C Tre", "", "a.pdf"),
            entity("D Quattro", "", "a.pdf"),
        ];
        let relationships = vec![
            rel("A Uno", "B Due", "socio", "", "a.pdf"),
            rel("X Ignoto", "A Uno", "rivale", "", "a.pdf"),
        ];

        let rows = build_rows(&entities, &relationships);
        let isolated = entities
            .iter()
            .filter(|e| {
                !relationships
                    .iter()
                    .any(|r| r.subject_name == e.name || r.counterpart_name == e.name)
            })
            .count();

        assert_eq!(rows.len(), relationships.len() + isolated);
        let ids: Vec<_> = rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, (1..=rows.len()).collect::<Vec<_>>());

        let kinds: Vec<_> = rows.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![
                RowKind::Relationship,
                RowKind::Relationship,
                RowKind::IsolatedEntity,
                RowKind::IsolatedEntity,
            ]
        );
        assert_eq!(rows[2].name_a, "C Tre");
        assert_eq!(rows[3].name_a, "D Quattro");
    }

    #[test]
    fn test_empty_inputs() {
        assert!(build_rows(&[], &[]).is_empty());
        assert!(build_profile_rows(&[], &[]).is_empty());
    }

    #[test]
    fn test_profile_rows() {
        let mut mario = entity("Mario Rossi", "capo", "a.pdf");
        mario.profile = EntityProfile {
            organization: "Clan Esposito".to_string(),
            main_locations: FieldValue::List(vec!["Napoli".to_string(), "Caserta".to_string()]),
            criminal_activities: FieldValue::Text("estorsione".to_string()),
            other_notes: "latitante".to_string(),
            ..EntityProfile::default()
        };
        let entities = vec![mario, entity("Luigi Bianchi", "", "a.pdf")];
        let relationships = vec![
            rel("mario rossi", "Luigi Bianchi", "alleato", "affari", "a.pdf"),
            rel("Mario Rossi", "Anna Verdi", "cugino", "", "a.pdf"),
            rel("Luigi Bianchi", "Mario Rossi", "debitore", "usura", "a.pdf"),
        ];

        let rows = build_profile_rows(&entities, &relationships);
        assert_eq!(rows.len(), 2);

        let row = &rows[0];
        assert_eq!(row.nome, "Mario Rossi");
        assert_eq!(row.ruolo, "capo");
        assert_eq!(row.organizzazione, "Clan Esposito");
        assert_eq!(row.localita_principali, "Napoli, Caserta");
        assert_eq!(row.attivita_criminali_note, "estorsione");
        assert_eq!(row.altro_rilevante, "latitante");
        assert_eq!(
            row.relazioni,
            "alleato con Luigi Bianchi (affari); cugino con Anna Verdi ()"
        );

        // counterpart-side relationships are not summarised
        assert_eq!(rows[1].relazioni, "debitore con Mario Rossi (usura)");
    }

    #[test]
    fn test_profile_without_relationships() {
        let rows = build_profile_rows(&[entity("Anna Verdi", "", "a.pdf")], &[]);
        assert_eq!(rows[0].relazioni, "");
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        const NAMES: &[&str] = &["Mario Rossi", "Luigi Bianchi", "Anna Verdi", "Carlo Neri", "Ugo Sala"];

        fn name() -> impl Strategy<Value = &'static str> {
            prop::sample::select(NAMES)
        }

        proptest! {
            #[test]
            fn rows_cover_relationships_and_isolated_entities(
                entity_names in prop::collection::vec(name(), 0..6),
                pairs in prop::collection::vec((name(), name()), 0..6),
            ) {
                let entities: Vec<_> = entity_names
                    .iter()
                    .map(|n| entity(n, "", "a.pdf"))
                    .collect();
                let relationships: Vec<_> = pairs
                    .iter()
                    .map(|(a, b)| rel(a, b, "socio", "", "a.pdf"))
                    .collect();

                let rows = build_rows(&entities, &relationships);

                let isolated = entities
                    .iter()
                    .filter(|e| {
                        !relationships
                            .iter()
                            .any(|r| r.subject_name == e.name || r.counterpart_name == e.name)
                    })
                    .count();
                prop_assert_eq!(rows.len(), relationships.len() + isolated);

                let ids: Vec<_> = rows.iter().map(|r| r.id).collect();
                prop_assert_eq!(ids, (1..=rows.len()).collect::<Vec<_>>());

                let first_isolated = rows
                    .iter()
                    .position(|r| r.kind == RowKind::IsolatedEntity)
                    .unwrap_or(rows.len());
                prop_assert_eq!(first_isolated, relationships.len());
            }
        }
    }
}
