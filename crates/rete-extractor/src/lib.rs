//! rete Extractor - From model output to a deduplicated report
//!
//! Turns the loosely structured JSON a language model returns for each
//! analyst report into typed records, merges them across documents and
//! builds the rows of the two CSV reports:
//! - `interpret`: isolate and parse the JSON array, project typed records
//! - `normalize`: case- and word-order-insensitive name keys
//! - `aggregate`: stamp records with their source document and concatenate
//! - `dedup`: collapse records sharing a key (first-wins / last-wins)
//! - `report`: relationship / isolated-entity rows and entity profiles
//! - `pipeline`: the per-batch driver wiring text extraction and inference

use serde::Serialize;

pub mod aggregate;
pub mod dedup;
pub mod export;
pub mod interpret;
pub mod normalize;
pub mod pipeline;
pub mod prompt;
pub mod report;

pub use aggregate::{aggregate, Aggregated, Aggregator, DocumentExtraction};
pub use dedup::{
    dedup_by_key, dedup_entities, dedup_relationships, relationship_key, MergeStrategy,
    RelationshipKey,
};
pub use export::{write_rows, CsvRow, ExportError};
pub use interpret::{interpret, Interpretation, InterpretError, SliceError};
pub use normalize::normalize;
pub use pipeline::{BatchOutcome, BatchPipeline, DocumentUpload, PipelineConfig, ReportSummary};
pub use report::{build_profile_rows, build_rows, ProfileRow, ReportRow, RowKind};

// ============================================================================
// Extraction records
// ============================================================================

/// A person, organization or place mentioned in a report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedEntity {
    /// Display name as written by the model, trimmed and never empty
    pub name: String,

    /// Role or status (`ruolo`), may be empty
    pub role_or_status: String,

    /// Identifier of the uploaded file, set by the aggregator
    pub source_document: String,

    /// Extended attributes used by the profile report
    pub profile: EntityProfile,
}

impl ExtractedEntity {
    /// Create an entity with an empty profile and no source yet
    pub fn new(name: impl Into<String>, role_or_status: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role_or_status: role_or_status.into(),
            source_document: String::new(),
            profile: EntityProfile::default(),
        }
    }

    /// Set the profile
    pub fn with_profile(mut self, profile: EntityProfile) -> Self {
        self.profile = profile;
        self
    }
}

/// Extended per-subject attributes requested by the standard prompt
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EntityProfile {
    /// `tipo`: persona, azienda or luogo
    pub kind: String,
    /// `organizzazione`
    pub organization: String,
    /// `localita_principali`
    pub main_locations: FieldValue,
    /// `attivita_criminali_note`
    pub criminal_activities: FieldValue,
    /// `scambi_economici_sospetti`
    pub suspicious_exchanges: FieldValue,
    /// `accuse_formali`
    pub formal_accusations: FieldValue,
    /// `coinvolgimento_omicidi`
    pub homicide_involvement: FieldValue,
    /// `altro_rilevante`
    pub other_notes: String,
}

/// A profile attribute the model may return either as a list or as text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    List(Vec<String>),
    Text(String),
}

impl FieldValue {
    /// Comma-join a list, pass text through verbatim
    pub fn render(&self) -> String {
        match self {
            Self::List(items) => items.join(", "),
            Self::Text(text) => text.clone(),
        }
    }
}

impl Default for FieldValue {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

/// A directed relationship reported for a subject
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedRelationship {
    /// Name of the subject the relationship was listed under
    pub subject_name: String,
    /// `con_chi`, never empty
    pub counterpart_name: String,
    /// `tipo`, never empty
    pub relation_type: String,
    /// Reserved for scoring; always empty today and passed through as-is
    pub weight: String,
    /// `contesto_relazione`, may be empty
    pub context: String,
    /// Identifier of the uploaded file, set by the aggregator
    pub source_document: String,
}

impl ExtractedRelationship {
    /// Create a relationship with empty weight, context and source
    pub fn new(
        subject_name: impl Into<String>,
        counterpart_name: impl Into<String>,
        relation_type: impl Into<String>,
    ) -> Self {
        Self {
            subject_name: subject_name.into(),
            counterpart_name: counterpart_name.into(),
            relation_type: relation_type.into(),
            weight: String::new(),
            context: String::new(),
            source_document: String::new(),
        }
    }

    /// Set the context
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }
}

/// The single representative entity kept for a normalized name
pub type CanonicalEntity = ExtractedEntity;

/// The single representative relationship kept for a composite key
pub type CanonicalRelationship = ExtractedRelationship;

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_value_render() {
        let list = FieldValue::List(vec!["Napoli".to_string(), "Caserta".to_string()]);
        assert_eq!(list.render(), "Napoli, Caserta");

        let text = FieldValue::Text("Napoli e provincia".to_string());
        assert_eq!(text.render(), "Napoli e provincia");

        assert_eq!(FieldValue::default().render(), "");
        assert_eq!(FieldValue::List(vec![]).render(), "");
    }

    #[test]
    fn test_record_builders() {
        let entity = ExtractedEntity::new("Mario Rossi", "capo");
        assert!(entity.source_document.is_empty());
        assert_eq!(entity.profile, EntityProfile::default());

        let rel = ExtractedRelationship::new("Mario Rossi", "Luigi Bianchi", "alleato")
            .with_context("affari");
        assert_eq!(rel.context, "affari");
        assert!(rel.weight.is_empty());
    }
}
