//! Response interpretation
//!
//! The model is asked for a bare JSON array but routinely wraps it in
//! prose or code fences. Interpretation runs in two stages:
//! 1. `isolate_json_array`: slice from the first `[` to the last `]`
//! 2. `parse_subjects`: parse the slice as a JSON array
//!
//! and then projects every subject object onto typed records. Nothing here
//! fails outward: `interpret` degrades to an empty `Interpretation`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::{EntityProfile, ExtractedEntity, ExtractedRelationship, FieldValue};

/// Why no JSON array could be sliced out of the raw text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SliceError {
    #[error("no '[' ... ']' pair found")]
    NotFound,

    #[error("last ']' comes before first '['")]
    Inverted,
}

/// Why the model output could not be interpreted
#[derive(Debug, Error)]
pub enum InterpretError {
    #[error(transparent)]
    Slice(#[from] SliceError),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a JSON array, found {0}")]
    NotAnArray(&'static str),
}

/// Records projected from one model response
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Interpretation {
    pub entities: Vec<ExtractedEntity>,
    pub relationships: Vec<ExtractedRelationship>,
}

impl Interpretation {
    /// Nothing was extracted
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty() && self.relationships.is_empty()
    }
}

/// Slice the candidate JSON payload out of raw model text
pub fn isolate_json_array(raw: &str) -> Result<&str, SliceError> {
    let start = raw.find('[').ok_or(SliceError::NotFound)?;
    let end = raw.rfind(']').ok_or(SliceError::NotFound)?;

    if end < start {
        return Err(SliceError::Inverted);
    }

    Ok(&raw[start..=end])
}

/// Parse a candidate payload as a JSON array
pub fn parse_subjects(candidate: &str) -> Result<Vec<Value>, InterpretError> {
    match serde_json::from_str(candidate)? {
        Value::Array(items) => Ok(items),
        other => Err(InterpretError::NotAnArray(json_kind(&other))),
    }
}

/// Interpret raw model text, surfacing the failure mode
///
/// A missing bracket pair falls back to parsing the whole text; an
/// inverted pair is reported as an error.
pub fn try_interpret(raw: &str) -> Result<Interpretation, InterpretError> {
    let candidate = match isolate_json_array(raw) {
        Ok(slice) => slice,
        Err(SliceError::NotFound) => {
            tracing::debug!("No JSON array delimiters found, parsing the whole response");
            raw
        }
        Err(e) => return Err(e.into()),
    };

    let subjects = parse_subjects(candidate)?;

    let mut out = Interpretation::default();
    for (index, subject) in subjects.into_iter().enumerate() {
        if !subject.is_object() {
            tracing::warn!(
                index,
                kind = json_kind(&subject),
                "Skipping non-object element in model output"
            );
            continue;
        }
        match serde_json::from_value::<LlmSubject>(subject) {
            Ok(subject) => project_subject(subject, &mut out),
            Err(e) => tracing::warn!(index, error = %e, "Skipping unreadable subject"),
        }
    }

    Ok(out)
}

/// Interpret raw model text; never fails
pub fn interpret(raw: &str) -> Interpretation {
    tracing::debug!(chars = raw.len(), "Interpreting model response");

    let out = match try_interpret(raw) {
        Ok(out) => out,
        Err(e) => {
            tracing::error!(error = %e, "Critical failure parsing model output");
            return Interpretation::default();
        }
    };

    if out.is_empty() {
        tracing::debug!("Model output yielded no entities or relationships");
    } else {
        tracing::debug!(
            entities = out.entities.len(),
            relationships = out.relationships.len(),
            "Model output interpreted"
        );
    }

    out
}

// ============================================================================
// Wire records
// ============================================================================

/// One subject object as the model writes it
///
/// `nome` is required (non-empty after trimming); every other field is
/// optional. Text fields accept JSON strings only, anything else reads as
/// empty.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LlmSubject {
    #[serde(deserialize_with = "lenient_string")]
    nome: String,
    #[serde(deserialize_with = "lenient_string")]
    ruolo: String,
    #[serde(deserialize_with = "lenient_string")]
    tipo: String,
    #[serde(deserialize_with = "lenient_string")]
    organizzazione: String,
    localita_principali: FieldValue,
    attivita_criminali_note: FieldValue,
    scambi_economici_sospetti: FieldValue,
    accuse_formali: FieldValue,
    coinvolgimento_omicidi: FieldValue,
    #[serde(deserialize_with = "lenient_string")]
    altro_rilevante: String,
    /// Kept raw so non-object entries can be skipped one by one
    #[serde(deserialize_with = "lenient_array")]
    relazioni: Vec<Value>,
}

/// One entry of `relazioni`; `con_chi` and `tipo` are required
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LlmRelation {
    #[serde(deserialize_with = "lenient_string")]
    con_chi: String,
    #[serde(deserialize_with = "lenient_string")]
    tipo: String,
    #[serde(deserialize_with = "lenient_string")]
    contesto_relazione: String,
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        _ => Ok(String::new()),
    }
}

fn lenient_array<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Value>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(items),
        _ => Ok(Vec::new()),
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Array(items) => FieldValue::List(items.iter().filter_map(list_item).collect()),
            Value::String(text) => FieldValue::Text(text),
            _ => FieldValue::default(),
        })
    }
}

/// Strings verbatim, numbers and booleans as JSON text, anything else dropped
fn list_item(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(_) | Value::Bool(_) => Some(value.to_string()),
        _ => None,
    }
}

fn project_subject(subject: LlmSubject, out: &mut Interpretation) {
    let name = subject.nome.trim().to_string();
    if name.is_empty() {
        return;
    }

    let profile = EntityProfile {
        kind: subject.tipo.trim().to_string(),
        organization: subject.organizzazione,
        main_locations: subject.localita_principali,
        criminal_activities: subject.attivita_criminali_note,
        suspicious_exchanges: subject.scambi_economici_sospetti,
        formal_accusations: subject.accuse_formali,
        homicide_involvement: subject.coinvolgimento_omicidi,
        other_notes: subject.altro_rilevante,
    };

    out.entities
        .push(ExtractedEntity::new(name.clone(), subject.ruolo.trim()).with_profile(profile));

    for relation in subject.relazioni {
        if !relation.is_object() {
            tracing::warn!(subject = %name, "Skipping non-object relationship");
            continue;
        }
        let rel: LlmRelation = match serde_json::from_value(relation) {
            Ok(rel) => rel,
            Err(e) => {
                tracing::warn!(subject = %name, error = %e, "Skipping unreadable relationship");
                continue;
            }
        };

        let counterpart = rel.con_chi.trim();
        let relation_type = rel.tipo.trim();
        if counterpart.is_empty() || relation_type.is_empty() {
            continue;
        }

        out.relationships.push(
            ExtractedRelationship::new(name.clone(), counterpart, relation_type)
                .with_context(rel.contesto_relazione.trim()),
        );
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ============================================================================
// Tests
// ============================================================================
