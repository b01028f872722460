//! Cross-document aggregation
//!
//! Stamps every record with the document it came from and concatenates
//! documents in processing order, records in extraction order.

use crate::interpret::Interpretation;
use crate::{ExtractedEntity, ExtractedRelationship};

/// One document's interpreted output
#[derive(Debug, Clone)]
pub struct DocumentExtraction {
    pub source_document: String,
    pub interpretation: Interpretation,
}

impl DocumentExtraction {
    pub fn new(source_document: impl Into<String>, interpretation: Interpretation) -> Self {
        Self {
            source_document: source_document.into(),
            interpretation,
        }
    }
}

/// All records of a batch, before deduplication
#[derive(Debug, Clone, Default)]
pub struct Aggregated {
    pub entities: Vec<ExtractedEntity>,
    pub relationships: Vec<ExtractedRelationship>,
}

/// Accumulates documents one at a time
#[derive(Debug, Default)]
pub struct Aggregator {
    inner: Aggregated,
    documents: usize,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one document's records, tagged with `source_document`
    pub fn add(&mut self, source_document: &str, interpretation: Interpretation) {
        let Interpretation {
            entities,
            relationships,
        } = interpretation;

        self.inner
            .entities
            .extend(entities.into_iter().map(|mut e| {
                e.source_document = source_document.to_string();
                e
            }));
        self.inner
            .relationships
            .extend(relationships.into_iter().map(|mut r| {
                r.source_document = source_document.to_string();
                r
            }));
        self.documents += 1;
    }

    /// Number of documents added so far
    pub fn document_count(&self) -> usize {
        self.documents
    }

    pub fn finish(self) -> Aggregated {
        tracing::debug!(
            documents = self.documents,
            entities = self.inner.entities.len(),
            relationships = self.inner.relationships.len(),
            "Aggregation complete"
        );
        self.inner
    }
}

/// Aggregate a sequence of per-document results
pub fn aggregate(results: impl IntoIterator<Item = DocumentExtraction>) -> Aggregated {
    let mut aggregator = Aggregator::new();
    for result in results {
        aggregator.add(&result.source_document, result.interpretation);
    }
    aggregator.finish()
}
