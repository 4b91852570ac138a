use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::index::{Metadata, QueryMatch, VectorIndex, VectorRecord};
use crate::core::errors::ApiError;

/// In-process index scored by cosine similarity.
///
/// Supports the subset of the Pinecone filter language the service emits:
/// bare equality, `$eq`, `$ne`, `$in`, `$nin`, `$and` and `$or`.
#[derive(Default)]
pub struct InMemoryIndex {
    records: RwLock<HashMap<String, VectorRecord>>,
}

impl InMemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    pub async fn get(&self, id: &str) -> Option<VectorRecord> {
        self.records.read().await.get(id).cloned()
    }
}

/// Dimension of the stored vectors; `None` while the index is empty.
fn stored_dimension(records: &HashMap<String, VectorRecord>) -> Option<usize> {
    records.values().next().map(|record| record.values.len())
}

fn check_dimension(expected: usize, actual: usize) -> Result<(), ApiError> {
    if expected != actual {
        return Err(ApiError::Internal(format!(
            "vector dimension {} does not match index dimension {}",
            actual, expected
        )));
    }
    Ok(())
}

#[async_trait]
impl VectorIndex for InMemoryIndex {
    async fn upsert(&self, records: Vec<VectorRecord>) -> Result<(), ApiError> {
        let mut guard = self.records.write().await;
        let mut dimension = stored_dimension(&guard);
        for record in &records {
            let expected = *dimension.get_or_insert(record.values.len());
            check_dimension(expected, record.values.len())?;
        }
        for record in records {
            guard.insert(record.id.clone(), record);
        }
        Ok(())
    }

    async fn delete(&self, ids: &[String]) -> Result<(), ApiError> {
        let mut guard = self.records.write().await;
        for id in ids {
            guard.remove(id);
        }
        Ok(())
    }

    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: Option<&Value>,
    ) -> Result<Vec<QueryMatch>, ApiError> {
        let guard = self.records.read().await;
        if let Some(expected) = stored_dimension(&guard) {
            check_dimension(expected, vector.len())?;
        }
        let mut scored: Vec<(f64, &VectorRecord)> = guard
            .values()
            .filter(|record| filter.map_or(true, |f| matches_filter(&record.metadata, f)))
            .map(|record| (cosine_similarity(vector, &record.values), record))
            .collect();

        scored.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.1.id.cmp(&b.1.id))
        });
        scored.truncate(top_k);

        Ok(scored
            .into_iter()
            .map(|(score, record)| QueryMatch {
                id: record.id.clone(),
                score: Some(score),
                metadata: Some(record.metadata.clone()),
            })
            .collect())
    }
}

fn matches_filter(metadata: &Metadata, filter: &Value) -> bool {
    let Some(clauses) = filter.as_object() else {
        return true;
    };

    clauses.iter().all(|(key, condition)| match key.as_str() {
        "$and" => condition
            .as_array()
            .map_or(false, |parts| parts.iter().all(|p| matches_filter(metadata, p))),
        "$or" => condition
            .as_array()
            .map_or(false, |parts| parts.iter().any(|p| matches_filter(metadata, p))),
        field => matches_condition(metadata.get(field), condition),
    })
}

fn matches_condition(actual: Option<&Value>, condition: &Value) -> bool {
    let Some(operators) = condition.as_object() else {
        return actual == Some(condition);
    };

    operators.iter().all(|(op, expected)| match op.as_str() {
        "$eq" => actual == Some(expected),
        "$ne" => actual != Some(expected),
        "$in" => expected
            .as_array()
            .map_or(false, |set| actual.map_or(false, |a| set.contains(a))),
        "$nin" => expected
            .as_array()
            .map_or(true, |set| actual.map_or(true, |a| !set.contains(a))),
        other => {
            tracing::warn!("Unsupported filter operator {} matches nothing", other);
            false
        }
    })
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| (*x as f64) * (*y as f64)).sum();
    let norm_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
}
