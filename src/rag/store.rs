//! Item vector store: keeps one index record per planning item.
//!
//! The record's `text` metadata is always the exact text that was embedded,
//! since the context builder shows it to the model verbatim.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::core::errors::ApiError;
use crate::embeddings::EmbeddingClient;
use crate::models::{Item, ItemType, Status};
use crate::vector::{Metadata, QueryMatch, VectorIndex, VectorRecord};

/// Item types considered when no explicit set is given.
pub const DEFAULT_INCLUDE_TYPES: [ItemType; 2] = [ItemType::Action, ItemType::Outcome];

/// Read projection of an index match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievedMatch {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub energy: String,
    pub size: String,
    pub status: String,
    pub text: String,
    pub score: f64,
}

/// Title alone, or title and description separated by a blank line.
pub fn build_item_text(item: &Item) -> String {
    match item.description.as_deref() {
        Some(description) if !description.is_empty() => {
            format!("{}\n\n{}", item.title, description)
        }
        _ => item.title.clone(),
    }
}

/// Metadata stored next to the vector. Absent optional fields are omitted.
pub fn build_item_metadata(user_id: &str, item: &Item, text: &str) -> Metadata {
    let mut metadata = Map::new();
    metadata.insert("user_id".into(), json!(user_id));
    metadata.insert("type".into(), json!(item.item_type.as_str()));
    metadata.insert("status".into(), json!(item.status.as_str()));
    if let Some(energy) = item.energy {
        metadata.insert("energy".into(), json!(energy.as_str()));
    }
    if let Some(size) = item.size {
        metadata.insert("size".into(), json!(size.as_str()));
    }
    metadata.insert("title".into(), json!(item.title));
    if let Some(created_at) = &item.created_at {
        metadata.insert("created_at".into(), json!(created_at));
    }
    metadata.insert("text".into(), json!(text));
    metadata.insert("item_id".into(), json!(item.id));
    metadata
}

/// Filter for a user's open items, restricted to `include_types` when non-empty.
pub fn build_query_filter(user_id: &str, include_types: &[ItemType]) -> Value {
    let mut filter = json!({
        "user_id": user_id,
        "status": Status::Open.as_str(),
    });
    if !include_types.is_empty() {
        let types: Vec<&str> = include_types.iter().map(ItemType::as_str).collect();
        if let Some(obj) = filter.as_object_mut() {
            obj.insert("type".into(), json!({ "$in": types }));
        }
    }
    filter
}

fn to_retrieved(hit: QueryMatch) -> RetrievedMatch {
    let metadata = hit.metadata.unwrap_or_default();
    let field = |key: &str| {
        metadata
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    let id = metadata
        .get("item_id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or(hit.id);

    RetrievedMatch {
        id,
        title: field("title"),
        item_type: field("type"),
        energy: field("energy"),
        size: field("size"),
        status: field("status"),
        text: field("text"),
        score: hit.score.unwrap_or(0.0),
    }
}

pub struct ItemVectorStore {
    embeddings: Arc<dyn EmbeddingClient>,
    index: Arc<dyn VectorIndex>,
}

impl ItemVectorStore {
    pub fn new(embeddings: Arc<dyn EmbeddingClient>, index: Arc<dyn VectorIndex>) -> Self {
        Self { embeddings, index }
    }

    /// Embeds the item and writes its record, overwriting any record with the same id.
    pub async fn upsert(&self, user_id: &str, item: &Item) -> Result<(), ApiError> {
        let text = build_item_text(item);
        let embedding = self
            .embeddings
            .embed_many(std::slice::from_ref(&text))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::Upstream("No embedding returned".to_string()))?;

        let record = VectorRecord {
            id: item.id.clone(),
            values: embedding,
            metadata: build_item_metadata(user_id, item, &text),
        };
        self.index.upsert(vec![record]).await?;

        tracing::debug!("Upserted item {} for user {}", item.id, user_id);
        Ok(())
    }

    /// Removes the item's record. Unknown ids succeed.
    pub async fn delete(&self, item_id: &str) -> Result<(), ApiError> {
        self.index.delete(&[item_id.to_string()]).await?;
        tracing::debug!("Deleted item {}", item_id);
        Ok(())
    }

    /// Open items of `user_id` most relevant to `question`, in index ranking order.
    pub async fn query(
        &self,
        user_id: &str,
        question: &str,
        top_k: usize,
        include_types: &[ItemType],
    ) -> Result<Vec<RetrievedMatch>, ApiError> {
        let vector = self.embeddings.embed_one(question).await?;
        let filter = build_query_filter(user_id, include_types);
        let hits = self.index.query(&vector, top_k, Some(&filter)).await?;

        Ok(hits.into_iter().map(to_retrieved).collect())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::embeddings::Embedding;
    use crate::models::{Energy, Size};

    fn item(description: Option<&str>) -> Item {
        Item {
            id: "item-1".into(),
            item_type: ItemType::Action,
            title: "Draft proposal".into(),
            description: description.map(str::to_string),
            energy: Some(Energy::Energizing),
            size: Some(Size::M),
            status: Status::Open,
            created_at: Some("2024-05-01T10:00:00Z".into()),
        }
    }

    #[derive(Default)]
    struct RecordingEmbeddings {
        documents: Mutex<Vec<String>>,
        queries: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl EmbeddingClient for RecordingEmbeddings {
        async fn embed_many(&self, texts: &[String]) -> Result<Vec<Embedding>, ApiError> {
            self.documents.lock().unwrap().extend(texts.iter().cloned());
            Ok(texts.iter().map(|_| vec![0.5, 0.5]).collect())
        }

        async fn embed_one(&self, text: &str) -> Result<Embedding, ApiError> {
            self.queries.lock().unwrap().push(text.to_string());
            Ok(vec![1.0, 0.0])
        }
    }

    #[derive(Default)]
    struct RecordingIndex {
        upserts: Mutex<Vec<VectorRecord>>,
        deletes: Mutex<Vec<String>>,
        queries: Mutex<Vec<(Vec<f32>, usize, Option<Value>)>>,
        canned: Vec<QueryMatch>,
    }

    #[async_trait]
    impl VectorIndex for RecordingIndex {
        async fn upsert(&self, records: Vec<VectorRecord>) -> Result<(), ApiError> {
            self.upserts.lock().unwrap().extend(records);
            Ok(())
        }

        async fn delete(&self, ids: &[String]) -> Result<(), ApiError> {
            self.deletes.lock().unwrap().extend(ids.iter().cloned());
            Ok(())
        }

        async fn query(
            &self,
            vector: &[f32],
            top_k: usize,
            filter: Option<&Value>,
        ) -> Result<Vec<QueryMatch>, ApiError> {
            self.queries
                .lock()
                .unwrap()
                .push((vector.to_vec(), top_k, filter.cloned()));
            Ok(self.canned.clone())
        }
    }

    #[test]
    fn item_text_is_title_alone_without_description() {
        assert_eq!(build_item_text(&item(None)), "Draft proposal");
        assert_eq!(build_item_text(&item(Some(""))), "Draft proposal");
    }

    #[test]
    fn item_text_joins_description_with_blank_line() {
        assert_eq!(
            build_item_text(&item(Some("Outline the budget section"))),
            "Draft proposal\n\nOutline the budget section"
        );
    }

    #[test]
    fn metadata_omits_missing_optional_fields() {
        let mut bare = item(None);
        bare.energy = None;
        bare.size = None;
        bare.created_at = None;
        let metadata = build_item_metadata("u1", &bare, "Draft proposal");

        assert!(!metadata.contains_key("energy"));
        assert!(!metadata.contains_key("size"));
        assert!(!metadata.contains_key("created_at"));
        assert_eq!(metadata["status"], "open");
    }

    #[test]
    fn filter_without_types_has_no_type_clause() {
        let filter = build_query_filter("u1", &[]);
        assert_eq!(filter, json!({ "user_id": "u1", "status": "open" }));
    }

    #[tokio::test]
    async fn upsert_embeds_text_and_writes_record() {
        let embeddings = Arc::new(RecordingEmbeddings::default());
        let index = Arc::new(RecordingIndex::default());
        let store = ItemVectorStore::new(embeddings.clone(), index.clone());

        store
            .upsert("u1", &item(Some("Outline the budget section")))
            .await
            .unwrap();

        let expected_text = "Draft proposal\n\nOutline the budget section";
        assert_eq!(*embeddings.documents.lock().unwrap(), vec![expected_text]);

        let upserts = index.upserts.lock().unwrap();
        assert_eq!(upserts.len(), 1);
        let record = &upserts[0];
        assert_eq!(record.id, "item-1");
        assert_eq!(record.values, vec![0.5, 0.5]);
        assert_eq!(
            Value::Object(record.metadata.clone()),
            json!({
                "user_id": "u1",
                "type": "action",
                "status": "open",
                "energy": "energizing",
                "size": "M",
                "title": "Draft proposal",
                "created_at": "2024-05-01T10:00:00Z",
                "text": expected_text,
                "item_id": "item-1",
            })
        );
    }

    #[tokio::test]
    async fn delete_forwards_id() {
        let index = Arc::new(RecordingIndex::default());
        let store = ItemVectorStore::new(Arc::new(RecordingEmbeddings::default()), index.clone());

        store.delete("missing-id").await.unwrap();
        assert_eq!(*index.deletes.lock().unwrap(), vec!["missing-id".to_string()]);
    }

    #[tokio::test]
    async fn query_passes_filter_and_keeps_index_order() {
        let mut metadata = Map::new();
        metadata.insert("item_id".into(), json!("b"));
        metadata.insert("title".into(), json!("Second"));
        metadata.insert("type".into(), json!("outcome"));

        let index = Arc::new(RecordingIndex {
            canned: vec![
                QueryMatch {
                    id: "a".into(),
                    score: Some(0.2),
                    metadata: None,
                },
                QueryMatch {
                    id: "vec-b".into(),
                    score: Some(0.9),
                    metadata: Some(metadata),
                },
            ],
            ..Default::default()
        });
        let embeddings = Arc::new(RecordingEmbeddings::default());
        let store = ItemVectorStore::new(embeddings.clone(), index.clone());

        let results = store
            .query("u1", "what now?", 20, &DEFAULT_INCLUDE_TYPES)
            .await
            .unwrap();

        assert_eq!(*embeddings.queries.lock().unwrap(), vec!["what now?"]);
        let queries = index.queries.lock().unwrap();
        let (vector, top_k, filter) = &queries[0];
        assert_eq!(vector, &vec![1.0, 0.0]);
        assert_eq!(*top_k, 20);
        assert_eq!(
            filter.as_ref().unwrap(),
            &json!({
                "user_id": "u1",
                "status": "open",
                "type": { "$in": ["action", "outcome"] }
            })
        );

        // Not re-sorted: the lower score stays first.
        assert_eq!(results[0].id, "a");
        assert_eq!(results[0].title, "");
        assert_eq!(results[0].text, "");
        assert_eq!(results[1].id, "b");
        assert_eq!(results[1].title, "Second");
        assert_eq!(results[1].item_type, "outcome");
        assert_eq!(results[1].energy, "");
        assert_eq!(results[1].score, 0.9);
    }

    #[tokio::test]
    async fn missing_score_defaults_to_zero() {
        let index = Arc::new(RecordingIndex {
            canned: vec![QueryMatch {
                id: "a".into(),
                score: None,
                metadata: None,
            }],
            ..Default::default()
        });
        let store = ItemVectorStore::new(Arc::new(RecordingEmbeddings::default()), index);

        let results = store.query("u1", "q", 5, &[]).await.unwrap();
        assert_eq!(results[0].score, 0.0);
    }
}
