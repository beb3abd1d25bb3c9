//! Persistent vector store with brute-force cosine retrieval.

use std::fs;
use std::path::{Path, PathBuf};

use time::OffsetDateTime;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::archive;
use super::types::{ChunkMetadata, EntryInsert, IndexError, QueryHit, StoredEntry};

/// Handle to the on-disk index.
///
/// Constructed once at process start and shared by reference; all operations
/// serialize through an internal single-writer lock, so concurrent requests
/// cannot interleave partial writes. The collection is loaded lazily on first
/// access and invalidated by [`IndexStore::wipe`] and
/// [`IndexStore::import_archive`].
pub struct IndexStore {
    root: PathBuf,
    collection: String,
    state: Mutex<Option<Vec<StoredEntry>>>,
}

impl IndexStore {
    /// Create a handle rooted at `root` for the named collection.
    ///
    /// No filesystem access happens until the first operation.
    pub fn new(root: impl Into<PathBuf>, collection: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            collection: collection.into(),
            state: Mutex::new(None),
        }
    }

    /// Root directory of the index tree.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entries_path(&self) -> PathBuf {
        self.root.join(&self.collection).join("entries.json")
    }

    /// Load the collection from disk, creating an empty one when absent or
    /// unreadable. Unreadable contents are logged and replaced rather than
    /// surfaced; the caller sees an empty collection until the next reindex.
    fn load_collection(&self) -> Result<Vec<StoredEntry>, IndexError> {
        let path = self.entries_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        if !path.exists() {
            tracing::debug!(collection = %self.collection, "Creating empty collection");
            return Ok(Vec::new());
        }

        let raw = fs::read_to_string(&path)?;
        match serde_json::from_str::<Vec<StoredEntry>>(&raw) {
            Ok(entries) => {
                tracing::debug!(
                    collection = %self.collection,
                    entries = entries.len(),
                    "Loaded collection"
                );
                Ok(entries)
            }
            Err(error) => {
                tracing::warn!(
                    collection = %self.collection,
                    error = %error,
                    "Collection file unreadable; starting from an empty collection"
                );
                Ok(Vec::new())
            }
        }
    }

    fn persist(&self, entries: &[StoredEntry]) -> Result<(), IndexError> {
        let path = self.entries_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, serde_json::to_string(entries)?)?;
        Ok(())
    }

    /// Insert a batch of entries, assigning a fresh UUID to each.
    ///
    /// There is no deduplication by content or source/page: re-ingesting the
    /// same document accumulates duplicate chunks. Returns the number of
    /// entries stored.
    pub async fn upsert(&self, inserts: Vec<EntryInsert>) -> Result<usize, IndexError> {
        if inserts.is_empty() {
            return Ok(0);
        }

        let mut guard = self.state.lock().await;
        if guard.is_none() {
            *guard = Some(self.load_collection()?);
        }
        let entries = guard.as_mut().expect("collection loaded above");

        let now = current_timestamp_rfc3339();
        let count = inserts.len();
        for insert in inserts {
            entries.push(StoredEntry {
                id: Uuid::new_v4().to_string(),
                text: insert.text,
                metadata: insert.metadata,
                vector: insert.vector,
                ingested_at: now.clone(),
            });
        }
        self.persist(entries)?;

        tracing::debug!(
            collection = %self.collection,
            inserted = count,
            total = entries.len(),
            "Entries upserted"
        );
        Ok(count)
    }

    /// Return up to `k` entries ranked by cosine similarity, most similar
    /// first. Ties keep their in-memory order, which callers must treat as
    /// unspecified. Vectors of mismatched dimension are not detected; the
    /// operator must wipe before switching embedding models.
    pub async fn query(&self, vector: &[f32], k: usize) -> Result<Vec<QueryHit>, IndexError> {
        let mut guard = self.state.lock().await;
        if guard.is_none() {
            *guard = Some(self.load_collection()?);
        }
        let entries = guard.as_ref().expect("collection loaded above");

        let mut hits: Vec<QueryHit> = entries
            .iter()
            .map(|entry| QueryHit {
                text: entry.text.clone(),
                metadata: entry.metadata.clone(),
                score: cosine_similarity(vector, &entry.vector),
            })
            .collect();
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        hits.truncate(k);
        Ok(hits)
    }

    /// Number of entries currently stored.
    pub(crate) async fn count(&self) -> Result<usize, IndexError> {
        let mut guard = self.state.lock().await;
        if guard.is_none() {
            *guard = Some(self.load_collection()?);
        }
        let entries = guard.as_ref().expect("collection loaded above");
        Ok(entries.len())
    }

    /// Drop the cached in-memory collection. The next access reloads it from
    /// disk, picking up any files placed under the root out of band.
    pub async fn reset(&self) {
        let mut guard = self.state.lock().await;
        *guard = None;
    }

    /// Delete the collection and the whole index tree, then recreate the root
    /// empty. Idempotent; the cached handle is invalidated and the next
    /// access reopens an empty collection.
    pub async fn wipe(&self) -> Result<(), IndexError> {
        let mut guard = self.state.lock().await;
        *guard = None;

        if self.root.is_dir() {
            fs::remove_dir_all(&self.root)?;
        }
        fs::create_dir_all(&self.root)?;
        tracing::info!(collection = %self.collection, "Index wiped");
        Ok(())
    }

    /// Pack the index tree into a zip archive without altering the live index.
    pub async fn export_archive(&self) -> Result<Vec<u8>, IndexError> {
        // Hold the lock so an in-flight ingestion cannot interleave with the walk.
        let _guard = self.state.lock().await;
        let bytes = archive::pack_directory(&self.root)?;
        tracing::info!(bytes = bytes.len(), "Index exported");
        Ok(bytes)
    }

    /// Destructively replace the index tree with the archive's contents.
    pub async fn import_archive(&self, bytes: &[u8]) -> Result<(), IndexError> {
        let mut guard = self.state.lock().await;
        *guard = None;

        if self.root.is_dir() {
            fs::remove_dir_all(&self.root)?;
        }
        fs::create_dir_all(&self.root)?;
        archive::unpack_into(&self.root, bytes)?;
        tracing::info!(bytes = bytes.len(), "Index imported");
        Ok(())
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

fn current_timestamp_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insert(text: &str, page: u32, vector: Vec<f32>) -> EntryInsert {
        EntryInsert {
            text: text.into(),
            metadata: ChunkMetadata {
                source: "doc.pdf".into(),
                page: Some(page),
            },
            vector,
        }
    }

    #[tokio::test]
    async fn query_ranks_by_similarity_not_insertion_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = IndexStore::new(dir.path(), "wiki_pdf");

        store
            .upsert(vec![
                insert("orthogonal", 1, vec![0.0, 1.0]),
                insert("close", 2, vec![0.9, 0.1]),
                insert("exact", 3, vec![1.0, 0.0]),
            ])
            .await
            .expect("upsert");

        let hits = store.query(&[1.0, 0.0], 3).await.expect("query");
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].text, "exact");
        assert_eq!(hits[1].text, "close");
        assert_eq!(hits[2].text, "orthogonal");
        assert!(hits[0].score >= hits[1].score && hits[1].score >= hits[2].score);
    }

    #[tokio::test]
    async fn query_respects_k_and_empty_collection() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = IndexStore::new(dir.path(), "wiki_pdf");

        assert!(store.query(&[1.0, 0.0], 5).await.expect("query").is_empty());

        store
            .upsert(vec![
                insert("a", 1, vec![1.0, 0.0]),
                insert("b", 2, vec![0.5, 0.5]),
            ])
            .await
            .expect("upsert");
        let hits = store.query(&[1.0, 0.0], 1).await.expect("query");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].text, "a");
    }

    #[tokio::test]
    async fn entries_survive_reopening_the_store() {
        let dir = tempfile::tempdir().expect("tempdir");
        {
            let store = IndexStore::new(dir.path(), "wiki_pdf");
            store
                .upsert(vec![insert("persisted", 1, vec![1.0, 0.0])])
                .await
                .expect("upsert");
        }

        let reopened = IndexStore::new(dir.path(), "wiki_pdf");
        let hits = reopened.query(&[1.0, 0.0], 5).await.expect("query");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].text, "persisted");
        assert_eq!(hits[0].metadata.format_citation(), "doc.pdf (p. 1)");
    }

    #[tokio::test]
    async fn reingestion_accumulates_duplicates() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = IndexStore::new(dir.path(), "wiki_pdf");

        store
            .upsert(vec![insert("same text", 1, vec![1.0, 0.0])])
            .await
            .expect("upsert");
        store
            .upsert(vec![insert("same text", 1, vec![1.0, 0.0])])
            .await
            .expect("upsert");

        assert_eq!(store.count().await.expect("count"), 2);
    }

    #[tokio::test]
    async fn wipe_is_idempotent_and_empties_the_collection() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = IndexStore::new(dir.path(), "wiki_pdf");

        store
            .upsert(vec![insert("gone", 1, vec![1.0, 0.0])])
            .await
            .expect("upsert");
        store.wipe().await.expect("wipe");
        store.wipe().await.expect("second wipe");

        assert_eq!(store.count().await.expect("count"), 0);
        assert!(store.root().is_dir());
    }

    #[tokio::test]
    async fn export_then_import_restores_query_results() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = IndexStore::new(dir.path(), "wiki_pdf");

        store
            .upsert(vec![insert("restored", 4, vec![1.0, 0.0])])
            .await
            .expect("upsert");

        let bundle = store.export_archive().await.expect("export");
        store.wipe().await.expect("wipe");
        assert_eq!(store.count().await.expect("count"), 0);

        store.import_archive(&bundle).await.expect("import");
        let hits = store.query(&[1.0, 0.0], 5).await.expect("query");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].text, "restored");
        assert_eq!(hits[0].metadata.page, Some(4));
    }

    #[tokio::test]
    async fn corrupt_collection_file_self_heals_to_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let collection_dir = dir.path().join("wiki_pdf");
        fs::create_dir_all(&collection_dir).expect("mkdir");
        fs::write(collection_dir.join("entries.json"), b"{ not json").expect("write");

        let store = IndexStore::new(dir.path(), "wiki_pdf");
        assert_eq!(store.count().await.expect("count"), 0);
    }

    #[tokio::test]
    async fn reset_reloads_state_from_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = IndexStore::new(dir.path(), "wiki_pdf");
        store
            .upsert(vec![insert("cached", 1, vec![1.0, 0.0])])
            .await
            .expect("upsert");

        fs::write(store.root().join("wiki_pdf").join("entries.json"), "[]").expect("rewrite");
        assert_eq!(store.count().await.expect("count"), 1);

        store.reset().await;
        assert_eq!(store.count().await.expect("count"), 0);
    }

    #[test]
    fn cosine_similarity_handles_zero_vectors() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        let same = cosine_similarity(&[1.0, 2.0], &[1.0, 2.0]);
        assert!((same - 1.0).abs() < 1e-6);
    }
}
