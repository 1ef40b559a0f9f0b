//! SQLite-backed vector index for document chunks.

use crate::rag::scorer::cosine_similarity;
use crate::types::DocumentChunk;
use crate::vector_index::VectorIndex;
use assist_core::{AppError, AppResult, Port};
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Persistent vector index stored in a single SQLite file.
///
/// Embeddings are stored as little-endian `f32` blobs and ranked in process
/// by cosine similarity. Every database call runs on the blocking pool, so
/// callers can put a deadline on it.
pub struct SqliteIndex {
    conn: Arc<Mutex<Connection>>,
    path: Option<PathBuf>,
}

fn store_error(action: &str, e: impl std::fmt::Display) -> AppError {
    AppError::port(Port::VectorStore, format!("Failed to {}: {}", action, e))
}

impl SqliteIndex {
    /// Open (or create) the index at `db_path`.
    pub fn open(db_path: &Path) -> AppResult<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::Knowledge(format!("Failed to create index directory: {}", e))
            })?;
        }

        let conn = Connection::open(db_path).map_err(|e| store_error("open SQLite index", e))?;
        init_schema(&conn)?;

        tracing::debug!("Opened SQLite index at {:?}", db_path);
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: Some(db_path.to_path_buf()),
        })
    }

    /// Open a throwaway in-memory database.
    pub fn open_in_memory() -> AppResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| store_error("open SQLite index", e))?;
        init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: None,
        })
    }

    /// Location of the database file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Size of the database file in bytes.
    pub fn size_bytes(&self) -> u64 {
        self.path
            .as_ref()
            .and_then(|p| std::fs::metadata(p).ok())
            .map(|m| m.len())
            .unwrap_or(0)
    }

    /// Run `work` against the locked connection on the blocking pool.
    async fn with_conn<T, F>(&self, work: F) -> AppResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> AppResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);

        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|_| AppError::port(Port::VectorStore, "SQLite index lock poisoned"))?;
            work(&mut conn)
        })
        .await
        .map_err(|e| store_error("run index task", e))?
    }
}

fn init_schema(conn: &Connection) -> AppResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS chunks (
            id TEXT PRIMARY KEY,
            path TEXT,
            text TEXT NOT NULL,
            embedding BLOB NOT NULL,
            metadata TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_chunks_path ON chunks(path);
        "#,
    )
    .map_err(|e| store_error("create tables", e))
}

fn search(conn: &Connection, query_embedding: &[f32], top_k: usize) -> AppResult<Vec<DocumentChunk>> {
    let mut stmt = conn
        .prepare("SELECT id, text, embedding, metadata FROM chunks")
        .map_err(|e| store_error("prepare query", e))?;

    let rows = stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Vec<u8>>(2)?,
                row.get::<_, String>(3)?,
            ))
        })
        .map_err(|e| store_error("query chunks", e))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| store_error("read chunk row", e))?;

    let mut results = Vec::with_capacity(rows.len());
    for (id, text, embedding_bytes, metadata_json) in rows {
        let embedding = bytes_to_embedding(&embedding_bytes)?;
        let metadata: serde_json::Value = serde_json::from_str(&metadata_json)
            .map_err(|e| store_error("decode chunk metadata", e))?;
        let score = cosine_similarity(query_embedding, &embedding);

        results.push((
            score,
            DocumentChunk {
                id,
                text,
                metadata,
                embedding,
            },
        ));
    }

    results.sort_by(|a, b| b.0.total_cmp(&a.0));
    results.truncate(top_k);

    Ok(results.into_iter().map(|(_, chunk)| chunk).collect())
}

#[async_trait::async_trait]
impl VectorIndex for SqliteIndex {
    fn backend_name(&self) -> &str {
        "sqlite"
    }

    async fn query(&self, query_embedding: &[f32], top_k: usize) -> AppResult<Vec<DocumentChunk>> {
        let query_embedding = query_embedding.to_vec();
        let results = self
            .with_conn(move |conn| search(conn, &query_embedding, top_k))
            .await?;

        tracing::debug!(
            "Retrieved {} chunks (requested top-{})",
            results.len(),
            top_k
        );

        Ok(results)
    }

    async fn upsert(&self, chunks: &[DocumentChunk]) -> AppResult<()> {
        let chunks = chunks.to_vec();

        self.with_conn(move |conn| {
            let tx = conn
                .transaction()
                .map_err(|e| store_error("begin transaction", e))?;

            for chunk in &chunks {
                let path = chunk.metadata.get("path").and_then(|v| v.as_str());
                tx.execute(
                    "INSERT OR REPLACE INTO chunks (id, path, text, embedding, metadata)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![
                        chunk.id,
                        path,
                        chunk.text,
                        embedding_to_bytes(&chunk.embedding),
                        chunk.metadata.to_string(),
                    ],
                )
                .map_err(|e| store_error("insert chunk", e))?;
            }

            tx.commit().map_err(|e| store_error("commit chunks", e))
        })
        .await
    }

    async fn remove_path(&self, path: &str) -> AppResult<usize> {
        let path = path.to_string();

        self.with_conn(move |conn| {
            conn.execute("DELETE FROM chunks WHERE path = ?1", params![path])
                .map_err(|e| store_error("delete chunks", e))
        })
        .await
    }

    async fn count(&self) -> AppResult<usize> {
        self.with_conn(|conn| {
            conn.query_row("SELECT COUNT(*) FROM chunks", [], |row| row.get::<_, i64>(0))
                .map(|n| n as usize)
                .map_err(|e| store_error("count chunks", e))
        })
        .await
    }

    async fn reset(&self) -> AppResult<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM chunks", [])
                .map_err(|e| store_error("delete chunks", e))
        })
        .await?;

        tracing::info!("Reset knowledge base index");
        Ok(())
    }
}

/// Convert embedding vector to bytes for storage.
fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Convert bytes back to embedding vector.
fn bytes_to_embedding(bytes: &[u8]) -> AppResult<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(AppError::port(
            Port::VectorStore,
            "Invalid embedding bytes length",
        ));
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}
