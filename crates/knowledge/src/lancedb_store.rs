//! LanceDB-backed corpus tables.
//!
//! Each corpus is one table with columns `id` (Utf8), `text` (Utf8) and
//! `vector` (FixedSizeList<Float32>).

use crate::store::{cosine_similarity, ScoredText, VectorStore};
use arrow_array::{
    Array, FixedSizeListArray, Float32Array, RecordBatch, RecordBatchIterator, StringArray,
};
use arrow_schema::{DataType, Field, Schema, SchemaRef};
use baseera_core::{AppError, AppResult};
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{Connection, Table};
use std::path::Path;
use std::sync::Arc;

const VECTOR_COLUMN: &str = "vector";

/// A passage ready to be written: id, text, embedding.
#[derive(Debug, Clone)]
pub struct PassageRow {
    pub id: String,
    pub text: String,
    pub vector: Vec<f32>,
}

/// One corpus table opened for search.
pub struct LanceDbStore {
    name: String,
    table: Table,
    embedding_dim: usize,
}

impl LanceDbStore {
    /// Open an existing table.
    ///
    /// # Errors
    /// `AppError::Unavailable` if the database or the table does not exist; the
    /// corpora have to be ingested first.
    pub async fn open(db_path: &Path, table_name: &str, embedding_dim: usize) -> AppResult<Self> {
        if !db_path.exists() {
            return Err(AppError::Unavailable(format!(
                "Knowledge index not found at {:?}. Run `baseera ingest` first",
                db_path
            )));
        }

        let conn = connect(db_path).await?;
        if !table_exists(&conn, table_name).await? {
            return Err(AppError::Unavailable(format!(
                "Corpus table '{}' not found in {:?}. Run `baseera ingest` first",
                table_name, db_path
            )));
        }

        let table = conn
            .open_table(table_name)
            .execute()
            .await
            .map_err(|e| AppError::Knowledge(format!("Failed to open table: {}", e)))?;

        tracing::debug!(table = table_name, "Opened LanceDB table at {:?}", db_path);

        Ok(Self {
            name: table_name.to_string(),
            table,
            embedding_dim,
        })
    }

    /// Replace the contents of a table with `rows`, creating it if needed.
    ///
    /// Returns the row count after the write.
    pub async fn replace(
        db_path: &Path,
        table_name: &str,
        embedding_dim: usize,
        rows: &[PassageRow],
    ) -> AppResult<usize> {
        if rows.is_empty() {
            return Err(AppError::Knowledge(format!(
                "Refusing to write an empty corpus table '{}'",
                table_name
            )));
        }

        std::fs::create_dir_all(db_path).map_err(|e| {
            AppError::Knowledge(format!("Failed to create index directory: {}", e))
        })?;

        let schema = create_schema(embedding_dim);
        let batch = rows_to_batch(&schema, embedding_dim, rows)?;
        let conn = connect(db_path).await?;

        let table = if table_exists(&conn, table_name).await? {
            let table = conn
                .open_table(table_name)
                .execute()
                .await
                .map_err(|e| AppError::Knowledge(format!("Failed to open table: {}", e)))?;

            let existing = table
                .schema()
                .await
                .map_err(|e| AppError::Knowledge(format!("Failed to read table schema: {}", e)))?;
            let expected = vector_type(embedding_dim);
            let same_vector = existing
                .field_with_name(VECTOR_COLUMN)
                .map(|f| f.data_type() == &expected)
                .unwrap_or(false);
            if !same_vector {
                return Err(AppError::Knowledge(format!(
                    "Table '{}' has a different schema (embedding dimension changed?). Remove {:?} and ingest again",
                    table_name, db_path
                )));
            }

            table
                .delete("id IS NOT NULL")
                .await
                .map_err(|e| AppError::Knowledge(format!("Failed to clear table: {}", e)))?;

            table
                .add(RecordBatchIterator::new(vec![Ok(batch)], schema.clone()))
                .execute()
                .await
                .map_err(|e| AppError::Knowledge(format!("Failed to add rows: {}", e)))?;
            table
        } else {
            conn.create_table(
                table_name,
                RecordBatchIterator::new(vec![Ok(batch)], schema.clone()),
            )
            .execute()
            .await
            .map_err(|e| AppError::Knowledge(format!("Failed to create table: {}", e)))?
        };

        let count = table
            .count_rows(None)
            .await
            .map_err(|e| AppError::Knowledge(format!("Failed to count rows: {}", e)))?;

        tracing::info!(table = table_name, rows = count, "Corpus table written");
        Ok(count)
    }
}

#[async_trait::async_trait]
impl VectorStore for LanceDbStore {
    fn name(&self) -> &str {
        &self.name
    }

    async fn search(&self, query_embedding: &[f32], top_k: usize) -> AppResult<Vec<ScoredText>> {
        if query_embedding.len() != self.embedding_dim {
            return Err(AppError::Knowledge(format!(
                "Query embedding dimension mismatch: expected {}, got {}",
                self.embedding_dim,
                query_embedding.len()
            )));
        }

        let batches = self
            .table
            .query()
            .nearest_to(query_embedding.to_vec())
            .map_err(|e| AppError::Knowledge(format!("Failed to create query: {}", e)))?
            .limit(top_k)
            .execute()
            .await
            .map_err(|e| AppError::Knowledge(format!("Failed to execute search: {}", e)))?
            .try_collect::<Vec<_>>()
            .await
            .map_err(|e| AppError::Knowledge(format!("Failed to collect results: {}", e)))?;

        let mut results = Vec::new();
        for batch in &batches {
            results.extend(scored_rows(batch, query_embedding)?);
        }

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(top_k);

        tracing::debug!(table = %self.name, count = results.len(), "Vector search complete");
        Ok(results)
    }
}

async fn connect(db_path: &Path) -> AppResult<Connection> {
    let uri = db_path.to_string_lossy().to_string();
    lancedb::connect(&uri)
        .execute()
        .await
        .map_err(|e| AppError::Knowledge(format!("Failed to connect to LanceDB: {}", e)))
}

async fn table_exists(conn: &Connection, table_name: &str) -> AppResult<bool> {
    let names = conn
        .table_names()
        .execute()
        .await
        .map_err(|e| AppError::Knowledge(format!("Failed to list tables: {}", e)))?;
    Ok(names.iter().any(|n| n == table_name))
}

fn create_schema(embedding_dim: usize) -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("id", DataType::Utf8, false),
        Field::new("text", DataType::Utf8, false),
        Field::new(VECTOR_COLUMN, vector_type(embedding_dim), false),
    ]))
}

fn vector_type(embedding_dim: usize) -> DataType {
    DataType::FixedSizeList(
        Arc::new(Field::new("item", DataType::Float32, true)),
        embedding_dim as i32,
    )
}

fn rows_to_batch(schema: &SchemaRef, embedding_dim: usize, rows: &[PassageRow]) -> AppResult<RecordBatch> {
    let mut flat = Vec::with_capacity(rows.len() * embedding_dim);
    for row in rows {
        if row.vector.len() != embedding_dim {
            return Err(AppError::Knowledge(format!(
                "Embedding dimension mismatch for '{}': expected {}, got {}",
                row.id,
                embedding_dim,
                row.vector.len()
            )));
        }
        flat.extend_from_slice(&row.vector);
    }

    let ids = StringArray::from(rows.iter().map(|r| r.id.as_str()).collect::<Vec<_>>());
    let texts = StringArray::from(rows.iter().map(|r| r.text.as_str()).collect::<Vec<_>>());
    let vectors = FixedSizeListArray::try_new(
        Arc::new(Field::new("item", DataType::Float32, true)),
        embedding_dim as i32,
        Arc::new(Float32Array::from(flat)),
        None,
    )
    .map_err(|e| AppError::Knowledge(format!("Failed to build vector column: {}", e)))?;

    RecordBatch::try_new(
        schema.clone(),
        vec![Arc::new(ids), Arc::new(texts), Arc::new(vectors)],
    )
    .map_err(|e| AppError::Knowledge(format!("Failed to create RecordBatch: {}", e)))
}

fn scored_rows(batch: &RecordBatch, query_embedding: &[f32]) -> AppResult<Vec<ScoredText>> {
    let texts = batch
        .column_by_name("text")
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| AppError::Knowledge("Invalid text column".to_string()))?;

    let vectors = batch
        .column_by_name(VECTOR_COLUMN)
        .and_then(|c| c.as_any().downcast_ref::<FixedSizeListArray>())
        .ok_or_else(|| AppError::Knowledge("Invalid vector column".to_string()))?;

    let mut rows = Vec::with_capacity(batch.num_rows());
    for row_idx in 0..batch.num_rows() {
        let values = vectors.value(row_idx);
        let score = match values.as_any().downcast_ref::<Float32Array>() {
            Some(v) => cosine_similarity(query_embedding, v.values()),
            None => {
                tracing::warn!("Row {} has a non-float vector; scoring 0.0", row_idx);
                0.0
            }
        };

        rows.push(ScoredText {
            text: texts.value(row_idx).to_string(),
            score,
        });
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn row(id: &str, text: &str, vector: Vec<f32>) -> PassageRow {
        PassageRow {
            id: id.to_string(),
            text: text.to_string(),
            vector,
        }
    }

    #[tokio::test]
    async fn test_open_missing_index_is_unavailable() {
        let temp_dir = TempDir::new().unwrap();
        let result = LanceDbStore::open(&temp_dir.path().join("index"), "quran", 3).await;
        assert!(matches!(result, Err(AppError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_replace_then_search_orders_by_similarity() {
        let temp_dir = TempDir::new().unwrap();
        let db = temp_dir.path().join("index");
        let rows = vec![
            row("1", "Indeed, with hardship comes ease.", vec![1.0, 0.0, 0.0]),
            row("2", "Establish prayer and give zakat.", vec![0.0, 1.0, 0.0]),
            row("3", "Fasting has been prescribed for you.", vec![0.0, 0.0, 1.0]),
        ];

        let count = LanceDbStore::replace(&db, "quran", 3, &rows).await.unwrap();
        assert_eq!(count, 3);

        let store = LanceDbStore::open(&db, "quran", 3).await.unwrap();
        let results = store.search(&[0.1, 0.9, 0.0], 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].text, "Establish prayer and give zakat.");
        assert!(results[0].score >= results[1].score);
    }

    #[tokio::test]
    async fn test_replace_overwrites_existing_rows() {
        let temp_dir = TempDir::new().unwrap();
        let db = temp_dir.path().join("index");

        LanceDbStore::replace(&db, "hadith", 2, &[row("a", "old", vec![1.0, 0.0]), row("b", "old", vec![0.0, 1.0])])
            .await
            .unwrap();
        let count = LanceDbStore::replace(&db, "hadith", 2, &[row("c", "new", vec![1.0, 1.0])])
            .await
            .unwrap();
        assert_eq!(count, 1);

        // Different dimension against the same table is refused
        let result = LanceDbStore::replace(&db, "hadith", 3, &[row("d", "x", vec![1.0, 1.0, 1.0])]).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_search_rejects_wrong_dimension() {
        let temp_dir = TempDir::new().unwrap();
        let db = temp_dir.path().join("index");
        LanceDbStore::replace(&db, "quran", 2, &[row("1", "x", vec![1.0, 0.0])])
            .await
            .unwrap();

        let store = LanceDbStore::open(&db, "quran", 2).await.unwrap();
        assert!(store.search(&[1.0, 0.0, 0.0], 5).await.is_err());
    }

    #[test]
    fn test_rows_to_batch_checks_dimension() {
        let schema = create_schema(2);
        assert!(rows_to_batch(&schema, 2, &[row("1", "x", vec![1.0])]).is_err());
        let batch = rows_to_batch(&schema, 2, &[row("1", "x", vec![1.0, 0.0])]).unwrap();
        assert_eq!(batch.num_rows(), 1);
    }
}
