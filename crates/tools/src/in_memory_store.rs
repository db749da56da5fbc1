//! In-memory course store: useful for testing and small local corpora.
//!
//! Scores chunks by keyword overlap with the query instead of embeddings.
//! Distance is `1 - overlap`, so an exact keyword match sorts first.

use async_trait::async_trait;
use coursewise_core::error::StoreError;
use coursewise_core::store::{CourseHit, CourseStore, SearchFilter};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// One chunk of course text as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseChunk {
    pub course_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lesson_number: Option<u32>,
    pub content: String,
}

pub struct InMemoryCourseStore {
    chunks: Arc<RwLock<Vec<CourseChunk>>>,
    max_results: usize,
}

impl InMemoryCourseStore {
    pub fn new(max_results: usize) -> Self {
        Self {
            chunks: Arc::new(RwLock::new(Vec::new())),
            max_results: max_results.max(1),
        }
    }

    pub async fn add_chunk(&self, chunk: CourseChunk) {
        self.chunks.write().await.push(chunk);
    }

    pub async fn len(&self) -> usize {
        self.chunks.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.chunks.read().await.is_empty()
    }

    /// Build a store from a JSON array of chunks.
    pub fn from_json(json: &str, max_results: usize) -> Result<Self, StoreError> {
        let chunks: Vec<CourseChunk> = serde_json::from_str(json)
            .map_err(|e| StoreError::Unavailable(format!("invalid corpus: {e}")))?;
        Ok(Self {
            chunks: Arc::new(RwLock::new(chunks)),
            max_results: max_results.max(1),
        })
    }

    /// Load a JSON corpus file (see [`CourseChunk`] for the element shape).
    pub async fn load(path: &Path, max_results: usize) -> Result<Self, StoreError> {
        let json = tokio::fs::read_to_string(path).await.map_err(|e| {
            StoreError::Unavailable(format!("cannot read corpus {}: {e}", path.display()))
        })?;
        let store = Self::from_json(&json, max_results)?;
        info!(
            path = %path.display(),
            chunks = store.len().await,
            "Loaded course corpus"
        );
        Ok(store)
    }
}

fn keywords(text: &str) -> Vec<String> {
    let mut words: Vec<String> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() > 1)
        .map(str::to_lowercase)
        .collect();
    words.sort();
    words.dedup();
    words
}

fn matches_filter(chunk: &CourseChunk, filter: &SearchFilter) -> bool {
    let course_ok = filter.course_name.as_ref().is_none_or(|name| {
        chunk
            .course_title
            .to_lowercase()
            .contains(&name.to_lowercase())
    });
    let lesson_ok = filter
        .lesson_number
        .is_none_or(|lesson| chunk.lesson_number == Some(lesson));
    course_ok && lesson_ok
}

#[async_trait]
impl CourseStore for InMemoryCourseStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn search(
        &self,
        query: &str,
        filter: &SearchFilter,
    ) -> Result<Vec<CourseHit>, StoreError> {
        let terms = keywords(query);
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let chunks = self.chunks.read().await;
        let mut hits: Vec<CourseHit> = chunks
            .iter()
            .filter(|c| matches_filter(c, filter))
            .filter_map(|c| {
                let words = keywords(&c.content);
                let overlap = terms.iter().filter(|t| words.binary_search(t).is_ok()).count();
                if overlap == 0 {
                    return None;
                }
                Some(CourseHit {
                    content: c.content.clone(),
                    course_title: c.course_title.clone(),
                    lesson_number: c.lesson_number,
                    distance: 1.0 - overlap as f32 / terms.len() as f32,
                })
            })
            .collect();

        hits.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(self.max_results);
        Ok(hits)
    }

    async fn course_titles(&self) -> Result<Vec<String>, StoreError> {
        let chunks = self.chunks.read().await;
        let mut titles: Vec<String> = Vec::new();
        for chunk in chunks.iter() {
            if !titles.contains(&chunk.course_title) {
                titles.push(chunk.course_title.clone());
            }
        }
        Ok(titles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(course: &str, lesson: Option<u32>, content: &str) -> CourseChunk {
        CourseChunk {
            course_title: course.into(),
            lesson_number: lesson,
            content: content.into(),
        }
    }

    async fn sample_store(max_results: usize) -> InMemoryCourseStore {
        let store = InMemoryCourseStore::new(max_results);
        store
            .add_chunk(chunk("Python Basics", Some(1), "Variables store data in Python"))
            .await;
        store
            .add_chunk(chunk("Python Basics", Some(2), "Functions group Python statements"))
            .await;
        store
            .add_chunk(chunk("Advanced Python", Some(1), "Decorators wrap Python functions"))
            .await;
        store
            .add_chunk(chunk("Intro to MCP", None, "MCP connects models to tools"))
            .await;
        store
    }

    #[tokio::test]
    async fn ranks_by_keyword_overlap() {
        let store = sample_store(5).await;
        let hits = store
            .search("python functions", &SearchFilter::default())
            .await
            .unwrap();

        assert_eq!(hits.len(), 3);
        assert!(hits[0].content.contains("unctions"));
        assert!(hits[0].distance < hits[2].distance);
    }

    #[tokio::test]
    async fn unrelated_query_finds_nothing() {
        let store = sample_store(5).await;
        let hits = store.search("kubernetes", &SearchFilter::default()).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn course_filter_is_partial_and_case_insensitive() {
        let store = sample_store(5).await;
        let filter = SearchFilter {
            course_name: Some("advanced".into()),
            lesson_number: None,
        };
        let hits = store.search("python", &filter).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].course_title, "Advanced Python");
    }

    #[tokio::test]
    async fn lesson_filter_is_exact() {
        let store = sample_store(5).await;
        let filter = SearchFilter {
            course_name: Some("Python Basics".into()),
            lesson_number: Some(2),
        };
        let hits = store.search("python", &filter).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].lesson_number, Some(2));
    }

    #[tokio::test]
    async fn respects_max_results() {
        let store = sample_store(2).await;
        let hits = store.search("python", &SearchFilter::default()).await.unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn titles_are_unique_in_insertion_order() {
        let store = sample_store(5).await;
        let titles = store.course_titles().await.unwrap();
        assert_eq!(titles, vec!["Python Basics", "Advanced Python", "Intro to MCP"]);
    }

    #[tokio::test]
    async fn loads_corpus_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corpus.json");
        std::fs::write(
            &path,
            r#"[
                {"course_title": "Intro to MCP", "lesson_number": 0, "content": "MCP servers expose tools"},
                {"course_title": "Intro to MCP", "content": "Course overview"}
            ]"#,
        )
        .unwrap();

        let store = InMemoryCourseStore::load(&path, 5).await.unwrap();
        assert_eq!(store.len().await, 2);

        let hits = store.search("mcp tools", &SearchFilter::default()).await.unwrap();
        assert_eq!(hits[0].label(), "Intro to MCP - Lesson 0");
    }

    #[tokio::test]
    async fn malformed_corpus_is_unavailable() {
        let err = InMemoryCourseStore::from_json("{not json", 5).err().unwrap();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[tokio::test]
    async fn missing_corpus_file_is_unavailable() {
        let err = InMemoryCourseStore::load(Path::new("/nonexistent/corpus.json"), 5)
            .await
            .err()
            .unwrap();
        assert!(err.to_string().contains("cannot read corpus"));
    }
}
