//! Course store trait: the interface to the semantic search backend.
//!
//! Embedding, chunking, and index persistence live outside this workspace.
//! The assistant only needs ranked chunks for a query, optionally narrowed
//! to one course or one lesson.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Optional narrowing of a course search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilter {
    /// Course title (or a fragment of it)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_name: Option<String>,

    /// Lesson number within the course
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lesson_number: Option<u32>,
}

/// One ranked chunk of course material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseHit {
    /// The chunk text
    pub content: String,

    /// Title of the course the chunk belongs to
    pub course_title: String,

    /// Lesson the chunk belongs to, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lesson_number: Option<u32>,

    /// Distance from the query (lower is closer)
    #[serde(default)]
    pub distance: f32,
}

impl CourseHit {
    /// Human-readable attribution, e.g. "Python Basics - Lesson 1".
    pub fn label(&self) -> String {
        match self.lesson_number {
            Some(lesson) => format!("{} - Lesson {}", self.course_title, lesson),
            None => self.course_title.clone(),
        }
    }
}

/// A searchable store of course chunks.
#[async_trait]
pub trait CourseStore: Send + Sync {
    /// Backend name (e.g., "in_memory", "chroma").
    fn name(&self) -> &str;

    /// Return the closest chunks for `query`, best first.
    async fn search(
        &self,
        query: &str,
        filter: &SearchFilter,
    ) -> std::result::Result<Vec<CourseHit>, StoreError>;

    /// Titles of every known course.
    async fn course_titles(&self) -> std::result::Result<Vec<String>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_includes_lesson_when_present() {
        let hit = CourseHit {
            content: "c".into(),
            course_title: "Course A".into(),
            lesson_number: Some(2),
            distance: 0.1,
        };
        assert_eq!(hit.label(), "Course A - Lesson 2");

        let hit = CourseHit {
            lesson_number: None,
            ..hit
        };
        assert_eq!(hit.label(), "Course A");
    }
}
