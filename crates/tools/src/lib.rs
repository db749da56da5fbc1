//! Tool implementations for Coursewise.
//!
//! The assistant has one capability: searching course materials. The
//! search runs against any [`CourseStore`]; an in-memory store is included
//! for local corpora and tests.

pub mod course_search;
pub mod in_memory_store;

use coursewise_core::store::CourseStore;
use coursewise_core::tool::ToolRegistry;
use std::sync::Arc;

pub use course_search::CourseSearchTool;
pub use in_memory_store::{CourseChunk, InMemoryCourseStore};

/// Create the default tool registry backed by `store`.
pub fn default_registry(store: Arc<dyn CourseStore>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(CourseSearchTool::new(store)));
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_offers_course_search() {
        let registry = default_registry(Arc::new(InMemoryCourseStore::new(5)));
        assert_eq!(registry.names(), vec![course_search::TOOL_NAME]);
    }
}
