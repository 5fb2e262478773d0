//! Parsed query shapes, keyed by the fetch query text they came from.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::error::Error;
use super::query::{parse_query_shape, shape::QueryNode};

/// A shared cache of query shapes. Cloning shares the underlying map.
#[derive(Debug, Default, Clone)]
pub struct ShapeCache {
    shapes: Arc<RwLock<HashMap<String, Arc<QueryNode>>>>,
}

impl ShapeCache {
    pub fn new() -> Self {
        ShapeCache::default()
    }

    /// The shape of `text`, parsing it on first use. Failed parses are not cached.
    pub async fn get_or_parse(&self, text: &str) -> Result<Arc<QueryNode>, Error> {
        if let Some(shape) = self.shapes.read().await.get(text) {
            tracing::debug!("query shape cache hit");
            return Ok(Arc::clone(shape));
        }

        let shape = Arc::new(parse_query_shape(text)?);

        // another task may have parsed the same text while we were not holding the lock
        let mut shapes = self.shapes.write().await;
        let shape = Arc::clone(shapes.entry(text.to_string()).or_insert(shape));
        tracing::debug!(cached = shapes.len(), "query shape cache miss");
        Ok(shape)
    }

    pub async fn len(&self) -> usize {
        self.shapes.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.shapes.read().await.is_empty()
    }

    pub async fn clear(&self) {
        self.shapes.write().await.clear();
    }
}
