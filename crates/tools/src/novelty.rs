//! Topic novelty check: one cosine-similarity threshold against recent topics.
//!
//! The topic is embedded through the configured provider and compared with an
//! in-process history of the most recent topics. A topic is novel when its
//! best similarity stays below the threshold.

use crate::embedding::embed_one;
use async_trait::async_trait;
use scoutclaw_core::error::ToolError;
use scoutclaw_core::provider::Provider;
use scoutclaw_core::tool::{Tool, ToolArgs, ToolResult, required_str};
use scoutclaw_memory::cosine_similarity;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tracing::debug;

const MAX_HISTORY: usize = 100;
const MAX_SIMILAR: usize = 5;

struct TopicEntry {
    topic: String,
    embedding: Vec<f32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimilarTopic {
    pub topic: String,
    pub similarity: f64,
}

pub struct NoveltyCheckTool {
    provider: Arc<dyn Provider>,
    model: String,
    default_threshold: f64,
    history: Mutex<VecDeque<TopicEntry>>,
}

impl NoveltyCheckTool {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>, default_threshold: f64) -> Self {
        Self {
            provider,
            model: model.into(),
            default_threshold,
            history: Mutex::new(VecDeque::new()),
        }
    }

    /// Number of remembered topics.
    pub fn history_len(&self) -> usize {
        self.history.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    fn threshold(&self, args: &ToolArgs) -> Result<f64, ToolError> {
        let threshold = match args.get("threshold") {
            None | Some(serde_json::Value::Null) => self.default_threshold,
            Some(v) => v
                .as_f64()
                .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
                .ok_or_else(|| ToolError::InvalidArguments("'threshold' must be a number".into()))?,
        };
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ToolError::InvalidArguments(format!(
                "'threshold' must be within [0, 1], got {threshold}"
            )));
        }
        Ok(threshold)
    }

    /// Rank remembered topics by similarity to `embedding`, best first.
    fn rank(&self, embedding: &[f32]) -> Vec<SimilarTopic> {
        let history = self.history.lock().unwrap_or_else(|e| e.into_inner());
        let mut ranked: Vec<SimilarTopic> = history
            .iter()
            .map(|entry| SimilarTopic {
                topic: entry.topic.clone(),
                similarity: cosine_similarity(embedding, &entry.embedding),
            })
            .collect();
        ranked.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        ranked
    }

    fn remember(&self, topic: &str, embedding: Vec<f32>) {
        let mut history = self.history.lock().unwrap_or_else(|e| e.into_inner());
        history.push_back(TopicEntry {
            topic: topic.to_string(),
            embedding,
        });
        while history.len() > MAX_HISTORY {
            history.pop_front();
        }
    }
}

#[async_trait]
impl Tool for NoveltyCheckTool {
    fn name(&self) -> &str {
        "novelty_check"
    }

    fn description(&self) -> &str {
        "Check whether a topic is new compared to recently seen topics."
    }

    fn example_args(&self) -> serde_json::Value {
        serde_json::json!({"topic": "...", "threshold": self.default_threshold, "record": false})
    }

    async fn execute(&self, args: &ToolArgs) -> Result<ToolResult, ToolError> {
        let topic = required_str(args, "topic")?;
        let threshold = self.threshold(args)?;
        let record = args.get("record").and_then(|v| v.as_bool()).unwrap_or(false);

        // Nothing to compare against and nothing to store: skip the embedding call.
        if !record && self.history_len() == 0 {
            debug!(topic = %topic, "novelty_check on empty history");
            return Ok(ToolResult::success(serde_json::json!({
                "is_novel": true,
                "novelty_score": 1.0,
                "similar_topics": [],
            })));
        }

        let embedding = match embed_one(self.provider.as_ref(), &self.model, topic).await? {
            Ok(v) => v,
            Err(failure) => return Ok(failure),
        };

        let ranked = self.rank(&embedding);
        let max_similarity = ranked.first().map_or(0.0, |s| s.similarity);
        let is_novel = max_similarity < threshold;
        let similar: Vec<SimilarTopic> = ranked.into_iter().take(MAX_SIMILAR).collect();

        debug!(topic = %topic, max_similarity, is_novel, "novelty_check");

        if record {
            self.remember(topic, embedding);
        }

        Ok(ToolResult::success(serde_json::json!({
            "is_novel": is_novel,
            "novelty_score": (1.0 - max_similarity).clamp(0.0, 1.0),
            "similar_topics": similar,
        })))
    }
}
