//! Per-user conversation state tracker.
//!
//! Step 0 means the quiz has not started (or was just completed); step N
//! in 1..=5 means the user owes the answer to question N. The map lives
//! behind a single mutex so concurrent webhook deliveries for the same
//! user cannot lose updates. State is process-local and gone on restart.

use std::collections::HashMap;

use tokio::sync::Mutex;
use tracing::debug;

use crate::quiz::script::QuizScript;

/// Fallback when the profile lookup yields no display name.
const NAME_FALLBACK: &str = "friend";

/// One part of a composed reply. Delivery is the caller's concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyPart {
    Text(String),
    Image { image_id: String },
}

/// The composed reply plus the step the user landed on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizReply {
    pub parts: Vec<ReplyPart>,
    pub step: usize,
}

/// Tracks each user's position in the quiz sequence.
pub struct QuizTracker {
    script: QuizScript,
    steps: Mutex<HashMap<String, usize>>,
}

impl QuizTracker {
    pub fn new(script: QuizScript) -> Self {
        Self {
            script,
            steps: Mutex::new(HashMap::new()),
        }
    }

    /// Current step for a user; unseen users are at 0.
    pub async fn step_of(&self, user_id: &str) -> usize {
        self.steps.lock().await.get(user_id).copied().unwrap_or(0)
    }

    /// Evaluate one inbound text message and compose the reply.
    ///
    /// A first-ever message (step 0) always starts the quiz with question
    /// 1, regardless of content. At step N, the matching answer advances
    /// to question N+1, or to the closing message (and back to step 0)
    /// after the final question. Any mismatch leaves the step unchanged
    /// and re-prompts with the fixed retry text.
    pub async fn advance(
        &self,
        user_id: &str,
        message_text: &str,
        display_name: Option<&str>,
    ) -> QuizReply {
        let mut steps = self.steps.lock().await;
        let step = steps.entry(user_id.to_string()).or_insert(0);

        if *step == 0 {
            *step = 1;
            debug!(user_id, "Quiz started");
            return QuizReply {
                parts: self.question_parts(1, None),
                step: 1,
            };
        }

        let Some(question) = self.script.question(*step) else {
            // Step out of range can only happen if the script shrank
            // underneath live state; treat it as a restart.
            *step = 1;
            return QuizReply {
                parts: self.question_parts(1, None),
                step: 1,
            };
        };

        if !question.matches(message_text) {
            return QuizReply {
                parts: vec![ReplyPart::Text(self.script.retry_text.clone())],
                step: *step,
            };
        }

        let ack = question
            .response_text
            .as_deref()
            .map(|t| fill_name(t, display_name));

        if *step == self.script.len() {
            *step = 0;
            let mut parts = Vec::new();
            if let Some(ack) = ack {
                parts.push(ReplyPart::Text(ack));
            }
            parts.push(ReplyPart::Text(self.script.closing_text.clone()));
            QuizReply { parts, step: 0 }
        } else {
            *step += 1;
            QuizReply {
                parts: self.question_parts(*step, ack),
                step: *step,
            }
        }
    }

    /// Compose the parts announcing question `step`: optional
    /// acknowledgement, then the question text, then its image.
    fn question_parts(&self, step: usize, ack: Option<String>) -> Vec<ReplyPart> {
        let mut parts = Vec::new();
        if let Some(ack) = ack {
            parts.push(ReplyPart::Text(ack));
        }
        if let Some(q) = self.script.question(step) {
            parts.push(ReplyPart::Text(q.question_text.clone()));
            parts.push(ReplyPart::Image {
                image_id: q.image_id.clone(),
            });
        }
        parts
    }
}

fn fill_name(template: &str, display_name: Option<&str>) -> String {
    template.replace("{name}", display_name.unwrap_or(NAME_FALLBACK))
}
