//! Declarative quiz script — the fixed, ordered question table.
//!
//! Defined once at process start and never mutated. The matching policy
//! is a per-question flag rather than a property of the step position.

/// One step of the quiz sequence.
#[derive(Debug, Clone)]
pub struct Question {
    pub question_text: String,
    pub expected_answer: String,
    /// Acknowledgement sent before the next question; `{name}` is replaced
    /// with the user's display name.
    pub response_text: Option<String>,
    /// Identifier used to build this question's image URLs.
    pub image_id: String,
    /// Accept any casing, but only if the message is purely alphabetic.
    /// When false, the message must equal the expected answer exactly.
    pub alpha_only_case_insensitive: bool,
}

impl Question {
    /// Whether `message` counts as the right answer for this question.
    pub fn matches(&self, message: &str) -> bool {
        if self.alpha_only_case_insensitive {
            !message.is_empty()
                && message.chars().all(|c| c.is_alphabetic())
                && message.to_lowercase() == self.expected_answer.to_lowercase()
        } else {
            message == self.expected_answer
        }
    }
}

/// The full quiz: questions in order plus the fixed closing and retry texts.
#[derive(Debug, Clone)]
pub struct QuizScript {
    pub questions: Vec<Question>,
    pub closing_text: String,
    pub retry_text: String,
}

impl QuizScript {
    /// Number of questions in the sequence.
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Look up a question by its 1-based step index.
    pub fn question(&self, step: usize) -> Option<&Question> {
        step.checked_sub(1).and_then(|i| self.questions.get(i))
    }

    /// The fixed five-question scavenger hunt served in production.
    pub fn standard() -> Self {
        let q = |question_text: &str,
                 expected_answer: &str,
                 response_text: Option<&str>,
                 image_id: &str,
                 alpha_only_case_insensitive: bool| Question {
            question_text: question_text.to_string(),
            expected_answer: expected_answer.to_string(),
            response_text: response_text.map(str::to_string),
            image_id: image_id.to_string(),
            alpha_only_case_insensitive,
        };

        Self {
            questions: vec![
                q(
                    "Welcome to the campus scavenger hunt! Question 1: how many \
                     stone pillars hold up the library entrance in this photo?",
                    "6",
                    Some("Good eye, {name}!"),
                    "image_1",
                    false,
                ),
                q(
                    "Question 2: what animal is hiding in this picture? (one word)",
                    "cat",
                    Some("Well spotted, {name}!"),
                    "image_2",
                    true,
                ),
                q(
                    "Question 3: what year is engraved on the fountain? (four digits)",
                    "1928",
                    Some("Correct!"),
                    "image_3",
                    false,
                ),
                q(
                    "Question 4: which flower fills the planter by the east gate? (one word)",
                    "rose",
                    Some("Impressive, {name}!"),
                    "image_4",
                    true,
                ),
                q(
                    "Question 5: how many windows face the courtyard in this shot?",
                    "12",
                    Some("Perfect score, {name}!"),
                    "image_5",
                    false,
                ),
            ],
            closing_text: "You've cleared every checkpoint. The code for the \
                           treasure chest is 8642 — go claim your prize!"
                .to_string(),
            retry_text: "Not quite — have another look and try again!".to_string(),
        }
    }
}
