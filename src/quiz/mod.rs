//! The quiz: the fixed question script and the per-user state tracker.

pub mod script;
pub mod tracker;

pub use script::{Question, QuizScript};
pub use tracker::{QuizReply, QuizTracker, ReplyPart};
