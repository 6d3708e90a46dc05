pub mod config;
pub mod quiz;

pub use config::QuizConfig;
pub use quiz::service::{QuizOptions, QuizService};
