pub mod td;

pub use td::{Algorithm, EpisodeSummary, Evaluation, TdAgent, TdAgentConfig, TrainOptions};
