pub mod difficulty;

pub use difficulty::DifficultyStateMachine;
