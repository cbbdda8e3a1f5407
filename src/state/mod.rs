pub mod app;
pub mod repository;

pub use app::AppState;
pub use repository::{Repository, RepositoryPhase, UpdateOutcome};
