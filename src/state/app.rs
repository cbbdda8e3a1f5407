use std::sync::Arc;

use crate::state::repository::Repository;

/// Application-wide state container.
/// All mutable state lives behind the repository and is passed explicitly to
/// every handler; there is no global progress state.
#[derive(Clone)]
pub struct AppState {
    repository: Arc<Repository>,
}

impl AppState {
    pub fn new(repository: Repository) -> Self {
        AppState {
            repository: Arc::new(repository),
        }
    }

    pub fn repository(&self) -> &Repository {
        &self.repository
    }
}
