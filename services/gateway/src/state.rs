use settlement::Ledger;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<Ledger>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            ledger: Arc::new(Ledger::new()),
        }
    }
}
