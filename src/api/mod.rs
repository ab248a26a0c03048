//! HTTP request layer
//!
//! Translates HTTP requests into [`LedgerService`] calls and their results
//! into JSON responses. Routes:
//!
//! | Method | Path | Operation |
//! |---|---|---|
//! | POST | `/wallet` | create wallet |
//! | GET | `/wallet/{wallet_id}` | get wallet |
//! | GET | `/wallet/{wallet_id}/transactions` | list transactions, newest first |
//! | POST | `/transaction` | credit or debit |
//! | DELETE | `/transaction/{tran_id}` | revert |
//! | GET | `/health` | health check |

pub mod error;
pub mod routes;

use crate::core::{LedgerService, LedgerStore};
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub use error::ErrorBody;

/// Application state shared across handlers
pub struct AppState<S: LedgerStore> {
    /// Ledger operations
    pub ledger: Arc<LedgerService<S>>,
}

impl<S: LedgerStore> AppState<S> {
    /// Wrap a service for use as router state
    pub fn new(ledger: LedgerService<S>) -> Self {
        Self {
            ledger: Arc::new(ledger),
        }
    }
}

impl<S: LedgerStore> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            ledger: Arc::clone(&self.ledger),
        }
    }
}

/// Creates the application router
pub fn create_router<S: LedgerStore>(state: AppState<S>) -> Router {
    routes::routes()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
