use axum::{
    routing::{get, post},
    Router,
};
use dispatch::Dispatcher;
use tower_http::trace::TraceLayer;

mod clients;
mod handlers;
mod state;

pub use clients::{Continuation, LogSnag, Mailer};
pub(crate) use state::AppState;
pub use state::ApiSecret;

/// Setup the routes
pub fn router(dispatcher: Dispatcher, secret: ApiSecret) -> Router {
    let state = AppState::new(dispatcher, secret);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/remind", post(handlers::remind))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
