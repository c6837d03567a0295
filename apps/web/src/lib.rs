//! # sellerbox-web: Actions and HTTP Server
//!
//! The request-facing layer of SellerBox: actions that validate forms and
//! drive the repositories, and the axum server that exposes them.
//!
//! ## Module Organization
//! ```text
//! src/
//! ├── lib.rs          ◄─── You are here
//! ├── main.rs         ◄─── Server binary
//! ├── actions/        ◄─── add_book, update_sale, ... (ActionState results)
//! ├── routes.rs       ◄─── axum router, form extractor, SSE
//! ├── revalidate.rs   ◄─── Stale-view broadcast
//! ├── state.rs        ◄─── AppState (injected repositories)
//! ├── dto.rs          ◄─── Read shapes (BookDto, SaleDto)
//! ├── config.rs       ◄─── TOML + environment configuration
//! └── error.rs        ◄─── API error type for read endpoints
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! use sellerbox_web::{actions, AppState};
//!
//! let state = AppState::in_memory(1);
//! let result = actions::add_book(&state, &form).await;
//! assert_eq!(result.message, MessageCode::BookAdded);
//! ```

pub mod actions;
pub mod config;
pub mod dto;
pub mod error;
pub mod revalidate;
pub mod routes;
pub mod state;

pub use config::{ConfigError, StorageBackend, WebConfig};
pub use error::{ApiError, ErrorCode};
pub use revalidate::{Revalidator, View};
pub use state::AppState;

/// Builds the HTTP application over `state`.
pub fn build_app(state: AppState) -> axum::Router {
    routes::router(state)
}
