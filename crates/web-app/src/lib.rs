#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

pub mod dto;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod router;
pub mod session_store;
pub mod state;

pub use router::create_router;
pub use state::AppState;
