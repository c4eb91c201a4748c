pub mod dto;
pub mod error;
pub mod ingest;
pub mod openapi;
pub mod routes;
pub mod state;

pub use routes::build_router;
pub use state::AppState;
