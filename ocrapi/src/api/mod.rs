pub mod dto;
mod extractors;
pub mod handlers;
mod openapi;
mod routes;
mod state;

pub use extractors::{ImageInput, OcrForm};
pub use openapi::ApiDoc;
pub use routes::create_router;
pub use state::AppState;
