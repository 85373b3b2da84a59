pub mod errors;
pub mod handlers;
pub mod routes;
pub mod state;

pub use errors::ApiError;
pub use routes::create_api_routes;
pub use state::AppState;
