mod routes;
mod server;

pub use routes::router;
pub use server::{HttpServerConfig, run_http_server};
