pub mod domain;
pub mod http;
pub mod ingress_gateway;

pub use domain::DispatchService;
pub use http::{HttpServerConfig, run_http_server};
pub use ingress_gateway::IngressGateway;
