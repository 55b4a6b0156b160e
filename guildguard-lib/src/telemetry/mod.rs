pub mod health;
pub mod metrics;
pub mod metrics_handler;
pub mod server;
pub mod tracing;

use http_body_util::combinators::BoxBody;
use hyper::body::Bytes;

pub type RespBody = BoxBody<Bytes, hyper::Error>;

pub use health::{health_check_response, not_found_response, stats_response};
pub use metrics::{init_metrics, Metrics};
pub use metrics_handler::handle_metrics;
pub use server::{serve_observability, start_observability_server};
pub use self::tracing::init_tracing;
