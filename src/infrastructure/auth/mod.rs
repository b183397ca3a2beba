pub mod middleware;
pub mod request_id;

pub use middleware::api_key_middleware;
pub use request_id::{make_request_span, request_id_middleware, RequestId};
