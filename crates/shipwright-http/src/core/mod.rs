//! Pure transformations: request normalization and response classification.

mod request;
mod validation;

pub use request::{authorization_value, configure_request, dump_headers, dump_request, with_json_payload};
pub use validation::{is_json_content, is_json_path};
