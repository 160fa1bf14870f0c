pub mod error_shape;
pub mod healthcheck;
pub mod human_decision;
pub mod session_stream;
