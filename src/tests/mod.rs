pub mod common;

pub mod request_interceptor;
