pub mod audio;
pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod http;
pub mod onnx;
pub mod repositories;
pub mod serverless;
