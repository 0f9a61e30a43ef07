//! Handlers 模块
//!
//! HTTP 请求处理程序。

pub mod analysis_handler;

pub use analysis_handler::*;
