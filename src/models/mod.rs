//! 核心数据模型模块
//!
//! 定义关键点集合、身体指标、AI 反馈以及快速评估结构。

pub mod assessment;
pub mod feedback;
pub mod landmark;
pub mod metrics;

pub use assessment::*;
pub use feedback::*;
pub use landmark::*;
pub use metrics::*;
