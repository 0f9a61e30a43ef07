//! Physique - 体态图像分析服务
//!
//! 接收上传或远程引用的人体照片，推理姿态关键点，推导身体指标与
//! 体态反馈，并按用户写入存储。

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod observability;
pub mod security;
pub mod services;
pub mod storage;
