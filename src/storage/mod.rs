//! 存储层模块
//!
//! 提供分析结果的持久化，支持 Supabase 与 SurrealDB。

pub mod factory;
pub mod store;
pub mod supabase;

#[cfg(feature = "surrealdb")]
pub mod surrealdb;

pub use factory::StorageFactory;
pub use store::{PhysiqueStore, UserRecord};
