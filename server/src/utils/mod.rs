//! 工具模块 - 通用工具函数和类型
//!
//! # 内容
//!
//! - [`AppError`] - 应用错误类型
//! - [`AppResult`] - 处理函数结果别名
//! - 日志等工具

pub mod error;
pub mod logger;

pub use error::{AppError, AppResult, ErrorBody};
