//! Storefront Server - 电商后端服务
//!
//! # 架构概述
//!
//! 本模块是 Storefront Server 的主入口，提供以下核心功能：
//!
//! - **数据库** (`db`): 嵌入式 SurrealDB 存储
//! - **认证** (`auth`): JWT + Argon2 认证体系，含管理员角色
//! - **HTTP API** (`api`): 商品目录、用户和订单的 RESTful 接口
//!
//! # 模块结构
//!
//! ```text
//! server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── auth/          # JWT 认证、权限
//! ├── api/           # HTTP 路由和处理器
//! ├── middleware/    # 请求日志中间件
//! ├── utils/         # 错误类型、日志
//! └── db/            # 数据库层 (模型 + 仓储)
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod middleware;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// 设置运行环境 (dotenv, 工作目录, 日志)
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    // 加载 .env 文件 (不存在时忽略)
    let _ = dotenv::dotenv();

    let config = Config::from_env();
    config.ensure_work_dir_structure()?;

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = config.log_dir();
    init_logger_with_file(log_level.as_deref(), log_dir.to_str());

    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
   _____ __                  ____                 __
  / ___// /_____  ________  / __/________  ____  / /_
  \__ \/ __/ __ \/ ___/ _ \/ /_/ ___/ __ \/ __ \/ __/
 ___/ / /_/ /_/ / /  /  __/ __/ /  / /_/ / / / / /_
/____/\__/\____/_/   \___/_/ /_/   \____/_/ /_/\__/
    "#
    );
}
