use std::path::PathBuf;
use std::sync::Arc;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::{JwtConfig, JwtService};
use crate::core::Config;
use crate::db::DbService;

/// 服务器状态 - 持有所有服务的共享引用
///
/// 数据库连接在进程启动时打开一次，此后通过 axum state 注入到
/// 各处理函数与中间件；不存在模块级单例。
///
/// # 服务组件
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | db | Surreal<Db> | 嵌入式数据库 |
/// | jwt_service | Arc<JwtService> | JWT 认证服务 |
#[derive(Clone, Debug)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 嵌入式数据库 (SurrealDB)
    pub db: Surreal<Db>,
    /// JWT 认证服务 (Arc 共享所有权)
    pub jwt_service: Arc<JwtService>,
}

impl ServerState {
    /// 创建服务器状态 (手动构造)
    ///
    /// 通常使用 [`ServerState::initialize`] 代替
    pub fn new(config: Config, db: Surreal<Db>, jwt_service: Arc<JwtService>) -> Self {
        Self {
            config,
            db,
            jwt_service,
        }
    }

    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录结构 (确保目录存在)
    /// 2. 数据库 (work_dir/database/storefront.db)
    /// 3. JWT 服务
    ///
    /// # Panics
    ///
    /// 数据库初始化失败时 panic
    pub async fn initialize(config: &Config) -> Self {
        // 0. Ensure work_dir structure exists
        config
            .ensure_work_dir_structure()
            .expect("Failed to create work directory structure");

        // 1. Initialize DB
        let db_path = config.database_dir().join("storefront.db");
        let db_path_str = db_path.to_string_lossy();

        let db_service = DbService::new(&db_path_str)
            .await
            .expect("Failed to initialize database");

        // 2. Initialize JWT service
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));

        Self::new(config.clone(), db_service.db, jwt_service)
    }

    /// 初始化仅用于测试的状态 (独立工作目录 + 固定密钥)
    pub async fn initialize_for_tests(work_dir: &std::path::Path) -> Self {
        let mut config = Config::with_overrides(work_dir.to_string_lossy(), 0);
        config.jwt = JwtConfig {
            secret: "integration-test-secret-key-0123456789".to_string(),
            expiration_minutes: 60,
            issuer: "storefront-server".to_string(),
            audience: "storefront-clients".to_string(),
        };
        Self::initialize(&config).await
    }

    /// 获取数据库实例
    pub fn get_db(&self) -> Surreal<Db> {
        self.db.clone()
    }

    /// 获取工作目录
    pub fn work_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.work_dir)
    }

    /// 获取 JWT 服务
    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }
}
