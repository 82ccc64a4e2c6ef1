use std::sync::Arc;

use dashmap::DashMap;
use sqlx::SqlitePool;

use crate::core::{BackgroundTasks, Config};
use crate::db::DbService;
use crate::services::{
    BookingImporter, HistoryNotifier, SettingsService, StockService, webhook,
};

/// 库存视图资源键 — 快照 / 履历失效信号
pub const RESOURCE_STOCK: &str = "stock";
/// 预测视图资源键 — 预约导入 / 同步失效信号
pub const RESOURCE_FORECAST: &str = "forecast";

/// 资源版本管理器
///
/// 使用 DashMap 实现无锁并发的版本号管理。每种只读视图维护独立的版本号，
/// 变更提交后原子递增；客户端通过版本号判断缓存的 forecast/history 是否
/// 需要重新拉取（依赖失效信号，不保证与写入线性一致）。
#[derive(Debug)]
pub struct StockVersions {
    versions: DashMap<String, u64>,
}

impl StockVersions {
    pub fn new() -> Self {
        Self {
            versions: DashMap::new(),
        }
    }

    /// 递增指定资源的版本号并返回新值
    pub fn increment(&self, resource: &str) -> u64 {
        let mut entry = self.versions.entry(resource.to_string()).or_insert(0);
        *entry += 1;
        *entry
    }

    /// 获取指定资源的当前版本号（不存在返回 0）
    pub fn get(&self, resource: &str) -> u64 {
        self.versions.get(resource).map(|v| *v).unwrap_or(0)
    }
}

impl Default for StockVersions {
    fn default() -> Self {
        Self::new()
    }
}

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc/连接池浅拷贝，Clone 成本极低。
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// SQLite 连接池
    pub pool: SqlitePool,
    /// 只读视图版本管理器（依赖失效信号）
    pub versions: Arc<StockVersions>,
    /// 履历 Webhook 入队句柄
    pub notifier: HistoryNotifier,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// # Panics
    ///
    /// 数据库初始化失败时 panic
    pub async fn initialize(config: &Config) -> Self {
        let db = DbService::new(&config.database_path)
            .await
            .expect("Failed to initialize database");

        Self {
            config: config.clone(),
            pool: db.pool,
            versions: Arc::new(StockVersions::new()),
            notifier: HistoryNotifier::new(),
        }
    }

    /// 启动后台任务
    ///
    /// 必须在 `Server::run()` 开始服务之前调用。
    /// 启动的任务：履历 Webhook worker
    pub fn start_background_tasks(&self, tasks: &mut BackgroundTasks) {
        tasks.spawn(
            "history_webhook",
            webhook::run_worker(
                self.pool.clone(),
                self.settings_service(),
                self.notifier.clone(),
                tasks.shutdown_token(),
                self.config.request_timeout_ms,
            ),
        );
    }

    /// 库存变动服务
    pub fn stock_service(&self) -> StockService {
        StockService::new(
            self.pool.clone(),
            self.versions.clone(),
            self.notifier.clone(),
        )
    }

    /// 预约导入服务
    pub fn importer(&self) -> BookingImporter {
        BookingImporter::new(self.pool.clone(), self.versions.clone())
    }

    /// 设置服务
    pub fn settings_service(&self) -> SettingsService {
        SettingsService::new(self.pool.clone())
    }
}
