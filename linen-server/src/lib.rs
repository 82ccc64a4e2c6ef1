//! Linen Keeper Server - 宿泊施設向けリネン在庫管理
//!
//! # 架构概述
//!
//! - **台账存储** (`db`): SQLite (WAL) 上的 item / snapshot / 事件账本
//! - **库存变动** (`services::stock_service`): 事务原子的 delta / 修正 / 批量
//! - **预约导入** (`services::importer`): CSV / 外部シート → 计划消费事件再生成
//! - **预测与履历** (`services::projection`): 只读视图 + 不足警报
//! - **外部同步** (`services::sheet` / `stock_sheet` / `webhook`)
//! - **HTTP API** (`api`): axum 路由
//!
//! # 模块结构
//!
//! ```text
//! linen-server/src/
//! ├── core/          # 配置、状态、服务器、后台任务
//! ├── services/      # 业务服务（变动、导入、投影、同步）
//! ├── api/           # HTTP 路由和处理器
//! ├── routes/        # 路由组装与中间件
//! ├── db/            # 数据库层（连接池、迁移、repository）
//! └── utils/         # 错误、响应、日志
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod routes;
pub mod services;
pub mod utils;

// Re-export 公共类型
pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResponse, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};
