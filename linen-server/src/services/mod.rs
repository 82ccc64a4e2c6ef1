//! 服务层 - 业务服务
//!
//! # 服务列表
//!
//! - [`StockService`] - 库存变动（事件账本 + 快照，事务原子）
//! - [`BookingImporter`] - 预约导入 / 分析 / 全量同步
//! - [`StockSheetService`] - 棚卸（实盘）シート同期
//! - [`SettingsService`] - 显式配置服务（注入同步适配器）
//! - [`projection`] - 预测 / 履历只读视图
//! - [`sheet`] - 外部表格抓取与解析
//! - [`webhook`] - 履历 Webhook 通知（post-commit, fire-and-forget）

pub mod importer;
pub mod projection;
pub mod settings;
pub mod sheet;
pub mod stock_service;
pub mod stock_sheet;
pub mod webhook;

pub use importer::BookingImporter;
pub use settings::SettingsService;
pub use stock_service::StockService;
pub use stock_sheet::StockSheetService;
pub use webhook::HistoryNotifier;
