//! # Replen Core
//!
//! 補貨計劃引擎的核心資料模型與類型定義

pub mod forecast;
pub mod period;
pub mod plan;
pub mod requirement;
pub mod services;
pub mod supplier;
pub mod tracking;

// Re-export 主要類型
pub use forecast::ForecastLine;
pub use period::{Period, Quarter, ResolvedPeriod, Semester};
pub use plan::{Plan, PlanState};
pub use requirement::{ComponentRequirement, StockUrgency};
pub use services::{
    Bom, BomLine, CreatedRequest, NumberingService, ProductCatalog, ProductId, PurchaseLineRef,
    PurchaseRequest, PurchaseRequestLine, PurchaseRequestService, ReceiptEvent, SalesHistory,
    SupplierId, SupplierInfo,
};
pub use supplier::SupplierOption;
pub use tracking::{TrackingLine, TrackingLineState, TrackingRecord, TrackingState};

/// 補貨引擎錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum ReplenError {
    /// 前置條件未滿足；僅阻擋觸發的動作，狀態不變
    #[error("驗證失敗: {0}")]
    Validation(String),

    /// 主資料或下游服務不可用；觸發的動作整體失敗，不提交部分狀態
    #[error("外部服務失敗: {0}")]
    ExternalService(String),

    #[error("無效的日期: {0}")]
    InvalidDate(String),

    #[error("找不到計劃: {0}")]
    PlanNotFound(uuid::Uuid),

    #[error("找不到追蹤單: {0}")]
    TrackingNotFound(uuid::Uuid),

    #[error("狀態 {state} 不允許動作 {action}")]
    IllegalTransition { state: String, action: String },

    #[error("其他錯誤: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ReplenError>;
