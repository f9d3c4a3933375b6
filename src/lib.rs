//! # Replen
//!
//! 預測驅動的補貨計劃引擎
//!
//! 從月度銷售預測出發，經 BOM 展開與庫存淨算得到元件補貨需求，
//! 選擇供應商後整批送出採購請求，並以追蹤單跟進交付進度。
//!
//! - [`replen_core`]：期間、計劃、預測、需求與追蹤的資料模型
//! - [`replen_calc`]：BOM 展開、淨需求與供應商選項的計算管線
//! - [`replen_engine`]：工作流引擎與外部協作介面

pub use replen_calc as calc;
pub use replen_core as core;
pub use replen_engine as engine;

pub use replen_core::{
    Period, Plan, PlanState, Quarter, ReplenError, Result, Semester, StockUrgency,
    TrackingLineState, TrackingRecord, TrackingState,
};
pub use replen_engine::{AdvanceOutcome, FinalizeSummary, PlanEngine};
