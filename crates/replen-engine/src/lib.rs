//! # Replen Engine
//!
//! 補貨計劃工作流引擎：計劃生命週期、驗證送單、追蹤事件

pub mod engine;
pub mod memory;
pub mod tracking;
pub mod workflow;

// Re-export 主要類型
pub use engine::{AdvanceOutcome, FinalizeSummary, PlanEngine};
pub use memory::{InMemoryMasterData, RecordingPurchaseService, SequenceNumbering};
