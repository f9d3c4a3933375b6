//! # Replen Calculation Engine
//!
//! 預測 → 需求的核心計算管線：BOM 展開、淨需求、供應商選項

pub mod explosion;
pub mod netting;
pub mod supplier;

// Re-export 主要類型
pub use explosion::{BomExploder, ComponentDemand, ExplosionResult, MAX_BOM_DEPTH};
pub use netting::RequirementCalculator;
pub use supplier::SupplierSelector;

/// 計算過程警告（非致命，呼叫方可提示或忽略）
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CalcWarning {
    pub product_id: String,
    pub message: String,
    pub severity: WarningSeverity,
}

impl CalcWarning {
    pub fn new(product_id: String, message: String, severity: WarningSeverity) -> Self {
        Self {
            product_id,
            message,
            severity,
        }
    }

    pub fn info(product_id: String, message: String) -> Self {
        Self::new(product_id, message, WarningSeverity::Info)
    }

    pub fn warning(product_id: String, message: String) -> Self {
        Self::new(product_id, message, WarningSeverity::Warning)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum WarningSeverity {
    Info,
    Warning,
}
