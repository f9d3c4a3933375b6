//! 淨需求計算
//!
//! 把展開後的葉元件需求對現有庫存與安全庫存做單次淨算，
//! 產生元件需求記錄。

use replen_core::ComponentRequirement;

use crate::explosion::ComponentDemand;

/// 淨需求計算器
pub struct RequirementCalculator;

impl RequirementCalculator {
    /// 將展開結果物化為元件需求
    ///
    /// 建議量 = 預測消耗 - 現有庫存 + 安全庫存（保留負值）；
    /// 補貨量預設為建議量；緊急度同時分類。
    pub fn materialize(demands: Vec<ComponentDemand>) -> Vec<ComponentRequirement> {
        demands
            .into_iter()
            .map(|demand| {
                let requirement = ComponentRequirement::new(
                    demand.product_id,
                    demand.quantity,
                    demand.current_stock,
                    demand.safety_stock,
                );
                tracing::debug!(
                    "元件 {} 淨需求: 消耗 {} 庫存 {} 安全 {} → 建議 {}",
                    requirement.product_id,
                    requirement.forecast_consumption,
                    requirement.current_stock,
                    requirement.safety_stock,
                    requirement.suggested_qty
                );
                requirement
            })
            .collect()
    }
}
