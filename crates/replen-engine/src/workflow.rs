//! 計劃工作流狀態機
//!
//! 轉換表為純函數；副作用（重建預測列、生成需求、送出採購）
//! 由引擎在對應的前進動作中執行。回退動作只切換狀態，絕不
//! 隱式刪除下游資料。

use replen_core::PlanState;

/// 前進目標：draft → forecast → plan → report → done
pub fn forward_target(state: PlanState) -> Option<PlanState> {
    match state {
        PlanState::Draft => Some(PlanState::Forecast),
        PlanState::Forecast => Some(PlanState::Plan),
        PlanState::Plan => Some(PlanState::Report),
        PlanState::Report => Some(PlanState::Done),
        PlanState::Done => None,
    }
}

/// 回退目標：forecast → draft、plan → forecast、report → plan
///
/// draft 無處可退；done 為終態，不允許回退。
pub fn backward_target(state: PlanState) -> Option<PlanState> {
    match state {
        PlanState::Draft => None,
        PlanState::Forecast => Some(PlanState::Draft),
        PlanState::Plan => Some(PlanState::Forecast),
        PlanState::Report => Some(PlanState::Plan),
        PlanState::Done => None,
    }
}
