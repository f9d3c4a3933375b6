//! 補貨計劃聚合根

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    ComponentRequirement, ForecastLine, Period, ProductId, ReplenError, ResolvedPeriod, Result,
};

/// 計劃生命週期狀態（線性，支援明確的回退）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanState {
    /// 草稿：選擇期間與產品
    Draft,
    /// 預測：輸入各月預測量
    Forecast,
    /// 計劃：檢視元件需求與補貨量
    Plan,
    /// 報告：確認供應商
    Report,
    /// 已驗證：採購請求已送出
    Done,
}

impl PlanState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanState::Draft => "draft",
            PlanState::Forecast => "forecast",
            PlanState::Plan => "plan",
            PlanState::Report => "report",
            PlanState::Done => "done",
        }
    }

    /// done 之後計劃不可再編輯
    pub fn is_terminal(&self) -> bool {
        matches!(self, PlanState::Done)
    }
}

/// 補貨計劃
///
/// 擁有預測列與元件需求（隨計劃刪除）。追蹤單在驗證時建立，
/// 之後獨立於計劃演進。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    /// 計劃ID
    pub id: Uuid,

    /// 單號（由編號服務於創建時發放）
    pub name: String,

    /// 生命週期狀態
    pub state: PlanState,

    /// 期間選擇（state != draft 後不可變）
    pub period: Period,

    /// 期間起始日
    pub date_start: NaiveDate,

    /// 期間結束日
    pub date_end: NaiveDate,

    /// 期間標籤（"2025-Q2" 等）
    pub period_label: String,

    /// 納入計劃的成品
    pub product_ids: Vec<ProductId>,

    /// 預測列（進入預測階段時整批重建）
    pub forecast_lines: Vec<ForecastLine>,

    /// 元件需求（由預測生成計劃時整批重建）
    pub components: Vec<ComponentRequirement>,

    /// 驗證時間（送出採購請求的日期）
    pub validation_date: Option<NaiveDate>,
}

impl Plan {
    /// 創建新的計劃（狀態 draft）
    pub fn new(name: String, resolved: ResolvedPeriod, product_ids: Vec<ProductId>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            state: PlanState::Draft,
            period: resolved.period,
            date_start: resolved.date_start,
            date_end: resolved.date_end,
            period_label: resolved.label(),
            product_ids,
            forecast_lines: Vec::new(),
            components: Vec::new(),
            validation_date: None,
        }
    }

    /// 變更期間（僅限 draft；重新解析後的日期一併更新）
    pub fn set_period(&mut self, resolved: ResolvedPeriod) -> Result<()> {
        if self.state != PlanState::Draft {
            return Err(ReplenError::Validation(format!(
                "計劃 {} 已離開草稿狀態，期間不可變更",
                self.name
            )));
        }
        self.period = resolved.period;
        self.date_start = resolved.date_start;
        self.date_end = resolved.date_end;
        self.period_label = resolved.label();
        Ok(())
    }

    /// 計劃總金額 = 各元件被選中選項的總價合計
    pub fn total_amount(&self) -> Decimal {
        self.components.iter().map(|c| c.amount()).sum()
    }

    /// 查找預測列
    pub fn forecast_line_mut(
        &mut self,
        product_id: &str,
        month: NaiveDate,
    ) -> Option<&mut ForecastLine> {
        self.forecast_lines
            .iter_mut()
            .find(|l| l.product_id == product_id && l.month == month)
    }

    /// 查找元件需求
    pub fn component(&self, product_id: &str) -> Option<&ComponentRequirement> {
        self.components.iter().find(|c| c.product_id == product_id)
    }

    /// 查找元件需求（可變）
    pub fn component_mut(&mut self, product_id: &str) -> Option<&mut ComponentRequirement> {
        self.components
            .iter_mut()
            .find(|c| c.product_id == product_id)
    }

    /// 是否有任何非正的預測量（零或負值在生成計劃前需要確認）
    pub fn has_non_positive_forecast(&self) -> bool {
        self.forecast_lines
            .iter()
            .any(|l| l.forecast_qty <= Decimal::ZERO)
    }
}
