//! 補貨追蹤模型
//!
//! 追蹤單在計劃驗證（送出採購請求）時建立一次，之後由下游的
//! 採購確認與收貨事件驅動，不再隨計劃變動。

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ProductId, PurchaseLineRef, SupplierId};

/// 追蹤單狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackingState {
    /// 補貨進行中
    InProgress,
    /// 補貨完成（所有明細到達終態）
    Done,
}

/// 追蹤明細狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackingLineState {
    /// 等待（訂單未確認，或已確認但尚未收貨且未逾期）
    Waiting,
    /// 部分收貨
    Partial,
    /// 全數收貨
    Done,
    /// 逾期（已確認、未收貨且超過預計到貨日）
    Late,
    /// 已剔除（對應的採購明細全數被刪除/取消）
    Rejected,
}

impl TrackingLineState {
    /// 終態：done 或 rejected
    pub fn is_terminal(&self) -> bool {
        matches!(self, TrackingLineState::Done | TrackingLineState::Rejected)
    }
}

/// 追蹤單
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingRecord {
    /// 追蹤單ID
    pub id: Uuid,

    /// 單號（沿用計劃單號）
    pub name: String,

    /// 來源計劃ID
    pub plan_id: Uuid,

    /// 期間標籤（沿用計劃）
    pub period_label: String,

    /// 驗證日期（沿用計劃）
    pub validation_date: NaiveDate,

    /// 狀態
    pub state: TrackingState,

    /// 追蹤明細（每個元件×供應商組合一列）
    pub lines: Vec<TrackingLine>,
}

impl TrackingRecord {
    /// 創建新的追蹤單（狀態 in_progress）
    pub fn new(
        name: String,
        plan_id: Uuid,
        period_label: String,
        validation_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            plan_id,
            period_label,
            validation_date,
            state: TrackingState::InProgress,
            lines: Vec::new(),
        }
    }

    /// 總金額 = 各明細總價合計
    pub fn total_amount(&self) -> Decimal {
        self.lines.iter().map(|l| l.total_price).sum()
    }

    /// 完成百分比 = done 明細數 / 全部明細數 × 100
    pub fn progress_percentage(&self) -> Decimal {
        if self.lines.is_empty() {
            return Decimal::ZERO;
        }
        let done = self
            .lines
            .iter()
            .filter(|l| l.state == TrackingLineState::Done)
            .count();
        Decimal::from(done) * Decimal::from(100) / Decimal::from(self.lines.len())
    }

    /// 完成檢查：所有明細都在終態時轉為 done，否則回到 in_progress
    pub fn check_completion(&mut self) {
        let all_terminal = self.lines.iter().all(|l| l.state.is_terminal());
        self.state = if all_terminal && !self.lines.is_empty() {
            TrackingState::Done
        } else {
            TrackingState::InProgress
        };
    }

    /// 依採購明細參照查找追蹤明細（可變）
    pub fn line_by_purchase_ref_mut(
        &mut self,
        purchase_line: &PurchaseLineRef,
    ) -> Option<&mut TrackingLine> {
        self.lines
            .iter_mut()
            .find(|l| l.purchase_line_refs.contains(purchase_line))
    }
}

/// 追蹤明細：一個（元件, 供應商）組合的交付進度
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingLine {
    /// 元件ID
    pub product_id: ProductId,

    /// 供應商ID
    pub vendor_id: SupplierId,

    /// 交期（天）
    pub lead_time_days: u32,

    /// 預計到貨日 = 驗證日 + 交期
    pub expected_date: Option<NaiveDate>,

    /// 總價
    pub total_price: Decimal,

    /// 已下單數量
    pub quantity_ordered: Decimal,

    /// 已收貨數量
    pub quantity_received: Decimal,

    /// 採購單是否已確認
    pub confirmed: bool,

    /// 關聯的採購明細參照
    pub purchase_line_refs: Vec<PurchaseLineRef>,

    /// 狀態
    pub state: TrackingLineState,
}

impl TrackingLine {
    /// 創建新的追蹤明細（狀態 waiting，未確認）
    pub fn new(
        product_id: ProductId,
        vendor_id: SupplierId,
        lead_time_days: u32,
        validation_date: NaiveDate,
        quantity_ordered: Decimal,
        total_price: Decimal,
        purchase_line_refs: Vec<PurchaseLineRef>,
    ) -> Self {
        Self {
            product_id,
            vendor_id,
            lead_time_days,
            expected_date: Some(validation_date + Duration::days(lead_time_days as i64)),
            total_price,
            quantity_ordered,
            quantity_received: Decimal::ZERO,
            confirmed: false,
            purchase_line_refs,
            state: TrackingLineState::Waiting,
        }
    }

    /// 待收數量 = 已下單 - 已收貨
    ///
    /// 超收時為負值，刻意不截零以便帳面核對。
    pub fn quantity_pending(&self) -> Decimal {
        self.quantity_ordered - self.quantity_received
    }

    /// 重算明細狀態
    ///
    /// 規則（依序）：無關聯採購明細 → rejected；訂單未確認 → waiting；
    /// 已有收貨 → partial/done（與下單量比較）；未收貨且已過預計
    /// 到貨日 → late；其餘 → waiting。
    pub fn recompute_state(&mut self, today: NaiveDate) {
        self.state = if self.purchase_line_refs.is_empty() {
            TrackingLineState::Rejected
        } else if !self.confirmed {
            TrackingLineState::Waiting
        } else if self.quantity_received > Decimal::ZERO {
            if self.quantity_received < self.quantity_ordered {
                TrackingLineState::Partial
            } else {
                TrackingLineState::Done
            }
        } else {
            match self.expected_date {
                Some(expected) if expected < today => TrackingLineState::Late,
                _ => TrackingLineState::Waiting,
            }
        };
    }

    /// 剔除：清空採購關聯並歸零數量（採購明細全數刪除時）
    pub fn reset(&mut self) {
        self.purchase_line_refs.clear();
        self.quantity_ordered = Decimal::ZERO;
        self.quantity_received = Decimal::ZERO;
        self.total_price = Decimal::ZERO;
        self.lead_time_days = 0;
        self.expected_date = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn line() -> TrackingLine {
        TrackingLine::new(
            "PART-B".to_string(),
            "VENDOR-01".to_string(),
            7,
            d(2025, 3, 1),
            Decimal::from(100),
            Decimal::from(400),
            vec!["POL-1".to_string()],
        )
    }

    #[test]
    fn test_expected_date_from_validation_date() {
        let line = line();
        assert_eq!(line.expected_date, Some(d(2025, 3, 8)));
        assert_eq!(line.state, TrackingLineState::Waiting);
    }

    #[test]
    fn test_state_waits_until_confirmed() {
        let mut line = line();
        // 未確認：即使超過預計到貨日也維持 waiting
        line.recompute_state(d(2025, 4, 1));
        assert_eq!(line.state, TrackingLineState::Waiting);
    }

    #[test]
    fn test_state_late_when_overdue() {
        let mut line = line();
        line.confirmed = true;
        line.recompute_state(d(2025, 3, 9));
        assert_eq!(line.state, TrackingLineState::Late);
    }

    #[test]
    fn test_state_partial_then_done() {
        let mut line = line();
        line.confirmed = true;

        line.quantity_received = Decimal::from(40);
        line.recompute_state(d(2025, 3, 5));
        assert_eq!(line.state, TrackingLineState::Partial);
        assert_eq!(line.quantity_pending(), Decimal::from(60));

        line.quantity_received = Decimal::from(100);
        line.recompute_state(d(2025, 3, 5));
        assert_eq!(line.state, TrackingLineState::Done);
        assert_eq!(line.quantity_pending(), Decimal::ZERO);
    }

    #[test]
    fn test_over_receipt_keeps_negative_pending() {
        let mut line = line();
        line.confirmed = true;
        line.quantity_received = Decimal::from(110);
        line.recompute_state(d(2025, 3, 5));

        assert_eq!(line.state, TrackingLineState::Done);
        assert_eq!(line.quantity_pending(), Decimal::from(-10));
    }

    #[test]
    fn test_rejected_without_purchase_refs() {
        let mut line = line();
        line.reset();
        line.recompute_state(d(2025, 3, 5));
        assert_eq!(line.state, TrackingLineState::Rejected);
        assert!(line.state.is_terminal());
    }

    #[test]
    fn test_completion_and_progress() {
        let mut tracking = TrackingRecord::new(
            "PLAN-00001".to_string(),
            Uuid::new_v4(),
            "2025-Q2".to_string(),
            d(2025, 3, 1),
        );
        tracking.lines.push(line());
        tracking.lines.push(line());

        tracking.check_completion();
        assert_eq!(tracking.state, TrackingState::InProgress);
        assert_eq!(tracking.progress_percentage(), Decimal::ZERO);

        // 一列 done、一列 rejected → 全部終態，追蹤單完成
        tracking.lines[0].confirmed = true;
        tracking.lines[0].quantity_received = Decimal::from(100);
        tracking.lines[0].recompute_state(d(2025, 3, 5));
        tracking.lines[1].reset();
        tracking.lines[1].recompute_state(d(2025, 3, 5));

        tracking.check_completion();
        assert_eq!(tracking.state, TrackingState::Done);
        assert_eq!(tracking.progress_percentage(), Decimal::from(50));
    }
}
