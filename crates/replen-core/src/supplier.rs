//! 供應商選項模型

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::SupplierId;

/// 供應商選項：某元件的一個候選供應來源
///
/// 選項集在元件需求建立時從供應商清單產生；使用者只能在
/// 這個預先計算的集合內選擇供應商。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierOption {
    /// 供應商ID
    pub supplier_id: SupplierId,

    /// 單價
    pub unit_price: Decimal,

    /// 交期（天）
    pub lead_time_days: u32,

    /// 是否被選中（每個元件需求至多一個）
    pub selected: bool,

    /// 總價 = 單價 × 供應量（供應量或單價變更時重算，不可過期）
    pub total_price: Decimal,
}

impl SupplierOption {
    /// 創建新的供應商選項
    pub fn new(supplier_id: SupplierId, unit_price: Decimal, lead_time_days: u32) -> Self {
        Self {
            supplier_id,
            unit_price,
            lead_time_days,
            selected: false,
            total_price: Decimal::ZERO,
        }
    }

    /// 重算總價
    pub fn recompute_total(&mut self, quantity_to_supply: Decimal) {
        self.total_price = self.unit_price * quantity_to_supply;
    }

    /// 預計到貨日 = 今天 + 交期
    pub fn expected_date(&self, today: NaiveDate) -> NaiveDate {
        today + Duration::days(self.lead_time_days as i64)
    }

    /// 檢查依此選項下單是否會遲於期間結束日
    pub fn is_late(&self, today: NaiveDate, period_end: NaiveDate) -> bool {
        self.expected_date(today) > period_end
    }
}
