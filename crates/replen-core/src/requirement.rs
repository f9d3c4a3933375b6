//! 元件需求模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{ProductId, ReplenError, Result, SupplierId, SupplierOption};

/// 庫存緊急度分類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockUrgency {
    /// 庫存充足（現有庫存 - 預測消耗 > 安全庫存）
    Available,
    /// 臨界（差值恰等於安全庫存）
    Warning,
    /// 緊急（差值低於安全庫存）
    Urgent,
}

/// 元件需求：BOM 展開後某葉元件的聚合需求與補貨量
///
/// 在計劃內以元件 product_id 唯一：同一元件經由不同成品、
/// 不同層級展開時必須聚合成單一記錄。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentRequirement {
    /// 元件ID
    pub product_id: ProductId,

    /// 預測消耗量（所有成品 × 所有月份展開後的聚合）
    pub forecast_consumption: Decimal,

    /// 現有庫存快照（首次展開到該元件時讀取一次）
    pub current_stock: Decimal,

    /// 安全庫存快照（來自再訂購規則的最小量，無則為 0）
    pub safety_stock: Decimal,

    /// 建議補貨量 = 消耗 - 現有庫存 + 安全庫存（保留負值以供檢視）
    pub suggested_qty: Decimal,

    /// 實際補貨量（預設為建議量，使用者可改，改後不被自動覆寫）
    pub quantity_to_supply: Decimal,

    /// 緊急度分類
    pub urgency: StockUrgency,

    /// 候選供應商選項
    pub supplier_options: Vec<SupplierOption>,
}

impl ComponentRequirement {
    /// 由展開結果創建元件需求，並計算建議量與緊急度
    pub fn new(
        product_id: ProductId,
        forecast_consumption: Decimal,
        current_stock: Decimal,
        safety_stock: Decimal,
    ) -> Self {
        let suggested_qty = Self::suggested(forecast_consumption, current_stock, safety_stock);
        Self {
            product_id,
            forecast_consumption,
            current_stock,
            safety_stock,
            suggested_qty,
            quantity_to_supply: suggested_qty,
            urgency: Self::classify(current_stock, forecast_consumption, safety_stock),
            supplier_options: Vec::new(),
        }
    }

    /// 建議補貨量 = 預測消耗 - 現有庫存 + 安全庫存
    ///
    /// 可為負值（表示無需補貨），不做截零。
    pub fn suggested(
        forecast_consumption: Decimal,
        current_stock: Decimal,
        safety_stock: Decimal,
    ) -> Decimal {
        forecast_consumption - current_stock + safety_stock
    }

    /// 緊急度分類：差值 = 現有庫存 - 預測消耗
    pub fn classify(
        current_stock: Decimal,
        forecast_consumption: Decimal,
        safety_stock: Decimal,
    ) -> StockUrgency {
        let difference = current_stock - forecast_consumption;
        if difference > safety_stock {
            StockUrgency::Available
        } else if difference == safety_stock {
            StockUrgency::Warning
        } else {
            StockUrgency::Urgent
        }
    }

    /// 設置補貨量並重算所有選項總價
    pub fn set_quantity_to_supply(&mut self, quantity: Decimal) {
        self.quantity_to_supply = quantity;
        self.recompute_option_totals();
    }

    /// 將補貨量重置為當前建議量
    pub fn reset_quantity_to_supply(&mut self) {
        self.set_quantity_to_supply(self.suggested_qty);
    }

    /// 重算所有供應商選項的總價（補貨量或價格變更時呼叫）
    pub fn recompute_option_totals(&mut self) {
        for option in &mut self.supplier_options {
            option.recompute_total(self.quantity_to_supply);
        }
    }

    /// 取得被選中的供應商選項
    pub fn selected_option(&self) -> Option<&SupplierOption> {
        self.supplier_options.iter().find(|o| o.selected)
    }

    /// 選擇供應商（僅限選項集內）
    pub fn select_supplier(&mut self, supplier_id: &SupplierId) -> Result<()> {
        if !self
            .supplier_options
            .iter()
            .any(|o| &o.supplier_id == supplier_id)
        {
            return Err(ReplenError::Validation(format!(
                "供應商 {} 不在元件 {} 的候選清單中",
                supplier_id, self.product_id
            )));
        }
        for option in &mut self.supplier_options {
            option.selected = &option.supplier_id == supplier_id;
        }
        Ok(())
    }

    /// 本元件的採購金額（取被選中選項的總價，未選擇為 0）
    pub fn amount(&self) -> Decimal {
        self.selected_option()
            .map(|o| o.total_price)
            .unwrap_or(Decimal::ZERO)
    }
}
