//! 預測列模型

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ProductId;

/// 預測列：某成品在某月份的歷史銷量與使用者預測量
///
/// 在計劃內以 (product_id, month) 唯一。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastLine {
    /// 成品ID
    pub product_id: ProductId,

    /// 月份錨點（該月 1 日）
    pub month: NaiveDate,

    /// 歷史銷量（去年同月的已完成出貨量，進入預測階段時計算一次，唯讀）
    pub historic_qty: Decimal,

    /// 預測量（使用者輸入，預設 0）
    pub forecast_qty: Decimal,
}

impl ForecastLine {
    /// 創建新的預測列（預測量預設 0）
    pub fn new(product_id: ProductId, month: NaiveDate, historic_qty: Decimal) -> Self {
        Self {
            product_id,
            month,
            historic_qty,
            forecast_qty: Decimal::ZERO,
        }
    }

    /// 建構器模式：設置預測量
    pub fn with_forecast_qty(mut self, qty: Decimal) -> Self {
        self.forecast_qty = qty;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_forecast_line() {
        let line = ForecastLine::new(
            "BIKE-001".to_string(),
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            Decimal::from(120),
        );

        assert_eq!(line.historic_qty, Decimal::from(120));
        assert_eq!(line.forecast_qty, Decimal::ZERO);
    }

    #[test]
    fn test_forecast_line_builder() {
        let line = ForecastLine::new(
            "BIKE-001".to_string(),
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            Decimal::ZERO,
        )
        .with_forecast_qty(Decimal::from(80));

        assert_eq!(line.forecast_qty, Decimal::from(80));
    }
}
