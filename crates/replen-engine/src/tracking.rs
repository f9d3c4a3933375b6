//! 追蹤事件入口
//!
//! 追蹤單建立後不再隨計劃變動，改由下游採購系統的事件驅動：
//! 訂單確認、收貨、採購明細變更與刪除。每個事件都以採購明細
//! 參照定位追蹤明細，重算狀態後檢查追蹤單是否完成。

use chrono::NaiveDate;
use replen_core::{
    NumberingService, ProductCatalog, PurchaseLineRef, PurchaseRequestService, ReceiptEvent,
    ReplenError, Result, SalesHistory,
};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::engine::PlanEngine;

impl<C, S, P, N> PlanEngine<C, S, P, N>
where
    C: ProductCatalog,
    S: SalesHistory,
    P: PurchaseRequestService,
    N: NumberingService,
{
    /// 採購訂單確認事件
    ///
    /// 確認前明細維持 waiting，即使已過預計到貨日也不標記逾期。
    pub fn purchase_confirmed(
        &mut self,
        tracking_id: Uuid,
        purchase_line: &PurchaseLineRef,
    ) -> Result<()> {
        let today = self.today();
        let tracking = self.tracking_mut(tracking_id)?;
        let line = tracking
            .line_by_purchase_ref_mut(purchase_line)
            .ok_or_else(|| {
                ReplenError::Validation(format!("追蹤單中沒有採購明細 {}", purchase_line))
            })?;

        line.confirmed = true;
        line.recompute_state(today);
        tracking.check_completion();
        Ok(())
    }

    /// 收貨事件：累加收貨量並重算明細狀態
    pub fn apply_receipt(&mut self, tracking_id: Uuid, event: &ReceiptEvent) -> Result<()> {
        let today = self.today();
        let tracking = self.tracking_mut(tracking_id)?;
        let line = tracking
            .line_by_purchase_ref_mut(&event.purchase_line)
            .ok_or_else(|| {
                ReplenError::Validation(format!("追蹤單中沒有採購明細 {}", event.purchase_line))
            })?;

        line.quantity_received += event.quantity_received;
        line.recompute_state(today);

        tracing::debug!(
            "收貨 {} × {}: 已收 {} / 已訂 {}",
            line.product_id,
            event.quantity_received,
            line.quantity_received,
            line.quantity_ordered
        );
        tracking.check_completion();
        Ok(())
    }

    /// 採購明細變更事件：同步數量、金額與預計到貨日
    pub fn purchase_line_updated(
        &mut self,
        tracking_id: Uuid,
        purchase_line: &PurchaseLineRef,
        quantity: Decimal,
        unit_price: Decimal,
        planned_date: Option<NaiveDate>,
    ) -> Result<()> {
        let today = self.today();
        let tracking = self.tracking_mut(tracking_id)?;
        let line = tracking
            .line_by_purchase_ref_mut(purchase_line)
            .ok_or_else(|| {
                ReplenError::Validation(format!("追蹤單中沒有採購明細 {}", purchase_line))
            })?;

        line.quantity_ordered = quantity;
        line.total_price = quantity * unit_price;
        if let Some(date) = planned_date {
            line.expected_date = Some(date);
        }
        line.recompute_state(today);
        tracking.check_completion();
        Ok(())
    }

    /// 採購明細刪除事件
    ///
    /// 移除該參照；明細失去所有採購關聯時剔除（rejected，終態）。
    pub fn purchase_line_removed(
        &mut self,
        tracking_id: Uuid,
        purchase_line: &PurchaseLineRef,
    ) -> Result<()> {
        let today = self.today();
        let tracking = self.tracking_mut(tracking_id)?;
        let line = tracking
            .line_by_purchase_ref_mut(purchase_line)
            .ok_or_else(|| {
                ReplenError::Validation(format!("追蹤單中沒有採購明細 {}", purchase_line))
            })?;

        line.purchase_line_refs.retain(|r| r != purchase_line);
        if line.purchase_line_refs.is_empty() {
            line.reset();
        }
        line.recompute_state(today);
        tracking.check_completion();
        Ok(())
    }
}
