//! 供應商選項計算
//!
//! 元件需求建立時從目錄取得候選供應商並生成選項集；進入報告
//! 階段時刷新價格與交期，已存在的選擇盡量保留。

use replen_core::{ComponentRequirement, ProductCatalog, Result, SupplierOption};

/// 供應商選項計算器
pub struct SupplierSelector;

impl SupplierSelector {
    /// 為元件需求建立供應商選項集
    ///
    /// 恰好一個候選時自動選中；選項總價隨當前補貨量計算。
    pub fn attach_options<C: ProductCatalog + ?Sized>(
        catalog: &C,
        requirement: &mut ComponentRequirement,
    ) -> Result<()> {
        let infos = catalog.suppliers(&requirement.product_id)?;

        requirement.supplier_options = infos
            .into_iter()
            .map(|info| SupplierOption::new(info.supplier_id, info.unit_price, info.lead_time_days))
            .collect();

        if requirement.supplier_options.len() == 1 {
            requirement.supplier_options[0].selected = true;
        }
        requirement.recompute_option_totals();

        tracing::debug!(
            "元件 {} 供應商選項: {} 個",
            requirement.product_id,
            requirement.supplier_options.len()
        );
        Ok(())
    }

    /// 刷新選項集（重新讀取價目），保留仍然有效的既有選擇
    pub fn refresh_options<C: ProductCatalog + ?Sized>(
        catalog: &C,
        requirement: &mut ComponentRequirement,
    ) -> Result<()> {
        let previous = requirement.selected_option().map(|o| o.supplier_id.clone());

        Self::attach_options(catalog, requirement)?;

        if let Some(supplier_id) = previous {
            // 既有選擇已不在新選項集時靜默放棄，由驗證階段攔截
            let _ = requirement.select_supplier(&supplier_id);
        }
        Ok(())
    }
}
