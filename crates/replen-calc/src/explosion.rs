//! BOM 展開
//!
//! 遞迴展開多層 BOM，把所有成品、所有月份的預測量聚合成
//! 各葉元件的總需求。累加器顯式傳遞，深度上限獨立於執行
//! 環境的遞迴限制。

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use replen_core::{ForecastLine, ProductCatalog, ProductId, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::CalcWarning;

/// BOM 遞迴深度上限；超過視為循環或異常圖，該分支截斷展開
pub const MAX_BOM_DEPTH: usize = 10;

/// 累加器條目：一個葉元件的聚合需求與庫存快照
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentDemand {
    /// 元件ID
    pub product_id: ProductId,

    /// 聚合需求量
    pub quantity: Decimal,

    /// 現有庫存快照（首次遇到時讀取一次）
    pub current_stock: Decimal,

    /// 安全庫存快照
    pub safety_stock: Decimal,
}

/// 展開結果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplosionResult {
    /// 各葉元件聚合需求（依元件ID排序，保證確定性）
    pub components: Vec<ComponentDemand>,

    /// 警告（深度截斷等）
    pub warnings: Vec<CalcWarning>,
}

/// BOM 展開器
pub struct BomExploder<'a, C: ProductCatalog + ?Sized> {
    catalog: &'a C,
}

impl<'a, C: ProductCatalog + ?Sized> BomExploder<'a, C> {
    /// 創建新的展開器
    pub fn new(catalog: &'a C) -> Self {
        Self { catalog }
    }

    /// 展開全部預測列，聚合到單一累加器
    ///
    /// 同一元件經由不同成品或不同層級出現時只會有一個條目。
    /// 非正的預測量不產生需求。
    pub fn explode_forecasts(&self, lines: &[ForecastLine]) -> Result<ExplosionResult> {
        let mut accumulator: BTreeMap<ProductId, ComponentDemand> = BTreeMap::new();
        let mut warnings = Vec::new();

        for line in lines {
            if line.forecast_qty <= Decimal::ZERO {
                continue;
            }
            self.explode(
                &line.product_id,
                line.forecast_qty,
                0,
                &mut accumulator,
                &mut warnings,
            )?;
        }

        tracing::debug!(
            "BOM 展開完成: {} 條預測列 → {} 個葉元件",
            lines.len(),
            accumulator.len()
        );

        Ok(ExplosionResult {
            components: accumulator.into_values().collect(),
            warnings,
        })
    }

    /// 遞迴展開單一產品
    fn explode(
        &self,
        product_id: &str,
        quantity: Decimal,
        depth: usize,
        accumulator: &mut BTreeMap<ProductId, ComponentDemand>,
        warnings: &mut Vec<CalcWarning>,
    ) -> Result<()> {
        if depth >= MAX_BOM_DEPTH {
            tracing::warn!("BOM 深度達上限 {}，截斷 {} 的展開", MAX_BOM_DEPTH, product_id);
            warnings.push(CalcWarning::warning(
                product_id.to_string(),
                format!("BOM 深度達上限 {}，此分支已截斷", MAX_BOM_DEPTH),
            ));
            return Ok(());
        }

        // 無 BOM 的產品不貢獻任何元件需求
        let bom = match self.catalog.bom(product_id)? {
            Some(bom) if !bom.lines.is_empty() => bom,
            _ => return Ok(()),
        };

        for bom_line in &bom.lines {
            let needed = bom_line.quantity * quantity;

            // 子件本身有有效 BOM → 視為半成品，繼續展開
            let is_subassembly = self
                .catalog
                .bom(&bom_line.component_id)?
                .map_or(false, |b| !b.lines.is_empty());

            if is_subassembly {
                self.explode(
                    &bom_line.component_id,
                    needed,
                    depth + 1,
                    accumulator,
                    warnings,
                )?;
            } else {
                self.add_leaf(&bom_line.component_id, needed, accumulator)?;
            }
        }

        Ok(())
    }

    /// 累加葉元件需求；庫存快照只在首次遇到時讀取
    fn add_leaf(
        &self,
        component_id: &str,
        needed: Decimal,
        accumulator: &mut BTreeMap<ProductId, ComponentDemand>,
    ) -> Result<()> {
        match accumulator.entry(component_id.to_string()) {
            Entry::Occupied(mut entry) => {
                entry.get_mut().quantity += needed;
            }
            Entry::Vacant(entry) => {
                let current_stock = self.catalog.current_stock(component_id)?;
                let safety_stock = self.catalog.safety_stock(component_id)?;
                entry.insert(ComponentDemand {
                    product_id: component_id.to_string(),
                    quantity: needed,
                    current_stock,
                    safety_stock,
                });
            }
        }
        Ok(())
    }
}
