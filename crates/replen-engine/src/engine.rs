//! 補貨計劃引擎
//!
//! 持有計劃與追蹤單的集合，驅動工作流前進/回退，並在驗證時
//! 整批送出採購請求。外部協作（主資料、銷售歷史、採購、單號）
//! 一律透過注入的服務介面。

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, NaiveDate};
use replen_calc::{BomExploder, CalcWarning, RequirementCalculator, SupplierSelector};
use replen_core::{
    NumberingService, Period, Plan, PlanState, ProductCatalog, ProductId, PurchaseRequest,
    PurchaseRequestLine, PurchaseRequestService, ReplenError, ResolvedPeriod, Result, SalesHistory,
    SupplierId, TrackingLine, TrackingRecord,
};
use rust_decimal::Decimal;
use uuid::Uuid;

/// 前進動作的結果
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub enum AdvanceOutcome {
    /// 已前進到新狀態
    Advanced {
        state: PlanState,
        warnings: Vec<CalcWarning>,
    },
    /// 需要使用者確認後以強制模式重試（狀態未變）
    ConfirmationRequired { message: String },
}

/// 驗證結果摘要
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct FinalizeSummary {
    /// 送出的採購請求張數（每供應商一張）
    pub request_count: usize,

    /// 新建追蹤單的ID
    pub tracking_id: Uuid,
}

/// 補貨計劃引擎
pub struct PlanEngine<C, S, P, N>
where
    C: ProductCatalog,
    S: SalesHistory,
    P: PurchaseRequestService,
    N: NumberingService,
{
    catalog: C,
    sales: S,
    purchasing: P,
    numbering: N,
    plans: HashMap<Uuid, Plan>,
    trackings: HashMap<Uuid, TrackingRecord>,
    today: NaiveDate,
}

impl<C, S, P, N> PlanEngine<C, S, P, N>
where
    C: ProductCatalog,
    S: SalesHistory,
    P: PurchaseRequestService,
    N: NumberingService,
{
    /// 創建新的引擎
    pub fn new(catalog: C, sales: S, purchasing: P, numbering: N) -> Self {
        Self {
            catalog,
            sales,
            purchasing,
            numbering,
            plans: HashMap::new(),
            trackings: HashMap::new(),
            today: chrono::Local::now().date_naive(),
        }
    }

    /// 建構器模式：固定「今天」（期間解析與逾期判斷的基準日）
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// 採購服務（供檢視已送出的請求）
    pub fn purchasing(&self) -> &P {
        &self.purchasing
    }

    /// 查詢計劃
    pub fn plan(&self, plan_id: Uuid) -> Result<&Plan> {
        self.plans
            .get(&plan_id)
            .ok_or(ReplenError::PlanNotFound(plan_id))
    }

    /// 查詢追蹤單
    pub fn tracking(&self, tracking_id: Uuid) -> Result<&TrackingRecord> {
        self.trackings
            .get(&tracking_id)
            .ok_or(ReplenError::TrackingNotFound(tracking_id))
    }

    /// 創建計劃（狀態 draft）
    ///
    /// 單號由編號服務發放；產品清單預設為目錄的全部合格成品，
    /// 可在草稿階段縮減。
    pub fn create_plan(&mut self, period: Period) -> Result<Uuid> {
        let resolved = period.resolve(self.today)?;
        let name = self.numbering.next_reference();
        let product_ids = self.catalog.eligible_products()?;

        let plan = Plan::new(name, resolved, product_ids);
        let plan_id = plan.id;

        tracing::info!(
            "創建計劃 {} 期間 {} ({} ~ {})",
            plan.name,
            plan.period_label,
            plan.date_start,
            plan.date_end
        );
        self.plans.insert(plan_id, plan);
        Ok(plan_id)
    }

    /// 變更期間（僅限 draft）
    ///
    /// 以今天重新解析起訖日期，並從目錄重新取得合格成品清單，
    /// 草稿階段對產品清單的縮減隨期間變更作廢。
    pub fn set_period(&mut self, plan_id: Uuid, period: Period) -> Result<()> {
        let resolved = period.resolve(self.today)?;
        let product_ids = self.catalog.eligible_products()?;
        let plan = self
            .plans
            .get_mut(&plan_id)
            .ok_or(ReplenError::PlanNotFound(plan_id))?;
        plan.set_period(resolved)?;
        plan.product_ids = product_ids;
        Ok(())
    }

    /// 變更產品清單（僅限 draft）
    pub fn set_products(&mut self, plan_id: Uuid, product_ids: Vec<ProductId>) -> Result<()> {
        let plan = self.plan_mut_in(plan_id, &[PlanState::Draft], "set_products")?;
        plan.product_ids = product_ids;
        Ok(())
    }

    /// 工作流前進一步
    ///
    /// 非正的預測量會要求確認而不前進；其餘前置條件不滿足時
    /// 回傳錯誤，狀態不變。
    pub fn advance(&mut self, plan_id: Uuid) -> Result<AdvanceOutcome> {
        self.advance_inner(plan_id, false)
    }

    /// 工作流前進一步（強制模式：跳過非正預測量的確認）
    pub fn advance_forced(&mut self, plan_id: Uuid) -> Result<AdvanceOutcome> {
        self.advance_inner(plan_id, true)
    }

    fn advance_inner(&mut self, plan_id: Uuid, force: bool) -> Result<AdvanceOutcome> {
        let Self {
            plans,
            catalog,
            sales,
            purchasing,
            trackings,
            today,
            ..
        } = self;
        let plan = plans
            .get_mut(&plan_id)
            .ok_or(ReplenError::PlanNotFound(plan_id))?;

        match plan.state {
            PlanState::Draft => {
                if plan.product_ids.is_empty() {
                    return Err(ReplenError::Validation(
                        "計劃必須至少包含一個產品".to_string(),
                    ));
                }
                Self::enter_forecast_stage(plan, sales, *today)?;
                Ok(AdvanceOutcome::Advanced {
                    state: plan.state,
                    warnings: Vec::new(),
                })
            }
            PlanState::Forecast => {
                if plan.forecast_lines.is_empty() {
                    return Err(ReplenError::Validation(
                        "沒有任何預測列，無法生成計劃".to_string(),
                    ));
                }
                if !force && plan.has_non_positive_forecast() {
                    return Ok(AdvanceOutcome::ConfirmationRequired {
                        message: "部分月份的預測量為零或負值，確定要生成計劃嗎？".to_string(),
                    });
                }
                let warnings = Self::enter_plan_stage(plan, catalog)?;
                Ok(AdvanceOutcome::Advanced {
                    state: plan.state,
                    warnings,
                })
            }
            PlanState::Plan => {
                // 進入報告前刷新價目，既有選擇盡量保留
                for requirement in &mut plan.components {
                    SupplierSelector::refresh_options(&*catalog, requirement)?;
                }
                plan.state = PlanState::Report;
                tracing::info!("計劃 {} 進入報告階段", plan.name);
                Ok(AdvanceOutcome::Advanced {
                    state: plan.state,
                    warnings: Vec::new(),
                })
            }
            PlanState::Report => {
                Self::finalize_plan(plan, purchasing, trackings, *today)?;
                Ok(AdvanceOutcome::Advanced {
                    state: plan.state,
                    warnings: Vec::new(),
                })
            }
            PlanState::Done => Err(ReplenError::IllegalTransition {
                state: plan.state.as_str().to_string(),
                action: "advance".to_string(),
            }),
        }
    }

    /// 工作流回退一步；下游資料保留，再次前進時整批重建
    pub fn go_back(&mut self, plan_id: Uuid) -> Result<PlanState> {
        let plan = self
            .plans
            .get_mut(&plan_id)
            .ok_or(ReplenError::PlanNotFound(plan_id))?;

        let target =
            crate::workflow::backward_target(plan.state).ok_or(ReplenError::IllegalTransition {
                state: plan.state.as_str().to_string(),
                action: "go_back".to_string(),
            })?;

        tracing::info!(
            "計劃 {} 回退: {} → {}",
            plan.name,
            plan.state.as_str(),
            target.as_str()
        );
        plan.state = target;
        Ok(target)
    }

    /// 編輯單一預測列（僅限預測階段）
    pub fn edit_forecast(
        &mut self,
        plan_id: Uuid,
        product_id: &str,
        month: NaiveDate,
        forecast_qty: Decimal,
    ) -> Result<()> {
        let plan = self.plan_mut_in(plan_id, &[PlanState::Forecast], "edit_forecast")?;
        let line = plan
            .forecast_line_mut(product_id, month)
            .ok_or_else(|| {
                ReplenError::Validation(format!("產品 {} 在 {} 沒有預測列", product_id, month))
            })?;
        line.forecast_qty = forecast_qty;
        Ok(())
    }

    /// 批次設置預測量（僅限預測階段）
    ///
    /// product_ids 為空時套用到全部預測列，否則只套用到指定產品。
    pub fn edit_forecast_bulk(
        &mut self,
        plan_id: Uuid,
        product_ids: &[ProductId],
        forecast_qty: Decimal,
    ) -> Result<usize> {
        let plan = self.plan_mut_in(plan_id, &[PlanState::Forecast], "edit_forecast_bulk")?;
        let mut touched = 0;
        for line in &mut plan.forecast_lines {
            if product_ids.is_empty() || product_ids.contains(&line.product_id) {
                line.forecast_qty = forecast_qty;
                touched += 1;
            }
        }
        Ok(touched)
    }

    /// 調整元件補貨量（計劃或報告階段）
    pub fn edit_quantity_to_supply(
        &mut self,
        plan_id: Uuid,
        product_id: &str,
        quantity: Decimal,
    ) -> Result<()> {
        let plan = self.plan_mut_in(
            plan_id,
            &[PlanState::Plan, PlanState::Report],
            "edit_quantity_to_supply",
        )?;
        let requirement = plan.component_mut(product_id).ok_or_else(|| {
            ReplenError::Validation(format!("計劃中沒有元件 {}", product_id))
        })?;
        requirement.set_quantity_to_supply(quantity);
        Ok(())
    }

    /// 將元件補貨量重置為建議量（計劃或報告階段）
    pub fn reset_quantity_to_supply(&mut self, plan_id: Uuid, product_id: &str) -> Result<()> {
        let plan = self.plan_mut_in(
            plan_id,
            &[PlanState::Plan, PlanState::Report],
            "reset_quantity_to_supply",
        )?;
        let requirement = plan.component_mut(product_id).ok_or_else(|| {
            ReplenError::Validation(format!("計劃中沒有元件 {}", product_id))
        })?;
        requirement.reset_quantity_to_supply();
        Ok(())
    }

    /// 為元件選擇供應商（計劃或報告階段）
    pub fn select_supplier(
        &mut self,
        plan_id: Uuid,
        product_id: &str,
        supplier_id: &SupplierId,
    ) -> Result<()> {
        let plan = self.plan_mut_in(
            plan_id,
            &[PlanState::Plan, PlanState::Report],
            "select_supplier",
        )?;
        let requirement = plan.component_mut(product_id).ok_or_else(|| {
            ReplenError::Validation(format!("計劃中沒有元件 {}", product_id))
        })?;
        requirement.select_supplier(supplier_id)
    }

    /// 驗證計劃：整批送出採購請求並建立追蹤單（僅限報告階段）
    pub fn finalize(&mut self, plan_id: Uuid) -> Result<FinalizeSummary> {
        let Self {
            plans,
            purchasing,
            trackings,
            today,
            ..
        } = self;
        let plan = plans
            .get_mut(&plan_id)
            .ok_or(ReplenError::PlanNotFound(plan_id))?;

        if plan.state != PlanState::Report {
            return Err(ReplenError::IllegalTransition {
                state: plan.state.as_str().to_string(),
                action: "finalize".to_string(),
            });
        }
        Self::finalize_plan(plan, purchasing, trackings, *today)
    }

    /// 進入預測階段：整批重建預測列
    ///
    /// 每個 (產品, 期間月份) 一列；歷史量 = 去年同月的已完成出貨。
    fn enter_forecast_stage(plan: &mut Plan, sales: &S, today: NaiveDate) -> Result<()> {
        let resolved = ResolvedPeriod {
            period: plan.period,
            date_start: plan.date_start,
            date_end: plan.date_end,
        };
        let months = resolved.months_in_period(today);

        let mut lines = Vec::with_capacity(plan.product_ids.len() * months.len());
        for product_id in &plan.product_ids {
            for month in &months {
                let last_year = NaiveDate::from_ymd_opt(month.year() - 1, month.month(), 1)
                    .ok_or_else(|| {
                        ReplenError::InvalidDate(format!(
                            "{}-{:02}-01",
                            month.year() - 1,
                            month.month()
                        ))
                    })?;
                let historic_qty = sales.monthly_outbound(product_id, last_year)?;
                lines.push(replen_core::ForecastLine::new(
                    product_id.clone(),
                    *month,
                    historic_qty,
                ));
            }
        }

        plan.forecast_lines = lines;
        plan.state = PlanState::Forecast;
        tracing::info!(
            "計劃 {} 進入預測階段: {} 個產品 × {} 個月 = {} 條預測列",
            plan.name,
            plan.product_ids.len(),
            months.len(),
            plan.forecast_lines.len()
        );
        Ok(())
    }

    /// 進入計劃階段：BOM 展開 → 淨需求 → 供應商選項，整批重建元件需求
    fn enter_plan_stage(plan: &mut Plan, catalog: &C) -> Result<Vec<CalcWarning>> {
        let explosion = BomExploder::new(catalog).explode_forecasts(&plan.forecast_lines)?;
        for warning in &explosion.warnings {
            tracing::warn!("計劃 {} 展開警告 [{}]: {}", plan.name, warning.product_id, warning.message);
        }

        let mut requirements = RequirementCalculator::materialize(explosion.components);
        for requirement in &mut requirements {
            SupplierSelector::attach_options(catalog, requirement)?;
        }

        plan.components = requirements;
        plan.state = PlanState::Plan;
        tracing::info!(
            "計劃 {} 進入計劃階段: {} 個元件需求",
            plan.name,
            plan.components.len()
        );
        Ok(explosion.warnings)
    }

    /// 驗證：分組送出採購請求，成功後才改動計劃與建立追蹤單
    ///
    /// 只有補貨量為正的元件會下單；這些元件必須全部已選供應商。
    fn finalize_plan(
        plan: &mut Plan,
        purchasing: &mut P,
        trackings: &mut HashMap<Uuid, TrackingRecord>,
        today: NaiveDate,
    ) -> Result<FinalizeSummary> {
        let to_order: Vec<_> = plan
            .components
            .iter()
            .filter(|c| c.quantity_to_supply > Decimal::ZERO)
            .collect();

        if to_order.is_empty() {
            return Err(ReplenError::Validation(
                "沒有任何需補貨的元件，無法送出採購請求".to_string(),
            ));
        }

        let missing: Vec<_> = to_order
            .iter()
            .filter(|c| c.selected_option().is_none())
            .map(|c| c.product_id.as_str())
            .collect();
        if !missing.is_empty() {
            return Err(ReplenError::Validation(format!(
                "以下元件尚未選擇供應商: {}",
                missing.join(", ")
            )));
        }

        // 依供應商分組，每供應商一張請求（BTreeMap 保證順序確定）
        let mut grouped: BTreeMap<SupplierId, Vec<PurchaseRequestLine>> = BTreeMap::new();
        for requirement in &to_order {
            if let Some(option) = requirement.selected_option() {
                grouped
                    .entry(option.supplier_id.clone())
                    .or_default()
                    .push(PurchaseRequestLine {
                        product_id: requirement.product_id.clone(),
                        quantity: requirement.quantity_to_supply,
                        unit_price: option.unit_price,
                    });
            }
        }
        let requests: Vec<PurchaseRequest> = grouped
            .into_iter()
            .map(|(supplier_id, lines)| PurchaseRequest { supplier_id, lines })
            .collect();

        // 整批建立；失敗時計劃與追蹤完全不變
        let receipts = purchasing.create_requests(&requests)?;

        plan.validation_date = Some(today);
        let mut tracking =
            TrackingRecord::new(plan.name.clone(), plan.id, plan.period_label.clone(), today);
        for receipt in &receipts {
            for (product_id, line_ref) in &receipt.line_refs {
                let requirement = match plan.component(product_id) {
                    Some(r) => r,
                    None => continue,
                };
                let option = match requirement.selected_option() {
                    Some(o) => o,
                    None => continue,
                };
                tracking.lines.push(TrackingLine::new(
                    product_id.clone(),
                    receipt.supplier_id.clone(),
                    option.lead_time_days,
                    today,
                    requirement.quantity_to_supply,
                    option.total_price,
                    vec![line_ref.clone()],
                ));
            }
        }

        plan.state = PlanState::Done;
        let summary = FinalizeSummary {
            request_count: receipts.len(),
            tracking_id: tracking.id,
        };
        tracing::info!(
            "計劃 {} 驗證完成: {} 張採購請求, 追蹤單 {} ({} 條明細)",
            plan.name,
            summary.request_count,
            tracking.name,
            tracking.lines.len()
        );
        trackings.insert(tracking.id, tracking);
        Ok(summary)
    }

    /// 取得計劃（可變），並檢查當前狀態允許該動作
    fn plan_mut_in(
        &mut self,
        plan_id: Uuid,
        allowed: &[PlanState],
        action: &str,
    ) -> Result<&mut Plan> {
        let plan = self
            .plans
            .get_mut(&plan_id)
            .ok_or(ReplenError::PlanNotFound(plan_id))?;
        if !allowed.contains(&plan.state) {
            return Err(ReplenError::IllegalTransition {
                state: plan.state.as_str().to_string(),
                action: action.to_string(),
            });
        }
        Ok(plan)
    }

    pub(crate) fn tracking_mut(&mut self, tracking_id: Uuid) -> Result<&mut TrackingRecord> {
        self.trackings
            .get_mut(&tracking_id)
            .ok_or(ReplenError::TrackingNotFound(tracking_id))
    }

    pub(crate) fn today(&self) -> NaiveDate {
        self.today
    }
}
