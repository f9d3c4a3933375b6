//! 協作服務的記憶體內實作
//!
//! 供測試與嵌入端使用：主資料表、記錄式採購服務、流水號。

use std::collections::BTreeMap;

use chrono::NaiveDate;
use replen_core::{
    Bom, BomLine, CreatedRequest, NumberingService, ProductCatalog, ProductId, PurchaseRequest,
    PurchaseRequestService, ReplenError, Result, SalesHistory, SupplierInfo,
};
use rust_decimal::Decimal;

/// 單一產品的主資料
#[derive(Debug, Clone, Default)]
struct ProductRecord {
    eligible: bool,
    bom: Option<Bom>,
    current_stock: Decimal,
    safety_stock: Decimal,
    suppliers: Vec<SupplierInfo>,
}

/// 記憶體內主資料表（產品目錄 + 銷售歷史）
#[derive(Debug, Clone, Default)]
pub struct InMemoryMasterData {
    products: BTreeMap<ProductId, ProductRecord>,
    sales: BTreeMap<(ProductId, NaiveDate), Decimal>,
}

impl InMemoryMasterData {
    pub fn new() -> Self {
        Self::default()
    }

    /// 建構器模式：登記合格成品
    pub fn with_eligible(mut self, product_id: &str) -> Self {
        self.products.entry(product_id.to_string()).or_default().eligible = true;
        self
    }

    /// 建構器模式：設置 BOM
    pub fn with_bom(mut self, product_id: &str, lines: Vec<(&str, Decimal)>) -> Self {
        self.products.entry(product_id.to_string()).or_default().bom = Some(Bom {
            product_id: product_id.to_string(),
            lines: lines
                .into_iter()
                .map(|(component_id, quantity)| BomLine {
                    component_id: component_id.to_string(),
                    quantity,
                })
                .collect(),
        });
        self
    }

    /// 建構器模式：設置庫存與安全庫存
    pub fn with_stock(mut self, product_id: &str, current: Decimal, safety: Decimal) -> Self {
        let record = self.products.entry(product_id.to_string()).or_default();
        record.current_stock = current;
        record.safety_stock = safety;
        self
    }

    /// 建構器模式：添加供應商價目
    pub fn with_supplier(
        mut self,
        product_id: &str,
        supplier_id: &str,
        unit_price: Decimal,
        lead_time_days: u32,
    ) -> Self {
        self.products
            .entry(product_id.to_string())
            .or_default()
            .suppliers
            .push(SupplierInfo {
                supplier_id: supplier_id.to_string(),
                unit_price,
                lead_time_days,
            });
        self
    }

    /// 建構器模式：登記某月的已完成出貨量
    pub fn with_sales(mut self, product_id: &str, month_start: NaiveDate, qty: Decimal) -> Self {
        self.sales
            .insert((product_id.to_string(), month_start), qty);
        self
    }
}

impl ProductCatalog for InMemoryMasterData {
    fn eligible_products(&self) -> Result<Vec<ProductId>> {
        Ok(self
            .products
            .iter()
            .filter(|(_, record)| record.eligible)
            .map(|(id, _)| id.clone())
            .collect())
    }

    fn bom(&self, product_id: &str) -> Result<Option<Bom>> {
        Ok(self.products.get(product_id).and_then(|r| r.bom.clone()))
    }

    fn current_stock(&self, product_id: &str) -> Result<Decimal> {
        Ok(self
            .products
            .get(product_id)
            .map(|r| r.current_stock)
            .unwrap_or(Decimal::ZERO))
    }

    fn safety_stock(&self, product_id: &str) -> Result<Decimal> {
        Ok(self
            .products
            .get(product_id)
            .map(|r| r.safety_stock)
            .unwrap_or(Decimal::ZERO))
    }

    fn suppliers(&self, product_id: &str) -> Result<Vec<SupplierInfo>> {
        Ok(self
            .products
            .get(product_id)
            .map(|r| r.suppliers.clone())
            .unwrap_or_default())
    }
}

impl SalesHistory for InMemoryMasterData {
    fn monthly_outbound(&self, product_id: &str, month_start: NaiveDate) -> Result<Decimal> {
        Ok(self
            .sales
            .get(&(product_id.to_string(), month_start))
            .copied()
            .unwrap_or(Decimal::ZERO))
    }
}

/// 記錄式採購服務：記住送入的請求，可注入失敗以測試原子性
#[derive(Debug, Default)]
pub struct RecordingPurchaseService {
    /// 已成功建立的 (請求單號, 請求) 記錄
    created: Vec<(String, PurchaseRequest)>,

    /// 請求數超過此值時整批失敗（模擬下游中途故障）
    fail_if_more_than: Option<usize>,

    next_ref: u32,
}

impl RecordingPurchaseService {
    pub fn new() -> Self {
        Self::default()
    }

    /// 建構器模式：注入失敗條件
    pub fn with_failure_if_more_than(mut self, max_requests: usize) -> Self {
        self.fail_if_more_than = Some(max_requests);
        self
    }

    /// 已建立的請求
    pub fn created(&self) -> &[(String, PurchaseRequest)] {
        &self.created
    }
}

impl PurchaseRequestService for RecordingPurchaseService {
    fn create_requests(&mut self, requests: &[PurchaseRequest]) -> Result<Vec<CreatedRequest>> {
        // 原子性：先整批檢查，任何失敗都不留下任何請求
        if let Some(max) = self.fail_if_more_than {
            if requests.len() > max {
                return Err(ReplenError::ExternalService(format!(
                    "採購服務拒絕批次：{} 張請求超過限制 {}",
                    requests.len(),
                    max
                )));
            }
        }

        let mut receipts = Vec::with_capacity(requests.len());
        for request in requests {
            self.next_ref += 1;
            let request_ref = format!("PR-{:04}", self.next_ref);

            let line_refs = request
                .lines
                .iter()
                .map(|line| {
                    (
                        line.product_id.clone(),
                        format!("{}/{}", request_ref, line.product_id),
                    )
                })
                .collect();

            receipts.push(CreatedRequest {
                request_ref: request_ref.clone(),
                supplier_id: request.supplier_id.clone(),
                line_refs,
            });
            self.created.push((request_ref, request.clone()));
        }
        Ok(receipts)
    }
}

/// 流水號服務
#[derive(Debug, Clone)]
pub struct SequenceNumbering {
    prefix: String,
    next: u32,
}

impl SequenceNumbering {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            next: 0,
        }
    }
}

impl NumberingService for SequenceNumbering {
    fn next_reference(&mut self) -> String {
        self.next += 1;
        format!("{}{:05}", self.prefix, self.next)
    }
}
