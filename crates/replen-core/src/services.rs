//! 外部協作服務介面
//!
//! 引擎只透過這些窄介面讀寫主資料（產品、BOM、庫存、供應商價目、
//! 銷售歷史）與下游採購；實作由宿主系統提供。

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::Result;

/// 產品ID（宿主系統的不透明識別字串）
pub type ProductId = String;

/// 供應商ID
pub type SupplierId = String;

/// 採購明細參照
pub type PurchaseLineRef = String;

/// BOM 明細：一個元件與其用量比
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BomLine {
    /// 元件ID
    pub component_id: ProductId,

    /// 用量比（每單位父件所需的元件數量）
    pub quantity: Decimal,
}

/// 物料清單（BOM）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bom {
    /// 父件ID
    pub product_id: ProductId,

    /// 明細
    pub lines: Vec<BomLine>,
}

/// 供應商資訊（價目表快照）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierInfo {
    /// 供應商ID
    pub supplier_id: SupplierId,

    /// 當前單價
    pub unit_price: Decimal,

    /// 交期（天）
    pub lead_time_days: u32,
}

/// 產品主資料目錄（唯讀，可被多個計劃並行讀取）
pub trait ProductCatalog {
    /// 合格成品清單（有 BOM、可銷售、可庫存的產品）
    fn eligible_products(&self) -> Result<Vec<ProductId>>;

    /// 產品的有效 BOM，無則回傳 None
    fn bom(&self, product_id: &str) -> Result<Option<Bom>>;

    /// 現有庫存
    fn current_stock(&self, product_id: &str) -> Result<Decimal>;

    /// 安全庫存（內部再訂購規則的最小量，無規則時為 0）
    fn safety_stock(&self, product_id: &str) -> Result<Decimal>;

    /// 產品的候選供應商清單
    fn suppliers(&self, product_id: &str) -> Result<Vec<SupplierInfo>>;
}

/// 銷售歷史查詢
pub trait SalesHistory {
    /// 指定日曆月內已完成的對客戶出貨量合計
    fn monthly_outbound(&self, product_id: &str, month_start: NaiveDate) -> Result<Decimal>;
}

/// 採購請求明細
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseRequestLine {
    pub product_id: ProductId,
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

/// 採購請求（單一供應商）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseRequest {
    pub supplier_id: SupplierId,
    pub lines: Vec<PurchaseRequestLine>,
}

/// 已建立的採購請求回執
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedRequest {
    /// 請求單號
    pub request_ref: String,

    pub supplier_id: SupplierId,

    /// 每條請求明細的 (產品, 採購明細參照)
    pub line_refs: Vec<(ProductId, PurchaseLineRef)>,
}

/// 採購請求服務
pub trait PurchaseRequestService {
    /// 整批建立採購請求
    ///
    /// 必須為原子操作：任何一張失敗時整批回滾並回傳錯誤，
    /// 不得留下部分建立的請求。引擎在本呼叫成功前不會改動
    /// 計劃狀態。
    fn create_requests(&mut self, requests: &[PurchaseRequest]) -> Result<Vec<CreatedRequest>>;
}

/// 單號服務：計劃創建時發放唯一單號
pub trait NumberingService {
    fn next_reference(&mut self) -> String;
}

/// 收貨事件（由收貨回饋流送入）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptEvent {
    /// 採購明細參照
    pub purchase_line: PurchaseLineRef,

    /// 本次收貨數量
    pub quantity_received: Decimal,
}
