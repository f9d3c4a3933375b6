//! 集成測試

use chrono::NaiveDate;
use replen::core::ReceiptEvent;
use replen::engine::{InMemoryMasterData, RecordingPurchaseService, SequenceNumbering};
use replen::{
    AdvanceOutcome, Period, PlanEngine, PlanState, Quarter, ReplenError, StockUrgency,
    TrackingState,
};
use rust_decimal::Decimal;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn dec(value: i64) -> Decimal {
    Decimal::from(value)
}

type Engine = PlanEngine<
    InMemoryMasterData,
    InMemoryMasterData,
    RecordingPurchaseService,
    SequenceNumbering,
>;

/// 自行車場景的主資料：兩層 BOM、共用元件、兩個供應商
///
/// BIKE → FRAME ×1, WHEEL ×2, BOLT ×10
/// FRAME → STEEL-TUBE ×3, BOLT ×4（BOLT 為共用元件）
fn bike_master_data() -> InMemoryMasterData {
    InMemoryMasterData::new()
        .with_eligible("BIKE")
        .with_bom(
            "BIKE",
            vec![("FRAME", dec(1)), ("WHEEL", dec(2)), ("BOLT", dec(10))],
        )
        .with_bom("FRAME", vec![("STEEL-TUBE", dec(3)), ("BOLT", dec(4))])
        .with_stock("WHEEL", dec(30), dec(10))
        .with_supplier("WHEEL", "VENDOR-WHEELS", dec(25), 7)
        .with_stock("STEEL-TUBE", dec(0), dec(20))
        .with_supplier("STEEL-TUBE", "VENDOR-STEEL", dec(8), 14)
        .with_stock("BOLT", dec(5000), dec(100))
        .with_supplier("BOLT", "VENDOR-STEEL", dec(1), 14)
        // 去年 Q2 各月的實際出貨，作為預測的參考值
        .with_sales("BIKE", d(2024, 4, 1), dec(40))
        .with_sales("BIKE", d(2024, 5, 1), dec(55))
        .with_sales("BIKE", d(2024, 6, 1), dec(48))
}

fn bike_engine() -> Engine {
    let data = bike_master_data();
    PlanEngine::new(
        data.clone(),
        data,
        RecordingPurchaseService::new(),
        SequenceNumbering::new("PLAN-"),
    )
    .with_today(d(2025, 1, 15))
}

#[test]
fn test_full_pipeline_from_forecast_to_tracking_done() {
    let mut engine = bike_engine();

    // 1. 創建 Q2 計劃：合格成品自動納入
    let plan_id = engine
        .create_plan(Period::Quarterly { quarter: Quarter::Q2 })
        .unwrap();
    {
        let plan = engine.plan(plan_id).unwrap();
        assert_eq!(plan.state, PlanState::Draft);
        assert_eq!(plan.period_label, "2025-Q2");
        assert_eq!(plan.date_start, d(2025, 4, 1));
        assert_eq!(plan.date_end, d(2025, 6, 30));
    }

    // 2. 進入預測階段：3 個月各一條，歷史量取去年同月
    engine.advance(plan_id).unwrap();
    {
        let plan = engine.plan(plan_id).unwrap();
        assert_eq!(plan.forecast_lines.len(), 3);
        let may = plan
            .forecast_lines
            .iter()
            .find(|l| l.month == d(2025, 5, 1))
            .unwrap();
        assert_eq!(may.historic_qty, dec(55));
    }

    // 3. 輸入預測：4 月 40、5 月 60、6 月 50 → 共 150 台
    engine.edit_forecast(plan_id, "BIKE", d(2025, 4, 1), dec(40)).unwrap();
    engine.edit_forecast(plan_id, "BIKE", d(2025, 5, 1), dec(60)).unwrap();
    engine.edit_forecast(plan_id, "BIKE", d(2025, 6, 1), dec(50)).unwrap();

    // 4. 生成計劃：展開 BOM、淨算庫存
    match engine.advance(plan_id).unwrap() {
        AdvanceOutcome::Advanced { state, warnings } => {
            assert_eq!(state, PlanState::Plan);
            assert!(warnings.is_empty());
        }
        other => panic!("預期前進，得到 {:?}", other),
    }
    {
        let plan = engine.plan(plan_id).unwrap();
        // FRAME 是半成品，不出現在元件需求中
        assert!(plan.component("FRAME").is_none());

        // WHEEL: 150×2 = 300，庫存 30、安全 10 → 建議 280
        let wheel = plan.component("WHEEL").unwrap();
        assert_eq!(wheel.forecast_consumption, dec(300));
        assert_eq!(wheel.suggested_qty, dec(280));
        assert_eq!(wheel.urgency, StockUrgency::Urgent);

        // STEEL-TUBE: 150×1×3 = 450
        let tube = plan.component("STEEL-TUBE").unwrap();
        assert_eq!(tube.forecast_consumption, dec(450));
        assert_eq!(tube.suggested_qty, dec(470));

        // BOLT 共用元件聚合：150×10 + 150×4 = 2100；庫存 5000 充足
        let bolt = plan.component("BOLT").unwrap();
        assert_eq!(bolt.forecast_consumption, dec(2100));
        assert_eq!(bolt.suggested_qty, dec(-2800));
        assert_eq!(bolt.urgency, StockUrgency::Available);
    }

    // 5. 進入報告階段並驗證：BOLT 無需補貨，其餘兩個元件下單
    engine.advance(plan_id).unwrap();
    let summary = engine.finalize(plan_id).unwrap();

    // WHEEL → VENDOR-WHEELS、STEEL-TUBE → VENDOR-STEEL，各一張請求
    assert_eq!(summary.request_count, 2);
    {
        let plan = engine.plan(plan_id).unwrap();
        assert_eq!(plan.state, PlanState::Done);
        assert_eq!(plan.validation_date, Some(d(2025, 1, 15)));
        // 總金額 = 280×25 + 470×8 + (-2800)×1
        // BOLT 的建議量為負且未改動，帳面金額隨之為負
        assert_eq!(plan.total_amount(), dec(7960));
    }

    // 6. 追蹤單：每個下單元件一條明細，預計到貨日 = 驗證日 + 交期
    let tracking_id = summary.tracking_id;
    let (wheel_ref, tube_ref) = {
        let tracking = engine.tracking(tracking_id).unwrap();
        assert_eq!(tracking.lines.len(), 2);
        assert_eq!(tracking.total_amount(), dec(10760));

        let wheel = tracking
            .lines
            .iter()
            .find(|l| l.product_id == "WHEEL")
            .unwrap();
        assert_eq!(wheel.expected_date, Some(d(2025, 1, 22)));

        let tube = tracking
            .lines
            .iter()
            .find(|l| l.product_id == "STEEL-TUBE")
            .unwrap();
        assert_eq!(tube.quantity_ordered, dec(470));

        (
            wheel.purchase_line_refs[0].clone(),
            tube.purchase_line_refs[0].clone(),
        )
    };

    // 7. 下游事件：確認、部分收貨、補齊 → 追蹤單完成
    engine.purchase_confirmed(tracking_id, &wheel_ref).unwrap();
    engine.purchase_confirmed(tracking_id, &tube_ref).unwrap();

    engine
        .apply_receipt(
            tracking_id,
            &ReceiptEvent {
                purchase_line: wheel_ref.clone(),
                quantity_received: dec(100),
            },
        )
        .unwrap();
    {
        let tracking = engine.tracking(tracking_id).unwrap();
        let wheel = tracking
            .lines
            .iter()
            .find(|l| l.product_id == "WHEEL")
            .unwrap();
        assert_eq!(wheel.quantity_pending(), dec(180));
        assert_eq!(tracking.progress_percentage(), Decimal::ZERO);
    }

    engine
        .apply_receipt(
            tracking_id,
            &ReceiptEvent {
                purchase_line: wheel_ref,
                quantity_received: dec(180),
            },
        )
        .unwrap();
    engine
        .apply_receipt(
            tracking_id,
            &ReceiptEvent {
                purchase_line: tube_ref,
                quantity_received: dec(470),
            },
        )
        .unwrap();

    let tracking = engine.tracking(tracking_id).unwrap();
    assert_eq!(tracking.state, TrackingState::Done);
    assert_eq!(tracking.progress_percentage(), dec(100));
}

#[test]
fn test_period_rollover_past_month_goes_to_next_year() {
    // 今天 2024-06-15：選 3 月 → 2025-03；選 9 月 → 2024-09
    let data = bike_master_data();
    let mut engine = PlanEngine::new(
        data.clone(),
        data,
        RecordingPurchaseService::new(),
        SequenceNumbering::new("PLAN-"),
    )
    .with_today(d(2024, 6, 15));

    let past = engine.create_plan(Period::Monthly { month: 3 }).unwrap();
    assert_eq!(engine.plan(past).unwrap().date_start, d(2025, 3, 1));
    assert_eq!(engine.plan(past).unwrap().period_label, "2025-03");

    let future = engine.create_plan(Period::Monthly { month: 9 }).unwrap();
    assert_eq!(engine.plan(future).unwrap().date_start, d(2024, 9, 1));
}

#[test]
fn test_catch_up_when_period_already_started() {
    // 今天 2025-08-10，年度 Y0 期間 2025 全年已開始
    // → 預測列只涵蓋 8~12 月
    let data = bike_master_data();
    let mut engine = PlanEngine::new(
        data.clone(),
        data,
        RecordingPurchaseService::new(),
        SequenceNumbering::new("PLAN-"),
    )
    .with_today(d(2025, 8, 10));

    let plan_id = engine
        .create_plan(Period::Annual { year_offset: 0 })
        .unwrap();
    engine.advance(plan_id).unwrap();

    let plan = engine.plan(plan_id).unwrap();
    assert_eq!(plan.forecast_lines.len(), 5);
    assert_eq!(plan.forecast_lines[0].month, d(2025, 8, 1));
    assert_eq!(plan.forecast_lines[4].month, d(2025, 12, 1));
}

#[test]
fn test_go_back_and_regenerate() {
    let mut engine = bike_engine();
    let plan_id = engine
        .create_plan(Period::Monthly { month: 6 })
        .unwrap();

    engine.advance(plan_id).unwrap();
    engine.edit_forecast(plan_id, "BIKE", d(2025, 6, 1), dec(50)).unwrap();
    engine.advance(plan_id).unwrap();
    assert_eq!(engine.plan(plan_id).unwrap().state, PlanState::Plan);

    // 回退到預測：元件需求保留在原地，不被刪除
    engine.go_back(plan_id).unwrap();
    {
        let plan = engine.plan(plan_id).unwrap();
        assert_eq!(plan.state, PlanState::Forecast);
        assert!(!plan.components.is_empty());
        assert_eq!(plan.forecast_lines[0].forecast_qty, dec(50));
    }

    // 修改預測後再前進：元件需求整批重算
    engine.edit_forecast(plan_id, "BIKE", d(2025, 6, 1), dec(100)).unwrap();
    engine.advance(plan_id).unwrap();

    let plan = engine.plan(plan_id).unwrap();
    let wheel = plan.component("WHEEL").unwrap();
    assert_eq!(wheel.forecast_consumption, dec(200));
}

#[test]
fn test_finalize_failure_leaves_everything_untouched() {
    // 下游採購服務限制一張請求 → 兩張的批次整體失敗
    let data = bike_master_data();
    let mut engine = PlanEngine::new(
        data.clone(),
        data,
        RecordingPurchaseService::new().with_failure_if_more_than(1),
        SequenceNumbering::new("PLAN-"),
    )
    .with_today(d(2025, 1, 15));

    let plan_id = engine
        .create_plan(Period::Monthly { month: 6 })
        .unwrap();
    engine.advance(plan_id).unwrap();
    engine.edit_forecast(plan_id, "BIKE", d(2025, 6, 1), dec(50)).unwrap();
    engine.advance(plan_id).unwrap();
    engine.advance(plan_id).unwrap();

    assert!(matches!(
        engine.finalize(plan_id),
        Err(ReplenError::ExternalService(_))
    ));

    // 計劃留在報告階段，無追蹤單，下游無任何部分請求
    let plan = engine.plan(plan_id).unwrap();
    assert_eq!(plan.state, PlanState::Report);
    assert_eq!(plan.validation_date, None);
    assert!(engine.purchasing().created().is_empty());
}

#[test]
fn test_plan_numbering_is_sequential() {
    let mut engine = bike_engine();
    let first = engine
        .create_plan(Period::Monthly { month: 6 })
        .unwrap();
    let second = engine
        .create_plan(Period::Monthly { month: 7 })
        .unwrap();

    assert_eq!(engine.plan(first).unwrap().name, "PLAN-00001");
    assert_eq!(engine.plan(second).unwrap().name, "PLAN-00002");
}
