//! 計劃期間模型
//!
//! 期間類型與子期間以 tagged union 表示，從根本上排除
//! 「期間類型與子期間欄位不一致」這類錯誤。

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{ReplenError, Result};

/// 季度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quarter {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl Quarter {
    /// 季度起始月份（Q1=1, Q2=4, Q3=7, Q4=10）
    pub fn anchor_month(&self) -> u32 {
        match self {
            Quarter::Q1 => 1,
            Quarter::Q2 => 4,
            Quarter::Q3 => 7,
            Quarter::Q4 => 10,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Quarter::Q1 => "Q1",
            Quarter::Q2 => "Q2",
            Quarter::Q3 => "Q3",
            Quarter::Q4 => "Q4",
        }
    }
}

/// 半年度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Semester {
    S1,
    S2,
}

impl Semester {
    /// 半年度起始月份（S1=1, S2=7）
    pub fn anchor_month(&self) -> u32 {
        match self {
            Semester::S1 => 1,
            Semester::S2 => 7,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Semester::S1 => "S1",
            Semester::S2 => "S2",
        }
    }
}

/// 計劃期間（類型 + 子期間合一）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Period {
    /// 月度（月份 1..=12）
    Monthly { month: u32 },
    /// 季度
    Quarterly { quarter: Quarter },
    /// 半年度
    Biannual { semester: Semester },
    /// 年度（相對今年的年偏移 0..=5）
    Annual { year_offset: u32 },
}

impl Period {
    /// 期間長度（月數）
    pub fn span_months(&self) -> u32 {
        match self {
            Period::Monthly { .. } => 1,
            Period::Quarterly { .. } => 3,
            Period::Biannual { .. } => 6,
            Period::Annual { .. } => 12,
        }
    }

    /// 起始月份（1..=12）
    pub fn anchor_month(&self) -> u32 {
        match self {
            Period::Monthly { month } => *month,
            Period::Quarterly { quarter } => quarter.anchor_month(),
            Period::Biannual { semester } => semester.anchor_month(),
            Period::Annual { .. } => 1,
        }
    }

    /// 解析期間：以「今天」為基準計算具體的起訖日期
    ///
    /// 年度跨年規則：若所選子期間的起始月份已經過去（嚴格小於當月），
    /// 自動順延到明年；年度期間使用明確的年偏移，不做順延。
    /// 每次子期間變更都必須重新呼叫本方法，以今天重新解析。
    pub fn resolve(&self, today: NaiveDate) -> Result<ResolvedPeriod> {
        let anchor = self.anchor_month();

        let year = match self {
            Period::Monthly { month } => {
                if !(1..=12).contains(month) {
                    return Err(ReplenError::Validation(format!(
                        "無效的月份子期間: {}",
                        month
                    )));
                }
                if today.month() > anchor {
                    today.year() + 1
                } else {
                    today.year()
                }
            }
            Period::Quarterly { .. } | Period::Biannual { .. } => {
                if today.month() > anchor {
                    today.year() + 1
                } else {
                    today.year()
                }
            }
            Period::Annual { year_offset } => {
                if *year_offset > 5 {
                    return Err(ReplenError::Validation(format!(
                        "無效的年偏移: {}（允許 0..=5）",
                        year_offset
                    )));
                }
                today.year() + *year_offset as i32
            }
        };

        let date_start = NaiveDate::from_ymd_opt(year, anchor, 1)
            .ok_or_else(|| ReplenError::InvalidDate(format!("{}-{:02}-01", year, anchor)))?;

        // 結束日 = 起始日 + 期間長度 - 1 天（即最後一個月的最後一天）
        let date_end = date_start
            .checked_add_months(Months::new(self.span_months()))
            .and_then(|d| d.pred_opt())
            .ok_or_else(|| ReplenError::InvalidDate("期間結束日溢出".to_string()))?;

        Ok(ResolvedPeriod {
            period: *self,
            date_start,
            date_end,
        })
    }

    /// 子期間代碼（"03" / "Q2" / "S1" / "Y0"）
    pub fn sub_period_code(&self) -> String {
        match self {
            Period::Monthly { month } => format!("{:02}", month),
            Period::Quarterly { quarter } => quarter.code().to_string(),
            Period::Biannual { semester } => semester.code().to_string(),
            Period::Annual { year_offset } => format!("Y{}", year_offset),
        }
    }
}

/// 解析後的期間（含具體起訖日期）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPeriod {
    /// 原始期間選擇
    pub period: Period,

    /// 起始日（必為某月 1 日）
    pub date_start: NaiveDate,

    /// 結束日（必為某月最後一天）
    pub date_end: NaiveDate,
}

impl ResolvedPeriod {
    /// 期間的人類可讀標籤（"2025-03" / "2025-Q2" / "2025-S1" / "2026"）
    pub fn label(&self) -> String {
        let year = self.date_start.year();
        match self.period {
            Period::Monthly { month } => format!("{}-{:02}", year, month),
            Period::Quarterly { quarter } => format!("{}-{}", year, quarter.code()),
            Period::Biannual { semester } => format!("{}-{}", year, semester.code()),
            Period::Annual { .. } => format!("{}", year),
        }
    }

    /// 期間內的月份錨點序列（每月 1 日，嚴格遞增）
    ///
    /// 追趕規則：若期間已經開始（今天落在期間中段），序列從當月
    /// 開始而非期間字面起始月。這是刻意保留的行為：已過去的月份
    /// 不再產生預測列。
    pub fn months_in_period(&self, today: NaiveDate) -> Vec<NaiveDate> {
        let current_month_start =
            NaiveDate::from_ymd_opt(today.year(), today.month(), 1).expect("合法年月");

        let effective_start =
            if self.date_start < current_month_start && current_month_start <= self.date_end {
                current_month_start
            } else {
                self.date_start
            };

        let mut months = Vec::new();
        let mut current = effective_start;
        while current <= self.date_end {
            months.push(current);
            current = match current.checked_add_months(Months::new(1)) {
                Some(next) => next,
                None => break,
            };
        }
        months
    }
}
