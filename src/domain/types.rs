// ==========================================
// 出货量预测系统 - 领域类型定义
// ==========================================
// 预测周期 (Horizon): 界面选项序号 0/1/2 ↔ 1/3/12 个月
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// 周期显示名称统一后缀，生成 period 标签时去掉
const DISPLAY_SUFFIX: &str = " Forecast";

// ==========================================
// 预测周期 (Horizon)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Horizon {
    OneMonth,   // 1 个月
    OneQuarter, // 3 个月
    OneYear,    // 12 个月
}

impl Horizon {
    /// 选项顺序即界面顺序
    pub fn all() -> [Horizon; 3] {
        [Horizon::OneMonth, Horizon::OneQuarter, Horizon::OneYear]
    }

    /// 由选项序号构造（0/1/2）
    pub fn from_index(index: usize) -> Option<Horizon> {
        Self::all().get(index).copied()
    }

    /// 由月数构造（1/3/12）
    pub fn from_months(months: usize) -> Option<Horizon> {
        Self::all().into_iter().find(|h| h.months() == months)
    }

    pub fn index(&self) -> usize {
        match self {
            Horizon::OneMonth => 0,
            Horizon::OneQuarter => 1,
            Horizon::OneYear => 2,
        }
    }

    /// 预测月数
    pub fn months(&self) -> usize {
        match self {
            Horizon::OneMonth => 1,
            Horizon::OneQuarter => 3,
            Horizon::OneYear => 12,
        }
    }

    /// 选项显示名称
    pub fn display_name(&self) -> &'static str {
        match self {
            Horizon::OneMonth => "One Month Forecast",
            Horizon::OneQuarter => "One Quarter Forecast",
            Horizon::OneYear => "One Year Forecast",
        }
    }

    /// 预测记录中的 period 标签（如 "One Month"）
    pub fn period_label(&self) -> &'static str {
        let name = self.display_name();
        name.strip_suffix(DISPLAY_SUFFIX).unwrap_or(name)
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
