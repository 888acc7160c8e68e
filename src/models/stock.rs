//! 股票数据模型
//!
//! 各数据源解析后统一转换为以下结构，股票代码均为 6 位数字，
//! 日期为 `YYYY-MM-DD`，时间为 `YYYY-MM-DDTHH:MM:SS`

use serde::{Deserialize, Serialize};

/// 股票代码
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StockCode {
    /// 股票代码
    pub stock_code: String,
    /// 股票简称
    pub short_name: String,
    /// 交易所: SZ / SH / BJ
    pub exchange: String,
    /// 上市日期（部分数据源不提供）
    pub list_date: String,
}

/// 指数代码
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexCode {
    pub index_code: String,
    pub index_name: String,
    pub exchange: String,
}

/// 概念板块
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConceptCode {
    /// 板块代码，如 BK0493
    pub concept_code: String,
    pub concept_name: String,
    /// 入选原因（个股所属概念时有值）
    pub reason: String,
    /// 数据来源
    pub source: String,
}

/// K线
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KLine {
    pub stock_code: String,
    /// 交易日期
    pub trade_date: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// 成交量（股）
    pub volume: i64,
    /// 成交额（元）
    pub amount: f64,
    /// 涨跌额
    pub change: f64,
    /// 涨跌幅（%）
    pub change_pct: f64,
    /// 换手率（%）
    pub turnover_ratio: f64,
    /// 昨收
    pub pre_close: f64,
}

/// 分时行情
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketMin {
    pub stock_code: String,
    pub trade_time: String,
    pub price: f64,
    pub change: f64,
    pub change_pct: f64,
    /// 均价
    pub avg_price: f64,
    /// 成交量（股）
    pub volume: i64,
    /// 成交额（元）
    pub amount: f64,
}

/// 实时行情
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentMarket {
    pub stock_code: String,
    pub short_name: String,
    pub price: f64,
    pub change: f64,
    pub change_pct: f64,
    /// 成交量（股）
    pub volume: i64,
    /// 成交额（元）
    pub amount: f64,
    /// 数据来源
    pub source: String,
}

/// 五档盘口
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketFive {
    pub stock_code: String,
    pub short_name: String,
    pub price: f64,
    pub change: f64,
    pub change_pct: f64,
    pub volume: i64,
    pub amount: f64,
    /// 买一到买五
    pub buy_prices: [f64; 5],
    pub buy_volumes: [i64; 5],
    /// 卖一到卖五
    pub sell_prices: [f64; 5],
    pub sell_volumes: [i64; 5],
    pub source: String,
}

/// 资金流向（元）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CapitalFlow {
    pub stock_code: String,
    /// 日度数据为日期，分钟数据为时间
    pub trade_date: String,
    /// 主力净流入
    pub main_net_inflow: f64,
    /// 主力净流入占比（%），分钟数据为 0
    pub main_net_inflow_rate: f64,
    /// 小单
    pub sm_net_inflow: f64,
    /// 中单
    pub mid_net_inflow: f64,
    /// 大单
    pub lg_net_inflow: f64,
    /// 超大单
    pub max_net_inflow: f64,
}

/// 股本结构
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StockShares {
    pub stock_code: String,
    /// 变动日期
    pub change_date: String,
    pub total_shares: f64,
    /// 限售股
    pub limit_shares: f64,
    /// 流通A股
    pub list_a_shares: f64,
    pub change_reason: String,
}

/// 申万行业
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndustrySw {
    pub stock_code: String,
    pub sw_code: String,
    pub industry_name: String,
    pub industry_type: String,
    pub source: String,
}

/// 交易日历
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeCalendar {
    pub trade_date: String,
    /// 1 交易日，0 非交易日
    pub trade_status: i32,
    /// 星期几，1 为周一，7 为周日
    pub day_week: i32,
}
