//! 公共常量和辅助函数
//!
//! 股票代码校验与格式化、交易所推断、数值和日期的容错解析

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc, Weekday};
use chrono_tz::Asia::Shanghai;
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer};

use crate::error::{AdataError, Result};

// ==================== 数据源 API 常量 ====================

/// 百度股市通 排行榜（代码列表）
pub const BAIDU_MARKET_RANK_API: &str = "https://finance.pae.baidu.com/selfselect/getmarketrank";
/// 百度股市通 K线
pub const BAIDU_KLINE_API: &str = "https://finance.pae.baidu.com/selfselect/getstockquotation";
/// 百度股市通 盘口
pub const BAIDU_QUOTATION_API: &str = "https://finance.pae.baidu.com/vapi/v1/getquotation";
/// 百度股市通 所属板块
pub const BAIDU_RELATED_BLOCK_API: &str = "https://finance.pae.baidu.com/api/getrelatedblock";

/// 东方财富 列表
pub const EAST_CLIST_API: &str = "https://push2.eastmoney.com/api/qt/clist/get";
/// 东方财富 历史K线
pub const EAST_KLINE_API: &str = "https://push2his.eastmoney.com/api/qt/stock/kline/get";
/// 东方财富 分时
pub const EAST_TRENDS_API: &str = "https://push2his.eastmoney.com/api/qt/stock/trends2/get";
/// 东方财富 分钟资金流向
pub const EAST_FFLOW_MIN_API: &str = "https://push2.eastmoney.com/api/qt/stock/fflow/kline/get";
/// 东方财富 日度资金流向
pub const EAST_FFLOW_DAY_API: &str = "https://push2his.eastmoney.com/api/qt/stock/fflow/daykline/get";
/// 东方财富 数据中心
pub const EAST_DATACENTER_API: &str = "https://datacenter.eastmoney.com/securities/api/data/v1/get";

/// 新浪财经 简要行情
pub const SINA_HQ_API: &str = "https://hq.sinajs.cn/list=";
/// 新浪财经 A股列表
pub const SINA_NODE_DATA_API: &str = "https://vip.stock.finance.sina.com.cn/quotes_service/api/json_v2.php/Market_Center.getHQNodeData";

/// 腾讯财经 行情
pub const TENCENT_QUOTE_API: &str = "https://qt.gtimg.cn/q=";

/// 深交所 交易日历
pub const SZSE_CALENDAR_API: &str = "https://www.szse.cn/api/report/exchange/onepersistenthour/monthList";

// ==================== 交易所 ====================

/// 股票代码前两位 -> 交易所
const EXCHANGE_TABLE: &[(&str, &str)] = &[
    ("00", "SZ"), // 深圳主板
    ("20", "SZ"), // 深圳B股
    ("30", "SZ"), // 创业板
    ("43", "BJ"), // 北交所
    ("60", "SH"), // 上海主板
    ("68", "SH"), // 科创板
    ("83", "BJ"),
    ("87", "BJ"),
    ("90", "SH"), // 上海B股
    ("92", "BJ"),
];

pub const UNKNOWN_EXCHANGE: &str = "UNKNOWN";

fn lookup_exchange(code: &str) -> Option<&'static str> {
    let prefix = code.get(..2)?;
    EXCHANGE_TABLE
        .iter()
        .find(|(p, _)| *p == prefix)
        .map(|(_, exchange)| *exchange)
}

/// 获取北京时间字符串（ISO 8601 格式，带+08:00时区）
pub fn get_beijing_time() -> String {
    Utc::now().with_timezone(&Shanghai).to_rfc3339()
}

/// 当前北京时间
pub fn beijing_now() -> DateTime<Tz> {
    Utc::now().with_timezone(&Shanghai)
}

/// 6 位数字且前缀已知
pub fn is_valid_stock_code(code: &str) -> bool {
    code.len() == 6 && code.bytes().all(|b| b.is_ascii_digit()) && lookup_exchange(code).is_some()
}

/// 校验股票代码，失败时返回 `InvalidStockCode`
pub fn ensure_stock_code(code: &str) -> Result<String> {
    let code = code.trim();
    if is_valid_stock_code(code) {
        Ok(code.to_string())
    } else {
        Err(AdataError::InvalidStockCode(code.to_string()))
    }
}

/// 取第一段连续数字，补齐或截断为 6 位；没有数字时返回空串
pub fn format_stock_code(code: &str) -> String {
    let digits: String = code
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();

    if digits.is_empty() {
        return String::new();
    }
    if digits.len() >= 6 {
        digits[..6].to_string()
    } else {
        format!("{:0>6}", digits)
    }
}

/// "SZ" / "SH" / "BJ"，未知前缀返回 "UNKNOWN"
pub fn get_exchange_by_stock_code(code: &str) -> &'static str {
    lookup_exchange(code).unwrap_or(UNKNOWN_EXCHANGE)
}

/// 补全交易所后缀，如 600036 -> 600036.SH；未知前缀原样返回
pub fn compile_exchange_by_stock_code(code: &str) -> String {
    match lookup_exchange(code) {
        Some(exchange) => format!("{}.{}", code, exchange),
        None => code.to_string(),
    }
}

/// 新浪、腾讯使用的小写市场前缀
pub fn market_prefix(code: &str) -> &'static str {
    match lookup_exchange(code) {
        Some("SH") => "sh",
        Some("BJ") => "bj",
        _ => "sz",
    }
}

/// 东方财富 secid，上海为 1，其他为 0
pub fn east_secid(code: &str) -> String {
    match lookup_exchange(code) {
        Some("SH") => format!("1.{}", code),
        _ => format!("0.{}", code),
    }
}

// ==================== 数值 ====================

/// 单位换算（万、亿）
pub fn convert_units(value: f64, unit: &str) -> f64 {
    match unit.trim() {
        "万" => value * 10_000.0,
        "亿" => value * 100_000_000.0,
        _ => value,
    }
}

fn normalize_number(s: &str) -> Option<String> {
    let s = s.trim_matches(|c: char| c.is_whitespace() || c == '\u{a0}' || c == '"' || c == '\'');
    if s.is_empty() || s == "-" || s == "--" {
        return None;
    }
    Some(s.replace(',', ""))
}

/// 容错解析浮点数：空值、"-"、"--"、无法解析、非有限值均为 0
pub fn parse_float(s: &str) -> f64 {
    normalize_number(s)
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// 容错解析整数，"123.0" 这类带小数的写法按截断处理
pub fn parse_int(s: &str) -> i64 {
    let Some(s) = normalize_number(s) else {
        return 0;
    };
    s.parse::<i64>().unwrap_or_else(|_| {
        s.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(|v| v as i64)
            .unwrap_or(0)
    })
}

/// 成交量由手换算为股，溢出时取最大值
pub fn lots_to_shares(s: &str) -> i64 {
    parse_int(s).saturating_mul(100)
}

/// 去掉首尾空白并合并内部连续空白
pub fn clean_string(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// 去掉字段两端的空白、引号和分号
pub fn trim_field(s: &str) -> &str {
    s.trim_matches(|c: char| c.is_whitespace() || c == '\u{a0}' || c == '"' || c == ';')
}

// ==================== 日期 ====================

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y%m%d", "%Y/%m/%d", "%Y.%m.%d"];
const TIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y%m%d%H%M"];

/// 按支持的格式依次尝试解析日期
pub fn parse_trade_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(s, format).ok())
}

/// 按支持的格式依次尝试解析日期时间
pub fn parse_trade_time(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
}

/// 解析行情中的日期，失败时整个接口视为格式错误
pub fn require_trade_date(s: &str, context: &str) -> Result<String> {
    parse_trade_date(s)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .ok_or_else(|| AdataError::parse(context, "无法识别的日期", s))
}

/// 解析行情中的日期时间，输出 `YYYY-MM-DDTHH:MM:SS`
pub fn require_trade_time(s: &str, context: &str) -> Result<String> {
    parse_trade_time(s)
        .map(|t| t.format("%Y-%m-%dT%H:%M:%S").to_string())
        .ok_or_else(|| AdataError::parse(context, "无法识别的时间", s))
}

/// 任意支持的格式 -> YYYY-MM-DD，空输入返回空串
pub fn format_date(date: &str) -> Result<String> {
    if date.trim().is_empty() {
        return Ok(String::new());
    }
    parse_trade_date(date)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .ok_or_else(|| AdataError::InvalidDate(date.to_string()))
}

/// 任意支持的格式 -> YYYYMMDD，空输入返回空串
pub fn format_date_for_api(date: &str) -> Result<String> {
    Ok(format_date(date)?.replace('-', ""))
}

/// 可选的日期参数
pub fn parse_optional_date(date: Option<&str>) -> Result<Option<NaiveDate>> {
    match date.map(str::trim).filter(|d| !d.is_empty()) {
        None => Ok(None),
        Some(d) => parse_trade_date(d)
            .map(Some)
            .ok_or_else(|| AdataError::InvalidDate(d.to_string())),
    }
}

/// 日期是否落在闭区间内，未指定的边界不限制
pub fn within_range(date: &str, start: Option<NaiveDate>, end: Option<NaiveDate>) -> bool {
    let Some(day) = date.get(..10).and_then(parse_trade_date) else {
        return false;
    };
    start.map_or(true, |s| day >= s) && end.map_or(true, |e| day <= e)
}

/// 给定北京时间是否处于交易时段（工作日 9:30-11:30、13:00-15:00）
pub fn is_market_open_at<T: Datelike + Timelike>(time: &T) -> bool {
    if matches!(time.weekday(), Weekday::Sat | Weekday::Sun) {
        return false;
    }
    let minutes = time.hour() * 60 + time.minute();
    (9 * 60 + 30..=11 * 60 + 30).contains(&minutes) || (13 * 60..=15 * 60).contains(&minutes)
}

/// 当前是否处于交易时段
pub fn is_market_open() -> bool {
    is_market_open_at(&beijing_now())
}

/// 秒级时间戳 -> 北京时间 `YYYY-MM-DDTHH:MM:SS`
pub fn timestamp_to_beijing(ts: i64) -> Option<String> {
    Shanghai
        .timestamp_opt(ts, 0)
        .single()
        .map(|t| t.format("%Y-%m-%dT%H:%M:%S").to_string())
}

// ==================== serde 容错适配 ====================

/// 数字或字符串都接受，无法解析时为 0
pub fn lossy_f64<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<f64, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n.as_f64().filter(|v| v.is_finite()).unwrap_or(0.0),
        serde_json::Value::String(s) => parse_float(&s),
        _ => 0.0,
    })
}

/// 数字或字符串都接受，无法解析时为 0
pub fn lossy_i64<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<i64, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|v| v.is_finite()).map(|v| v as i64))
            .unwrap_or(0),
        serde_json::Value::String(s) => parse_int(&s),
        _ => 0,
    })
}

/// 字符串、数字或 null 都转为字符串
pub fn lossy_string<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s.trim().to_string(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}
