//! 各数据源响应格式的解析
//!
//! 每个（数据源，接口）对应一个具名的响应结构，解析后投影为统一的记录。
//! 单条记录格式不对时直接跳过，整体结构不对时返回解析错误。

pub mod baidu;
pub mod eastmoney;
pub mod sina;
pub mod tencent;
pub mod szse;

use super::common::{parse_trade_date, parse_trade_time, require_trade_date, trim_field};
use crate::error::Result;

/// 按分隔符切分一行，字段数不足时返回 None
pub(crate) fn split_fields(line: &str, sep: char, min: usize) -> Option<Vec<&str>> {
    let line = trim_field(line);
    if line.is_empty() {
        return None;
    }
    let fields: Vec<&str> = line.split(sep).map(trim_field).collect();
    (fields.len() >= min).then_some(fields)
}

/// K线时间：日线为日期，分钟线为日期时间
pub(crate) fn bar_time(s: &str, context: &str) -> Result<String> {
    match parse_trade_time(s) {
        Some(t) => Ok(t.format("%Y-%m-%dT%H:%M:%S").to_string()),
        None => require_trade_date(s, context),
    }
}

/// 报表日期 "2023-12-31 00:00:00" -> "2023-12-31"，无法识别时保留原文
pub(crate) fn report_date(s: &str) -> String {
    let s = s.trim();
    s.get(..10)
        .and_then(parse_trade_date)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| s.to_string())
}
