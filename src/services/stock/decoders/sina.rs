//! 新浪财经
//!
//! 简要行情格式: `var hq_str_s_sz000001="平安银行,9.21,-0.18,-1.92,1158366,107574";`
//! 依次为名称、现价、涨跌额、涨跌幅、成交量（手）、成交额（万元）

use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

use super::split_fields;
use crate::models::{CurrentMarket, StockCode};
use crate::services::stock::common::{
    clean_string, convert_units, format_stock_code, get_exchange_by_stock_code, lossy_string,
    lots_to_shares, parse_float,
};

pub const SOURCE: &str = "新浪财经";

/// 简要行情的最少字段数
pub const QUOTE_MIN_FIELDS: usize = 6;

fn quote_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"hq_str_s_(?:sh|sz|bj)(\d{6})="([^"]*)""#).expect("valid sina quote regex")
    })
}

/// 简要行情，代码取自变量名；内容为空（停牌或代码不存在）的行跳过
pub fn decode_quotes(text: &str) -> Vec<CurrentMarket> {
    quote_regex()
        .captures_iter(text)
        .filter_map(|caps| {
            let code = caps.get(1)?.as_str();
            let f = split_fields(caps.get(2)?.as_str(), ',', QUOTE_MIN_FIELDS)?;
            Some(CurrentMarket {
                stock_code: code.to_string(),
                short_name: clean_string(f[0]),
                price: parse_float(f[1]),
                change: parse_float(f[2]),
                change_pct: parse_float(f[3]),
                volume: lots_to_shares(f[4]),
                amount: convert_units(parse_float(f[5]), "万"),
                source: SOURCE.to_string(),
            })
        })
        .collect()
}

/// 行情中心列表项
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NodeItem {
    /// 带市场前缀，如 sz000001
    #[serde(deserialize_with = "lossy_string")]
    pub symbol: String,
    #[serde(deserialize_with = "lossy_string")]
    pub code: String,
    #[serde(deserialize_with = "lossy_string")]
    pub name: String,
}

/// 行情中心 A 股列表
pub fn decode_node_codes(items: Vec<NodeItem>) -> Vec<StockCode> {
    items
        .into_iter()
        .filter_map(|item| {
            let raw = if item.code.is_empty() { &item.symbol } else { &item.code };
            let code = format_stock_code(raw);
            if code.is_empty() {
                return None;
            }
            Some(StockCode {
                exchange: get_exchange_by_stock_code(&code).to_string(),
                stock_code: code,
                short_name: clean_string(&item.name),
                list_date: String::new(),
            })
        })
        .collect()
}
