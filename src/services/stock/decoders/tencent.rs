//! 腾讯财经
//!
//! 行情为 `v_<symbol>="..."` 形式，字段以 `~` 分隔，记录以 `;` 结尾

use super::split_fields;
use crate::models::{CurrentMarket, MarketFive};
use crate::services::stock::common::{
    clean_string, convert_units, format_stock_code, lots_to_shares, parse_float,
};

pub const SOURCE: &str = "腾讯财经";

/// 简要行情的最少字段数
pub const QUOTE_MIN_FIELDS: usize = 11;
/// 完整行情（含五档）的最少字段数
pub const FULL_MIN_FIELDS: usize = 50;

/// 取出每条记录引号内的内容
fn record_bodies(text: &str) -> impl Iterator<Item = &str> {
    text.split(';').filter_map(|record| {
        let (_, rest) = record.split_once('=')?;
        let body = rest.trim().trim_matches('"');
        (!body.is_empty()).then_some(body)
    })
}

/// 简要行情：`51~名称~代码~现价~涨跌~涨跌幅~成交量(手)~成交额(万)~~总市值~类型`
pub fn decode_quotes(text: &str) -> Vec<CurrentMarket> {
    record_bodies(text)
        .filter_map(|body| {
            let f = split_fields(body, '~', QUOTE_MIN_FIELDS)?;
            let code = format_stock_code(f[2]);
            if code.is_empty() {
                return None;
            }
            Some(CurrentMarket {
                stock_code: code,
                short_name: clean_string(f[1]),
                price: parse_float(f[3]),
                change: parse_float(f[4]),
                change_pct: parse_float(f[5]),
                volume: lots_to_shares(f[6]),
                amount: convert_units(parse_float(f[7]), "万"),
                source: SOURCE.to_string(),
            })
        })
        .collect()
}

/// 完整行情中的五档盘口
///
/// 买盘价格/数量位于 9..18，卖盘位于 19..28，数量单位为手
pub fn decode_five(text: &str, stock_code: &str) -> Vec<MarketFive> {
    record_bodies(text)
        .filter_map(|body| split_fields(body, '~', FULL_MIN_FIELDS))
        .find(|f| format_stock_code(f[2]) == stock_code)
        .map(|f| {
            let mut five = MarketFive {
                stock_code: stock_code.to_string(),
                short_name: clean_string(f[1]),
                price: parse_float(f[3]),
                change: parse_float(f[31]),
                change_pct: parse_float(f[32]),
                volume: lots_to_shares(f[6]),
                amount: convert_units(parse_float(f[37]), "万"),
                source: SOURCE.to_string(),
                ..Default::default()
            };
            for i in 0..5 {
                five.buy_prices[i] = parse_float(f[9 + i * 2]);
                five.buy_volumes[i] = lots_to_shares(f[10 + i * 2]);
                five.sell_prices[i] = parse_float(f[19 + i * 2]);
                five.sell_volumes[i] = lots_to_shares(f[20 + i * 2]);
            }
            vec![five]
        })
        .unwrap_or_default()
}
