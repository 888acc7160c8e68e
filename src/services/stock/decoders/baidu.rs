//! 百度股市通
//!
//! 外层统一为 `{"ResultCode": "0", "Result": ...}`，K线数据为分号分隔的文本

use std::collections::BTreeMap;

use serde::Deserialize;

use super::{bar_time, split_fields};
use crate::error::{AdataError, Result};
use crate::models::{IndustrySw, KLine, MarketFive, StockCode};
use crate::services::stock::common::{
    clean_string, format_stock_code, get_exchange_by_stock_code, lossy_f64, lossy_i64,
    lossy_string, parse_float, parse_int, timestamp_to_beijing,
};

pub const SOURCE: &str = "百度股市通";

/// K线记录的最少字段数
pub const KLINE_MIN_FIELDS: usize = 11;

/// K线默认列顺序（keys 缺失时使用）
pub const DEFAULT_KLINE_KEYS: &[&str] = &[
    "timestamp",
    "time",
    "open",
    "close",
    "volume",
    "high",
    "low",
    "amount",
    "range",
    "ratio",
    "turnoverratio",
    "preClose",
];

fn result_ok(code: &str) -> bool {
    code.is_empty() || code == "0"
}

// ==================== 排行榜（代码列表） ====================

#[derive(Debug, Default, Deserialize)]
pub struct RankResponse {
    #[serde(rename = "ResultCode", default, deserialize_with = "lossy_string")]
    pub result_code: String,
    #[serde(rename = "Result", default)]
    pub result: Option<RankResult>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RankResult {
    #[serde(rename = "Result", default)]
    pub result: Vec<RankDisplay>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RankDisplay {
    #[serde(rename = "DisplayData", default)]
    pub display_data: RankDisplayData,
}

#[derive(Debug, Default, Deserialize)]
pub struct RankDisplayData {
    #[serde(rename = "resultData", default)]
    pub result_data: RankResultData,
}

#[derive(Debug, Default, Deserialize)]
pub struct RankResultData {
    #[serde(rename = "tplData", default)]
    pub tpl_data: RankTplData,
}

#[derive(Debug, Default, Deserialize)]
pub struct RankTplData {
    #[serde(default)]
    pub result: RankList,
}

#[derive(Debug, Default, Deserialize)]
pub struct RankList {
    #[serde(default)]
    pub rank: Vec<RankItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RankItem {
    #[serde(deserialize_with = "lossy_string")]
    pub code: String,
    #[serde(deserialize_with = "lossy_string")]
    pub name: String,
    #[serde(deserialize_with = "lossy_string")]
    pub exchange: String,
}

/// 排行榜中的股票代码
pub fn decode_rank(resp: RankResponse) -> Result<Vec<StockCode>> {
    if !result_ok(&resp.result_code) {
        return Err(AdataError::NoData(format!("百度排行榜 ResultCode={}", resp.result_code)));
    }

    let items = resp
        .result
        .and_then(|r| r.result.into_iter().next())
        .map(|d| d.display_data.result_data.tpl_data.result.rank)
        .unwrap_or_default();

    Ok(items
        .into_iter()
        .filter_map(|item| {
            let code = format_stock_code(&item.code);
            if code.is_empty() {
                return None;
            }
            let exchange = match item.exchange.trim().to_uppercase() {
                e if e == "SH" || e == "SZ" || e == "BJ" => e,
                _ => get_exchange_by_stock_code(&code).to_string(),
            };
            Some(StockCode {
                stock_code: code,
                short_name: clean_string(&item.name),
                exchange,
                list_date: String::new(),
            })
        })
        .collect())
}

// ==================== K线 ====================

#[derive(Debug, Default, Deserialize)]
pub struct QuotationResponse {
    #[serde(rename = "ResultCode", default, deserialize_with = "lossy_string")]
    pub result_code: String,
    #[serde(rename = "Result", default)]
    pub result: Option<QuotationResult>,
}

#[derive(Debug, Default, Deserialize)]
pub struct QuotationResult {
    #[serde(rename = "newMarketData", default)]
    pub new_market_data: Option<NewMarketData>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NewMarketData {
    #[serde(default)]
    pub keys: Vec<String>,
    #[serde(rename = "marketData", default)]
    pub market_data: String,
}

/// 按列名查找字段位置
struct Columns {
    keys: Vec<String>,
}

impl Columns {
    fn new(keys: &[String]) -> Self {
        let keys = if keys.is_empty() {
            DEFAULT_KLINE_KEYS.iter().map(|k| k.to_string()).collect()
        } else {
            keys.to_vec()
        };
        Self { keys }
    }

    fn get<'a>(&self, fields: &[&'a str], name: &str) -> &'a str {
        self.keys
            .iter()
            .position(|k| k == name)
            .and_then(|i| fields.get(i).copied())
            .unwrap_or("")
    }
}

/// K线，`marketData` 为分号分隔的记录、逗号分隔的字段
pub fn decode_klines(resp: QuotationResponse, stock_code: &str) -> Result<Vec<KLine>> {
    if !result_ok(&resp.result_code) {
        return Err(AdataError::NoData(format!("百度K线 ResultCode={}", resp.result_code)));
    }
    let Some(data) = resp.result.and_then(|r| r.new_market_data) else {
        return Ok(Vec::new());
    };

    let columns = Columns::new(&data.keys);
    let mut records = Vec::new();

    for line in data.market_data.split(';') {
        let Some(f) = split_fields(line, ',', KLINE_MIN_FIELDS) else {
            continue;
        };

        let time = columns.get(&f, "time");
        let trade_date = if time.is_empty() {
            let ts = parse_int(columns.get(&f, "timestamp"));
            let beijing = timestamp_to_beijing(ts)
                .ok_or_else(|| AdataError::parse("百度K线", "无效的时间戳", line))?;
            beijing.split('T').next().unwrap_or_default().to_string()
        } else {
            bar_time(time, "百度K线")?
        };

        records.push(KLine {
            stock_code: stock_code.to_string(),
            trade_date,
            open: parse_float(columns.get(&f, "open")),
            close: parse_float(columns.get(&f, "close")),
            high: parse_float(columns.get(&f, "high")),
            low: parse_float(columns.get(&f, "low")),
            volume: parse_int(columns.get(&f, "volume")),
            amount: parse_float(columns.get(&f, "amount")),
            change: parse_float(columns.get(&f, "range")),
            change_pct: parse_float(columns.get(&f, "ratio")),
            turnover_ratio: parse_float(columns.get(&f, "turnoverratio")),
            pre_close: parse_float(columns.get(&f, "preClose")),
        });
    }

    Ok(records)
}

// ==================== 五档盘口 ====================

#[derive(Debug, Default, Deserialize)]
pub struct DepthResponse {
    #[serde(rename = "ResultCode", default, deserialize_with = "lossy_string")]
    pub result_code: String,
    #[serde(rename = "Result", default)]
    pub result: Option<DepthResult>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DepthResult {
    #[serde(default)]
    pub askinfos: Vec<AskInfo>,
    #[serde(default)]
    pub buyinfos: Vec<BuyInfo>,
    #[serde(default)]
    pub cur: Option<DepthCurrent>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AskInfo {
    #[serde(deserialize_with = "lossy_f64")]
    pub askprice: f64,
    #[serde(deserialize_with = "lossy_i64")]
    pub askvolume: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BuyInfo {
    #[serde(deserialize_with = "lossy_f64")]
    pub bidprice: f64,
    #[serde(deserialize_with = "lossy_i64")]
    pub bidvolume: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DepthCurrent {
    #[serde(deserialize_with = "lossy_f64")]
    pub price: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub increase: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub ratio: f64,
    #[serde(deserialize_with = "lossy_i64")]
    pub volume: i64,
    #[serde(deserialize_with = "lossy_f64")]
    pub amount: f64,
}

/// 五档盘口，卖盘按价格从低到高、买盘按价格从高到低排列
pub fn decode_depth(resp: DepthResponse, stock_code: &str) -> Result<Vec<MarketFive>> {
    if !result_ok(&resp.result_code) {
        return Err(AdataError::NoData(format!("百度盘口 ResultCode={}", resp.result_code)));
    }
    let Some(result) = resp.result else {
        return Ok(Vec::new());
    };
    if result.askinfos.is_empty() && result.buyinfos.is_empty() {
        return Ok(Vec::new());
    }

    let mut asks: Vec<(f64, i64)> = result
        .askinfos
        .iter()
        .map(|a| (a.askprice, a.askvolume))
        .collect();
    asks.sort_by(|a, b| a.0.total_cmp(&b.0));
    let mut bids: Vec<(f64, i64)> = result
        .buyinfos
        .iter()
        .map(|b| (b.bidprice, b.bidvolume))
        .collect();
    bids.sort_by(|a, b| b.0.total_cmp(&a.0));

    let mut five = MarketFive {
        stock_code: stock_code.to_string(),
        source: SOURCE.to_string(),
        ..Default::default()
    };
    for (i, (price, volume)) in asks.into_iter().take(5).enumerate() {
        five.sell_prices[i] = price;
        five.sell_volumes[i] = volume;
    }
    for (i, (price, volume)) in bids.into_iter().take(5).enumerate() {
        five.buy_prices[i] = price;
        five.buy_volumes[i] = volume;
    }
    if let Some(cur) = result.cur {
        five.price = cur.price;
        five.change = cur.increase;
        five.change_pct = cur.ratio;
        five.volume = cur.volume;
        five.amount = cur.amount;
    }

    Ok(vec![five])
}

// ==================== 所属板块 ====================

#[derive(Debug, Default, Deserialize)]
pub struct RelatedBlockResponse {
    #[serde(rename = "ResultCode", default, deserialize_with = "lossy_string")]
    pub result_code: String,
    /// 以股票代码为键
    #[serde(rename = "Result", default)]
    pub result: Option<BTreeMap<String, Vec<BlockGroup>>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BlockGroup {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub list: Vec<BlockItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BlockItem {
    #[serde(deserialize_with = "lossy_string")]
    pub name: String,
    #[serde(deserialize_with = "lossy_string")]
    pub describe: String,
    #[serde(deserialize_with = "lossy_string")]
    pub xcx_query: String,
}

/// 从 `xcx_query` 查询串中取出板块代码
fn block_code(xcx_query: &str) -> String {
    let query = xcx_query.split_once('?').map_or(xcx_query, |(_, q)| q);
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == "code")
        .map(|(_, v)| v.into_owned())
        .unwrap_or_default()
}

/// 行业板块（只取“行业”分组）
pub fn decode_industry(resp: RelatedBlockResponse, stock_code: &str) -> Result<Vec<IndustrySw>> {
    if !result_ok(&resp.result_code) {
        return Err(AdataError::NoData(format!("百度板块 ResultCode={}", resp.result_code)));
    }

    Ok(resp
        .result
        .unwrap_or_default()
        .into_values()
        .flatten()
        .filter(|group| group.name == "行业")
        .flat_map(|group| group.list)
        .map(|item| IndustrySw {
            stock_code: stock_code.to_string(),
            sw_code: block_code(&item.xcx_query),
            industry_name: clean_string(&item.name),
            industry_type: clean_string(&item.describe),
            source: SOURCE.to_string(),
        })
        .collect())
}
