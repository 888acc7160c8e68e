//! 东方财富
//!
//! - push2 列表接口（clist）: JSON
//! - K线、分时、资金流向: JSON 中嵌入逗号分隔的文本行
//! - 数据中心（datacenter）: JSON，字段名为大写列名

use serde::Deserialize;

use super::{bar_time, report_date, split_fields};
use crate::error::Result;
use crate::models::{
    BalanceSheet, CapitalFlow, CashFlowSheet, ConceptCode, FinanceCore, IncomeSheet, IndexCode,
    KLine, MarketMin, StockCode, StockShares,
};
use crate::services::stock::common::{
    clean_string, format_stock_code, get_exchange_by_stock_code, lossy_f64, lossy_string,
    lots_to_shares, parse_float, require_trade_time,
};

pub const SOURCE: &str = "东方财富";

/// K线、日度资金流向的最少字段数
pub const KLINE_MIN_FIELDS: usize = 11;
/// 分时的最少字段数
pub const TRENDS_MIN_FIELDS: usize = 8;
/// 分钟资金流向的最少字段数
pub const FLOW_MIN_FIELDS: usize = 6;

// ==================== clist 列表 ====================

#[derive(Debug, Default, Deserialize)]
pub struct ClistResponse {
    #[serde(default)]
    pub data: Option<ClistData>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ClistData {
    #[serde(default)]
    pub total: i64,
    #[serde(default)]
    pub diff: Vec<ClistItem>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ClistItem {
    /// 代码
    #[serde(default, deserialize_with = "lossy_string")]
    pub f12: String,
    /// 名称
    #[serde(default, deserialize_with = "lossy_string")]
    pub f14: String,
}

impl ClistResponse {
    pub fn items(self) -> Vec<ClistItem> {
        self.data.map(|d| d.diff).unwrap_or_default()
    }
}

/// A股代码列表
pub fn decode_stock_codes(resp: ClistResponse) -> Vec<StockCode> {
    resp.items()
        .into_iter()
        .filter_map(|item| {
            let code = format_stock_code(&item.f12);
            if code.is_empty() {
                return None;
            }
            Some(StockCode {
                exchange: get_exchange_by_stock_code(&code).to_string(),
                stock_code: code,
                short_name: clean_string(&item.f14),
                list_date: String::new(),
            })
        })
        .collect()
}

/// 指数代码列表
pub fn decode_index_codes(resp: ClistResponse, exchange: &str) -> Vec<IndexCode> {
    resp.items()
        .into_iter()
        .filter(|item| !item.f12.is_empty())
        .map(|item| IndexCode {
            index_code: item.f12,
            index_name: clean_string(&item.f14),
            exchange: exchange.to_string(),
        })
        .collect()
}

/// 概念板块列表
pub fn decode_concept_codes(resp: ClistResponse) -> Vec<ConceptCode> {
    resp.items()
        .into_iter()
        .filter(|item| !item.f12.is_empty())
        .map(|item| ConceptCode {
            concept_code: item.f12,
            concept_name: clean_string(&item.f14),
            reason: String::new(),
            source: SOURCE.to_string(),
        })
        .collect()
}

// ==================== K线 ====================

#[derive(Debug, Default, Deserialize)]
pub struct KlineResponse {
    #[serde(default)]
    pub data: Option<KlineData>,
}

#[derive(Debug, Default, Deserialize)]
pub struct KlineData {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub klines: Vec<String>,
}

/// K线，每行为 `日期,开,收,高,低,量(手),额,振幅,涨跌幅,涨跌额,换手率`
pub fn decode_klines(resp: KlineResponse, stock_code: &str) -> Result<Vec<KLine>> {
    let lines = resp.data.map(|d| d.klines).unwrap_or_default();
    let mut records = Vec::with_capacity(lines.len());

    for line in &lines {
        let Some(f) = split_fields(line, ',', KLINE_MIN_FIELDS) else {
            log::debug!("跳过格式不正确的K线: {}", line);
            continue;
        };
        let close = parse_float(f[2]);
        let change = parse_float(f[9]);
        records.push(KLine {
            stock_code: stock_code.to_string(),
            trade_date: bar_time(f[0], "东方财富K线")?,
            open: parse_float(f[1]),
            close,
            high: parse_float(f[3]),
            low: parse_float(f[4]),
            volume: lots_to_shares(f[5]),
            amount: parse_float(f[6]),
            change_pct: parse_float(f[8]),
            change,
            turnover_ratio: parse_float(f[10]),
            pre_close: close - change,
        });
    }

    Ok(records)
}

// ==================== 分时 ====================

#[derive(Debug, Default, Deserialize)]
pub struct TrendsResponse {
    #[serde(default)]
    pub data: Option<TrendsData>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TrendsData {
    #[serde(default, rename = "preClose", deserialize_with = "lossy_f64")]
    pub pre_close: f64,
    #[serde(default)]
    pub trends: Vec<String>,
}

/// 分时，每行为 `时间,开,现价,高,低,量(手),额,均价`
pub fn decode_trends(resp: TrendsResponse, stock_code: &str) -> Result<Vec<MarketMin>> {
    let Some(data) = resp.data else {
        return Ok(Vec::new());
    };
    let pre_close = data.pre_close;
    let mut records = Vec::with_capacity(data.trends.len());

    for line in &data.trends {
        let Some(f) = split_fields(line, ',', TRENDS_MIN_FIELDS) else {
            log::debug!("跳过格式不正确的分时数据: {}", line);
            continue;
        };
        let price = parse_float(f[2]);
        let change = if pre_close != 0.0 { price - pre_close } else { 0.0 };
        let change_pct = if pre_close != 0.0 { change / pre_close * 100.0 } else { 0.0 };
        records.push(MarketMin {
            stock_code: stock_code.to_string(),
            trade_time: require_trade_time(f[0], "东方财富分时")?,
            price,
            change,
            change_pct,
            avg_price: parse_float(f[7]),
            volume: lots_to_shares(f[5]),
            amount: parse_float(f[6]),
        });
    }

    Ok(records)
}

// ==================== 资金流向 ====================

#[derive(Debug, Default, Deserialize)]
pub struct FlowResponse {
    #[serde(default)]
    pub data: Option<FlowData>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FlowData {
    #[serde(default)]
    pub klines: Vec<String>,
}

fn flow_record(f: &[&str], stock_code: &str, trade_date: String) -> CapitalFlow {
    CapitalFlow {
        stock_code: stock_code.to_string(),
        trade_date,
        main_net_inflow: parse_float(f[1]),
        sm_net_inflow: parse_float(f[2]),
        mid_net_inflow: parse_float(f[3]),
        lg_net_inflow: parse_float(f[4]),
        max_net_inflow: parse_float(f[5]),
        main_net_inflow_rate: f.get(6).map_or(0.0, |v| parse_float(v)),
    }
}

/// 分钟资金流向，每行为 `时间,主力,小单,中单,大单,超大单,...`
pub fn decode_flow_min(resp: FlowResponse, stock_code: &str) -> Result<Vec<CapitalFlow>> {
    let lines = resp.data.map(|d| d.klines).unwrap_or_default();
    let mut records = Vec::with_capacity(lines.len());
    for line in &lines {
        let Some(f) = split_fields(line, ',', FLOW_MIN_FIELDS) else {
            continue;
        };
        let time = require_trade_time(f[0], "东方财富分钟资金流向")?;
        let mut record = flow_record(&f, stock_code, time);
        // 分钟数据没有占比
        record.main_net_inflow_rate = 0.0;
        records.push(record);
    }
    Ok(records)
}

/// 日度资金流向，每行为 `日期,主力,小单,中单,大单,超大单,主力占比,...`
pub fn decode_flow_day(resp: FlowResponse, stock_code: &str) -> Result<Vec<CapitalFlow>> {
    let lines = resp.data.map(|d| d.klines).unwrap_or_default();
    let mut records = Vec::with_capacity(lines.len());
    for line in &lines {
        let Some(f) = split_fields(line, ',', KLINE_MIN_FIELDS) else {
            continue;
        };
        let date = bar_time(f[0], "东方财富日度资金流向")?;
        records.push(flow_record(&f, stock_code, date));
    }
    Ok(records)
}

// ==================== 数据中心 ====================

/// 数据中心统一外层结构，无数据时 result 为 null
#[derive(Debug, Deserialize)]
pub struct DatacenterResponse<T> {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default = "Option::default")]
    pub result: Option<DatacenterResult<T>>,
}

#[derive(Debug, Deserialize)]
pub struct DatacenterResult<T> {
    #[serde(default)]
    pub pages: i64,
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

impl<T> DatacenterResponse<T> {
    pub fn rows(self) -> Vec<T> {
        if !self.success && self.code != 0 {
            log::debug!("数据中心返回空结果: code={} {}", self.code, self.message);
        }
        self.result.map(|r| r.data).unwrap_or_default()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct ConceptRow {
    #[serde(deserialize_with = "lossy_string")]
    pub new_board_code: String,
    #[serde(deserialize_with = "lossy_string")]
    pub board_name: String,
    #[serde(deserialize_with = "lossy_string")]
    pub selected_board_reason: String,
}

/// 个股所属概念
pub fn decode_stock_concepts(resp: DatacenterResponse<ConceptRow>) -> Vec<ConceptCode> {
    resp.rows()
        .into_iter()
        .filter(|row| !row.new_board_code.is_empty())
        .map(|row| ConceptCode {
            concept_code: row.new_board_code,
            concept_name: clean_string(&row.board_name),
            reason: clean_string(&row.selected_board_reason),
            source: SOURCE.to_string(),
        })
        .collect()
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct SharesRow {
    #[serde(deserialize_with = "lossy_string")]
    pub security_code: String,
    #[serde(deserialize_with = "lossy_string")]
    pub end_date: String,
    #[serde(deserialize_with = "lossy_f64")]
    pub total_shares: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub limited_shares: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub listed_a_shares: f64,
    #[serde(deserialize_with = "lossy_string")]
    pub change_reason: String,
}

/// 股本结构，按变动日期倒序
pub fn decode_shares(resp: DatacenterResponse<SharesRow>, stock_code: &str) -> Vec<StockShares> {
    resp.rows()
        .into_iter()
        .map(|row| StockShares {
            stock_code: match format_stock_code(&row.security_code) {
                code if code.is_empty() => stock_code.to_string(),
                code => code,
            },
            change_date: report_date(&row.end_date),
            total_shares: row.total_shares,
            limit_shares: row.limited_shares,
            list_a_shares: row.listed_a_shares,
            change_reason: clean_string(&row.change_reason),
        })
        .collect()
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FinanceCoreRow {
    #[serde(rename = "SECURITY_CODE", deserialize_with = "lossy_string")]
    pub security_code: String,
    #[serde(rename = "SECURITY_NAME_ABBR", deserialize_with = "lossy_string")]
    pub security_name_abbr: String,
    #[serde(rename = "REPORT_DATE", deserialize_with = "lossy_string")]
    pub report_date: String,
    #[serde(rename = "REPORT_TYPE", deserialize_with = "lossy_string")]
    pub report_type: String,
    #[serde(rename = "NOTICE_DATE", deserialize_with = "lossy_string")]
    pub notice_date: String,
    #[serde(rename = "EPSJB", deserialize_with = "lossy_f64")]
    pub epsjb: f64,
    #[serde(rename = "EPSKCJB", deserialize_with = "lossy_f64")]
    pub epskcjb: f64,
    #[serde(rename = "EPSXS", deserialize_with = "lossy_f64")]
    pub epsxs: f64,
    #[serde(rename = "BPS", deserialize_with = "lossy_f64")]
    pub bps: f64,
    #[serde(rename = "MGZBGJ", deserialize_with = "lossy_f64")]
    pub mgzbgj: f64,
    #[serde(rename = "MGWFPLR", deserialize_with = "lossy_f64")]
    pub mgwfplr: f64,
    #[serde(rename = "MGJYXJJE", deserialize_with = "lossy_f64")]
    pub mgjyxjje: f64,
    #[serde(rename = "TOTALOPERATEREVE", deserialize_with = "lossy_f64")]
    pub totaloperatereve: f64,
    #[serde(rename = "MLR", deserialize_with = "lossy_f64")]
    pub mlr: f64,
    #[serde(rename = "PARENTNETPROFIT", deserialize_with = "lossy_f64")]
    pub parentnetprofit: f64,
    #[serde(rename = "KCFJCXSYJLR", deserialize_with = "lossy_f64")]
    pub kcfjcxsyjlr: f64,
    #[serde(rename = "TOTALOPERATEREVETZ", deserialize_with = "lossy_f64")]
    pub totaloperaterevetz: f64,
    #[serde(rename = "PARENTNETPROFITTZ", deserialize_with = "lossy_f64")]
    pub parentnetprofittz: f64,
    #[serde(rename = "KCFJCXSYJLRTZ", deserialize_with = "lossy_f64")]
    pub kcfjcxsyjlrtz: f64,
    #[serde(rename = "YYZSRGDHBZC", deserialize_with = "lossy_f64")]
    pub yyzsrgdhbzc: f64,
    #[serde(rename = "NETPROFITRPHBZC", deserialize_with = "lossy_f64")]
    pub netprofitrphbzc: f64,
    #[serde(rename = "KFJLRGDHBZC", deserialize_with = "lossy_f64")]
    pub kfjlrgdhbzc: f64,
    #[serde(rename = "ROEJQ", deserialize_with = "lossy_f64")]
    pub roejq: f64,
    #[serde(rename = "ROEKCJQ", deserialize_with = "lossy_f64")]
    pub roekcjq: f64,
    #[serde(rename = "ZZCJLL", deserialize_with = "lossy_f64")]
    pub zzcjll: f64,
    #[serde(rename = "XSMLL", deserialize_with = "lossy_f64")]
    pub xsmll: f64,
    #[serde(rename = "XSJLL", deserialize_with = "lossy_f64")]
    pub xsjll: f64,
    #[serde(rename = "YSZKYYSR", deserialize_with = "lossy_f64")]
    pub yszkyysr: f64,
    #[serde(rename = "XSJXLYYSR", deserialize_with = "lossy_f64")]
    pub xsjxlyysr: f64,
    #[serde(rename = "JYXJLYYSR", deserialize_with = "lossy_f64")]
    pub jyxjlyysr: f64,
    #[serde(rename = "TAXRATE", deserialize_with = "lossy_f64")]
    pub taxrate: f64,
    #[serde(rename = "LD", deserialize_with = "lossy_f64")]
    pub ld: f64,
    #[serde(rename = "SD", deserialize_with = "lossy_f64")]
    pub sd: f64,
    #[serde(rename = "XJLLB", deserialize_with = "lossy_f64")]
    pub xjllb: f64,
    #[serde(rename = "ZCFZL", deserialize_with = "lossy_f64")]
    pub zcfzl: f64,
    #[serde(rename = "QYCS", deserialize_with = "lossy_f64")]
    pub qycs: f64,
    #[serde(rename = "CQBL", deserialize_with = "lossy_f64")]
    pub cqbl: f64,
    #[serde(rename = "ZZCZZTS", deserialize_with = "lossy_f64")]
    pub zzczzts: f64,
    #[serde(rename = "CHZZTS", deserialize_with = "lossy_f64")]
    pub chzzts: f64,
    #[serde(rename = "YSZKZZTS", deserialize_with = "lossy_f64")]
    pub yszkzzts: f64,
    #[serde(rename = "TOAZZL", deserialize_with = "lossy_f64")]
    pub toazzl: f64,
    #[serde(rename = "CHZZL", deserialize_with = "lossy_f64")]
    pub chzzl: f64,
    #[serde(rename = "YSZKZZL", deserialize_with = "lossy_f64")]
    pub yszkzzl: f64,
}

/// 核心财务指标
pub fn decode_finance_core(resp: DatacenterResponse<FinanceCoreRow>) -> Vec<FinanceCore> {
    resp.rows()
        .into_iter()
        .map(|r| FinanceCore {
            stock_code: format_stock_code(&r.security_code),
            short_name: r.security_name_abbr,
            report_date: report_date(&r.report_date),
            report_type: r.report_type,
            notice_date: report_date(&r.notice_date),
            basic_eps: r.epsjb,
            diluted_eps: r.epskcjb,
            non_gaap_eps: r.epsxs,
            net_asset_ps: r.bps,
            cap_reserve_ps: r.mgzbgj,
            undist_profit_ps: r.mgwfplr,
            oper_cf_ps: r.mgjyxjje,
            total_rev: r.totaloperatereve,
            gross_profit: r.mlr,
            net_profit_attr_sh: r.parentnetprofit,
            non_gaap_net_profit: r.kcfjcxsyjlr,
            total_rev_yoy_gr: r.totaloperaterevetz,
            net_profit_yoy_gr: r.parentnetprofittz,
            non_gaap_net_profit_yoy_gr: r.kcfjcxsyjlrtz,
            total_rev_qoq_gr: r.yyzsrgdhbzc,
            net_profit_qoq_gr: r.netprofitrphbzc,
            non_gaap_net_profit_qoq_gr: r.kfjlrgdhbzc,
            roe_wtd: r.roejq,
            roe_non_gaap_wtd: r.roekcjq,
            roa_wtd: r.zzcjll,
            gross_margin: r.xsmll,
            net_margin: r.xsjll,
            adv_receipts_to_rev: r.yszkyysr,
            net_cf_sales_to_rev: r.xsjxlyysr,
            oper_cf_to_rev: r.jyxjlyysr,
            eff_tax_rate: r.taxrate,
            curr_ratio: r.ld,
            quick_ratio: r.sd,
            cash_flow_ratio: r.xjllb,
            asset_liab_ratio: r.zcfzl,
            equity_multiplier: r.qycs,
            equity_ratio: r.cqbl,
            total_asset_turn_days: r.zzczzts,
            inv_turn_days: r.chzzts,
            acct_recv_turn_days: r.yszkzzts,
            total_asset_turn_rate: r.toazzl,
            inv_turn_rate: r.chzzl,
            acct_recv_turn_rate: r.yszkzzl,
        })
        .collect()
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct BalanceRow {
    #[serde(deserialize_with = "lossy_string")]
    pub security_code: String,
    #[serde(deserialize_with = "lossy_string")]
    pub report_date: String,
    #[serde(deserialize_with = "lossy_string")]
    pub report_type: String,
    #[serde(deserialize_with = "lossy_string")]
    pub notice_date: String,
    #[serde(deserialize_with = "lossy_f64")]
    pub total_assets: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub current_assets: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub non_current_assets: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub cash_and_cash_equivalents: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub accounts_receivable: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub inventory: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub fixed_assets: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub intangible_assets: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub total_liabilities: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub current_liabilities: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub non_current_liabilities: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub short_term_borrowing: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub accounts_payable: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub long_term_borrowing: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub total_equity: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub share_capital: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub capital_reserve: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub retained_earnings: f64,
}

/// 资产负债表
pub fn decode_balance(resp: DatacenterResponse<BalanceRow>) -> Vec<BalanceSheet> {
    resp.rows()
        .into_iter()
        .map(|r| BalanceSheet {
            stock_code: format_stock_code(&r.security_code),
            report_date: report_date(&r.report_date),
            report_type: r.report_type,
            notice_date: report_date(&r.notice_date),
            total_assets: r.total_assets,
            current_assets: r.current_assets,
            non_current_assets: r.non_current_assets,
            cash_and_cash_equivalents: r.cash_and_cash_equivalents,
            accounts_receivable: r.accounts_receivable,
            inventory: r.inventory,
            fixed_assets: r.fixed_assets,
            intangible_assets: r.intangible_assets,
            total_liabilities: r.total_liabilities,
            current_liabilities: r.current_liabilities,
            non_current_liabilities: r.non_current_liabilities,
            short_term_borrowing: r.short_term_borrowing,
            accounts_payable: r.accounts_payable,
            long_term_borrowing: r.long_term_borrowing,
            total_equity: r.total_equity,
            share_capital: r.share_capital,
            capital_reserve: r.capital_reserve,
            retained_earnings: r.retained_earnings,
        })
        .collect()
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct CashFlowRow {
    #[serde(deserialize_with = "lossy_string")]
    pub security_code: String,
    #[serde(deserialize_with = "lossy_string")]
    pub report_date: String,
    #[serde(deserialize_with = "lossy_string")]
    pub report_type: String,
    #[serde(deserialize_with = "lossy_string")]
    pub notice_date: String,
    #[serde(deserialize_with = "lossy_f64")]
    pub net_cash_flows_oper_act: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub cash_inflows_oper_act: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub cash_outflows_oper_act: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub sales_services_render: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub tax_refunds: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub purchase_goods_services: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub payment_staff_benefits: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub payments_taxes: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub net_cash_flows_inv_act: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub cash_inflows_inv_act: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub cash_outflows_inv_act: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub purchase_assets: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub invest_payments: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub net_cash_flows_fin_act: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub cash_inflows_fin_act: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub cash_outflows_fin_act: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub borrowings_received: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub repayment_borrowings: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub dividends_paid: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub net_increase_cash: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub cash_begin_period: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub cash_end_period: f64,
}

/// 现金流量表
pub fn decode_cash_flow(resp: DatacenterResponse<CashFlowRow>) -> Vec<CashFlowSheet> {
    resp.rows()
        .into_iter()
        .map(|r| CashFlowSheet {
            stock_code: format_stock_code(&r.security_code),
            report_date: report_date(&r.report_date),
            report_type: r.report_type,
            notice_date: report_date(&r.notice_date),
            net_cash_flows_oper_act: r.net_cash_flows_oper_act,
            cash_inflows_oper_act: r.cash_inflows_oper_act,
            cash_outflows_oper_act: r.cash_outflows_oper_act,
            sales_services_render: r.sales_services_render,
            tax_refunds: r.tax_refunds,
            purchase_goods_services: r.purchase_goods_services,
            payment_staff_benefits: r.payment_staff_benefits,
            payments_taxes: r.payments_taxes,
            net_cash_flows_inv_act: r.net_cash_flows_inv_act,
            cash_inflows_inv_act: r.cash_inflows_inv_act,
            cash_outflows_inv_act: r.cash_outflows_inv_act,
            purchase_assets: r.purchase_assets,
            invest_payments: r.invest_payments,
            net_cash_flows_fin_act: r.net_cash_flows_fin_act,
            cash_inflows_fin_act: r.cash_inflows_fin_act,
            cash_outflows_fin_act: r.cash_outflows_fin_act,
            borrowings_received: r.borrowings_received,
            repayment_borrowings: r.repayment_borrowings,
            dividends_paid: r.dividends_paid,
            net_increase_cash: r.net_increase_cash,
            cash_begin_period: r.cash_begin_period,
            cash_end_period: r.cash_end_period,
        })
        .collect()
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct ProfitRow {
    #[serde(deserialize_with = "lossy_string")]
    pub security_code: String,
    #[serde(deserialize_with = "lossy_string")]
    pub report_date: String,
    #[serde(deserialize_with = "lossy_string")]
    pub report_type: String,
    #[serde(deserialize_with = "lossy_string")]
    pub notice_date: String,
    #[serde(deserialize_with = "lossy_f64")]
    pub total_operating_revenue: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub operating_revenue: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub interest_income: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub premiums_earned: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub commission_income: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub total_operating_cost: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub operating_cost: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub interest_expense: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub commission_expense: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub surrender_value: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub net_compensation_expense: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub net_amortization_expense: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub policy_bonus_expense: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub taxes_surcharges: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub sales_expense: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub admin_expense: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub fin_expense: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub asset_impairment_loss: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub credit_impairment_loss: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub gross_profit: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub operating_profit: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub non_operating_income: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub non_operating_expense: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub loss_disposal_assets: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub total_profit: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub income_tax_expense: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub net_profit: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub net_profit_attr_sh: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub net_profit_minority: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub net_profit_continuing: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub net_profit_discontinued: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub basic_eps: f64,
    #[serde(deserialize_with = "lossy_f64")]
    pub diluted_eps: f64,
}

/// 利润表
pub fn decode_profit(resp: DatacenterResponse<ProfitRow>) -> Vec<IncomeSheet> {
    resp.rows()
        .into_iter()
        .map(|r| IncomeSheet {
            stock_code: format_stock_code(&r.security_code),
            report_date: report_date(&r.report_date),
            report_type: r.report_type,
            notice_date: report_date(&r.notice_date),
            total_operating_revenue: r.total_operating_revenue,
            operating_revenue: r.operating_revenue,
            interest_income: r.interest_income,
            premiums_earned: r.premiums_earned,
            commission_income: r.commission_income,
            total_operating_cost: r.total_operating_cost,
            operating_cost: r.operating_cost,
            interest_expense: r.interest_expense,
            commission_expense: r.commission_expense,
            surrender_value: r.surrender_value,
            net_compensation_expense: r.net_compensation_expense,
            net_amortization_expense: r.net_amortization_expense,
            policy_bonus_expense: r.policy_bonus_expense,
            taxes_surcharges: r.taxes_surcharges,
            sales_expense: r.sales_expense,
            admin_expense: r.admin_expense,
            fin_expense: r.fin_expense,
            asset_impairment_loss: r.asset_impairment_loss,
            credit_impairment_loss: r.credit_impairment_loss,
            gross_profit: r.gross_profit,
            operating_profit: r.operating_profit,
            non_operating_income: r.non_operating_income,
            non_operating_expense: r.non_operating_expense,
            loss_disposal_assets: r.loss_disposal_assets,
            total_profit: r.total_profit,
            income_tax_expense: r.income_tax_expense,
            net_profit: r.net_profit,
            net_profit_attr_sh: r.net_profit_attr_sh,
            net_profit_minority: r.net_profit_minority,
            net_profit_continuing: r.net_profit_continuing,
            net_profit_discontinued: r.net_profit_discontinued,
            basic_eps: r.basic_eps,
            diluted_eps: r.diluted_eps,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse<T: serde::de::DeserializeOwned>(json: &str) -> T {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_decode_stock_codes() {
        let resp: ClistResponse = parse(
            r#"{"rc":0,"data":{"total":3,"diff":[
                {"f12":"000001","f14":"平安银行"},
                {"f12":"600036","f14":" 招商 银行 "},
                {"f12":"-","f14":"无效"}
            ]}}"#,
        );
        let codes = decode_stock_codes(resp);
        assert_eq!(codes.len(), 2);
        assert_eq!(codes[0].exchange, "SZ");
        assert_eq!(codes[1].short_name, "招商 银行");
        assert_eq!(codes[1].exchange, "SH");
    }

    #[test]
    fn test_clist_without_data_is_empty() {
        let resp: ClistResponse = parse(r#"{"rc":0,"data":null}"#);
        assert!(decode_concept_codes(resp).is_empty());
    }

    #[test]
    fn test_decode_klines_skips_malformed_line() {
        let resp: KlineResponse = parse(
            r#"{"data":{"code":"000001","name":"平安银行","klines":[
                "2024-01-02,9.39,9.21,9.42,9.21,1158366,1075742252.45,2.24,-1.92,-0.18,0.60",
                "2024-01-03,9.19",
                "2024-01-04,9.19,9.11,9.19,9.08,1023142,931238811.33,1.19,-1.09,-0.10,0.53"
            ]}}"#,
        );
        let bars = decode_klines(resp, "000001").unwrap();
        assert_eq!(bars.len(), 2);
        let first = &bars[0];
        assert_eq!(first.trade_date, "2024-01-02");
        assert_eq!(first.close, 9.21);
        assert_eq!(first.volume, 115_836_600);
        assert_eq!(first.change_pct, -1.92);
        assert_eq!(first.change, -0.18);
        assert!((first.pre_close - 9.39).abs() < 1e-9);
    }

    #[test]
    fn test_decode_klines_oversized_volume_saturates() {
        let resp: KlineResponse = parse(
            r#"{"data":{"klines":["2024-01-02,1,1,1,1,99999999999999999999,1,1,1,1,1"]}}"#,
        );
        let bars = decode_klines(resp, "000001").unwrap();
        assert_eq!(bars[0].volume, i64::MAX);
    }

    #[test]
    fn test_decode_klines_bad_date_fails_endpoint() {
        let resp: KlineResponse = parse(
            r#"{"data":{"klines":["bad-date,1,1,1,1,1,1,1,1,1,1"]}}"#,
        );
        assert_eq!(decode_klines(resp, "000001").unwrap_err().code(), 20002);
    }

    #[test]
    fn test_decode_minute_klines() {
        let resp: KlineResponse = parse(
            r#"{"data":{"klines":["2024-01-02 09:35,9.39,9.30,9.40,9.29,10,100,1,1,1,1"]}}"#,
        );
        let bars = decode_klines(resp, "000001").unwrap();
        assert_eq!(bars[0].trade_date, "2024-01-02T09:35:00");
    }

    #[test]
    fn test_decode_trends() {
        let resp: TrendsResponse = parse(
            r#"{"data":{"preClose":10.0,"trends":[
                "2024-01-02 09:30,10.00,10.10,10.10,10.00,120,121200.00,10.05",
                "garbage",
                "2024-01-02 09:31,10.10,9.90,10.10,9.90,80,79200.00,10.02"
            ]}}"#,
        );
        let mins = decode_trends(resp, "000001").unwrap();
        assert_eq!(mins.len(), 2);
        assert_eq!(mins[0].trade_time, "2024-01-02T09:30:00");
        assert_eq!(mins[0].volume, 12_000);
        assert!((mins[0].change - 0.1).abs() < 1e-9);
        assert!((mins[1].change_pct + 1.0).abs() < 1e-9);
        assert_eq!(mins[1].avg_price, 10.02);
    }

    #[test]
    fn test_decode_trends_without_data() {
        let resp: TrendsResponse = parse(r#"{"rc":102,"data":null}"#);
        assert!(decode_trends(resp, "000001").unwrap().is_empty());
    }

    #[test]
    fn test_decode_flow() {
        let resp: FlowResponse = parse(
            r#"{"data":{"klines":[
                "2024-01-02 09:31,-100.0,20.0,30.0,-40.0,-60.0",
                "2024-01-02 09:32,1"
            ]}}"#,
        );
        let flows = decode_flow_min(resp, "000001").unwrap();
        assert_eq!(flows.len(), 1);
        assert_eq!(flows[0].main_net_inflow, -100.0);
        assert_eq!(flows[0].sm_net_inflow, 20.0);
        assert_eq!(flows[0].max_net_inflow, -60.0);
        assert_eq!(flows[0].main_net_inflow_rate, 0.0);

        let resp: FlowResponse = parse(
            r#"{"data":{"klines":[
                "2024-01-02,-100.0,20.0,30.0,-40.0,-60.0,-1.5,0.3,0.4,-0.6,-0.9"
            ]}}"#,
        );
        let flows = decode_flow_day(resp, "000001").unwrap();
        assert_eq!(flows[0].trade_date, "2024-01-02");
        assert_eq!(flows[0].main_net_inflow_rate, -1.5);
    }

    #[test]
    fn test_datacenter_empty_result() {
        let resp: DatacenterResponse<ConceptRow> =
            parse(r#"{"version":null,"result":null,"success":false,"message":"返回数据为空","code":9201}"#);
        assert!(decode_stock_concepts(resp).is_empty());
    }

    #[test]
    fn test_decode_stock_concepts() {
        let resp: DatacenterResponse<ConceptRow> = parse(
            r#"{"success":true,"code":0,"result":{"pages":1,"data":[
                {"NEW_BOARD_CODE":"BK0475","BOARD_NAME":"银行","SELECTED_BOARD_REASON":"主营银行业务"},
                {"NEW_BOARD_CODE":null,"BOARD_NAME":"缺少代码"}
            ]}}"#,
        );
        let concepts = decode_stock_concepts(resp);
        assert_eq!(concepts.len(), 1);
        assert_eq!(concepts[0].concept_code, "BK0475");
        assert_eq!(concepts[0].reason, "主营银行业务");
    }

    #[test]
    fn test_decode_shares_and_finance() {
        let resp: DatacenterResponse<SharesRow> = parse(
            r#"{"success":true,"code":0,"result":{"data":[
                {"SECURITY_CODE":"000001","END_DATE":"2023-12-31 00:00:00","TOTAL_SHARES":19405918198,
                 "LIMITED_SHARES":null,"LISTED_A_SHARES":"19405546950","CHANGE_REASON":"定期报告"}
            ]}}"#,
        );
        let shares = decode_shares(resp, "000001");
        assert_eq!(shares[0].change_date, "2023-12-31");
        assert_eq!(shares[0].limit_shares, 0.0);
        assert_eq!(shares[0].list_a_shares, 19_405_546_950.0);

        let resp: DatacenterResponse<FinanceCoreRow> = parse(
            r#"{"success":true,"code":0,"result":{"data":[
                {"SECURITY_CODE":"000001","SECURITY_NAME_ABBR":"平安银行","REPORT_DATE":"2023-12-31 00:00:00",
                 "REPORT_TYPE":"年报","EPSJB":2.25,"ROEJQ":"11.38","ZCFZL":"-"}
            ]}}"#,
        );
        let core = decode_finance_core(resp);
        assert_eq!(core[0].report_type, "年报");
        assert_eq!(core[0].basic_eps, 2.25);
        assert_eq!(core[0].roe_wtd, 11.38);
        assert_eq!(core[0].asset_liab_ratio, 0.0);
    }

    #[test]
    fn test_decode_profit_normalizes_code() {
        let resp: DatacenterResponse<ProfitRow> = parse(
            r#"{"success":true,"code":0,"result":{"data":[
                {"SECURITY_CODE":"1","REPORT_DATE":"2023-12-31 00:00:00","REPORT_TYPE":"年报",
                 "TOTAL_OPERATING_REVENUE":164699000000,"NET_PROFIT_ATTR_SH":"46455000000","BASIC_EPS":2.25,
                 "FIN_EXPENSE":null}
            ]}}"#,
        );
        let income = decode_profit(resp);
        assert_eq!(income[0].stock_code, "000001");
        assert_eq!(income[0].report_date, "2023-12-31");
        assert_eq!(income[0].total_operating_revenue, 164_699_000_000.0);
        assert_eq!(income[0].net_profit_attr_sh, 46_455_000_000.0);
        assert_eq!(income[0].fin_expense, 0.0);

        let resp: DatacenterResponse<FinanceCoreRow> = parse(
            r#"{"success":true,"code":0,"result":{"data":[{"SECURITY_CODE":"600036.SH","REPORT_DATE":"2023-12-31"}]}}"#,
        );
        assert_eq!(decode_finance_core(resp)[0].stock_code, "600036");
    }
}
