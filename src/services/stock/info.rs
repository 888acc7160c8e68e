//! 代码表、概念、股本、行业与交易日历

use chrono::Datelike;

use super::common::{
    beijing_now, compile_exchange_by_stock_code, ensure_stock_code, BAIDU_MARKET_RANK_API,
    BAIDU_RELATED_BLOCK_API, EAST_CLIST_API, SINA_NODE_DATA_API, SZSE_CALENDAR_API,
};
use super::decoders::eastmoney::{ClistResponse, ConceptRow, SharesRow};
use super::decoders::sina::NodeItem;
use super::decoders::{baidu, eastmoney, sina, szse};
use super::StockService;
use crate::error::{AdataError, Result};
use crate::models::{ConceptCode, IndexCode, IndustrySw, StockCode, StockShares, TradeCalendar};
use crate::services::chain::{paginate, Acceptance, Provider, SourceChain};
use crate::services::client::HttpRequest;
use crate::services::headers;

/// 全市场代码表至少应有的数量，少于此数视为数据不完整
pub const MIN_STOCK_COUNT: usize = 5000;

const BAIDU_RANK_PAGE_SIZE: usize = 200;
const BAIDU_RANK_MAX_PAGES: usize = 50;
const EAST_CODE_PAGE_SIZE: usize = 50;
const EAST_CODE_MAX_PAGES: usize = 200;
const SINA_NODE_PAGE_SIZE: usize = 80;
const SINA_NODE_MAX_PAGES: usize = 200;
const EAST_INDEX_PAGE_SIZE: usize = 100;
const EAST_INDEX_MAX_PAGES: usize = 10;
const EAST_CONCEPT_PAGE_SIZE: usize = 100;
const EAST_CONCEPT_MAX_PAGES: usize = 50;

const EAST_CLIST_UT: &str = "bd1d9ddb04089700cf9c27f6f7426281";
const EAST_A_SHARE_FS: &str = "m:0 t:6,m:0 t:80,m:1 t:2,m:1 t:23,m:0 t:81 s:2048";

/// 东方财富指数列表的市场过滤条件
const EAST_INDEX_MARKETS: [(&str, &str); 2] = [("SH", "m:1+s:2"), ("SZ", "m:0+t:5")];

/// 最早可查询的日历年份
const MIN_CALENDAR_YEAR: i32 = 1990;

impl StockService {
    // ==================== 代码表 ====================

    /// 全部 A 股代码
    ///
    /// 百度、东方财富需返回至少 `MIN_STOCK_COUNT` 条才被接受，新浪作为兜底
    pub async fn all_code(&self) -> Result<Vec<StockCode>> {
        SourceChain::new("all_code")
            .provider(Provider::new(
                "baidu",
                Acceptance::AtLeast(MIN_STOCK_COUNT),
                move || self.all_code_baidu(),
            ))
            .provider(Provider::new(
                "eastmoney",
                Acceptance::AtLeast(MIN_STOCK_COUNT),
                move || self.all_code_east(),
            ))
            .provider(Provider::new("sina", Acceptance::NonEmpty, move || {
                self.all_code_sina()
            }))
            .run()
            .await
    }

    async fn all_code_baidu(&self) -> Result<Vec<StockCode>> {
        paginate(
            "百度代码表",
            BAIDU_RANK_PAGE_SIZE,
            BAIDU_RANK_MAX_PAGES,
            self.page_delay,
            move |page| self.baidu_rank_page(page),
        )
        .await
    }

    async fn baidu_rank_page(&self, page: usize) -> Result<Vec<StockCode>> {
        let request = HttpRequest::get(BAIDU_MARKET_RANK_API)
            .params([
                ("sort_type", "1".to_string()),
                ("sort_key", "14".to_string()),
                ("from_mid", "1".to_string()),
                ("pn", ((page - 1) * BAIDU_RANK_PAGE_SIZE).to_string()),
                ("rn", BAIDU_RANK_PAGE_SIZE.to_string()),
                ("group", "pclist".to_string()),
                ("type", "ab".to_string()),
                ("finClientType", "pc".to_string()),
            ])
            .headers(headers::baidu());
        baidu::decode_rank(self.http.get_json(&request).await?)
    }

    async fn all_code_east(&self) -> Result<Vec<StockCode>> {
        paginate(
            "东方财富代码表",
            EAST_CODE_PAGE_SIZE,
            EAST_CODE_MAX_PAGES,
            self.page_delay,
            move |page| async move {
                let resp = self
                    .east_clist_page(page, EAST_CODE_PAGE_SIZE, EAST_A_SHARE_FS, "f12,f14", "f3")
                    .await?;
                Ok(eastmoney::decode_stock_codes(resp))
            },
        )
        .await
    }

    async fn all_code_sina(&self) -> Result<Vec<StockCode>> {
        paginate(
            "新浪代码表",
            SINA_NODE_PAGE_SIZE,
            SINA_NODE_MAX_PAGES,
            self.page_delay,
            move |page| self.sina_node_page(page),
        )
        .await
    }

    async fn sina_node_page(&self, page: usize) -> Result<Vec<StockCode>> {
        let request = HttpRequest::get(SINA_NODE_DATA_API)
            .params([
                ("page", page.to_string()),
                ("num", SINA_NODE_PAGE_SIZE.to_string()),
                ("sort", "symbol".to_string()),
                ("asc", "1".to_string()),
                ("node", "hs_a".to_string()),
                ("symbol", String::new()),
                ("_s_r_a", "page".to_string()),
            ])
            .headers(headers::sina());
        let text = self.http.get_gbk_text(&request).await?;
        // 超出末页时返回 null
        let items: Option<Vec<NodeItem>> = serde_json::from_str(text.trim())
            .map_err(|e| AdataError::parse("新浪代码表", e, &text))?;
        Ok(sina::decode_node_codes(items.unwrap_or_default()))
    }

    /// 东方财富 clist 单页
    async fn east_clist_page(
        &self,
        page: usize,
        page_size: usize,
        fs: &str,
        fields: &str,
        fid: &str,
    ) -> Result<ClistResponse> {
        let request = HttpRequest::get(EAST_CLIST_API)
            .params([
                ("pn", page.to_string()),
                ("pz", page_size.to_string()),
                ("po", "1".to_string()),
                ("np", "1".to_string()),
                ("ut", EAST_CLIST_UT.to_string()),
                ("fltt", "2".to_string()),
                ("invt", "2".to_string()),
                ("fid", fid.to_string()),
                ("fs", fs.to_string()),
                ("fields", fields.to_string()),
            ])
            .headers(headers::east());
        self.http.get_json(&request).await
    }

    /// 上海、深圳两市指数
    ///
    /// 单个市场失败只记录日志，两个市场都失败才返回错误
    pub async fn all_index_code(&self) -> Result<Vec<IndexCode>> {
        SourceChain::new("all_index_code")
            .provider(Provider::new("eastmoney", Acceptance::NonEmpty, move || {
                self.all_index_code_east()
            }))
            .run()
            .await
    }

    async fn all_index_code_east(&self) -> Result<Vec<IndexCode>> {
        let mut all = Vec::new();
        let mut last_error = None;

        for (exchange, fs) in EAST_INDEX_MARKETS {
            let result = paginate(
                "东方财富指数",
                EAST_INDEX_PAGE_SIZE,
                EAST_INDEX_MAX_PAGES,
                self.page_delay,
                move |page| async move {
                    let resp = self
                        .east_clist_page(page, EAST_INDEX_PAGE_SIZE, fs, "f12,f14", "f3")
                        .await?;
                    Ok(eastmoney::decode_index_codes(resp, exchange))
                },
            )
            .await;

            match result {
                Ok(indexes) => all.extend(indexes),
                Err(e) => {
                    log::warn!("{} 指数列表获取失败: {}", exchange, e);
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if all.is_empty() => Err(e),
            _ => Ok(all),
        }
    }

    // ==================== 概念 ====================

    /// 东方财富全部概念板块
    pub async fn all_concept_code_east(&self) -> Result<Vec<ConceptCode>> {
        SourceChain::new("all_concept_code_east")
            .provider(Provider::new("eastmoney", Acceptance::NonEmpty, move || {
                paginate(
                    "东方财富概念板块",
                    EAST_CONCEPT_PAGE_SIZE,
                    EAST_CONCEPT_MAX_PAGES,
                    self.page_delay,
                    move |page| async move {
                        let resp = self
                            .east_clist_page(
                                page,
                                EAST_CONCEPT_PAGE_SIZE,
                                "m:90+t:3",
                                "f12,f13,f14,f62",
                                "f62",
                            )
                            .await?;
                        Ok(eastmoney::decode_concept_codes(resp))
                    },
                )
            }))
            .run()
            .await
    }

    /// 个股所属概念
    pub async fn get_concept_east(&self, stock_code: &str) -> Result<Vec<ConceptCode>> {
        let code = ensure_stock_code(stock_code)?;
        let filter = format!(
            "(SECUCODE=\"{}\")(IS_PRECISE=\"1\")",
            compile_exchange_by_stock_code(&code)
        );

        SourceChain::new(format!("get_concept_east({})", code))
            .provider(Provider::new("eastmoney", Acceptance::NonEmpty, move || async move {
                let resp = self
                    .east_datacenter::<ConceptRow>(
                        "RPT_F10_CORETHEME_BOARDTYPE",
                        "SECUCODE,SECURITY_CODE,SECURITY_NAME_ABBR,NEW_BOARD_CODE,BOARD_NAME,SELECTED_BOARD_REASON,IS_PRECISE,BOARD_RANK,BOARD_YIELD,DERIVE_BOARD_CODE",
                        filter,
                        50,
                        "BOARD_RANK",
                    )
                    .await?;
                Ok(eastmoney::decode_stock_concepts(resp))
            }))
            .run()
            .await
    }

    // ==================== 股本 ====================

    /// 股本结构，`history` 为 false 时只返回最新一条
    pub async fn get_stock_shares(&self, stock_code: &str, history: bool) -> Result<Vec<StockShares>> {
        let code = ensure_stock_code(stock_code)?;
        let filter = format!("(SECUCODE=\"{}\")", compile_exchange_by_stock_code(&code));
        let code_ref = code.as_str();

        let mut shares = SourceChain::new(format!("get_stock_shares({})", code))
            .provider(Provider::new("eastmoney", Acceptance::NonEmpty, move || async move {
                let resp = self
                    .east_datacenter::<SharesRow>(
                        "RPT_F10_EH_EQUITY",
                        "SECUCODE,SECURITY_CODE,END_DATE,TOTAL_SHARES,LIMITED_SHARES,LISTED_A_SHARES,CHANGE_REASON",
                        filter,
                        200,
                        "END_DATE",
                    )
                    .await?;
                Ok(eastmoney::decode_shares(resp, code_ref))
            }))
            .run()
            .await?;

        shares.sort_by(|a, b| b.change_date.cmp(&a.change_date));
        if !history {
            shares.truncate(1);
        }
        Ok(shares)
    }

    // ==================== 行业 ====================

    /// 申万行业
    pub async fn get_industry_sw(&self, stock_code: &str) -> Result<Vec<IndustrySw>> {
        let code = ensure_stock_code(stock_code)?;
        let stock = serde_json::json!([{ "code": code, "market": "ab", "type": "stock" }]).to_string();
        let code_ref = code.as_str();

        SourceChain::new(format!("get_industry_sw({})", code))
            .provider(Provider::new("baidu", Acceptance::NonEmpty, move || async move {
                let request = HttpRequest::get(BAIDU_RELATED_BLOCK_API)
                    .params([("stock", stock), ("finClientType", "pc".to_string())])
                    .headers(headers::baidu());
                baidu::decode_industry(self.http.get_json(&request).await?, code_ref)
            }))
            .run()
            .await
    }

    // ==================== 交易日历 ====================

    /// 全年交易日历，`year` 为 0 表示当年
    ///
    /// 逐月查询；某月失败跳过，遇到空月份（尚未公布）停止
    pub async fn trade_calendar(&self, year: i32) -> Result<Vec<TradeCalendar>> {
        let current = beijing_now().year();
        let year = if year == 0 { current } else { year };
        if !(MIN_CALENDAR_YEAR..=current + 1).contains(&year) {
            return Err(AdataError::InvalidParam(format!(
                "年份须在 {} 至 {} 之间: {}",
                MIN_CALENDAR_YEAR,
                current + 1,
                year
            )));
        }

        SourceChain::new(format!("trade_calendar({})", year))
            .provider(Provider::new("szse", Acceptance::NonEmpty, move || {
                self.trade_calendar_szse(year)
            }))
            .run()
            .await
    }

    async fn trade_calendar_szse(&self, year: i32) -> Result<Vec<TradeCalendar>> {
        let mut all = Vec::new();
        let mut last_error = None;

        for month in 1..=12 {
            if month > 1 && !self.page_delay.is_zero() {
                tokio::time::sleep(self.page_delay).await;
            }

            let request = HttpRequest::get(SZSE_CALENDAR_API)
                .param("month", format!("{}-{:02}", year, month))
                .headers(headers::szse());
            let days = match self.http.get_json(&request).await {
                Ok(resp) => szse::decode_month(resp),
                Err(e) => {
                    log::warn!("深交所 {}-{:02} 日历获取失败: {}", year, month, e);
                    last_error = Some(e);
                    continue;
                }
            };
            if days.is_empty() {
                log::debug!("深交所 {}-{:02} 日历为空，停止", year, month);
                break;
            }
            all.extend(days);
        }

        match last_error {
            Some(e) if all.is_empty() => Err(e),
            _ => {
                all.sort_by(|a, b| a.trade_date.cmp(&b.trade_date));
                Ok(all)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::client::tests::ScriptedTransport;
    use crate::services::client::HttpResponse;
    use crate::services::stock::tests::service_with;

    fn gbk(text: &str) -> std::result::Result<HttpResponse, crate::services::client::TransportError> {
        let (bytes, _, _) = encoding_rs::GBK.encode(text);
        Ok(HttpResponse::new(200, bytes.into_owned()))
    }

    #[tokio::test]
    async fn test_all_code_falls_back_to_sina() {
        let transport = ScriptedTransport::new(vec![
            // 百度第一页三次均失败
            ScriptedTransport::fail("timeout"),
            ScriptedTransport::fail("timeout"),
            ScriptedTransport::fail("timeout"),
            // 东方财富只有两条，未达到数量要求
            ScriptedTransport::ok(
                r#"{"rc":0,"data":{"total":2,"diff":[{"f12":"000001","f14":"平安银行"},{"f12":"600036","f14":"招商银行"}]}}"#,
            ),
            gbk(r#"[{"symbol":"sz000001","code":"000001","name":"平安银行"}]"#),
        ]);
        let service = service_with(transport.clone());

        let codes = service.all_code().await.unwrap();
        assert_eq!(codes.len(), 1);
        assert_eq!(codes[0].short_name, "平安银行");
        assert_eq!(transport.calls(), 5);

        let sent = transport.requests.lock().unwrap();
        assert!(sent[0].url.starts_with(BAIDU_MARKET_RANK_API));
        assert!(sent[0].query.contains(&("pn".to_string(), "0".to_string())));
        assert!(sent[4].url.starts_with(SINA_NODE_DATA_API));
    }

    #[tokio::test]
    async fn test_all_code_exhausted() {
        let service = service_with(ScriptedTransport::new(vec![]));
        let err = service.all_code().await.unwrap_err();
        assert_eq!(err.code(), 30002);
    }

    #[tokio::test]
    async fn test_sina_null_page_is_empty() {
        let transport = ScriptedTransport::new(vec![gbk("null")]);
        let service = service_with(transport);
        assert!(service.sina_node_page(3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_all_index_code_keeps_one_market() {
        let transport = ScriptedTransport::new(vec![
            ScriptedTransport::ok(
                r#"{"data":{"total":1,"diff":[{"f12":"000001","f14":"上证指数"}]}}"#,
            ),
            ScriptedTransport::status(500),
            ScriptedTransport::status(500),
            ScriptedTransport::status(500),
        ]);
        let service = service_with(transport);
        let indexes = service.all_index_code().await.unwrap();
        assert_eq!(indexes.len(), 1);
        assert_eq!(indexes[0].exchange, "SH");
    }

    #[tokio::test]
    async fn test_invalid_code_makes_no_request() {
        let transport = ScriptedTransport::new(vec![]);
        let service = service_with(transport.clone());

        assert_eq!(service.get_concept_east("12345").await.unwrap_err().code(), 10001);
        assert_eq!(service.get_stock_shares("abcdef", false).await.unwrap_err().code(), 10001);
        assert_eq!(service.get_industry_sw("999999").await.unwrap_err().code(), 10001);
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_get_stock_shares_latest_only() {
        let body = r#"{"success":true,"code":0,"result":{"data":[
            {"SECURITY_CODE":"000001","END_DATE":"2022-12-31 00:00:00","TOTAL_SHARES":19405918198},
            {"SECURITY_CODE":"000001","END_DATE":"2023-12-31 00:00:00","TOTAL_SHARES":19405918198}
        ]}}"#;
        let transport = ScriptedTransport::new(vec![
            ScriptedTransport::ok(body),
            ScriptedTransport::ok(body),
        ]);
        let service = service_with(transport.clone());

        let latest = service.get_stock_shares("000001", false).await.unwrap();
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].change_date, "2023-12-31");

        let all = service.get_stock_shares("000001", true).await.unwrap();
        assert_eq!(all.len(), 2);

        let sent = transport.requests.lock().unwrap();
        assert!(sent[0]
            .query
            .contains(&("filter".to_string(), "(SECUCODE=\"000001.SZ\")".to_string())));
    }

    #[tokio::test]
    async fn test_get_concept_east_no_data() {
        let transport = ScriptedTransport::new(vec![ScriptedTransport::ok(
            r#"{"version":null,"result":null,"success":false,"message":"返回数据为空","code":9201}"#,
        )]);
        let service = service_with(transport);
        let err = service.get_concept_east("600036").await.unwrap_err();
        assert_eq!(err.code(), 30002);
    }

    #[tokio::test]
    async fn test_trade_calendar_stops_at_empty_month() {
        let transport = ScriptedTransport::new(vec![
            ScriptedTransport::ok(
                r#"{"data":[{"jybz":"0","jyrq":"2024-01-01"},{"jybz":"1","jyrq":"2024-01-02"}]}"#,
            ),
            ScriptedTransport::ok(r#"{"data":[{"jybz":"1","jyrq":"2024-02-01"}]}"#),
            ScriptedTransport::ok(r#"{"data":[]}"#),
        ]);
        let service = service_with(transport.clone());

        let days = service.trade_calendar(2024).await.unwrap();
        assert_eq!(days.len(), 3);
        assert_eq!(days[2].trade_date, "2024-02-01");
        assert_eq!(transport.calls(), 3);

        let sent = transport.requests.lock().unwrap();
        assert_eq!(sent[1].query, vec![("month".to_string(), "2024-02".to_string())]);
    }

    #[tokio::test]
    async fn test_trade_calendar_rejects_year() {
        let service = service_with(ScriptedTransport::new(vec![]));
        assert_eq!(service.trade_calendar(1989).await.unwrap_err().code(), 10003);
        assert_eq!(service.trade_calendar(9999).await.unwrap_err().code(), 10003);
    }
}
