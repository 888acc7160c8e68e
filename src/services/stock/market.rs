//! K线、分时、实时行情与五档盘口

use chrono::NaiveDate;

use super::common::{
    east_secid, ensure_stock_code, market_prefix, within_range, BAIDU_KLINE_API,
    BAIDU_QUOTATION_API, EAST_KLINE_API, EAST_TRENDS_API, SINA_HQ_API, TENCENT_QUOTE_API,
};
use super::decoders::{baidu, eastmoney, sina, tencent};
use super::StockService;
use crate::error::{AdataError, Result};
use crate::models::{CurrentMarket, KLine, MarketFive, MarketMin, MarketParams};
use crate::services::chain::{Acceptance, Provider, SourceChain};
use crate::services::client::HttpRequest;
use crate::services::headers;

/// 单次实时行情请求的最大代码数
pub const QUOTE_BATCH_SIZE: usize = 100;

const EAST_KLINE_UT: &str = "7eea3edcaed734bea9cbfc24409ed989";
const EAST_TRENDS_UT: &str = "fa5fd1943c7b386f172d6893dbfba10b";

/// 未指定区间时东方财富K线的起止
const EAST_KLINE_BEGIN: &str = "0";
const EAST_KLINE_END: &str = "20500101";

/// 检查日期区间
pub(crate) fn check_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<()> {
    match (start, end) {
        (Some(s), Some(e)) if s > e => Err(AdataError::InvalidParam(format!(
            "开始日期 {} 晚于结束日期 {}",
            s, e
        ))),
        _ => Ok(()),
    }
}

impl StockService {
    // ==================== K线 ====================

    /// K线行情，按日期区间过滤
    ///
    /// 百度只支持日、周、月K线且不区分复权类型，分钟和季K线只走东方财富
    pub async fn get_market(&self, params: &MarketParams) -> Result<Vec<KLine>> {
        let code = ensure_stock_code(&params.stock_code)?;
        check_range(params.start_date, params.end_date)?;
        let code_ref = code.as_str();

        let mut chain = SourceChain::new(format!("get_market({})", code)).provider(Provider::new(
            "eastmoney",
            Acceptance::NonEmpty,
            move || self.market_east(code_ref, params),
        ));
        if let Some(ktype) = params.k_type.baidu_ktype() {
            chain = chain.provider(Provider::new("baidu", Acceptance::NonEmpty, move || {
                self.market_baidu(code_ref, ktype, params)
            }));
        }
        chain.run().await
    }

    async fn market_east(&self, code: &str, params: &MarketParams) -> Result<Vec<KLine>> {
        let begin = params
            .start_date
            .map(|d| d.format("%Y%m%d").to_string())
            .unwrap_or_else(|| EAST_KLINE_BEGIN.to_string());
        let end = params
            .end_date
            .map(|d| d.format("%Y%m%d").to_string())
            .unwrap_or_else(|| EAST_KLINE_END.to_string());

        let request = HttpRequest::get(EAST_KLINE_API)
            .params([
                ("secid", east_secid(code)),
                ("fields1", "f1,f2,f3,f4,f5,f6".to_string()),
                ("fields2", "f51,f52,f53,f54,f55,f56,f57,f58,f59,f60,f61".to_string()),
                ("ut", EAST_KLINE_UT.to_string()),
                ("klt", params.k_type.east_klt().to_string()),
                ("fqt", params.adjust_type.east_fqt().to_string()),
                ("beg", begin),
                ("end", end),
            ])
            .headers(headers::east());

        let bars = eastmoney::decode_klines(self.http.get_json(&request).await?, code)?;
        Ok(filter_bars(bars, params))
    }

    async fn market_baidu(
        &self,
        code: &str,
        ktype: &str,
        params: &MarketParams,
    ) -> Result<Vec<KLine>> {
        let mut request = HttpRequest::get(BAIDU_KLINE_API)
            .params([
                ("all", "1"),
                ("isIndex", "false"),
                ("isBk", "false"),
                ("isBlock", "false"),
                ("isFutures", "false"),
                ("isStock", "true"),
                ("newFormat", "1"),
                ("group", "quotation_kline_ab"),
                ("finClientType", "pc"),
            ])
            .param("code", code)
            .param("ktype", ktype);
        if let Some(start) = params.start_date {
            request = request.param("start_time", format!("{} 00:00:00", start.format("%Y-%m-%d")));
        }
        let request = request.headers(headers::baidu());

        let bars = baidu::decode_klines(self.http.get_json(&request).await?, code)?;
        Ok(filter_bars(bars, params))
    }

    // ==================== 分时 ====================

    /// 当日分时行情
    pub async fn get_market_min(&self, stock_code: &str) -> Result<Vec<MarketMin>> {
        let code = ensure_stock_code(stock_code)?;
        let code_ref = code.as_str();

        SourceChain::new(format!("get_market_min({})", code))
            .provider(Provider::new("eastmoney", Acceptance::NonEmpty, move || async move {
                let request = HttpRequest::get(EAST_TRENDS_API)
                    .params([
                        ("secid", east_secid(code_ref)),
                        ("fields1", "f1,f2,f3,f4,f5,f6,f7,f8,f9,f10,f11,f12,f13".to_string()),
                        ("fields2", "f51,f52,f53,f54,f55,f56,f57,f58".to_string()),
                        ("ut", EAST_TRENDS_UT.to_string()),
                        ("ndays", "1".to_string()),
                        ("iscr", "1".to_string()),
                        ("iscca", "0".to_string()),
                    ])
                    .headers(headers::east());
                eastmoney::decode_trends(self.http.get_json(&request).await?, code_ref)
            }))
            .run()
            .await
    }

    // ==================== 实时行情 ====================

    /// 多只股票的实时行情
    ///
    /// 代码全部校验通过后才发起请求，按 `QUOTE_BATCH_SIZE` 分批
    pub async fn list_market_current(&self, codes: &[String]) -> Result<Vec<CurrentMarket>> {
        if codes.is_empty() {
            return Err(AdataError::InvalidParam("股票代码列表为空".to_string()));
        }
        let symbols = codes
            .iter()
            .map(|c| ensure_stock_code(c).map(|code| format!("s_{}{}", market_prefix(&code), code)))
            .collect::<Result<Vec<_>>>()?;
        let symbols = symbols.as_slice();

        SourceChain::new(format!("list_market_current({})", codes.len()))
            .provider(Provider::new("sina", Acceptance::NonEmpty, move || {
                self.quotes_batched(symbols, SINA_HQ_API, headers::sina, sina::decode_quotes)
            }))
            .provider(Provider::new("tencent", Acceptance::NonEmpty, move || {
                self.quotes_batched(symbols, TENCENT_QUOTE_API, headers::tencent, tencent::decode_quotes)
            }))
            .run()
            .await
    }

    /// 分批请求 GBK 编码的行情文本
    async fn quotes_batched(
        &self,
        symbols: &[String],
        api: &str,
        header_set: fn() -> headers::HeaderSet,
        decode: fn(&str) -> Vec<CurrentMarket>,
    ) -> Result<Vec<CurrentMarket>> {
        let mut quotes = Vec::with_capacity(symbols.len());

        for (i, batch) in symbols.chunks(QUOTE_BATCH_SIZE).enumerate() {
            if i > 0 && !self.page_delay.is_zero() {
                tokio::time::sleep(self.page_delay).await;
            }
            let request = HttpRequest::get(format!("{}{}", api, batch.join(","))).headers(header_set());
            let text = self.http.get_gbk_text(&request).await?;
            quotes.extend(decode(&text));
        }

        Ok(quotes)
    }

    // ==================== 五档盘口 ====================

    /// 五档盘口
    pub async fn get_market_five(&self, stock_code: &str) -> Result<MarketFive> {
        let code = ensure_stock_code(stock_code)?;
        let code_ref = code.as_str();

        let five = SourceChain::new(format!("get_market_five({})", code))
            .provider(Provider::new("tencent", Acceptance::NonEmpty, move || async move {
                let url = format!("{}{}{}", TENCENT_QUOTE_API, market_prefix(code_ref), code_ref);
                let request = HttpRequest::get(url).headers(headers::tencent());
                let text = self.http.get_gbk_text(&request).await?;
                Ok(tencent::decode_five(&text, code_ref))
            }))
            .provider(Provider::new("baidu", Acceptance::NonEmpty, move || async move {
                let request = HttpRequest::get(BAIDU_QUOTATION_API)
                    .params([
                        ("all", "1"),
                        ("srcid", "5353"),
                        ("pointType", "string"),
                        ("group", "quotation_minute_ab"),
                        ("market_type", "ab"),
                        ("newFormat", "1"),
                        ("finClientType", "pc"),
                    ])
                    .param("query", code_ref)
                    .param("code", code_ref)
                    .headers(headers::baidu());
                baidu::decode_depth(self.http.get_json(&request).await?, code_ref)
            }))
            .run()
            .await?;

        five.into_iter()
            .next()
            .ok_or_else(|| AdataError::NoData(format!("{} 无五档盘口", code)))
    }
}

fn filter_bars(bars: Vec<KLine>, params: &MarketParams) -> Vec<KLine> {
    bars.into_iter()
        .filter(|bar| within_range(&bar.trade_date, params.start_date, params.end_date))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AdjustType, KType};
    use crate::services::client::tests::ScriptedTransport;
    use crate::services::client::{HttpResponse, TransportError};
    use crate::services::stock::tests::service_with;

    fn gbk(text: &str) -> std::result::Result<HttpResponse, TransportError> {
        let (bytes, _, _) = encoding_rs::GBK.encode(text);
        Ok(HttpResponse::new(200, bytes.into_owned()))
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    const EAST_KLINES: &str = r#"{"data":{"code":"000001","klines":[
        "2024-01-02,9.39,9.21,9.42,9.21,1158366,1075742252.45,2.24,-1.92,-0.18,0.60",
        "2024-01-03,9.19,9.20,9.22,9.15,656929,603735268.00,0.76,-0.11,-0.01,0.34",
        "2024-01-04,9.19,9.11,9.19,9.08,1023142,931238811.33,1.19,-1.09,-0.10,0.53"
    ]}}"#;

    #[tokio::test]
    async fn test_get_market_filters_range() {
        let transport = ScriptedTransport::new(vec![ScriptedTransport::ok(EAST_KLINES)]);
        let service = service_with(transport.clone());
        let params = MarketParams::new("000001")
            .range(Some(date("2024-01-03")), Some(date("2024-01-04")))
            .adjust_type(AdjustType::None);

        let bars = service.get_market(&params).await.unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].trade_date, "2024-01-03");

        let sent = transport.requests.lock().unwrap();
        let query = &sent[0].query;
        assert!(query.contains(&("secid".to_string(), "0.000001".to_string())));
        assert!(query.contains(&("klt".to_string(), "101".to_string())));
        assert!(query.contains(&("fqt".to_string(), "0".to_string())));
        assert!(query.contains(&("beg".to_string(), "20240103".to_string())));
    }

    #[tokio::test]
    async fn test_get_market_falls_back_to_baidu() {
        let transport = ScriptedTransport::new(vec![
            ScriptedTransport::ok(r#"{"rc":102,"data":null}"#),
            ScriptedTransport::ok(
                r#"{"ResultCode":"0","Result":{"newMarketData":{
                    "keys":["timestamp","time","open","close","volume","high","low","amount","range","ratio","turnoverratio","preClose"],
                    "marketData":"1704124800,2024-01-02,9.39,9.21,115836600,9.42,9.21,1075742252.45,-0.18,-1.92,0.60,9.39"
                }}}"#,
            ),
        ]);
        let service = service_with(transport.clone());

        let bars = service.get_market(&MarketParams::new("600036")).await.unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].close, 9.21);

        let sent = transport.requests.lock().unwrap();
        assert_eq!(sent[1].url, BAIDU_KLINE_API);
        assert!(sent[1].query.contains(&("ktype".to_string(), "1".to_string())));
    }

    #[tokio::test]
    async fn test_minute_market_has_no_baidu_fallback() {
        let transport = ScriptedTransport::new(vec![ScriptedTransport::ok(r#"{"data":null}"#)]);
        let service = service_with(transport.clone());
        let params = MarketParams::new("000001").k_type(KType::Min5);

        let err = service.get_market(&params).await.unwrap_err();
        assert_eq!(err.code(), 30002);
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_get_market_rejects_reversed_range() {
        let transport = ScriptedTransport::new(vec![]);
        let service = service_with(transport.clone());
        let params = MarketParams::new("000001").range(Some(date("2024-02-01")), Some(date("2024-01-01")));

        assert_eq!(service.get_market(&params).await.unwrap_err().code(), 10003);
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_get_market_min() {
        let transport = ScriptedTransport::new(vec![ScriptedTransport::ok(
            r#"{"data":{"preClose":10.0,"trends":["2024-01-02 09:30,10.00,10.10,10.10,10.00,120,121200.00,10.05"]}}"#,
        )]);
        let service = service_with(transport);
        let mins = service.get_market_min("000001").await.unwrap();
        assert_eq!(mins.len(), 1);
        assert_eq!(mins[0].price, 10.10);
    }

    #[tokio::test]
    async fn test_list_market_current_validates_before_request() {
        let transport = ScriptedTransport::new(vec![]);
        let service = service_with(transport.clone());

        let err = service.list_market_current(&[]).await.unwrap_err();
        assert_eq!(err.code(), 10003);

        let codes = vec!["000001".to_string(), "12".to_string()];
        let err = service.list_market_current(&codes).await.unwrap_err();
        assert_eq!(err.code(), 10001);
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_list_market_current_falls_back_to_tencent() {
        let transport = ScriptedTransport::new(vec![
            gbk("var hq_str_s_sz000001=\"\";\n"),
            gbk("v_s_sz000001=\"51~平安银行~000001~9.21~-0.18~-1.92~1158366~107574~~1787.14~GP-A\";"),
        ]);
        let service = service_with(transport.clone());
        let codes = vec!["000001".to_string()];

        let quotes = service.list_market_current(&codes).await.unwrap();
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].short_name, "平安银行");
        assert_eq!(quotes[0].source, tencent::SOURCE);

        let sent = transport.requests.lock().unwrap();
        assert_eq!(sent[0].url, format!("{}s_sz000001", SINA_HQ_API));
        assert_eq!(sent[1].url, format!("{}s_sz000001", TENCENT_QUOTE_API));
    }

    #[tokio::test]
    async fn test_list_market_current_batches() {
        let codes: Vec<String> = (1..=150).map(|i| format!("{:06}", 600000 + i)).collect();
        let transport = ScriptedTransport::new(vec![
            gbk("var hq_str_s_sh600001=\"浦发,1,0,0,1,1\";"),
            gbk("var hq_str_s_sh600101=\"明星电力,1,0,0,1,1\";"),
        ]);
        let service = service_with(transport.clone());

        let quotes = service.list_market_current(&codes).await.unwrap();
        assert_eq!(quotes.len(), 2);
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_get_market_five_falls_back_to_baidu() {
        let transport = ScriptedTransport::new(vec![
            gbk("v_pv_none_match=\"1\";"),
            ScriptedTransport::ok(
                r#"{"ResultCode":"0","Result":{
                    "askinfos":[{"askprice":"9.22","askvolume":"100"}],
                    "buyinfos":[{"bidprice":"9.21","bidvolume":"200"}]
                }}"#,
            ),
        ]);
        let service = service_with(transport.clone());

        let five = service.get_market_five("000001").await.unwrap();
        assert_eq!(five.sell_prices[0], 9.22);
        assert_eq!(five.buy_volumes[0], 200);

        let sent = transport.requests.lock().unwrap();
        assert_eq!(sent[0].url, format!("{}sz000001", TENCENT_QUOTE_API));
    }
}
