//! 资金流向

use super::common::{
    east_secid, ensure_stock_code, parse_optional_date, within_range, EAST_FFLOW_DAY_API,
    EAST_FFLOW_MIN_API,
};
use super::decoders::eastmoney;
use super::market::check_range;
use super::StockService;
use crate::error::Result;
use crate::models::CapitalFlow;
use crate::services::chain::{Acceptance, Provider, SourceChain};
use crate::services::client::HttpRequest;
use crate::services::headers;

impl StockService {
    /// 当日分钟级资金流向
    pub async fn get_capital_flow_min(&self, stock_code: &str) -> Result<Vec<CapitalFlow>> {
        let code = ensure_stock_code(stock_code)?;
        let code_ref = code.as_str();

        SourceChain::new(format!("get_capital_flow_min({})", code))
            .provider(Provider::new("eastmoney", Acceptance::NonEmpty, move || async move {
                let request = HttpRequest::get(EAST_FFLOW_MIN_API)
                    .params([
                        ("lmt", "0".to_string()),
                        ("klt", "1".to_string()),
                        ("secid", east_secid(code_ref)),
                        ("fields1", "f1,f2,f3,f7".to_string()),
                        (
                            "fields2",
                            "f51,f52,f53,f54,f55,f56,f57,f58,f59,f60,f61,f62,f63,f64,f65".to_string(),
                        ),
                    ])
                    .headers(headers::east());
                eastmoney::decode_flow_min(self.http.get_json(&request).await?, code_ref)
            }))
            .run()
            .await
    }

    /// 日级资金流向，日期为空表示不限制
    pub async fn get_capital_flow(
        &self,
        stock_code: &str,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<Vec<CapitalFlow>> {
        let code = ensure_stock_code(stock_code)?;
        let start = parse_optional_date(start_date)?;
        let end = parse_optional_date(end_date)?;
        check_range(start, end)?;
        let code_ref = code.as_str();

        SourceChain::new(format!("get_capital_flow({})", code))
            .provider(Provider::new("eastmoney", Acceptance::NonEmpty, move || async move {
                let request = HttpRequest::get(EAST_FFLOW_DAY_API)
                    .params([
                        ("lmt", "0".to_string()),
                        ("klt", "101".to_string()),
                        ("secid", east_secid(code_ref)),
                        ("fields1", "f1,f2,f3,f7".to_string()),
                        (
                            "fields2",
                            "f51,f52,f53,f54,f55,f56,f57,f58,f59,f60,f61".to_string(),
                        ),
                    ])
                    .headers(headers::east());
                let flows = eastmoney::decode_flow_day(self.http.get_json(&request).await?, code_ref)?;
                Ok(flows
                    .into_iter()
                    .filter(|f| within_range(&f.trade_date, start, end))
                    .collect())
            }))
            .run()
            .await
    }
}
