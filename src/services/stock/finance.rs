//! 财务数据
//!
//! 东方财富按报告类型分别查询，结果合并后按报告期倒序

use std::future::Future;

use serde::de::DeserializeOwned;

use super::common::{compile_exchange_by_stock_code, ensure_stock_code};
use super::decoders::eastmoney::{self, DatacenterResponse};
use super::{StockService, REPORT_TYPES};
use crate::error::Result;
use crate::models::{BalanceSheet, CashFlowSheet, FinanceCore, IncomeSheet};
use crate::services::chain::{Acceptance, Provider, SourceChain};

const FINANCE_PAGE_SIZE: usize = 100;

const CORE_REPORT: &str = "RPT_F10_FINANCE_MAINFINADATA";
const BALANCE_REPORT: &str = "RPT_F10_FINANCE_BALANCE";
const CASHFLOW_REPORT: &str = "RPT_F10_FINANCE_CASHFLOW";
const PROFIT_REPORT: &str = "RPT_F10_FINANCE_PROFIT";

/// 报告期字段
trait ReportDated {
    fn report_date(&self) -> &str;
    fn with_stock_code(self, code: &str) -> Self;
}

macro_rules! report_dated {
    ($($ty:ty),*) => {
        $(impl ReportDated for $ty {
            fn report_date(&self) -> &str {
                &self.report_date
            }

            fn with_stock_code(mut self, code: &str) -> Self {
                if self.stock_code.is_empty() {
                    self.stock_code = code.to_string();
                }
                self
            }
        })*
    };
}

report_dated!(FinanceCore, BalanceSheet, CashFlowSheet, IncomeSheet);

impl StockService {
    /// 核心财务指标
    pub async fn get_core_index(&self, stock_code: &str) -> Result<Vec<FinanceCore>> {
        self.finance_report(stock_code, "get_core_index", CORE_REPORT, eastmoney::decode_finance_core)
            .await
    }

    /// 资产负债表
    pub async fn get_balance(&self, stock_code: &str) -> Result<Vec<BalanceSheet>> {
        self.finance_report(stock_code, "get_balance", BALANCE_REPORT, eastmoney::decode_balance)
            .await
    }

    /// 现金流量表
    pub async fn get_cash_flow(&self, stock_code: &str) -> Result<Vec<CashFlowSheet>> {
        self.finance_report(stock_code, "get_cash_flow", CASHFLOW_REPORT, eastmoney::decode_cash_flow)
            .await
    }

    /// 利润表
    pub async fn get_profit(&self, stock_code: &str) -> Result<Vec<IncomeSheet>> {
        self.finance_report(stock_code, "get_profit", PROFIT_REPORT, eastmoney::decode_profit)
            .await
    }

    async fn finance_report<R, T, D>(
        &self,
        stock_code: &str,
        operation: &str,
        report_name: &'static str,
        decode: D,
    ) -> Result<Vec<T>>
    where
        R: DeserializeOwned + Send + 'static,
        T: ReportDated + Send + 'static,
        D: Fn(DatacenterResponse<R>) -> Vec<T> + Send + Sync,
    {
        let code = ensure_stock_code(stock_code)?;
        let secucode = compile_exchange_by_stock_code(&code);
        let secucode = secucode.as_str();
        let decode = &decode;

        let mut records = SourceChain::new(format!("{}({})", operation, code))
            .provider(Provider::new("eastmoney", Acceptance::NonEmpty, move || {
                self.per_report_type(report_name, move |report_type| async move {
                    let filter = format!(
                        "(SECUCODE=\"{}\")(REPORT_TYPE=\"{}\")",
                        secucode, report_type
                    );
                    let resp = self
                        .east_datacenter::<R>(report_name, "ALL", filter, FINANCE_PAGE_SIZE, "REPORT_DATE")
                        .await?;
                    Ok(decode(resp))
                })
            }))
            .run()
            .await?;

        records.sort_by(|a, b| b.report_date().cmp(a.report_date()));
        Ok(records
            .into_iter()
            .map(|r| r.with_stock_code(&code))
            .collect())
    }

    /// 依次查询各报告类型，单个类型失败只记录日志
    async fn per_report_type<T, F, Fut>(&self, label: &str, mut fetch: F) -> Result<Vec<T>>
    where
        F: FnMut(&'static str) -> Fut,
        Fut: Future<Output = Result<Vec<T>>>,
    {
        let mut all = Vec::new();
        let mut last_error = None;

        for (i, report_type) in REPORT_TYPES.into_iter().enumerate() {
            if i > 0 && !self.page_delay.is_zero() {
                tokio::time::sleep(self.page_delay).await;
            }
            match fetch(report_type).await {
                Ok(records) => {
                    log::debug!("{} {} 共 {} 条", label, report_type, records.len());
                    all.extend(records);
                }
                Err(e) => {
                    log::warn!("{} {} 获取失败: {}", label, report_type, e);
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if all.is_empty() => Err(e),
            _ => Ok(all),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::services::client::tests::ScriptedTransport;
    use crate::services::stock::tests::service_with;

    fn core_body(date: &str, report_type: &str) -> String {
        format!(
            r#"{{"success":true,"code":0,"result":{{"data":[
                {{"SECURITY_CODE":"600036","REPORT_DATE":"{} 00:00:00","REPORT_TYPE":"{}","EPSJB":1.5}}
            ]}}}}"#,
            date, report_type
        )
    }

    #[tokio::test]
    async fn test_get_core_index_merges_report_types() {
        let transport = ScriptedTransport::new(vec![
            ScriptedTransport::ok(&core_body("2023-12-31", "年报")),
            ScriptedTransport::ok(&core_body("2024-06-30", "中报")),
            // 三季报三次均失败
            ScriptedTransport::status(500),
            ScriptedTransport::status(500),
            ScriptedTransport::status(500),
            ScriptedTransport::ok(&core_body("2024-03-31", "一季报")),
        ]);
        let service = service_with(transport.clone());

        let core = service.get_core_index("600036").await.unwrap();
        assert_eq!(core.len(), 3);
        assert_eq!(core[0].report_date, "2024-06-30");
        assert_eq!(core[2].report_date, "2023-12-31");

        let sent = transport.requests.lock().unwrap();
        assert!(sent[0].query.contains(&(
            "filter".to_string(),
            "(SECUCODE=\"600036.SH\")(REPORT_TYPE=\"年报\")".to_string()
        )));
        assert!(sent[0].query.contains(&(
            "reportName".to_string(),
            "RPT_F10_FINANCE_MAINFINADATA".to_string()
        )));
    }

    #[tokio::test]
    async fn test_get_profit_newest_first() {
        let profit = |date: &str, report_type: &str| {
            format!(
                r#"{{"success":true,"code":0,"result":{{"data":[
                    {{"SECURITY_CODE":"1","REPORT_DATE":"{} 00:00:00","REPORT_TYPE":"{}",
                      "NOTICE_DATE":"2024-03-15 00:00:00","NET_PROFIT":"4.6e10","BASIC_EPS":2.25}}
                ]}}}}"#,
                date, report_type
            )
        };
        let transport = ScriptedTransport::new(vec![
            ScriptedTransport::ok(&profit("2023-12-31", "年报")),
            ScriptedTransport::ok(&profit("2024-06-30", "中报")),
            ScriptedTransport::ok(r#"{"success":true,"code":0,"result":{"data":[]}}"#),
            ScriptedTransport::ok(&profit("2024-03-31", "一季报")),
        ]);
        let service = service_with(transport.clone());

        let income = service.get_profit("000001").await.unwrap();
        assert_eq!(income.len(), 3);
        assert_eq!(income[0].report_date, "2024-06-30");
        assert_eq!(income[1].report_type, "一季报");
        assert_eq!(income[2].notice_date, "2024-03-15");
        assert_eq!(income[2].net_profit, 4.6e10);
        assert!(income.iter().all(|r| r.stock_code == "000001"));

        let sent = transport.requests.lock().unwrap();
        assert_eq!(sent.len(), 4);
        assert!(sent[3].query.contains(&(
            "filter".to_string(),
            "(SECUCODE=\"000001.SZ\")(REPORT_TYPE=\"一季报\")".to_string()
        )));
        assert!(sent[0].query.contains(&(
            "reportName".to_string(),
            "RPT_F10_FINANCE_PROFIT".to_string()
        )));
    }

    #[tokio::test]
    async fn test_get_balance_all_failed() {
        let service = service_with(ScriptedTransport::new(vec![]));
        let err = service.get_balance("000001").await.unwrap_err();
        assert_eq!(err.code(), 30002);
    }

    #[tokio::test]
    async fn test_get_cash_flow_invalid_code() {
        let transport = ScriptedTransport::new(vec![]);
        let service = service_with(transport.clone());
        assert_eq!(service.get_cash_flow("").await.unwrap_err().code(), 10001);
        assert_eq!(transport.calls(), 0);
    }
}
