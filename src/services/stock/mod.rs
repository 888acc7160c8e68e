//! 股票数据服务模块
//!
//! 按固定顺序依次尝试多个数据源，统一返回标准化后的记录

pub mod common;
pub mod decoders;

mod finance;
mod flow;
mod info;
mod market;

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::services::client::{HttpClient, HttpRequest};
use crate::services::headers;
use common::EAST_DATACENTER_API;
use decoders::eastmoney::DatacenterResponse;

/// 翻页间隔
pub const PAGE_DELAY: Duration = Duration::from_millis(100);

/// 财报类型
pub const REPORT_TYPES: [&str; 4] = ["年报", "中报", "三季报", "一季报"];

/// 股票数据服务
///
/// 所有方法均为一次完整的拉取，多个数据源、多页之间顺序执行
pub struct StockService {
    http: Arc<HttpClient>,
    page_delay: Duration,
}

impl StockService {
    pub fn new(http: Arc<HttpClient>) -> Self {
        Self {
            http,
            page_delay: PAGE_DELAY,
        }
    }

    /// 修改翻页间隔
    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    /// 共享的 HTTP 客户端（代理配置入口）
    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    /// 东方财富数据中心查询
    async fn east_datacenter<T: DeserializeOwned>(
        &self,
        report_name: &str,
        columns: &str,
        filter: String,
        page_size: usize,
        sort_column: &str,
    ) -> Result<DatacenterResponse<T>> {
        let request = HttpRequest::get(EAST_DATACENTER_API)
            .params([
                ("reportName", report_name.to_string()),
                ("columns", columns.to_string()),
                ("filter", filter),
                ("pageNumber", "1".to_string()),
                ("pageSize", page_size.to_string()),
                ("sortTypes", "-1".to_string()),
                ("sortColumns", sort_column.to_string()),
                ("source", "HSF10".to_string()),
                ("client", "PC".to_string()),
            ])
            .headers(headers::east());
        self.http.get_json(&request).await
    }
}
