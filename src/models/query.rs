//! 查询参数

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::AdataError;

/// K线周期
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum KType {
    #[default]
    Day,
    Week,
    Month,
    Quarter,
    Min5,
    Min15,
    Min30,
    Min60,
}

impl KType {
    /// 东方财富 klt 参数
    pub fn east_klt(self) -> &'static str {
        match self {
            Self::Day => "101",
            Self::Week => "102",
            Self::Month => "103",
            Self::Quarter => "104",
            Self::Min5 => "5",
            Self::Min15 => "15",
            Self::Min30 => "30",
            Self::Min60 => "60",
        }
    }

    /// 百度 ktype 参数，只支持日、周、月
    pub fn baidu_ktype(self) -> Option<&'static str> {
        match self {
            Self::Day => Some("1"),
            Self::Week => Some("2"),
            Self::Month => Some("3"),
            _ => None,
        }
    }
}

impl TryFrom<i32> for KType {
    type Error = AdataError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Day),
            2 => Ok(Self::Week),
            3 => Ok(Self::Month),
            4 => Ok(Self::Quarter),
            5 => Ok(Self::Min5),
            15 => Ok(Self::Min15),
            30 => Ok(Self::Min30),
            60 => Ok(Self::Min60),
            other => Err(AdataError::InvalidParam(format!("不支持的K线类型: {}", other))),
        }
    }
}

/// 复权类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AdjustType {
    /// 不复权
    None,
    /// 前复权
    #[default]
    Forward,
    /// 后复权
    Backward,
}

impl AdjustType {
    /// 东方财富 fqt 参数
    pub fn east_fqt(self) -> &'static str {
        match self {
            Self::None => "0",
            Self::Forward => "1",
            Self::Backward => "2",
        }
    }
}

impl TryFrom<i32> for AdjustType {
    type Error = AdataError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::None),
            1 => Ok(Self::Forward),
            2 => Ok(Self::Backward),
            other => Err(AdataError::InvalidParam(format!("不支持的复权类型: {}", other))),
        }
    }
}

/// K线查询参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketParams {
    pub stock_code: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub k_type: KType,
    pub adjust_type: AdjustType,
}

impl MarketParams {
    pub fn new(stock_code: impl Into<String>) -> Self {
        Self {
            stock_code: stock_code.into(),
            start_date: None,
            end_date: None,
            k_type: KType::default(),
            adjust_type: AdjustType::default(),
        }
    }

    pub fn range(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    pub fn k_type(mut self, k_type: KType) -> Self {
        self.k_type = k_type;
        self
    }

    pub fn adjust_type(mut self, adjust_type: AdjustType) -> Self {
        self.adjust_type = adjust_type;
        self
    }
}

/// K线接口查询参数
#[derive(Debug, Default, Deserialize)]
pub struct MarketQuery {
    /// 开始日期（YYYY-MM-DD 或 YYYYMMDD）
    pub start_date: Option<String>,
    /// 结束日期
    pub end_date: Option<String>,
    /// K线类型: 1 日, 2 周, 3 月, 4 季, 5/15/30/60 分钟
    pub k_type: Option<i32>,
    /// 复权类型: 0 不复权, 1 前复权, 2 后复权
    pub adjust_type: Option<i32>,
}

/// 日期区间查询参数
#[derive(Debug, Default, Deserialize)]
pub struct DateRangeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// 实时行情查询参数
#[derive(Debug, Default, Deserialize)]
pub struct CodesQuery {
    /// 逗号分隔的股票代码
    pub codes: Option<String>,
}

impl CodesQuery {
    pub fn codes(&self) -> Vec<String> {
        self.codes
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// 股本查询参数
#[derive(Debug, Default, Deserialize)]
pub struct SharesQuery {
    #[serde(default)]
    pub history: bool,
}

/// 代理设置请求体
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProxyRequest {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub url: String,
    /// 不传表示保持原有代理池
    pub list: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_k_type_mapping() {
        assert_eq!(KType::try_from(1).unwrap().east_klt(), "101");
        assert_eq!(KType::try_from(15).unwrap().east_klt(), "15");
        assert_eq!(KType::Week.baidu_ktype(), Some("2"));
        assert_eq!(KType::Min5.baidu_ktype(), None);
        assert_eq!(KType::try_from(7).unwrap_err().code(), 10003);
    }

    #[test]
    fn test_adjust_type_mapping() {
        assert_eq!(AdjustType::try_from(0).unwrap().east_fqt(), "0");
        assert_eq!(AdjustType::default().east_fqt(), "1");
        assert!(AdjustType::try_from(3).is_err());
    }

    #[test]
    fn test_codes_query_splits_and_trims() {
        let query = CodesQuery {
            codes: Some(" 000001, 600036,,".to_string()),
        };
        assert_eq!(query.codes(), vec!["000001", "600036"]);
        assert!(CodesQuery::default().codes().is_empty());
    }
}
