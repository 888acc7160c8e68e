//! 错误类型定义
//!
//! 所有对外可见的错误都带有稳定的数字错误码、可读的错误信息以及可选的诊断详情

use serde::Serialize;
use thiserror::Error;

/// 解析失败时保留的原始数据预览长度（字符数）
const PREVIEW_CHARS: usize = 120;

/// 数据获取错误
#[derive(Debug, Error)]
pub enum AdataError {
    /// 无效的股票代码（不发起任何网络请求）
    #[error("[10001] 无效的股票代码: {0}")]
    InvalidStockCode(String),

    /// 无效的日期格式
    #[error("[10002] 无效的日期格式: {0}")]
    InvalidDate(String),

    /// 参数错误（空列表、非法枚举值等）
    #[error("[10003] 参数错误: {0}")]
    InvalidParam(String),

    /// 网络请求失败（已按重试策略重试）
    #[error("[20001] 请求失败: {url} 重试 {attempts} 次后仍失败: {detail}")]
    Request {
        url: String,
        attempts: u32,
        detail: String,
    },

    /// 响应内容与预期格式不符
    #[error("[20002] 解析响应失败: {context}: {detail}")]
    Parse { context: String, detail: String },

    /// 上游返回 404，不重试
    #[error("[20003] 数据不存在: HTTP 404 {url}")]
    NotFound { url: String },

    /// 响应结构正确但没有可用数据
    #[error("[30001] 未找到数据: {0}")]
    NoData(String),

    /// 所有数据源均失败，source 为最后一个数据源的错误
    #[error("[30002] 数据源不可用: {operation} 所有数据源均失败，最后错误: {last}")]
    Exhausted {
        operation: String,
        #[source]
        last: Box<AdataError>,
    },
}

pub type Result<T> = std::result::Result<T, AdataError>;

impl AdataError {
    /// 稳定的数字错误码
    pub fn code(&self) -> i32 {
        match self {
            Self::InvalidStockCode(_) => 10001,
            Self::InvalidDate(_) => 10002,
            Self::InvalidParam(_) => 10003,
            Self::Request { .. } => 20001,
            Self::Parse { .. } => 20002,
            Self::NotFound { .. } => 20003,
            Self::NoData(_) => 30001,
            Self::Exhausted { .. } => 30002,
        }
    }

    /// 可读的错误信息
    pub fn message(&self) -> &'static str {
        match self {
            Self::InvalidStockCode(_) => "无效的股票代码",
            Self::InvalidDate(_) => "无效的日期格式",
            Self::InvalidParam(_) => "参数错误",
            Self::Request { .. } => "请求失败",
            Self::Parse { .. } => "解析响应失败",
            Self::NotFound { .. } => "数据不存在",
            Self::NoData(_) => "未找到数据",
            Self::Exhausted { .. } => "数据源不可用",
        }
    }

    /// 诊断详情
    pub fn detail(&self) -> Option<String> {
        match self {
            Self::InvalidStockCode(s)
            | Self::InvalidDate(s)
            | Self::InvalidParam(s)
            | Self::NoData(s) => (!s.is_empty()).then(|| s.clone()),
            Self::Request {
                url,
                attempts,
                detail,
            } => Some(format!("{} (attempts={}): {}", url, attempts, detail)),
            Self::Parse { context, detail } => Some(format!("{}: {}", context, detail)),
            Self::NotFound { url } => Some(format!("HTTP 404 {}", url)),
            Self::Exhausted { operation, last } => Some(format!("{}: {}", operation, last)),
        }
    }

    /// 调用方输入错误（对应 HTTP 400）
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidStockCode(_) | Self::InvalidDate(_) | Self::InvalidParam(_)
        )
    }

    /// 没有数据（包括上游 404）
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } | Self::NoData(_) => true,
            Self::Exhausted { last, .. } => last.is_not_found(),
            _ => false,
        }
    }

    /// 构造解析错误，原始内容只保留前若干字符
    pub fn parse(context: impl Into<String>, detail: impl std::fmt::Display, payload: &str) -> Self {
        Self::Parse {
            context: context.into(),
            detail: format!("{} (payload: {})", detail, preview(payload)),
        }
    }

    /// 错误体，用于 HTTP 响应
    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            code: self.code(),
            message: self.message().to_string(),
            detail: self.detail(),
        }
    }
}

/// 截断后的文本预览
pub fn preview(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

/// 序列化后的错误信息
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ErrorBody {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}
