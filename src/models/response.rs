//! 通用 API 响应模型
//!
//! 定义统一的 API 响应格式

use serde::{Deserialize, Serialize};

use crate::error::AdataError;
use crate::services::stock::common::get_beijing_time;

/// 统一 API 响应结构
///
/// 所有接口返回统一格式，包含：
/// - success: 请求是否成功
/// - code: 0 表示成功，否则为错误码
/// - data: 响应数据（成功时有值）
/// - message: 响应消息
/// - detail: 错误详情（可选）
/// - timestamp: 响应时间戳（北京时间）
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// 请求是否成功
    pub success: bool,
    /// 错误码
    pub code: i32,
    /// 响应数据
    pub data: Option<T>,
    /// 响应消息
    pub message: String,
    /// 错误详情
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// 响应时间戳（ISO 8601 格式）
    pub timestamp: String,
}

impl<T> ApiResponse<T> {
    /// 创建成功响应
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            code: 0,
            data: Some(data),
            message: "Success".to_string(),
            detail: None,
            timestamp: get_beijing_time(),
        }
    }

    /// 创建错误响应
    pub fn error(code: i32, message: String) -> Self {
        Self {
            success: false,
            code,
            data: None,
            message,
            detail: None,
            timestamp: get_beijing_time(),
        }
    }

    /// 由数据获取错误创建响应
    pub fn from_error(err: &AdataError) -> Self {
        let body = err.to_body();
        Self {
            success: false,
            code: body.code,
            data: None,
            message: body.message,
            detail: body.detail,
            timestamp: get_beijing_time(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope() {
        let json = serde_json::to_value(ApiResponse::success(vec![1, 2])).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["code"], 0);
        assert_eq!(json["data"], serde_json::json!([1, 2]));
        assert!(json.get("detail").is_none());
        assert!(json["timestamp"].as_str().unwrap().ends_with("+08:00"));
    }

    #[test]
    fn test_error_envelope() {
        let err = AdataError::InvalidStockCode("12".into());
        let json = serde_json::to_value(ApiResponse::<()>::from_error(&err)).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["code"], 10001);
        assert_eq!(json["message"], "无效的股票代码");
        assert_eq!(json["detail"], "12");
        assert!(json["data"].is_null());
    }
}
