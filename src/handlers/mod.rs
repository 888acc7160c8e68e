pub mod health;
pub mod proxy;
pub mod stock;

use actix_web::{http::StatusCode, web, HttpResponse};
use serde::Serialize;

use crate::error::AdataError;
use crate::models::ApiResponse;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(health::config)
            .configure(proxy::config)
            .configure(stock::config)
    );
}

/// 错误对应的 HTTP 状态码：输入错误 400，无数据 404，其余 502
pub fn error_status(err: &AdataError) -> StatusCode {
    if err.is_client_error() {
        StatusCode::BAD_REQUEST
    } else if err.is_not_found() {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::BAD_GATEWAY
    }
}

/// 将服务结果包装为统一响应
pub fn respond<T: Serialize>(result: Result<T, AdataError>) -> HttpResponse {
    match result {
        Ok(data) => HttpResponse::Ok().json(ApiResponse::success(data)),
        Err(e) => {
            log::warn!("请求失败: {}", e);
            HttpResponse::build(error_status(&e)).json(ApiResponse::<T>::from_error(&e))
        }
    }
}
