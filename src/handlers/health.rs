use actix_web::{web, HttpResponse, Result};
use serde::Serialize;

use crate::models::ApiResponse;
use crate::services::stock::common::is_market_open;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    /// 当前是否处于 A 股交易时段
    pub market_open: bool,
}

pub async fn health_check() -> Result<HttpResponse> {
    let response = ApiResponse::success(HealthStatus {
        status: "healthy",
        market_open: is_market_open(),
    });
    Ok(HttpResponse::Ok().json(response))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check));
}
