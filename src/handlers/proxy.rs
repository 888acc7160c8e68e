//! 代理配置接口

use actix_web::{web, HttpResponse, Result};

use super::respond;
use crate::error::AdataError;
use crate::models::ProxyRequest;
use crate::services::client::ProxyConfig;
use crate::services::stock::StockService;

/// 当前代理配置
pub async fn get_proxy(service: web::Data<StockService>) -> Result<HttpResponse> {
    Ok(respond(Ok::<_, AdataError>(service.http().proxy_config())))
}

/// 修改代理配置，`list` 不传时保持原有代理池
pub async fn set_proxy(
    service: web::Data<StockService>,
    body: web::Json<ProxyRequest>,
) -> Result<HttpResponse> {
    Ok(respond(apply_proxy(&service, body.into_inner())))
}

fn apply_proxy(service: &StockService, request: ProxyRequest) -> Result<ProxyConfig, AdataError> {
    let url = request.url.trim().to_string();
    let no_list = request.list.as_ref().map_or(true, |l| l.is_empty());
    if request.enabled && url.is_empty() && no_list && service.http().proxy_config().list.is_empty() {
        return Err(AdataError::InvalidParam("启用代理时需提供 url 或 list".to_string()));
    }

    let http = service.http();
    http.set_proxy(request.enabled, url);
    if let Some(list) = request.list {
        http.set_proxy_list(list);
    }
    let config = http.proxy_config();
    log::info!(
        "代理配置已更新: enabled={} url={} 代理池 {} 个",
        config.enabled,
        config.url,
        config.list.len()
    );
    Ok(config)
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/proxy", web::get().to(get_proxy))
        .route("/proxy", web::put().to(set_proxy));
}
