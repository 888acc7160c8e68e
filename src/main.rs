//! A 股行情后端服务
//!
//! 提供股票代码、行情、资金流向和财务数据的 RESTful API 服务
//! 数据来源：百度股市通、东方财富、新浪财经、腾讯财经、深交所

use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use env_logger::Env;

use adata_backend::config::AppConfig;
use adata_backend::handlers;
use adata_backend::middleware::ApiKeyMiddleware;
use adata_backend::services::client::HttpClient;
use adata_backend::services::stock::StockService;

/// 应用程序入口
#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let mut config = AppConfig::load();
    config.apply_env();

    // 初始化日志系统，RUST_LOG 优先于配置文件
    env_logger::init_from_env(Env::default().default_filter_or(config.log.level.as_str()));

    if config.api.api_key.is_empty() {
        log::warn!("未设置 API Key，接口不做认证");
    }

    let http = HttpClient::from_config(&config.api, &config.proxy).context("创建 HTTP 客户端失败")?;
    let service = web::Data::new(StockService::new(Arc::new(http)));
    let api_key = config.api.api_key.clone();
    let bind_addr = config.bind_addr();

    log::info!("启动 A 股行情服务，监听 {}", bind_addr);

    // 创建并启动 HTTP 服务器
    let mut server = HttpServer::new(move || {
        App::new()
            .wrap(ApiKeyMiddleware::new(api_key.clone()))  // API Key 认证
            .wrap(Logger::default())  // 添加请求日志中间件
            .app_data(service.clone())
            .configure(handlers::config)  // 配置路由
    });
    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server
        .bind(&bind_addr)
        .with_context(|| format!("绑定地址 {} 失败", bind_addr))?
        .run()
        .await?;
    Ok(())
}
