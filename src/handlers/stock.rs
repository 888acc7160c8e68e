use actix_web::{web, HttpResponse, Result};

use super::respond;
use crate::error::AdataError;
use crate::models::{
    AdjustType, CodesQuery, DateRangeQuery, KType, MarketParams, MarketQuery, SharesQuery,
};
use crate::services::stock::common::parse_optional_date;
use crate::services::stock::StockService;

type Service = web::Data<StockService>;

// ==================== 代码表 ====================

pub async fn list_codes(service: Service) -> Result<HttpResponse> {
    Ok(respond(service.all_code().await))
}

pub async fn list_indexes(service: Service) -> Result<HttpResponse> {
    Ok(respond(service.all_index_code().await))
}

pub async fn list_concepts(service: Service) -> Result<HttpResponse> {
    Ok(respond(service.all_concept_code_east().await))
}

pub async fn trade_calendar(service: Service, path: web::Path<i32>) -> Result<HttpResponse> {
    Ok(respond(service.trade_calendar(path.into_inner()).await))
}

// ==================== 行情 ====================

/// 查询参数转为K线参数，未指定的类型取默认值
fn market_params(code: String, query: &MarketQuery) -> Result<MarketParams, AdataError> {
    let k_type = query.k_type.map(KType::try_from).transpose()?.unwrap_or_default();
    let adjust_type = query
        .adjust_type
        .map(AdjustType::try_from)
        .transpose()?
        .unwrap_or_default();
    Ok(MarketParams::new(code)
        .range(
            parse_optional_date(query.start_date.as_deref())?,
            parse_optional_date(query.end_date.as_deref())?,
        )
        .k_type(k_type)
        .adjust_type(adjust_type))
}

pub async fn get_market(
    service: Service,
    path: web::Path<String>,
    query: web::Query<MarketQuery>,
) -> Result<HttpResponse> {
    let result = match market_params(path.into_inner(), &query) {
        Ok(params) => service.get_market(&params).await,
        Err(e) => Err(e),
    };
    Ok(respond(result))
}

pub async fn get_market_min(service: Service, path: web::Path<String>) -> Result<HttpResponse> {
    Ok(respond(service.get_market_min(&path).await))
}

pub async fn list_market_current(
    service: Service,
    query: web::Query<CodesQuery>,
) -> Result<HttpResponse> {
    Ok(respond(service.list_market_current(&query.codes()).await))
}

pub async fn get_market_five(service: Service, path: web::Path<String>) -> Result<HttpResponse> {
    Ok(respond(service.get_market_five(&path).await))
}

// ==================== 资金流向 ====================

pub async fn get_capital_flow(
    service: Service,
    path: web::Path<String>,
    query: web::Query<DateRangeQuery>,
) -> Result<HttpResponse> {
    let result = service
        .get_capital_flow(&path, query.start_date.as_deref(), query.end_date.as_deref())
        .await;
    Ok(respond(result))
}

pub async fn get_capital_flow_min(service: Service, path: web::Path<String>) -> Result<HttpResponse> {
    Ok(respond(service.get_capital_flow_min(&path).await))
}

// ==================== 个股资料 ====================

pub async fn get_concepts(service: Service, path: web::Path<String>) -> Result<HttpResponse> {
    Ok(respond(service.get_concept_east(&path).await))
}

pub async fn get_shares(
    service: Service,
    path: web::Path<String>,
    query: web::Query<SharesQuery>,
) -> Result<HttpResponse> {
    Ok(respond(service.get_stock_shares(&path, query.history).await))
}

pub async fn get_industry(service: Service, path: web::Path<String>) -> Result<HttpResponse> {
    Ok(respond(service.get_industry_sw(&path).await))
}

// ==================== 财务 ====================

pub async fn get_core_index(service: Service, path: web::Path<String>) -> Result<HttpResponse> {
    Ok(respond(service.get_core_index(&path).await))
}

pub async fn get_balance(service: Service, path: web::Path<String>) -> Result<HttpResponse> {
    Ok(respond(service.get_balance(&path).await))
}

pub async fn get_cash_flow(service: Service, path: web::Path<String>) -> Result<HttpResponse> {
    Ok(respond(service.get_cash_flow(&path).await))
}

pub async fn get_profit(service: Service, path: web::Path<String>) -> Result<HttpResponse> {
    Ok(respond(service.get_profit(&path).await))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/stocks")
            .route("/codes", web::get().to(list_codes))
            .route("/indexes", web::get().to(list_indexes))
            .route("/concepts", web::get().to(list_concepts))
            .route("/current", web::get().to(list_market_current))
            .route("/calendar/{year}", web::get().to(trade_calendar))
            .route("/{code}/market", web::get().to(get_market))
            .route("/{code}/market/min", web::get().to(get_market_min))
            .route("/{code}/five", web::get().to(get_market_five))
            .route("/{code}/flow", web::get().to(get_capital_flow))
            .route("/{code}/flow/min", web::get().to(get_capital_flow_min))
            .route("/{code}/concepts", web::get().to(get_concepts))
            .route("/{code}/shares", web::get().to(get_shares))
            .route("/{code}/industry", web::get().to(get_industry))
            .route("/{code}/finance/core", web::get().to(get_core_index))
            .route("/{code}/finance/balance", web::get().to(get_balance))
            .route("/{code}/finance/cashflow", web::get().to(get_cash_flow))
            .route("/{code}/finance/profit", web::get().to(get_profit))
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::client::tests::ScriptedTransport;
    use crate::services::stock::tests::service_with;
    use actix_web::{test, App};
    use std::sync::Arc;

    async fn call(
        transport: Arc<ScriptedTransport>,
        uri: &str,
    ) -> (u16, serde_json::Value) {
        let service = web::Data::new(service_with(transport));
        let app = test::init_service(App::new().app_data(service).configure(config)).await;
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        let status = resp.status().as_u16();
        let body: serde_json::Value = test::read_body_json(resp).await;
        (status, body)
    }

    #[actix_web::test]
    async fn test_market_route() {
        let transport = ScriptedTransport::new(vec![ScriptedTransport::ok(
            r#"{"data":{"klines":["2024-01-02,9.39,9.21,9.42,9.21,1158366,1075742252.45,2.24,-1.92,-0.18,0.60"]}}"#,
        )]);
        let (status, body) = call(transport, "/stocks/000001/market?start_date=2024-01-01&k_type=1").await;
        assert_eq!(status, 200);
        assert_eq!(body["success"], true);
        assert_eq!(body["code"], 0);
        assert_eq!(body["data"][0]["trade_date"], "2024-01-02");
    }

    #[actix_web::test]
    async fn test_invalid_code_is_bad_request() {
        let transport = ScriptedTransport::new(vec![]);
        let (status, body) = call(transport.clone(), "/stocks/abc/five").await;
        assert_eq!(status, 400);
        assert_eq!(body["code"], 10001);
        assert_eq!(transport.calls(), 0);
    }

    #[actix_web::test]
    async fn test_bad_k_type_is_bad_request() {
        let (status, body) = call(ScriptedTransport::new(vec![]), "/stocks/000001/market?k_type=9").await;
        assert_eq!(status, 400);
        assert_eq!(body["code"], 10003);
    }

    #[actix_web::test]
    async fn test_no_data_is_not_found() {
        let transport = ScriptedTransport::new(vec![ScriptedTransport::ok(r#"{"data":{"klines":[]}}"#)]);
        let (status, body) = call(transport, "/stocks/600036/flow/min").await;
        assert_eq!(status, 404);
        assert_eq!(body["code"], 30002);
        assert!(body["detail"].as_str().unwrap().contains("get_capital_flow_min"));
    }

    #[actix_web::test]
    async fn test_upstream_failure_is_bad_gateway() {
        let (status, body) = call(ScriptedTransport::new(vec![]), "/stocks/600036/market/min").await;
        assert_eq!(status, 502);
        assert_eq!(body["success"], false);
    }

    #[actix_web::test]
    async fn test_current_requires_codes() {
        let (status, _) = call(ScriptedTransport::new(vec![]), "/stocks/current").await;
        assert_eq!(status, 400);
    }

    #[actix_web::test]
    async fn test_profit_route() {
        let transport = ScriptedTransport::new(vec![ScriptedTransport::ok(
            r#"{"success":true,"code":0,"result":{"data":[
                {"SECURITY_CODE":"600036","REPORT_DATE":"2023-12-31 00:00:00","REPORT_TYPE":"年报","TOTAL_PROFIT":1.5e11}
            ]}}"#,
        )]);
        let (status, body) = call(transport, "/stocks/600036/finance/profit").await;
        assert_eq!(status, 200);
        assert_eq!(body["data"][0]["stock_code"], "600036");
        assert_eq!(body["data"][0]["total_profit"], 1.5e11);
    }
}
