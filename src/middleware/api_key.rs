//! API Key 认证中间件
//!
//! 通过 Header 中的 Authorization: Bearer <token> 进行认证，配置的 key 为空时不做认证

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpResponse,
    body::EitherBody,
};
use futures::future::{ok, LocalBoxFuture, Ready};
use std::rc::Rc;

use crate::models::ApiResponse;

/// 认证失败的错误码
pub const UNAUTHORIZED_CODE: i32 = 401;

/// API Key 中间件
pub struct ApiKeyMiddleware {
    api_key: Rc<String>,
}

impl ApiKeyMiddleware {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Rc::new(api_key.into()),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for ApiKeyMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = ApiKeyMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(ApiKeyMiddlewareService {
            service: Rc::new(service),
            api_key: self.api_key.clone(),
        })
    }
}

pub struct ApiKeyMiddlewareService<S> {
    service: Rc<S>,
    api_key: Rc<String>,
}

impl<S, B> Service<ServiceRequest> for ApiKeyMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let api_key = self.api_key.clone();

        Box::pin(async move {
            // 未配置 key 或健康检查接口直接放行
            if api_key.is_empty() || req.path().ends_with("/health") {
                let res = service.call(req).await?;
                return Ok(res.map_into_left_body());
            }

            let provided_key = req
                .headers()
                .get("Authorization")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.strip_prefix("Bearer "));

            match provided_key {
                Some(key) if key == api_key.as_str() => {
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
                _ => {
                    log::warn!("认证失败: {} {}", req.method(), req.path());
                    let response = HttpResponse::Unauthorized().json(ApiResponse::<()>::error(
                        UNAUTHORIZED_CODE,
                        "无效的 Bearer Token".to_string(),
                    ));
                    Ok(req.into_response(response).map_into_right_body())
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, web, App};

    async fn ok_handler() -> HttpResponse {
        HttpResponse::Ok().finish()
    }

    macro_rules! app {
        ($key:expr) => {
            test::init_service(
                App::new()
                    .wrap(ApiKeyMiddleware::new($key))
                    .route("/api/v1/health", web::get().to(ok_handler))
                    .route("/api/v1/stocks/codes", web::get().to(ok_handler)),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_rejects_missing_or_wrong_token() {
        let app = app!("secret");

        let req = test::TestRequest::get().uri("/api/v1/stocks/codes").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], UNAUTHORIZED_CODE);
        assert_eq!(body["success"], false);

        let req = test::TestRequest::get()
            .uri("/api/v1/stocks/codes")
            .insert_header(("Authorization", "Bearer wrong"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 401);
    }

    #[actix_web::test]
    async fn test_accepts_valid_token_and_health() {
        let app = app!("secret");

        let req = test::TestRequest::get()
            .uri("/api/v1/stocks/codes")
            .insert_header(("Authorization", "Bearer secret"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 200);

        let req = test::TestRequest::get().uri("/api/v1/health").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 200);
    }

    #[actix_web::test]
    async fn test_empty_key_disables_auth() {
        let app = app!("");
        let req = test::TestRequest::get().uri("/api/v1/stocks/codes").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 200);
    }
}
