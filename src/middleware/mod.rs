//! 中间件

mod api_key;

pub use api_key::ApiKeyMiddleware;
