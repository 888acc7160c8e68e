//! 业务逻辑服务模块
//! 
//! 封装数据获取和处理逻辑

pub mod chain;    // 多数据源回退链
pub mod client;   // HTTP 客户端（重试、代理）
pub mod headers;  // 各数据源请求头
pub mod stock;    // 股票数据服务
