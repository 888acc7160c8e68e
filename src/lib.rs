//! A 股多数据源行情服务
//!
//! 从百度股市通、东方财富、新浪财经、腾讯财经、深交所获取数据，
//! 按固定顺序回退并统一为标准记录

pub mod config;     // 配置加载
pub mod error;      // 错误类型
pub mod handlers;   // HTTP 请求处理器
pub mod middleware; // 中间件
pub mod models;     // 数据模型定义
pub mod services;   // 业务逻辑服务
