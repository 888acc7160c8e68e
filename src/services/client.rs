//! HTTP 传输层
//!
//! 负责超时、重试、代理轮换以及状态码处理，所有数据源共用。
//!
//! - 2xx 直接返回
//! - 404 视为“数据不存在”，立即返回，不重试
//! - 其他状态码或网络错误按 `wait * 尝试序号` 线性退避重试

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use futures::future::BoxFuture;
use rand::seq::SliceRandom;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{ApiConfig, ProxySettings};
use crate::error::{preview, AdataError, Result};

/// HTTP 方法
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// 一次上游请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: BTreeMap<String, String>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query: Vec::new(),
            headers: BTreeMap::new(),
            body: None,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, url)
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    pub fn params<K, V, I>(mut self, params: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        self.query
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn headers<I>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, String)>,
    {
        for (name, value) in headers {
            self.headers.insert(name.to_string(), value);
        }
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// 上游响应
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// 网络层错误（DNS、连接被拒、超时等）
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// 单次请求的发送实现
pub trait Transport: Send + Sync {
    fn send<'a>(
        &'a self,
        request: &'a HttpRequest,
        proxy: Option<&'a str>,
    ) -> BoxFuture<'a, std::result::Result<HttpResponse, TransportError>>;
}

/// 基于 reqwest 的传输实现
///
/// 代理地址在 reqwest 中绑定到 Client，因此每个代理地址缓存一个 Client
pub struct ReqwestTransport {
    client: reqwest::Client,
    proxied: Mutex<HashMap<String, reqwest::Client>>,
    timeout: Duration,
    connect_timeout: Duration,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration, connect_timeout: Duration) -> Result<Self> {
        let client = Self::builder(timeout, connect_timeout)
            .build()
            .map_err(|e| AdataError::InvalidParam(format!("创建 HTTP 客户端失败: {}", e)))?;
        Ok(Self {
            client,
            proxied: Mutex::new(HashMap::new()),
            timeout,
            connect_timeout,
        })
    }

    fn builder(timeout: Duration, connect_timeout: Duration) -> reqwest::ClientBuilder {
        reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .cookie_store(true)
            .gzip(true)
    }

    fn client_for(&self, proxy: Option<&str>) -> std::result::Result<reqwest::Client, TransportError> {
        let Some(proxy_url) = proxy else {
            return Ok(self.client.clone());
        };

        let mut cache = self
            .proxied
            .lock()
            .map_err(|_| TransportError("代理客户端缓存锁已损坏".to_string()))?;
        if let Some(client) = cache.get(proxy_url) {
            return Ok(client.clone());
        }

        let proxy = reqwest::Proxy::all(proxy_url)
            .map_err(|e| TransportError(format!("无效的代理地址 {}: {}", proxy_url, e)))?;
        let client = Self::builder(self.timeout, self.connect_timeout)
            .proxy(proxy)
            .build()
            .map_err(|e| TransportError(format!("创建代理客户端失败: {}", e)))?;
        cache.insert(proxy_url.to_string(), client.clone());
        Ok(client)
    }
}

impl Transport for ReqwestTransport {
    fn send<'a>(
        &'a self,
        request: &'a HttpRequest,
        proxy: Option<&'a str>,
    ) -> BoxFuture<'a, std::result::Result<HttpResponse, TransportError>> {
        Box::pin(async move {
            let client = self.client_for(proxy)?;

            let mut builder = match request.method {
                HttpMethod::Get => client.get(&request.url),
                HttpMethod::Post => client.post(&request.url),
            };

            if !request.query.is_empty() {
                builder = builder.query(&request.query);
            }
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            if let Some(body) = &request.body {
                builder = builder.body(body.clone());
            }

            let response = builder.send().await.map_err(|e| {
                if e.is_timeout() {
                    TransportError(format!("请求超时: {}", e))
                } else if e.is_connect() {
                    TransportError(format!("连接失败: {}", e))
                } else {
                    TransportError(format!("请求失败: {}", e))
                }
            })?;

            let status = response.status().as_u16();
            let body = response
                .bytes()
                .await
                .map_err(|e| TransportError(format!("读取响应失败: {}", e)))?;

            Ok(HttpResponse::new(status, body.to_vec()))
        })
    }
}

/// 重试策略，客户端创建后不再修改
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 最大尝试次数（至少 1 次）
    pub attempts: u32,
    /// 基础等待时间
    pub wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            wait: Duration::from_millis(100),
        }
    }
}

impl RetryPolicy {
    pub fn new(attempts: u32, wait: Duration) -> Self {
        Self { attempts, wait }
    }

    /// 第 attempt 次尝试前的等待时间（从 0 开始计数，首次不等待）
    pub fn delay(&self, attempt: u32) -> Duration {
        self.wait * attempt
    }
}

/// 代理配置（多读单写）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyConfig {
    pub enabled: bool,
    pub url: String,
    pub list: Vec<String>,
}

impl From<&ProxySettings> for ProxyConfig {
    fn from(settings: &ProxySettings) -> Self {
        Self {
            enabled: settings.enabled,
            url: settings.url.clone(),
            list: settings.list.clone(),
        }
    }
}

/// 数据源 HTTP 客户端
///
/// 显式创建并注入到各个服务中，不存在全局默认实例
pub struct HttpClient {
    transport: Arc<dyn Transport>,
    retry: RetryPolicy,
    proxy: Arc<RwLock<ProxyConfig>>,
}

impl HttpClient {
    /// 根据配置创建使用 reqwest 的客户端
    pub fn from_config(api: &ApiConfig, proxy: &ProxySettings) -> Result<Self> {
        let transport = ReqwestTransport::new(api.timeout(), api.connect_timeout())?;
        let client = Self::with_transport(
            Arc::new(transport),
            RetryPolicy::new(api.retry_times, api.retry_wait()),
        );
        client.replace_proxy(ProxyConfig::from(proxy));
        Ok(client)
    }

    /// 使用自定义传输实现创建客户端
    pub fn with_transport(transport: Arc<dyn Transport>, retry: RetryPolicy) -> Self {
        Self {
            transport,
            retry,
            proxy: Arc::new(RwLock::new(ProxyConfig::default())),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// 修改重试策略，只应在初始化阶段调用
    pub fn set_retry_config(&mut self, attempts: u32, wait: Duration) {
        self.retry = RetryPolicy::new(attempts, wait);
    }

    /// 设置代理开关和单个代理地址
    pub fn set_proxy(&self, enabled: bool, url: impl Into<String>) {
        let url = url.into();
        self.write_proxy(|config| {
            config.enabled = enabled;
            config.url = url;
        });
    }

    /// 设置代理池
    pub fn set_proxy_list(&self, list: Vec<String>) {
        self.write_proxy(|config| config.list = list);
    }

    /// 整体替换代理配置
    pub fn replace_proxy(&self, proxy: ProxyConfig) {
        self.write_proxy(|config| *config = proxy);
    }

    /// 当前代理配置快照
    pub fn proxy_config(&self) -> ProxyConfig {
        match self.proxy.read() {
            Ok(config) => config.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn write_proxy(&self, update: impl FnOnce(&mut ProxyConfig)) {
        let mut guard = match self.proxy.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        update(&mut guard);
    }

    /// 为本次尝试选择代理，代理池优先
    fn pick_proxy(&self) -> Option<String> {
        let config = match self.proxy.read() {
            Ok(config) => config,
            Err(poisoned) => poisoned.into_inner(),
        };
        if !config.enabled {
            return None;
        }
        let picked = config
            .list
            .choose(&mut rand::thread_rng())
            .cloned()
            .unwrap_or_else(|| config.url.clone());
        (!picked.is_empty()).then_some(picked)
    }

    /// 发送请求（带重试）
    pub async fn fetch(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let attempts = self.retry.attempts.max(1);
        let mut last_error = String::new();

        for attempt in 0..attempts {
            if attempt > 0 {
                tokio::time::sleep(self.retry.delay(attempt)).await;
            }

            let proxy = self.pick_proxy();
            log::debug!(
                "请求 {} (第 {}/{} 次{})",
                request.url,
                attempt + 1,
                attempts,
                proxy.as_deref().map(|p| format!("，代理 {}", p)).unwrap_or_default()
            );

            match self.transport.send(request, proxy.as_deref()).await {
                Ok(response) if response.is_success() => return Ok(response),
                Ok(response) if response.status == 404 => {
                    return Err(AdataError::NotFound {
                        url: request.url.clone(),
                    });
                }
                Ok(response) => {
                    last_error = format!("HTTP {}: {}", response.status, preview(&response.text()));
                }
                Err(e) => {
                    last_error = e.to_string();
                }
            }
            log::debug!("请求 {} 失败: {}", request.url, last_error);
        }

        Err(AdataError::Request {
            url: request.url.clone(),
            attempts,
            detail: last_error,
        })
    }

    /// 获取 UTF-8 文本响应
    pub async fn get_text(&self, request: &HttpRequest) -> Result<String> {
        Ok(self.fetch(request).await?.text())
    }

    /// 获取 GBK 编码的文本响应（新浪、腾讯行情）
    pub async fn get_gbk_text(&self, request: &HttpRequest) -> Result<String> {
        let response = self.fetch(request).await?;
        let (text, _, _) = encoding_rs::GBK.decode(&response.body);
        Ok(text.into_owned())
    }

    /// 获取 JSON 响应并按给定结构解析
    pub async fn get_json<T: DeserializeOwned>(&self, request: &HttpRequest) -> Result<T> {
        let response = self.fetch(request).await?;
        serde_json::from_slice(&response.body).map_err(|e| {
            AdataError::parse(format!("JSON解析失败 {}", request.url), e, &response.text())
        })
    }
}
