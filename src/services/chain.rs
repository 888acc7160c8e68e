//! 多数据源回退链
//!
//! 按固定顺序依次尝试各数据源，第一个满足接受条件的结果即为最终结果。
//! 单个数据源的失败只记录日志，全部失败时返回最后一个错误。

use std::future::Future;
use std::time::Duration;

use futures::future::BoxFuture;

use crate::error::{AdataError, Result};

/// 数据源结果的接受条件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acceptance {
    /// 至少一条记录
    NonEmpty,
    /// 至少 n 条记录
    AtLeast(usize),
}

impl Acceptance {
    pub fn accepts(&self, len: usize) -> bool {
        match self {
            Self::NonEmpty => len > 0,
            Self::AtLeast(n) => len >= *n && len > 0,
        }
    }
}

type FetchFn<'a, T> = Box<dyn FnOnce() -> BoxFuture<'a, Result<Vec<T>>> + Send + 'a>;

/// 回退链中的一个数据源
pub struct Provider<'a, T> {
    name: &'static str,
    acceptance: Acceptance,
    fetch: FetchFn<'a, T>,
}

impl<'a, T: Send + 'a> Provider<'a, T> {
    pub fn new<F, Fut>(name: &'static str, acceptance: Acceptance, fetch: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'a,
        Fut: Future<Output = Result<Vec<T>>> + Send + 'a,
    {
        Self {
            name,
            acceptance,
            fetch: Box::new(move || Box::pin(fetch())),
        }
    }
}

/// 一次逻辑操作的数据源链
pub struct SourceChain<'a, T> {
    operation: String,
    providers: Vec<Provider<'a, T>>,
}

impl<'a, T: Send + 'a> SourceChain<'a, T> {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            providers: Vec::new(),
        }
    }

    pub fn provider(mut self, provider: Provider<'a, T>) -> Self {
        self.providers.push(provider);
        self
    }

    /// 依次执行，返回第一个被接受的结果
    pub async fn run(self) -> Result<Vec<T>> {
        let operation = self.operation;
        if self.providers.is_empty() {
            return Err(AdataError::InvalidParam(format!("{} 没有可用的数据源", operation)));
        }

        let mut last_error = None;
        for provider in self.providers {
            let name = provider.name;
            match (provider.fetch)().await {
                Ok(records) if provider.acceptance.accepts(records.len()) => {
                    log::info!("{} 使用数据源 {} 成功，共 {} 条", operation, name, records.len());
                    return Ok(records);
                }
                Ok(records) => {
                    log::warn!(
                        "{} 数据源 {} 返回 {} 条记录，未达到接受条件 {:?}",
                        operation,
                        name,
                        records.len(),
                        provider.acceptance
                    );
                    last_error = Some(AdataError::NoData(format!(
                        "{} 返回 {} 条记录，未达到接受条件",
                        name,
                        records.len()
                    )));
                }
                Err(e) => {
                    log::warn!("{} 数据源 {} 失败: {}", operation, name, e);
                    last_error = Some(e);
                }
            }
        }

        let last = last_error.unwrap_or_else(|| AdataError::NoData(operation.clone()));
        Err(AdataError::Exhausted {
            operation,
            last: Box::new(last),
        })
    }
}

/// 分页拉取
///
/// 页码从 1 开始。遇到空页、不满一页或达到页数上限时停止，两页之间固定等待 `delay`。
/// 第一页失败即整体失败，后续页失败则返回已获取的数据。
pub async fn paginate<T, F, Fut>(
    label: &str,
    page_size: usize,
    max_pages: usize,
    delay: Duration,
    mut fetch_page: F,
) -> Result<Vec<T>>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
{
    let mut all = Vec::new();

    for page in 1..=max_pages {
        if page > 1 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let records = match fetch_page(page).await {
            Ok(records) => records,
            Err(e) if page == 1 => return Err(e),
            Err(e) => {
                log::warn!("{} 第 {} 页获取失败，停止翻页: {}", label, page, e);
                break;
            }
        };

        let count = records.len();
        log::debug!("{} 第 {} 页获取 {} 条", label, page, count);
        all.extend(records);

        if count < page_size {
            break;
        }
    }

    Ok(all)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn failing() -> AdataError {
        AdataError::Request {
            url: "https://example.test".into(),
            attempts: 3,
            detail: "connection refused".into(),
        }
    }

    #[tokio::test]
    async fn test_first_accepted_provider_wins() {
        let fourth_called = AtomicUsize::new(0);
        let fourth = &fourth_called;

        let result = SourceChain::new("all_code")
            .provider(Provider::new("one", Acceptance::NonEmpty, || async {
                Err(failing())
            }))
            .provider(Provider::new("two", Acceptance::AtLeast(5), || async {
                Ok(vec![1, 2, 3])
            }))
            .provider(Provider::new("three", Acceptance::AtLeast(5), || async {
                Ok(vec![1, 2, 3, 4, 5, 6])
            }))
            .provider(Provider::new("four", Acceptance::NonEmpty, move || async move {
                fourth.fetch_add(1, Ordering::SeqCst);
                Ok(vec![9])
            }))
            .run()
            .await
            .unwrap();

        assert_eq!(result, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(fourth_called.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_exhausted_chain_keeps_last_error() {
        let err = SourceChain::<i32>::new("get_market")
            .provider(Provider::new("east", Acceptance::NonEmpty, || async {
                Err(failing())
            }))
            .provider(Provider::new("baidu", Acceptance::NonEmpty, || async {
                Err(AdataError::NotFound {
                    url: "https://example.test/404".into(),
                })
            }))
            .run()
            .await
            .unwrap_err();

        match err {
            AdataError::Exhausted { operation, last } => {
                assert_eq!(operation, "get_market");
                assert_eq!(last.code(), 20003);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_rejected_result_becomes_no_data() {
        let err = SourceChain::new("list_market_current")
            .provider(Provider::new("sina", Acceptance::NonEmpty, || async {
                Ok(Vec::<i32>::new())
            }))
            .run()
            .await
            .unwrap_err();
        match err {
            AdataError::Exhausted { last, .. } => assert_eq!(last.code(), 30001),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_empty_chain_is_invalid() {
        let err = SourceChain::<i32>::new("empty").run().await.unwrap_err();
        assert!(err.is_client_error());
    }

    #[test]
    fn test_acceptance() {
        assert!(!Acceptance::NonEmpty.accepts(0));
        assert!(Acceptance::NonEmpty.accepts(1));
        assert!(!Acceptance::AtLeast(5000).accepts(4999));
        assert!(Acceptance::AtLeast(5000).accepts(5000));
        assert!(!Acceptance::AtLeast(0).accepts(0));
    }

    #[tokio::test]
    async fn test_paginate_stops_on_short_page() {
        let calls = AtomicUsize::new(0);
        let records = paginate("test", 3, 10, Duration::ZERO, |page| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                Ok(match page {
                    1 | 2 => vec![page; 3],
                    _ => vec![page; 1],
                })
            }
        })
        .await
        .unwrap();

        assert_eq!(records.len(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_paginate_respects_page_bound() {
        let records = paginate("test", 2, 4, Duration::ZERO, |page| async move {
            Ok(vec![page, page])
        })
        .await
        .unwrap();
        assert_eq!(records, vec![1, 1, 2, 2, 3, 3, 4, 4]);
    }

    #[tokio::test]
    async fn test_paginate_failure_after_first_page_keeps_collected() {
        let records = paginate("test", 2, 10, Duration::ZERO, |page| async move {
            if page == 3 {
                Err(failing())
            } else {
                Ok(vec![page, page])
            }
        })
        .await
        .unwrap();
        assert_eq!(records, vec![1, 1, 2, 2]);

        let err = paginate::<usize, _, _>("test", 2, 10, Duration::ZERO, |_| async {
            Err(failing())
        })
        .await
        .unwrap_err();
        assert_eq!(err.code(), 20001);
    }
}
