//! 各数据源请求头
//!
//! Accept-Encoding 交给 reqwest 自动协商，这里不设置

use rand::seq::SliceRandom;

/// User-Agent 轮换池
pub const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (iPhone; CPU iPhone OS 13_2_3 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/13.0.3 Mobile/15E148 Safari/604.1",
    "Mozilla/5.0 (Linux; Android 8.0.0; SM-G955U Build/R16NW) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/87.0.4280.141 Mobile Safari/537.36",
    "Mozilla/5.0 (Linux; Android 10; SM-G981B) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/80.0.3987.162 Mobile Safari/537.36",
    "Mozilla/5.0 (iPad; CPU OS 13_3 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) CriOS/87.0.4280.77 Mobile/15E148 Safari/604.1",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:109.0) Gecko/20100101 Firefox/110.0",
];

const ACCEPT_LANGUAGE: &str = "zh-CN,zh;q=0.8,zh-TW;q=0.7,zh-HK;q=0.5,en-US;q=0.3,en;q=0.2";

pub type HeaderSet = Vec<(&'static str, String)>;

/// 随机选择一个 User-Agent
pub fn random_user_agent() -> String {
    USER_AGENTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(USER_AGENTS[0])
        .to_string()
}

/// 新浪财经
pub fn sina() -> HeaderSet {
    vec![
        ("User-Agent", random_user_agent()),
        ("Accept", "*/*".to_string()),
        ("Accept-Language", ACCEPT_LANGUAGE.to_string()),
        ("Referer", "https://finance.sina.com.cn/".to_string()),
    ]
}

/// 东方财富
pub fn east() -> HeaderSet {
    vec![
        ("User-Agent", random_user_agent()),
        ("Accept", "*/*".to_string()),
        ("Accept-Language", ACCEPT_LANGUAGE.to_string()),
        ("Referer", "https://data.eastmoney.com/".to_string()),
    ]
}

/// 百度股市通
pub fn baidu() -> HeaderSet {
    vec![
        ("User-Agent", random_user_agent()),
        ("Accept", "application/vnd.finance-web.v1+json".to_string()),
        ("Accept-Language", ACCEPT_LANGUAGE.to_string()),
        ("Origin", "https://gushitong.baidu.com".to_string()),
        ("Referer", "https://gushitong.baidu.com/".to_string()),
    ]
}

/// 腾讯财经
pub fn tencent() -> HeaderSet {
    vec![
        ("User-Agent", random_user_agent()),
        ("Accept", "*/*".to_string()),
        ("Accept-Language", "zh-CN,zh;q=0.9".to_string()),
        ("Referer", "https://stockapp.finance.qq.com/".to_string()),
    ]
}

/// 深交所
pub fn szse() -> HeaderSet {
    vec![
        ("User-Agent", random_user_agent()),
        ("Accept", "application/json, text/plain, */*".to_string()),
        ("Accept-Language", "zh-CN,zh;q=0.9,en;q=0.8".to_string()),
        ("Referer", "https://www.szse.cn/aboutus/calendar/".to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_agent_comes_from_pool() {
        for _ in 0..20 {
            let ua = random_user_agent();
            assert!(USER_AGENTS.contains(&ua.as_str()));
        }
    }

    #[test]
    fn test_provider_headers_have_referer() {
        for set in [sina(), east(), baidu(), tencent(), szse()] {
            assert!(set.iter().any(|(name, _)| *name == "Referer"));
            assert!(set.iter().all(|(name, _)| *name != "Accept-Encoding"));
        }
    }
}
