use std::time::Duration;

pub const ENV_API_KEY: &str = "API_KEY";
pub const ENV_API_URL: &str = "API_URL";
const ENV_CONNECT_TIMEOUT_SECS: &str = "CODECOMMENTER_CONNECT_TIMEOUT_SECS";
const ENV_TOTAL_TIMEOUT_MS: &str = "CODECOMMENTER_TOTAL_TIMEOUT_MS";
const ENV_MAX_ATTEMPTS: &str = "CODECOMMENTER_MAX_ATTEMPTS";
const ENV_BACKOFF_BASE_MS: &str = "CODECOMMENTER_BACKOFF_BASE_MS";

const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 15;
const DEFAULT_TOTAL_TIMEOUT_MS: u64 = 120_000;
const DEFAULT_MAX_ATTEMPTS: u64 = 3;
const DEFAULT_BACKOFF_BASE_MS: u64 = 1_000;

#[derive(Debug, Clone)]
pub struct CommenterConfig {
    pub api_url: String,
    pub api_key: String,
    pub connect_timeout: Duration,
    // None 表示不设总超时（CODECOMMENTER_TOTAL_TIMEOUT_MS=0）。
    pub total_timeout: Option<Duration>,
    pub max_attempts: u32,
    pub backoff_base: Duration,
}

impl CommenterConfig {
    // 中文注释：凭证与端点缺失属于致命配置错误，在进程启动时报给操作者，
    // 不能推迟成每次请求的运行期失败。
    pub fn from_env() -> Result<CommenterConfig, String> {
        let api_key = env_non_empty(ENV_API_KEY).ok_or_else(|| {
            format!("{ENV_API_KEY} is not set; provide the text-generation endpoint credential")
        })?;
        let api_url = env_non_empty(ENV_API_URL).ok_or_else(|| {
            format!("{ENV_API_URL} is not set; provide the generateContent endpoint URL")
        })?;
        let parsed = url::Url::parse(&api_url)
            .map_err(|err| format!("{ENV_API_URL} is not a valid URL: {err}"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(format!(
                "{ENV_API_URL} must use http or https, got scheme '{}'",
                parsed.scheme()
            ));
        }

        let total_timeout_ms = env_u64_or(ENV_TOTAL_TIMEOUT_MS, DEFAULT_TOTAL_TIMEOUT_MS);
        let total_timeout = if total_timeout_ms == 0 {
            None
        } else {
            Some(Duration::from_millis(total_timeout_ms))
        };
        let max_attempts = env_u64_or(ENV_MAX_ATTEMPTS, DEFAULT_MAX_ATTEMPTS)
            .clamp(1, u64::from(u32::MAX)) as u32;

        Ok(CommenterConfig {
            api_url,
            api_key,
            connect_timeout: Duration::from_secs(env_u64_or(
                ENV_CONNECT_TIMEOUT_SECS,
                DEFAULT_CONNECT_TIMEOUT_SECS,
            )),
            total_timeout,
            max_attempts,
            backoff_base: Duration::from_millis(env_u64_or(
                ENV_BACKOFF_BASE_MS,
                DEFAULT_BACKOFF_BASE_MS,
            )),
        })
    }
}

fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_u64_or(name: &str, default: u64) -> u64 {
    env_non_empty(name)
        .and_then(|value| value.parse::<u64>().ok())
        .unwrap_or(default)
}
