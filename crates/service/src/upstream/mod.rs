pub(crate) mod backoff;
pub(crate) mod deadline;
pub(crate) mod transport;

use std::time::{Duration, Instant};

use codecommenter_core::outcome::{CommentFailure, CommentResult};
use codecommenter_core::protocol::{
    build_generate_request, first_candidate_text, GenerateRequest, GenerateResponse,
};

use crate::config::CommenterConfig;
use transport::TransportError;

pub fn build_client(config: &CommenterConfig) -> reqwest::blocking::Client {
    reqwest::blocking::Client::builder()
        // 中文注释：总超时按 deadline 逐次下发到每个请求，这里显式关闭 client 级超时避免双重计时。
        .timeout(None::<Duration>)
        .connect_timeout(config.connect_timeout)
        .pool_max_idle_per_host(4)
        .pool_idle_timeout(Some(Duration::from_secs(90)))
        .tcp_keepalive(Some(Duration::from_secs(30)))
        .build()
        .unwrap_or_else(|_| reqwest::blocking::Client::new())
}

pub fn request_comments(
    config: &CommenterConfig,
    client: &reqwest::blocking::Client,
    source_text: &str,
) -> CommentResult {
    let deadline = deadline::request_deadline(Instant::now(), config.total_timeout);
    run_attempts(
        config,
        source_text,
        deadline,
        |payload| transport::send_generate_request(client, config, payload, deadline),
        |delay| std::thread::sleep(delay),
    )
}

// 中文注释：send/wait 以闭包注入，重试语义才能在不起 HTTP 服务的前提下被单测覆盖。
fn run_attempts<S, W>(
    config: &CommenterConfig,
    source_text: &str,
    deadline: Option<Instant>,
    mut send: S,
    mut wait: W,
) -> CommentResult
where
    S: FnMut(&GenerateRequest) -> Result<String, TransportError>,
    W: FnMut(Duration),
{
    if source_text.trim().is_empty() {
        return Err(CommentFailure::EmptyInput);
    }

    let payload = build_generate_request(source_text);
    let max_attempts = config.max_attempts.max(1);
    for attempt in 0..max_attempts {
        if deadline::is_expired(deadline) {
            log::warn!("event=comment_deadline_exceeded attempts={attempt}");
            return Err(CommentFailure::Network { attempts: attempt });
        }
        match send(&payload) {
            Ok(body) => return interpret_body(&body),
            Err(err) => {
                if attempt + 1 >= max_attempts {
                    log::warn!(
                        "event=comment_upstream_failed attempts={} err={}",
                        max_attempts,
                        err.describe()
                    );
                    return Err(CommentFailure::Network {
                        attempts: max_attempts,
                    });
                }
                log::warn!(
                    "event=comment_upstream_retry attempt={} err={}",
                    attempt,
                    err.describe()
                );
                if !backoff::wait_before_retry(config.backoff_base, attempt, deadline, &mut wait) {
                    return Err(CommentFailure::Network {
                        attempts: attempt + 1,
                    });
                }
            }
        }
    }
    Err(CommentFailure::Network {
        attempts: max_attempts,
    })
}

// 重试只覆盖收发阶段；响应体一旦拿到，解析失败直接终止，不再消耗剩余尝试。
fn interpret_body(body: &str) -> CommentResult {
    let response: GenerateResponse = match serde_json::from_str(body) {
        Ok(response) => response,
        Err(err) => {
            return Err(CommentFailure::Unexpected {
                message: format!("malformed upstream response: {err}"),
            })
        }
    };
    match first_candidate_text(&response) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Err(CommentFailure::EmptyModelResponse),
    }
}
