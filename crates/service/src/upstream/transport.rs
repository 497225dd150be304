use codecommenter_core::protocol::{request_url, GenerateRequest};
use std::time::Instant;

use crate::config::CommenterConfig;

#[derive(Debug)]
pub(crate) enum TransportError {
    Http { status: u16 },
    Network { message: String },
}

impl TransportError {
    pub(crate) fn describe(&self) -> String {
        match self {
            TransportError::Http { status } => format!("upstream status {status}"),
            TransportError::Network { message } => message.clone(),
        }
    }
}

pub(super) fn send_generate_request(
    client: &reqwest::blocking::Client,
    config: &CommenterConfig,
    payload: &GenerateRequest,
    deadline: Option<Instant>,
) -> Result<String, TransportError> {
    let url = request_url(&config.api_url, &config.api_key);
    let mut builder = client
        .post(&url)
        .header("content-type", "application/json")
        .json(payload);
    if let Some(timeout) = super::deadline::send_timeout(deadline) {
        builder = builder.timeout(timeout);
    }
    let response = builder.send().map_err(|err| TransportError::Network {
        message: err.to_string(),
    })?;

    let status = response.status();
    if status.is_client_error() || status.is_server_error() {
        return Err(TransportError::Http {
            status: status.as_u16(),
        });
    }
    // 中文注释：读响应体仍属于收发阶段，读失败与发送失败同样按网络错误重试。
    response.text().map_err(|err| TransportError::Network {
        message: err.to_string(),
    })
}
