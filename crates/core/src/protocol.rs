use serde::{Deserialize, Serialize};

use crate::prompt::SYSTEM_INSTRUCTION;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    pub contents: Vec<Content>,
    #[serde(rename = "systemInstruction")]
    pub system_instruction: Content,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

pub fn build_generate_request(source_text: &str) -> GenerateRequest {
    GenerateRequest {
        contents: vec![Content {
            parts: vec![Part {
                text: source_text.to_string(),
            }],
        }],
        system_instruction: Content {
            parts: vec![Part {
                text: SYSTEM_INSTRUCTION.to_string(),
            }],
        },
    }
}

// 中文注释：candidates 路径逐层可缺失；这里只走一条显式路径，缺哪层都返回 None，
// 不做逐字段默认值兜底，避免把结构非法的响应误判成“空文本”。
pub fn first_candidate_text(response: &GenerateResponse) -> Option<&str> {
    response
        .candidates
        .first()?
        .content
        .as_ref()?
        .parts
        .first()
        .map(|part| part.text.as_str())
}

pub fn request_url(api_url: &str, api_key: &str) -> String {
    let joiner = if api_url.contains('?') { '&' } else { '?' };
    format!("{api_url}{joiner}key={}", urlencoding::encode(api_key))
}
