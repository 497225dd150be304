use codecommenter_core::prompt::SYSTEM_INSTRUCTION;
use codecommenter_core::protocol::{build_generate_request, first_candidate_text, request_url, GenerateResponse};

#[test]
fn generate_request_matches_wire_shape() {
    let request = build_generate_request("print(1)");
    let value = serde_json::to_value(&request).expect("serialize");
    assert_eq!(
        value,
        serde_json::json!({
            "contents": [{ "parts": [{ "text": "print(1)" }] }],
            "systemInstruction": { "parts": [{ "text": SYSTEM_INSTRUCTION }] }
        })
    );
}

#[test]
fn first_candidate_text_extracts_first_part_of_first_candidate() {
    let body = r##"{"candidates":[{"content":{"parts":[{"text":"# commented\ncode"},{"text":"ignored"}]}},{"content":{"parts":[{"text":"ignored too"}]}}]}"##;
    let response: GenerateResponse = serde_json::from_str(body).expect("parse");
    assert_eq!(first_candidate_text(&response), Some("# commented\ncode"));
}

#[test]
fn first_candidate_text_is_none_when_any_level_is_missing() {
    let cases = [
        r#"{}"#,
        r#"{"candidates":[]}"#,
        r#"{"candidates":[{}]}"#,
        r#"{"candidates":[{"content":{}}]}"#,
        r#"{"candidates":[{"content":{"parts":[]}}]}"#,
    ];
    for body in cases {
        let response: GenerateResponse = serde_json::from_str(body).expect("parse");
        assert_eq!(first_candidate_text(&response), None, "body: {body}");
    }
}

#[test]
fn first_candidate_text_keeps_empty_text_distinct_from_missing_path() {
    let body = r#"{"candidates":[{"content":{"parts":[{"text":""}]}}]}"#;
    let response: GenerateResponse = serde_json::from_str(body).expect("parse");
    assert_eq!(first_candidate_text(&response), Some(""));
}

#[test]
fn request_url_appends_percent_encoded_key() {
    assert_eq!(
        request_url("https://api.example/v1/models/gen:generateContent", "secret-key"),
        "https://api.example/v1/models/gen:generateContent?key=secret-key"
    );
    assert_eq!(
        request_url("https://api.example/gen?alt=json", "a b+c"),
        "https://api.example/gen?alt=json&key=a%20b%2Bc"
    );
}
