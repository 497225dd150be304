use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use tokio::sync::watch;

use codecommenter_service::{Commenter, CommenterConfig, CommentResult};

const DEFAULT_WEB_ADDR: &str = "localhost:48771";

#[derive(Clone)]
struct AppState {
    commenter: Arc<Commenter>,
    shutdown_tx: watch::Sender<bool>,
}

#[derive(Deserialize)]
struct CommentParams {
    #[serde(default)]
    source: String,
}

fn read_env_trim(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn normalize_addr(raw: &str) -> Option<String> {
    let mut value = raw.trim();
    if value.is_empty() {
        return None;
    }
    if let Some(rest) = value.strip_prefix("http://") {
        value = rest;
    }
    if let Some(rest) = value.strip_prefix("https://") {
        value = rest;
    }
    value = value.split('/').next().unwrap_or(value);
    if value.is_empty() {
        return None;
    }
    if value.contains(':') {
        return Some(value.to_string());
    }
    Some(format!("localhost:{value}"))
}

fn resolve_web_addr() -> String {
    read_env_trim("CODECOMMENTER_WEB_ADDR")
        .and_then(|v| normalize_addr(&v))
        .unwrap_or_else(|| DEFAULT_WEB_ADDR.to_string())
}

fn is_json_content_type(headers: &HeaderMap) -> bool {
    headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|v| v.trim().eq_ignore_ascii_case("application/json"))
        .unwrap_or(false)
}

fn json_response(value: serde_json::Value) -> Response {
    let mut out = Response::new(axum::body::Body::from(value.to_string()));
    out.headers_mut().insert(
        "content-type",
        axum::http::HeaderValue::from_static("application/json"),
    );
    out
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn comment(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if !is_json_content_type(&headers) {
        return (StatusCode::UNSUPPORTED_MEDIA_TYPE, "{}").into_response();
    }
    let params: CommentParams = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(_) => return (StatusCode::BAD_REQUEST, "{}").into_response(),
    };

    // 中文注释：orchestrator 是阻塞调用（含重试休眠），必须放到 spawn_blocking，
    // 否则一次慢请求会占死 runtime 工作线程。
    let commenter = state.commenter.clone();
    let outcome =
        tokio::task::spawn_blocking(move || commenter.request_comments(&params.source)).await;

    json_response(comment_body(outcome.map_err(|err| err.to_string())))
}

// 每次调用的失败都以数据形式回给页面渲染，HTTP 层统一 200。
fn comment_body(outcome: Result<CommentResult, String>) -> serde_json::Value {
    match outcome {
        Ok(Ok(text)) => serde_json::json!({ "ok": true, "text": text }),
        Ok(Err(failure)) => serde_json::json!({
            "ok": false,
            "reason": failure.kind(),
            "message": failure.user_message(),
        }),
        Err(message) => serde_json::json!({
            "ok": false,
            "reason": "unexpected_error",
            "message": format!("An unexpected error occurred: {message}"),
        }),
    }
}

async fn quit(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let _ = state.shutdown_tx.send(true);
    Html("<html><body>OK</body></html>")
}

async fn serve_on_listener(
    listener: tokio::net::TcpListener,
    app: Router,
    mut shutdown_rx: watch::Receiver<bool>,
) -> std::io::Result<()> {
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            while !*shutdown_rx.borrow() {
                if shutdown_rx.changed().await.is_err() {
                    break;
                }
            }
        })
        .await
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::Other, err))
}

async fn run_web_server(
    addr: &str,
    app: Router,
    shutdown_rx: watch::Receiver<bool>,
) -> std::io::Result<()> {
    // 中文注释：localhost 在部分系统上只解析到单栈；双栈监听可减少浏览器连接差异。
    let trimmed = addr.trim();
    if trimmed.len() > "localhost:".len()
        && trimmed[..("localhost:".len())].eq_ignore_ascii_case("localhost:")
    {
        let port = &trimmed["localhost:".len()..];
        let v4 = tokio::net::TcpListener::bind(format!("127.0.0.1:{port}")).await;
        let v6 = tokio::net::TcpListener::bind(format!("[::1]:{port}")).await;
        return match (v4, v6) {
            (Ok(v4_listener), Ok(v6_listener)) => {
                let v4_task = serve_on_listener(v4_listener, app.clone(), shutdown_rx.clone());
                let v6_task = serve_on_listener(v6_listener, app, shutdown_rx);
                let (v4_result, v6_result) = tokio::join!(v4_task, v6_task);
                v4_result.and(v6_result)
            }
            (Ok(listener), Err(_)) | (Err(_), Ok(listener)) => {
                serve_on_listener(listener, app, shutdown_rx).await
            }
            (Err(err), Err(_)) => Err(err),
        };
    }

    let listener = tokio::net::TcpListener::bind(trimmed).await?;
    serve_on_listener(listener, app, shutdown_rx).await
}

#[tokio::main]
async fn main() {
    // 凭证/端点缺失是唯一不可恢复的失败：在绑定端口之前报给操作者并退出。
    let config = match CommenterConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("configuration error: {err}");
            std::process::exit(1);
        }
    };

    // 中文注释：blocking reqwest 客户端自带专用 runtime，放在 spawn_blocking 里构建，
    // 避免在异步上下文里初始化阻塞设施。
    let commenter = match tokio::task::spawn_blocking(move || Commenter::new(config)).await {
        Ok(commenter) => Arc::new(commenter),
        Err(err) => {
            eprintln!("startup error: {err}");
            std::process::exit(1);
        }
    };

    let web_addr = resolve_web_addr();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let state = Arc::new(AppState {
        commenter,
        shutdown_tx,
    });

    let app = Router::new()
        .route("/", get(index))
        .route("/api/comment", post(comment))
        .route("/__quit", get(quit))
        .with_state(state);

    println!("codecommenter-web listening on {web_addr}");

    let open_url = format!("http://{}", web_addr.trim());
    if read_env_trim("CODECOMMENTER_WEB_NO_OPEN").is_none() {
        let _ = webbrowser::open(&open_url);
    }

    if let Err(err) = run_web_server(&web_addr, app, shutdown_rx).await {
        eprintln!("web stopped: {err}");
        std::process::exit(1);
    }
}

const INDEX_HTML: &str = r##"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8"/>
    <meta name="viewport" content="width=device-width, initial-scale=1"/>
    <title>Code Commenter</title>
    <style>
      body { font-family: ui-sans-serif, system-ui, -apple-system, Segoe UI, Roboto, Helvetica, Arial; padding: 32px; line-height: 1.5; color: #111; }
      .box { max-width: 1100px; margin: 0 auto; }
      h1 { margin: 0 0 4px; font-size: 24px; color: #1e40af; text-align: center; }
      .caption { margin: 0 0 20px; color: #6b7280; text-align: center; }
      .panes { display: flex; gap: 24px; }
      .pane { flex: 1; min-width: 0; }
      h2 { font-size: 15px; margin: 0 0 8px; color: #374151; }
      textarea, pre { width: 100%; height: 420px; box-sizing: border-box; border: 1px solid #e5e7eb; border-radius: 8px; padding: 12px; font-family: ui-monospace, SFMono-Regular, Menlo, Consolas, monospace; font-size: 13px; background: #fafafa; margin: 0; overflow: auto; white-space: pre; }
      button { margin-top: 12px; width: 100%; background-color: #3b82f6; color: white; font-weight: bold; border: none; border-radius: 8px; padding: 12px 24px; cursor: pointer; }
      button:hover { background-color: #2563eb; }
      button:disabled { background-color: #93c5fd; cursor: wait; }
    </style>
  </head>
  <body>
    <div class="box">
      <h1>Expert Code Commenter</h1>
      <p class="caption">Paste a code snippet below and get it back with professional comments.</p>
      <div class="panes">
        <div class="pane">
          <h2>1. Input Your Code</h2>
          <textarea id="source" spellcheck="false">def quick_sort(arr):
    if len(arr) &lt;= 1:
        return arr
    pivot = arr[len(arr) // 2]
    left = [x for x in arr if x &lt; pivot]
    middle = [x for x in arr if x == pivot]
    right = [x for x in arr if x &gt; pivot]
    return quick_sort(left) + middle + quick_sort(right)</textarea>
          <button id="generate">Generate Comments</button>
        </div>
        <div class="pane">
          <h2>2. Commented Output</h2>
          <pre id="output">Click "Generate Comments" to see the results.</pre>
        </div>
      </div>
    </div>
    <script>
      const button = document.getElementById('generate');
      const source = document.getElementById('source');
      const output = document.getElementById('output');
      button.addEventListener('click', async () => {
        button.disabled = true;
        output.textContent = 'Generating expert comments...';
        try {
          const resp = await fetch('/api/comment', {
            method: 'POST',
            headers: { 'content-type': 'application/json' },
            body: JSON.stringify({ source: source.value }),
          });
          const data = await resp.json();
          output.textContent = data.ok ? data.text : data.message;
        } catch (err) {
          output.textContent = 'Error: Could not retrieve commented code.';
        } finally {
          button.disabled = false;
        }
      });
    </script>
  </body>
</html>
"##;

#[cfg(test)]
mod tests {
    use super::{comment_body, is_json_content_type, normalize_addr};
    use axum::http::{HeaderMap, HeaderValue};
    use codecommenter_service::CommentFailure;

    #[test]
    fn normalize_addr_accepts_scheme_port_and_host_forms() {
        assert_eq!(normalize_addr("localhost:48771").as_deref(), Some("localhost:48771"));
        assert_eq!(normalize_addr("http://localhost:9000/").as_deref(), Some("localhost:9000"));
        assert_eq!(normalize_addr("48771").as_deref(), Some("localhost:48771"));
        assert_eq!(normalize_addr("   "), None);
        assert_eq!(normalize_addr("https://"), None);
    }

    #[test]
    fn json_content_type_check_ignores_charset_and_case() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "content-type",
            HeaderValue::from_static("Application/JSON; charset=utf-8"),
        );
        assert!(is_json_content_type(&headers));

        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("text/plain"));
        assert!(!is_json_content_type(&headers));
        assert!(!is_json_content_type(&HeaderMap::new()));
    }

    #[test]
    fn comment_body_keeps_success_text_untouched() {
        let body = comment_body(Ok(Ok("# commented\ncode".to_string())));
        assert_eq!(
            body,
            serde_json::json!({ "ok": true, "text": "# commented\ncode" })
        );
    }

    #[test]
    fn comment_body_returns_failures_as_data() {
        let body = comment_body(Ok(Err(CommentFailure::Network { attempts: 3 })));
        assert_eq!(body["ok"], serde_json::json!(false));
        assert_eq!(body["reason"], serde_json::json!("network_error"));
        assert!(body["message"]
            .as_str()
            .unwrap_or("")
            .contains("after 3 attempts"));

        let body = comment_body(Ok(Err(CommentFailure::EmptyInput)));
        assert_eq!(body["reason"], serde_json::json!("empty_input"));

        let body = comment_body(Err("task panicked".to_string()));
        assert_eq!(body["reason"], serde_json::json!("unexpected_error"));
        assert!(body["message"].as_str().unwrap_or("").contains("task panicked"));
    }
}
