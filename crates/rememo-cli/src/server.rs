//! HTTP transport: `POST /compile` runs the whole pipeline over a source
//! string, `GET /health` answers `ok`.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::info;

use rememo_core::ast_printer::print_module;
use rememo_core::{compile_module, LogSink, MemoConfig};
use rememo_frontend_oxc::parse_module;

fn default_filename() -> String {
    "input.js".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompileRequest {
    pub code: String,
    #[serde(default = "default_filename")]
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compiled_code: Option<String>,
    pub logs: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Parse, compile and print one request. Failures are reported in the
/// response body together with the logs gathered up to that point.
pub fn compile_request(req: &CompileRequest, config: &MemoConfig) -> CompileResponse {
    let mut sink = LogSink::new();
    let result = parse_module(&req.code, &req.filename).and_then(|mut module| {
        compile_module(&mut module, config, &mut sink)?;
        Ok(print_module(&module))
    });
    match result {
        Ok(code) => CompileResponse {
            success: true,
            compiled_code: Some(code),
            logs: sink.rendered(),
            error: None,
        },
        Err(err) => CompileResponse {
            success: false,
            compiled_code: None,
            logs: sink.rendered(),
            error: Some(err.to_string()),
        },
    }
}

async fn compile_handler(
    State(config): State<Arc<MemoConfig>>,
    Json(req): Json<CompileRequest>,
) -> Json<CompileResponse> {
    info!("compile request: {} ({} bytes)", req.filename, req.code.len());
    Json(compile_request(&req, &config))
}

async fn health_handler() -> &'static str {
    "ok"
}

pub fn router(config: MemoConfig) -> Router {
    Router::new()
        .route("/compile", post(compile_handler))
        .route("/health", get(health_handler))
        .with_state(Arc::new(config))
}

pub async fn serve(bind: SocketAddr, config: MemoConfig) -> anyhow::Result<()> {
    let listener = TcpListener::bind(bind).await?;
    info!("rememo listening on http://{bind}");
    axum::serve(listener, router(config)).await?;
    Ok(())
}
