//! Line-delimited JSON tool host over stdin/stdout.
//!
//! Request:  `{"id": 1, "tool": "get_weather", "arguments": {"city": "London"}}`
//! Response: the tool response with the request `id` echoed back.
//! `"tool": "list_tools"` returns the tool definitions.

use anyhow::Context;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info};
use weather_time_core::{Error, ToolResponse, ToolSurface, tools};

#[derive(Debug, Deserialize)]
struct Request {
    #[serde(default)]
    id: Value,
    tool: String,
    #[serde(default)]
    arguments: Value,
}

pub async fn run(surface: &ToolSurface) -> anyhow::Result<()> {
    info!("serving tools on stdio");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await.context("Failed to read from stdin")? {
        if line.trim().is_empty() {
            continue;
        }

        let reply = handle_line(surface, &line).await;
        let mut out = serde_json::to_string(&reply).context("Failed to serialize response")?;
        out.push('\n');
        stdout.write_all(out.as_bytes()).await.context("Failed to write to stdout")?;
        stdout.flush().await.context("Failed to flush stdout")?;
    }

    debug!("stdin closed");
    Ok(())
}

async fn handle_line(surface: &ToolSurface, line: &str) -> Value {
    let request: Request = match serde_json::from_str(line) {
        Ok(r) => r,
        Err(e) => {
            let response = ToolResponse::from(Error::invalid(format!("Malformed request: {e}")));
            return with_id(Value::Null, &response);
        }
    };

    if request.tool == "list_tools" {
        return json!({ "id": request.id, "status": "success", "tools": tools::definitions() });
    }

    let response = surface.call(&request.tool, &request.arguments).await;
    with_id(request.id, &response)
}

fn with_id(id: Value, response: &ToolResponse) -> Value {
    let mut value = serde_json::to_value(response).unwrap_or_else(|_| json!({}));
    if let Value::Object(map) = &mut value {
        map.insert("id".to_string(), id);
    }
    value
}
