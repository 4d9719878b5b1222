/// MCP server implementation that handles JSON-RPC communication
///
/// This module implements the actual MCP server that:
/// 1. Reads line-delimited JSON-RPC requests from stdin
/// 2. Routes tool calls to `crate::tools`
/// 3. Writes JSON-RPC responses to stdout

use std::collections::HashMap;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

use crate::mcp::protocol::*;
use crate::storage::StorageError;
use crate::tools::{self, ToolError};
use crate::{InsightServer, ServerError};

/// MCP server wrapping an `InsightServer`
pub struct McpServer {
    server: InsightServer,
    /// Whether the client has sent its initialized notification
    initialized: bool,
}

impl McpServer {
    pub fn new(server: InsightServer) -> Self {
        Self {
            server,
            initialized: false,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Run the MCP server, handling JSON-RPC over stdin/stdout
    pub async fn run(&mut self) -> Result<(), ServerError> {
        info!("Starting MCP server, waiting for JSON-RPC requests...");

        let stdin = tokio::io::stdin();
        let mut reader = BufReader::new(stdin);
        let mut stdout = tokio::io::stdout();

        let mut line = String::new();

        loop {
            line.clear();

            match reader.read_line(&mut line).await {
                Ok(0) => {
                    info!("MCP server shutting down (stdin closed)");
                    break;
                }
                Ok(_) => {
                    if let Some(response) = self.handle_line(&line).await {
                        let response_str = serde_json::to_string(&response)?;

                        stdout.write_all(response_str.as_bytes()).await?;
                        stdout.write_all(b"\n").await?;
                        stdout.flush().await?;

                        debug!("Sent response: {}", response_str);
                    }
                }
                Err(e) => {
                    error!("Failed to read from stdin: {}", e);
                    break;
                }
            }
        }

        Ok(())
    }

    /// Process one line of JSON-RPC input
    ///
    /// Returns `None` for blank lines and notifications.
    pub async fn handle_line(&mut self, line: &str) -> Option<JsonRpcResponse> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        debug!("Processing request: {}", line);

        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse JSON-RPC request: {}", e);
                return Some(JsonRpcResponse::error(
                    json!(null),
                    error_codes::PARSE_ERROR,
                    format!("Invalid JSON: {}", e),
                    None,
                ));
            }
        };

        self.handle_request(request).await
    }

    async fn handle_request(&mut self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        // Notifications carry no id and never get a response
        if request.id.is_null() {
            match request.method.as_str() {
                "initialized" | "notifications/initialized" => self.initialized = true,
                other => debug!("Ignoring notification {}", other),
            }
            return None;
        }

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(request),
            "initialized" | "notifications/initialized" => {
                self.initialized = true;
                JsonRpcResponse::success(request.id, json!(null))
            }
            "tools/list" => self.handle_tools_list(request),
            "tools/call" => self.handle_tools_call(request),
            _ => JsonRpcResponse::error(
                request.id,
                error_codes::METHOD_NOT_FOUND,
                format!("Method '{}' not found", request.method),
                None,
            ),
        };
        Some(response)
    }

    fn handle_initialize(&mut self, request: JsonRpcRequest) -> JsonRpcResponse {
        let params: InitializeParams = request
            .params
            .and_then(|p| serde_json::from_value(p).ok())
            .unwrap_or_default();
        info!(
            "MCP client connected: {} {} (protocol {})",
            params.client_info.name, params.client_info.version, params.protocol_version
        );

        let result = InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
            },
            server_info: ServerInfo {
                name: "Habit Insights MCP".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        respond_with(request.id, &result)
    }

    fn handle_tools_list(&mut self, request: JsonRpcRequest) -> JsonRpcResponse {
        respond_with(request.id, &json!({"tools": tool_definitions()}))
    }

    fn handle_tools_call(&mut self, request: JsonRpcRequest) -> JsonRpcResponse {
        let tool_params: ToolCallParams = match request.params {
            Some(params) => match serde_json::from_value(params) {
                Ok(p) => p,
                Err(e) => {
                    return JsonRpcResponse::error(
                        request.id,
                        error_codes::INVALID_PARAMS,
                        format!("Invalid parameters: {}", e),
                        None,
                    );
                }
            },
            None => {
                return JsonRpcResponse::error(
                    request.id,
                    error_codes::INVALID_PARAMS,
                    "Missing parameters".to_string(),
                    None,
                );
            }
        };

        let name = tool_params.name;
        match self.call_tool(&name, tool_params.arguments) {
            Some(Ok(text)) => respond_with(request.id, &ToolCallResult::success(text)),
            Some(Err(e)) => {
                warn!("Tool {} failed: {}", name, e);
                JsonRpcResponse::error(
                    request.id,
                    tool_error_to_json_rpc_code(&e),
                    e.to_string(),
                    Some(json!({"tool": name})),
                )
            }
            None => respond_with(request.id, &ToolCallResult::error(format!("Unknown tool: {}", name))),
        }
    }

    /// Dispatch a tool by name; `None` when no such tool exists
    fn call_tool(&self, name: &str, args: HashMap<String, Value>) -> Option<Result<String, ToolError>> {
        let storage = self.server.storage();
        let today = Utc::now().date_naive();

        let result = match name {
            "user_register" => parse_args(args)
                .and_then(|p| tools::register_user(storage, p))
                .map(|r| format!("{}\nUser ID: {}", r.message, r.user_id)),
            "habit_create" => parse_args(args)
                .and_then(|p| tools::create_habit(storage, p))
                .map(|r| match r.habit_id {
                    Some(habit_id) => format!("{}\nHabit ID: {}", r.message, habit_id),
                    None => r.message,
                }),
            "habit_update" => parse_args(args)
                .and_then(|p| tools::update_habit(storage, p))
                .map(|r| r.message),
            "habit_log" => parse_args(args)
                .and_then(|p| tools::log_habit(storage, p, today))
                .map(|r| r.message),
            "mood_log" => parse_args(args)
                .and_then(|p| tools::log_mood(storage, p, today))
                .map(|r| r.message),
            "focus_log" => parse_args(args)
                .and_then(|p| tools::log_focus(storage, p, today))
                .map(|r| r.message),
            "habit_list" => parse_args(args)
                .and_then(|p| tools::list_habits(storage, p, today))
                .and_then(|r| to_pretty_json(&r)),
            "habit_log_list" => parse_args(args)
                .and_then(|p| tools::list_habit_logs(storage, p, today))
                .and_then(|r| to_pretty_json(&r)),
            "mood_list" => parse_args(args)
                .and_then(|p| tools::list_mood_entries(storage, p, today))
                .and_then(|r| to_pretty_json(&r)),
            "focus_list" => parse_args(args)
                .and_then(|p| tools::list_focus_sessions(storage, p, today))
                .and_then(|r| to_pretty_json(&r)),
            "weekly_insights" => parse_args(args)
                .and_then(|p| tools::weekly_insights(storage, self.server.analytics(), p, today))
                .and_then(|report| to_pretty_json(&report)),
            _ => return None,
        };
        Some(result)
    }
}

/// Deserialize tool arguments into a params struct
fn parse_args<T: DeserializeOwned>(args: HashMap<String, Value>) -> Result<T, ToolError> {
    serde_json::from_value(Value::Object(args.into_iter().collect()))
        .map_err(|e| ToolError::InvalidParams(e.to_string()))
}

/// Render a tool response as the text content of a result
fn to_pretty_json<T: Serialize>(value: &T) -> Result<String, ToolError> {
    serde_json::to_string_pretty(value).map_err(|e| ToolError::Storage(StorageError::from(e)))
}

/// Wrap a serializable result in a success response
fn respond_with<T: Serialize>(id: Value, result: &T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::error(
            id,
            error_codes::INTERNAL_ERROR,
            format!("Failed to serialize result: {}", e),
            None,
        ),
    }
}

/// Definitions advertised by tools/list
fn tool_definitions() -> Vec<ToolDefinition> {
    let date = json!({"type": "string", "description": "Date (YYYY-MM-DD, optional - defaults to today, cannot be in the future)"});
    let start_date = json!({"type": "string", "description": "First day (YYYY-MM-DD, optional - defaults to 30 days before end_date)"});
    let end_date = json!({"type": "string", "description": "Last day (YYYY-MM-DD, optional - defaults to today)"});

    vec![
        ToolDefinition {
            name: "user_register".to_string(),
            description: "Register a user and get their user ID".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "name": {"type": "string", "description": "Display name"}
                },
                "required": ["name"]
            }),
        },
        ToolDefinition {
            name: "habit_create".to_string(),
            description: "Create a new habit to track".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "user_id": {"type": "string", "description": "ID of the owning user"},
                    "name": {"type": "string", "description": "Name of the habit"},
                    "description": {"type": "string", "description": "Optional description"},
                    "frequency": {"type": "string", "description": "daily or weekly (optional, defaults to daily)"},
                    "color": {"type": "string", "description": "Display color (optional)"},
                    "icon": {"type": "string", "description": "Display icon (optional)"},
                    "target_per_week": {"type": "integer", "description": "Target completions per week, 1-7 (optional, defaults to 7)"}
                },
                "required": ["user_id", "name"]
            }),
        },
        ToolDefinition {
            name: "habit_update".to_string(),
            description: "Rename, restyle, archive or restore a habit".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "habit_id": {"type": "string", "description": "ID of the habit"},
                    "name": {"type": "string"},
                    "description": {"type": "string"},
                    "color": {"type": "string"},
                    "icon": {"type": "string"},
                    "archived": {"type": "boolean", "description": "Archive (true) or restore (false) the habit"}
                },
                "required": ["habit_id"]
            }),
        },
        ToolDefinition {
            name: "habit_log".to_string(),
            description: "Mark a habit done (or not done) for today or a past date".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "habit_id": {"type": "string", "description": "ID of the habit to log"},
                    "date": date.clone(),
                    "completed": {"type": "boolean", "description": "Whether the habit was done (optional, defaults to true)"},
                    "notes": {"type": "string", "description": "Optional notes"}
                },
                "required": ["habit_id"]
            }),
        },
        ToolDefinition {
            name: "mood_log".to_string(),
            description: "Daily check-in of mood, energy and sleep".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "user_id": {"type": "string"},
                    "mood_level": {"type": "integer", "description": "Mood 1-5"},
                    "energy_level": {"type": "integer", "description": "Energy 1-5"},
                    "sleep_hours": {"type": "number", "description": "Hours slept, 0-24"},
                    "date": date.clone(),
                    "notes": {"type": "string"}
                },
                "required": ["user_id", "mood_level", "energy_level", "sleep_hours"]
            }),
        },
        ToolDefinition {
            name: "focus_log".to_string(),
            description: "Record a focus session".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "user_id": {"type": "string"},
                    "task_name": {"type": "string"},
                    "duration_minutes": {"type": "integer", "description": "Length in minutes, 1-1440"},
                    "date": date,
                    "completed": {"type": "boolean", "description": "Optional, defaults to true"}
                },
                "required": ["user_id", "task_name", "duration_minutes"]
            }),
        },
        ToolDefinition {
            name: "habit_list".to_string(),
            description: "List a user's habits with their IDs and current streaks".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "user_id": {"type": "string"},
                    "include_archived": {"type": "boolean", "description": "Also list archived habits (optional, defaults to false)"}
                },
                "required": ["user_id"]
            }),
        },
        ToolDefinition {
            name: "habit_log_list".to_string(),
            description: "Read back habit logs over a date range, newest first".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "user_id": {"type": "string"},
                    "habit_id": {"type": "string", "description": "Only this habit's logs (optional)"},
                    "start_date": start_date.clone(),
                    "end_date": end_date.clone()
                },
                "required": ["user_id"]
            }),
        },
        ToolDefinition {
            name: "mood_list".to_string(),
            description: "Read back mood check-ins over a date range, newest first".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "user_id": {"type": "string"},
                    "start_date": start_date.clone(),
                    "end_date": end_date.clone()
                },
                "required": ["user_id"]
            }),
        },
        ToolDefinition {
            name: "focus_list".to_string(),
            description: "Read back focus sessions over a date range, newest first".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "user_id": {"type": "string"},
                    "start_date": start_date,
                    "end_date": end_date
                },
                "required": ["user_id"]
            }),
        },
        ToolDefinition {
            name: "weekly_insights".to_string(),
            description: "Weekly stats, streaks, chart data and insights for the 7 days ending today".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "user_id": {"type": "string"},
                    "today": {"type": "string", "description": "Last day of the window (YYYY-MM-DD, optional)"}
                },
                "required": ["user_id"]
            }),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_definitions_are_unique() {
        let defs = tool_definitions();
        let mut names: Vec<&str> = defs.iter().map(|d| d.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();

        assert_eq!(names.len(), 11);
        assert!(defs.iter().all(|d| d.input_schema["required"].is_array()));
    }

    #[test]
    fn test_parse_args_reports_missing_fields() {
        let result: Result<tools::LogFocusParams, _> = parse_args(HashMap::new());
        assert!(matches!(result, Err(ToolError::InvalidParams(_))));
    }
}
