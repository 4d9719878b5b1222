/// JSON-RPC round trips through the MCP server
use habit_insights_mcp::mcp::protocol::error_codes;
use habit_insights_mcp::mcp::McpServer;
use habit_insights_mcp::InsightServer;
use serde_json::{json, Value};
use tempfile::TempDir;

#[cfg(test)]
mod mcp_flow_tests {
    use super::*;

    async fn server(dir: &TempDir) -> McpServer {
        let inner = InsightServer::new(dir.path().join("insights.db"))
            .await
            .expect("Failed to create server");
        McpServer::new(inner)
    }

    async fn send(server: &mut McpServer, request: Value) -> Value {
        let response = server
            .handle_line(&request.to_string())
            .await
            .expect("request should get a response");
        serde_json::to_value(response).unwrap()
    }

    async fn call(server: &mut McpServer, id: u64, tool: &str, arguments: Value) -> Value {
        send(
            server,
            json!({
                "jsonrpc": "2.0",
                "id": id,
                "method": "tools/call",
                "params": {"name": tool, "arguments": arguments}
            }),
        )
        .await
    }

    fn text(response: &Value) -> &str {
        response["result"]["content"][0]["text"].as_str().unwrap_or_default()
    }

    /// Pull the ID printed on the last line of a tool message
    fn trailing_id(response: &Value) -> String {
        text(response).rsplit(": ").next().unwrap_or_default().trim().to_string()
    }

    #[tokio::test]
    async fn test_handshake_and_tool_list() {
        let dir = TempDir::new().unwrap();
        let mut server = server(&dir).await;

        let init = send(
            &mut server,
            json!({"jsonrpc": "2.0", "id": 1, "method": "initialize",
                   "params": {"protocolVersion": "2024-11-05", "capabilities": {},
                              "clientInfo": {"name": "test-client", "version": "0.0.1"}}}),
        )
        .await;
        assert_eq!(init["result"]["protocolVersion"], "2024-11-05");
        assert_eq!(init["result"]["capabilities"]["tools"]["listChanged"], false);

        let notification = server
            .handle_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await;
        assert!(notification.is_none());
        assert!(server.is_initialized());

        let list = send(&mut server, json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"})).await;
        let names: Vec<&str> = list["result"]["tools"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|t| t["name"].as_str())
            .collect();
        assert!(names.contains(&"weekly_insights"));
        assert!(names.contains(&"mood_log"));
        assert!(names.contains(&"habit_list"));
        assert_eq!(names.len(), 11);
    }

    #[tokio::test]
    async fn test_log_then_read_insights() {
        let dir = TempDir::new().unwrap();
        let mut server = server(&dir).await;

        let registered = call(&mut server, 1, "user_register", json!({"name": "Casey"})).await;
        let user_id = trailing_id(&registered);

        let created = call(&mut server, 2, "habit_create", json!({"user_id": user_id, "name": "Meditate"})).await;
        let habit_id = trailing_id(&created);

        let logged = call(&mut server, 3, "habit_log", json!({"habit_id": habit_id})).await;
        assert!(text(&logged).contains("Current streak: 1 day"));

        call(&mut server, 4, "focus_log", json!({"user_id": user_id, "task_name": "Essay", "duration_minutes": 50})).await;
        call(&mut server, 5, "mood_log", json!({"user_id": user_id, "mood_level": 4, "energy_level": 3, "sleep_hours": 7.5})).await;

        let insights = call(&mut server, 6, "weekly_insights", json!({"user_id": user_id})).await;
        let report: Value = serde_json::from_str(text(&insights)).expect("report is JSON");

        assert_eq!(report["habit_streaks"]["Meditate"], 1);
        assert_eq!(report["weekly_stats"]["total_focus_minutes"], 50);
        assert_eq!(report["weekly_stats"]["average_mood"], 4.0);
        assert_eq!(report["mood_chart_data"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_errors_map_to_codes() {
        let dir = TempDir::new().unwrap();
        let mut server = server(&dir).await;

        let unknown_user = call(
            &mut server,
            1,
            "weekly_insights",
            json!({"user_id": "00000000-0000-4000-8000-000000000000"}),
        )
        .await;
        assert_eq!(unknown_user["error"]["code"], error_codes::USER_NOT_FOUND);

        let missing_args = call(&mut server, 2, "mood_log", json!({"user_id": "x"})).await;
        assert_eq!(missing_args["error"]["code"], error_codes::INVALID_PARAMS);

        let unknown_tool = call(&mut server, 3, "habit_delete", json!({})).await;
        assert_eq!(unknown_tool["result"]["isError"], true);

        let bad_method = send(&mut server, json!({"jsonrpc": "2.0", "id": 4, "method": "resources/list"})).await;
        assert_eq!(bad_method["error"]["code"], error_codes::METHOD_NOT_FOUND);

        let garbage = server.handle_line("{not json").await.unwrap();
        assert_eq!(garbage.error.unwrap().code, error_codes::PARSE_ERROR);
    }

    #[tokio::test]
    async fn test_habit_list_recovers_ids() {
        let dir = TempDir::new().unwrap();
        let mut server = server(&dir).await;

        let registered = call(&mut server, 1, "user_register", json!({"name": "Devi"})).await;
        let user_id = trailing_id(&registered);
        let created = call(&mut server, 2, "habit_create", json!({"user_id": user_id, "name": "Floss"})).await;
        let habit_id = trailing_id(&created);

        let listed = call(&mut server, 3, "habit_list", json!({"user_id": user_id})).await;
        let list: Value = serde_json::from_str(text(&listed)).expect("list is JSON");
        assert_eq!(list["habits"][0]["habit_id"], habit_id.as_str());
        assert_eq!(list["summary"]["total_habits"], 1);

        call(&mut server, 4, "habit_log", json!({"habit_id": habit_id})).await;
        let logs = call(&mut server, 5, "habit_log_list", json!({"user_id": user_id, "habit_id": habit_id})).await;
        let logs: Value = serde_json::from_str(text(&logs)).expect("logs are JSON");
        assert_eq!(logs["count"], 1);
        assert_eq!(logs["records"][0]["completed"], true);

        let moods = call(&mut server, 6, "mood_list", json!({"user_id": user_id})).await;
        let moods: Value = serde_json::from_str(text(&moods)).expect("moods are JSON");
        assert_eq!(moods["count"], 0);
    }

    #[tokio::test]
    async fn test_notifications_get_no_response() {
        let dir = TempDir::new().unwrap();
        let mut server = server(&dir).await;

        let cancelled = server
            .handle_line(r#"{"jsonrpc":"2.0","method":"notifications/cancelled","params":{"requestId":7}}"#)
            .await;
        assert!(cancelled.is_none());

        let unknown = server.handle_line(r#"{"jsonrpc":"2.0","method":"resources/list"}"#).await;
        assert!(unknown.is_none());
        assert!(!server.is_initialized());
    }

    #[test]
    fn test_blank_lines_are_ignored() {
        let dir = TempDir::new().unwrap();
        tokio_test::block_on(async {
            let mut server = server(&dir).await;
            assert!(server.handle_line("   \n").await.is_none());
        });
    }
}
