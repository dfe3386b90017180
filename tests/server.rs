//! End-to-end tests of the stdio server loop over a mock CouchDB.

use std::sync::Arc;

use couchdb_mcp::{rpc_codes, CouchClient, CouchConfig, McpServer, McpSession};
use mockito::Server;
use serde_json::{json, Value as JsonValue};

fn server_for(couch: &Server) -> McpServer {
    let client = CouchClient::new(CouchConfig::new(couch.url())).unwrap();
    McpServer::new(McpSession::new(Arc::new(client)))
}

async fn mock_version(couch: &mut Server, version: &str) -> mockito::Mock {
    couch
        .mock("GET", "/")
        .with_status(200)
        .with_body(json!({ "couchdb": "Welcome", "version": version }).to_string())
        .create_async()
        .await
}

/// Feed `lines` through the server and collect the replies.
async fn exchange(server: &mut McpServer, lines: &[JsonValue]) -> Vec<JsonValue> {
    let input: String = lines.iter().map(|l| format!("{}\n", l)).collect();
    let mut output = Vec::new();
    server.serve(input.as_bytes(), &mut output).await.unwrap();

    String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

fn tool_names(reply: &JsonValue) -> Vec<String> {
    reply["result"]["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_initialize_handshake() {
    let couch = Server::new_async().await;
    let mut server = server_for(&couch);

    let replies = exchange(
        &mut server,
        &[
            json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}),
            json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
            json!({"jsonrpc": "2.0", "id": 2, "method": "ping"}),
        ],
    )
    .await;

    assert_eq!(replies.len(), 2);
    assert_eq!(replies[0]["id"], json!(1));
    assert_eq!(replies[0]["result"]["protocolVersion"], json!("2024-11-05"));
    assert_eq!(replies[0]["result"]["serverInfo"]["name"], json!("couchdb-mcp"));
    assert!(replies[0]["result"]["capabilities"]["tools"].is_object());
    assert_eq!(replies[1], json!({"jsonrpc": "2.0", "id": 2, "result": {}}));
    assert!(server.is_initialized());
}

#[tokio::test]
async fn test_tools_list_follows_server_version() {
    let mut couch = Server::new_async().await;
    let info = mock_version(&mut couch, "3.3.3").await;
    let mut server = server_for(&couch);

    let replies = exchange(
        &mut server,
        &[
            json!({"jsonrpc": "2.0", "id": 1, "method": "tools/list"}),
            json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}),
        ],
    )
    .await;

    assert_eq!(tool_names(&replies[0]).len(), 10);
    assert_eq!(tool_names(&replies[0]), tool_names(&replies[1]));
    let first = &replies[0]["result"]["tools"][0];
    assert_eq!(first["name"], json!("createDatabase"));
    assert_eq!(first["inputSchema"]["required"], json!(["dbName"]));
    info.assert_async().await;
}

#[tokio::test]
async fn test_tools_list_on_old_server() {
    let mut couch = Server::new_async().await;
    let _info = mock_version(&mut couch, "2.3.1").await;
    let mut server = server_for(&couch);

    let replies = exchange(
        &mut server,
        &[json!({"jsonrpc": "2.0", "id": 1, "method": "tools/list"})],
    )
    .await;

    assert_eq!(
        tool_names(&replies[0]),
        vec!["createDatabase", "listDatabases", "deleteDatabase", "createDocument", "getDocument"]
    );
}

#[tokio::test]
async fn test_gated_call_on_old_server_is_rpc_error() {
    let mut couch = Server::new_async().await;
    let _info = mock_version(&mut couch, "2.3.1").await;
    let find = couch
        .mock("POST", "/testdb/_find")
        .expect(0)
        .create_async()
        .await;
    let mut server = server_for(&couch);

    let replies = exchange(
        &mut server,
        &[json!({
            "jsonrpc": "2.0",
            "id": 5,
            "method": "tools/call",
            "params": {"name": "findDocuments", "arguments": {"dbName": "testdb", "query": {"selector": {}}}}
        })],
    )
    .await;

    assert_eq!(replies[0]["id"], json!(5));
    assert_eq!(replies[0]["error"]["code"], json!(rpc_codes::METHOD_NOT_FOUND));
    assert!(replies[0].get("result").is_none());
    find.assert_async().await;
}

#[tokio::test]
async fn test_tool_call_success_and_failure() {
    let mut couch = Server::new_async().await;
    let _m3 = couch
        .mock("GET", "/_all_dbs")
        .with_status(200)
        .with_body(r#"["testdb"]"#)
        .create_async()
        .await;
    let _m4 = couch
        .mock("DELETE", "/missing")
        .with_status(404)
        .with_body(r#"{"error":"not_found","reason":"Database does not exist."}"#)
        .create_async()
        .await;
    let mut server = server_for(&couch);

    let replies = exchange(
        &mut server,
        &[
            json!({"jsonrpc": "2.0", "id": 1, "method": "tools/call", "params": {"name": "listDatabases"}}),
            json!({"jsonrpc": "2.0", "id": 2, "method": "tools/call",
                   "params": {"name": "deleteDatabase", "arguments": {"dbName": "missing"}}}),
        ],
    )
    .await;

    let ok = &replies[0]["result"];
    assert_eq!(ok["content"][0]["type"], json!("text"));
    assert!(ok.get("isError").is_none());
    let listed: Vec<String> = serde_json::from_str(ok["content"][0]["text"].as_str().unwrap()).unwrap();
    assert_eq!(listed, vec!["testdb"]);

    let failed = &replies[1]["result"];
    assert_eq!(failed["isError"], json!(true));
    assert!(failed["content"][0]["text"]
        .as_str()
        .unwrap()
        .contains("Database does not exist."));
}

#[tokio::test]
async fn test_protocol_faults() {
    let couch = Server::new_async().await;
    let mut server = server_for(&couch);

    let replies = exchange(
        &mut server,
        &[
            json!({"jsonrpc": "2.0", "id": 1, "method": "tools/call", "params": {"name": "noSuchTool"}}),
            json!({"jsonrpc": "2.0", "id": 2, "method": "tools/call",
                   "params": {"name": "createDatabase", "arguments": {}}}),
            json!({"jsonrpc": "2.0", "id": 3, "method": "tools/call"}),
            json!({"jsonrpc": "2.0", "id": 4, "method": "resources/list"}),
            json!({"jsonrpc": "1.0", "id": 5, "method": "ping"}),
        ],
    )
    .await;

    let codes: Vec<JsonValue> = replies.iter().map(|r| r["error"]["code"].clone()).collect();
    assert_eq!(
        codes,
        vec![
            json!(rpc_codes::METHOD_NOT_FOUND),
            json!(rpc_codes::INVALID_PARAMS),
            json!(rpc_codes::INVALID_PARAMS),
            json!(rpc_codes::METHOD_NOT_FOUND),
            json!(rpc_codes::INVALID_REQUEST),
        ]
    );
    assert!(replies[1]["error"]["message"].as_str().unwrap().contains("dbName"));
}

#[tokio::test]
async fn test_parse_error_keeps_serving() {
    let couch = Server::new_async().await;
    let mut server = server_for(&couch);

    let input = "{not json\n\n{\"jsonrpc\":\"2.0\",\"id\":9,\"method\":\"ping\"}\n";
    let mut output = Vec::new();
    server.serve(input.as_bytes(), &mut output).await.unwrap();

    let replies: Vec<JsonValue> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(replies.len(), 2);
    assert_eq!(replies[0]["error"]["code"], json!(rpc_codes::PARSE_ERROR));
    assert!(replies[0].get("id").is_none());
    assert_eq!(replies[1]["id"], json!(9));
}

#[tokio::test]
async fn test_notifications_get_no_reply() {
    let couch = Server::new_async().await;
    let mut server = server_for(&couch);

    let replies = exchange(
        &mut server,
        &[
            json!({"jsonrpc": "2.0", "method": "notifications/cancelled", "params": {"requestId": 1}}),
            json!({"jsonrpc": "2.0", "method": "tools/call", "params": {"name": "listDatabases"}}),
        ],
    )
    .await;

    assert!(replies.is_empty());
}
