/// Integration test suite: SQLite-backed workflows and the MCP surface
mod basic_integration;
mod mcp_flow;
