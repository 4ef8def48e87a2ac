//! Scenario Registry
//!
//! The fixed, ordered battery of test steps the driver walks through. Each
//! scenario pairs a human-readable name with an invocation whose arguments
//! are bound at declaration time, so the registry stays purely declarative
//! and nothing is re-derived at dispatch time.
//!
//! Declaration order is the only dependency mechanism: later steps observe
//! rows written by earlier ones through the on-disk database files, never
//! through in-memory server state.

use std::path::Path;

use serde_json::{json, Value};

/// A deferred protocol call with all arguments bound at declaration time
#[derive(Debug, Clone)]
pub enum Invocation {
    /// A raw JSON-RPC method call
    Raw {
        method: String,
        params: Option<Value>,
    },
    /// A `tools/call` invocation of a named tool
    Tool {
        name: String,
        arguments: Option<Value>,
    },
}

/// One named, self-contained test step
#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: String,
    pub invocation: Invocation,
}

impl Scenario {
    /// Declare a raw method-call scenario
    pub fn raw(name: &str, method: &str, params: Option<Value>) -> Self {
        Self {
            name: name.to_string(),
            invocation: Invocation::Raw {
                method: method.to_string(),
                params,
            },
        }
    }

    /// Declare a tool-call scenario
    pub fn tool(name: &str, tool: &str, arguments: Value) -> Self {
        Self {
            name: name.to_string(),
            invocation: Invocation::Tool {
                name: tool.to_string(),
                arguments: Some(arguments),
            },
        }
    }
}

/// The standard interactive battery, in execution order
///
/// `inventory_db` is the absolute path registered for the multi-database
/// steps. The last two scenarios trigger server-side errors on purpose.
pub fn standard_scenarios(inventory_db: &Path) -> Vec<Scenario> {
    vec![
        // Basic protocol
        Scenario::raw(
            "Initialize Server",
            "initialize",
            Some(json!({
                "protocolVersion": "2024-11-05",
                "capabilities": {},
                "clientInfo": {"name": "mcp-harness", "version": env!("CARGO_PKG_VERSION")},
            })),
        ),
        Scenario::raw("List Tools", "tools/list", None),
        Scenario::raw("List Resources", "resources/list", None),
        // Database management
        Scenario::tool("List Databases", "db/list_databases", json!({})),
        Scenario::tool(
            "Get Tables",
            "db/get_tables",
            json!({"database_name": "default"}),
        ),
        Scenario::tool(
            "Get Schema",
            "db/get_schema",
            json!({"database_name": "default"}),
        ),
        // Queries
        Scenario::tool(
            "Query All Users",
            "db/query",
            json!({
                "database_name": "default",
                "query": "SELECT * FROM users",
                "args": [],
            }),
        ),
        Scenario::tool(
            "Query Products by Category",
            "db/query",
            json!({
                "database_name": "default",
                "query": "SELECT * FROM products WHERE category = ?",
                "args": ["Electronics"],
            }),
        ),
        Scenario::tool(
            "Complex Join Query",
            "db/query",
            json!({
                "database_name": "default",
                "query": "\
                    SELECT u.name as user_name, p.name as product_name, o.quantity, o.order_date \
                    FROM orders o \
                    JOIN users u ON o.user_id = u.id \
                    JOIN products p ON o.product_id = p.id \
                    ORDER BY o.order_date DESC",
                "args": [],
            }),
        ),
        // Inserts
        Scenario::tool(
            "Insert New User",
            "db/insert_record",
            json!({
                "database_name": "default",
                "table_name": "users",
                "data": {"name": "Interactive Test User", "email": "interactive@test.com"},
            }),
        ),
        Scenario::tool(
            "Insert New Product",
            "db/insert_record",
            json!({
                "database_name": "default",
                "table_name": "products",
                "data": {"name": "Test Product", "price": 19.99, "category": "Test"},
            }),
        ),
        // Multi-database
        Scenario::tool(
            "Register Inventory Database",
            "db/register_database",
            json!({
                "name": "inventory_test",
                "path": inventory_db.display().to_string(),
                "description": "Test inventory database",
                "readonly": false,
                "owner": "interactive_test",
            }),
        ),
        Scenario::tool(
            "Query Inventory Database",
            "db/query",
            json!({
                "database_name": "inventory_test",
                "query": "SELECT * FROM warehouses",
                "args": [],
            }),
        ),
        // Deliberate error triggers
        Scenario::tool(
            "Invalid Database Name",
            "db/query",
            json!({
                "database_name": "nonexistent",
                "query": "SELECT 1",
                "args": [],
            }),
        ),
        Scenario::tool(
            "Invalid SQL Query",
            "db/query",
            json!({
                "database_name": "default",
                "query": "INVALID SQL",
                "args": [],
            }),
        ),
    ]
}
