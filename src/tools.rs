//! The two remotely callable operations, `search_docs` and `get_doc`.
//!
//! Transports call [`dispatch`] with the operation name and its JSON
//! arguments and get back the text to send, flagged as an error or not.
//! Error text starts with a fixed prefix telling the caller whether the input
//! was bad, the name is unknown, or the service itself failed.

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::error::{ErrorClass, QueryError};
use crate::query::QueryEngine;

pub const SEARCH_TOOL: &str = "search_docs";
pub const GET_DOC_TOOL: &str = "get_doc";

#[derive(Debug, Clone, PartialEq)]
pub struct ToolDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolResponse {
    pub text: String,
    pub is_error: bool,
}

impl ToolResponse {
    fn ok(text: String) -> Self {
        Self {
            text,
            is_error: false,
        }
    }

    fn error(class: ErrorClass, message: impl std::fmt::Display) -> Self {
        let prefix = match class {
            ErrorClass::InvalidInput => "Invalid input",
            ErrorClass::NotFound => "Not found",
            ErrorClass::Internal => "Internal error",
        };
        Self {
            text: format!("{}: {}", prefix, message),
            is_error: true,
        }
    }
}

impl From<QueryError> for ToolResponse {
    fn from(e: QueryError) -> Self {
        let class = e.class();
        if class == ErrorClass::Internal {
            warn!(error = %e, "query failed");
        }
        ToolResponse::error(class, e)
    }
}

#[derive(Debug, Deserialize)]
struct SearchArgs {
    query: String,
}

#[derive(Debug, Deserialize)]
struct GetDocArgs {
    class_name: String,
}

pub fn descriptors() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor {
            name: SEARCH_TOOL,
            description: "Search Java API documentation for classes, interfaces and enums \
                          whose fully qualified name contains the query (case-insensitive).",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Name fragment, e.g. \"HashMap\" or \"java.util.concurrent\""
                    }
                },
                "required": ["query"]
            }),
        },
        ToolDescriptor {
            name: GET_DOC_TOOL,
            description: "Get the full documentation of a Java class, interface or enum \
                          by its fully qualified name.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "class_name": {
                        "type": "string",
                        "description": "Fully qualified name, e.g. \"java.util.HashMap\""
                    }
                },
                "required": ["class_name"]
            }),
        },
    ]
}

/// Run the operation `name` with `arguments` against `engine`.
pub fn dispatch(engine: &QueryEngine, name: &str, arguments: Value) -> ToolResponse {
    debug!(tool = name, "dispatch");
    match name {
        SEARCH_TOOL => match serde_json::from_value::<SearchArgs>(arguments) {
            Ok(args) => search(engine, &args.query),
            Err(e) => ToolResponse::error(ErrorClass::InvalidInput, e),
        },
        GET_DOC_TOOL => match serde_json::from_value::<GetDocArgs>(arguments) {
            Ok(args) => get_doc(engine, &args.class_name),
            Err(e) => ToolResponse::error(ErrorClass::InvalidInput, e),
        },
        other => ToolResponse::error(
            ErrorClass::InvalidInput,
            format!("unknown operation '{}'", other),
        ),
    }
}

pub fn search(engine: &QueryEngine, query: &str) -> ToolResponse {
    match engine.search(query) {
        Ok(results) => ToolResponse::ok(results.to_string()),
        Err(e) => e.into(),
    }
}

pub fn get_doc(engine: &QueryEngine, class_name: &str) -> ToolResponse {
    match engine.retrieve(class_name) {
        Ok(body) => ToolResponse::ok(body),
        Err(e) => e.into(),
    }
}
