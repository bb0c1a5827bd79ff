//! Pure-data descriptor model flowing through the pipeline. Produced
//! once per run and never mutated afterwards.

use serde::{Deserialize, Serialize};

/// Sentinel return type for endpoints that carry no payload.
pub const VOID: &str = "void";

/// HTTP verb of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpVerb {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpVerb {
    /// Wire-style name.
    pub fn as_str(self) -> &'static str {
        match self {
            HttpVerb::Get => "GET",
            HttpVerb::Post => "POST",
            HttpVerb::Put => "PUT",
            HttpVerb::Delete => "DELETE",
        }
    }

    /// Variant name used in generated source (`Method::Get` style).
    pub fn ident(self) -> &'static str {
        match self {
            HttpVerb::Get => "Get",
            HttpVerb::Post => "Post",
            HttpVerb::Put => "Put",
            HttpVerb::Delete => "Delete",
        }
    }
}

/// One formal parameter of an endpoint: declared name plus rendered type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub type_name: String,
}

/// Pure-data view of one action method.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointDescriptor {
    pub name: String,
    /// Literal concatenation of controller prefix and action suffix; no
    /// separator is ever inserted.
    pub uri: String,
    pub verb: HttpVerb,
    pub parameters: Vec<Parameter>,
    /// Rendered payload type name, [`VOID`] when there is none.
    pub return_type: String,
    pub doc: Option<String>,
}

impl EndpointDescriptor {
    pub fn returns_value(&self) -> bool {
        self.return_type != VOID
    }
}

/// One generated client: a controller name and its endpoints in
/// declaration order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientDescriptor {
    pub name: String,
    pub endpoints: Vec<EndpointDescriptor>,
}

/// One flattened member of a data type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub name: String,
    pub type_name: String,
}

/// A data type projected to plain name/type pairs for emission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimpleType {
    pub name: String,
    pub members: Vec<Member>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verb_names() {
        assert_eq!(HttpVerb::Get.as_str(), "GET");
        assert_eq!(HttpVerb::Delete.ident(), "Delete");
    }

    #[test]
    fn descriptor_serializes_like_the_ir() {
        let ep = EndpointDescriptor {
            name: "get_item".to_string(),
            uri: "api/items/{id}".to_string(),
            verb: HttpVerb::Get,
            parameters: vec![Parameter {
                name: "id".to_string(),
                type_name: "i32".to_string(),
            }],
            return_type: "Item".to_string(),
            doc: None,
        };
        let json = serde_json::to_string(&ep).unwrap();
        assert!(json.contains("\"verb\":\"Get\""));
        assert!(json.contains("\"uri\":\"api/items/{id}\""));
        assert!(ep.returns_value());
    }

    #[test]
    fn void_sentinel() {
        let ep = EndpointDescriptor {
            name: "ping".to_string(),
            uri: "api/ping".to_string(),
            verb: HttpVerb::Post,
            parameters: Vec::new(),
            return_type: VOID.to_string(),
            doc: None,
        };
        assert!(!ep.returns_value());
    }
}
