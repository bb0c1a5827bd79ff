//! Source synthesis: renders the clients and data types into one
//! compilable unit. No semantic validation happens here; the emitted
//! text goes to the compile-and-report step as-is.

use std::collections::HashSet;

use crate::error::GenError;
use crate::model::{ClientDescriptor, EndpointDescriptor, SimpleType};

/// Render the generated source unit: one client struct per controller and
/// one plain data struct per SimpleType, all under the destination
/// module. Fails only on name collisions.
pub fn synthesize(
    dest_module: &str,
    clients: &[ClientDescriptor],
    simple_types: &[SimpleType],
) -> Result<String, GenError> {
    check_names(clients, simple_types)?;

    let mut out = String::new();
    out.push_str("// Generated HTTP clients. Do not edit by hand.\n");
    out.push_str(&format!("pub mod {dest_module} {{\n"));
    out.push_str("    use clientgen_client::{Method, RestClient, RestRequest};\n");
    out.push_str("    use serde::{Deserialize, Serialize};\n");
    for client in clients {
        push_client(&mut out, client);
    }
    for simple in simple_types {
        push_simple_type(&mut out, simple);
    }
    out.push_str("}\n");
    Ok(out)
}

fn check_names(clients: &[ClientDescriptor], simple_types: &[SimpleType]) -> Result<(), GenError> {
    let mut seen = HashSet::new();
    let names = clients
        .iter()
        .map(|c| c.name.as_str())
        .chain(simple_types.iter().map(|s| s.name.as_str()));
    for name in names {
        if !seen.insert(name) {
            return Err(GenError::DuplicateName(name.to_string()));
        }
    }
    Ok(())
}

fn push_client(out: &mut String, client: &ClientDescriptor) {
    out.push_str(&format!("\n    pub struct {} {{\n", client.name));
    out.push_str("        client: RestClient,\n");
    out.push_str("    }\n\n");
    out.push_str(&format!("    impl {} {{\n", client.name));
    out.push_str("        pub fn new(base_uri: &str) -> Self {\n");
    out.push_str("            Self { client: RestClient::new(base_uri) }\n");
    out.push_str("        }\n");
    for endpoint in &client.endpoints {
        push_endpoint(out, endpoint);
    }
    out.push_str("    }\n");
}

fn push_endpoint(out: &mut String, endpoint: &EndpointDescriptor) {
    out.push('\n');
    if let Some(doc) = &endpoint.doc {
        for line in doc.lines() {
            out.push_str(&format!("        /// {line}\n"));
        }
    }

    let mut args = String::from("&self");
    for param in &endpoint.parameters {
        args.push_str(&format!(", {}: {}", param.name, param.type_name));
    }
    if endpoint.returns_value() {
        out.push_str(&format!(
            "        pub async fn {}({}) -> {} {{\n",
            endpoint.name, args, endpoint.return_type
        ));
    } else {
        out.push_str(&format!(
            "        pub async fn {}({}) {{\n",
            endpoint.name, args
        ));
    }
    out.push_str(&format!(
        "            let request = RestRequest::new({:?}, Method::{});\n",
        endpoint.uri,
        endpoint.verb.ident()
    ));
    if endpoint.returns_value() {
        out.push_str(&format!(
            "            let _ = self.client.execute::<{}>(&request).await;\n",
            endpoint.return_type
        ));
        out.push_str("            Default::default()\n");
    } else {
        out.push_str("            let _ = self.client.execute::<()>(&request).await;\n");
    }
    out.push_str("        }\n");
}

fn push_simple_type(out: &mut String, simple: &SimpleType) {
    out.push_str("\n    #[derive(Debug, Clone, Default, Serialize, Deserialize)]\n");
    out.push_str(&format!("    pub struct {} {{\n", simple.name));
    for member in &simple.members {
        out.push_str(&format!("        pub {}: {},\n", member.name, member.type_name));
    }
    out.push_str("    }\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HttpVerb, Member, Parameter, VOID};

    fn sample_client() -> ClientDescriptor {
        ClientDescriptor {
            name: "ItemsController".to_string(),
            endpoints: vec![
                EndpointDescriptor {
                    name: "get_item".to_string(),
                    uri: "api/items/{id}".to_string(),
                    verb: HttpVerb::Get,
                    parameters: vec![Parameter {
                        name: "id".to_string(),
                        type_name: "i32".to_string(),
                    }],
                    return_type: "Item".to_string(),
                    doc: Some("Fetch one item.".to_string()),
                },
                EndpointDescriptor {
                    name: "remove".to_string(),
                    uri: "api/items/{id}".to_string(),
                    verb: HttpVerb::Delete,
                    parameters: Vec::new(),
                    return_type: VOID.to_string(),
                    doc: None,
                },
            ],
        }
    }

    fn sample_type() -> SimpleType {
        SimpleType {
            name: "Item".to_string(),
            members: vec![
                Member {
                    name: "id".to_string(),
                    type_name: "i32".to_string(),
                },
                Member {
                    name: "name".to_string(),
                    type_name: "String".to_string(),
                },
            ],
        }
    }

    #[test]
    fn unit_declares_module_and_uses() {
        let unit = synthesize("clients", &[sample_client()], &[sample_type()]).unwrap();
        assert!(unit.starts_with("// Generated HTTP clients."));
        assert!(unit.contains("pub mod clients {"));
        assert!(unit.contains("use clientgen_client::{Method, RestClient, RestRequest};"));
        assert!(unit.contains("use serde::{Deserialize, Serialize};"));
    }

    #[test]
    fn client_struct_embeds_the_rest_client() {
        let unit = synthesize("clients", &[sample_client()], &[]).unwrap();
        assert!(unit.contains("pub struct ItemsController {"));
        assert!(unit.contains("client: RestClient,"));
        assert!(unit.contains("pub fn new(base_uri: &str) -> Self {"));
        assert!(unit.contains("Self { client: RestClient::new(base_uri) }"));
    }

    #[test]
    fn typed_endpoint_wires_request_and_stub_return() {
        let unit = synthesize("clients", &[sample_client()], &[sample_type()]).unwrap();
        assert!(unit.contains("/// Fetch one item."));
        assert!(unit.contains("pub async fn get_item(&self, id: i32) -> Item {"));
        assert!(unit.contains("RestRequest::new(\"api/items/{id}\", Method::Get);"));
        assert!(unit.contains("self.client.execute::<Item>(&request).await;"));
        assert!(unit.contains("Default::default()"));
    }

    #[test]
    fn void_endpoint_has_no_return_type() {
        let unit = synthesize("clients", &[sample_client()], &[]).unwrap();
        assert!(unit.contains("pub async fn remove(&self) {"));
        assert!(unit.contains("Method::Delete"));
        assert!(unit.contains("execute::<()>(&request).await;"));
    }

    #[test]
    fn simple_types_become_plain_derived_structs() {
        let unit = synthesize("clients", &[], &[sample_type()]).unwrap();
        assert!(unit.contains("#[derive(Debug, Clone, Default, Serialize, Deserialize)]"));
        assert!(unit.contains("pub struct Item {"));
        assert!(unit.contains("pub id: i32,"));
        assert!(unit.contains("pub name: String,"));
    }

    #[test]
    fn destination_module_is_configurable() {
        let unit = synthesize("generated", &[], &[sample_type()]).unwrap();
        assert!(unit.contains("pub mod generated {"));
    }

    #[test]
    fn name_collisions_abort() {
        let mut clashing = sample_client();
        clashing.name = "Item".to_string();
        let err = synthesize("clients", &[clashing], &[sample_type()]).unwrap_err();
        match err {
            GenError::DuplicateName(name) => assert_eq!(name, "Item"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
