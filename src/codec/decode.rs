use crate::error::ImportError;
use crate::node::{Node, NodeId, Parameters, Position, TypeVersion};
use crate::workflow::{Endpoint, MAIN, Port, Workflow};
use ahash::AHashMap;
use serde_json::{Map, Value};

const DEFAULT_NAME: &str = "Imported Workflow";

/// Rebuilds a workflow from a parsed document.
///
/// Requires `nodes` and `connections`; everything else falls back to the defaults of a
/// freshly created workflow. Stops at the first missing or malformed key.
pub fn decode(document: Value) -> Result<Workflow, ImportError> {
    let Value::Object(mut root) = document else {
        return Err(ImportError::malformed("$", "expected a JSON object"));
    };

    let nodes = match root.remove("nodes") {
        Some(Value::Array(nodes)) => nodes,
        Some(_) => return Err(ImportError::malformed("nodes", "expected an array")),
        None => return Err(ImportError::MissingField("nodes".to_string())),
    };
    let connections = match root.remove("connections") {
        Some(Value::Object(connections)) => connections,
        Some(_) => return Err(ImportError::malformed("connections", "expected an object")),
        None => return Err(ImportError::MissingField("connections".to_string())),
    };

    let name = optional_string(&mut root, "name")?.unwrap_or_else(|| DEFAULT_NAME.to_string());
    let mut workflow = match optional_string(&mut root, "id")? {
        Some(id) => Workflow::with_id(&name, &id),
        None => Workflow::new(&name),
    }
    .map_err(|e| ImportError::malformed("name", e))?;

    let mut ids_by_name: AHashMap<String, NodeId> = AHashMap::with_capacity(nodes.len());
    for (index, value) in nodes.into_iter().enumerate() {
        let node = decode_node(index, value)?;
        let name = node.name().to_string();
        if ids_by_name.contains_key(&name) {
            return Err(ImportError::malformed(
                format!("nodes[{}].name", index),
                format!("duplicate node name '{}'", name),
            ));
        }
        let id = workflow
            .add_node(node)
            .map_err(|e| ImportError::malformed(format!("nodes[{}].id", index), e))?;
        ids_by_name.insert(name, id);
    }

    for (source_name, ports) in connections {
        let path = format!("connections.{}", source_name);
        let source = ids_by_name
            .get(&source_name)
            .ok_or_else(|| ImportError::malformed(&path, "unknown source node"))?;
        let Value::Object(ports) = ports else {
            return Err(ImportError::malformed(path, "expected an object"));
        };

        for (kind, slots) in ports {
            let slots = decode_slots(&format!("{}.{}", path, kind), slots, &ids_by_name)?;
            workflow
                .connections
                .insert_slots(source.clone(), kind, slots);
        }
    }

    if let Some(active) = root.remove("active") {
        workflow.active = active
            .as_bool()
            .ok_or_else(|| ImportError::malformed("active", "expected a boolean"))?;
    }
    if let Some(settings) = optional_object(&mut root, "settings")? {
        workflow.settings = settings;
    }
    match root.remove("tags") {
        Some(Value::Array(tags)) => workflow.tags = tags,
        Some(Value::Null) | None => {}
        Some(_) => return Err(ImportError::malformed("tags", "expected an array")),
    }
    if let Some(pin_data) = optional_object(&mut root, "pinData")? {
        workflow.pin_data = pin_data;
    }
    if let Some(meta) = optional_object(&mut root, "meta")? {
        workflow.meta = meta;
    }
    // Last, so that adding nodes above does not overwrite the stored timestamps.
    if let Some(created_at) = optional_string(&mut root, "createdAt")? {
        workflow.created_at = created_at;
    }
    if let Some(updated_at) = optional_string(&mut root, "updatedAt")? {
        workflow.updated_at = updated_at;
    }

    tracing::info!(
        workflow = %workflow.name(),
        nodes = workflow.nodes().len(),
        connections = workflow.connections().len(),
        "imported workflow"
    );
    Ok(workflow)
}

fn decode_node(index: usize, value: Value) -> Result<Node, ImportError> {
    let path = |key: &str| format!("nodes[{}].{}", index, key);

    let Value::Object(mut fields) = value else {
        return Err(ImportError::malformed(
            format!("nodes[{}]", index),
            "expected an object",
        ));
    };

    let id = required_string(&mut fields, "id", &path)?;
    let name = required_string(&mut fields, "name", &path)?;
    let node_type = required_string(&mut fields, "type", &path)?;
    let position = match fields.remove("position") {
        Some(value) => decode_position(&path("position"), &value)?,
        None => return Err(ImportError::MissingField(path("position"))),
    };

    let type_version = match fields.remove("typeVersion") {
        None | Some(Value::Null) => TypeVersion::default(),
        Some(Value::Number(number)) => {
            TypeVersion::from_number(&number).ok_or_else(|| ImportError::UnsupportedVersion {
                node: name.clone(),
                found: number.to_string(),
            })?
        }
        Some(other) => {
            return Err(ImportError::UnsupportedVersion {
                node: name,
                found: other.to_string(),
            });
        }
    };

    let parameters = take_object(&mut fields, "parameters", &path)?;
    let credentials = take_object(&mut fields, "credentials", &path)?;

    Node::builder(&node_type, &name)
        .id(id)
        .type_version(type_version)
        .parameters(parameters)
        .credentials(credentials)
        .position(position)
        .build()
        .map_err(|e| ImportError::malformed(format!("nodes[{}]", index), e))
}

fn decode_position(path: &str, value: &Value) -> Result<Position, ImportError> {
    let coordinate = |value: &Value| {
        value
            .as_i64()
            .or_else(|| value.as_f64().map(|f| f.round() as i64))
    };

    match value.as_array().map(Vec::as_slice) {
        Some([x, y]) => match (coordinate(x), coordinate(y)) {
            (Some(x), Some(y)) => Ok(Position::new(x, y)),
            _ => Err(ImportError::malformed(path, "coordinates must be numbers")),
        },
        _ => Err(ImportError::malformed(path, "expected a list of 2 numbers")),
    }
}

fn decode_slots(
    path: &str,
    slots: Value,
    ids_by_name: &AHashMap<String, NodeId>,
) -> Result<Vec<Vec<Endpoint>>, ImportError> {
    let Value::Array(slots) = slots else {
        return Err(ImportError::malformed(path, "expected an array of output slots"));
    };

    slots
        .into_iter()
        .enumerate()
        .map(|(output, slot)| {
            let path = format!("{}[{}]", path, output);
            match slot {
                Value::Null => Ok(Vec::new()),
                Value::Array(endpoints) => endpoints
                    .iter()
                    .enumerate()
                    .map(|(i, endpoint)| {
                        decode_endpoint(&format!("{}[{}]", path, i), endpoint, ids_by_name)
                    })
                    .collect(),
                _ => Err(ImportError::malformed(path, "expected an array of connections")),
            }
        })
        .collect()
}

fn decode_endpoint(
    path: &str,
    value: &Value,
    ids_by_name: &AHashMap<String, NodeId>,
) -> Result<Endpoint, ImportError> {
    let Some(fields) = value.as_object() else {
        return Err(ImportError::malformed(path, "expected an object"));
    };

    let target = match fields.get("node") {
        Some(Value::String(target)) => target,
        Some(_) => return Err(ImportError::malformed(format!("{}.node", path), "expected a string")),
        None => return Err(ImportError::MissingField(format!("{}.node", path))),
    };
    let node = ids_by_name
        .get(target)
        .cloned()
        .ok_or_else(|| ImportError::malformed(format!("{}.node", path), format!("unknown target node '{}'", target)))?;

    let kind = match fields.get("type") {
        None => MAIN,
        Some(Value::String(kind)) if !kind.trim().is_empty() => kind.as_str(),
        Some(_) => return Err(ImportError::malformed(format!("{}.type", path), "expected a port kind")),
    };
    let index = match fields.get("index") {
        None => 0,
        Some(index) => index
            .as_u64()
            .map(|i| i as usize)
            .ok_or_else(|| ImportError::malformed(format!("{}.index", path), "expected a non-negative integer"))?,
    };

    Ok(Endpoint {
        node,
        input: Port::new(kind, index),
    })
}

fn required_string(
    fields: &mut Map<String, Value>,
    key: &str,
    path: &dyn Fn(&str) -> String,
) -> Result<String, ImportError> {
    match fields.remove(key) {
        Some(Value::String(value)) => Ok(value),
        Some(_) => Err(ImportError::malformed(path(key), "expected a string")),
        None => Err(ImportError::MissingField(path(key))),
    }
}

fn take_object(
    fields: &mut Map<String, Value>,
    key: &str,
    path: &dyn Fn(&str) -> String,
) -> Result<Parameters, ImportError> {
    match fields.remove(key) {
        Some(Value::Object(map)) => Ok(map),
        Some(Value::Null) | None => Ok(Parameters::new()),
        Some(_) => Err(ImportError::malformed(path(key), "expected an object")),
    }
}

fn optional_string(root: &mut Map<String, Value>, key: &str) -> Result<Option<String>, ImportError> {
    match root.remove(key) {
        Some(Value::String(value)) => Ok(Some(value)),
        Some(Value::Null) | None => Ok(None),
        Some(_) => Err(ImportError::malformed(key, "expected a string")),
    }
}

fn optional_object(
    root: &mut Map<String, Value>,
    key: &str,
) -> Result<Option<Map<String, Value>>, ImportError> {
    match root.remove(key) {
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(Value::Null) | None => Ok(None),
        Some(_) => Err(ImportError::malformed(key, "expected an object")),
    }
}
