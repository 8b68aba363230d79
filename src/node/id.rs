use super::NodeId;
use std::sync::atomic::{AtomicU64, Ordering};

/// Strategy for assigning ids to nodes built without an explicit one.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self, name: &str) -> NodeId;
}

/// Deterministic ids of the form `<name-slug>-<counter>`, e.g. `http-request-3`.
#[derive(Debug, Default)]
pub struct SequentialIds {
    counter: AtomicU64,
}

impl SequentialIds {
    pub const fn new() -> Self {
        Self {
            counter: AtomicU64::new(0),
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self, name: &str) -> NodeId {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        NodeId::new(format!("{}-{}", slugify(name), n))
    }
}

/// Random v4 UUIDs, the id format the execution engine generates itself.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next_id(&self, _name: &str) -> NodeId {
        NodeId::new(uuid::Uuid::new_v4().to_string())
    }
}

/// Process-wide generator used by `Node::new` and `NodeBuilder::build`.
pub(crate) static DEFAULT_IDS: SequentialIds = SequentialIds::new();

fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    if slug.is_empty() {
        slug.push_str("node");
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_are_lowercase_and_dashed() {
        assert_eq!(slugify("HTTP Request"), "http-request");
        assert_eq!(slugify("When clicking 'Execute workflow'"), "when-clicking-execute-workflow");
        assert_eq!(slugify("***"), "node");
    }

    #[test]
    fn sequential_ids_count_per_generator() {
        let ids = SequentialIds::new();
        assert_eq!(ids.next_id("Fetch").as_str(), "fetch-1");
        assert_eq!(ids.next_id("Fetch").as_str(), "fetch-2");
        assert_eq!(SequentialIds::new().next_id("Sink").as_str(), "sink-1");
    }

    #[test]
    fn uuid_ids_are_distinct() {
        assert_ne!(UuidIds.next_id("a"), UuidIds.next_id("a"));
    }
}
