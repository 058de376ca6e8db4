use std::collections::BTreeMap;
use serde::de::DeserializeOwned;
use crate::sink::{Sink, Slot};
use crate::value::Value;

/// One selection in a query tree.
///
/// Arguments live in a `BTreeMap`, so they are always rendered in
/// ascending key order no matter how they were inserted.
#[derive(Clone, Debug, Default)]
pub struct FieldNode {
    pub name: String,
    pub arguments: BTreeMap<String, Value>,
    pub subfields: Vec<FieldNode>,
    pub alias: Option<String>,
    pub destination: Option<Sink>,
}

/// Starts a field. Shorthand for [`FieldNode::new`].
pub fn field(name: impl Into<String>) -> FieldNode {
    FieldNode::new(name)
}

impl FieldNode {
    pub fn new(name: impl Into<String>) -> FieldNode {
        FieldNode { name: name.into(), ..FieldNode::default() }
    }

    pub fn arg(mut self, name: impl Into<String>, value: impl Into<Value>) -> FieldNode {
        self.arguments.insert(name.into(), value.into());
        self
    }

    /// Sets the response key. An empty alias clears it.
    pub fn alias(mut self, alias: impl Into<String>) -> FieldNode {
        self.alias = Some(alias.into()).filter(|alias| !alias.is_empty());
        self
    }

    pub fn select(mut self, subfield: impl Into<FieldNode>) -> FieldNode {
        self.subfields.push(subfield.into());
        self
    }

    pub fn select_all<I>(mut self, subfields: I) -> FieldNode
    where
        I: IntoIterator,
        I::Item: Into<FieldNode>
    {
        self.subfields.extend(subfields.into_iter().map(Into::into));
        self
    }

    pub fn dest(mut self, sink: Sink) -> FieldNode {
        self.destination = Some(sink);
        self
    }

    /// Binds this field to a fresh [`Slot`] that will receive its decoded payload.
    pub fn bind<T>(self) -> (RequestBinding, Slot<T>)
    where
        T: DeserializeOwned + Send + 'static
    {
        let (sink, slot) = Sink::slot::<T>();
        (RequestBinding::new(self, sink), slot)
    }

    /// The key this field's result appears under: its alias, or else its name.
    pub fn key(&self) -> &str {
        self.effective_alias().unwrap_or(&self.name)
    }

    pub fn effective_alias(&self) -> Option<&str> {
        self.alias.as_deref().filter(|alias| !alias.is_empty())
    }

    pub fn is_leaf(&self) -> bool {
        self.subfields.is_empty()
    }
}

impl From<&str> for FieldNode {
    fn from(name: &str) -> Self {
        FieldNode::new(name)
    }
}

impl From<String> for FieldNode {
    fn from(name: String) -> Self {
        FieldNode::new(name)
    }
}

/// A top-level field paired with the sink its result is decoded into.
#[derive(Clone, Debug)]
pub struct RequestBinding {
    pub field: FieldNode,
    pub sink: Sink,
}

impl RequestBinding {
    pub fn new(field: FieldNode, sink: Sink) -> RequestBinding {
        RequestBinding { field, sink }
    }

    pub fn natural_key(&self) -> &str {
        self.field.key()
    }
}

impl From<FieldNode> for RequestBinding {
    fn from(mut field: FieldNode) -> Self {
        let sink = field.destination.take().unwrap_or_else(Sink::discard);
        RequestBinding { field, sink }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_arguments_and_subfields() {
        let node = field("user")
            .arg("id", 4)
            .arg("active", true)
            .select("name")
            .select(field("friends").arg("first", 10).select("id"));

        assert_eq!(node.name, "user");
        assert_eq!(node.arguments.keys().collect::<Vec<_>>(), vec!["active", "id"]);
        assert_eq!(node.subfields.len(), 2);
        assert!(node.subfields[0].is_leaf());
        assert!(!node.subfields[1].is_leaf());
    }

    #[test]
    fn later_argument_with_same_key_wins() {
        let node = field("users").arg("first", 1).arg("first", 2);
        assert_eq!(node.arguments.get("first"), Some(&Value::Int(2)));
    }

    #[test]
    fn natural_key_prefers_alias() {
        let plain = RequestBinding::from(field("user"));
        let aliased = RequestBinding::from(field("user").alias("me"));
        assert_eq!(plain.natural_key(), "user");
        assert_eq!(aliased.natural_key(), "me");
    }

    #[test]
    fn empty_alias_is_no_alias() {
        assert_eq!(field("user").alias("").alias, None);
        assert_eq!(field("user").alias("me").alias("").key(), "user");

        let node = FieldNode { alias: Some(String::new()), ..field("user") };
        assert_eq!(node.key(), "user");
        assert_eq!(node.effective_alias(), None);
    }

    #[test]
    fn binding_takes_field_destination() {
        let (sink, slot) = Sink::slot::<i64>();
        let binding = RequestBinding::from(field("count").dest(sink));
        assert!(binding.field.destination.is_none());

        let payload = serde_json::value::RawValue::from_string("3".to_string()).unwrap();
        binding.sink.accept(&payload).unwrap();
        assert_eq!(slot.get(), Some(3));
    }
}
