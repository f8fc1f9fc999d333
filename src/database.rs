//! In-memory collection with change hooks
//!
//! Layout: `collection > id > data type > value`. The collection only lives
//! in memory; persistence is added by a [`CollectionHooks`] implementation
//! that mirrors every change somewhere else.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Data held under one id: `data type -> value`
pub type Entry = IndexMap<String, Value>;

/// Called after the collection changes
///
/// Every method defaults to doing nothing.
pub trait CollectionHooks {
    fn on_delete_id(&mut self, _id: &str) {}
    fn on_delete_type(&mut self, _id: &str, _data_type: &str) {}
    fn on_update_id(&mut self, _id: &str, _entry: &Entry) {}
    fn on_update_type(&mut self, _id: &str, _data_type: &str, _value: &Value) {}
}

/// Hooks that ignore every change
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHooks;

impl CollectionHooks for NoHooks {}

pub struct Collection<H: CollectionHooks = NoHooks> {
    name: String,
    data: IndexMap<String, Entry>,
    hooks: H,
}

impl Collection<NoHooks> {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_hooks(name, IndexMap::new(), NoHooks)
    }
}

impl<H: CollectionHooks> Collection<H> {
    pub fn with_hooks(name: impl Into<String>, initial: IndexMap<String, Entry>, hooks: H) -> Self {
        Self {
            name: name.into(),
            data: initial,
            hooks,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn all(&self) -> &IndexMap<String, Entry> {
        &self.data
    }

    /// Whole collection as JSON
    pub fn to_json(&self, indent: usize, sort: bool) -> String {
        let indent_bytes = " ".repeat(indent).into_bytes();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(&indent_bytes);
        let mut out = Vec::new();
        let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);

        let result = if sort {
            let sorted: BTreeMap<&String, BTreeMap<&String, &Value>> = self
                .data
                .iter()
                .map(|(id, entry)| (id, entry.iter().collect()))
                .collect();
            sorted.serialize(&mut ser)
        } else {
            self.data.serialize(&mut ser)
        };

        match result {
            Ok(()) => String::from_utf8_lossy(&out).into_owned(),
            Err(e) => {
                log::warn!("Failed to serialize collection {}: {}", self.name, e);
                "{}".to_string()
            }
        }
    }

    /// Data stored under `id`, or an empty entry
    pub fn get_id(&self, id: impl ToString) -> Entry {
        self.data.get(&id.to_string()).cloned().unwrap_or_default()
    }

    pub fn get_type(&self, id: impl ToString, data_type: impl ToString) -> Option<Value> {
        self.data
            .get(&id.to_string())
            .and_then(|entry| entry.get(&data_type.to_string()))
            .cloned()
    }

    /// Copy everything under `old_id` to `new_id`
    pub fn copy_id(&mut self, old_id: impl ToString, new_id: impl ToString, delete_old: bool) {
        let old_id = old_id.to_string();
        let entry = self.get_id(&old_id);
        self.update_id(new_id, entry);
        if delete_old {
            self.delete_id(old_id);
        }
    }

    /// Remove `id`; the hook only runs when it existed
    pub fn delete_id(&mut self, id: impl ToString) {
        let id = id.to_string();
        if self.data.shift_remove(&id).is_some() {
            self.hooks.on_delete_id(&id);
        }
    }

    /// Remove data types from `id`, then store the remaining entry
    pub fn delete_types<I, T>(&mut self, id: impl ToString, data_types: I)
    where
        I: IntoIterator<Item = T>,
        T: ToString,
    {
        let id = id.to_string();
        let mut entry = self.get_id(&id);
        for data_type in data_types {
            let data_type = data_type.to_string();
            if entry.shift_remove(&data_type).is_some() {
                self.hooks.on_delete_type(&id, &data_type);
            }
        }
        self.update_id(id, entry);
    }

    /// Replace everything under `id`
    pub fn update_id(&mut self, id: impl ToString, entry: Entry) {
        let id = id.to_string();
        self.hooks.on_update_id(&id, &entry);
        self.data.insert(id, entry);
    }

    /// Set one data type under `id`
    pub fn update_type(&mut self, id: impl ToString, data_type: impl ToString, value: impl Into<Value>) {
        let id = id.to_string();
        let data_type = data_type.to_string();
        let value = value.into();

        let mut entry = self.get_id(&id);
        self.hooks.on_update_type(&id, &data_type, &value);
        entry.insert(data_type, value);
        self.update_id(id, entry);
    }
}

impl<H: CollectionHooks> fmt::Display for Collection<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JSON Representation of all data:\n{}", self.to_json(4, true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Default)]
    struct Journal(Vec<String>);

    impl CollectionHooks for Journal {
        fn on_delete_id(&mut self, id: &str) {
            self.0.push(format!("delete {}", id));
        }
        fn on_delete_type(&mut self, id: &str, data_type: &str) {
            self.0.push(format!("delete {}.{}", id, data_type));
        }
        fn on_update_id(&mut self, id: &str, entry: &Entry) {
            self.0.push(format!("update {} ({} types)", id, entry.len()));
        }
        fn on_update_type(&mut self, id: &str, data_type: &str, value: &Value) {
            self.0.push(format!("update {}.{} = {}", id, data_type, value));
        }
    }

    fn journaled() -> Collection<Journal> {
        Collection::with_hooks("users", IndexMap::new(), Journal::default())
    }

    #[test]
    fn test_update_and_get() {
        let mut c = Collection::new("users");
        c.update_type(1, "name", "ana");
        c.update_type(1, "age", 31);

        assert_eq!(c.get_type("1", "name"), Some(json!("ana")));
        assert_eq!(c.get_type(1, "age"), Some(json!(31)));
        assert_eq!(c.get_type(2, "age"), None);
        assert!(c.get_id(2).is_empty());
        assert_eq!(c.get_id(1).len(), 2);
    }

    #[test]
    fn test_hooks_fire_in_order() {
        let mut c = journaled();
        c.update_type("u1", "name", "ana");
        c.delete_types("u1", ["name", "absent"]);
        c.delete_id("u1");
        c.delete_id("u1");

        assert_eq!(
            c.hooks().0,
            vec![
                "update u1.name = \"ana\"",
                "update u1 (1 types)",
                "delete u1.name",
                "update u1 (0 types)",
                "delete u1",
            ]
        );
    }

    #[test]
    fn test_copy_id() {
        let mut c = Collection::new("users");
        c.update_type("a", "k", 1);

        c.copy_id("a", "b", false);
        assert_eq!(c.get_type("b", "k"), Some(json!(1)));
        assert!(c.all().contains_key("a"));

        c.copy_id("b", "c", true);
        assert!(!c.all().contains_key("b"));
        assert_eq!(c.get_type("c", "k"), Some(json!(1)));
    }

    #[test]
    fn test_to_json_sorted_and_unsorted() {
        let mut c = Collection::new("users");
        c.update_type("z", "b", 2);
        c.update_type("z", "a", 1);
        c.update_type("m", "x", true);

        assert_eq!(c.to_json(0, true).replace('\n', ""), r#"{"m": {"x": true},"z": {"a": 1,"b": 2}}"#);
        assert_eq!(c.to_json(0, false).replace('\n', ""), r#"{"z": {"b": 2,"a": 1},"m": {"x": true}}"#);
        assert!(c.to_string().starts_with("JSON Representation of all data:\n{"));
    }
}
