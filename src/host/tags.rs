//! Key/value tags persisted on creatures and items by the host

use ahash::AHashMap;

/// Logical keys the engine reads and writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKey {
    /// Stack size on a creature (integer)
    StackSize,
    /// Selected tool mode code on the tool item (integer)
    ToolMode,
    /// Forget-on-spawn flag on a creature (boolean)
    ForgetOnSpawn,
}

impl TagKey {
    /// Namespaced name under which the host stores the tag
    pub fn as_str(&self) -> &'static str {
        match self {
            TagKey::StackSize => "stack.size",
            TagKey::ToolMode => "stack.toolMode",
            TagKey::ForgetOnSpawn => "stack.forgetOnSpawn",
        }
    }
}

/// Get/set/has access to the tags attached to one creature or item.
///
/// A value stored with one type is invisible to the getter of the other type.
pub trait TagStore {
    fn get_int(&self, key: TagKey) -> Option<i32>;
    fn set_int(&mut self, key: TagKey, value: i32);
    fn get_bool(&self, key: TagKey) -> Option<bool>;
    fn set_bool(&mut self, key: TagKey, value: bool);
    fn has(&self, key: TagKey) -> bool;
    fn remove(&mut self, key: TagKey);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagValue {
    Int(i32),
    Bool(bool),
}

/// In-memory tag container
#[derive(Debug, Clone, Default)]
pub struct TagMap {
    values: AHashMap<TagKey, TagValue>,
}

impl TagMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl TagStore for TagMap {
    fn get_int(&self, key: TagKey) -> Option<i32> {
        match self.values.get(&key) {
            Some(TagValue::Int(v)) => Some(*v),
            _ => None,
        }
    }

    fn set_int(&mut self, key: TagKey, value: i32) {
        self.values.insert(key, TagValue::Int(value));
    }

    fn get_bool(&self, key: TagKey) -> Option<bool> {
        match self.values.get(&key) {
            Some(TagValue::Bool(v)) => Some(*v),
            _ => None,
        }
    }

    fn set_bool(&mut self, key: TagKey, value: bool) {
        self.values.insert(key, TagValue::Bool(value));
    }

    fn has(&self, key: TagKey) -> bool {
        self.values.contains_key(&key)
    }

    fn remove(&mut self, key: TagKey) {
        self.values.remove(&key);
    }
}
