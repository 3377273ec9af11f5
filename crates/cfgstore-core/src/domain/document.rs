//! Ordered configuration document domain entity.
//!
//! A [`ConfigDocument`] is one level of configuration: an insertion-ordered
//! map from [`Key`] to [`ConfigValue`].  Nested levels are documents stored
//! inside [`ConfigValue::Document`].
//!
//! # Lists are documents too (for beginners)
//!
//! PHP arrays are both lists and maps at the same time, and hand-written
//! config files freely mix the two.  To keep a file byte-stable when it is
//! loaded and written back, this model does the same: a list is simply a
//! document whose keys are exactly `Int(0), Int(1), …, Int(n-1)` in that
//! order.  [`ConfigDocument::is_list`] is the single place that decides
//! whether a document is a list; the serializer and every other caller go
//! through it.

use std::fmt;

use indexmap::IndexMap;

/// A key within one document level.
///
/// Ordering and hashing follow the derived implementations; `Int(1)` and
/// `Str("1")` are different keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    /// An integer key (`0 => …` in source form, or an implicit list index).
    Int(i64),
    /// A string key (`'name' => …` in source form).
    Str(String),
}

impl Key {
    /// Returns the key as a string slice if it is a string key.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Key::Str(s) => Some(s),
            Key::Int(_) => None,
        }
    }

    /// Returns the key as an integer if it is an integer key.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Key::Int(i) => Some(*i),
            Key::Str(_) => None,
        }
    }

    /// Length of the key's unquoted text in bytes.
    ///
    /// This is the width the layout calculator aligns on: the raw string for
    /// string keys and the decimal digits (plus sign) for integer keys.
    pub fn text_len(&self) -> usize {
        match self {
            Key::Str(s) => s.len(),
            Key::Int(i) => i.to_string().len(),
        }
    }

    /// Interprets one segment of a dotted path such as `"servers.0.host"`.
    ///
    /// Canonical integer text (`"0"`, `"42"`, `"-7"`, but not `"007"` or
    /// `"-0"`) becomes an [`Key::Int`]; everything else is a [`Key::Str`].
    pub fn from_path_segment(segment: &str) -> Key {
        if is_canonical_int(segment) {
            if let Ok(i) = segment.parse::<i64>() {
                return Key::Int(i);
            }
        }
        Key::Str(segment.to_string())
    }
}

fn is_canonical_int(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    if digits == "0" {
        return !text.starts_with('-');
    }
    !digits.starts_with('0')
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(i) => write!(f, "{i}"),
            Key::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Str(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Str(s)
    }
}

impl From<&String> for Key {
    fn from(s: &String) -> Self {
        Key::Str(s.clone())
    }
}

impl From<i64> for Key {
    fn from(i: i64) -> Self {
        Key::Int(i)
    }
}

impl From<i32> for Key {
    fn from(i: i32) -> Self {
        Key::Int(i64::from(i))
    }
}

impl From<&Key> for Key {
    fn from(k: &Key) -> Self {
        k.clone()
    }
}

/// A single configuration value.
///
/// The scalar variants are the only literals the source form supports.
/// Anything structured is a [`ConfigValue::Document`], whether it is shaped
/// like a list or like a map.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// A nested level: either an associative block or a list.
    Document(ConfigDocument),
}

impl ConfigValue {
    /// Builds a list-shaped document value from `items`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cfgstore_core::ConfigValue;
    ///
    /// let hosts = ConfigValue::list(["a.example", "b.example"]);
    /// assert!(hosts.as_document().unwrap().is_list());
    /// ```
    pub fn list<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ConfigValue>,
    {
        ConfigValue::Document(ConfigDocument::list(items))
    }

    /// Short human-readable name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            ConfigValue::Null => "null",
            ConfigValue::Bool(_) => "bool",
            ConfigValue::Int(_) => "int",
            ConfigValue::Float(_) => "float",
            ConfigValue::String(_) => "string",
            ConfigValue::Document(d) if d.is_list() => "list",
            ConfigValue::Document(_) => "document",
        }
    }

    /// `true` for every variant except [`ConfigValue::Document`].
    pub fn is_scalar(&self) -> bool {
        !matches!(self, ConfigValue::Document(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ConfigValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ConfigValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value as a float; integers are widened.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ConfigValue::Float(f) => Some(*f),
            ConfigValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_document(&self) -> Option<&ConfigDocument> {
        match self {
            ConfigValue::Document(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_document_mut(&mut self) -> Option<&mut ConfigDocument> {
        match self {
            ConfigValue::Document(d) => Some(d),
            _ => None,
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        ConfigValue::Bool(b)
    }
}

impl From<i64> for ConfigValue {
    fn from(i: i64) -> Self {
        ConfigValue::Int(i)
    }
}

impl From<i32> for ConfigValue {
    fn from(i: i32) -> Self {
        ConfigValue::Int(i64::from(i))
    }
}

impl From<u32> for ConfigValue {
    fn from(i: u32) -> Self {
        ConfigValue::Int(i64::from(i))
    }
}

impl From<u16> for ConfigValue {
    fn from(i: u16) -> Self {
        ConfigValue::Int(i64::from(i))
    }
}

impl From<f64> for ConfigValue {
    fn from(f: f64) -> Self {
        ConfigValue::Float(f)
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        ConfigValue::String(s.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        ConfigValue::String(s)
    }
}

impl From<ConfigDocument> for ConfigValue {
    fn from(d: ConfigDocument) -> Self {
        ConfigValue::Document(d)
    }
}

impl<T: Into<ConfigValue>> From<Option<T>> for ConfigValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(ConfigValue::Null, Into::into)
    }
}

impl<T: Into<ConfigValue>> From<Vec<T>> for ConfigValue {
    fn from(items: Vec<T>) -> Self {
        ConfigValue::list(items)
    }
}

impl From<serde_json::Value> for ConfigValue {
    /// Converts decoded JSON into a config value.
    ///
    /// Arrays become list-shaped documents and objects keep their field
    /// order as written in the source text.  Numbers that fit an
    /// `i64` stay integers; everything else becomes a float.
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => ConfigValue::Null,
            Value::Bool(b) => ConfigValue::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => ConfigValue::Int(i),
                None => n.as_f64().map_or(ConfigValue::Null, ConfigValue::Float),
            },
            Value::String(s) => ConfigValue::String(s),
            Value::Array(items) => ConfigValue::list(items),
            Value::Object(fields) => ConfigValue::Document(
                fields
                    .into_iter()
                    .map(|(k, v)| (Key::Str(k), ConfigValue::from(v)))
                    .collect(),
            ),
        }
    }
}

/// An insertion-ordered configuration level.
///
/// Order is significant: it is the order entries are written to disk, and it
/// survives any number of load → mutate → save cycles.  Replacing the value of
/// an existing key keeps the key where it was; new keys are appended.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigDocument {
    entries: IndexMap<Key, ConfigValue>,
}

impl ConfigDocument {
    /// Creates an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a list-shaped document (keys `0..n-1`) from `items`.
    pub fn list<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ConfigValue>,
    {
        items
            .into_iter()
            .enumerate()
            .map(|(i, v)| (Key::Int(i as i64), v.into()))
            .collect()
    }

    /// Converts a decoded JSON value into a document.
    ///
    /// Returns `None` unless the JSON root is an object; a config file is
    /// always keyed by section names.
    pub fn from_json(value: serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Object(_) => match ConfigValue::from(value) {
                ConfigValue::Document(doc) => Some(doc),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` when the keys are exactly `Int(0)..Int(n-1)` in order.
    ///
    /// Any gap, reordering, negative index or string key makes the document
    /// associative.  An empty document counts as a list.
    pub fn is_list(&self) -> bool {
        self.entries
            .keys()
            .enumerate()
            .all(|(i, k)| *k == Key::Int(i as i64))
    }

    /// The index an unkeyed entry would receive: one past the largest integer
    /// key, or 0 when there is none.
    ///
    /// Returns `None` if the largest key is already `i64::MAX`.
    pub fn next_index(&self) -> Option<i64> {
        match self.entries.keys().filter_map(Key::as_int).max() {
            Some(max) => max.checked_add(1),
            None => Some(0),
        }
    }

    pub fn get<K: Into<Key>>(&self, key: K) -> Option<&ConfigValue> {
        self.entries.get(&key.into())
    }

    pub fn get_mut<K: Into<Key>>(&mut self, key: K) -> Option<&mut ConfigValue> {
        self.entries.get_mut(&key.into())
    }

    pub fn contains_key<K: Into<Key>>(&self, key: K) -> bool {
        self.entries.contains_key(&key.into())
    }

    /// Inserts or replaces an entry, returning the previous value.
    ///
    /// An existing key keeps its position; a new key is appended.
    pub fn insert<K, V>(&mut self, key: K, value: V) -> Option<ConfigValue>
    where
        K: Into<Key>,
        V: Into<ConfigValue>,
    {
        self.entries.insert(key.into(), value.into())
    }

    /// Appends `value` under [`next_index`](Self::next_index).
    ///
    /// Returns the index used, or `None` if the integer key space is
    /// exhausted (the document is left unchanged).
    pub fn push<V: Into<ConfigValue>>(&mut self, value: V) -> Option<i64> {
        let index = self.next_index()?;
        self.entries.insert(Key::Int(index), value.into());
        Some(index)
    }

    /// Removes an entry, keeping the order of the remaining ones.
    pub fn remove<K: Into<Key>>(&mut self, key: K) -> Option<ConfigValue> {
        self.entries.shift_remove(&key.into())
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, Key, ConfigValue> {
        self.entries.iter()
    }

    pub fn keys(&self) -> indexmap::map::Keys<'_, Key, ConfigValue> {
        self.entries.keys()
    }

    pub fn values(&self) -> indexmap::map::Values<'_, Key, ConfigValue> {
        self.entries.values()
    }

    // ── Dotted paths ─────────────────────────────────────────────────────────

    /// Looks up `path`, which is either an exact top-level key or a
    /// dot-separated path into nested documents (`"db.host"`).
    ///
    /// An exact top-level key always wins over path traversal, so a literal
    /// key `"a.b"` stays reachable.
    pub fn get_path(&self, path: &str) -> Option<&ConfigValue> {
        if let Some(value) = self.entries.get(&Key::Str(path.to_string())) {
            return Some(value);
        }
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.lookup_segment(first)?;
        for segment in segments {
            current = current.as_document()?.lookup_segment(segment)?;
        }
        Some(current)
    }

    /// Sets the value at `path`, creating intermediate documents as needed.
    ///
    /// A scalar that sits where an intermediate document is required is
    /// replaced by an empty document.  Returns the previous value at `path`.
    pub fn set_path<V: Into<ConfigValue>>(&mut self, path: &str, value: V) -> Option<ConfigValue> {
        let value = value.into();
        let exact = Key::Str(path.to_string());
        if path.contains('.') && self.entries.contains_key(&exact) {
            return self.entries.insert(exact, value);
        }

        let segments: Vec<&str> = path.split('.').collect();
        let (last, parents) = segments.split_last()?;

        let mut current = self;
        for segment in parents {
            let key = current.resolve_segment(segment);
            let slot = current
                .entries
                .entry(key)
                .or_insert_with(|| ConfigValue::Document(ConfigDocument::new()));
            if !matches!(slot, ConfigValue::Document(_)) {
                *slot = ConfigValue::Document(ConfigDocument::new());
            }
            current = slot.as_document_mut()?;
        }
        let key = current.resolve_segment(last);
        current.entries.insert(key, value)
    }

    /// Removes the value at `path` (exact key first, then dotted traversal).
    pub fn remove_path(&mut self, path: &str) -> Option<ConfigValue> {
        let exact = Key::Str(path.to_string());
        if self.entries.contains_key(&exact) {
            return self.entries.shift_remove(&exact);
        }

        let segments: Vec<&str> = path.split('.').collect();
        let (last, parents) = segments.split_last()?;

        let mut current = self;
        for segment in parents {
            let key = current.resolve_segment(segment);
            current = current.entries.get_mut(&key)?.as_document_mut()?;
        }
        let key = current.resolve_segment(last);
        current.entries.shift_remove(&key)
    }

    fn lookup_segment(&self, segment: &str) -> Option<&ConfigValue> {
        self.entries.get(&self.resolve_segment(segment))
    }

    /// Picks the key a path segment refers to at this level: an existing
    /// integer key, then an existing string key, then the canonical form for
    /// a new entry.
    fn resolve_segment(&self, segment: &str) -> Key {
        let key = Key::from_path_segment(segment);
        if matches!(key, Key::Int(_)) && !self.entries.contains_key(&key) {
            let as_str = Key::Str(segment.to_string());
            if self.entries.contains_key(&as_str) {
                return as_str;
            }
        }
        key
    }
}

impl<K, V> FromIterator<(K, V)> for ConfigDocument
where
    K: Into<Key>,
    V: Into<ConfigValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl IntoIterator for ConfigDocument {
    type Item = (Key, ConfigValue);
    type IntoIter = indexmap::map::IntoIter<Key, ConfigValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a ConfigDocument {
    type Item = (&'a Key, &'a ConfigValue);
    type IntoIter = indexmap::map::Iter<'a, Key, ConfigValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
