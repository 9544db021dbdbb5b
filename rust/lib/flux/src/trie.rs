use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Thread-safe pattern trie over `/`-separated paths.
///
/// Pattern segments:
/// - a literal matches the same segment
/// - `+` matches exactly one segment
/// - `#` matches the rest of the path, including nothing (last segment only)
///
/// ```ignore
/// let trie = Trie::new();
/// trie.insert("feed/+/replies", 1);
/// trie.insert("feed/#", 2);
/// assert_eq!(trie.match_topic("feed/42/replies"), vec![1, 2]);
/// ```
pub struct Trie<T> {
    root: RwLock<Node<T>>,
}

struct Node<T> {
    literal: HashMap<String, Node<T>>,
    any_one: Option<Box<Node<T>>>,
    /// Values of patterns ending in `#` at this depth.
    rest: Vec<T>,
    /// Values of patterns ending exactly at this node.
    here: Vec<T>,
}

impl<T> Default for Node<T> {
    fn default() -> Self {
        Self {
            literal: HashMap::new(),
            any_one: None,
            rest: Vec::new(),
            here: Vec::new(),
        }
    }
}

impl<T: Clone> Trie<T> {
    pub fn new() -> Self {
        Self {
            root: RwLock::new(Node::default()),
        }
    }

    /// Store `value` under `pattern`. Segments after a `#` are ignored.
    pub fn insert(&self, pattern: &str, value: T) {
        let mut root = self.root.write().unwrap_or_else(PoisonError::into_inner);
        let mut node = &mut *root;
        for seg in pattern.split('/') {
            match seg {
                "#" => {
                    node.rest.push(value);
                    return;
                }
                "+" => node = &mut **node.any_one.get_or_insert_with(Box::default),
                lit => node = node.literal.entry(lit.to_string()).or_default(),
            }
        }
        node.here.push(value);
    }

    /// All values whose pattern matches the concrete `topic`, exact
    /// matches before wildcard matches at each depth.
    pub fn match_topic(&self, topic: &str) -> Vec<T> {
        let root = self.root.read().unwrap_or_else(PoisonError::into_inner);
        let segments: Vec<&str> = topic.split('/').collect();
        let mut out = Vec::new();
        if !topic.is_empty() {
            root.collect(&segments, &mut out);
        }
        out
    }

    /// Drop values under the exact `pattern` for which `predicate` holds.
    /// Returns whether anything was removed.
    pub fn remove(&self, pattern: &str, predicate: impl Fn(&T) -> bool) -> bool {
        let mut root = self.root.write().unwrap_or_else(PoisonError::into_inner);
        let mut node = &mut *root;
        for seg in pattern.split('/') {
            let next = match seg {
                "#" => return retain_not(&mut node.rest, &predicate),
                "+" => node.any_one.as_deref_mut(),
                lit => node.literal.get_mut(lit),
            };
            match next {
                Some(n) => node = n,
                None => return false,
            }
        }
        retain_not(&mut node.here, &predicate)
    }

    /// Whether any value is stored under the exact `pattern`.
    pub fn has_pattern(&self, pattern: &str) -> bool {
        let root = self.root.read().unwrap_or_else(PoisonError::into_inner);
        let mut node = &*root;
        for seg in pattern.split('/') {
            let next = match seg {
                "#" => return !node.rest.is_empty(),
                "+" => node.any_one.as_deref(),
                lit => node.literal.get(lit),
            };
            match next {
                Some(n) => node = n,
                None => return false,
            }
        }
        !node.here.is_empty()
    }
}

impl<T: Clone> Default for Trie<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Node<T> {
    fn collect(&self, segments: &[&str], out: &mut Vec<T>) {
        let Some((first, tail)) = segments.split_first() else {
            out.extend(self.here.iter().cloned());
            out.extend(self.rest.iter().cloned());
            return;
        };
        if let Some(child) = self.literal.get(*first) {
            child.collect(tail, out);
        }
        if let Some(child) = &self.any_one {
            child.collect(tail, out);
        }
        out.extend(self.rest.iter().cloned());
    }
}

fn retain_not<T>(values: &mut Vec<T>, predicate: &impl Fn(&T) -> bool) -> bool {
    let before = values.len();
    values.retain(|v| !predicate(v));
    values.len() < before
}
