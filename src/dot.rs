//! Dotted-path access into JSON values (`"a.b.c"`, `"items.0.name"`).
//!
//! Numeric segments index arrays; on objects they are plain keys. A literal dot
//! inside a key is written `\.`.
use crate::errors::{HookError, Result};
use serde_json::{Map, Value};

/// Most nulls a write may insert to reach an array index.
pub const MAX_ARRAY_PAD: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DotPath {
    pub segments: Vec<String>,
}

impl DotPath {
    pub fn parse(input: &str) -> Result<Self> {
        let mut p = Parser::new(input);
        p.parse().map_err(|reason| HookError::Path { path: input.to_string(), reason })
    }
}

struct Parser<'a> {
    s: &'a str,
    i: usize,
}

impl<'a> Parser<'a> {
    fn new(s: &'a str) -> Self {
        Self { s, i: 0 }
    }

    fn parse(&mut self) -> std::result::Result<DotPath, String> {
        if self.eof() {
            return Err("empty path".into());
        }
        let mut segments = vec![self.parse_segment()?];
        while self.consume_char('.') {
            segments.push(self.parse_segment()?);
        }
        Ok(DotPath { segments })
    }

    fn parse_segment(&mut self) -> std::result::Result<String, String> {
        let mut out = String::new();
        while let Some(c) = self.peek_char() {
            if c == '.' {
                break;
            }
            self.i += c.len_utf8();
            if c == '\\' && self.peek_char() == Some('.') {
                self.i += 1;
                out.push('.');
            } else {
                out.push(c);
            }
        }
        if out.is_empty() {
            return Err(format!("empty segment at offset {}", self.i));
        }
        Ok(out)
    }

    fn consume_char(&mut self, c: char) -> bool {
        if self.peek_char() == Some(c) {
            self.i += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.s[self.i..].chars().next()
    }

    fn eof(&self) -> bool {
        self.i >= self.s.len()
    }
}

fn child<'v>(v: &'v Value, seg: &str) -> Option<&'v Value> {
    match v {
        Value::Object(map) => map.get(seg),
        Value::Array(items) => seg.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

fn child_mut<'v>(v: &'v mut Value, seg: &str) -> Option<&'v mut Value> {
    match v {
        Value::Object(map) => map.get_mut(seg),
        Value::Array(items) => seg.parse::<usize>().ok().and_then(move |i| items.get_mut(i)),
        _ => None,
    }
}

/// Slot for `seg` under `v`, turning scalars into objects and padding arrays with nulls.
fn slot<'v>(v: &'v mut Value, seg: &str, path: &str) -> Result<&'v mut Value> {
    if !matches!(v, Value::Array(_) | Value::Object(_)) {
        *v = Value::Object(Map::new());
    }
    match v {
        Value::Array(items) => {
            let idx = seg.parse::<usize>().map_err(|_| HookError::Path {
                path: path.to_string(),
                reason: format!("`{seg}` is not an array index"),
            })?;
            if idx >= items.len() {
                if idx - items.len() > MAX_ARRAY_PAD {
                    return Err(HookError::Path { path: path.to_string(), reason: "index out of range".into() });
                }
                items.resize(idx + 1, Value::Null);
            }
            Ok(&mut items[idx])
        }
        Value::Object(map) => Ok(map.entry(seg.to_string()).or_insert(Value::Null)),
        _ => Err(HookError::Path { path: path.to_string(), reason: "not a container".into() }),
    }
}

pub fn get_by_dot<'v>(root: &'v Value, path: &str) -> Option<&'v Value> {
    let path = DotPath::parse(path).ok()?;
    path.segments.iter().try_fold(root, |cur, seg| child(cur, seg))
}

pub fn get_by_dot_mut<'v>(root: &'v mut Value, path: &str) -> Option<&'v mut Value> {
    let path = DotPath::parse(path).ok()?;
    let mut cur = root;
    for seg in &path.segments {
        cur = child_mut(cur, seg)?;
    }
    Some(cur)
}

/// Write `value` at `path`, creating intermediate objects as needed.
pub fn set_by_dot(root: &mut Value, path: &str, value: Value) -> Result<()> {
    let parsed = DotPath::parse(path)?;
    let mut cur = root;
    for seg in &parsed.segments {
        cur = slot(cur, seg, path)?;
    }
    *cur = value;
    Ok(())
}

/// Remove the leaf key at `path` and return what was there. Never creates containers.
/// Array elements are nulled rather than shifted.
pub fn delete_by_dot(root: &mut Value, path: &str) -> Option<Value> {
    let parsed = DotPath::parse(path).ok()?;
    let (last, parents) = parsed.segments.split_last()?;
    let mut cur = root;
    for seg in parents {
        cur = child_mut(cur, seg)?;
    }
    match cur {
        Value::Object(map) => map.remove(last.as_str()),
        Value::Array(items) => {
            let idx = last.parse::<usize>().ok()?;
            items.get_mut(idx).map(Value::take)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn parses_segments_and_escapes() {
        let p = DotPath::parse(r"a.b\.c.0").unwrap();
        assert_eq!(p.segments, vec!["a", "b.c", "0"]);
        assert!(DotPath::parse("").is_err());
        assert!(DotPath::parse("a..b").is_err());
    }

    #[test]
    fn reads_through_objects_and_arrays() {
        let v = json!({"a": {"list": [{"name": "x"}, {"name": "y"}]}});
        assert_eq!(get_by_dot(&v, "a.list.1.name"), Some(&json!("y")));
        assert_eq!(get_by_dot(&v, "a.list.9.name"), None);
        assert_eq!(get_by_dot(&v, "a.missing"), None);
    }

    #[test]
    fn mutable_lookup_edits_in_place() {
        let mut v = json!({"a": [{"n": 1}]});
        if let Some(n) = get_by_dot_mut(&mut v, "a.0.n") {
            *n = json!(2);
        }
        assert_eq!(v, json!({"a": [{"n": 2}]}));
        assert!(get_by_dot_mut(&mut v, "a.1.n").is_none());
    }

    #[test]
    fn write_creates_intermediates() {
        let mut v = json!({"a": 1});
        set_by_dot(&mut v, "b.c.d", json!(true)).unwrap();
        set_by_dot(&mut v, "a.x", json!("over")).unwrap();
        assert_eq!(v, json!({"a": {"x": "over"}, "b": {"c": {"d": true}}}));
    }

    #[test]
    fn write_pads_arrays() {
        let mut v = json!({"l": [1]});
        set_by_dot(&mut v, "l.3", json!(4)).unwrap();
        assert_eq!(v, json!({"l": [1, null, null, 4]}));
        assert!(set_by_dot(&mut v, "l.name", json!(0)).is_err());
    }

    #[test]
    fn write_rejects_far_out_indices() {
        let mut v = json!({"l": [1]});
        for path in ["l.18446744073709551615", "l.4000000000", "l.1026"] {
            let err = set_by_dot(&mut v, path, json!(0)).unwrap_err();
            assert!(matches!(err, HookError::Path { reason, .. } if reason == "index out of range"));
        }
        assert_eq!(v, json!({"l": [1]}));

        set_by_dot(&mut v, "l.1025", json!(0)).unwrap();
        assert_eq!(v["l"].as_array().map(Vec::len), Some(1026));
    }

    #[test]
    fn delete_removes_key_without_creating() {
        let mut v = json!({"a": {"b": 1, "c": 2}});
        assert_eq!(delete_by_dot(&mut v, "a.b"), Some(json!(1)));
        assert_eq!(delete_by_dot(&mut v, "x.y"), None);
        assert_eq!(v, json!({"a": {"c": 2}}));
    }
}
