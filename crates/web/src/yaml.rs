//! A small block-style YAML emitter.
//!
//! Anything [`Serialize`] is first converted to a [`serde_json::Value`], whose maps keep their
//! insertion order, then written with two-space indentation:
//!
//! ```
//! use serde_json::json;
//!
//! let yaml = probe_web::yaml::emit(&json!({"name": "probe", "tags": ["a: b"], "extra": {}}));
//! assert_eq!(yaml, "name: probe\ntags:\n  - \"a: b\"\nextra: {}\n");
//! ```

use serde::Serialize;
use serde_json::Value;

const INDENT: usize = 2;

const SPECIAL_CHARS: &[char] =
    &[':', '-', '?', '#', ',', '[', ']', '{', '}', '&', '*', '!', '|', '>', '\'', '"', '%', '@', '`'];

const RESERVED_WORDS: &[&str] = &["true", "false", "yes", "no", "on", "off", "null", "~"];

/// Serializes `value` and renders it as YAML.
pub fn to_string<T: Serialize + ?Sized>(value: &T) -> Result<String, serde_json::Error> {
    Ok(emit(&serde_json::to_value(value)?))
}

/// Renders a JSON tree as YAML.
pub fn emit(value: &Value) -> String {
    let mut out = String::new();
    write_node(&mut out, value, 0);
    out
}

fn write_node(out: &mut String, value: &Value, indent: usize) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                push_indent(out, indent);
                write_text(out, key);
                out.push(':');
                write_child(out, child, indent);
            }
        }
        Value::Array(items) if !items.is_empty() => {
            for item in items {
                push_indent(out, indent);
                out.push('-');
                write_child(out, item, indent);
            }
        }
        _ => {
            write_inline(out, value);
            out.push('\n');
        }
    }
}

fn write_child(out: &mut String, child: &Value, indent: usize) {
    if is_block(child) {
        out.push('\n');
        write_node(out, child, indent + INDENT);
    } else {
        out.push(' ');
        write_inline(out, child);
        out.push('\n');
    }
}

fn push_indent(out: &mut String, indent: usize) {
    out.extend(std::iter::repeat_n(' ', indent));
}

fn is_block(value: &Value) -> bool {
    match value {
        Value::Object(map) => !map.is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => false,
    }
}

fn write_inline(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => write_text(out, s),
        Value::Object(_) => out.push_str("{}"),
        Value::Array(_) => out.push_str("[]"),
    }
}

fn write_text(out: &mut String, text: &str) {
    if !requires_quote(text) {
        out.push_str(text);
        return;
    }

    out.push('"');
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
}

/// Whether a plain scalar would be read back as something else.
pub fn requires_quote(text: &str) -> bool {
    let (Some(first), Some(last)) = (text.chars().next(), text.chars().next_back()) else {
        return true;
    };

    first.is_whitespace()
        || last.is_whitespace()
        || text.contains(SPECIAL_CHARS)
        || text.chars().any(char::is_control)
        || RESERVED_WORDS.iter().any(|word| word.eq_ignore_ascii_case(text))
        || text.parse::<f64>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use serde_json::json;

    #[test]
    fn nested_document() {
        let value = json!({
            "openapi": "3.0.3",
            "info": {"title": "Sample API", "version": "1.0"},
            "paths": {
                "/users/{id}": {
                    "get": {
                        "parameters": [{"name": "id", "in": "path", "required": true}],
                        "responses": {"200": {"description": "OK"}}
                    }
                }
            },
            "components": {"schemas": {}}
        });

        let expected = indoc! {r#"
            openapi: 3.0.3
            info:
              title: Sample API
              version: "1.0"
            paths:
              "/users/{id}":
                get:
                  parameters:
                    -
                      name: id
                      in: path
                      required: true
                  responses:
                    "200":
                      description: OK
            components:
              schemas: {}
        "#};
        assert_eq!(emit(&value), expected);
    }

    #[test]
    fn indentation_grows_per_level() {
        let mut out = String::from("-");
        push_indent(&mut out, 4);
        assert_eq!(out, "-    ");

        assert_eq!(emit(&json!({"a": {"b": {"c": [1]}}})), "a:\n  b:\n    c:\n      - 1\n");
    }

    #[test]
    fn special_characters_are_quoted() {
        assert_eq!(emit(&json!({"k": "a: b"})), "k: \"a: b\"\n");
        assert_eq!(emit(&json!({"k": "date-time"})), "k: \"date-time\"\n");
        assert_eq!(emit(&json!({"$ref": "#/components/schemas/User"})), "$ref: \"#/components/schemas/User\"\n");
        assert_eq!(emit(&json!({"k": "text/plain"})), "k: text/plain\n");
    }

    #[test]
    fn ambiguous_scalars_are_quoted() {
        for text in ["", " padded", "padded ", "true", "False", "yes", "NO", "on", "Off", "null", "~", "42", "1.5", "1e3"] {
            assert!(requires_quote(text), "{text:?} should be quoted");
        }
        for text in ["hello", "Hello World", "v1", "application/json", "3.0.3"] {
            assert!(!requires_quote(text), "{text:?} should be plain");
        }
    }

    #[test]
    fn escapes() {
        assert_eq!(emit(&json!("line\nbreak")), "\"line\\nbreak\"\n");
        assert_eq!(emit(&json!("tab\there")), "\"tab\\there\"\n");
        assert_eq!(emit(&json!("say \"hi\" \\o/")), "\"say \\\"hi\\\" \\\\o/\"\n");
    }

    #[test]
    fn empty_containers_are_inline() {
        assert_eq!(emit(&json!({"items": [], "props": {}})), "items: []\nprops: {}\n");
        assert_eq!(emit(&json!([[], {}])), "- []\n- {}\n");
        assert_eq!(emit(&json!({})), "{}\n");
        assert_eq!(emit(&json!([])), "[]\n");
    }

    #[test]
    fn scalars() {
        assert_eq!(emit(&json!({"a": null, "b": false, "c": 7, "d": 0.5})), "a: null\nb: false\nc: 7\nd: 0.5\n");
        assert_eq!(emit(&json!(["x", 1, true])), "- x\n- 1\n- true\n");
    }

    #[test]
    fn nested_sequences() {
        assert_eq!(emit(&json!({"m": [[1, 2], "x"]})), "m:\n  -\n    - 1\n    - 2\n  - x\n");
    }

    #[test]
    fn serializable_values() {
        #[derive(Serialize)]
        struct Point {
            x: i32,
            label: &'static str,
        }

        assert_eq!(to_string(&Point { x: 1, label: "origin" }).unwrap(), "x: 1\nlabel: origin\n");
    }
}
