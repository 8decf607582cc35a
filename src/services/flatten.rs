use serde_json::{Map, Value};

use crate::model::locale::FlatKeyMap;

/// Achata uma árvore de locale em `caminho.com.pontos -> texto`.
///
/// Objetos são percorridos em profundidade; arrays são ignorados por inteiro;
/// números, booleanos e null são descartados sem erro.
pub fn flatten(tree: &Value, prefix: &str) -> FlatKeyMap {
    let mut out = FlatKeyMap::new();
    if let Value::Object(map) = tree {
        walk(map, prefix, &mut out);
    }
    out
}

fn walk(map: &Map<String, Value>, prefix: &str, out: &mut FlatKeyMap) {
    for (key, value) in map {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };

        match value {
            Value::Object(child) => walk(child, &path, out),
            Value::String(s) => {
                out.insert(path, s.clone());
            }
            Value::Array(_) => {}
            _ => {}
        }
    }
}

/// Inverso de [`flatten`]: reconstrói os objetos intermediários a partir das chaves.
pub fn unflatten(flat: &FlatKeyMap) -> Value {
    let mut root = Map::new();

    'keys: for (key, text) in flat {
        let mut segments: Vec<&str> = key.split('.').collect();
        let last = match segments.pop() {
            Some(s) => s,
            None => continue,
        };

        let mut node = &mut root;
        for seg in segments {
            let slot = node
                .entry(seg.to_string())
                .or_insert_with(|| Value::Object(Map::new()));

            // folha no meio do caminho: o último a escrever vence
            if !slot.is_object() {
                tracing::debug!(key = %key, segment = seg, "replacing string leaf with object");
                *slot = Value::Object(Map::new());
            }

            node = match slot.as_object_mut() {
                Some(m) => m,
                None => continue 'keys,
            };
        }

        node.insert(last.to_string(), Value::String(text.clone()));
    }

    Value::Object(root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn flattens_nested_objects_with_dot_paths() {
        let tree = json!({
            "common": { "copy": "Copy", "nav": { "home": "Home" } },
            "title": "Tools"
        });
        let flat = flatten(&tree, "");
        assert_eq!(flat.len(), 3);
        assert_eq!(flat["common.copy"], "Copy");
        assert_eq!(flat["common.nav.home"], "Home");
        assert_eq!(flat["title"], "Tools");
    }

    #[test]
    fn prefix_is_prepended() {
        let flat = flatten(&json!({ "a": "x" }), "root");
        assert_eq!(flat["root.a"], "x");
    }

    #[test]
    fn arrays_and_scalars_are_dropped() {
        let tree = json!({
            "list": ["a", "b"],
            "count": 3,
            "flag": true,
            "nothing": null,
            "nested": { "items": [{ "x": "y" }], "ok": "fine" }
        });
        let flat = flatten(&tree, "");
        assert_eq!(flat.len(), 1);
        assert_eq!(flat["nested.ok"], "fine");
    }

    #[test]
    fn non_object_root_is_empty() {
        assert!(flatten(&json!("just text"), "").is_empty());
        assert!(flatten(&json!(["a"]), "").is_empty());
    }

    #[test]
    fn unflatten_round_trips_string_trees() {
        let tree = json!({
            "tools": {
                "base64": { "title": "Base64 {mode}", "encode": "Encode" },
                "json": { "format": "Format" }
            },
            "footer": "Made with care",
            "empty": ""
        });
        assert_eq!(unflatten(&flatten(&tree, "")), tree);
    }

    #[test]
    fn unflatten_preserves_key_order() {
        let mut flat = FlatKeyMap::new();
        flat.insert("z.b".into(), "1".into());
        flat.insert("a".into(), "2".into());
        flat.insert("z.a".into(), "3".into());

        let out = serde_json::to_string(&unflatten(&flat)).unwrap();
        assert_eq!(out, r#"{"z":{"b":"1","a":"3"},"a":"2"}"#);
    }

    #[test]
    fn unflatten_replaces_leaf_when_path_continues() {
        let mut flat = FlatKeyMap::new();
        flat.insert("a".into(), "leaf".into());
        flat.insert("a.b".into(), "deep".into());
        assert_eq!(unflatten(&flat), json!({ "a": { "b": "deep" } }));
    }

    fn string_tree() -> impl Strategy<Value = Value> {
        let leaf = ".{0,12}".prop_map(Value::String);
        leaf.prop_recursive(4, 48, 5, |inner| {
            prop::collection::btree_map("[a-z_]{1,6}", inner, 1..5)
                .prop_map(|m| Value::Object(m.into_iter().collect()))
        })
    }

    fn root_tree() -> impl Strategy<Value = Value> {
        prop::collection::btree_map("[a-zA-Z_]{1,8}", string_tree(), 1..6)
            .prop_map(|m| Value::Object(m.into_iter().collect()))
    }

    proptest! {
        #[test]
        fn unflatten_inverts_flatten(tree in root_tree()) {
            let flat = flatten(&tree, "");
            prop_assert_eq!(unflatten(&flat), tree);
        }
    }
}
