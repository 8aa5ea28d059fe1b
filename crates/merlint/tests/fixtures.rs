use merlint::{ValidateOptions, check, parse};
use serde_json::{Map, Value, json};
use std::path::{Path, PathBuf};

fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("..")
}

fn fixtures_root() -> PathBuf {
    workspace_root().join("fixtures")
}

fn list_fixture_mmd_files(root: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
                continue;
            }
            if path.extension().is_some_and(|e| e == "mmd") {
                out.push(path);
            }
        }
    }
    out.sort();
    out
}

fn rendered(text: &str, opts: &ValidateOptions) -> Value {
    match check(text, opts) {
        Ok(found) => Value::Array(
            found
                .iter()
                .map(|d| Value::String(d.to_string()))
                .collect(),
        ),
        Err(err) => Value::String(err.to_string()),
    }
}

/// `{"dialect", "default", "strict"}` for diagrams that parse, `{"error"}` for those that do not.
fn snapshot_value(text: &str) -> Value {
    let diagram = match parse(text) {
        Ok(diagram) => diagram,
        Err(err) => return json!({ "error": err.to_string() }),
    };
    let mut out = Map::new();
    out.insert(
        "dialect".to_string(),
        Value::String(diagram.dialect().to_string()),
    );
    out.insert(
        "default".to_string(),
        rendered(text, &ValidateOptions::default()),
    );
    out.insert(
        "strict".to_string(),
        rendered(text, &ValidateOptions::strict()),
    );
    Value::Object(out)
}

#[test]
fn fixtures_match_golden_diagnostics() {
    let fixtures = list_fixture_mmd_files(&fixtures_root());
    assert!(
        !fixtures.is_empty(),
        "no fixtures found under {}",
        fixtures_root().display()
    );

    for mmd_path in fixtures {
        let text = std::fs::read_to_string(&mmd_path)
            .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", mmd_path.display()));
        let snapshot = snapshot_value(&text);

        let golden_path = mmd_path.with_extension("golden.json");
        let golden_text = std::fs::read_to_string(&golden_path).unwrap_or_else(|_| {
            panic!("missing golden diagnostics {}", golden_path.display())
        });
        let golden: Value = serde_json::from_str(&golden_text)
            .unwrap_or_else(|e| panic!("invalid golden JSON {}: {e}", golden_path.display()));

        assert_eq!(
            snapshot,
            golden,
            "diagnostics mismatch for {}",
            mmd_path.display()
        );
    }
}

#[test]
fn fixtures_parse_to_serializable_trees() {
    for mmd_path in list_fixture_mmd_files(&fixtures_root()) {
        let text = std::fs::read_to_string(&mmd_path)
            .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", mmd_path.display()));
        let Ok(diagram) = parse(&text) else {
            continue;
        };
        let value = serde_json::to_value(&diagram)
            .unwrap_or_else(|e| panic!("serialize failed for {}: {e}", mmd_path.display()));
        let kind = serde_json::to_value(diagram.kind()).unwrap();
        let key = kind.as_str().unwrap();
        assert!(
            value.get(key).is_some(),
            "{} serialized without its `{key}` tag",
            mmd_path.display()
        );
    }
}
