//! Export and reload through JSON, YAML and the binary format.

mod support;

use std::fs;

use nin_core::{AttrDict, CommonError, JsonOptions, MissingKey, Placeholder, Value, attr_dict};
use support::{keys, sample_mapping};
use tempfile::tempdir;

#[test]
fn test_json_export_creates_directories() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("does").join("not").join("exist").join("out.json");

    let mut dict = attr_dict! {
        "a" => 1,
        "b" => vec![1, 2],
        "c" => attr_dict! { "d" => 3 },
    };
    dict.save_as_json(&path, 4).unwrap();

    assert!(path.is_file());
    let reloaded: serde_json::Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
    assert_eq!(
        reloaded,
        serde_json::json!({"a": 1, "b": [1, 2], "c": {"d": 3}})
    );
}

#[test]
fn test_json_indent_is_honoured() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("indent.json");

    let mut dict = attr_dict! { "a" => attr_dict! { "b" => 1 } };
    dict.save_as_json(&path, 2).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(text, "{\n  \"a\": {\n    \"b\": 1\n  }\n}");
}

#[test]
fn test_json_round_trip_keeps_order() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("order.json");

    let mut dict = sample_mapping();
    dict.save_as_json(&path, 4).unwrap();
    let reloaded = AttrDict::load_json(&path).unwrap();

    assert_eq!(keys(&reloaded), keys(&dict));
    let c = reloaded.get("c").and_then(Value::as_map).unwrap();
    assert_eq!(keys(c), vec!["d", "e", "g"]);
    // Arrays come back as plain nested lists.
    assert_eq!(
        reloaded.get("n"),
        Some(&Value::from(vec![vec![1, 2, 3], vec![4, 5, 6]]))
    );
    assert_eq!(reloaded, dict);
}

#[test]
fn test_export_normalizes_in_place() {
    let dir = tempdir().unwrap();
    let mut dict = sample_mapping();
    dict.save_as_json(dir.path().join("n.json"), 4).unwrap();

    assert!(dict.get("m").and_then(Value::as_array).is_none());
    assert_eq!(dict.get("m"), Some(&Value::from(vec![1, 2, 3])));
}

#[test]
fn test_default_mode_export_does_not_grow() {
    let dir = tempdir().unwrap();
    let mut dict = sample_mapping().into_mode(MissingKey::Default);
    let before = keys(&dict);

    dict.save_as_json(dir.path().join("d.json"), 4).unwrap();
    assert_eq!(keys(&dict), before);
}

#[test]
fn test_json_placeholder_substitution() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("opaque.json");

    let mut dict = attr_dict! {
        "ok" => "yes",
        "handle" => Value::opaque::<std::fs::File>(),
        "inf" => f64::INFINITY,
    };
    dict.save_as_json(&path, 4).unwrap();
    let reloaded = AttrDict::load_json(&path).unwrap();
    assert_eq!(reloaded.get("handle"), Some(&Value::Null));
    assert_eq!(reloaded.get("inf"), Some(&Value::Null));

    let options = JsonOptions::new().with_placeholder(Placeholder::not_serializable());
    dict.save_as_json_with(&path, &options).unwrap();
    let reloaded = AttrDict::load_json(&path).unwrap();
    assert_eq!(
        reloaded.get("handle"),
        Some(&Value::from("<not serializable>"))
    );
}

#[test]
fn test_invalid_path_fails_before_io() {
    let dir = tempdir().unwrap();
    let mut dict = sample_mapping();

    let bad = dir.path().join("created").join("..");
    let err = dict.save_as_json(&bad, 4).unwrap_err();
    assert!(matches!(err, CommonError::InvalidArgument { .. }));
    assert!(!dir.path().join("created").exists());
    // Nothing was normalized either.
    assert!(dict.get("m").and_then(Value::as_array).is_some());

    let err = dict.save_as_json("", 4).unwrap_err();
    assert!(matches!(err, CommonError::InvalidArgument { .. }));

    // Trailing separators and `.` segments name a directory, not a file.
    for suffix in ["made/sub/", "made/out.json/."] {
        let target = format!("{}/{suffix}", dir.path().display());
        let err = dict.save_as_json(&target, 4).unwrap_err();
        assert!(matches!(err, CommonError::InvalidArgument { .. }));
    }
    assert!(!dir.path().join("made").exists());

    #[cfg(feature = "yaml")]
    assert!(matches!(
        dict.save_as_yaml(&bad),
        Err(CommonError::InvalidArgument { .. })
    ));
    #[cfg(feature = "binary")]
    assert!(matches!(
        dict.save_as_binary(&bad),
        Err(CommonError::InvalidArgument { .. })
    ));
    assert!(!dir.path().join("created").exists());
}

#[cfg(unix)]
#[test]
fn test_non_utf8_path_is_invalid_argument() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    let dir = tempdir().unwrap();
    let path = dir
        .path()
        .join(OsStr::from_bytes(b"sub\xff"))
        .join("out.json");

    let err = sample_mapping().save_as_json(&path, 4).unwrap_err();
    assert!(matches!(err, CommonError::InvalidArgument { .. }));
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_write_over_existing_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("same.json");

    attr_dict! { "first" => 1, "padding" => "x".repeat(100) }
        .save_as_json(&path, 4)
        .unwrap();
    attr_dict! { "second" => 2 }.save_as_json(&path, 4).unwrap();

    let reloaded = AttrDict::load_json(&path).unwrap();
    assert_eq!(keys(&reloaded), vec!["second"]);
}

#[test]
fn test_io_failure_propagates() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("file");
    fs::write(&blocker, b"not a directory").unwrap();

    let err = sample_mapping()
        .save_as_json(blocker.join("out.json"), 4)
        .unwrap_err();
    assert!(matches!(err, CommonError::IoError { .. }));
}

#[test]
fn test_load_json_rejects_non_mapping_root() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("list.json");
    fs::write(&path, b"[1, 2, 3]").unwrap();

    let err = AttrDict::load_json(&path).unwrap_err();
    assert!(matches!(err, CommonError::InvalidArgument { .. }));

    fs::write(&path, b"{broken").unwrap();
    let err = AttrDict::load_json(&path).unwrap_err();
    assert!(matches!(err, CommonError::DeserializationError { .. }));
}

#[cfg(feature = "yaml")]
#[test]
fn test_yaml_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("config.yaml");

    let mut dict = sample_mapping();
    dict.set_attr("name", "run-1");
    dict.set_attr("lr", 0.001);
    dict.set_attr("none", Value::Null);
    dict.save_as_yaml(&path).unwrap();

    let reloaded = AttrDict::load_yaml(&path).unwrap();
    assert_eq!(keys(&reloaded), keys(&dict));
    assert_eq!(reloaded, dict);
}

#[cfg(feature = "yaml")]
#[test]
fn test_yaml_rejects_opaque_values() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("opaque.yaml");

    let mut dict = attr_dict! { "handle" => Value::Opaque("Socket".to_string()) };
    let err = dict.save_as_yaml(&path).unwrap_err();
    assert!(matches!(err, CommonError::SerializationError { .. }));
}

#[cfg(feature = "binary")]
#[test]
fn test_binary_round_trip_keeps_mode() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bin").join("mapping.bin");

    let mut dict = sample_mapping().into_mode(MissingKey::Default);
    dict.set_attr("lr", 0.001);
    dict.save_as_binary(&path).unwrap();

    let mut reloaded = AttrDict::load_binary(&path).unwrap();
    assert_eq!(reloaded, dict);
    assert_eq!(reloaded.mode(), MissingKey::Default);
    let c = reloaded.get("c").and_then(Value::as_map).unwrap();
    assert_eq!(c.mode(), MissingKey::Default);
    assert!(reloaded.get_item("fresh").unwrap().is_inserted());
}

#[cfg(feature = "binary")]
#[test]
fn test_binary_rejects_opaque_values() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("out").join("opaque.bin");

    let mut dict = attr_dict! {
        "ok" => 1,
        "nested" => attr_dict! { "handles" => vec![Value::Opaque("Socket".to_string())] },
    };
    let err = dict.save_as_binary(&path).unwrap_err();
    assert!(matches!(err, CommonError::SerializationError { .. }));
    assert!(err.to_string().contains("Socket"));
    assert!(!dir.path().join("out").exists());
}

#[cfg(feature = "binary")]
#[test]
fn test_binary_load_of_garbage_fails() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("garbage.bin");
    fs::write(&path, [0xffu8; 3]).unwrap();

    let err = AttrDict::load_binary(&path).unwrap_err();
    assert!(matches!(err, CommonError::DeserializationError { .. }));
}

/// Bytes laid out like a mapping holding one int array under `m`: entry
/// list, `Value::Array` tag, shape, `ArrayData::Int` tag, elements, mode.
#[cfg(feature = "binary")]
fn encoded_array_mapping(shape: Vec<usize>, elements: Vec<i64>) -> Vec<u8> {
    let payload = (vec![("m".to_string(), 7u32, shape, 0u32, elements)], 0u32);
    bincode::encode_to_vec(&payload, bincode::config::standard()).unwrap()
}

#[cfg(feature = "binary")]
#[test]
fn test_binary_load_checks_array_shape() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("array.bin");

    fs::write(&path, encoded_array_mapping(vec![2], vec![1, 2])).unwrap();
    let reloaded = AttrDict::load_binary(&path).unwrap();
    let array = reloaded.get("m").and_then(Value::as_array).unwrap();
    assert_eq!(array.to_nested(), Value::from(vec![1, 2]));

    fs::write(&path, encoded_array_mapping(vec![5], vec![1, 2])).unwrap();
    let err = AttrDict::load_binary(&path).unwrap_err();
    assert!(matches!(err, CommonError::DeserializationError { .. }));
}
