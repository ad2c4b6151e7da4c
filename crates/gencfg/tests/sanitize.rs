//! Sanitizing decoded configuration records.

use gencfg::SanitizeError;
use gencfg::sanitize::{Sanitize, Sanitizer, TestCalls, sanitize};
use pretty_assertions::assert_eq;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

#[derive(Debug, Clone, Default, Sanitize)]
pub struct Pair {
    #[gencfg("test_call=Count")]
    pub field1: String,
    #[gencfg("test_call=Count")]
    pub field2: String,
}

impl Pair {
    fn new(field1: &str, field2: &str) -> Self {
        Self {
            field1: field1.into(),
            field2: field2.into(),
        }
    }
}

#[derive(Debug, Default, Sanitize)]
pub struct Resolvers {
    #[gencfg("test_call=Count")]
    pub dns: Vec<String>,
}

#[derive(Debug, Default, Sanitize)]
pub struct Wrapper {
    pub inside: Pair,
}

/// Every way a record can hold strings that carry tags.
#[derive(Debug, Default, Sanitize)]
pub struct Everything {
    #[gencfg("test_call=Count")]
    pub field0: String,
    pub boxed: Option<Box<Pair>>,
    pub uninitialized: Option<Box<Pair>>,
    pub slice_of_records: Vec<Pair>,
    pub slice_of_boxes: Vec<Box<Pair>>,
    pub array_of_records: [Pair; 2],
    pub array_of_options: [Option<Pair>; 2],
    pub map_of_records: HashMap<String, Pair>,
    pub map_of_boxes: BTreeMap<String, Box<Pair>>,
    #[gencfg("test_call=Count")]
    pub slice_of_strings: Vec<String>,
    pub slice_of_nested: Vec<Resolvers>,
    pub record_in_record: Wrapper,
    #[allow(dead_code)]
    unsupported: Option<Pair>,
}

fn everything() -> Everything {
    Everything {
        field0: "data0".into(),
        boxed: Some(Box::new(Pair::new("data01", "data02"))),
        uninitialized: None,
        slice_of_records: vec![Pair::new("data1", "data2"), Pair::new("data3", "data4")],
        slice_of_boxes: vec![Box::new(Pair::new("p11", "p12")), Box::new(Pair::new("p21", "p22"))],
        array_of_records: [Pair::new("arr1", "arr2"), Pair::new("arr3", "arr4")],
        array_of_options: [Some(Pair::new("parr31", "parr32")), Some(Pair::new("parr41", "parr42"))],
        map_of_records: HashMap::from([
            ("key1".to_string(), Pair::new("map1", "map2")),
            ("key2".to_string(), Pair::new("map1", "map2")),
        ]),
        map_of_boxes: BTreeMap::from([
            ("key3".to_string(), Box::new(Pair::new("pmap51", "pmap52"))),
            ("key4".to_string(), Box::new(Pair::new("pmap61", "pmap62"))),
        ]),
        slice_of_strings: vec!["s1".into(), "s2".into()],
        slice_of_nested: vec![
            Resolvers {
                dns: vec!["dns1".into(), "dns2".into()],
            },
            Resolvers {
                dns: vec!["dns3".into(), "dns4".into()],
            },
        ],
        record_in_record: Wrapper {
            inside: Pair::new("inside1", "inside2"),
        },
        unsupported: Some(Pair::new("hidden1", "hidden2")),
    }
}

fn counting_sanitizer() -> (Sanitizer, Arc<AtomicUsize>) {
    let count = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&count);
    let sanitizer = Sanitizer::with_test_calls(TestCalls::new().register("Count", move |_, _| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }));
    (sanitizer, count)
}

#[test]
fn test_every_tagged_string_is_visited_once() {
    let (sanitizer, count) = counting_sanitizer();
    sanitizer.sanitize(&mut everything()).unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 35);
}

#[test]
fn test_callbacks_see_field_names_and_values() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);
    let sanitizer = Sanitizer::with_test_calls(TestCalls::new().register("Count", move |field, value| {
        log.lock().unwrap().push(format!("{field}={value}"));
        Ok(())
    }));

    let mut resolvers = Resolvers {
        dns: vec!["1.1.1.1".into(), "8.8.8.8".into()],
    };
    sanitizer.sanitize(&mut resolvers).unwrap();
    assert_eq!(*seen.lock().unwrap(), ["dns=1.1.1.1", "dns=8.8.8.8"]);
}

#[test]
fn test_default_sanitizer_skips_test_calls() {
    let mut data = everything();
    sanitize(&mut data).unwrap();
    assert_eq!(data.field0, "data0");
}

#[derive(Debug, Default, Sanitize)]
pub struct Workspace {
    #[gencfg("path_clean,assure_dir_exists")]
    pub cache_dir: String,
    #[gencfg("assure_dir_exists_for_file")]
    pub log_file: String,
    #[gencfg("path_clean")]
    pub optional: Option<String>,
}

#[test]
fn test_assure_dir_exists_creates_directories() {
    let tmp = TempDir::new().unwrap();
    let cache = tmp.path().join("cache/./nested//deeper");
    let log = tmp.path().join("logs/service/app.log");

    let mut workspace = Workspace {
        cache_dir: cache.to_string_lossy().into_owned(),
        log_file: log.to_string_lossy().into_owned(),
        optional: None,
    };
    sanitize(&mut workspace).unwrap();

    let expected = tmp.path().join("cache/nested/deeper");
    assert_eq!(workspace.cache_dir, expected.to_string_lossy());
    assert!(expected.is_dir());
    assert!(tmp.path().join("logs/service").is_dir());
    assert!(!log.exists());
}

#[test]
fn test_empty_values_are_skipped() {
    let mut workspace = Workspace::default();
    sanitize(&mut workspace).unwrap();
    assert_eq!(workspace.cache_dir, "");
    assert_eq!(workspace.optional, None);
}

#[derive(Debug, Default, Sanitize)]
pub struct Misconfigured {
    #[gencfg("frobnicate")]
    pub name: String,
}

#[test]
fn test_unknown_tag() {
    let err = sanitize(&mut Misconfigured::default()).unwrap_err();
    assert!(matches!(err, SanitizeError::UnknownTag(ref tag) if tag == "frobnicate"));
    assert_eq!(err.to_string(), "unknown sanitize tag: frobnicate");
}

#[derive(Debug, Default, Sanitize)]
pub struct Inner {
    pub path: String,
    pub port: u16,
}

#[derive(Debug, Default, Sanitize)]
pub struct Outer {
    #[gencfg("path_clean,frobnicate")]
    pub inner: Inner,
    #[gencfg("path_clean")]
    pub inners: Vec<Inner>,
}

#[test]
fn test_tags_are_not_inherited_by_records() {
    let mut outer = Outer {
        inner: Inner {
            path: "a/../b".into(),
            port: 80,
        },
        inners: vec![Inner {
            path: "c/./d".into(),
            port: 81,
        }],
    };
    sanitize(&mut outer).unwrap();
    assert_eq!(outer.inner.path, "a/../b");
    assert_eq!(outer.inners[0].path, "c/./d");
}

#[derive(Debug, Default, Sanitize)]
pub struct Site {
    #[gencfg("path_clean")]
    pub root: String,
}

#[derive(Debug, Default, Sanitize)]
pub struct Sites {
    pub by_name: HashMap<String, Site>,
    #[gencfg("path_clean")]
    pub aliases: BTreeMap<String, String>,
}

#[test]
fn test_map_values_are_written_back() {
    let mut sites = Sites {
        by_name: HashMap::from([
            ("blog".to_string(), Site { root: "/srv//blog/".into() }),
            ("docs".to_string(), Site { root: "/srv/docs/../manual".into() }),
        ]),
        aliases: BTreeMap::from([("www".to_string(), "./blog".to_string())]),
    };
    sanitize(&mut sites).unwrap();
    assert_eq!(sites.by_name["blog"].root, "/srv/blog");
    assert_eq!(sites.by_name["docs"].root, "/srv/manual");
    assert_eq!(sites.aliases["www"], "blog");
}

#[derive(Debug, Default, Sanitize)]
pub struct Typed {
    #[gencfg("path_clean")]
    pub retries: Vec<u32>,
}

#[test]
fn test_type_mismatch_is_wrapped_with_index() {
    let mut typed = Typed { retries: vec![3] };
    let err = sanitize(&mut typed).unwrap_err();
    let SanitizeError::Index { index, source } = &err else {
        panic!("unexpected error: {err:?}");
    };
    assert_eq!(*index, 0);
    assert_eq!(
        source.to_string(),
        "sanitize tag 'path_clean' on 'retries' only works on strings"
    );
}

#[derive(Debug, Default, Sanitize)]
pub struct Skipping {
    #[gencfg(skip)]
    pub raw: String,
    #[gencfg("path_clean")]
    hidden: String,
}

#[test]
fn test_skipped_and_private_fields() {
    let mut skipping = Skipping {
        raw: "a/../b".into(),
        hidden: "c/../d".into(),
    };
    sanitize(&mut skipping).unwrap();
    assert_eq!(skipping.raw, "a/../b");
    assert_eq!(skipping.hidden, "c/../d");
}

#[derive(Debug, Default, Sanitize)]
pub struct Generic<T> {
    pub items: Vec<T>,
}

#[test]
fn test_generic_records() {
    let mut generic = Generic {
        items: vec![Site { root: "x/./y".into() }],
    };
    sanitize(&mut generic).unwrap();
    assert_eq!(generic.items[0].root, "x/y");
}

#[derive(Debug, Default, Sanitize)]
pub struct Tuple(#[gencfg("path_clean")] pub String, pub u8);

#[test]
fn test_tuple_records() {
    let mut tuple = Tuple("a//b".into(), 1);
    sanitize(&mut tuple).unwrap();
    assert_eq!(tuple.0, "a/b");
}
