//! Fixture documents exercising the PIML grammar line by line.

use serde::{Deserialize, Serialize};
use serde_piml::line::{classify, LineKind};
use serde_piml::{from_str, to_string, to_string_with_options, PimlOptions, PimlValue};
use std::collections::BTreeMap;

const SITE: &str = "\
# Site configuration
(site name) Example Site
(port) 8080
(debug) false
(ratio) 0.75
(owner) nil

(description)
  Handcrafted pages
  for humans.

  Second paragraph.
(tags)
  > web
  > docs   # trailing comment
(admins)
  > (Admin)
    (name) Ann
    (email) ann@example.org
  > (Admin)
    (name) Bob
    (email) bob@example.org
(features)
  >| search
  >| feeds
(limits)
  (requests per minute) 120
  (burst) 10
";

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Admin {
    name: String,
    email: String,
}

#[derive(Deserialize, Debug, PartialEq)]
struct Site {
    #[serde(rename = "site name")]
    site_name: String,
    port: u16,
    debug: bool,
    ratio: f32,
    owner: Option<String>,
    description: String,
    tags: Vec<String>,
    admins: Vec<Admin>,
    features: BTreeMap<String, bool>,
    limits: BTreeMap<String, u32>,
}

#[test]
fn test_site_fixture_typed() {
    let site: Site = from_str(SITE).unwrap();

    assert_eq!(site.site_name, "Example Site");
    assert_eq!(site.port, 8080);
    assert!(!site.debug);
    assert_eq!(site.ratio, 0.75);
    assert_eq!(site.owner, None);
    assert_eq!(
        site.description,
        "Handcrafted pages\nfor humans.\n\nSecond paragraph."
    );
    assert_eq!(site.tags, vec!["web", "docs"]);
    assert_eq!(site.admins.len(), 2);
    assert_eq!(site.admins[1].email, "bob@example.org");
    assert_eq!(site.features.len(), 2);
    assert_eq!(site.limits.get("requests per minute"), Some(&120));
}

#[test]
fn test_site_fixture_dynamic() {
    let value: PimlValue = from_str(SITE).unwrap();

    assert_eq!(value.get("port").and_then(PimlValue::as_u64), Some(8080));
    assert_eq!(value.get("debug").and_then(PimlValue::as_bool), Some(false));
    assert!(value.get("owner").map(PimlValue::is_nil).unwrap_or(false));
    assert_eq!(
        value
            .get("admins")
            .and_then(PimlValue::as_list)
            .and_then(|admins| admins.first())
            .and_then(|admin| admin.get("name"))
            .and_then(PimlValue::as_str),
        Some("Ann")
    );
    assert_eq!(
        value.get("features").and_then(PimlValue::as_set).map(Vec::len),
        Some(2)
    );

    let keys: Vec<&str> = value
        .as_record()
        .map(|record| record.keys().map(String::as_str).collect())
        .unwrap_or_default();
    assert_eq!(
        keys,
        vec![
            "site name",
            "port",
            "debug",
            "ratio",
            "owner",
            "description",
            "tags",
            "admins",
            "features",
            "limits"
        ]
    );
}

#[test]
fn test_line_classification_priority() {
    let cases = [
        ("> (Label)", LineKind::ArrayObjectHeader),
        (">| member", LineKind::SetItem),
        ("> item", LineKind::ArrayItem),
        (">", LineKind::ArrayItem),
        ("(key) value", LineKind::KeyValue),
        ("(key)", LineKind::KeyOnly),
        ("(key)   # only a comment after", LineKind::KeyOnly),
        ("free text", LineKind::MultiLineContent),
        ("   # comment", LineKind::Blank),
        ("", LineKind::Blank),
    ];
    for (raw, kind) in cases {
        assert_eq!(classify(raw, 1).unwrap().kind, kind, "line {:?}", raw);
    }
}

#[test]
fn test_classifier_errors() {
    assert!(classify("(unclosed", 4).unwrap_err().is_syntax());
    assert!(classify("\t(key) value", 4).unwrap_err().is_syntax());
    assert!(classify("  \t> item", 4).unwrap_err().is_syntax());
}

#[test]
fn test_list_ends_at_sibling_key() {
    #[derive(Deserialize, Debug)]
    struct Doc {
        items: Vec<u8>,
        after: String,
    }

    let doc: Doc = from_str("(items)\n  > 1\n  > 2\n(after) done\n").unwrap();
    assert_eq!(doc.items, vec![1, 2]);
    assert_eq!(doc.after, "done");
}

#[test]
fn test_set_marker_in_record_is_an_error() {
    #[derive(Deserialize, Debug)]
    struct Inner {
        #[allow(dead_code)]
        a: Option<String>,
    }
    #[derive(Deserialize, Debug)]
    struct Outer {
        #[allow(dead_code)]
        inner: Inner,
    }

    let err = from_str::<Outer>("(inner)\n  >| nope\n").unwrap_err();
    assert!(err.is_syntax());
}

#[test]
fn test_canonical_output_layout() {
    #[derive(Serialize)]
    struct Layout {
        name: &'static str,
        nested: Nested,
        admins: Vec<Admin>,
        notes: &'static str,
    }
    #[derive(Serialize)]
    struct Nested {
        level: u8,
        flags: Vec<bool>,
    }

    let layout = Layout {
        name: "demo",
        nested: Nested {
            level: 2,
            flags: vec![true, false],
        },
        admins: vec![Admin {
            name: "Ann".to_string(),
            email: "a@x".to_string(),
        }],
        notes: "one\ntwo",
    };

    let expected = "\
(name) demo
(nested)
  (level) 2
  (flags)
    > true
    > false
(admins)
  > (Admin)
    (name) Ann
    (email) a@x
(notes)
  one
  two
";
    assert_eq!(to_string(&layout).unwrap(), expected);

    let wide = to_string_with_options(&layout, PimlOptions::new().with_indent(4)).unwrap();
    assert!(wide.contains("\n        (name) Ann\n"));
}

#[test]
fn test_canonical_output_decodes_back() {
    let value: PimlValue = from_str(SITE).unwrap();
    let encoded = to_string(&value).unwrap();
    let again: PimlValue = from_str(&encoded).unwrap();

    assert_eq!(again.get("tags"), value.get("tags"));
    assert_eq!(again.get("limits"), value.get("limits"));
    assert_eq!(again.get("description"), value.get("description"));
    assert_eq!(again.get("admins"), value.get("admins"));
}
