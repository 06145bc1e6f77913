// Domain module tests.

use super::*;

#[test]
fn test_strip_leading_wildcard() {
    assert_eq!(strip_wildcard_label("*.example.com"), "example.com");
    assert_eq!(strip_wildcard_label("*.api.example.com"), "api.example.com");
}

#[test]
fn test_strip_without_wildcard_is_unchanged() {
    assert_eq!(strip_wildcard_label("www.example.com"), "www.example.com");
    assert_eq!(strip_wildcard_label("example.com"), "example.com");
}

#[test]
fn test_strip_single_label_is_empty() {
    assert_eq!(strip_wildcard_label("*"), "");
    assert_eq!(strip_wildcard_label("localhost"), "");
    assert_eq!(strip_wildcard_label(""), "");
}

#[test]
fn test_strip_wildcard_label_with_whitespace() {
    assert_eq!(strip_wildcard_label(" * .example.com"), "example.com");
}

#[test]
fn test_strip_internal_wildcard_keeps_suffix_right_of_it() {
    // The scan stops at the first `*` seen from the right.
    assert_eq!(strip_wildcard_label("a.*.example.com"), "example.com");
    assert_eq!(strip_wildcard_label("*.*.example.com"), "example.com");
}

#[test]
fn test_strip_wildcard_in_rightmost_label() {
    // Nothing was visited before the stop, so the recorded index stays at 0
    // and the whole name comes back.
    assert_eq!(strip_wildcard_label("example.*"), "example.*");
    // The only visited label is the rightmost one, so the name is unusable.
    assert_eq!(strip_wildcard_label("*.com"), "");
    assert_eq!(strip_wildcard_label("a.*.com"), "");
}

#[test]
fn test_strip_trailing_dot() {
    // The root label is empty but still counts as a label.
    assert_eq!(strip_wildcard_label("*.example.com."), "example.com.");
    assert_eq!(strip_wildcard_label("com."), "com.");
}

#[test]
fn test_merge_into_empty() {
    let merged = merge(Vec::new(), ["A.com", "a.com", "b.com"]);
    assert_eq!(merged, vec!["a.com", "b.com"]);
}

#[test]
fn test_merge_against_existing() {
    let merged = merge(vec!["x.com".to_string()], ["X.com", "y.com"]);
    assert_eq!(merged, vec!["x.com", "y.com"]);
}

#[test]
fn test_merge_keeps_existing_case() {
    let merged = merge(vec!["Mixed.Example.com".to_string()], ["NEW.example.com"]);
    assert_eq!(merged, vec!["Mixed.Example.com", "new.example.com"]);
}

#[test]
fn test_merge_preserves_first_seen_order() {
    let merged = merge(Vec::new(), ["c.com", "a.com", "C.COM", "b.com", "a.com"]);
    assert_eq!(merged, vec!["c.com", "a.com", "b.com"]);
}

#[test]
fn test_merge_with_no_candidates() {
    let merged = merge(vec!["x.com".to_string()], Vec::<String>::new());
    assert_eq!(merged, vec!["x.com"]);
}

#[test]
fn test_name_set_insert_reports_additions() {
    let mut set = NameSet::new();
    assert!(set.insert("Example.com"));
    assert!(!set.insert("EXAMPLE.COM"));
    assert!(!set.insert(""));
    assert_eq!(set.len(), 1);
    assert!(set.contains("example.COM"));
    assert_eq!(set.as_slice(), &["example.com".to_string()]);
}

#[test]
fn test_name_set_merge_counts_new_names() {
    let mut set = NameSet::new();
    assert_eq!(set.merge(["a.com", "b.com"]), 2);
    assert_eq!(set.merge(["B.com", "c.com"]), 1);
    assert_eq!(set.into_vec(), vec!["a.com", "b.com", "c.com"]);
}

#[test]
fn test_name_set_insert_verbatim_keeps_spelling() {
    let mut set = NameSet::new();
    assert!(set.insert_verbatim("Example.COM"));
    assert!(!set.insert("example.com"));
    assert!(!set.insert_verbatim(""));
    assert!(set.insert("A.example.com"));
    assert_eq!(set.into_vec(), vec!["Example.COM", "a.example.com"]);
}

#[test]
fn test_name_set_append_keeps_first_spelling() {
    let mut first = NameSet::new();
    first.insert_verbatim("Shop.Example");
    let mut second = NameSet::new();
    second.insert_verbatim("API.shop.example");
    second.insert("shop.example");
    assert_eq!(first.append(second), 1);
    assert_eq!(first.into_vec(), vec!["Shop.Example", "API.shop.example"]);
}

#[test]
fn test_name_set_from_existing_drops_later_duplicates() {
    let set = NameSet::from_existing(["A.com", "a.com", "b.com"]);
    assert_eq!(set.as_slice(), &["A.com".to_string(), "b.com".to_string()]);
}

#[test]
fn test_name_set_iteration_order() {
    let mut set = NameSet::new();
    set.merge(["z.com", "y.com", "x.com"]);
    let names: Vec<&String> = set.iter().collect();
    assert_eq!(names, vec!["z.com", "y.com", "x.com"]);
    assert!(!set.is_empty());
}
