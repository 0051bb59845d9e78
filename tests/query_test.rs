//! Tests for the select engine and its derived operations

use conftree::{parse_str, terms, ConfTree, Depth, Keep, Pick, Pred};

const SAMPLE: &str = r#"ServerRoot "/etc/httpd"
Listen 80
Listen 8443
Timeout 1.5
EnableSendfile on
Mixed abc 80
<IfModule mime_module>
    TypesConfig /etc/mime.types
</IfModule>
<IfModule prefork.c>
    StartServers 4
    <IfModule foo>
        Inner yes
    </IfModule>
</IfModule>
<Directory />
    AllowOverride none
</Directory>
<Directory /var/www>
    Options Indexes FollowSymLinks
    <Directory /var/www/html>
        Require all granted
    </Directory>
</Directory>
"#;

fn sample_conf() -> ConfTree {
    conftree::util::testing::init_test_setup();
    parse_str(SAMPLE, "/etc/httpd/conf/httpd.conf").unwrap()
}

// ============================================================
// Shallow vs Deep Tests
// ============================================================

#[test]
fn given_shallow_query_when_selecting_then_only_direct_children_match() {
    let conf = sample_conf();

    // TypesConfig only exists one level down
    assert!(conf.get("TypesConfig").is_empty());
    assert_eq!(conf.find_all("TypesConfig").len(), 1);
}

#[test]
fn given_nested_sections_when_selecting_shallow_then_grandchildren_are_excluded() {
    let conf = sample_conf();

    // Two Directory sections at the top, one nested inside /var/www
    assert_eq!(conf.get("Directory").len(), 2);
    assert_eq!(conf.find_all("Directory").len(), 3);
}

#[test]
fn given_result_set_when_chaining_shallow_queries_then_scope_is_each_elements_children() {
    let conf = sample_conf();

    // Require lives two levels below /var/www, so a shallow step misses it
    let www = conf.get(("Directory", "/var/www"));
    assert!(www.get("Require").is_empty());
    assert_eq!(www.find_all("Require").len(), 1);
}

// ============================================================
// First/Last Disambiguation Tests
// ============================================================

#[test]
fn given_multiple_matches_when_finding_then_first_in_document_order_wins() {
    let conf = sample_conf();

    let first = conf.find("Listen").unwrap();
    assert_eq!(first.value(), 80);
    assert_eq!(first.pos(), 2);

    let last = conf.find_one("Listen", Pick::Last).unwrap();
    assert_eq!(last.value(), 8443);
    assert_eq!(last.pos(), 3);
}

#[test]
fn given_find_when_comparing_with_select_then_semantics_are_identical() {
    let conf = sample_conf();

    let via_select = conf.select("Listen", Depth::Deep, Keep::Leaves);
    assert_eq!(conf.find("Listen"), via_select.first());
    assert_eq!(conf.find_one("Listen", Pick::Last), via_select.last());

    assert!(conf.find("NoSuchDirective").is_none());
    assert!(conf.find_all("NoSuchDirective").is_empty());
}

#[test]
fn given_pick_when_nothing_matches_then_none_is_returned_not_an_error() {
    let conf = sample_conf();

    assert!(conf
        .pick("Missing", Depth::Deep, Keep::Leaves, Pick::Last)
        .is_none());
    assert!(conf.get("Missing").is_empty());
}

// ============================================================
// Roots vs Leaves Tests
// ============================================================

#[test]
fn given_matching_ancestor_and_descendant_when_keeping_roots_then_descendant_is_dropped() {
    let conf = sample_conf();

    let leaves = conf.select("Directory", Depth::Deep, Keep::Leaves);
    assert_eq!(leaves.len(), 3);

    let roots = conf.select("Directory", Depth::Deep, Keep::Roots);
    assert_eq!(roots.len(), 2);
    for node in roots.iter() {
        assert!(node.parent().is_none(), "only top-level matches survive");
    }
}

#[test]
fn given_nested_ifmodules_when_keeping_roots_then_inner_match_is_deduplicated() {
    let conf = sample_conf();

    assert_eq!(conf.select("IfModule", Depth::Deep, Keep::Leaves).len(), 3);
    assert_eq!(conf.select("IfModule", Depth::Deep, Keep::Roots).len(), 2);
}

// ============================================================
// Tuple Terms (AND of attribute positions)
// ============================================================

#[test]
fn given_tuple_term_when_selecting_then_name_and_every_attr_position_must_match() {
    let conf = sample_conf();

    assert_eq!(conf.get(("Directory", "/")).len(), 1);
    assert_eq!(conf.get(("Directory", "/var/www")).len(), 1);
    assert_eq!(
        conf.get(("Options", "Indexes", "FollowSymLinks")).len(),
        0,
        "Options is not a top-level node"
    );
    assert_eq!(
        conf.find_all(("Options", "Indexes", "FollowSymLinks")).len(),
        1
    );
    assert!(conf.find_all(("Options", "Indexes", "Missing")).is_empty());
}

#[test]
fn given_separate_terms_when_selecting_then_they_are_alternatives() {
    let conf = sample_conf();

    // OR across top-level terms vs AND inside one tuple
    assert_eq!(conf.get(terms!["ServerRoot", "Listen"]).len(), 3);
    assert_eq!(conf.get(terms![("Directory", "/"), "Listen"]).len(), 3);
}

// ============================================================
// Chaining Tests
// ============================================================

#[test]
fn given_directory_root_section_when_chaining_then_allowoverride_value_is_reachable() {
    let conf = sample_conf();

    let dirs = conf.select(("Directory", "/"), Depth::Shallow, Keep::Leaves);
    assert_eq!(dirs.len(), 1);

    let only = dirs.first().unwrap();
    assert_eq!(only.children().len(), 1);
    assert_eq!(only.children().first().unwrap().name(), "AllowOverride");

    let over = dirs.get("AllowOverride");
    assert_eq!(over.len(), 1);
    assert_eq!(over.value().unwrap(), "none");
}

#[test]
fn given_chained_queries_when_restricting_top_level_first_then_scope_differs_from_deep_query() {
    let conf = sample_conf();

    // Restrict to top-level Directory sections first: the nested
    // /var/www/html section is not among the starting elements.
    let via_top = conf.get("Directory").get("Require");
    assert!(via_top.is_empty());

    // Expanding to all Directory sections first finds it.
    let via_deep = conf.find_all("Directory").get("Require");
    assert_eq!(via_deep.len(), 1);
}

// ============================================================
// Predicates in Name and Attribute Position
// ============================================================

#[test]
fn given_custom_name_predicate_when_selecting_then_it_counts_matching_sections() {
    let conf = sample_conf();

    let is_ifmodule = Pred::from_fn(|v| v.as_str() == Some("IfModule"));
    assert_eq!(conf.get(is_ifmodule.clone()).len(), 2);
    assert_eq!(conf.find_all(is_ifmodule).len(), 3);
}

#[test]
fn given_binary_predicate_when_bound_to_divisor_then_it_selects_accordingly() {
    let divisible_by = |d: i64| {
        Pred::binary(
            |v, divisor: &i64| v.as_int().map_or(false, |n| n % divisor == 0),
            d,
        )
    };

    let conf = sample_conf();
    assert_eq!(conf.get(("Listen", divisible_by(10))).len(), 1);
    assert!(conf.get(("Listen", divisible_by(3))).is_empty());
}

#[test]
fn given_conjunction_in_attribute_position_when_sides_match_different_attributes_then_node_matches() {
    let conf = sample_conf();

    // Mixed has attrs ["abc", 80]: no single attribute satisfies both
    // sides, but the node as a whole does.
    let p = conftree::startswith("a") & conftree::eq(80);
    assert_eq!(conf.get(("Mixed", p.clone())).len(), 1);
    assert!(conf.get(("Listen", p)).is_empty());
}

#[test]
fn given_incompatible_attribute_when_applying_predicate_then_it_degrades_to_false_only_there() {
    let conf = sample_conf();

    // Mixed has attrs ["abc", 80]: the numeric predicate fails on "abc"
    // but matches via the compatible sibling attribute.
    assert_eq!(conf.get(("Mixed", conftree::le(100))).len(), 1);

    // Options attrs are all strings: no match, no error.
    assert!(conf.find_all(("Options", conftree::lt(5))).is_empty());
}
