//! Tests for ResultSet sequence behavior and node accessors

use conftree::{parse_str, ConfTree, NodeValue, Value};
use itertools::Itertools;

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
    parse_str(SAMPLE, "/etc/httpd/conf/httpd.conf").unwrap()
}

// ============================================================
// Sequence Behavior Tests
// ============================================================

#[test]
fn given_result_set_when_indexing_then_zero_based_and_negative_indices_work() {
    let conf = sample_conf();
    let listens = conf.get("Listen");

    assert_eq!(listens.len(), 2);
    assert_eq!(listens.at(0).unwrap().value(), 80);
    assert_eq!(listens.at(1).unwrap().value(), 8443);
    assert_eq!(listens.at(-1).unwrap().value(), 8443);
    assert_eq!(listens.at(-2).unwrap().value(), 80);
    assert!(listens.at(2).is_none());
    assert!(listens.at(-3).is_none());
}

#[test]
fn given_result_set_when_using_first_and_last_then_they_match_the_indices() {
    let conf = sample_conf();
    let listens = conf.get("Listen");

    assert_eq!(listens.first(), listens.at(0));
    assert_eq!(listens.last(), listens.at(-1));

    let empty = conf.get("Missing");
    assert!(empty.first().is_none());
    assert!(empty.last().is_none());
}

#[test]
fn given_result_set_when_iterating_then_document_order_is_preserved() {
    let conf = sample_conf();
    let positions: Vec<usize> = conf.children().iter().map(|n| n.pos()).collect();
    let mut sorted = positions.clone();
    sorted.sort_unstable();
    assert_eq!(positions, sorted);

    // Both borrowing and consuming iteration work
    let names: Vec<&str> = (&conf.children()).into_iter().map(|n| n.name()).collect();
    assert_eq!(names.len(), 10);
    for node in conf.get("Listen") {
        assert_eq!(node.name(), "Listen");
    }
}

#[test]
fn given_empty_result_set_when_checking_truthiness_then_it_is_falsy() {
    let conf = sample_conf();
    assert!(conf.get("Missing").is_empty());
    assert!(!conf.get("Listen").is_empty());
}

// ============================================================
// Directive/Section Partition Tests
// ============================================================

#[test]
fn given_result_set_when_partitioning_then_directives_and_sections_cover_it_completely() {
    let conf = sample_conf();
    let top = conf.children();

    assert_eq!(top.directives().len() + top.sections().len(), top.len());
    assert_eq!(top.directives().len(), 6);
    assert_eq!(top.sections().len(), 4);

    for node in top.directives().iter() {
        assert!(node.is_directive());
        assert!(!node.is_section());
    }
    for node in top.sections().iter() {
        assert!(node.is_section());
    }
}

#[test]
fn given_partition_filters_when_chaining_then_they_remain_queryable() {
    let conf = sample_conf();

    let options = conf.find_all("Directory").sections().get("Options");
    assert_eq!(options.len(), 1);

    // Order and scope of restriction is not commutative
    let via_top = conf.get("Directory").get("Options");
    assert_eq!(via_top.len(), 1);
    let via_deep_sections = conf
        .find_all(conftree::startswith("Directory"))
        .sections()
        .get("Require");
    assert_eq!(via_deep_sections.len(), 1);
}

// ============================================================
// Name Listing Tests
// ============================================================

#[test]
fn given_document_root_when_listing_names_then_dedup_and_sort_happen_at_the_caller() {
    let conf = sample_conf();

    let names = conf.children().names();
    assert_eq!(names.len(), 10);

    let distinct: Vec<&str> = names.into_iter().unique().sorted().collect();
    assert_eq!(
        distinct,
        vec![
            "Directory",
            "EnableSendfile",
            "IfModule",
            "Listen",
            "Mixed",
            "ServerRoot",
            "Timeout"
        ]
    );
}

// ============================================================
// Value Accessor Tests
// ============================================================

#[test]
fn given_single_attribute_node_when_reading_value_then_the_typed_scalar_is_exposed() {
    let conf = sample_conf();

    assert_eq!(conf.find("Listen").unwrap().value(), 80);
    assert_eq!(conf.find("Timeout").unwrap().value(), 1.5);
    assert_eq!(conf.find("EnableSendfile").unwrap().value(), true);
    assert_eq!(conf.find("ServerRoot").unwrap().value(), "/etc/httpd");
}

#[test]
fn given_multi_attribute_node_when_reading_value_then_the_typed_sequence_is_exposed() {
    let conf = sample_conf();

    let mixed = conf.find("Mixed").unwrap();
    assert_eq!(
        mixed.value(),
        NodeValue::Seq(vec![Value::Str("abc".into()), Value::Int(80)])
    );

    let require = conf.find("Require").unwrap();
    assert_eq!(
        require.value(),
        NodeValue::Seq(vec![
            Value::Str("all".into()),
            Value::Str("granted".into())
        ])
    );
}

#[test]
fn given_result_set_when_reading_value_then_it_delegates_only_for_a_single_element() {
    let conf = sample_conf();

    assert_eq!(conf.get(("Listen", 80)).value().unwrap(), 80);
    assert!(conf.get("Listen").value().is_none(), "two elements");
    assert!(conf.get("Missing").value().is_none());
}

#[test]
fn given_typed_attributes_when_rendering_the_node_then_the_original_lexeme_survives() {
    let conf = sample_conf();

    let server_root = conf.find("ServerRoot").unwrap();
    assert_eq!(server_root.raw_attrs(), ["/etc/httpd"]);
    assert_eq!(server_root.line(), r#"ServerRoot "/etc/httpd""#);

    let timeout = conf.find("Timeout").unwrap();
    assert_eq!(timeout.attrs(), vec![Value::Float(1.5)]);
    assert_eq!(timeout.line(), "Timeout 1.5");
}

// ============================================================
// Navigation Tests
// ============================================================

#[test]
fn given_nested_node_when_navigating_then_parent_and_root_links_are_wired() {
    let conf = sample_conf();

    let require = conf.find("Require").unwrap();
    let parent = require.parent().unwrap();
    assert_eq!(parent.name(), "Directory");
    assert_eq!(parent.raw_attrs(), ["/var/www/html"]);

    let root = require.root();
    assert_eq!(root.raw_attrs(), ["/var/www"]);
    assert!(root.parent().is_none());
    assert_eq!(root.root(), root);
}

#[test]
fn given_any_node_when_reading_provenance_then_file_and_position_are_exact() {
    let conf = sample_conf();

    let inner = conf.find("Inner").unwrap();
    assert_eq!(
        inner.file_path().to_string_lossy(),
        "/etc/httpd/conf/httpd.conf"
    );
    assert_eq!(inner.pos(), 13);
    assert_eq!(inner.line().trim(), "Inner yes");
}
