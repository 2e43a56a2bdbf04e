//! Integration tests for graph resolution and expansion

use graph_template::{AttributeMap, Consolidate, Error, Graph, GraphError, Library, Operator};
use pretty_assertions::assert_eq;

fn library() -> Library {
    Library::from_toml_str(include_str!("fixtures/library.toml")).expect("Should load library")
}

fn attrs(pairs: &[(&str, &str)]) -> AttributeMap {
    pairs.iter().map(|(k, v)| (*k, *v)).collect()
}

fn series_fields(graph: &Graph) -> Vec<(String, String, String, String)> {
    graph
        .series()
        .map(|s| {
            (
                s.name.clone(),
                s.origin.clone(),
                s.source.clone(),
                s.metric.clone(),
            )
        })
        .collect()
}

#[test]
fn test_expand_instance_by_alias() {
    let graph = library()
        .expand("web1", &AttributeMap::new())
        .expect("Should expand");

    assert_eq!(graph.id, "web1-load");
    assert_eq!(graph.name, "host-load");
    assert!(!graph.template);
    assert_eq!(graph.options.get_str("title"), Some("web1 load (prod)"));
    assert_eq!(graph.options.get_str("yaxis_unit"), Some("metric"));
    assert_eq!(
        series_fields(&graph),
        vec![
            (
                "web1 user".to_string(),
                "collectd".to_string(),
                "web1".to_string(),
                "cpu.user".to_string()
            ),
            (
                "web1 system".to_string(),
                "collectd".to_string(),
                "web1".to_string(),
                "cpu.system".to_string()
            ),
            (
                "load".to_string(),
                "collectd".to_string(),
                "web1".to_string(),
                "load.shortterm".to_string()
            ),
        ]
    );
}

#[test]
fn test_group_settings_come_from_template() {
    let graph = library().expand("web1-load", &AttributeMap::new()).unwrap();

    let settings: Vec<_> = graph
        .groups
        .iter()
        .map(|g| (g.name.as_str(), g.operator, g.consolidate))
        .collect();
    assert_eq!(
        settings,
        vec![
            ("cpu", Operator::None, Consolidate::Average),
            ("load", Operator::Sum, Consolidate::Max),
        ]
    );
}

#[test]
fn test_instance_title_overrides_template() {
    let graph = library()
        .expand("db1-load", &attrs(&[("period", "midterm")]))
        .unwrap();

    assert_eq!(graph.options.get_str("title"), Some("database db1"));
    assert_eq!(graph.attributes.get_str("env"), Some("dev"));
    assert_eq!(graph.series().last().unwrap().metric, "load.midterm");
}

#[test]
fn test_missing_attribute_fails() {
    let err = library()
        .expand("db1-load", &AttributeMap::new())
        .unwrap_err();

    let template_err = err.template_error().expect("template error");
    assert!(template_err.to_string().contains("'period'"));
}

#[test]
fn test_missing_attribute_report() {
    let err = Error::from(
        library()
            .expand("db1-load", &AttributeMap::new())
            .unwrap_err(),
    );

    let report = err.format("graph db1-load");
    assert!(report.contains("graph db1-load"));
    assert!(report.contains("load.{{period}}"));
}

#[test]
fn test_retry_after_missing_attribute() {
    let library = library();
    let mut graph = library.graph("db1-load").unwrap();

    assert!(graph.expand(&AttributeMap::new()).is_err());
    assert!(!graph.is_expanded());

    graph.expand(&attrs(&[("period", "longterm")])).unwrap();
    assert!(graph.is_expanded());
    assert_eq!(graph.series().last().unwrap().metric, "load.longterm");
}

#[test]
fn test_broken_link() {
    let err = library()
        .expand("orphan", &AttributeMap::new())
        .unwrap_err();

    match err {
        GraphError::Store(e) => assert!(e.is_not_found()),
        other => panic!("Expected store error, got {:?}", other),
    }
}

#[test]
fn test_direct_graph_unchanged() {
    let library = library();
    let graph = library.expand("disk-usage", &attrs(&[("host", "x")])).unwrap();

    assert_eq!(graph.name, "disk.usage");
    assert_eq!(graph.alias, None);
    assert_eq!(graph.series().next().unwrap().metric, "df.root.used");
}

#[test]
fn test_template_expanded_directly() {
    let graph = library()
        .expand("host-load", &attrs(&[("host", "web2"), ("period", "shortterm")]))
        .unwrap();

    assert!(graph.template);
    assert_eq!(graph.options.get_str("title"), Some("web2 load (dev)"));
}

#[test]
fn test_resolve_exposes_raw_link() {
    let library = library();
    let mut graph = library.graph("web1").unwrap();

    graph.resolve().unwrap();

    let link = graph.link().expect("Should have link");
    assert_eq!(link.id, "host-load");
    assert_eq!(
        link.options.get_str("title"),
        Some("{{host}} load ({{env}})")
    );
    assert!(!graph.is_expanded());
}

#[test]
fn test_expanded_graph_serializes() {
    let graph = library().expand("web1", &AttributeMap::new()).unwrap();
    let json: serde_json::Value = serde_json::to_value(&graph).unwrap();

    assert_eq!(json["id"], "web1-load");
    assert_eq!(json["template"], false);
    assert_eq!(json["groups"][1]["operator"], 2);
    assert_eq!(json["groups"][0]["series"][0]["source"], "web1");
}
