use folio_core::{ContentCatalog, Family, ResourceContext, ROOT_MODULE};

mod common;

fn ctx() -> ResourceContext {
    ResourceContext::new("server", "1.0").with_module("admin")
}

#[test]
fn test_qualified_id_ignores_context() {
    let catalog = common::sample_catalog();

    let file = catalog
        .resolve("1.5@server::index.adoc", &ResourceContext::default())
        .unwrap()
        .unwrap();
    assert_eq!(file.key().version, "1.5");
    assert_eq!(file.key().module, ROOT_MODULE);
}

#[test]
fn test_omitted_version_is_latest_stable() {
    let catalog = common::sample_catalog();

    let file = catalog.resolve("server:admin:install.adoc", &ctx()).unwrap().unwrap();
    assert_eq!(file.key().version, "1.5");
}

#[test]
fn test_context_supplies_missing_parts() {
    let catalog = common::sample_catalog();

    let file = catalog.resolve("install.adoc", &ctx()).unwrap().unwrap();
    assert_eq!(file.key().version, "1.0");
    assert_eq!(file.key().module, "admin");

    let file = catalog.resolve("2.0@ROOT:index", &ctx()).unwrap().unwrap();
    assert_eq!(file.key().version, "2.0");
    assert_eq!(file.key().relative, "index.adoc");
}

#[test]
fn test_unknown_targets_resolve_to_nothing() {
    let catalog = common::sample_catalog();

    assert!(catalog.resolve("nope::index.adoc", &ctx()).unwrap().is_none());
    assert!(catalog.resolve("9.9@server::index.adoc", &ctx()).unwrap().is_none());
    assert!(catalog.resolve("missing.adoc", &ctx()).unwrap().is_none());
}

#[test]
fn test_malformed_id_is_an_error() {
    let catalog = common::sample_catalog();

    let err = catalog.resolve("::::", &ctx()).unwrap_err();
    assert!(err.is_syntax_error());
}

#[test]
fn test_cross_component_page_alias() {
    let mut builder = ContentCatalog::builder();
    common::populate(&mut builder, "server", &[("1.0", false)]);
    common::populate(&mut builder, "client", &[("0.9", false)]);

    let page = common::key("server", "1.0", "admin", Family::Page, "install.adoc");
    builder.add_page_aliases(page.clone(), vec!["client::legacy/install.adoc".to_string()]);
    let (catalog, errors) = builder.build();
    assert!(errors.is_empty());

    let ctx = ResourceContext::new("client", "0.9");
    let file = catalog.resolve("legacy/install.adoc", &ctx).unwrap().unwrap();
    assert_eq!(file.key(), &page);
}

#[test]
fn test_alias_into_unknown_component_is_reported() {
    let mut builder = ContentCatalog::builder();
    common::populate(&mut builder, "server", &[("1.0", false)]);

    let page = common::key("server", "1.0", ROOT_MODULE, Family::Page, "index.adoc");
    builder.add_page_aliases(page, vec!["ghost::old.adoc".to_string(), "::::".to_string()]);
    let (catalog, errors) = builder.build();

    assert_eq!(errors.len(), 2);
    assert!(errors.iter().any(|e| e.is_syntax_error()));
    assert_eq!(catalog.len(), 2);
}

#[test]
fn test_family_allowlist() {
    let catalog = common::sample_catalog();
    let err = folio_core::resolve_resource(
        "image$logo.png",
        &catalog,
        &ctx(),
        None,
        Some(&[Family::Page]),
    )
    .unwrap_err();
    assert!(err.is_syntax_error());
}
