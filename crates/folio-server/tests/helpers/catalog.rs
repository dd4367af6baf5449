//! Sample catalog served by the router tests.

use std::sync::Arc;

use folio_core::{
    CatalogBuilder, ComponentVersion, ContentCatalog, Family, FileSrc, Origin, RefKind, ResourceKey,
    VirtualFile,
};

pub const SERVER_URL: &str = "https://github.com/acme/server.git";

fn add_file(
    builder: &mut CatalogBuilder,
    origin: &Arc<Origin>,
    key: ResourceKey,
    path: &str,
    contents: &[u8],
) {
    let edit_url = format!("https://github.com/acme/server/edit/{}/{}", origin.refname, path);
    let src = FileSrc::new(key, path, origin.clone()).with_edit_url(Some(edit_url));
    builder
        .add_file(VirtualFile::new(src, contents.to_vec(), Some(1_700_000_000)))
        .expect("sample files are unique");
}

/// `server` 1.0 (branch `v1.0`) and 2.0 (branch `main`), each with a start
/// page, an install page, a logo and, in 2.0, an alias `start.adoc` for the
/// start page.
pub fn sample_catalog() -> ContentCatalog {
    let mut builder = ContentCatalog::builder();

    for (version, refname) in [("1.0", "v1.0"), ("2.0", "main")] {
        let origin = Origin::new(SERVER_URL, refname, RefKind::Branch, "docs");
        let mut cv = ComponentVersion::new("server", version, origin.clone());
        cv.title = "Server".to_string();
        builder.register_version(cv).expect("sample versions are unique");

        let origin = Arc::new(origin);
        let page = |module: &str, relative: &str| {
            ResourceKey::new("server", version, module, Family::Page, relative)
        };
        add_file(
            &mut builder,
            &origin,
            page("ROOT", "index.adoc"),
            "docs/modules/ROOT/pages/index.adoc",
            format!("= Server {}\n", version).as_bytes(),
        );
        add_file(
            &mut builder,
            &origin,
            page("admin", "install.adoc"),
            "docs/modules/admin/pages/install.adoc",
            b"= Install\n",
        );
        add_file(
            &mut builder,
            &origin,
            ResourceKey::new("server", version, "ROOT", Family::Image, "logo.png"),
            "docs/modules/ROOT/images/logo.png",
            b"\x89PNG",
        );
        if version == "2.0" {
            builder.add_page_aliases(page("ROOT", "index.adoc"), vec!["start.adoc".to_string()]);
        }
    }

    let (catalog, errors) = builder.build();
    assert!(errors.is_empty());
    catalog
}
