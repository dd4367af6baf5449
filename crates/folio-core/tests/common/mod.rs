#![allow(dead_code)]
use std::sync::Arc;

use folio_core::{
    CatalogBuilder, ComponentVersion, ContentCatalog, Family, FileSrc, Origin, RefKind, ResourceKey,
    VirtualFile,
};

/// Origin for a branch of a test repository.
pub fn origin(url: &str, refname: &str) -> Origin {
    Origin::new(url, refname, RefKind::Branch, "")
}

/// Creates a component version contributed by `url`'s `refname`.
pub fn version(name: &str, version: &str, url: &str, refname: &str) -> ComponentVersion {
    ComponentVersion::new(name, version, origin(url, refname))
}

/// Creates a file with the given contents, placed under the usual layout path.
pub fn file(key: ResourceKey, origin: &Arc<Origin>, contents: &str) -> VirtualFile {
    let path = format!("modules/{}/{}s/{}", key.module, key.family, key.relative);
    let src = FileSrc::new(key, path, origin.clone());
    VirtualFile::new(src, contents.as_bytes().to_vec(), Some(1_700_000_000))
}

pub fn key(
    component: &str,
    version: &str,
    module: &str,
    family: Family,
    relative: &str,
) -> ResourceKey {
    ResourceKey::new(component, version, module, family, relative)
}

/// Registers `versions` of `component` (each from its own branch) and gives each an
/// `index.adoc` page in `ROOT` plus an `install.adoc` page in `admin`.
pub fn populate(builder: &mut CatalogBuilder, component: &str, versions: &[(&str, bool)]) {
    let url = format!("https://git.example.com/{}.git", component);
    for (name, prerelease) in versions {
        let mut cv = version(component, name, &url, &format!("v{}", name));
        cv.prerelease = *prerelease;
        cv.title = format!("{} Docs", component);
        let origin = Arc::new(cv.origin().clone());
        builder.register_version(cv).expect("fixture versions are unique");

        for (module, relative) in [("ROOT", "index.adoc"), ("admin", "install.adoc")] {
            let key = key(component, name, module, Family::Page, relative);
            let contents = format!("= {} {}", component, name);
            builder.add_file(file(key, &origin, &contents)).expect("fixture files are unique");
        }
    }
}

/// A catalog with `server` 1.0, 1.5, 2.0 (prerelease) and `client` 0.9.
pub fn sample_catalog() -> ContentCatalog {
    let mut builder = ContentCatalog::builder();
    populate(&mut builder, "server", &[("1.0", false), ("1.5", false), ("2.0", true)]);
    populate(&mut builder, "client", &[("0.9", false)]);

    let (catalog, errors) = builder.build();
    assert!(errors.is_empty());
    catalog
}
