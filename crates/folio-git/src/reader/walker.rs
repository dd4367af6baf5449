//! Reads a work item's files and places them in the content layout.

use std::sync::Arc;

use folio_core::layout::{self, Placement};
use folio_core::{Family, FileSrc, Origin, ResourceKey, VirtualFile};
use tracing::debug;

use super::descriptor::ComponentDescriptor;
use crate::error::Result;
use crate::source::WorkItem;

/// Files read for one work item.
#[derive(Debug, Default)]
pub struct WalkResult {
    pub files: Vec<VirtualFile>,
    /// Page keys with the aliases their headers declare.
    pub aliases: Vec<(ResourceKey, Vec<String>)>,
    /// Number of paths that fell outside the layout.
    pub skipped: usize,
}

/// Walks the tree below the item's start path and builds catalog files.
///
/// Every file gets the commit time of the item's ref as its mtime.
pub async fn walk(
    item: &WorkItem,
    descriptor: &ComponentDescriptor,
    origin: Arc<Origin>,
) -> Result<WalkResult> {
    let entries = item
        .repository
        .read_tree(&item.git_ref, &item.start_path)
        .await?;
    let mtime = item.repository.commit_time(&item.git_ref).await?;

    let mut placed = Vec::new();
    let mut skipped = 0;
    for entry in entries.into_iter().filter(|entry| !entry.is_dir) {
        match layout::classify(&entry.path, &descriptor.nav) {
            Placement::File {
                module,
                family,
                relative,
            } => {
                let key = ResourceKey::new(
                    &descriptor.name,
                    &descriptor.version,
                    module,
                    family,
                    relative,
                );
                placed.push((key, entry.path, entry.oid));
            },
            Placement::Descriptor => {},
            Placement::Ignored => {
                skipped += 1;
            },
        }
    }

    let ids = placed.iter().map(|(_, _, oid)| *oid).collect();
    let blobs = item.repository.read_blobs(ids).await?;

    let mut result = WalkResult {
        skipped,
        ..WalkResult::default()
    };
    for ((key, path, _), contents) in placed.into_iter().zip(blobs) {
        let repo_path = item.repo_path(&path);
        if key.family == Family::Page {
            let aliases = layout::page_aliases(&contents);
            if !aliases.is_empty() {
                result.aliases.push((key.clone(), aliases));
            }
        }

        let src = FileSrc::new(key, repo_path.clone(), Arc::clone(&origin))
            .with_edit_url(item.edit_url_for(&repo_path));
        result.files.push(VirtualFile::new(src, contents, Some(mtime)));
    }

    debug!(
        url = %item.repository.url(),
        refname = %item.git_ref.name,
        start_path = %item.start_path,
        files = result.files.len(),
        skipped = result.skipped,
        "Walked content tree"
    );
    Ok(result)
}
