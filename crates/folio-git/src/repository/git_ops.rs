//! Read access to a repository's object store using gix (pure Rust).
//!
//! Content is always read from commits, never from a working tree, so bare
//! mirrors and local checkouts are handled the same way.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use folio_core::RefKind;
use gix::bstr::ByteSlice;
use gix::objs::tree::EntryKind;
use tracing::debug;

use super::refs::{self, GitRef};
use crate::error::{AggregateError, Result};

/// Prefix of remote-tracking branches in a mirror.
const REMOTE_BRANCH_PREFIX: &str = "refs/remotes/origin/";

/// One entry below the walked directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// Path relative to the walked directory, `/`-separated.
    pub path: String,
    pub is_dir: bool,
    pub oid: gix::ObjectId,
}

/// An opened repository: a bare mirror in the cache or a local repository used in place.
///
/// Every operation holds the repository's lock from the [`LockRegistry`](super::LockRegistry),
/// so concurrent readers of one repository are serialized.
#[derive(Clone)]
pub struct GitRepository {
    repo: gix::ThreadSafeRepository,
    path: PathBuf,
    url: String,
    web_url: Option<String>,
    local: bool,
    lock: Arc<tokio::sync::Mutex<()>>,
}

impl GitRepository {
    /// Opens the repository at `path`.
    ///
    /// `url` is the display form used in logs and origins. Fails with
    /// [`AggregateError::NotAGitRepository`] when `path` is not a repository.
    pub fn open(
        path: &Path,
        url: impl Into<String>,
        web_url: Option<String>,
        local: bool,
        lock: Arc<tokio::sync::Mutex<()>>,
    ) -> Result<Self> {
        let repo = gix::open_opts(path, gix::open::Options::isolated()).map_err(|e| {
            debug!(path = %path.display(), error = %e, "Failed to open repository");
            AggregateError::NotAGitRepository {
                path: path.to_path_buf(),
            }
        })?;

        Ok(Self {
            repo: repo.into_sync(),
            path: path.to_path_buf(),
            url: url.into(),
            web_url,
            local,
            lock,
        })
    }

    /// Location on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Credential-free URL (or local path) for display.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Browser URL of the hosting service, if known.
    pub fn web_url(&self) -> Option<&str> {
        self.web_url.as_deref()
    }

    /// True when the repository is used in place rather than mirrored.
    pub fn is_local(&self) -> bool {
        self.local
    }

    /// Runs `f` on a blocking thread while holding the repository lock.
    async fn blocking<T, F>(&self, op: &'static str, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&gix::Repository) -> Result<T> + Send + 'static,
    {
        let _guard = self.lock.lock().await;
        let repo = self.repo.clone();

        tokio::task::spawn_blocking(move || f(&repo.to_thread_local()))
            .await
            .map_err(|e| AggregateError::git(format!("{} task failed: {}", op, e)))?
    }

    /// Lists branches or tags, ordered by name without duplicates.
    ///
    /// In a mirror, remote-tracking branches win over stale local branches of
    /// the same name.
    pub async fn list_refs(&self, kind: RefKind) -> Result<Vec<GitRef>> {
        let local = self.local;
        self.blocking("List refs", move |repo| collect_refs(repo, local, kind))
            .await
    }

    /// Short name of the branch HEAD points to, if HEAD is not detached.
    ///
    /// For a mirror this is the remote's default branch.
    pub async fn current_branch(&self) -> Result<Option<String>> {
        self.blocking("Read HEAD", |repo| {
            let head = repo
                .head_name()
                .map_err(|e| AggregateError::git(format!("Failed to read HEAD: {}", e)))?;
            Ok(head.map(|name| name.shorten().to_string()))
        })
        .await
    }

    /// Walks every entry below `subpath` at `git_ref`.
    ///
    /// An empty `subpath` walks the whole tree. Entries are listed depth first
    /// in tree order. Symlinks and submodules are skipped.
    pub async fn read_tree(&self, git_ref: &GitRef, subpath: &str) -> Result<Vec<TreeEntry>> {
        let oid = git_ref.oid;
        let subpath = subpath.trim_matches('/').to_string();
        let context = format!("{} ({})", self.url, git_ref);

        self.blocking("Read tree", move |repo| {
            let root = commit_tree(repo, oid)?;
            let start = if subpath.is_empty() {
                root
            } else {
                match find_entry(repo, root, &subpath)? {
                    Some((id, true)) => id,
                    _ => {
                        return Err(AggregateError::NotFound(format!(
                            "directory '{}' in {}",
                            subpath, context
                        )));
                    },
                }
            };
            walk_tree(repo, start)
        })
        .await
    }

    /// Reads the file at `path` at `git_ref`.
    pub async fn read_blob(&self, git_ref: &GitRef, path: &str) -> Result<Vec<u8>> {
        let oid = git_ref.oid;
        let path = path.trim_matches('/').to_string();
        let context = format!("{} ({})", self.url, git_ref);

        self.blocking("Read blob", move |repo| {
            let root = commit_tree(repo, oid)?;
            match find_entry(repo, root, &path)? {
                Some((id, false)) => read_object(repo, id),
                _ => Err(AggregateError::NotFound(format!("'{}' in {}", path, context))),
            }
        })
        .await
    }

    /// Reads several blobs by id, in order, under one lock.
    pub async fn read_blobs(&self, ids: Vec<gix::ObjectId>) -> Result<Vec<Vec<u8>>> {
        self.blocking("Read blobs", move |repo| {
            ids.into_iter().map(|id| read_object(repo, id)).collect()
        })
        .await
    }

    /// Commit time of `git_ref` in seconds since the Unix epoch.
    pub async fn commit_time(&self, git_ref: &GitRef) -> Result<i64> {
        let oid = git_ref.oid;
        self.blocking("Read commit", move |repo| {
            let commit = find_commit(repo, oid)?;
            let time = commit.time().map_err(|e| {
                AggregateError::git(format!("Failed to decode commit {}: {}", oid, e))
            })?;
            Ok(time.seconds)
        })
        .await
    }
}

impl fmt::Debug for GitRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitRepository")
            .field("url", &self.url)
            .field("path", &self.path)
            .field("local", &self.local)
            .finish()
    }
}

fn collect_refs(repo: &gix::Repository, local: bool, kind: RefKind) -> Result<Vec<GitRef>> {
    let platform = repo.references().map_err(list_error)?;

    let mut found = Vec::new();
    match kind {
        RefKind::Branch => {
            if !local {
                let remote = platform.remote_branches().map_err(list_error)?;
                push_refs(&mut found, remote, REMOTE_BRANCH_PREFIX, kind);
            }
            let branches = platform.local_branches().map_err(list_error)?;
            push_refs(&mut found, branches, "refs/heads/", kind);
        },
        RefKind::Tag => {
            let tags = platform.tags().map_err(list_error)?;
            push_refs(&mut found, tags, "refs/tags/", kind);
        },
    }

    refs::sort_and_dedupe(&mut found);
    Ok(found)
}

fn list_error(e: impl fmt::Display) -> AggregateError {
    AggregateError::git(format!("Failed to list references: {}", e))
}

fn push_refs<'r, E: fmt::Display>(
    out: &mut Vec<GitRef>,
    references: impl Iterator<Item = std::result::Result<gix::Reference<'r>, E>>,
    prefix: &str,
    kind: RefKind,
) {
    for reference in references.flatten() {
        let name = match reference.name().as_bstr().to_str() {
            Ok(full) => match full.strip_prefix(prefix) {
                Some(short) if short != "HEAD" => short.to_string(),
                _ => continue,
            },
            Err(_) => continue,
        };

        match reference.into_fully_peeled_id() {
            Ok(id) => out.push(GitRef {
                name,
                kind,
                oid: id.detach(),
            }),
            Err(e) => debug!(refname = %name, error = %e, "Skipping unpeelable reference"),
        }
    }
}

fn find_commit(repo: &gix::Repository, oid: gix::ObjectId) -> Result<gix::Commit<'_>> {
    repo.find_object(oid)
        .map_err(|e| AggregateError::git(format!("Failed to find object {}: {}", oid, e)))?
        .try_into_commit()
        .map_err(|e| AggregateError::git(format!("Object {} is not a commit: {}", oid, e)))
}

fn commit_tree(repo: &gix::Repository, oid: gix::ObjectId) -> Result<gix::ObjectId> {
    let commit = find_commit(repo, oid)?;
    commit
        .tree_id()
        .map(|id| id.detach())
        .map_err(|e| AggregateError::git(format!("Failed to decode commit {}: {}", oid, e)))
}

/// Decodes a tree into owned `(name, is_dir, oid)` triples, skipping links and submodules.
fn tree_entries(
    repo: &gix::Repository,
    tree_id: gix::ObjectId,
) -> Result<Vec<(String, bool, gix::ObjectId)>> {
    let tree = repo
        .find_object(tree_id)
        .map_err(|e| AggregateError::git(format!("Failed to find tree {}: {}", tree_id, e)))?
        .try_into_tree()
        .map_err(|e| AggregateError::git(format!("Object {} is not a tree: {}", tree_id, e)))?;
    let decoded = tree
        .decode()
        .map_err(|e| AggregateError::git(format!("Failed to decode tree {}: {}", tree_id, e)))?;

    Ok(decoded
        .entries
        .iter()
        .filter_map(|entry| {
            let is_dir = match entry.mode.kind() {
                EntryKind::Tree => true,
                EntryKind::Blob | EntryKind::BlobExecutable => false,
                EntryKind::Link | EntryKind::Commit => return None,
            };
            Some((entry.filename.to_str_lossy().into_owned(), is_dir, entry.oid.to_owned()))
        })
        .collect())
}

/// Finds the entry at `path` below `tree_id`, returning its id and whether it is a tree.
fn find_entry(
    repo: &gix::Repository,
    tree_id: gix::ObjectId,
    path: &str,
) -> Result<Option<(gix::ObjectId, bool)>> {
    let mut current = (tree_id, true);
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        if !current.1 {
            return Ok(None);
        }
        let entries = tree_entries(repo, current.0)?;
        match entries.into_iter().find(|(name, _, _)| name == segment) {
            Some((_, is_dir, oid)) => current = (oid, is_dir),
            None => return Ok(None),
        }
    }
    Ok(Some(current))
}

fn walk_tree(repo: &gix::Repository, start: gix::ObjectId) -> Result<Vec<TreeEntry>> {
    let mut out = Vec::new();
    let mut stack = vec![(start, String::new())];

    while let Some((tree_id, prefix)) = stack.pop() {
        let mut subtrees = Vec::new();
        for (name, is_dir, oid) in tree_entries(repo, tree_id)? {
            let path = if prefix.is_empty() {
                name
            } else {
                format!("{}/{}", prefix, name)
            };
            if is_dir {
                subtrees.push((oid, path.clone()));
            }
            out.push(TreeEntry { path, is_dir, oid });
        }
        // Reverse so the first subtree is walked next.
        stack.extend(subtrees.into_iter().rev());
    }

    Ok(out)
}

fn read_object(repo: &gix::Repository, id: gix::ObjectId) -> Result<Vec<u8>> {
    let object = repo
        .find_object(id)
        .map_err(|e| AggregateError::git(format!("Failed to find blob {}: {}", id, e)))?;
    Ok(object.detach().data)
}
