#![allow(dead_code)]
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use folio_git::repository::{MirrorTransport, TransportRequest};
use folio_git::{AggregateError, Result};
use gix::objs::tree::EntryKind;

/// Files of one commit, by path.
pub type Files<'a> = &'a [(&'a str, &'a str)];

/// A bare repository built object by object.
pub struct Fixture {
    pub path: PathBuf,
    repo: gix::Repository,
}

impl Fixture {
    /// Creates an empty bare repository with a committer identity.
    pub fn bare(path: &Path) -> Self {
        gix::init_bare(path).expect("init bare repository");
        Self::with_identity(path)
    }

    /// Creates an empty repository with a work tree at `path`.
    pub fn worktree(path: &Path) -> Self {
        gix::init(path).expect("init repository");
        let git_dir = path.join(".git");
        append_identity(&git_dir);
        let repo = gix::open(path).expect("reopen repository");
        Self {
            path: path.to_path_buf(),
            repo,
        }
    }

    fn with_identity(path: &Path) -> Self {
        append_identity(path);
        let repo = gix::open(path).expect("reopen repository");
        Self {
            path: path.to_path_buf(),
            repo,
        }
    }

    /// Commits `files` as the whole tree of `branch`.
    pub fn commit(&self, branch: &str, files: Files<'_>) -> gix::ObjectId {
        let tree = self.write_tree(files);
        let refname = format!("refs/heads/{}", branch);
        let parents: Vec<gix::ObjectId> = self
            .repo
            .find_reference(refname.as_str())
            .ok()
            .and_then(|mut r| r.peel_to_id_in_place().ok())
            .map(|id| id.detach())
            .into_iter()
            .collect();
        self.repo
            .commit(refname.as_str(), format!("update {}", branch), tree, parents)
            .expect("commit")
            .detach()
    }

    /// Points `refs/tags/<name>` at `target`.
    pub fn tag(&self, name: &str, target: gix::ObjectId) {
        let refname = format!("refs/tags/{}", name);
        self.repo
            .reference(
                refname.as_str(),
                target,
                gix::refs::transaction::PreviousValue::Any,
                "tag",
            )
            .expect("create tag");
    }

    /// Deletes `refs/heads/<branch>`.
    pub fn delete_branch(&self, branch: &str) {
        let refname = format!("refs/heads/{}", branch);
        self.repo
            .find_reference(refname.as_str())
            .expect("find branch")
            .delete()
            .expect("delete branch");
    }

    /// `file://` URL of the repository.
    pub fn url(&self) -> String {
        format!("file://{}", self.path.display())
    }

    fn write_tree(&self, files: Files<'_>) -> gix::ObjectId {
        let mut root = Dir::default();
        for (path, contents) in files {
            root.insert(path, contents.as_bytes());
        }
        root.write(&self.repo)
    }
}

fn append_identity(git_dir: &Path) {
    let config = git_dir.join("config");
    let mut text = std::fs::read_to_string(&config).expect("read config");
    text.push_str("[user]\n\tname = Folio Test\n\temail = folio@example.com\n");
    std::fs::write(&config, text).expect("write config");
}

#[derive(Default)]
struct Dir {
    files: BTreeMap<String, Vec<u8>>,
    dirs: BTreeMap<String, Dir>,
}

impl Dir {
    fn insert(&mut self, path: &str, contents: &[u8]) {
        match path.split_once('/') {
            Some((dir, rest)) => {
                self.dirs.entry(dir.to_string()).or_default().insert(rest, contents)
            },
            None => {
                self.files.insert(path.to_string(), contents.to_vec());
            },
        }
    }

    fn write(&self, repo: &gix::Repository) -> gix::ObjectId {
        // git orders tree entries as if directory names ended with '/'.
        let mut entries: Vec<(String, gix::objs::tree::Entry)> = Vec::new();
        for (name, contents) in &self.files {
            let oid = repo.write_blob(contents).expect("write blob").detach();
            entries.push((name.clone(), entry(name, EntryKind::Blob, oid)));
        }
        for (name, dir) in &self.dirs {
            let oid = dir.write(repo);
            entries.push((format!("{}/", name), entry(name, EntryKind::Tree, oid)));
        }
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        let tree = gix::objs::Tree {
            entries: entries.into_iter().map(|(_, e)| e).collect(),
        };
        repo.write_object(&tree).expect("write tree").detach()
    }
}

fn entry(name: &str, kind: EntryKind, oid: gix::ObjectId) -> gix::objs::tree::Entry {
    gix::objs::tree::Entry {
        mode: kind.into(),
        filename: name.into(),
        oid,
    }
}

/// Copies a directory tree.
pub fn copy_dir(from: &Path, to: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(to)?;
    for entry in std::fs::read_dir(from)? {
        let entry = entry?;
        let target = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir(&entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), target)?;
        }
    }
    Ok(())
}

/// A transport that "clones" by copying fixture repositories.
#[derive(Default)]
pub struct CopyTransport {
    /// Fixture repository per remote URL.
    remotes: BTreeMap<String, PathBuf>,
    pub clones: AtomicUsize,
    pub fetches: AtomicUsize,
    pub fail_fetch: AtomicBool,
    /// Block until interrupted instead of copying.
    pub hang: AtomicBool,
    pub urls: parking_lot::Mutex<Vec<String>>,
}

impl CopyTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remote(mut self, url: &str, fixture: &Path) -> Self {
        self.remotes.insert(url.to_string(), fixture.to_path_buf());
        self
    }

    pub fn clones(&self) -> usize {
        self.clones.load(Ordering::SeqCst)
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn copy(&self, request: &TransportRequest) -> Result<()> {
        self.urls.lock().push(request.url.clone());
        if self.hang.load(Ordering::SeqCst) {
            while !request.interrupt.load(Ordering::SeqCst) {
                std::thread::sleep(Duration::from_millis(5));
            }
            return Err(AggregateError::git("interrupted"));
        }

        let fixture = self
            .remotes
            .get(&request.display_url)
            .ok_or_else(|| AggregateError::git(format!("repository not found: {}", request.url)))?;
        if request.path.exists() {
            std::fs::remove_dir_all(&request.path)?;
        }
        copy_dir(fixture, &request.path)?;
        Ok(())
    }
}

impl MirrorTransport for CopyTransport {
    fn clone_mirror(&self, request: &TransportRequest) -> Result<()> {
        self.clones.fetch_add(1, Ordering::SeqCst);
        self.copy(request)
    }

    fn fetch_mirror(&self, request: &TransportRequest) -> Result<()> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(AggregateError::git(format!("could not reach {}", request.url)));
        }
        self.copy(request)
    }
}

/// Descriptor text for `name` at `version`.
pub fn descriptor(name: &str, version: &str) -> String {
    format!("name: {}\nversion: '{}'\ntitle: {} Docs\n", name, version, name)
}

pub fn shared(transport: CopyTransport) -> Arc<CopyTransport> {
    Arc::new(transport)
}
