//! Resolves content-source locations to opened repositories.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use super::cache::{self, CacheAction};
use super::credentials::{CredentialStore, Credentials};
use super::git_ops::GitRepository;
use super::location::{Location, RemoteUrl};
use super::locks::LockRegistry;
use super::progress::{GitOperation, ProgressObserver};
use super::proxy::ProxyConfig;
use super::transport::{GixTransport, MirrorTransport, TransportRequest};
use crate::error::{AggregateError, Result};

/// Default limit for a full clone.
pub const DEFAULT_CLONE_TIMEOUT: Duration = Duration::from_secs(120);

/// Default limit for a fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

type OpenCell = Arc<OnceCell<std::result::Result<Arc<GitRepository>, String>>>;

/// Opens repositories for one aggregation run.
///
/// Remote repositories are mirrored under the cache dir and reused across
/// runs while their validity marker is present. Within a run, each repository
/// is cloned or fetched at most once no matter how many sources name it; a
/// failed repository is not retried.
pub struct RepositoryManager {
    cache_dir: PathBuf,
    fetch: bool,
    proxy: ProxyConfig,
    credentials: CredentialStore,
    transport: Arc<dyn MirrorTransport>,
    observer: Option<Arc<dyn ProgressObserver>>,
    locks: LockRegistry,
    clone_timeout: Duration,
    fetch_timeout: Duration,
    opened: Mutex<HashMap<String, OpenCell>>,
}

impl RepositoryManager {
    /// Creates a manager caching mirrors under `cache_dir`, using the gix transport.
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            fetch: false,
            proxy: ProxyConfig::default(),
            credentials: CredentialStore::default(),
            transport: Arc::new(GixTransport::new()),
            observer: None,
            locks: LockRegistry::new(),
            clone_timeout: DEFAULT_CLONE_TIMEOUT,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            opened: Mutex::new(HashMap::new()),
        }
    }

    /// Updates valid mirrors from their remotes instead of using them as-is.
    pub fn with_fetch(mut self, fetch: bool) -> Self {
        self.fetch = fetch;
        self
    }

    pub fn with_proxy(mut self, proxy: ProxyConfig) -> Self {
        self.proxy = proxy;
        self
    }

    pub fn with_credentials(mut self, credentials: CredentialStore) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn with_transport(mut self, transport: Arc<dyn MirrorTransport>) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn with_timeouts(mut self, clone: Duration, fetch: Duration) -> Self {
        self.clone_timeout = clone;
        self.fetch_timeout = fetch;
        self
    }

    /// Root of the mirror cache.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Mirror folder used for `remote`.
    pub fn cache_folder(&self, remote: &RemoteUrl) -> PathBuf {
        cache::cache_folder(&self.cache_dir, remote)
    }

    /// Opens the repository at `location`, cloning or fetching as needed.
    ///
    /// Repeated calls for the same location return the same handle.
    pub async fn resolve_repository(&self, location: &Location) -> Result<Arc<GitRepository>> {
        let cell = {
            let mut opened = self.opened.lock();
            opened.entry(location.key()).or_default().clone()
        };

        let mut first_error = None;
        let slot = &mut first_error;
        let outcome = cell
            .get_or_init(|| async move {
                match self.open_uncached(location).await {
                    Ok(repo) => Ok(Arc::new(repo)),
                    Err(e) => {
                        let message = e.to_string();
                        *slot = Some(e);
                        Err(message)
                    },
                }
            })
            .await;

        if let Some(e) = first_error {
            return Err(e);
        }
        match outcome {
            Ok(repo) => Ok(Arc::clone(repo)),
            Err(message) => Err(self.earlier_failure(location, message)),
        }
    }

    fn earlier_failure(&self, location: &Location, message: &str) -> AggregateError {
        match location {
            Location::Local(path) => AggregateError::NotAGitRepository { path: path.clone() },
            Location::Remote(remote) => AggregateError::network(
                remote.redacted(),
                "open",
                self.cache_folder(remote),
                format!("not retried after earlier failure: {}", message),
            ),
        }
    }

    async fn open_uncached(&self, location: &Location) -> Result<GitRepository> {
        match location {
            Location::Local(path) => self.open_local(path).await,
            Location::Remote(remote) => self.open_remote(remote).await,
        }
    }

    async fn open_local(&self, path: &Path) -> Result<GitRepository> {
        if !path.is_dir() {
            return Err(AggregateError::NotAGitRepository {
                path: path.to_path_buf(),
            });
        }

        let lock = self.locks.lock_for(path);
        let path = path.to_path_buf();
        debug!(path = %path.display(), "Using local repository in place");

        tokio::task::spawn_blocking(move || {
            let display = path.display().to_string();
            GitRepository::open(&path, display, None, true, lock)
        })
        .await
        .map_err(|e| AggregateError::git(format!("Open task failed: {}", e)))?
    }

    async fn open_remote(&self, remote: &RemoteUrl) -> Result<GitRepository> {
        let folder = self.cache_folder(remote);
        let lock = self.locks.lock_for(&folder);

        {
            let _guard = lock.lock().await;
            let action = CacheAction::decide(cache::is_valid(&folder), folder.is_dir(), self.fetch);
            debug!(url = %remote, path = %folder.display(), ?action, "Resolved cache action");

            match action {
                CacheAction::UseCached => {},
                CacheAction::Fetch => {
                    // Drop the marker first so an interrupted fetch forces a clone next run.
                    cache::invalidate(&folder)?;
                    self.run_network(GitOperation::Fetch, remote, &folder).await?;
                    cache::mark_valid(&folder)?;
                },
                CacheAction::Clone => {
                    cache::remove_folder(&folder)?;
                    self.run_network(GitOperation::Clone, remote, &folder).await?;
                    cache::mark_valid(&folder)?;
                },
            }
        }

        let display = remote.redacted();
        let web_url = remote.web_url();
        tokio::task::spawn_blocking(move || {
            GitRepository::open(&folder, display, web_url, false, lock)
        })
        .await
        .map_err(|e| AggregateError::git(format!("Open task failed: {}", e)))?
    }

    /// Credentials for `remote`: embedded in the URL, else from the store, else none.
    fn credentials_for(&self, remote: &RemoteUrl) -> Option<Credentials> {
        remote
            .embedded_credentials()
            .or_else(|| self.credentials.lookup(remote.as_url()).cloned())
    }

    async fn run_network(
        &self,
        operation: GitOperation,
        remote: &RemoteUrl,
        folder: &Path,
    ) -> Result<()> {
        let credentials = self.credentials_for(remote);
        let interrupt = Arc::new(AtomicBool::new(false));
        let request = TransportRequest {
            url: remote.authenticated(credentials.as_ref()),
            display_url: remote.redacted(),
            path: folder.to_path_buf(),
            proxy: self.proxy.proxy_for(remote.as_url()).map(String::from),
            interrupt: Arc::clone(&interrupt),
            observer: self.observer.clone(),
        };
        let limit = match operation {
            GitOperation::Clone => self.clone_timeout,
            GitOperation::Fetch => self.fetch_timeout,
        };

        info!(
            url = %request.display_url,
            path = %folder.display(),
            authenticated = credentials.is_some(),
            proxied = request.proxy.is_some(),
            "Starting {}",
            operation
        );

        let transport = Arc::clone(&self.transport);
        let task_request = request.clone();
        let mut handle = tokio::task::spawn_blocking(move || match operation {
            GitOperation::Clone => transport.clone_mirror(&task_request),
            GitOperation::Fetch => transport.fetch_mirror(&task_request),
        });

        let outcome = match tokio::time::timeout(limit, &mut handle).await {
            Ok(joined) => joined
                .map_err(|e| AggregateError::git(format!("{} task failed: {}", operation, e)))?,
            Err(_) => {
                interrupt.store(true, Ordering::SeqCst);
                // The blocking task must finish before the folder can be touched again.
                let _ = handle.await;
                warn!(url = %request.display_url, "{} timed out after {:?}", operation, limit);
                return Err(AggregateError::network(
                    request.display_url,
                    operation.as_str(),
                    folder,
                    format!("timed out after {:?}", limit),
                ));
            },
        };

        match outcome {
            Ok(()) => {
                info!(url = %request.display_url, "Finished {}", operation);
                Ok(())
            },
            Err(e) => {
                let reason = request.scrub(&e.to_string());
                warn!(url = %request.display_url, error = %reason, "{} failed", operation);
                Err(AggregateError::network(
                    request.display_url,
                    operation.as_str(),
                    folder,
                    reason,
                ))
            },
        }
    }
}

impl std::fmt::Debug for RepositoryManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepositoryManager")
            .field("cache_dir", &self.cache_dir)
            .field("fetch", &self.fetch)
            .field("clone_timeout", &self.clone_timeout)
            .field("fetch_timeout", &self.fetch_timeout)
            .finish()
    }
}
