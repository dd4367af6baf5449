//! Git repository access.
//!
//! Remote repositories are mirrored as bare clones under the cache dir and
//! read straight from their object stores; local repositories are read in place.

mod access;
mod cache;
mod credentials;
mod git_ops;
mod location;
mod locks;
mod progress;
mod proxy;
mod refs;
mod transport;

pub use access::{DEFAULT_CLONE_TIMEOUT, DEFAULT_FETCH_TIMEOUT, RepositoryManager};
pub use cache::{
    CONTENT_CACHE_FOLDER, CacheAction, VALID_MARKER, cache_folder, default_cache_dir, invalidate,
    is_valid, mark_valid,
};
pub use credentials::{CredentialStore, Credentials};
pub use git_ops::{GitRepository, TreeEntry};
pub use location::{Location, RemoteUrl};
pub use locks::LockRegistry;
pub use progress::{FetchPhase, GitOperation, ProgressObserver};
pub use proxy::ProxyConfig;
pub use refs::{GitRef, validate_name};
pub use transport::{GixTransport, MIRROR_REFSPEC, MirrorTransport, TransportRequest};
