mod args;
mod cmd;
mod codec;
mod error;
mod hash;
mod lock;
mod tree;

pub mod config;
pub mod index;
pub mod object;
pub mod refs;
pub mod repository;
pub mod storage;

use std::time::Duration;

pub const GIT_DIR: &str = ".git";
pub const OBJECTS_DIR: &str = "objects";
pub const REFS_DIR: &str = "refs";
pub const HEADS_DIR: &str = "refs/heads";
pub const TAGS_DIR: &str = "refs/tags";
pub const INDEX_FILE: &str = "index";
pub const HEAD: &str = "HEAD";
pub const DEFAULT_BRANCH: &str = "refs/heads/main";
pub const LOCK_FILE: &str = "minigit.lock";
pub const LOCK_TIMEOUT: Duration = Duration::from_secs(5);

use args::Args;
pub use cmd::{CatMode, Command};
pub use codec::{compress, decode, decompress, digest, encode};
pub use error::Error;
pub use hash::{ObjectId, SHA1_HASH_SIZE, SHA1_HEX_SIZE};
pub use lock::RepoLock;
pub use repository::{find_git_dir, CommitSummary, Repository};
pub use tree::TreeBuilder;
pub type Result<T> = std::result::Result<T, Error>;
