use super::{Repository, Result};
use std::path::Path;

pub(crate) fn run<P: AsRef<Path>>(root: P) -> Result<()> {
    let repo = Repository::init(root)?;
    println!("Initialized empty repository in {}", repo.git_dir().display());
    Ok(())
}
