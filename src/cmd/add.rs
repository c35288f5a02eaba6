use super::{Repository, Result};
use std::path::PathBuf;

pub(crate) fn run(repo: &Repository, paths: &[PathBuf]) -> Result<()> {
    for path in paths {
        repo.stage_path(path)?;
    }
    Ok(())
}
