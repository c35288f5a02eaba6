use super::{Repository, Result};
use std::path::Path;

pub(crate) fn run<P: AsRef<Path>>(repo: &Repository, path: P) -> Result<()> {
    let id = repo.hash_file(path)?;
    println!("{id}");
    Ok(())
}
