use super::{Repository, Result};

pub(crate) fn run(repo: &Repository) -> Result<()> {
    let id = repo.write_tree()?;
    println!("{id}");
    Ok(())
}
