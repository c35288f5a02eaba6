use super::{Repository, Result};
use crate::config::Identity;

pub(crate) fn run(repo: &Repository, message: &str) -> Result<()> {
    let (author, committer) = Identity::from_env();
    let summary = repo.commit(&author.to_string(), &committer.to_string(), message)?;
    println!("{summary}");
    Ok(())
}
