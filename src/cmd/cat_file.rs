use super::{Error, Repository, Result};
use crate::{object::Object, ObjectId};
use std::io::{self, Write};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CatMode {
    Pretty,
    Type,
    Size,
}

pub(crate) fn run(repo: &Repository, id: &str, mode: CatMode) -> Result<()> {
    let id: ObjectId = id.parse()?;

    match mode {
        CatMode::Type => {
            let (kind, _) = repo.objects().read_raw(&id)?;
            println!("{kind}");
        }
        CatMode::Size => {
            let (_, content) = repo.objects().read_raw(&id)?;
            println!("{}", content.len());
        }
        CatMode::Pretty => match repo.read_object(&id)? {
            // Blob bytes go out untouched; they need not be utf-8.
            Object::Blob(blob) => {
                let mut stdout = io::stdout().lock();
                stdout
                    .write_all(blob.as_ref())
                    .and_then(|_| stdout.flush())
                    .map_err(|source| Error::Io {
                        path: "<stdout>".into(),
                        source,
                    })?;
            }
            obj => print!("{obj}"),
        },
    }
    Ok(())
}
