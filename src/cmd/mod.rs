mod add;
mod cat_file;
mod commit;
mod hash_object;
mod init;
mod ls_tree;
mod write_tree;

use super::{Args, Error, Repository, Result};
use std::env;
use std::path::{Path, PathBuf};

pub use cat_file::CatMode;

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Init { dir: Option<String> },
    HashObject { path: String },
    CatFile { id: String, mode: CatMode },
    Add { paths: Vec<String> },
    Commit { message: String },
    WriteTree,
    LsTree { id: String, name_only: bool },
}

impl Command {
    pub fn new(args: &[String]) -> Result<Self> {
        let (name, rest) = args
            .split_first()
            .ok_or_else(|| Error::InvalidArgs(usage()))?;

        let cmd = match name.as_str() {
            "init" => {
                let args = Args::builder().build(rest)?;
                Self::Init {
                    dir: args.positionals().first().cloned(),
                }
            }
            "hash-object" => {
                let args = Args::builder().flag("-w").build(rest)?;
                Self::HashObject {
                    path: args.required(0, "file")?,
                }
            }
            "cat-file" => {
                let args = Args::builder().flag("-p").flag("-t").flag("-s").build(rest)?;
                let mode = if args.flag("-t") {
                    CatMode::Type
                } else if args.flag("-s") {
                    CatMode::Size
                } else {
                    CatMode::Pretty
                };
                Self::CatFile {
                    id: args.required(0, "object")?,
                    mode,
                }
            }
            "add" => {
                let args = Args::builder().build(rest)?;
                if args.positionals().is_empty() {
                    return Err(Error::InvalidArgs("argument <file> is required".into()));
                }
                Self::Add {
                    paths: args.positionals().to_vec(),
                }
            }
            "commit" => {
                let args = Args::builder().option("-m").build(rest)?;
                let message = match args.value("-m") {
                    Some(message) => message,
                    None => args.required(0, "message")?,
                };
                Self::Commit { message }
            }
            "write-tree" => Self::WriteTree,
            "ls-tree" => {
                let args = Args::builder().flag("--name-only").build(rest)?;
                Self::LsTree {
                    id: args.required(0, "tree")?,
                    name_only: args.flag("--name-only"),
                }
            }
            other => {
                return Err(Error::InvalidArgs(format!(
                    "unknown command {other:?}\n{}",
                    usage()
                )))
            }
        };
        Ok(cmd)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Init { .. } => "init",
            Self::HashObject { .. } => "hash-object",
            Self::CatFile { .. } => "cat-file",
            Self::Add { .. } => "add",
            Self::Commit { .. } => "commit",
            Self::WriteTree => "write-tree",
            Self::LsTree { .. } => "ls-tree",
        }
    }

    pub fn run(self) -> Result<()> {
        let cwd = current_dir()?;
        match self {
            Self::Init { dir } => init::run(dir.map_or(cwd.clone(), |d| cwd.join(d))),
            Self::HashObject { path } => hash_object::run(&discover(&cwd)?, cwd.join(path)),
            Self::CatFile { id, mode } => cat_file::run(&discover(&cwd)?, &id, mode),
            Self::Add { paths } => {
                let paths = paths.iter().map(|p| cwd.join(p)).collect::<Vec<_>>();
                add::run(&discover(&cwd)?, &paths)
            }
            Self::Commit { message } => commit::run(&discover(&cwd)?, &message),
            Self::WriteTree => write_tree::run(&discover(&cwd)?),
            Self::LsTree { id, name_only } => ls_tree::run(&discover(&cwd)?, &id, name_only),
        }
    }
}

fn current_dir() -> Result<PathBuf> {
    env::current_dir().map_err(super::error::io_at("."))
}

fn discover(cwd: &Path) -> Result<Repository> {
    Repository::discover(cwd)
}

fn usage() -> String {
    [
        "usage: minigit <command> [<args>]",
        "   init [<dir>]                  create an empty repository",
        "   hash-object <file>            store a file as a blob and print its id",
        "   cat-file [-p|-t|-s] <object>  show an object's content, type or size",
        "   add <file>...                 stage files",
        "   commit [-m] <message>         record the staged files on the current branch",
        "   write-tree                    store the staged files as a tree",
        "   ls-tree [--name-only] <tree>  list a tree's entries",
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(values: &[&str]) -> Result<Command> {
        let args: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        Command::new(&args)
    }

    #[test]
    fn it_parses_commit_message_forms() {
        assert_eq!(
            parse(&["commit", "first"]).unwrap(),
            Command::Commit {
                message: "first".into()
            }
        );
        assert_eq!(
            parse(&["commit", "-m", "second one"]).unwrap(),
            Command::Commit {
                message: "second one".into()
            }
        );
        assert!(matches!(parse(&["commit"]), Err(Error::InvalidArgs(_))));
    }

    #[test]
    fn it_parses_cat_file_modes() {
        let id = "e88f7a929cd70b0274c4ea33b209c97fa845fdbc";
        assert_eq!(
            parse(&["cat-file", id]).unwrap(),
            Command::CatFile {
                id: id.into(),
                mode: CatMode::Pretty
            }
        );
        assert_eq!(
            parse(&["cat-file", "-t", id]).unwrap(),
            Command::CatFile {
                id: id.into(),
                mode: CatMode::Type
            }
        );
    }

    #[test]
    fn it_parses_multiple_add_paths() {
        assert_eq!(
            parse(&["add", "a.txt", "dir/b.txt"]).unwrap(),
            Command::Add {
                paths: vec!["a.txt".into(), "dir/b.txt".into()]
            }
        );
        assert!(parse(&["add"]).is_err());
    }

    #[test]
    fn it_rejects_unknown_commands() {
        assert!(matches!(parse(&["push"]), Err(Error::InvalidArgs(_))));
        assert!(matches!(parse(&[]), Err(Error::InvalidArgs(_))));
    }
}
