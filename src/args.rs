use super::{Error, Result};
use std::collections::{HashMap, HashSet};

/// Declares which switches a subcommand understands before parsing.
#[derive(Debug, Default)]
pub(crate) struct ArgsBuilder {
    flags: Vec<String>,
    options: Vec<String>,
}

impl ArgsBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// A switch without a value, e.g. `--name-only`.
    pub(crate) fn flag(mut self, name: &str) -> Self {
        self.flags.push(name.into());
        self
    }

    /// A switch followed by one value, e.g. `-m <message>`.
    pub(crate) fn option(mut self, name: &str) -> Self {
        self.options.push(name.into());
        self
    }

    pub(crate) fn build(self, args: &[String]) -> Result<Args> {
        let mut parsed = Args::default();
        let mut iter = args.iter();
        let mut only_positionals = false;

        while let Some(arg) = iter.next() {
            if only_positionals {
                parsed.positionals.push(arg.clone());
            } else if arg == "--" {
                only_positionals = true;
            } else if self.flags.contains(arg) {
                parsed.flags.insert(arg.clone());
            } else if self.options.contains(arg) {
                let value = iter
                    .next()
                    .ok_or_else(|| Error::InvalidArgs(format!("{arg} requires a value")))?;
                parsed.options.insert(arg.clone(), value.clone());
            } else if arg.starts_with('-') && arg.len() > 1 {
                return Err(Error::InvalidArgs(format!("unknown option {arg}")));
            } else {
                parsed.positionals.push(arg.clone());
            }
        }

        Ok(parsed)
    }
}

#[derive(Debug, Default)]
pub(crate) struct Args {
    flags: HashSet<String>,
    options: HashMap<String, String>,
    positionals: Vec<String>,
}

impl Args {
    pub(crate) fn builder() -> ArgsBuilder {
        ArgsBuilder::new()
    }

    pub(crate) fn flag(&self, key: &str) -> bool {
        self.flags.contains(key)
    }

    pub(crate) fn value(&self, key: &str) -> Option<String> {
        self.options.get(key).cloned()
    }

    pub(crate) fn positionals(&self) -> &[String] {
        &self.positionals
    }

    /// The positional at `pos`, named `name` in the error when absent.
    pub(crate) fn required(&self, pos: usize, name: &str) -> Result<String> {
        self.positionals
            .get(pos)
            .cloned()
            .ok_or_else(|| Error::InvalidArgs(format!("argument <{name}> is required")))
    }
}
