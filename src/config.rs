use std::env;
use std::fmt;

/// A `name <email>` signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

impl Identity {
    pub fn new<S: Into<String>>(name: S, email: S) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    /// Author and committer from the process environment.
    pub fn from_env() -> (Self, Self) {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Author from `GIT_AUTHOR_NAME`/`GIT_AUTHOR_EMAIL`, else `$USER@localhost`.
    /// Committer from `GIT_COMMITTER_*`, else the author.
    pub fn from_lookup<F>(lookup: F) -> (Self, Self)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let author = match (var("GIT_AUTHOR_NAME"), var("GIT_AUTHOR_EMAIL")) {
            (Some(name), Some(email)) => Self::new(name, email),
            _ => {
                let name = var("USER").unwrap_or_else(|| "Unknown".into());
                let email = format!("{name}@localhost");
                Self::new(name, email)
            }
        };

        let committer = match (var("GIT_COMMITTER_NAME"), var("GIT_COMMITTER_EMAIL")) {
            (Some(name), Some(email)) => Self::new(name, email),
            _ => author.clone(),
        };

        (author, committer)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}
