use super::{Error, ObjectId, Result};
use chrono::{DateTime, FixedOffset, Local, Offset, TimeZone, Utc};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct Commit {
    tree: ObjectId,
    parents: Vec<ObjectId>,
    author: String,
    committer: String,
    message: String,
    timestamp: DateTime<FixedOffset>,
    committed_at: DateTime<FixedOffset>,
}

impl Commit {
    pub fn new<S: Into<String>>(
        tree: ObjectId,
        author: S,
        committer: S,
        message: S,
        timestamp: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            tree,
            parents: vec![],
            author: author.into(),
            committer: committer.into(),
            message: message.into(),
            timestamp,
            committed_at: timestamp,
        }
    }

    pub fn add_parent(&mut self, parent: ObjectId) {
        self.parents.push(parent);
    }

    pub fn tree(&self) -> ObjectId {
        self.tree
    }

    pub fn parents(&self) -> &[ObjectId] {
        &self.parents
    }

    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn committer(&self) -> &str {
        &self.committer
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Author time, which is also the commit's time.
    pub fn timestamp(&self) -> DateTime<FixedOffset> {
        self.timestamp
    }

    pub fn committed_at(&self) -> DateTime<FixedOffset> {
        self.committed_at
    }

    pub fn serialize(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }

    pub fn deserialize(content: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(content)
            .map_err(|err| Error::corrupt(format!("commit is not utf-8. {err}")))?;

        let mut tree: Option<ObjectId> = None;
        let mut parents = vec![];
        let mut author = String::new();
        let mut committer = String::new();
        let mut timestamp: Option<DateTime<FixedOffset>> = None;
        let mut committed_at: Option<DateTime<FixedOffset>> = None;

        let lines: Vec<&str> = text.split('\n').collect();
        let mut message_start = None;

        for (i, line) in lines.iter().enumerate() {
            if line.is_empty() {
                message_start = Some(i + 1);
                break;
            }

            let Some((key, value)) = line.split_once(' ') else {
                continue;
            };

            match key {
                "tree" => tree = Some(parse_id(key, value)?),
                "parent" => parents.push(parse_id(key, value)?),
                "author" => {
                    let (name, when) = parse_signature(value);
                    author = name;
                    timestamp = Some(when);
                }
                "committer" => {
                    let (name, when) = parse_signature(value);
                    committer = name;
                    committed_at = Some(when);
                }
                _ => {}
            }
        }

        let tree = tree.ok_or(Error::corrupt("commit has no tree line"))?;
        let message = match message_start {
            Some(start) if start < lines.len() => lines[start..].join("\n").trim().to_string(),
            _ => String::new(),
        };

        let timestamp = timestamp.unwrap_or_else(now);
        Ok(Self {
            tree,
            parents,
            author,
            committer,
            message,
            timestamp,
            committed_at: committed_at.unwrap_or(timestamp),
        })
    }
}

impl fmt::Display for Commit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "tree {}", self.tree)?;
        for parent in &self.parents {
            writeln!(f, "parent {parent}")?;
        }
        writeln!(f, "author {} {}", self.author, signature_time(&self.timestamp))?;
        writeln!(
            f,
            "committer {} {}",
            self.committer,
            signature_time(&self.committed_at)
        )?;
        writeln!(f)?;
        writeln!(f, "{}", self.message)
    }
}

fn signature_time(when: &DateTime<FixedOffset>) -> String {
    format!("{} {}", when.timestamp(), when.format("%z"))
}

/// The current local time, truncated to whole seconds.
pub fn now() -> DateTime<FixedOffset> {
    let now = Local::now().fixed_offset();
    now.timezone()
        .timestamp_opt(now.timestamp(), 0)
        .single()
        .unwrap_or(now)
}

fn parse_id(key: &str, value: &str) -> Result<ObjectId> {
    value
        .parse()
        .map_err(|err| Error::corrupt(format!("invalid {key} id in commit. {err}")))
}

/// Splits `"<name> <unix-seconds> <+HHMM>"` into the name and the time.
///
/// Values with fewer than three tokens are all name and stamped with the
/// current time. An unreadable seconds token also falls back to now, and an
/// unreadable offset to UTC.
fn parse_signature(value: &str) -> (String, DateTime<FixedOffset>) {
    let tokens: Vec<&str> = value.split_whitespace().collect();
    if tokens.len() < 3 {
        return (value.to_string(), now());
    }

    let (name, tail) = tokens.split_at(tokens.len() - 2);
    let name = name.join(" ");
    let offset = parse_offset(tail[1]).unwrap_or_else(|| Utc.fix());

    let when = tail[0]
        .parse::<i64>()
        .ok()
        .and_then(|secs| offset.timestamp_opt(secs, 0).single())
        .unwrap_or_else(now);

    (name, when)
}

fn parse_offset(token: &str) -> Option<FixedOffset> {
    let (sign, digits) = match token.as_bytes().first()? {
        b'+' => (1, &token[1..]),
        b'-' => (-1, &token[1..]),
        _ => return None,
    };
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
