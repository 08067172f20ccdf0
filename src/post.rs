//! Defines the [`Post`] record, the [`PostDate`] ordering key and the
//! [`slugify`] function that derives a post's output file name from its source
//! file name.

use chrono::NaiveDateTime;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// The canonical format of a post's `Date` field.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const MARKDOWN_EXTENSION: &str = "md";

/// A single piece of published content. Posts are created once, during
/// ingestion, and are never mutated afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct Post {
    /// The post's title. Titles are unique within a
    /// [`crate::repo::PostRepository`].
    pub title: String,

    /// The HTML body of the post.
    pub contents: String,

    /// The output file stem, derived from the source file name via
    /// [`slugify`].
    pub slug: String,

    /// The post's classification (e.g., `Post`, `Essay`, `Page`, `Index`).
    /// It selects both the presenters that include the post and the template
    /// that renders it.
    pub template: String,

    /// The publication date.
    pub date: PostDate,

    /// The post's tags, in source order.
    pub tags: Vec<String>,

    /// The directory, relative to the site root, that the post's page is
    /// published in. Empty for the root.
    pub dir: String,
}

/// A post date in the canonical `YYYY-MM-DD HH:MM:SS` format. Keeps the
/// original text for display and the parsed timestamp for ordering, so posts
/// are never sorted lexicographically.
#[derive(Clone, Debug)]
pub struct PostDate {
    raw: String,
    timestamp: NaiveDateTime,
}

impl PostDate {
    /// The date exactly as it appeared in the source.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The parsed timestamp.
    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    /// The four-character year prefix of the date.
    pub fn year(&self) -> &str {
        // the canonical format guarantees four ASCII digits up front
        &self.raw[..4]
    }
}

impl FromStr for PostDate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let raw = s.trim();
        match NaiveDateTime::parse_from_str(raw, DATE_FORMAT) {
            Ok(timestamp) => Ok(PostDate {
                raw: raw.to_owned(),
                timestamp,
            }),
            Err(err) => Err(Error::InvalidDate {
                date: raw.to_owned(),
                err,
            }),
        }
    }
}

impl PartialEq for PostDate {
    fn eq(&self, other: &Self) -> bool {
        self.timestamp == other.timestamp
    }
}

impl fmt::Display for PostDate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.raw.fmt(f)
    }
}

/// Derives a slug from a source file path: directories and the `.md`
/// extension are dropped and every character other than an ASCII letter,
/// digit or `-` becomes `-`. The result depends on the file name only.
///
/// ```
/// # use wintersun::post::slugify;
/// # use std::path::Path;
/// assert_eq!("post1-about---things", slugify(Path::new("posts/post1_about_@_things.md")));
/// ```
pub fn slugify(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_default();
    let stem = match path.extension() {
        Some(ext) if ext == MARKDOWN_EXTENSION => {
            &file_name[..file_name.len() - MARKDOWN_EXTENSION.len() - 1]
        }
        _ => &file_name[..],
    };
    slug(stem)
}

/// Maps every character of `name` other than an ASCII letter, digit or `-`
/// to `-`, so the result is safe as a file name.
pub fn slug(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '-' })
        .collect()
}

/// The result of a fallible post operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem building a [`Post`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when a date isn't in the canonical `YYYY-MM-DD HH:MM:SS`
    /// format.
    #[error("invalid date `{date}` (expected YYYY-MM-DD HH:MM:SS): {err}")]
    InvalidDate {
        date: String,
        #[source]
        err: chrono::ParseError,
    },
}
