//! The [`ArchivePresenter`] writes a single chronological index for one
//! category of posts, optionally grouped by year.

use crate::post::Post;
use crate::render::{Error as RenderError, TemplateRenderer};
use crate::summary::Summary;
use crate::value;
use gtmpl_value::Value;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

/// The template archives are rendered with.
pub const ARCHIVE_TEMPLATE: &str = "archive.html";

/// A run of consecutive summaries sharing a year.
#[derive(Clone, Debug, PartialEq)]
pub struct YearGroup {
    pub year: String,
    pub items: Vec<Summary>,
}

/// The body of an archive page.
#[derive(Clone, Debug, PartialEq)]
pub enum Archive {
    Flat(Vec<Summary>),
    Grouped(Vec<YearGroup>),
}

/// Writes `{category}s.html` archives.
pub struct ArchivePresenter<'a> {
    pub renderer: &'a TemplateRenderer,
    pub site_url: &'a str,
}

impl ArchivePresenter<'_> {
    /// Summarizes `posts` in their given order. The presenter never sorts;
    /// pass date-ordered posts to get one group per year.
    pub fn archive(&self, posts: &[&Post], grouped: bool) -> Archive {
        let summaries: Vec<Summary> = posts
            .iter()
            .map(|p| Summary::new(p, self.site_url))
            .collect();
        if grouped {
            Archive::Grouped(group_by_year(summaries))
        } else {
            Archive::Flat(summaries)
        }
    }

    /// Writes the archive for the posts of `template` into `target_dir`,
    /// returning the path of the written file.
    pub fn output(
        &self,
        posts: &[&Post],
        template: &str,
        grouped: bool,
        target_dir: &Path,
    ) -> Result<PathBuf> {
        let category = template.to_lowercase();
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("category".to_owned(), (&category).into());
        m.insert("grouped".to_owned(), Value::Bool(grouped));
        match self.archive(posts, grouped) {
            Archive::Flat(items) => {
                m.insert("items".to_owned(), value::summaries(&items));
            }
            Archive::Grouped(groups) => {
                m.insert(
                    "groups".to_owned(),
                    Value::Array(groups.iter().map(Value::from).collect()),
                );
            }
        }

        std::fs::create_dir_all(target_dir).map_err(|err| Error::CreateDir {
            path: target_dir.to_owned(),
            err,
        })?;
        // `Post` is archived in `posts.html`
        let file_path = target_dir.join(format!("{}s.html", category));
        self.renderer
            .render_to(ARCHIVE_TEMPLATE, Value::Object(m), &file_path)?;
        tracing::info!(
            category = %category,
            path = %file_path.display(),
            "wrote archive"
        );
        Ok(file_path)
    }
}

/// Partitions summaries into runs of equal year (the first four characters
/// of the date). Order is preserved: a year that shows up again after a
/// different one starts a new group.
pub fn group_by_year(summaries: Vec<Summary>) -> Vec<YearGroup> {
    let mut groups: Vec<YearGroup> = Vec::new();
    for summary in summaries {
        let year: String = summary.date.chars().take(4).collect();
        match groups.last_mut() {
            Some(group) if group.year == year => group.items.push(summary),
            _ => groups.push(YearGroup {
                year,
                items: vec![summary],
            }),
        }
    }
    groups
}

impl From<&YearGroup> for Value {
    fn from(group: &YearGroup) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("year".to_owned(), (&group.year).into());
        m.insert("items".to_owned(), value::summaries(&group.items));
        Value::Object(m)
    }
}

/// The result of a fallible archive operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error writing an archive.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when the target directory can't be created.
    #[error("creating directory '{}': {err}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        err: io::Error,
    },

    /// An error during templating or writing the archive.
    #[error(transparent)]
    Render(#[from] RenderError),
}
