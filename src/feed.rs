//! Support for creating Atom feeds from a list of posts.

use crate::link::{entry_link, site_root};
use crate::post::Post;
use atom_syndication::{Content, Entry, Error as AtomError, Feed, Link, Person};
use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// The number of characters of a post's contents that make it into the
/// feed.
pub const EXCERPT_LENGTH: usize = 100;

const EXCERPT_SUFFIX: &str = "...";

/// Renders the posts of selected templates into an Atom feed.
pub struct FeedPresenter {
    /// The feed's title.
    pub title: String,

    /// The site URL. The feed's alternate link points here; its id and self
    /// link are the site URL with a trailing slash.
    pub site_url: String,

    /// The name every entry is attributed to.
    pub author: String,

    /// The offset at which post dates are interpreted.
    pub offset: FixedOffset,

    /// Only posts whose template is listed here become entries.
    pub templates: Vec<String>,
}

impl FeedPresenter {
    /// Builds the feed from `posts` and writes it to `target`, stamping it
    /// with the current time.
    pub fn output(&self, posts: &[&Post], target: &Path) -> Result<()> {
        let updated = self.offset.from_utc_datetime(&Utc::now().naive_utc());
        let feed = self.build_feed(posts, updated)?;
        let file = File::create(target)?;
        feed.write_to(BufWriter::new(file))?.flush()?;
        tracing::info!(
            path = %target.display(),
            entries = feed.entries().len(),
            "wrote feed"
        );
        Ok(())
    }

    /// Builds the feed with an explicit `updated` timestamp. Entries are
    /// ordered most recent first; there is no cap on their number.
    pub fn build_feed(
        &self,
        posts: &[&Post],
        updated: DateTime<FixedOffset>,
    ) -> Result<Feed> {
        let root = site_root(&self.site_url);

        let mut feed = Feed::default();
        feed.set_title(self.title.clone());
        feed.set_links(vec![
            link(format!("{}/", root), "self", None),
            link(root.to_owned(), "alternate", None),
        ]);
        feed.set_id(format!("{}/", root));
        feed.set_updated(updated);
        feed.set_entries(self.entries(posts)?);
        Ok(feed)
    }

    fn entries(&self, posts: &[&Post]) -> Result<Vec<Entry>> {
        let mut posts: Vec<&Post> = posts
            .iter()
            .copied()
            .filter(|p| self.templates.iter().any(|t| *t == p.template))
            .collect();
        posts.sort_by(|a, b| b.date.timestamp().cmp(&a.date.timestamp()));

        let mut entries = Vec::with_capacity(posts.len());
        for post in posts {
            // Post dates carry no zone; they are wall-clock times at the
            // configured offset.
            let date = self
                .offset
                .from_local_datetime(&post.date.timestamp())
                .single()
                .ok_or_else(|| Error::UnrepresentableDate(post.date.to_string()))?;
            let href = entry_link(&self.site_url, &post.dir, &post.slug);

            let mut author = Person::default();
            author.set_name(self.author.clone());

            let mut content = Content::default();
            content.set_content_type(Some(String::from("html")));
            content.set_value(Some(excerpt(&post.contents)));

            let mut entry = Entry::default();
            entry.set_title(post.title.clone());
            entry.set_links(vec![link(
                href.clone(),
                "alternate",
                Some("text/html"),
            )]);
            entry.set_id(href);
            entry.set_published(Some(date));
            entry.set_updated(date);
            entry.set_authors(vec![author]);
            entry.set_content(Some(content));
            entries.push(entry);
        }
        Ok(entries)
    }
}

fn link(href: String, rel: &str, mime_type: Option<&str>) -> Link {
    let mut link = Link::default();
    link.set_href(href);
    link.set_rel(rel);
    link.set_mime_type(mime_type.map(str::to_owned));
    link
}

/// The first [`EXCERPT_LENGTH`] characters of `contents` followed by `...`,
/// whether or not anything was cut.
pub fn excerpt(contents: &str) -> String {
    let mut excerpt: String = contents.chars().take(EXCERPT_LENGTH).collect();
    excerpt.push_str(EXCERPT_SUFFIX);
    excerpt
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a problem creating a feed. Variants inlude I/O, Atom, and
/// date-time issues.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when there is a generic I/O error.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// Returned when there is an Atom-related error.
    #[error(transparent)]
    Atom(#[from] AtomError),

    /// Returned when a post's date doesn't exist at the feed's offset.
    #[error("post date `{0}` can't be represented at the feed offset")]
    UnrepresentableDate(String),
}
