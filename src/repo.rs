//! The in-memory [`PostRepository`]. The repository owns the identity rules
//! for posts (titles are unique), their ordering (by parsed date) and their
//! classification (by template). Presenters only ever read from it.

use crate::post::{Post, PostDate};
use std::collections::HashMap;
use std::str::FromStr;

/// The direction of a date-ordered query. Parses from `"asc"` and `"desc"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Order {
    /// Oldest first.
    Asc,

    /// Most recent first.
    Desc,
}

impl Default for Order {
    fn default() -> Self {
        Order::Desc
    }
}

impl FromStr for Order {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "asc" => Ok(Order::Asc),
            "desc" => Ok(Order::Desc),
            _ => Err(Error::InvalidOrder(s.to_owned())),
        }
    }
}

/// Holds every [`Post`] of a single build in insertion order, indexed by
/// title.
#[derive(Default)]
pub struct PostRepository {
    posts: Vec<Post>,
    titles: HashMap<String, usize>,
}

impl PostRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `post` to the repository. Fails with [`Error::DuplicatePost`] if
    /// a post with the same title already exists, in which case the existing
    /// post is left untouched.
    pub fn insert(&mut self, post: Post) -> Result<()> {
        if let Some(existing) = self.find(&post.title) {
            return Err(Error::DuplicatePost {
                title: post.title,
                existing: existing.date.clone(),
                incoming: post.date,
            });
        }

        tracing::debug!(title = %post.title, template = %post.template, "inserted post");
        self.titles.insert(post.title.clone(), self.posts.len());
        self.posts.push(post);
        Ok(())
    }

    /// Looks up a post by title.
    pub fn find(&self, title: &str) -> Option<&Post> {
        self.titles.get(title).map(|&i| &self.posts[i])
    }

    /// Looks up a post by title, failing with [`Error::NotFound`] if there is
    /// no such post.
    pub fn get(&self, title: &str) -> Result<&Post> {
        self.find(title)
            .ok_or_else(|| Error::NotFound(title.to_owned()))
    }

    /// Returns every post ordered by date. The sort is stable, so posts with
    /// equal dates keep their insertion order in either direction.
    pub fn all(&self, order: Order) -> Vec<&Post> {
        let mut posts: Vec<&Post> = self.posts.iter().collect();
        match order {
            Order::Asc => posts.sort_by_key(|p| p.date.timestamp()),
            Order::Desc => posts.sort_by(|a, b| {
                b.date.timestamp().cmp(&a.date.timestamp())
            }),
        }
        posts
    }

    /// Returns, in insertion order, the posts whose template is exactly
    /// `template`.
    pub fn all_by_template(&self, template: &str) -> Vec<&Post> {
        self.posts
            .iter()
            .filter(|p| p.template == template)
            .collect()
    }

    /// The number of posts in the repository.
    pub fn count(&self) -> usize {
        self.posts.len()
    }
}

/// The result of a fallible repository operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a failed repository operation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when no post has the requested title.
    #[error("post \"{0}\" not found")]
    NotFound(String),

    /// Returned when inserting a post whose title is already taken.
    #[error(
        "duplicate post \"{title}\": existing post dated {existing}, \
         incoming post dated {incoming}"
    )]
    DuplicatePost {
        title: String,
        existing: PostDate,
        incoming: PostDate,
    },

    /// Returned when a query is made with an unrecognized sort order.
    #[error("invalid sorting order \"{0}\" (expected \"asc\" or \"desc\")")]
    InvalidOrder(String),
}
