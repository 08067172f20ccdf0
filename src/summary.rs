//! The [`Summary`] of a post: the `{title, date, link}` triple that every
//! listing (tag pages, archives, index pages) is made of.

use crate::link::entry_link;
use crate::post::Post;

#[derive(Clone, Debug, PartialEq)]
pub struct Summary {
    pub title: String,
    pub date: String,
    pub link: String,
}

impl Summary {
    /// Summarizes `post`, linking it under `site_url`.
    pub fn new(post: &Post, site_url: &str) -> Summary {
        Summary {
            title: post.title.clone(),
            date: post.date.to_string(),
            link: entry_link(site_url, &post.dir, &post.slug),
        }
    }
}
