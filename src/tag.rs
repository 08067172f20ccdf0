//! The [`TagPresenter`] writes one page per tag, listing every post that
//! carries it.

use crate::post::{slug, Post};
use crate::render::{Error as RenderError, TemplateRenderer};
use crate::summary::Summary;
use crate::value;
use gtmpl_value::Value;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

/// The template tag pages are rendered with.
pub const TAG_TEMPLATE: &str = "tag.html";

/// The posts carrying one tag.
#[derive(Clone, Debug, PartialEq)]
pub struct TagIndex {
    pub tag: String,
    pub items: Vec<Summary>,
}

/// Indexes posts by tag and writes a `{tag}.html` page for each tag.
pub struct TagPresenter<'a> {
    pub renderer: &'a TemplateRenderer,
    pub site_url: &'a str,
}

impl TagPresenter<'_> {
    /// Builds the inverted index. Tags appear in the order they are first
    /// seen and each tag lists its posts in the order of `posts`. Every post
    /// must have at least one tag.
    pub fn index(&self, posts: &[&Post]) -> Result<Vec<TagIndex>> {
        let mut indices: Vec<TagIndex> = Vec::new();
        let mut positions: HashMap<&str, usize> = HashMap::new();

        for post in posts {
            if post.tags.is_empty() {
                return Err(Error::IncompletePost(post.title.clone()));
            }
            let summary = Summary::new(post, self.site_url);
            for tag in post.tags.iter() {
                match positions.get(tag.as_str()) {
                    Some(&i) => indices[i].items.push(summary.clone()),
                    None => {
                        positions.insert(tag, indices.len());
                        indices.push(TagIndex {
                            tag: tag.clone(),
                            items: vec![summary.clone()],
                        });
                    }
                }
            }
        }
        Ok(indices)
    }

    /// Indexes `posts` and writes each tag page into `target_dir`. Page names
    /// are slugged, so `c/c++` is written to `c-c--.html`.
    pub fn output(&self, posts: &[&Post], target_dir: &Path) -> Result<()> {
        let indices = self.index(posts)?;
        std::fs::create_dir_all(target_dir).map_err(|err| Error::CreateDir {
            path: target_dir.to_owned(),
            err,
        })?;

        for index in indices {
            let mut m: HashMap<String, Value> = HashMap::new();
            m.insert("tag".to_owned(), (&index.tag).into());
            m.insert("tagged_items".to_owned(), value::summaries(&index.items));

            let file_path = target_dir.join(format!("{}.html", slug(&index.tag)));
            self.renderer
                .render_to(TAG_TEMPLATE, Value::Object(m), &file_path)?;
            tracing::info!(tag = %index.tag, path = %file_path.display(), "wrote tag page");
        }
        Ok(())
    }
}

/// The result of a fallible tag-page operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error writing tag pages.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when a post without tags is submitted for tag indexing.
    #[error("post \"{0}\" is missing tags")]
    IncompletePost(String),

    /// Returned when the target directory can't be created.
    #[error("creating directory '{}': {err}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        err: io::Error,
    },

    /// An error during templating or writing a tag page.
    #[error(transparent)]
    Render(#[from] RenderError),
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn post(title: &str, date: &str, tags: &[&str]) -> Post {
        Post {
            title: title.to_owned(),
            contents: String::from("Lorem ipsum"),
            slug: title.to_lowercase(),
            template: String::from("Post"),
            date: date.parse().unwrap(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            dir: String::from("posts"),
        }
    }

    fn summary(title: &str, date: &str) -> Summary {
        Summary {
            title: title.to_owned(),
            date: date.to_owned(),
            link: format!("http://example.com/posts/{}.html", title.to_lowercase()),
        }
    }

    fn fixture() -> (tempfile::TempDir, TemplateRenderer) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(TAG_TEMPLATE),
            "<h1>{{.tag}}</h1>{{range .tagged_items}}<a href=\"{{.link}}\">{{.title}}</a>{{end}}",
        )
        .unwrap();
        let renderer = TemplateRenderer::new(dir.path());
        (dir, renderer)
    }

    #[test]
    fn test_index_groups_by_tag_in_input_order() -> Result<()> {
        let (_dir, renderer) = fixture();
        let presenter = TagPresenter {
            renderer: &renderer,
            site_url: "http://example.com",
        };
        let first = post("First", "2018-01-01 00:00:00", &["a", "b"]);
        let second = post("Second", "2019-01-01 00:00:00", &["b"]);

        assert_eq!(
            vec![
                TagIndex {
                    tag: String::from("a"),
                    items: vec![summary("First", "2018-01-01 00:00:00")],
                },
                TagIndex {
                    tag: String::from("b"),
                    items: vec![
                        summary("First", "2018-01-01 00:00:00"),
                        summary("Second", "2019-01-01 00:00:00"),
                    ],
                },
            ],
            presenter.index(&[&first, &second])?
        );
        Ok(())
    }

    #[test]
    fn test_output_writes_page_per_tag() -> Result<()> {
        let (_dir, renderer) = fixture();
        let presenter = TagPresenter {
            renderer: &renderer,
            site_url: "http://example.com",
        };
        let out = tempfile::tempdir().unwrap();
        let target = out.path().join("tags");
        let tagged = post("Tagged", "2018-01-01 00:00:00", &["a", "b"]);

        presenter.output(&[&tagged], &target)?;

        for tag in &["a", "b"] {
            let html =
                fs::read_to_string(target.join(format!("{}.html", tag))).unwrap();
            assert!(html.contains("Tagged"), "{}", html);
            assert!(html.contains("http://example.com/posts/tagged.html"));
        }
        assert_eq!(2, fs::read_dir(&target).unwrap().count());
        Ok(())
    }

    #[test]
    fn test_tag_file_names_stay_in_target_dir() -> Result<()> {
        let (_dir, renderer) = fixture();
        let presenter = TagPresenter {
            renderer: &renderer,
            site_url: "http://example.com",
        };
        let out = tempfile::tempdir().unwrap();
        let target = out.path().join("tags");
        let tagged = post("Tagged", "2018-01-01 00:00:00", &["c/c++", "../x"]);

        presenter.output(&[&tagged], &target)?;

        assert!(fs::read_to_string(target.join("c-c--.html"))
            .unwrap()
            .starts_with("<h1>c/c++</h1>"));
        assert!(target.join("---x.html").exists());
        assert!(!out.path().join("x.html").exists());
        assert_eq!(2, fs::read_dir(&target).unwrap().count());
        Ok(())
    }

    #[test]
    fn test_post_without_tags_fails() {
        let (_dir, renderer) = fixture();
        let presenter = TagPresenter {
            renderer: &renderer,
            site_url: "http://example.com",
        };
        let out = tempfile::tempdir().unwrap();
        let untagged = post("Untagged", "2018-01-01 00:00:00", &[]);

        match presenter.output(&[&untagged], out.path()) {
            Err(Error::IncompletePost(title)) => assert_eq!("Untagged", title),
            other => panic!("wanted IncompletePost, found {:?}", other),
        }
    }
}
