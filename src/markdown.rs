//! The [`MarkdownTransformer`], which turns a source file into a
//! [`Document`]. A source file looks like this:
//!
//! ```md
//! ---
//! Title: Hello, world!
//! Date: 2021-04-16 08:30:00
//! Template: Post
//! Tags: [greet]
//! ---
//! # Hello
//!
//! World
//! ```
//!
//! The YAML between the fences becomes the [`Metadata`]; the rest is rendered
//! to HTML with [`pulldown_cmark`].

use crate::cache::{Document, Metadata, Transformer};
use crate::post::slugify;
use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use url::Url;

const MARKDOWN_EXTENSION: &str = ".md";

/// Parses markdown source files with YAML frontmatter.
#[derive(Clone, Copy, Debug, Default)]
pub struct MarkdownTransformer;

impl Transformer for MarkdownTransformer {
    type Error = Error;

    fn parse(&self, path: &Path) -> Result<Document> {
        match read_document(path) {
            Ok(document) => Ok(document),
            Err(e) => Err(Error::Annotated {
                path: path.to_owned(),
                err: Box::new(e),
            }),
        }
    }
}

fn read_document(path: &Path) -> Result<Document> {
    use std::io::Read;
    let mut input = String::new();
    File::open(path)?.read_to_string(&mut input)?;
    from_str(&input)
}

/// Parses a [`Document`] from the contents of a source file.
pub fn from_str(input: &str) -> Result<Document> {
    fn frontmatter_indices(input: &str) -> Result<(usize, usize, usize)> {
        const FENCE: &str = "---";
        if !input.starts_with(FENCE) {
            return Err(Error::FrontmatterMissingStartFence);
        }
        // The closing fence must sit on a line of its own.
        let mut search = FENCE.len();
        while let Some(offset) = input[search..].find("\n---") {
            let yaml_stop = search + offset + 1;
            let body_start = yaml_stop + FENCE.len();
            let rest = &input[body_start..];
            if rest.is_empty() || rest.starts_with('\n') || rest.starts_with("\r\n") {
                return Ok((FENCE.len(), yaml_stop, body_start));
            }
            search = body_start;
        }
        Err(Error::FrontmatterMissingEndFence)
    }

    let (yaml_start, yaml_stop, body_start) = frontmatter_indices(input)?;
    let meta: Metadata = serde_yaml::from_str(&input[yaml_start..yaml_stop])?;
    let mut contents = String::new();
    to_html(&mut contents, &input[body_start..]);
    Ok(Document { contents, meta })
}

/// Converts markdown to HTML, appending the result to `w`.
pub fn to_html(w: &mut String, markdown: &str) {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_SMART_PUNCTUATION);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    html::push_html(
        w,
        Parser::new_ext(markdown, options).map(|ev| match ev {
            // Links between source documents (`other.md`) need to point at
            // the rendered pages instead (`other.html`).
            Event::Start(Tag::Link(link_type, url, title)) => {
                let url = match convert_link(&url) {
                    Some(converted) => CowStr::Boxed(converted.into_boxed_str()),
                    None => url,
                };
                Event::Start(Tag::Link(link_type, url, title))
            }
            _ => ev,
        }),
    );
}

/// Rewrites a relative link to a markdown document into a link to its
/// rendered page, slugifying the file name the same way output pages are
/// named. Returns `None` for links that should be left alone (absolute URLs,
/// fragments, non-markdown targets).
fn convert_link(url: &str) -> Option<String> {
    if Url::parse(url).is_ok() {
        return None;
    }

    let (target, fragment) = match url.find('#') {
        Some(i) => url.split_at(i),
        None => (url, ""),
    };
    if !target.ends_with(MARKDOWN_EXTENSION) {
        return None;
    }

    let (dir, file_name) = match target.rfind('/') {
        Some(i) => target.split_at(i + 1),
        None => ("", target),
    };
    Some(format!(
        "{}{}.html{}",
        dir,
        slugify(Path::new(file_name)),
        fragment
    ))
}

/// The result of a fallible transform.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem converting a source file into a [`Document`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when a source file is missing its starting frontmatter fence
    /// (`---`).
    #[error("document must begin with `---`")]
    FrontmatterMissingStartFence,

    /// Returned when the starting fence was found but the ending one was
    /// missing.
    #[error("missing closing `---`")]
    FrontmatterMissingEndFence,

    /// Returned when the frontmatter isn't valid YAML or lacks a required
    /// field.
    #[error("invalid frontmatter: {0}")]
    DeserializeYaml(#[from] serde_yaml::Error),

    /// Returned for I/O errors.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// An error annotated with the source file it came from.
    #[error("parsing `{}`: {}", .path.display(), .err)]
    Annotated {
        path: PathBuf,
        #[source]
        err: Box<Error>,
    },
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    const SOURCE: &str = "---
Title: Test Post
Date: 2014-12-31 01:16:13
Template: Post
Tags: tag1 tag2
---
Lorem ipsum dolor sit amet.
";

    #[test]
    fn test_from_str() -> Result<()> {
        let document = from_str(SOURCE)?;
        assert_eq!(
            Metadata {
                title: String::from("Test Post"),
                date: String::from("2014-12-31 01:16:13"),
                template: String::from("Post"),
                tags: vec![String::from("tag1"), String::from("tag2")],
            },
            document.meta
        );
        assert_eq!("<p>Lorem ipsum dolor sit amet.</p>\n", document.contents);
        Ok(())
    }

    #[test]
    fn test_missing_fences() {
        assert!(matches!(
            from_str("Title: nope\n"),
            Err(Error::FrontmatterMissingStartFence)
        ));
        assert!(matches!(
            from_str("---\nTitle: nope\n"),
            Err(Error::FrontmatterMissingEndFence)
        ));
    }

    #[test]
    fn test_dashes_inside_frontmatter() -> Result<()> {
        let input = "---
Title: Rust --- notes
Date: 2018-01-01 00:00:00
Template: Post
Tags: [a----b]
---
body
";
        let document = from_str(input)?;
        assert_eq!("Rust --- notes", document.meta.title);
        assert_eq!(vec![String::from("a----b")], document.meta.tags);
        assert_eq!("<p>body</p>\n", document.contents);
        Ok(())
    }

    #[test]
    fn test_missing_required_field() {
        let input = "---\nTitle: No date\nTemplate: Post\n---\nbody\n";
        assert!(matches!(from_str(input), Err(Error::DeserializeYaml(_))));
    }

    #[test]
    fn test_converts_links_to_documents() -> Result<()> {
        let input = "---
Title: Links
Date: 2018-01-01 00:00:00
Template: Page
---
[a](other_post.md) [b](../essays/deep.md#part-2) [c](https://example.org/x.md) [d](image.png)
";
        let html = from_str(input)?.contents;
        assert!(html.contains(r#"href="other-post.html""#), "{}", html);
        assert!(html.contains(r#"href="../essays/deep.html#part-2""#), "{}", html);
        assert!(html.contains(r#"href="https://example.org/x.md""#), "{}", html);
        assert!(html.contains(r#"href="image.png""#), "{}", html);
        Ok(())
    }

    #[test]
    fn test_parse_annotates_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.md");
        let err = MarkdownTransformer.parse(&path).unwrap_err();
        assert!(err.to_string().contains("missing.md"), "{}", err);
    }

    #[test]
    fn test_parse_reads_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("post.md");
        std::fs::write(&path, SOURCE)?;
        let document = MarkdownTransformer.parse(&path)?;
        assert_eq!("Test Post", document.meta.title);
        Ok(())
    }
}
