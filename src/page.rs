//! The [`PagePresenter`] renders every post it's given into its own HTML
//! file.

use crate::link::entry_link;
use crate::post::Post;
use crate::render::{Error as RenderError, TemplateRenderer};
use crate::summary::Summary;
use crate::value;
use gtmpl_value::Value;
use std::io;
use std::path::{Path, PathBuf};

/// The posts listed on an `Index` or `Main` page, along with the directory
/// they were collected from.
pub struct Listing {
    pub dir: String,
    pub items: Vec<Summary>,
}

/// Writes one `{slug}.html` per post, rendered with the template named after
/// the post's own template (`Post` renders with `post.html`).
pub struct PagePresenter<'a> {
    pub renderer: &'a TemplateRenderer,
    pub site_url: &'a str,
}

impl PagePresenter<'_> {
    /// Writes every post in `posts` into `target_dir`, creating it if needed.
    pub fn output(&self, posts: &[&Post], target_dir: &Path) -> Result<()> {
        create_dir(target_dir)?;
        for post in posts {
            self.write_page(post, None, target_dir)?;
        }
        Ok(())
    }

    /// Renders a single post into `target_dir`, which must exist. `listing`
    /// is made available to the template as `indexed` and `indexed_dir`.
    pub fn write_page(
        &self,
        post: &Post,
        listing: Option<&Listing>,
        target_dir: &Path,
    ) -> Result<PathBuf> {
        let link = entry_link(self.site_url, &post.dir, &post.slug);
        let mut values = value::post(post, &link);
        if let Some(listing) = listing {
            values.insert("indexed".to_owned(), value::summaries(&listing.items));
            values.insert("indexed_dir".to_owned(), (&listing.dir).into());
        }

        let file_path = target_dir.join(format!("{}.html", post.slug));
        self.renderer.render_to(
            &template_name(&post.template),
            Value::Object(values),
            &file_path,
        )?;
        tracing::info!(title = %post.title, path = %file_path.display(), "wrote page");
        Ok(file_path)
    }
}

/// The template file for a post template: `Post` renders with `post.html`.
pub fn template_name(template: &str) -> String {
    format!("{}.html", template.to_lowercase())
}

fn create_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|err| Error::CreateDir {
        path: dir.to_owned(),
        err,
    })
}

/// The result of a fallible page-writing operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when the target directory can't be created.
    #[error("creating directory '{}': {err}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        err: io::Error,
    },

    /// An error during templating or writing the output file.
    #[error(transparent)]
    Render(#[from] RenderError),
}
