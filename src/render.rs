//! The [`TemplateRenderer`] resolves template names against a template
//! directory and renders them with [`gtmpl`] (Go template syntax).

use gtmpl::{Context, Template, Value};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Renders named templates from a directory.
pub struct TemplateRenderer {
    template_dir: PathBuf,
}

impl TemplateRenderer {
    pub fn new<P: Into<PathBuf>>(template_dir: P) -> TemplateRenderer {
        TemplateRenderer {
            template_dir: template_dir.into(),
        }
    }

    pub fn template_dir(&self) -> &Path {
        &self.template_dir
    }

    /// Renders the template `name` (a file name relative to the template
    /// directory, e.g. `post.html`) with `values` as the template's dot.
    pub fn render(&self, name: &str, values: Value) -> Result<String> {
        let path = self.template_dir.join(name);
        let source = match fs::read_to_string(&path) {
            Ok(source) => source,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(Error::NotFound { name: name.to_owned(), path })
            }
            Err(err) => return Err(Error::Io { path, err }),
        };

        let annotate = |err: String| Error::Template {
            name: name.to_owned(),
            err,
        };
        let mut template = Template::default();
        template.parse(&source).map_err(annotate)?;
        template
            .render(&Context::from(values).map_err(annotate)?)
            .map_err(annotate)
    }

    /// Renders the template `name` and writes the result to `file_path`.
    pub fn render_to(
        &self,
        name: &str,
        values: Value,
        file_path: &Path,
    ) -> Result<()> {
        let rendered = self.render(name, values)?;
        fs::write(file_path, rendered).map_err(|err| Error::Io {
            path: file_path.to_owned(),
            err,
        })
    }
}

/// The result of a fallible rendering operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem rendering a template.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when the template directory has no template with the
    /// requested name.
    #[error("template `{name}` not found at '{}'", .path.display())]
    NotFound { name: String, path: PathBuf },

    /// Returned when a template fails to parse or execute.
    #[error("rendering template `{name}`: {err}")]
    Template { name: String, err: String },

    /// Returned for I/O problems reading templates or writing output.
    #[error("'{}': {err}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        err: io::Error,
    },
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::HashMap;

    fn renderer() -> (tempfile::TempDir, TemplateRenderer) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("post.html"),
            "<h1>{{.title}}</h1><h2>{{.date}}</h2>{{.contents}}",
        )
        .unwrap();
        fs::write(dir.path().join("broken.html"), "{{.title").unwrap();
        let renderer = TemplateRenderer::new(dir.path());
        (dir, renderer)
    }

    fn values() -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("title".to_owned(), "Page title".into());
        m.insert("date".to_owned(), "2018-01-06 10:52:32".into());
        m.insert("contents".to_owned(), "Lorem ipsum".into());
        Value::Object(m)
    }

    #[test]
    fn test_render_sample_page() -> Result<()> {
        let (_dir, renderer) = renderer();
        assert_eq!(
            "<h1>Page title</h1><h2>2018-01-06 10:52:32</h2>Lorem ipsum",
            renderer.render("post.html", values())?
        );
        Ok(())
    }

    #[test]
    fn test_render_missing_template() {
        let (_dir, renderer) = renderer();
        match renderer.render("essay.html", values()) {
            Err(Error::NotFound { name, .. }) => assert_eq!("essay.html", name),
            other => panic!("wanted NotFound, found {:?}", other),
        }
    }

    #[test]
    fn test_render_broken_template() {
        let (_dir, renderer) = renderer();
        assert!(matches!(
            renderer.render("broken.html", values()),
            Err(Error::Template { .. })
        ));
    }

    #[test]
    fn test_render_to() -> Result<()> {
        let (dir, renderer) = renderer();
        let out = dir.path().join("out.html");
        renderer.render_to("post.html", values(), &out)?;
        assert!(fs::read_to_string(&out).unwrap().contains("Lorem ipsum"));
        Ok(())
    }
}
