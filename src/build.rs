//! Exports the [`build_site`] function which stitches together the high-level
//! steps of building the output site: preparing the target directory,
//! mirroring the source tree into rendered pages ([`crate::page`]), and
//! writing the Atom feed ([`crate::feed`]), tag pages ([`crate::tag`]) and
//! archives ([`crate::archive`]) from the collected posts.

use crate::archive::{ArchivePresenter, Error as ArchiveError};
use crate::cache::TransformCache;
use crate::config::Config;
use crate::feed::{Error as FeedError, FeedPresenter};
use crate::markdown::{Error as MarkdownError, MarkdownTransformer};
use crate::page::{Error as PageError, Listing, PagePresenter};
use crate::post::{slugify, Error as PostError, Post};
use crate::render::TemplateRenderer;
use crate::repo::{Error as RepoError, Order, PostRepository};
use crate::summary::Summary;
use crate::tag::{Error as TagError, TagPresenter};
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// The templates whose pages list the posts of a sibling directory.
const LISTING_TEMPLATES: &[&str] = &["Index", "Main"];

/// Everything one build needs. A context is created per build, so separate
/// builds never share cached documents or posts.
pub struct BuildContext {
    config: Config,
    cache: TransformCache<MarkdownTransformer>,
    repo: PostRepository,
    renderer: TemplateRenderer,
}

impl BuildContext {
    pub fn new(config: Config) -> BuildContext {
        BuildContext {
            renderer: TemplateRenderer::new(&config.template_dir),
            cache: TransformCache::new(MarkdownTransformer),
            repo: PostRepository::new(),
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The posts collected so far.
    pub fn repo(&self) -> &PostRepository {
        &self.repo
    }

    /// The number of distinct source documents parsed so far.
    pub fn parsed_documents(&self) -> usize {
        self.cache.len()
    }
}

/// Builds the site described by the context's [`Config`].
pub fn build_site(ctx: &mut BuildContext) -> Result<()> {
    let BuildContext {
        config,
        cache,
        repo,
        renderer,
    } = ctx;
    let config: &Config = config;
    let renderer: &TemplateRenderer = renderer;

    prepare_target_dir(config)?;

    let mut traversal = Traversal {
        config,
        cache,
        repo,
        pages: PagePresenter {
            renderer,
            site_url: &config.site_url,
        },
        excluded: excluded_paths(config),
    };
    traversal.visit(&config.source_dir, Path::new(""))?;

    let posts = repo.all(Order::Desc);
    tracing::info!(posts = posts.len(), "collected posts");

    FeedPresenter {
        title: config.feed_title.clone(),
        site_url: config.site_url.clone(),
        author: config.author.clone(),
        offset: config.utc_offset,
        templates: config.feed_templates.clone(),
    }
    .output(&posts, &config.feed_output_path())?;

    let tagged: Vec<&Post> = posts
        .iter()
        .copied()
        .filter(|p| config.tag_templates.contains(&p.template))
        .collect();
    TagPresenter {
        renderer,
        site_url: &config.site_url,
    }
    .output(&tagged, &config.tag_output_dir())?;

    let archives = ArchivePresenter {
        renderer,
        site_url: &config.site_url,
    };
    for archive in &config.archives {
        let archived: Vec<&Post> = posts
            .iter()
            .copied()
            .filter(|p| p.template == archive.template)
            .collect();
        archives.output(
            &archived,
            &archive.template,
            archive.grouped,
            &config.archive_output_dir(),
        )?;
    }

    Ok(())
}

// Clears (or refuses to clobber) the target directory, then recreates it
// along with the tag directory and a copy of the static assets.
fn prepare_target_dir(config: &Config) -> Result<()> {
    let target = &config.target_dir;
    if target.exists() {
        if !config.delete_target_dir {
            return Err(Error::TargetExists(target.to_owned()));
        }
        tracing::info!(path = %target.display(), "removing target directory");
        std::fs::remove_dir_all(target).map_err(|err| Error::Clean {
            path: target.to_owned(),
            err,
        })?;
    }

    create_dir(target)?;
    create_dir(&config.tag_output_dir())?;
    copy_dir(&config.static_dir, &config.static_output_dir())
}

fn copy_dir(src: &Path, dst: &Path) -> Result<()> {
    if !src.is_dir() {
        tracing::warn!(path = %src.display(), "no static directory to copy");
        return Ok(());
    }

    for entry in WalkDir::new(src).sort_by_file_name() {
        let entry = entry.map_err(|err| Error::Walk {
            path: src.to_owned(),
            err,
        })?;
        let relative = match entry.path().strip_prefix(src) {
            Ok(relative) => relative,
            Err(_) => continue,
        };
        let destination = dst.join(relative);
        if entry.file_type().is_dir() {
            create_dir(&destination)?;
        } else {
            std::fs::copy(entry.path(), &destination).map_err(|err| Error::Copy {
                path: entry.path().to_owned(),
                err,
            })?;
        }
    }
    Ok(())
}

fn create_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|err| Error::CreateDir {
        path: dir.to_owned(),
        err,
    })?;
    tracing::info!(path = %dir.display(), "created directory");
    Ok(())
}

// The template, static and target directories are never traversed, wherever
// they are.
fn excluded_paths(config: &Config) -> Vec<PathBuf> {
    [&config.template_dir, &config.static_dir, &config.target_dir]
        .iter()
        .filter_map(|dir| dir.canonicalize().ok())
        .collect()
}

struct Traversal<'a> {
    config: &'a Config,
    cache: &'a mut TransformCache<MarkdownTransformer>,
    repo: &'a mut PostRepository,
    pages: PagePresenter<'a>,
    excluded: Vec<PathBuf>,
}

impl Traversal<'_> {
    // Renders every source document in `dir` into the mirrored output
    // directory, then descends into subdirectories. `relative` is `dir`
    // relative to the source root.
    fn visit(&mut self, dir: &Path, relative: &Path) -> Result<()> {
        let (files, subdirs) = read_dir_sorted(dir)?;
        let output_dir = self.config.target_dir.join(relative);
        create_dir(&output_dir)?;

        for file in files.iter().filter(|f| is_source_file(f)) {
            tracing::info!(path = %file.display(), "input file");
            let post = self.load(file, relative)?;
            let listing = if LISTING_TEMPLATES.contains(&post.template.as_str()) {
                Some(self.listing(file, relative)?)
            } else {
                None
            };
            self.repo.insert(post.clone())?;
            self.pages.write_page(&post, listing.as_ref(), &output_dir)?;
        }

        for subdir in subdirs {
            if self.is_excluded(&subdir) {
                tracing::debug!(path = %subdir.display(), "skipping excluded directory");
                continue;
            }
            let name = match subdir.file_name() {
                Some(name) => name.to_owned(),
                None => continue,
            };
            self.visit(&subdir, &relative.join(name))?;
        }
        Ok(())
    }

    fn is_excluded(&self, dir: &Path) -> bool {
        let named = match dir.file_name().and_then(|n| n.to_str()) {
            Some(name) => self.config.excluded_dirs.iter().any(|e| e == name),
            None => false,
        };
        named
            || match dir.canonicalize() {
                Ok(dir) => self.excluded.contains(&dir),
                Err(_) => false,
            }
    }

    // Builds a post from the cached document at `file`, which lives in
    // `relative` below the source root.
    fn load(&mut self, file: &Path, relative: &Path) -> Result<Post> {
        let document = self.cache.get_or_create(file)?;
        Ok(Post {
            title: document.meta.title.clone(),
            contents: document.contents.clone(),
            slug: slugify(file),
            template: document.meta.template.clone(),
            date: document.meta.date.parse()?,
            tags: document.meta.tags.clone(),
            dir: url_path(relative),
        })
    }

    // Lists the posts of the directory next to `file` that shares its stem,
    // most recent first. A missing directory lists nothing.
    fn listing(&mut self, file: &Path, relative: &Path) -> Result<Listing> {
        let stem = file.file_stem().unwrap_or_default();
        let dir = file.with_file_name(stem);
        let relative = relative.join(stem);

        let mut items: Vec<(Post, Summary)> = Vec::new();
        if dir.is_dir() {
            let (files, _) = read_dir_sorted(&dir)?;
            for file in files.iter().filter(|f| is_source_file(f)) {
                let post = self.load(file, &relative)?;
                let summary = Summary::new(&post, &self.config.site_url);
                items.push((post, summary));
            }
        }
        items.sort_by(|(a, _), (b, _)| b.date.timestamp().cmp(&a.date.timestamp()));

        Ok(Listing {
            dir: url_path(&relative),
            items: items.into_iter().map(|(_, summary)| summary).collect(),
        })
    }
}

// Splits the entries of `dir` into files and subdirectories, each sorted by
// name.
fn read_dir_sorted(dir: &Path) -> Result<(Vec<PathBuf>, Vec<PathBuf>)> {
    let read_err = |err| Error::ReadDir {
        path: dir.to_owned(),
        err,
    };
    let mut files = Vec::new();
    let mut subdirs = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_err)? {
        let path = entry.map_err(read_err)?.path();
        if path.is_dir() {
            subdirs.push(path);
        } else if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    subdirs.sort();
    Ok((files, subdirs))
}

// Source documents are `*.md` files with a non-empty stem. Whatever the
// stem holds, `slugify` turns it into a safe output name.
fn is_source_file(path: &Path) -> bool {
    let is_markdown = path.extension().map_or(false, |ext| ext == "md");
    let has_stem = path.file_stem().map_or(false, |stem| !stem.is_empty());
    is_markdown && has_stem
}

fn url_path(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// The result of building a site.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Wraps the errors of every step, plus
/// the I/O problems of preparing and mirroring directories.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when the target directory exists and deleting it wasn't
    /// requested.
    #[error("target directory '{}' already exists", .0.display())]
    TargetExists(PathBuf),

    /// Returned for I/O problems while removing the target directory.
    #[error("cleaning directory '{}': {err}", .path.display())]
    Clean {
        path: PathBuf,
        #[source]
        err: io::Error,
    },

    /// Returned when an output directory can't be created.
    #[error("creating directory '{}': {err}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        err: io::Error,
    },

    /// Returned when a source directory can't be listed.
    #[error("reading directory '{}': {err}", .path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        err: io::Error,
    },

    /// Returned when the static directory can't be walked.
    #[error("walking directory '{}': {err}", .path.display())]
    Walk {
        path: PathBuf,
        #[source]
        err: walkdir::Error,
    },

    /// Returned when a static file can't be copied.
    #[error("copying '{}': {err}", .path.display())]
    Copy {
        path: PathBuf,
        #[source]
        err: io::Error,
    },

    /// Returned for errors parsing source documents.
    #[error(transparent)]
    Parse(#[from] MarkdownError),

    /// Returned for malformed post fields.
    #[error(transparent)]
    Post(#[from] PostError),

    /// Returned when posts can't be collected, e.g. duplicate titles.
    #[error(transparent)]
    Repo(#[from] RepoError),

    /// Returned for errors writing post pages.
    #[error(transparent)]
    Page(#[from] PageError),

    /// Returned for errors writing the feed.
    #[error(transparent)]
    Feed(#[from] FeedError),

    /// Returned for errors writing tag pages.
    #[error(transparent)]
    Tag(#[from] TagError),

    /// Returned for errors writing archives.
    #[error(transparent)]
    Archive(#[from] ArchiveError),
}
