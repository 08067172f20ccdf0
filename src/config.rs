//! Loads the site [`Config`] from a YAML manifest.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use url::Url;

/// One archive to write: every post of `template`, optionally grouped by
/// year.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ArchiveConfig {
    pub template: String,

    #[serde(default = "yes")]
    pub grouped: bool,
}

#[derive(Deserialize)]
struct Project {
    site_url: String,
    feed_title: String,
    author: String,

    #[serde(default = "default_source_dir")]
    source_dir: PathBuf,

    #[serde(default = "default_template_dir")]
    template_dir: PathBuf,

    #[serde(default = "default_static_dir")]
    static_dir: PathBuf,

    #[serde(default = "default_target_dir")]
    target_dir: PathBuf,

    #[serde(default = "default_tag_dir")]
    tag_dir: PathBuf,

    #[serde(default = "default_archive_dir")]
    archive_dir: PathBuf,

    #[serde(default = "default_feed_path")]
    feed_path: PathBuf,

    #[serde(default)]
    excluded_dirs: Vec<String>,

    #[serde(default = "default_templates")]
    feed_templates: Vec<String>,

    #[serde(default = "default_templates")]
    tag_templates: Vec<String>,

    #[serde(default = "default_archives")]
    archives: Vec<ArchiveConfig>,

    #[serde(default = "default_utc_offset")]
    utc_offset: String,

    #[serde(default)]
    delete_target_dir: bool,
}

fn yes() -> bool {
    true
}

fn default_source_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_template_dir() -> PathBuf {
    PathBuf::from("templates")
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("static")
}

fn default_target_dir() -> PathBuf {
    PathBuf::from("site")
}

fn default_tag_dir() -> PathBuf {
    PathBuf::from("tags")
}

fn default_archive_dir() -> PathBuf {
    PathBuf::from("archive")
}

fn default_feed_path() -> PathBuf {
    PathBuf::from("feed")
}

fn default_templates() -> Vec<String> {
    vec![String::from("Post"), String::from("Essay")]
}

fn default_archives() -> Vec<ArchiveConfig> {
    default_templates()
        .into_iter()
        .map(|template| ArchiveConfig {
            template,
            grouped: true,
        })
        .collect()
}

fn default_utc_offset() -> String {
    String::from("-05:00")
}

/// Command-line settings that take precedence over the manifest.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub target_dir: Option<PathBuf>,
    pub delete_target_dir: bool,
}

/// The resolved configuration of a build. Directory paths are absolute or
/// relative to the working directory; `tag_dir`, `archive_dir` and
/// `feed_path` are relative to `target_dir`.
#[derive(Clone, Debug)]
pub struct Config {
    pub site_url: String,
    pub feed_title: String,
    pub author: String,
    pub source_dir: PathBuf,
    pub template_dir: PathBuf,
    pub static_dir: PathBuf,
    pub target_dir: PathBuf,
    pub tag_dir: PathBuf,
    pub archive_dir: PathBuf,
    pub feed_path: PathBuf,
    pub excluded_dirs: Vec<String>,
    pub feed_templates: Vec<String>,
    pub tag_templates: Vec<String>,
    pub archives: Vec<ArchiveConfig>,
    pub utc_offset: FixedOffset,
    pub delete_target_dir: bool,
}

impl Config {
    /// Loads the manifest at `path`, resolving its relative paths against
    /// the manifest's directory.
    pub fn from_project_file(path: &Path, overrides: Overrides) -> Result<Config> {
        let file = File::open(path)
            .with_context(|| format!("Opening manifest '{}'", path.display()))?;
        let project: Project = serde_yaml::from_reader(file)
            .with_context(|| format!("Parsing manifest '{}'", path.display()))?;
        let root = match path.parent() {
            Some(root) => root,
            None => {
                return Err(anyhow!(
                    "Can't get parent directory for manifest '{}'",
                    path.display()
                ))
            }
        };
        Config::from_project(project, root, overrides)
    }

    /// Parses a manifest's contents. Relative paths resolve against `root`.
    pub fn from_yaml(input: &str, root: &Path, overrides: Overrides) -> Result<Config> {
        let project: Project =
            serde_yaml::from_str(input).context("Parsing manifest")?;
        Config::from_project(project, root, overrides)
    }

    fn from_project(project: Project, root: &Path, overrides: Overrides) -> Result<Config> {
        Url::parse(&project.site_url)
            .with_context(|| format!("Invalid site_url '{}'", project.site_url))?;

        Ok(Config {
            utc_offset: parse_offset(&project.utc_offset)?,
            site_url: project.site_url,
            feed_title: project.feed_title,
            author: project.author,
            source_dir: root.join(project.source_dir),
            template_dir: root.join(project.template_dir),
            static_dir: root.join(project.static_dir),
            target_dir: match overrides.target_dir {
                Some(target_dir) => target_dir,
                None => root.join(project.target_dir),
            },
            tag_dir: project.tag_dir,
            archive_dir: project.archive_dir,
            feed_path: project.feed_path,
            excluded_dirs: project.excluded_dirs,
            feed_templates: project.feed_templates,
            tag_templates: project.tag_templates,
            archives: project.archives,
            delete_target_dir: project.delete_target_dir || overrides.delete_target_dir,
        })
    }

    /// The directory tag pages are written to.
    pub fn tag_output_dir(&self) -> PathBuf {
        self.target_dir.join(&self.tag_dir)
    }

    /// The directory archives are written to.
    pub fn archive_output_dir(&self) -> PathBuf {
        self.target_dir.join(&self.archive_dir)
    }

    /// The file the Atom feed is written to.
    pub fn feed_output_path(&self) -> PathBuf {
        self.target_dir.join(&self.feed_path)
    }

    /// The directory static assets are copied to.
    pub fn static_output_dir(&self) -> PathBuf {
        self.target_dir.join("static")
    }
}

/// Parses a `±HH:MM` offset (or `Z`).
fn parse_offset(offset: &str) -> Result<FixedOffset> {
    let stamp = format!("2000-01-01T00:00:00{}", offset.trim());
    match DateTime::parse_from_rfc3339(&stamp) {
        Ok(dt) => Ok(*dt.offset()),
        Err(e) => Err(anyhow!("Invalid utc_offset '{}': {}", offset, e)),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    const MINIMAL: &str = "
site_url: http://example.com
feed_title: Example
author: Jane Doe
";

    #[test]
    fn test_defaults() -> Result<()> {
        let root = Path::new("/blog");
        let config = Config::from_yaml(MINIMAL, root, Overrides::default())?;

        assert_eq!("http://example.com", config.site_url);
        assert_eq!(root.join("."), config.source_dir);
        assert_eq!(root.join("templates"), config.template_dir);
        assert_eq!(root.join("static"), config.static_dir);
        assert_eq!(root.join("site"), config.target_dir);
        assert_eq!(root.join("site").join("tags"), config.tag_output_dir());
        assert_eq!(root.join("site").join("archive"), config.archive_output_dir());
        assert_eq!(root.join("site").join("feed"), config.feed_output_path());
        assert!(config.excluded_dirs.is_empty());
        assert_eq!(vec!["Post", "Essay"], config.feed_templates);
        assert_eq!(vec!["Post", "Essay"], config.tag_templates);
        assert_eq!(
            vec![
                ArchiveConfig {
                    template: String::from("Post"),
                    grouped: true,
                },
                ArchiveConfig {
                    template: String::from("Essay"),
                    grouped: true,
                },
            ],
            config.archives
        );
        assert_eq!(FixedOffset::west_opt(5 * 3600).unwrap(), config.utc_offset);
        assert!(!config.delete_target_dir);
        Ok(())
    }

    #[test]
    fn test_explicit_values() -> Result<()> {
        let input = format!(
            "{}{}",
            MINIMAL,
            "
target_dir: /var/www
excluded_dirs: [drafts, .git]
feed_templates: [Post]
archives:
  - template: Essay
    grouped: false
utc_offset: '+02:00'
delete_target_dir: true
"
        );
        let config = Config::from_yaml(&input, Path::new("/blog"), Overrides::default())?;

        assert_eq!(PathBuf::from("/var/www"), config.target_dir);
        assert_eq!(vec!["drafts", ".git"], config.excluded_dirs);
        assert_eq!(vec!["Post"], config.feed_templates);
        assert_eq!(
            vec![ArchiveConfig {
                template: String::from("Essay"),
                grouped: false,
            }],
            config.archives
        );
        assert_eq!(FixedOffset::east_opt(2 * 3600).unwrap(), config.utc_offset);
        assert!(config.delete_target_dir);
        Ok(())
    }

    #[test]
    fn test_overrides_take_precedence() -> Result<()> {
        let config = Config::from_yaml(
            MINIMAL,
            Path::new("/blog"),
            Overrides {
                target_dir: Some(PathBuf::from("out")),
                delete_target_dir: true,
            },
        )?;
        assert_eq!(PathBuf::from("out"), config.target_dir);
        assert!(config.delete_target_dir);
        Ok(())
    }

    #[test]
    fn test_missing_required_field() {
        let input = "site_url: http://example.com\nauthor: Jane Doe\n";
        assert!(Config::from_yaml(input, Path::new("/blog"), Overrides::default()).is_err());
    }

    #[test]
    fn test_invalid_site_url() {
        let input = "site_url: example\nfeed_title: Example\nauthor: Jane Doe\n";
        let err = Config::from_yaml(input, Path::new("/blog"), Overrides::default())
            .unwrap_err();
        assert!(err.to_string().contains("site_url"), "{}", err);
    }

    #[test]
    fn test_invalid_offset() {
        let input = format!("{}utc_offset: five\n", MINIMAL);
        assert!(Config::from_yaml(&input, Path::new("/blog"), Overrides::default()).is_err());
    }

    #[test]
    fn test_from_project_file_resolves_against_manifest() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("wintersun.yaml");
        std::fs::write(&path, MINIMAL)?;

        let config = Config::from_project_file(&path, Overrides::default())?;
        assert_eq!(dir.path().join("templates"), config.template_dir);
        Ok(())
    }
}
