//! Site configuration management.
//!
//! Handles loading, parsing, and validating the `mdsite.toml` configuration
//! file. The loaded config is passed explicitly into every build and render
//! call; there is no ambient global state.

use crate::cli::{Cli, Commands};
use anyhow::Result;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config file parsing error")]
    Toml(#[from] toml::de::Error),
}

/// Default values for serde deserialization
pub mod config_defaults {
    pub mod site {
        pub fn name() -> String {
            "My Site".into()
        }
    }

    pub mod build {
        use std::path::PathBuf;

        pub fn root() -> Option<PathBuf> {
            None
        }
        pub fn content() -> PathBuf {
            "content".into()
        }
        pub fn templates() -> PathBuf {
            "templates".into()
        }
        pub fn output() -> PathBuf {
            "dist".into()
        }
        pub fn assets() -> PathBuf {
            "css".into()
        }
    }

    pub mod serve {
        pub fn interface() -> String {
            "127.0.0.1".into()
        }
        pub fn port() -> u16 {
            3000
        }
    }
}

/// `[site]` section in mdsite.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteSection {
    /// Site display name, substituted for every `{{websiteName}}` token
    #[serde(default = "config_defaults::site::name")]
    #[educe(Default = config_defaults::site::name())]
    pub name: String,
}

/// `[build]` section in mdsite.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct BuildConfig {
    /// Root directory path
    #[serde(default = "config_defaults::build::root")]
    #[educe(Default = config_defaults::build::root())]
    pub root: Option<PathBuf>,

    /// Content directory path (relative to root)
    #[serde(default = "config_defaults::build::content")]
    #[educe(Default = config_defaults::build::content())]
    pub content: PathBuf,

    /// Templates directory path (relative to root)
    #[serde(default = "config_defaults::build::templates")]
    #[educe(Default = config_defaults::build::templates())]
    pub templates: PathBuf,

    /// Output directory path (relative to root)
    #[serde(default = "config_defaults::build::output")]
    #[educe(Default = config_defaults::build::output())]
    pub output: PathBuf,

    /// Static assets directory, copied verbatim into the output
    #[serde(default = "config_defaults::build::assets")]
    #[educe(Default = config_defaults::build::assets())]
    pub assets: PathBuf,
}

/// `[serve]` section in mdsite.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct ServeConfig {
    /// Network interface to bind (e.g.: "127.0.0.1", "0.0.0.0")
    #[serde(default = "config_defaults::serve::interface")]
    #[educe(Default = config_defaults::serve::interface())]
    pub interface: String,

    /// Port number to listen on
    #[serde(default = "config_defaults::serve::port")]
    #[educe(Default = config_defaults::serve::port())]
    pub port: u16,
}

/// Root configuration structure representing mdsite.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Basic site information
    #[serde(default)]
    pub site: SiteSection,

    /// Build settings
    #[serde(default)]
    pub build: BuildConfig,

    /// Development server settings
    #[serde(default)]
    pub serve: ServeConfig,
}

impl SiteConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: SiteConfig = toml::from_str(content).map_err(ConfigError::Toml)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        self.build.root.as_deref().unwrap_or(Path::new("./"))
    }

    /// Set the root directory path
    pub fn set_root(&mut self, path: &Path) {
        self.build.root = Some(path.to_path_buf())
    }

    /// Path to the base page template
    pub fn template_path(&self) -> PathBuf {
        self.build.templates.join("base.html")
    }

    /// Directory of blog post sources
    pub fn blog_dir(&self) -> PathBuf {
        self.build.content.join("blog")
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &Cli) {
        let root = cli
            .root
            .as_ref()
            .cloned()
            .unwrap_or_else(|| self.get_root().to_owned());
        self.set_root(&root);

        Self::update_option(&mut self.build.content, cli.content.as_ref());
        Self::update_option(&mut self.build.templates, cli.templates.as_ref());
        Self::update_option(&mut self.build.output, cli.output.as_ref());

        self.build.content = root.join(&self.build.content);
        self.build.templates = root.join(&self.build.templates);
        self.build.output = root.join(&self.build.output);
        self.build.assets = root.join(&self.build.assets);

        if let Commands::Serve { interface, port } = &cli.command {
            Self::update_option(&mut self.serve.interface, interface.as_ref());
            Self::update_option(&mut self.serve.port, port.as_ref());
        }
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }
}

#[test]
fn validate_site_section() {
    let config = r#"
        [site]
        name = "Craig's Corner"
    "#;
    let config: SiteConfig = toml::from_str(config).unwrap();

    assert_eq!(config.site.name, "Craig's Corner");
}

#[test]
fn test_site_section_defaults() {
    let config: SiteConfig = toml::from_str("").unwrap();

    assert_eq!(config.site.name, "My Site");
}

#[test]
fn test_build_config_defaults() {
    let config: SiteConfig = toml::from_str("").unwrap();

    assert_eq!(config.build.content, PathBuf::from("content"));
    assert_eq!(config.build.templates, PathBuf::from("templates"));
    assert_eq!(config.build.output, PathBuf::from("dist"));
    assert_eq!(config.build.assets, PathBuf::from("css"));
}

#[test]
fn test_serve_config() {
    let config = r#"
        [serve]
        interface = "0.0.0.0"
        port = 8080
    "#;
    let config: SiteConfig = toml::from_str(config).unwrap();

    assert_eq!(config.serve.interface, "0.0.0.0");
    assert_eq!(config.serve.port, 8080);
}

#[test]
fn test_serve_config_defaults() {
    let config: SiteConfig = toml::from_str("").unwrap();

    assert_eq!(config.serve.interface, "127.0.0.1");
    assert_eq!(config.serve.port, 3000);
}

#[test]
fn test_unknown_field_rejection_in_site() {
    let config = r#"
        [site]
        name = "Test"
        unknown_field = "should_fail"
    "#;
    let result: Result<SiteConfig, _> = toml::from_str(config);

    assert!(result.is_err());
    let err = result.unwrap_err().to_string();
    assert!(err.contains("unknown field"));
}

#[test]
fn test_unknown_field_rejection_in_build() {
    let config = r#"
        [build]
        unknown_field = "should_fail"
    "#;
    let result: Result<SiteConfig, _> = toml::from_str(config);

    assert!(result.is_err());
}

#[test]
fn test_from_str_invalid_toml() {
    let invalid_config = r#"
        [site
        name = "My Blog"
    "#;
    let result = SiteConfig::from_str(invalid_config);

    assert!(result.is_err());
}

#[test]
fn test_template_path() {
    let config = SiteConfig::default();
    assert_eq!(config.template_path(), PathBuf::from("templates/base.html"));
}

#[test]
fn test_blog_dir() {
    let config = SiteConfig::default();
    assert_eq!(config.blog_dir(), PathBuf::from("content/blog"));
}

#[test]
fn test_get_root_default() {
    let config = SiteConfig::default();
    assert_eq!(config.get_root(), Path::new("./"));
}

#[test]
fn test_config_error_display() {
    let io_err = ConfigError::Io(
        PathBuf::from("mdsite.toml"),
        std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
    );
    let display = format!("{}", io_err);
    assert!(display.contains("IO error"));
    assert!(display.contains("mdsite.toml"));
}
