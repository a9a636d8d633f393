use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::inventory::entry::{ScriptEntry, ScriptType};

/// Value written to the `crossorigin` attribute next to a freshly added
/// `integrity` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum CrossOrigin {
    /// Leave `crossorigin` alone.
    Omit,
    #[default]
    Anonymous,
    UseCredentials,
}

impl CrossOrigin {
    pub fn attribute_value(self) -> Option<&'static str> {
        match self {
            CrossOrigin::Omit => None,
            CrossOrigin::Anonymous => Some("anonymous"),
            CrossOrigin::UseCredentials => Some("use-credentials"),
        }
    }
}

/// Everything both phases need, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Build output directory.
    pub target: PathBuf,
    /// HTML entry point scanned for `<script src>`, relative to `target`.
    pub index_file: PathBuf,
    /// HTML files rewritten with `integrity` attributes, relative to `target`.
    pub html_files: Vec<PathBuf>,
    /// Inventory output file, relative to `target`.
    pub inventory_file: PathBuf,
    /// Extension of the script files collected from the build directory.
    pub script_extension: String,
    pub crossorigin: CrossOrigin,
    /// Scripts that cannot be found by scanning (e.g. injected at runtime).
    pub predefined: Vec<ScriptEntry>,
}

impl Config {
    /// Configuration with every option at its default.
    pub fn new(target: impl Into<PathBuf>) -> Self {
        Config {
            target: target.into(),
            index_file: default_index_file(),
            html_files: default_html_files(),
            inventory_file: default_inventory_file(),
            script_extension: default_script_extension(),
            crossorigin: CrossOrigin::default(),
            predefined: Vec::new(),
        }
    }
    pub fn index_path(&self) -> PathBuf {
        self.target.join(&self.index_file)
    }
    pub fn inventory_path(&self) -> PathBuf {
        self.target.join(&self.inventory_file)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// PROJECT CONFIG FILE
// ————————————————————————————————————————————————————————————————————————————

/// The optional TOML config file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Build output directory, relative to the config file.
    #[serde(default)]
    pub target: Option<PathBuf>,

    #[serde(default = "default_index_file")]
    pub index_file: PathBuf,

    #[serde(default = "default_html_files")]
    pub html_files: Vec<PathBuf>,

    #[serde(default = "default_inventory_file")]
    pub inventory_file: PathBuf,

    #[serde(default = "default_script_extension")]
    pub script_extension: String,

    #[serde(default)]
    pub crossorigin: Option<CrossOrigin>,

    #[serde(default)]
    pub predefined: Vec<PredefinedScript>,
}

/// A manually curated inventory entry.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PredefinedScript {
    pub name: String,
    #[serde(rename = "type")]
    pub script_type: ScriptType,
    #[serde(default)]
    pub hash: Option<String>,
    /// Derived from the name when omitted.
    #[serde(default)]
    pub reason: Option<String>,
}

fn default_index_file() -> PathBuf {
    PathBuf::from(crate::INDEX_FILE_NAME)
}

fn default_html_files() -> Vec<PathBuf> {
    vec![PathBuf::from(crate::INDEX_FILE_NAME)]
}

fn default_inventory_file() -> PathBuf {
    PathBuf::from(crate::INVENTORY_FILE_NAME)
}

fn default_script_extension() -> String {
    String::from(".js")
}

impl Default for ProjectConfig {
    fn default() -> Self {
        ProjectConfig {
            target: None,
            index_file: default_index_file(),
            html_files: default_html_files(),
            inventory_file: default_inventory_file(),
            script_extension: default_script_extension(),
            crossorigin: None,
            predefined: Vec::new(),
        }
    }
}

impl From<PredefinedScript> for ScriptEntry {
    fn from(script: PredefinedScript) -> Self {
        let reason = script
            .reason
            .unwrap_or_else(|| crate::inventory::reason::reason_for(&script.name).to_string());
        ScriptEntry {
            name: script.name,
            script_type: script.script_type,
            hash: script.hash,
            reason,
        }
    }
}

pub fn load_project_config(path: impl AsRef<Path>) -> Result<ProjectConfig> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| Error::io(path, source))?;
    toml::from_str(&text).map_err(|source| Error::Config { path: path.to_path_buf(), source })
}

impl ProjectConfig {
    /// Builds the runtime [`Config`]. Command-line values take precedence
    /// over the file; a `target` from the file is resolved against
    /// `config_dir`.
    pub fn into_config(
        self,
        config_dir: impl AsRef<Path>,
        target: Option<PathBuf>,
        crossorigin: Option<CrossOrigin>,
    ) -> Result<Config> {
        let target = target
            .or_else(|| self.target.map(|target| config_dir.as_ref().join(target)))
            .ok_or(Error::MissingTarget)?;
        Ok(Config {
            target,
            index_file: self.index_file,
            html_files: self.html_files,
            inventory_file: self.inventory_file,
            script_extension: self.script_extension,
            crossorigin: crossorigin.or(self.crossorigin).unwrap_or_default(),
            predefined: self.predefined.into_iter().map(ScriptEntry::from).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_file() {
        let config = ProjectConfig::default()
            .into_config(".", Some(PathBuf::from("dist")), None)
            .unwrap();
        assert_eq!(config.target, PathBuf::from("dist"));
        assert_eq!(config.html_files, vec![PathBuf::from("index.html")]);
        assert_eq!(config.inventory_path(), PathBuf::from("dist/scripts-inventory.json"));
        assert_eq!(config.index_path(), PathBuf::from("dist/index.html"));
        assert_eq!(config.crossorigin, CrossOrigin::Anonymous);
        assert!(config.predefined.is_empty());
    }

    #[test]
    fn target_is_required() {
        let err = ProjectConfig::default().into_config(".", None, None).unwrap_err();
        assert!(matches!(err, Error::MissingTarget));
    }

    #[test]
    fn parses_toml_and_cli_overrides_win() {
        let text = r#"
            target = "build"
            html_files = ["index.html", "admin/index.html"]
            crossorigin = "omit"

            [[predefined]]
            name = "https://maps.example.com/loader.js"
            type = "external"
            reason = "Maps loader injected at runtime"

            [[predefined]]
            name = "gtm.js"
            type = "local"
        "#;
        let project: ProjectConfig = toml::from_str(text).unwrap();
        let config = project
            .into_config("/srv/app", None, Some(CrossOrigin::UseCredentials))
            .unwrap();
        assert_eq!(config.target, PathBuf::from("/srv/app/build"));
        assert_eq!(config.html_files.len(), 2);
        assert_eq!(config.crossorigin, CrossOrigin::UseCredentials);
        assert_eq!(config.predefined.len(), 2);
        assert_eq!(config.predefined[0].reason, "Maps loader injected at runtime");
        assert_eq!(config.predefined[1].reason, "Google Tag Manager");
        assert_eq!(config.predefined[1].hash, None);
    }

    #[test]
    fn rejects_unknown_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sri.toml");
        std::fs::write(&path, "tagret = \"dist\"\n").unwrap();
        assert!(matches!(load_project_config(&path), Err(Error::Config { .. })));
    }

    #[test]
    fn crossorigin_values() {
        assert_eq!(CrossOrigin::Omit.attribute_value(), None);
        assert_eq!(CrossOrigin::Anonymous.attribute_value(), Some("anonymous"));
        assert_eq!(CrossOrigin::UseCredentials.attribute_value(), Some("use-credentials"));
    }
}
