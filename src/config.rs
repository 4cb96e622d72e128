//! Ignore rules and extension allowlist configuration.
//!
//! Configuration is read once at startup from a TOML or JSON file and compiled
//! into [`IgnoreRules`] and an [`ExtensionFilter`]; both are immutable for the
//! rest of the run.
//!
//! # Configuration File Format
//!
//! ```toml
//! ignores = ["bin/", "obj/", "node_modules/", "**/*.min.js"]
//! file_extensions = ".cs,.cshtml,.json,.ts,.html"
//!
//! # optional
//! copy_subtrees = ["aspnet-core", "angular"]
//! old_company_name = "MyCompanyName"
//! old_project_name = "AbpZeroTemplate"
//! ```
//!
//! The JSON form accepts the same keys, and also `Ignores` and `FileExtension`:
//!
//! ```json
//! { "Ignores": ["bin/**", "*.dll"], "FileExtension": ".cs,.json" }
//! ```

use crate::pattern::IgnoreRules;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{MAIN_SEPARATOR, MAIN_SEPARATOR_STR, Path, PathBuf};

/// File names searched for in the current directory, in order.
const LOCAL_CONFIG_NAMES: [&str; 2] = ["renametree.toml", "Config.json"];

/// Errors that can occur during configuration loading and compilation.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Configuration file not found at the specified path, or none found at all.
    ConfigNotFound(PathBuf),
    /// Invalid TOML/JSON syntax or structure (including missing required keys).
    ConfigInvalid(String),
    /// Invalid ignore glob with the reason it was rejected.
    InvalidGlobPattern {
        /// The glob that failed to compile.
        pattern: String,
        /// The reason why the glob is invalid.
        reason: String,
    },
    /// The extension list is empty.
    MissingExtensions,
    /// An extension does not start with a dot.
    InvalidExtension(String),
    /// IO error while reading configuration.
    IoError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ConfigNotFound(path) => {
                write!(f, "Configuration file not found: {}", path.display())
            }
            ConfigError::ConfigInvalid(msg) => write!(f, "Invalid configuration: {}", msg),
            ConfigError::InvalidGlobPattern { pattern, reason } => {
                write!(f, "Invalid ignore pattern '{}': {}", pattern, reason)
            }
            ConfigError::MissingExtensions => {
                write!(f, "File extension list is empty")
            }
            ConfigError::InvalidExtension(ext) => {
                write!(f, "Invalid file extension '{}': expected a leading '.'", ext)
            }
            ConfigError::IoError(msg) => write!(f, "IO error reading configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

fn default_copy_subtrees() -> Vec<String> {
    vec!["aspnet-core".to_string(), "angular".to_string()]
}

/// Raw configuration as read from disk.
#[derive(Debug, Clone, Deserialize)]
pub struct RenameConfig {
    /// Ignore globs, in order.
    #[serde(alias = "Ignores")]
    pub ignores: Vec<String>,

    /// Comma-separated extension allowlist, e.g. `.cs,.json`.
    #[serde(alias = "FileExtension")]
    pub file_extensions: String,

    /// Top-level subtrees copied from the source before renaming.
    #[serde(default = "default_copy_subtrees")]
    pub copy_subtrees: Vec<String>,

    /// Overrides the default old company name offered at the prompt.
    #[serde(default)]
    pub old_company_name: Option<String>,

    /// Overrides the default old project name offered at the prompt.
    #[serde(default)]
    pub old_project_name: Option<String>,
}

impl RenameConfig {
    /// Load configuration from a file.
    ///
    /// Attempts to load configuration in the following order:
    /// 1. If `config_path` is provided, load from that file
    /// 2. Look for `renametree.toml`, then `Config.json`, in the current directory
    /// 3. Look for `~/.config/renametree/config.toml` in home directory
    ///
    /// # Errors
    ///
    /// There is no default configuration: if no file is found this returns
    /// `ConfigError::ConfigNotFound`.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        for name in LOCAL_CONFIG_NAMES {
            let local_config = PathBuf::from(name);
            if local_config.exists() {
                return Self::load_from_file(&local_config);
            }
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("renametree")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        Err(ConfigError::ConfigNotFound(PathBuf::from(
            LOCAL_CONFIG_NAMES[0],
        )))
    }

    /// Load configuration from a specific file. `.json` files are parsed as
    /// JSON, everything else as TOML.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
    }

    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
    }

    /// Ignore globs after normalization.
    pub fn normalized_ignores(&self) -> Vec<String> {
        self.ignores.iter().map(|raw| normalize_glob(raw)).collect()
    }

    /// Compile configuration against the target root.
    ///
    /// # Errors
    ///
    /// Returns an error if any glob or the extension list is malformed.
    pub fn compile(&self, root: &Path) -> Result<CompiledConfig, ConfigError> {
        Ok(CompiledConfig {
            ignores: IgnoreRules::compile(root, &self.normalized_ignores())?,
            extensions: ExtensionFilter::parse(&self.file_extensions)?,
        })
    }
}

/// Normalizes a configured glob: trailing `*` removed, `/` replaced by the host
/// separator, leading separators removed.
///
/// `bin/**` becomes `bin/`, so it denotes the directory and everything in it.
pub fn normalize_glob(raw: &str) -> String {
    raw.trim()
        .trim_end_matches('*')
        .replace('/', MAIN_SEPARATOR_STR)
        .trim_start_matches(MAIN_SEPARATOR)
        .to_string()
}

/// Compiled configuration used by the tree walks.
#[derive(Debug, Clone)]
pub struct CompiledConfig {
    pub ignores: IgnoreRules,
    pub extensions: ExtensionFilter,
}

/// The set of extensions (with leading dot) eligible for rewriting.
///
/// Matching is case-sensitive and uses the text from the last `.` of the file
/// name, so `.gitignore` has extension `.gitignore` and `Makefile` has none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionFilter {
    extensions: BTreeSet<String>,
}

impl ExtensionFilter {
    /// Parses a comma-separated list such as `.cs, .json`.
    ///
    /// # Errors
    ///
    /// `MissingExtensions` if no entries remain after trimming,
    /// `InvalidExtension` if an entry lacks its leading dot.
    pub fn parse(list: &str) -> Result<Self, ConfigError> {
        let extensions = list
            .split(',')
            .map(str::trim)
            .filter(|ext| !ext.is_empty())
            .map(|ext| {
                if ext.len() > 1 && ext.starts_with('.') {
                    Ok(ext.to_string())
                } else {
                    Err(ConfigError::InvalidExtension(ext.to_string()))
                }
            })
            .collect::<Result<BTreeSet<_>, _>>()?;

        if extensions.is_empty() {
            return Err(ConfigError::MissingExtensions);
        }
        Ok(Self { extensions })
    }

    pub fn allows(&self, path: &Path) -> bool {
        extension_of(path).is_some_and(|ext| self.extensions.contains(ext))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.extensions.iter().map(String::as_str)
    }
}

/// The file name from its last `.` onward, if any.
fn extension_of(path: &Path) -> Option<&str> {
    let name = path.file_name()?.to_str()?;
    let dot = name.rfind('.')?;
    let ext = &name[dot..];
    (ext.len() > 1).then_some(ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_toml_config() {
        let config = RenameConfig::from_toml_str(
            r#"
            ignores = ["bin/", "*.dll"]
            file_extensions = ".cs,.json"
            "#,
        )
        .unwrap();

        assert_eq!(config.ignores, vec!["bin/", "*.dll"]);
        assert_eq!(config.copy_subtrees, vec!["aspnet-core", "angular"]);
        assert!(config.old_company_name.is_none());
    }

    #[test]
    fn test_parse_json_config_with_original_keys() {
        let config = RenameConfig::from_json_str(
            r#"{ "Ignores": ["bin/**", "obj/**"], "FileExtension": ".cs,.cshtml" }"#,
        )
        .unwrap();

        assert_eq!(config.ignores.len(), 2);
        assert_eq!(config.file_extensions, ".cs,.cshtml");
    }

    #[test]
    fn test_missing_ignores_is_invalid() {
        let result = RenameConfig::from_toml_str(r#"file_extensions = ".cs""#);
        assert!(matches!(result, Err(ConfigError::ConfigInvalid(_))));
    }

    #[test]
    fn test_missing_extensions_key_is_invalid() {
        let result = RenameConfig::from_json_str(r#"{ "Ignores": [] }"#);
        assert!(matches!(result, Err(ConfigError::ConfigInvalid(_))));
    }

    #[test]
    fn test_load_from_missing_file() {
        let result = RenameConfig::load(Some(Path::new("/nonexistent/renametree.toml")));
        assert!(matches!(result, Err(ConfigError::ConfigNotFound(_))));
    }

    #[test]
    fn test_load_json_file_by_extension() {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("Config.json");
        fs::write(&path, r#"{ "Ignores": ["bin/"], "FileExtension": ".cs" }"#).unwrap();

        let config = RenameConfig::load(Some(&path)).unwrap();
        assert_eq!(config.ignores, vec!["bin/"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_normalize_glob() {
        assert_eq!(normalize_glob("bin/**"), "bin/");
        assert_eq!(normalize_glob("*.dll"), "*.dll");
        assert_eq!(normalize_glob("/node_modules/*"), "node_modules/");
        assert_eq!(normalize_glob("**/obj/**"), "**/obj/");
    }

    #[test]
    fn test_extension_filter_parse() {
        let filter = ExtensionFilter::parse(" .cs, .json ,,").unwrap();
        assert_eq!(filter.iter().collect::<Vec<_>>(), vec![".cs", ".json"]);
    }

    #[test]
    fn test_extension_filter_rejects_empty_list() {
        assert!(matches!(
            ExtensionFilter::parse(" , "),
            Err(ConfigError::MissingExtensions)
        ));
    }

    #[test]
    fn test_extension_filter_rejects_missing_dot() {
        assert!(matches!(
            ExtensionFilter::parse(".cs,json"),
            Err(ConfigError::InvalidExtension(ext)) if ext == "json"
        ));
    }

    #[test]
    fn test_extension_filter_matching() {
        let filter = ExtensionFilter::parse(".cs,.gitignore").unwrap();

        assert!(filter.allows(Path::new("src/App.Web.cs")));
        assert!(filter.allows(Path::new(".gitignore")));
        assert!(!filter.allows(Path::new("App.CS")));
        assert!(!filter.allows(Path::new("Makefile")));
        assert!(!filter.allows(Path::new("App.cs.bak")));
    }

    #[cfg(unix)]
    #[test]
    fn test_compile_reports_bad_glob() {
        let config = RenameConfig {
            ignores: vec!["**bin".to_string()],
            file_extensions: ".cs".to_string(),
            copy_subtrees: Vec::new(),
            old_company_name: None,
            old_project_name: None,
        };

        let result = config.compile(Path::new("/proj"));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidGlobPattern { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_compile_valid_config() {
        let config = RenameConfig::from_toml_str(
            r#"
            ignores = ["bin/**", "*.dll"]
            file_extensions = ".cs"
            "#,
        )
        .unwrap();

        let compiled = config.compile(Path::new("/proj")).unwrap();
        assert_eq!(compiled.ignores.len(), 2);
        assert!(compiled.ignores.is_path_ignored(Path::new("/proj/bin/x")));
        assert!(compiled.ignores.is_file_ignored(Path::new("/proj/a.dll")));
    }
}
