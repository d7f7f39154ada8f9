// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;

/// Default naming pattern used when `[global].output` is unset.
///
/// `%f` expands to the design base name, `%i` to the check's id and `%x` to
/// its extension, so `run_erc` on `main.kicad_sch` yields `main-erc.txt`.
pub const DEF_OUTPUT_PATTERN: &str = "%f-%i.%x";

/// Top-level configuration as read from a TOML file, before validation.
///
/// ```toml
/// [global]
/// schematic = "boards/main.kicad_sch"
/// out_dir = "Generated"
/// use_dir_for_preflights = true
///
/// [preflight]
/// run_erc = true
/// erc_warnings = true
///
/// [tools.eeschema_do]
/// retry_on = [3]
/// max_attempts = 2
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct RawConfigFile {
    /// Run-wide paths and naming options from `[global]`.
    #[serde(default)]
    pub global: GlobalSection,

    /// All preflight toggles from `[preflight]`.
    ///
    /// Keys are check names (e.g. `"run_erc"`); values are kept as raw TOML
    /// values so each check can validate its own option type.
    #[serde(default)]
    pub preflight: BTreeMap<String, toml::Value>,

    /// Per-tool exit-code conventions and retry policies from
    /// `[tools.<command>]`.
    #[serde(default)]
    pub tools: BTreeMap<String, ToolSection>,

    /// Optional board render output from `[render]`.
    #[serde(default)]
    pub render: Option<RenderSection>,
}

/// `[global]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct GlobalSection {
    /// Path to the schematic file. Required by schematic-related checks.
    #[serde(default)]
    pub schematic: Option<PathBuf>,

    /// Path to the board file. Required by layout-related checks.
    #[serde(default)]
    pub board: Option<PathBuf>,

    /// Base directory for all generated files.
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,

    /// Output naming pattern; falls back to [`DEF_OUTPUT_PATTERN`].
    #[serde(default)]
    pub output: Option<String>,

    /// Optional subdirectory below `out_dir`.
    #[serde(default)]
    pub dir: Option<String>,

    /// Whether preflight reports also go below `dir`.
    #[serde(default = "default_true")]
    pub use_dir_for_preflights: bool,

    /// Optional rule filter file forwarded to the checks (`-f`).
    #[serde(default)]
    pub filter_file: Option<String>,

    /// Optional assembly variant name.
    #[serde(default)]
    pub variant: Option<String>,
}

fn default_out_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_true() -> bool {
    true
}

impl Default for GlobalSection {
    fn default() -> Self {
        Self {
            schematic: None,
            board: None,
            out_dir: default_out_dir(),
            output: None,
            dir: None,
            use_dir_for_preflights: true,
            filter_file: None,
            variant: None,
        }
    }
}

/// `[tools.<command>]` section.
///
/// Which positive exit codes mean "N findings" and which codes are worth
/// retrying is tool-specific, so both live in the config rather than in any
/// check implementation.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolSection {
    /// Positive exit codes up to this value are "number of findings"
    /// reports rather than crashes. Unset means the tool has no such
    /// convention and every nonzero code is an error.
    #[serde(default)]
    pub findings_max: Option<i32>,

    /// Exit codes considered transient (licensing, resource contention).
    #[serde(default)]
    pub retry_on: Vec<i32>,

    /// Total attempts, including the first one.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay between attempts, in milliseconds.
    #[serde(default)]
    pub backoff_ms: u64,
}

fn default_max_attempts() -> u32 {
    1
}

impl Default for ToolSection {
    fn default() -> Self {
        Self {
            findings_max: None,
            retry_on: Vec::new(),
            max_attempts: default_max_attempts(),
            backoff_ms: 0,
        }
    }
}

/// Target format for the `[render]` output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Svg,
    Png,
    Jpg,
}

impl Default for ImageFormat {
    fn default() -> Self {
        ImageFormat::Svg
    }
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Svg => "svg",
            ImageFormat::Png => "png",
            ImageFormat::Jpg => "jpg",
        }
    }
}

/// `[render]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct RenderSection {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub format: ImageFormat,

    /// Explicit list of component references to draw.
    ///
    /// `None` means "all components"; an explicitly empty list means "none".
    /// When a variant or filter is also configured the two mechanisms
    /// conflict and the variant/filter wins.
    #[serde(default)]
    pub show_components: Option<Vec<String>>,
}

impl Default for RenderSection {
    fn default() -> Self {
        Self {
            enabled: true,
            format: ImageFormat::default(),
            show_components: None,
        }
    }
}

/// Validated configuration.
///
/// Constructed only through `TryFrom<RawConfigFile>` (see
/// [`crate::config::validate`]); the contents are identical but known to be
/// semantically sane.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub global: GlobalSection,
    pub preflight: BTreeMap<String, toml::Value>,
    pub tools: BTreeMap<String, ToolSection>,
    pub render: Option<RenderSection>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            global: raw.global,
            preflight: raw.preflight,
            tools: raw.tools,
            render: raw.render,
        }
    }

    /// Effective output naming pattern.
    pub fn output_pattern(&self) -> &str {
        self.global.output.as_deref().unwrap_or(DEF_OUTPUT_PATTERN)
    }

    /// Exit-code convention and retry policy for one tool command.
    pub fn tool_section(&self, command: &str) -> ToolSection {
        self.tools.get(command).cloned().unwrap_or_default()
    }
}
