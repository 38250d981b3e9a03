use clap::Args;
use serde::Deserialize;

use result_api::FormatOptions;

use super::error::ExportError;

/// Input path meaning "read standard input".
pub const STDIN: &str = "-";

/// Config read when no path is given; optional.
pub const DEFAULT_CONFIG: &str = "csv-export.toml";

// ═══════════════════════════════════════════════════════════════
//  Config file (TOML)
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    pub input: Option<String>,
    pub output: Option<String>,
    /// Select list of the originating query; orders hit columns.
    pub fields: Option<Vec<String>>,
    #[serde(default)]
    pub format: FormatOptions,
}

pub fn load_config(path: &str) -> Result<Config, ExportError> {
    let content =
        std::fs::read_to_string(path).map_err(|e| ExportError::Config(format!("cannot read config {path}: {e}")))?;
    parse_config(&content).map_err(|e| ExportError::Config(format!("bad config {path}: {e}")))
}

fn parse_config(content: &str) -> Result<Config, toml::de::Error> {
    toml::from_str(content)
}

// ═══════════════════════════════════════════════════════════════
//  CLI args
// ═══════════════════════════════════════════════════════════════

#[derive(Args, Clone, Debug, Default)]
pub struct ExportArgs {
    /// Path to the TOML config [default: csv-export.toml, skipped if absent]
    #[arg(long, env = "CSV_EXPORT_CONFIG")]
    pub config: Option<String>,

    /// Search response JSON; "-" reads stdin
    #[arg(long)]
    pub input: Option<String>,

    /// Output file; stdout when omitted
    #[arg(long)]
    pub output: Option<String>,

    /// Expand one level of nested objects into parent.child columns
    #[arg(long)]
    pub flat: bool,

    /// Append the _score column
    #[arg(long)]
    pub include_score: bool,

    /// Append the _type column
    #[arg(long)]
    pub include_type: bool,

    /// Append the _id column
    #[arg(long)]
    pub include_id: bool,

    /// Query select list, e.g. --fields age,firstname
    #[arg(long, value_delimiter = ',')]
    pub fields: Option<Vec<String>>,
}

// ═══════════════════════════════════════════════════════════════
//  Effective — merged config
// ═══════════════════════════════════════════════════════════════

/// Final settings after merging: config file < env/CLI.
#[derive(Debug)]
pub struct Effective {
    pub input: String,
    pub output: Option<String>,
    pub fields: Vec<String>,
    pub options: FormatOptions,
}

impl Effective {
    pub fn new(args: &ExportArgs) -> Result<Self, ExportError> {
        let cfg = match &args.config {
            Some(path) => load_config(path)?,
            None if std::path::Path::new(DEFAULT_CONFIG).exists() => load_config(DEFAULT_CONFIG)?,
            None => Config::default(),
        };
        Ok(Self::merge(args, cfg))
    }

    fn merge(args: &ExportArgs, cfg: Config) -> Self {
        let options = FormatOptions {
            flat: args.flat || cfg.format.flat,
            include_score: args.include_score || cfg.format.include_score,
            include_type: args.include_type || cfg.format.include_type,
            include_id: args.include_id || cfg.format.include_id,
        };

        Self {
            input: args.input.clone().or(cfg.input).unwrap_or_else(|| STDIN.to_string()),
            output: args.output.clone().or(cfg.output),
            fields: args.fields.clone().or(cfg.fields).unwrap_or_default(),
            options,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_config() {
        let eff = Effective::merge(&ExportArgs::default(), Config::default());
        assert_eq!(eff.input, STDIN);
        assert!(eff.output.is_none());
        assert!(eff.fields.is_empty());
        assert_eq!(eff.options, FormatOptions::default());
    }

    #[test]
    fn cli_overrides_file() {
        let cfg = parse_config(
            r#"
            input = "resp.json"
            fields = ["age", "firstname"]

            [format]
            include_type = true
            "#,
        )
        .unwrap();
        let args = ExportArgs {
            input: Some("other.json".into()),
            include_score: true,
            ..ExportArgs::default()
        };
        let eff = Effective::merge(&args, cfg);
        assert_eq!(eff.input, "other.json");
        assert_eq!(eff.fields, vec!["age", "firstname"]);
        assert!(eff.options.include_type);
        assert!(eff.options.include_score);
        assert!(!eff.options.flat);
    }

    #[test]
    fn explicit_missing_config_is_an_error() {
        let args = ExportArgs { config: Some("/nonexistent/explicit.toml".into()), ..ExportArgs::default() };
        let err = Effective::new(&args).unwrap_err();
        assert!(matches!(err, ExportError::Config(_)));
    }

    #[test]
    fn explicit_config_is_loaded() {
        let path = std::env::temp_dir().join(format!("csv-export-{}-cfg.toml", std::process::id()));
        std::fs::write(&path, "output = \"out.csv\"\n[format]\nflat = true\n").unwrap();

        let args = ExportArgs { config: Some(path.to_string_lossy().into_owned()), ..ExportArgs::default() };
        let eff = Effective::new(&args).unwrap();
        assert_eq!(eff.output.as_deref(), Some("out.csv"));
        assert!(eff.options.flat);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn unknown_format_key_type_is_rejected() {
        assert!(parse_config("[format]\nflat = \"yes\"").is_err());
    }
}
