//! Command-line arguments.

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use missive_render::Syntax;

use crate::output::OutputMode;

/// Render one message per recipient from a template and a data file.
///
/// The data file's extension selects its format: .json, .yaml, .yml or .toml.
/// Messages are printed, not sent.
#[derive(Debug, Clone, Parser)]
#[command(name = "missive", version, about)]
pub struct Cli {
    /// Template file, e.g. `Hello {{.name}}!`
    #[arg(
        short,
        long,
        value_name = "PATH",
        required_unless_present = "list_formats"
    )]
    pub template: Option<PathBuf>,

    /// Recipient data file
    #[arg(
        short,
        long,
        value_name = "PATH",
        required_unless_present = "list_formats"
    )]
    pub data: Option<PathBuf>,

    /// Output format: text, json, yaml or csv
    #[arg(short, long, value_name = "MODE", default_value_t = OutputMode::Text)]
    pub output: OutputMode,

    /// Template syntax: placeholder or jinja
    #[arg(long, value_name = "SYNTAX", default_value_t = Syntax::Placeholder)]
    pub syntax: Syntax,

    /// Print messages exactly as rendered, without line-break conversion
    #[arg(long)]
    pub raw: bool,

    /// Only print these recipients (repeatable)
    #[arg(long = "recipient", value_name = "ID")]
    pub recipients: Vec<String>,

    /// Increase log verbosity on stderr (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Also write debug logs to this file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// List supported data formats and exit
    #[arg(long)]
    pub list_formats: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["missive", "-t", "msg.tmpl", "-d", "people.yaml"]).unwrap();
        assert_eq!(cli.output, OutputMode::Text);
        assert_eq!(cli.syntax, Syntax::Placeholder);
        assert!(!cli.raw);
        assert!(cli.recipients.is_empty());
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_all_flags() {
        let cli = Cli::try_parse_from([
            "missive",
            "--template",
            "msg.tmpl",
            "--data",
            "people.toml",
            "-o",
            "csv",
            "--syntax",
            "jinja",
            "--raw",
            "--recipient",
            "alice",
            "--recipient",
            "bob",
            "-vv",
            "--log-file",
            "missive.log",
        ])
        .unwrap();

        assert_eq!(cli.output, OutputMode::Csv);
        assert_eq!(cli.syntax, Syntax::Jinja);
        assert!(cli.raw);
        assert_eq!(cli.recipients, vec!["alice", "bob"]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.log_file, Some(PathBuf::from("missive.log")));
    }

    #[test]
    fn test_template_required() {
        assert!(Cli::try_parse_from(["missive", "-d", "people.json"]).is_err());
    }

    #[test]
    fn test_list_formats_needs_no_files() {
        let cli = Cli::try_parse_from(["missive", "--list-formats"]).unwrap();
        assert!(cli.list_formats);
        assert!(cli.template.is_none());
    }

    #[test]
    fn test_invalid_output_mode() {
        assert!(Cli::try_parse_from(["missive", "-t", "a", "-d", "b.json", "-o", "xml"]).is_err());
    }
}
