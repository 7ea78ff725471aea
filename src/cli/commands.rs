//! Command enum and argument parsing.

use std::path::PathBuf;

use chrono::{DateTime, Utc};

use super::dates::{parse_labels, parse_start_date};
use super::errors::CommandParseError;
use crate::error::ConfigError;
use crate::query::{MetricSpec, Profile, DEFAULT_BUCKET};
use crate::window::{WindowPlan, DEFAULT_WINDOW_HOURS};

/// Default number of daily windows for `analyze`.
pub const DEFAULT_DAYS: usize = 3;

/// Default PNG written by `combine` when `-o` is omitted.
pub const DEFAULT_COMBINED_OUTPUT: &str = "combined_graph.png";

/// Arguments of the `analyze` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzeArgs {
    /// Backend URL override.
    pub url: Option<String>,
    /// Bearer token override.
    pub token: Option<String>,
    /// Raw start date; `None` selects current-usage mode.
    pub date: Option<String>,
    /// Number of daily windows.
    pub days: usize,
    /// Window length in hours.
    pub window_hours: u32,
    /// Custom window labels, one per window.
    pub day_labels: Option<Vec<String>>,
    /// Metric profile.
    pub profile: Profile,
    /// Extra namespace to report CPU, memory and network for.
    pub namespace: Option<String>,
    /// Object bucket for the usage metric.
    pub bucket: String,
    /// Drop windows whose data starts after the window start.
    pub filter_incomplete: bool,
    /// Also export each series as CSV.
    pub csv: bool,
}

impl Default for AnalyzeArgs {
    fn default() -> Self {
        Self {
            url: None,
            token: None,
            date: None,
            days: DEFAULT_DAYS,
            window_hours: DEFAULT_WINDOW_HOURS,
            day_labels: None,
            profile: Profile::default(),
            namespace: None,
            bucket: DEFAULT_BUCKET.to_string(),
            filter_incomplete: false,
            csv: false,
        }
    }
}

impl AnalyzeArgs {
    /// Parsed start date, if one was given.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for a malformed date.
    pub fn start(&self) -> Result<Option<DateTime<Utc>>, ConfigError> {
        self.date.as_deref().map(parse_start_date).transpose()
    }

    /// Window plan for a dated run, `None` in current-usage mode.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for a malformed date, a zero
    /// day count or window length, or a label count that differs from
    /// the day count.
    pub fn window_plan(&self) -> Result<Option<WindowPlan>, ConfigError> {
        self.start()?
            .map(|start| {
                WindowPlan::new(start, self.days, self.window_hours, self.day_labels.clone())
            })
            .transpose()
    }

    /// Metrics selected by the profile plus the optional extra namespace.
    #[must_use]
    pub fn metrics(&self) -> Vec<MetricSpec> {
        let mut metrics = self.profile.metrics(&self.bucket);
        if let Some(namespace) = &self.namespace {
            metrics.extend(crate::query::namespace_metrics(namespace));
        }
        metrics
    }

    fn parse(args: &[String]) -> Result<Self, CommandParseError> {
        let mut parsed = Self::default();
        let mut i = 0;
        while i < args.len() {
            let flag = args[i].as_str();
            match flag {
                "--url" => parsed.url = Some(take_value(args, &mut i, flag)?),
                "--token" => parsed.token = Some(take_value(args, &mut i, flag)?),
                "--date" => parsed.date = Some(take_value(args, &mut i, flag)?),
                "--days" | "-d" => parsed.days = parse_number(args, &mut i, flag)?,
                "--window-hours" => parsed.window_hours = parse_number(args, &mut i, flag)?,
                "--day-labels" => {
                    parsed.day_labels = Some(parse_labels(&take_value(args, &mut i, flag)?));
                }
                "--spoke" => parsed.profile = Profile::Spoke,
                "--hub" => parsed.profile = Profile::Hub,
                "--namespace" | "-n" => parsed.namespace = Some(take_value(args, &mut i, flag)?),
                "--bucket" => parsed.bucket = take_value(args, &mut i, flag)?,
                "--filter-incomplete" => parsed.filter_incomplete = true,
                "--csv" => parsed.csv = true,
                _ => return Err(CommandParseError::UnknownFlag(args[i].clone())),
            }
            i += 1;
        }
        Ok(parsed)
    }
}

/// Arguments of the `combine` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombineArgs {
    /// Input CSV files, in order.
    pub files: Vec<PathBuf>,
    /// Chart path.
    pub output: PathBuf,
    /// Chart title override.
    pub title: Option<String>,
    /// Day separator labels.
    pub day_labels: Option<Vec<String>>,
    /// Raw x-axis start date.
    pub date: Option<String>,
    /// Also export the combined series as CSV.
    pub csv: bool,
}

impl CombineArgs {
    /// Parsed x-axis start date, if one was given.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for a malformed date.
    pub fn start(&self) -> Result<Option<DateTime<Utc>>, ConfigError> {
        self.date.as_deref().map(parse_start_date).transpose()
    }

    fn parse(args: &[String]) -> Result<Self, CommandParseError> {
        let mut files = Vec::new();
        let mut output = None;
        let mut title = None;
        let mut day_labels = None;
        let mut date = None;
        let mut csv = false;

        let mut i = 0;
        while i < args.len() {
            let arg = args[i].as_str();
            match arg {
                "--output" | "-o" => output = Some(PathBuf::from(take_value(args, &mut i, arg)?)),
                "--title" | "-t" => title = Some(take_value(args, &mut i, arg)?),
                "--days" => day_labels = Some(parse_labels(&take_value(args, &mut i, arg)?)),
                "--date" => date = Some(take_value(args, &mut i, arg)?),
                "--csv" => csv = true,
                _ if arg.starts_with('-') && arg.len() > 1 => {
                    return Err(CommandParseError::UnknownFlag(args[i].clone()));
                }
                _ => files.push(PathBuf::from(arg)),
            }
            i += 1;
        }

        if files.is_empty() {
            return Err(CommandParseError::MissingArgument("FILE".into()));
        }

        Ok(Self {
            files,
            output: output.unwrap_or_else(|| PathBuf::from(DEFAULT_COMBINED_OUTPUT)),
            title,
            day_labels,
            date,
            csv,
        })
    }
}

/// Top-level commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Query the backend over a window plan (or the last 24h).
    Analyze(AnalyzeArgs),
    /// Merge CSV exports into one chart.
    Combine(CombineArgs),
    /// Print usage.
    Help,
}

impl Command {
    /// Parse a command from arguments, without the program name.
    ///
    /// With no arguments, or with only flags, the command is `analyze`
    /// when the first argument is a flag and `help` when there is none.
    ///
    /// # Errors
    ///
    /// Returns [`CommandParseError`] for unknown commands or flags and
    /// for missing or malformed flag values.
    pub fn parse(args: &[String]) -> Result<Self, CommandParseError> {
        let Some(first) = args.first() else {
            return Ok(Self::Help);
        };

        match first.as_str() {
            "help" | "-h" | "--help" => Ok(Self::Help),
            _ if args.iter().any(|a| a == "-h" || a == "--help") => Ok(Self::Help),
            "analyze" => AnalyzeArgs::parse(&args[1..]).map(Self::Analyze),
            "combine" => CombineArgs::parse(&args[1..]).map(Self::Combine),
            flag if flag.starts_with("--") => AnalyzeArgs::parse(args).map(Self::Analyze),
            other => Err(CommandParseError::UnknownCommand(other.to_lowercase())),
        }
    }
}

fn take_value(args: &[String], i: &mut usize, flag: &str) -> Result<String, CommandParseError> {
    *i += 1;
    args.get(*i)
        .cloned()
        .ok_or_else(|| CommandParseError::MissingValue(flag.into()))
}

fn parse_number<T: std::str::FromStr>(
    args: &[String],
    i: &mut usize,
    flag: &str,
) -> Result<T, CommandParseError> {
    let raw = take_value(args, i, flag)?;
    raw.parse().map_err(|_| CommandParseError::InvalidValue {
        flag: flag.into(),
        value: raw,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_empty_is_help() {
        assert_eq!(Command::parse(&[]).unwrap(), Command::Help);
        assert_eq!(Command::parse(&args(&["--help"])).unwrap(), Command::Help);
        assert_eq!(
            Command::parse(&args(&["combine", "a.csv", "-h"])).unwrap(),
            Command::Help
        );
    }

    #[test]
    fn test_analyze_defaults() {
        let Command::Analyze(parsed) = Command::parse(&args(&["analyze"])).unwrap() else {
            panic!("expected analyze");
        };
        assert_eq!(parsed, AnalyzeArgs::default());
        assert_eq!(parsed.days, 3);
        assert_eq!(parsed.window_hours, 24);
        assert_eq!(parsed.bucket, "observability");
        assert!(parsed.window_plan().unwrap().is_none());
    }

    #[test]
    fn test_analyze_flags() {
        let parsed = Command::parse(&args(&[
            "analyze",
            "--url",
            "https://prom.example.com",
            "--token",
            "sha256~abcdefghij",
            "--date",
            "15/01/2024 00:00:00",
            "--days",
            "2",
            "--day-labels",
            "Install,Monitor",
            "--spoke",
            "--filter-incomplete",
            "--csv",
        ]))
        .unwrap();
        let Command::Analyze(parsed) = parsed else {
            panic!("expected analyze");
        };
        assert_eq!(parsed.url.as_deref(), Some("https://prom.example.com"));
        assert_eq!(parsed.profile, Profile::Spoke);
        assert!(parsed.filter_incomplete);
        assert!(parsed.csv);

        let plan = parsed.window_plan().unwrap().unwrap();
        assert_eq!(plan.len(), 2);
        assert_eq!(plan.start(), Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap());
        assert_eq!(plan.windows()[1].label, "Monitor");
    }

    #[test]
    fn test_leading_flag_implies_analyze() {
        let parsed = Command::parse(&args(&["--spoke"])).unwrap();
        assert!(matches!(parsed, Command::Analyze(a) if a.profile == Profile::Spoke));
    }

    #[test]
    fn test_label_count_mismatch_is_config_error() {
        let Command::Analyze(parsed) = Command::parse(&args(&[
            "analyze",
            "--date",
            "15/01/2024",
            "--day-labels",
            "a,b",
        ]))
        .unwrap() else {
            panic!("expected analyze");
        };
        let err = parsed.window_plan().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref var, .. } if var == "--day-labels"));
    }

    #[test]
    fn test_overflowing_window_hours_is_config_error() {
        let Command::Analyze(parsed) = Command::parse(&args(&[
            "analyze",
            "--date",
            "15/01/2024",
            "--days",
            "1",
            "--window-hours",
            "4294967295",
        ]))
        .unwrap() else {
            panic!("expected analyze");
        };
        let err = parsed.window_plan().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref var, .. } if var == "--window-hours"));
    }

    #[test]
    fn test_malformed_date_is_config_error() {
        let Command::Analyze(parsed) =
            Command::parse(&args(&["analyze", "--date", "2024-01-15"])).unwrap()
        else {
            panic!("expected analyze");
        };
        assert!(parsed.window_plan().is_err());
    }

    #[test]
    fn test_namespace_adds_metrics() {
        let base = AnalyzeArgs::default().metrics().len();
        let with_ns = AnalyzeArgs {
            namespace: Some("my-app".into()),
            ..AnalyzeArgs::default()
        };
        assert_eq!(with_ns.metrics().len(), base + 3);
    }

    #[test]
    fn test_analyze_errors() {
        assert_eq!(
            Command::parse(&args(&["analyze", "--days"])).unwrap_err(),
            CommandParseError::MissingValue("--days".into())
        );
        assert_eq!(
            Command::parse(&args(&["analyze", "--days", "three"])).unwrap_err(),
            CommandParseError::InvalidValue {
                flag: "--days".into(),
                value: "three".into(),
            }
        );
        assert_eq!(
            Command::parse(&args(&["analyze", "--verbose"])).unwrap_err(),
            CommandParseError::UnknownFlag("--verbose".into())
        );
        assert_eq!(
            Command::parse(&args(&["plot"])).unwrap_err(),
            CommandParseError::UnknownCommand("plot".into())
        );
    }

    #[test]
    fn test_combine() {
        let parsed = Command::parse(&args(&[
            "combine",
            "a.csv",
            "b.csv",
            "-o",
            "out/graph.png",
            "-t",
            "Bucket",
            "--days",
            "Install,Test,Monitor",
            "--date",
            "12/10/2025",
        ]))
        .unwrap();
        let Command::Combine(parsed) = parsed else {
            panic!("expected combine");
        };
        assert_eq!(parsed.files, vec![PathBuf::from("a.csv"), PathBuf::from("b.csv")]);
        assert_eq!(parsed.output, PathBuf::from("out/graph.png"));
        assert_eq!(parsed.title.as_deref(), Some("Bucket"));
        assert_eq!(parsed.day_labels.as_ref().map(Vec::len), Some(3));
        assert_eq!(
            parsed.start().unwrap(),
            Some(Utc.with_ymd_and_hms(2025, 10, 12, 0, 0, 0).unwrap())
        );
        assert!(!parsed.csv);
    }

    #[test]
    fn test_combine_requires_files() {
        assert_eq!(
            Command::parse(&args(&["combine", "-o", "x.png"])).unwrap_err(),
            CommandParseError::MissingArgument("FILE".into())
        );
    }

    #[test]
    fn test_combine_default_output() {
        let Command::Combine(parsed) = Command::parse(&args(&["combine", "a.csv"])).unwrap() else {
            panic!("expected combine");
        };
        assert_eq!(parsed.output, PathBuf::from(DEFAULT_COMBINED_OUTPUT));
    }
}
