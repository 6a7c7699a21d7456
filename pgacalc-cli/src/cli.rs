use std::{
    env,
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
};

use anyhow::{Context, Result};
use clap::{ArgAction, CommandFactory, Parser};
use tracing::{error, info, warn};

use pgacalc_core::{
    Calculator, Config, Estimate, PgaRequest, SecondarySelection, calc::load_logic_trees,
    model::ARGUMENT_NAMES,
};

use crate::logging;

const USAGE_NOTES: &str = "\
Where SITE_LON and EQ_LON are longitude values (decimal degrees between -360 and 360),
SITE_LAT and EQ_LAT are latitude values (decimal degrees between -90 and 90),
EQ_MAG is the moment magnitude (Mw between -2 and 9.7) of the earthquake,
EQ_DEPTH is the depth (km between -5 and 700) of the earthquake and
VS30 is the optional average shear-wave velocity (m/s between 150 and 2000) of the site.

Only sites in the conterminous US are supported.";

/// Exit status for any failed calculation.
const FAILURE: u8 = 2;

const NO_RESULT_FLAG: &str = "--no-result";
const NO_RESULT_ENV: &str = "PGACALC_NO_RESULT";

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "pgacalc",
    version,
    about = "Deterministic peak ground acceleration calculator",
    allow_negative_numbers = true,
    after_help = USAGE_NOTES
)]
pub struct Cli {
    /// Site and earthquake parameters.
    #[arg(
        value_names = ARGUMENT_NAMES,
        num_args = 7..=8,
        required_unless_present_any = ["print_trees", "save_config"]
    )]
    pub args: Vec<String>,

    /// Read configuration from this file instead of the platform default.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory holding gmm.xml and the other resource documents.
    #[arg(long, value_name = "DIR", env = "GMPEGMM_RESOURCE_DIR")]
    pub resource_dir: Option<PathBuf>,

    /// Text printed instead of a value when no result is available.
    #[arg(long, value_name = "TEXT", env = NO_RESULT_ENV)]
    pub no_result: Option<String>,

    /// Far-field set selection: "fallback" or "gated".
    #[arg(long, value_name = "POLICY")]
    pub secondary: Option<SecondarySelection>,

    /// More log output on stderr (-v info, -vv debug).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Print the logic trees for every region and exit.
    #[arg(long)]
    pub print_trees: bool,

    /// Write the effective configuration to the config file and exit.
    #[arg(long, conflicts_with = "print_trees")]
    pub save_config: bool,
}

/// Handle a command line clap rejected. Help and version requests succeed;
/// anything else prints the placeholder (if one was given) and the usage.
pub fn parse_failure(err: clap::Error) -> ExitCode {
    if !err.use_stderr() {
        let _ = err.print();
        return ExitCode::SUCCESS;
    }
    let args: Vec<String> = env::args_os().map(|arg| arg.to_string_lossy().into_owned()).collect();
    let placeholder = placeholder_from_args(&args).or_else(|| env::var(NO_RESULT_ENV).ok());
    let _ = err.print();
    fail(&mut io::stdout().lock(), placeholder.as_deref())
}

/// Value of `--no-result` on a raw command line, in either the
/// `--no-result TEXT` or the `--no-result=TEXT` form. The last one wins.
fn placeholder_from_args<S: AsRef<str>>(args: &[S]) -> Option<String> {
    let mut placeholder = None;
    let mut iter = args.iter().map(AsRef::as_ref);
    while let Some(arg) = iter.next() {
        if arg == "--" {
            break;
        }
        if arg == NO_RESULT_FLAG {
            if let Some(value) = iter.next() {
                placeholder = Some(value.to_string());
            }
        } else if let Some(value) =
            arg.strip_prefix(NO_RESULT_FLAG).and_then(|rest| rest.strip_prefix('='))
        {
            placeholder = Some(value.to_string());
        }
    }
    placeholder
}

/// Placeholder on `out`, usage on stderr.
fn fail(out: &mut impl Write, placeholder: Option<&str>) -> ExitCode {
    if let Some(text) = placeholder {
        let _ = writeln!(out, "{text}");
    }
    eprintln!("{}", Cli::command().render_help());
    ExitCode::from(FAILURE)
}

impl Cli {
    pub fn run(self) -> ExitCode {
        let config = match self.load_config() {
            Ok(config) => config,
            Err(err) => {
                eprintln!("Error: {err:#}");
                return fail(&mut io::stdout().lock(), self.no_result.as_deref());
            }
        };
        logging::init(self.verbose, &config.log_level);
        info!("pgacalc v{}", env!("CARGO_PKG_VERSION"));

        let result =
            if self.save_config { self.write_config(&config) } else { self.execute(&config) };
        match result {
            Ok(output) => {
                println!("{output}");
                ExitCode::SUCCESS
            }
            Err(err) => {
                error!("{err:#}");
                fail(&mut io::stdout().lock(), config.no_result_text.as_deref())
            }
        }
    }

    /// Write `config` to `--config`, or to the platform config file.
    fn write_config(&self, config: &Config) -> Result<String> {
        let path = match &self.config {
            Some(path) => path.clone(),
            None => Config::config_file_path()?,
        };
        config.save_to(&path)?;
        info!(path = %path.display(), "configuration saved");
        Ok(format!("Configuration saved to {}", path.display()))
    }

    /// Config file, with command-line and environment overrides applied.
    fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load_from(path)?,
            None => Config::load()?,
        };
        if let Some(dir) = &self.resource_dir {
            config.resource_dir = Some(dir.clone());
        }
        if let Some(text) = &self.no_result {
            config.no_result_text = Some(text.clone());
        }
        if let Some(policy) = self.secondary {
            config.secondary_selection = policy;
        }
        Ok(config)
    }

    fn execute(&self, config: &Config) -> Result<String> {
        let trees = load_logic_trees(&config.resource_locator())
            .context("Failed to load the logic tree table")?;
        if self.print_trees {
            return Ok(trees.to_string().trim_end().to_string());
        }

        let request = PgaRequest::from_args(self.args.as_slice(), config.default_vs30)?;
        let calculator = Calculator::from_config(config)?;
        let response = calculator.calculate(&request)?;

        let output = match response.estimate() {
            Estimate::Value(pga) => format!("{pga:.6}"),
            Estimate::NoEstimate => {
                warn!(
                    site = %response.site_name,
                    region = %response.region,
                    distance = response.distance,
                    "no ground motion models apply"
                );
                config.no_result_text.clone().unwrap_or_else(|| format!("{:.6}", 0.0))
            }
        };
        info!("PGA={output}");
        Ok(output)
    }
}
