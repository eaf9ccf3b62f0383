//! Command line arguments and their validation
//!
//! Argument count and output extension are checked before any file is touched.

use argh::FromArgs;
use std::path::PathBuf;
use thiserror::Error;

/// Extension the output image must carry
pub const OUTPUT_EXTENSION: &str = ".png";

/// Plots append-only proof size and verification time against dictionary size
#[derive(FromArgs, Debug, Clone, PartialEq)]
pub struct Args {
    /// output PNG path followed by one or more CSV measurement files
    #[argh(positional)]
    pub paths: Vec<PathBuf>,

    /// open the chart in the system image viewer once written
    #[argh(switch, short = 's')]
    pub show: bool,

    /// JSON file overriding column names, units, axis and style
    #[argh(option, short = 'c')]
    pub config: Option<PathBuf>,

    /// force the log base of the dictionary size axis (default: 10 if every size is a multiple of 10, else 2)
    #[argh(option, short = 'b')]
    pub log_base: Option<f64>,

    /// don't print the averaged measurements
    #[argh(switch, short = 'q')]
    pub quiet: bool,
}

/// Errors in how the program was invoked
#[derive(Error, Debug)]
pub enum UsageError {
    #[error("Expected .png file as first argument, got '{0}'")]
    OutputExtension(String),
}

/// A validated request to draw one chart
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub output: PathBuf,
    pub inputs: Vec<PathBuf>,
    pub show: bool,
    pub config: Option<PathBuf>,
    pub log_base: Option<f64>,
    pub quiet: bool,
}

impl Invocation {
    /// Validates parsed arguments
    ///
    /// # Returns
    /// * `Ok(None)` - Fewer than two paths were given; the caller should print usage
    /// * `Ok(Some(Invocation))` - Arguments are usable
    /// * `Err(UsageError)` - The output path doesn't end in `.png`
    pub fn from_args(args: Args) -> Result<Option<Self>, UsageError> {
        let mut paths = args.paths.into_iter();
        let (Some(output), Some(first_input)) = (paths.next(), paths.next()) else {
            return Ok(None);
        };

        validate_output_path(&output)?;

        let mut inputs = vec![first_input];
        inputs.extend(paths);

        Ok(Some(Self {
            output,
            inputs,
            show: args.show,
            config: args.config,
            log_base: args.log_base,
            quiet: args.quiet,
        }))
    }
}

/// Rejects output paths that don't end in `.png`
pub fn validate_output_path(output: &std::path::Path) -> Result<(), UsageError> {
    let text = output.to_string_lossy();
    if text.ends_with(OUTPUT_EXTENSION) {
        Ok(())
    } else {
        Err(UsageError::OutputExtension(text.into_owned()))
    }
}

/// Short usage line printed when too few arguments are given
pub fn usage(program: &str) -> String {
    format!(
        "Usage: {} <output-png-file> <csv-file> [<csv-file>] ...\n\
         Run with --help for all options.",
        program
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn parse(arguments: &[&str]) -> Args {
        Args::from_args(&["plot-append-proof"], arguments).unwrap()
    }

    #[test]
    fn no_arguments_means_usage() {
        let invocation = Invocation::from_args(parse(&[])).unwrap();
        assert_eq!(invocation, None);
    }

    #[rstest]
    #[case::only_output(&["chart.png"])]
    #[case::only_flags(&["--show", "--quiet"])]
    fn too_few_paths_means_usage(#[case] arguments: &[&str]) {
        let invocation = Invocation::from_args(parse(arguments)).unwrap();
        assert_eq!(invocation, None);
    }

    #[test]
    fn wrong_extension_is_rejected_before_reading_inputs() {
        // The input doesn't exist; validation must fail on the extension alone.
        let result = Invocation::from_args(parse(&["chart.jpg", "does-not-exist.csv"]));
        assert!(matches!(result, Err(UsageError::OutputExtension(path)) if path == "chart.jpg"));
    }

    #[rstest]
    #[case("chart.png", true)]
    #[case("out/dir/append-proofs.png", true)]
    #[case("chart.PNG", false)]
    #[case("chart.png.bak", false)]
    #[case("png", false)]
    fn output_extension(#[case] path: &str, #[case] valid: bool) {
        assert_eq!(validate_output_path(std::path::Path::new(path)).is_ok(), valid);
    }

    #[test]
    fn collects_inputs_and_flags() {
        let args = parse(&[
            "chart.png",
            "a.csv",
            "b.csv.zst",
            "--show",
            "--config",
            "style.json",
            "--log-base",
            "2",
        ]);
        let invocation = Invocation::from_args(args).unwrap().unwrap();

        assert_eq!(invocation.output, PathBuf::from("chart.png"));
        assert_eq!(
            invocation.inputs,
            vec![PathBuf::from("a.csv"), PathBuf::from("b.csv.zst")]
        );
        assert!(invocation.show);
        assert!(!invocation.quiet);
        assert_eq!(invocation.config, Some(PathBuf::from("style.json")));
        assert_eq!(invocation.log_base, Some(2.0));
    }

    #[test]
    fn usage_names_program() {
        let text = usage("plot-append-proof");
        assert!(text.starts_with("Usage: plot-append-proof <output-png-file>"));
    }
}
