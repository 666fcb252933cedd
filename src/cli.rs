//! Command-line flags of the `nominasplit` binary.

/// Flags that consume the following argument.
const VALUE_FLAGS: [&str; 4] = ["--config", "--mode", "--engine", "--out"];

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub config: Option<String>,
    pub mode: Option<String>,
    pub engine: Option<String>,
    pub out: Option<String>,
    pub period_folder: Option<bool>,
    /// First positional argument: the input glob.
    pub input: Option<String>,
}

/// Parse `args` as given by `std::env::args()` (program name first).
/// A value flag without a value and an `on`/`off` switch with any other
/// value are errors.
pub fn parse_args(args: &[String]) -> Result<CliArgs, String> {
    let mut cli = CliArgs::default();
    let mut rest = args.iter().skip(1);
    while let Some(a) = rest.next() {
        if VALUE_FLAGS.contains(&a.as_str()) {
            let value = match rest.next() {
                Some(v) if !v.starts_with("--") => v.clone(),
                _ => return Err(format!("{} requires a value", a)),
            };
            let slot = match a.as_str() {
                "--config" => &mut cli.config,
                "--mode" => &mut cli.mode,
                "--engine" => &mut cli.engine,
                _ => &mut cli.out,
            };
            *slot = Some(value);
            continue;
        }
        if a == "--period-folder" {
            cli.period_folder = Some(true);
            continue;
        }
        if let Some(v) = a.strip_prefix("--period-folder=") {
            cli.period_folder = Some(parse_switch("--period-folder", v)?);
            continue;
        }
        if !a.starts_with("--") && cli.input.is_none() {
            cli.input = Some(a.clone());
        }
    }
    Ok(cli)
}

fn parse_switch(flag: &str, value: &str) -> Result<bool, String> {
    match value {
        "on" => Ok(true),
        "off" => Ok(false),
        other => Err(format!("{} expects on or off, got {:?}", flag, other)),
    }
}
