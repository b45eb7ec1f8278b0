pub mod duration;

use std::path::PathBuf;
use std::time::Duration;

use chunksplit_core::{DEFAULT_BITRATE_KBPS, SUPPORTED_BITRATES_KBPS};
use clap::parser::ValueSource;
use clap::{builder::ValueParser, value_parser, Arg, ArgAction, ArgMatches, Command};

pub use duration::parse_duration;

/// Chunk length used when `--duracao` is not given.
pub const DEFAULT_CHUNK_LENGTH: Duration = Duration::from_secs(180);

pub const USAGE_HINT: &str = "Pass --interface to open the graphical interface, or --arquivo and \
--pasta to split an audio file from the command line.";

/// Encoding settings shared by both front ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SplitSettings {
    pub chunk_length: Duration,
    pub bitrate_kbps: u32,
}

impl Default for SplitSettings {
    fn default() -> Self {
        Self {
            chunk_length: DEFAULT_CHUNK_LENGTH,
            bitrate_kbps: DEFAULT_BITRATE_KBPS,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchJob {
    pub input: PathBuf,
    pub output: PathBuf,
    pub settings: SplitSettings,
    pub dry_run: bool,
}

/// What the process should do, decided from the parsed arguments alone.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    Interface(SplitSettings),
    Batch(BatchJob),
    Usage,
}

fn parse_bitrate(value: &str) -> Result<u32, String> {
    let kbps: u32 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid bitrate '{value}'"))?;
    if SUPPORTED_BITRATES_KBPS.contains(&kbps) {
        Ok(kbps)
    } else {
        let supported: Vec<String> = SUPPORTED_BITRATES_KBPS
            .iter()
            .map(ToString::to_string)
            .collect();
        Err(format!(
            "unsupported bitrate {kbps}; expected one of {}",
            supported.join(", ")
        ))
    }
}

pub fn build_cli() -> Command {
    Command::new(env!("CARGO_PKG_NAME"))
        .about("Split an audio file into fixed-length MP3 chunks")
        .version(env!("CARGO_PKG_VERSION"))
        .after_help(USAGE_HINT)
        .arg(
            Arg::new("interface")
                .long("interface")
                .help("Open the graphical interface")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("arquivo")
                .long("arquivo")
                .value_name("FILE")
                .help("Path to the input audio file")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("pasta")
                .long("pasta")
                .value_name("DIR")
                .help("Directory where the chunks will be written")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("duracao")
                .long("duracao")
                .value_name("DURATION")
                .help("Length of each chunk in seconds, or with units (e.g. 180, 3m, 2m30s)")
                .default_value("180")
                .value_parser(ValueParser::new(parse_duration)),
        )
        .arg(
            Arg::new("bitrate")
                .long("bitrate")
                .value_name("KBPS")
                .help("Constant MP3 bitrate of the chunks")
                .default_value("128")
                .value_parser(ValueParser::new(parse_bitrate)),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .help("List the chunks that would be written without writing them")
                .action(ArgAction::SetTrue),
        )
}

/// Pick the entry mode: no arguments or `--interface` opens the window, both
/// paths run a batch split, anything else prints the usage hint.
pub fn select_mode(matches: &ArgMatches) -> Mode {
    let settings = SplitSettings {
        chunk_length: matches
            .get_one::<Duration>("duracao")
            .copied()
            .unwrap_or(DEFAULT_CHUNK_LENGTH),
        bitrate_kbps: matches
            .get_one::<u32>("bitrate")
            .copied()
            .unwrap_or(DEFAULT_BITRATE_KBPS),
    };

    let any_given = matches
        .ids()
        .any(|id| matches.value_source(id.as_str()) == Some(ValueSource::CommandLine));

    if !any_given || matches.get_flag("interface") {
        return Mode::Interface(settings);
    }

    match (
        matches.get_one::<PathBuf>("arquivo"),
        matches.get_one::<PathBuf>("pasta"),
    ) {
        (Some(input), Some(output)) => Mode::Batch(BatchJob {
            input: input.clone(),
            output: output.clone(),
            settings,
            dry_run: matches.get_flag("dry-run"),
        }),
        _ => Mode::Usage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mode_for(args: &[&str]) -> Mode {
        let argv = std::iter::once("chunksplit").chain(args.iter().copied());
        let matches = build_cli().try_get_matches_from(argv).unwrap();
        select_mode(&matches)
    }

    #[test]
    fn no_arguments_open_the_interface() {
        assert_eq!(mode_for(&[]), Mode::Interface(SplitSettings::default()));
    }

    #[test]
    fn interface_flag_wins_over_paths() {
        let mode = mode_for(&["--interface", "--arquivo", "a.mp3", "--pasta", "out"]);
        assert_eq!(mode, Mode::Interface(SplitSettings::default()));
    }

    #[test]
    fn interface_receives_configured_duration() {
        let mode = mode_for(&["--interface", "--duracao", "2m"]);
        assert_eq!(
            mode,
            Mode::Interface(SplitSettings {
                chunk_length: Duration::from_secs(120),
                bitrate_kbps: DEFAULT_BITRATE_KBPS,
            })
        );
    }

    #[test]
    fn both_paths_run_a_batch_with_default_duration() {
        let mode = mode_for(&["--arquivo", "song.ogg", "--pasta", "parts"]);
        assert_eq!(
            mode,
            Mode::Batch(BatchJob {
                input: PathBuf::from("song.ogg"),
                output: PathBuf::from("parts"),
                settings: SplitSettings::default(),
                dry_run: false,
            })
        );
    }

    #[test]
    fn batch_accepts_duration_bitrate_and_dry_run() {
        let mode = mode_for(&[
            "--arquivo",
            "song.ogg",
            "--pasta",
            "parts",
            "--duracao",
            "60",
            "--bitrate",
            "192",
            "--dry-run",
        ]);
        let Mode::Batch(job) = mode else {
            panic!("expected batch mode, got {mode:?}");
        };
        assert_eq!(job.settings.chunk_length, Duration::from_secs(60));
        assert_eq!(job.settings.bitrate_kbps, 192);
        assert!(job.dry_run);
    }

    #[test]
    fn partial_arguments_print_usage() {
        assert_eq!(mode_for(&["--arquivo", "song.ogg"]), Mode::Usage);
        assert_eq!(mode_for(&["--pasta", "parts"]), Mode::Usage);
        assert_eq!(mode_for(&["--duracao", "60"]), Mode::Usage);
    }

    #[test]
    fn rejects_invalid_duration_and_bitrate() {
        assert!(build_cli()
            .try_get_matches_from(["chunksplit", "--duracao", "0"])
            .is_err());
        assert!(build_cli()
            .try_get_matches_from(["chunksplit", "--bitrate", "100"])
            .is_err());
    }

    #[test]
    fn parse_bitrate_lists_supported_values() {
        assert_eq!(parse_bitrate("320"), Ok(320));
        let err = parse_bitrate("100").unwrap_err();
        assert!(err.contains("128"));
    }
}
