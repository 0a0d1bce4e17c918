use clap::{value_parser, Arg, ArgAction, ArgMatches, ColorChoice, Command};
use crinex::prelude::{Config, Revision, Truncation};
use std::path::{Path, PathBuf};

pub struct Cli {
    /// arguments passed by user
    pub matches: ArgMatches,
}

impl Cli {
    pub fn new() -> Self {
        Self {
            matches: {
                Command::new("crx2rnx")
                    .author("Guillaume W. Bres <guillaume.bressaix@gmail.com>")
                    .version(env!("CARGO_PKG_VERSION"))
                    .about("Compact RINEX decompression tool")
                    .arg_required_else_help(true)
                    .color(ColorChoice::Always)
                    .next_help_heading("Input/Output")
                    .arg(
                        Arg::new("filepath")
                            .short('f')
                            .long("fp")
                            .action(ArgAction::Append)
                            .value_parser(value_parser!(PathBuf))
                            .required(true)
                            .help("Input CRINEX file. Use as many as needed, .gz files are supported."),
                    )
                    .arg(
                        Arg::new("output")
                            .short('o')
                            .long("output")
                            .action(ArgAction::Set)
                            .value_parser(value_parser!(PathBuf))
                            .help("Custom output file, only when decompressing a single file.
Otherwise, we follow standard naming conventions (.crx => .rnx, .YYd => .YYo)."),
                    )
                    .arg(
                        Arg::new("delete")
                            .long("delete")
                            .action(ArgAction::SetTrue)
                            .help("Delete CRINEX input once it was successfully decompressed."),
                    )
                    .arg(
                        Arg::new("jobs")
                            .short('j')
                            .long("jobs")
                            .action(ArgAction::Set)
                            .value_parser(value_parser!(usize))
                            .help("Number of files decompressed in parallel (defaults to 1)."),
                    )
                    .next_help_heading("Decompression")
                    .arg(
                        Arg::new("legacy")
                            .long("legacy")
                            .action(ArgAction::SetTrue)
                            .help("Legacy CRX2RNX behavior: premature end of file is an error,
arcs are limited to order 4 and CRINEX 3.1 / RINEX4 are not supported."),
                    )
                    .arg(
                        Arg::new("strict")
                            .long("strict")
                            .action(ArgAction::SetTrue)
                            .help("Premature end of file is an error."),
                    )
                    .arg(
                        Arg::new("max-order")
                            .long("max-order")
                            .action(ArgAction::Set)
                            .value_parser(value_parser!(usize))
                            .help("Highest arc order accepted (up to 5)."),
                    )
                    .get_matches()
            },
        }
    }
    /// Input files, in order of appearance
    pub fn input_paths(&self) -> Vec<&Path> {
        self.matches
            .get_many::<PathBuf>("filepath")
            .map(|paths| paths.map(|path| path.as_path()).collect())
            .unwrap_or_default()
    }
    pub fn output_path(&self) -> Option<&Path> {
        self.matches
            .get_one::<PathBuf>("output")
            .map(|path| path.as_path())
    }
    pub fn delete(&self) -> bool {
        self.matches.get_flag("delete")
    }
    pub fn jobs(&self) -> usize {
        self.matches
            .get_one::<usize>("jobs")
            .copied()
            .unwrap_or(1)
            .max(1)
    }
    /// Decoder settings deduced from the command line
    pub fn config(&self) -> Config {
        let revision = if self.matches.get_flag("legacy") {
            Revision::Legacy
        } else {
            Revision::Current
        };
        let mut config = Config::from(revision);
        if self.matches.get_flag("strict") {
            config = config.with_truncation(Truncation::Fail);
        }
        if let Some(order) = self.matches.get_one::<usize>("max-order") {
            config = config.with_max_order(*order);
        }
        config
    }
}
