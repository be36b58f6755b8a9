// Copyright (c) 2023 the fontbm contributors.
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fmt::Display;
use std::path::PathBuf;
use std::process::exit;

use clap::{CommandFactory, ErrorKind, Parser};
use fontbm_atlas::{AutoSize, CharRange, Color, Extent, Options, PackerKind};
use fontbm_format::DataFormat;
use tracing::{error, info, warn};
use yacexits::{EX_CONFIG, EX_NOINPUT, EX_OK, EX_USAGE};

mod config;

pub struct CommandError {
    message: String,
    exit_code: u32,
}

trait ToCommandError<T, E> {
    fn to_command_error<C: Display>(self, context: C, exit_code: u32) -> Result<T, CommandError>;
}

impl<T, E> ToCommandError<T, E> for Result<T, E>
where
    E: Display,
{
    fn to_command_error<C: Display>(self, context: C, exit_code: u32) -> Result<T, CommandError> {
        match self {
            Ok(ok) => Ok(ok),
            Err(e) => Err(CommandError {
                message: format!("{}: {}", context, e),
                exit_code,
            }),
        }
    }
}

impl<T> ToCommandError<T, ()> for Option<T> {
    fn to_command_error<C: Display>(self, context: C, exit_code: u32) -> Result<T, CommandError> {
        match self {
            Some(val) => Ok(val),
            None => Err(CommandError {
                message: context.to_string(),
                exit_code,
            }),
        }
    }
}

pub type CommandResult<T> = Result<T, CommandError>;

/// Converts TrueType/OpenType fonts into AngelCode BMFont bitmap fonts.
///
/// Flags take a single dash and an equals sign, e.g. `-font-size=64`.
#[derive(Debug, Parser)]
#[clap(name = "fontbm", version)]
pub struct Args {
    /// Font files (wildcards allowed) followed by the output directory.
    #[clap(required = true, min_values = 2, value_name = "INPUT... OUTPUT-DIR")]
    pub paths: Vec<String>,

    /// Inclusive code point range to bake [default: 32-126].
    #[clap(long, value_name = "START-END")]
    pub chars: Option<CharRange>,

    /// Bake exactly the characters of this string.
    #[clap(long, value_name = "TEXT")]
    pub chars_text: Option<String>,

    /// Bake the characters of this UTF-8 file.
    #[clap(long, value_name = "PATH")]
    pub chars_file: Option<PathBuf>,

    /// Font size in pixels [default: 32].
    #[clap(long, value_name = "N")]
    pub font_size: Option<u32>,

    /// Pixels left free right of and below each glyph [default: 1].
    #[clap(long, value_name = "N")]
    pub spacing: Option<u32>,

    /// Glyph color [default: 255,255,255,255].
    #[clap(long, value_name = "R,G,B[,A]")]
    pub color: Option<Color>,

    /// Atlas background color [default: 0,0,0,0].
    #[clap(long, value_name = "R,G,B[,A]")]
    pub background_color: Option<Color>,

    /// Atlas size; only a limit when auto-sizing is off [default: 256x256].
    #[clap(long, value_name = "WxH")]
    pub texture_size: Option<Extent>,

    /// Grow the texture or shrink the font until every glyph fits [default: texture].
    #[clap(long, value_name = "none|texture|font")]
    pub auto_size: Option<AutoSize>,

    /// Lay glyphs out in a fixed grid instead of packing them.
    #[clap(long)]
    pub no_packing: bool,

    /// Grid columns and rows for --no-packing [default: 9x10].
    #[clap(long, value_name = "COLSxROWS")]
    pub grid_size: Option<Extent>,

    /// Descriptor format [default: txt].
    #[clap(long, value_name = "txt|xml|bin")]
    pub data_format: Option<DataFormat>,

    /// Add an 8x8 solid white glyph at U+FFFE.
    #[clap(long)]
    pub include_blank_char: bool,

    /// Rectangle packing algorithm [default: guillotine].
    #[clap(long, value_name = "guillotine|skyline")]
    pub packer: Option<PackerKind>,

    /// TOML file with default option values.
    #[clap(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log debugging output.
    #[clap(long)]
    pub verbose: bool,
}

impl Args {
    /// Layers the command-line flags over `options`.
    pub fn apply(&self, options: &mut Options) {
        if self.chars.is_some() || self.chars_text.is_some() || self.chars_file.is_some() {
            options.chars = self.chars.unwrap_or_default();
            options.chars_text = self.chars_text.clone();
            options.chars_file = self.chars_file.clone();
        }

        if let Some(font_size) = self.font_size {
            options.font_size = font_size;
        }

        if let Some(spacing) = self.spacing {
            options.spacing = spacing;
        }

        if let Some(color) = self.color {
            options.color = color;
        }

        if let Some(color) = self.background_color {
            options.background_color = color;
        }

        if let Some(size) = self.texture_size {
            options.texture_size = size;
        }

        if let Some(auto_size) = self.auto_size {
            options.auto_size = auto_size;
        }

        if let Some(size) = self.grid_size {
            options.grid_size = size;
        }

        if let Some(format) = self.data_format {
            options.data_format = format;
        }

        if let Some(packer) = self.packer {
            options.packer = packer;
        }

        options.no_packing |= self.no_packing;
        options.include_blank_char |= self.include_blank_char;
    }

    pub fn options(&self) -> CommandResult<Options> {
        let mut options = match &self.config {
            Some(path) => config::load_config(path).to_command_error("loading config", EX_CONFIG)?,
            None => Options::default(),
        };

        self.apply(&mut options);
        options.validate().map_err(|err| CommandError {
            message: err.to_string(),
            exit_code: EX_USAGE,
        })?;
        Ok(options)
    }

    /// Splits the positional arguments into input patterns and the output
    /// directory.
    pub fn split_paths(&self) -> CommandResult<(&[String], PathBuf)> {
        let (output, inputs) = self
            .paths
            .split_last()
            .to_command_error("no output directory given", EX_USAGE)?;

        if inputs.is_empty() {
            return Err(CommandError {
                message: "no input fonts given".into(),
                exit_code: EX_USAGE,
            });
        }

        Ok((inputs, PathBuf::from(output)))
    }
}

/// Rewrites single-dash long flags (`-font-size=32`) into the double-dash
/// form clap expects, lowercasing the flag name. `-?` asks for help.
pub fn normalize_args(args: impl IntoIterator<Item = String>) -> Vec<String> {
    args.into_iter()
        .map(|arg| {
            if arg == "-?" {
                return "--help".to_string();
            }

            let Some(flag) = arg.strip_prefix('-') else {
                return arg;
            };

            if flag.starts_with('-') || !flag.starts_with(|c: char| c.is_ascii_alphabetic()) {
                return arg;
            }

            let (name, value) = match flag.split_once('=') {
                Some((name, value)) => (name, Some(value)),
                None => (flag, None),
            };

            // short flags such as -h and -V
            if name.len() == 1 && value.is_none() {
                return arg;
            }

            match value {
                Some(value) => format!("--{}={}", name.to_ascii_lowercase(), value),
                None => format!("--{}", name.to_ascii_lowercase()),
            }
        })
        .collect()
}

/// Expands wildcard patterns into font paths.
pub fn expand_inputs(patterns: &[String]) -> CommandResult<Vec<PathBuf>> {
    let mut inputs = vec![];
    for pattern in patterns {
        if !pattern.contains(|c| matches!(c, '*' | '?' | '[')) {
            inputs.push(PathBuf::from(pattern));
            continue;
        }

        let paths = glob::glob(pattern).to_command_error("invalid input pattern", EX_USAGE)?;
        let before = inputs.len();
        for entry in paths {
            match entry {
                Ok(path) => inputs.push(path),
                Err(err) => warn!("Skipping {:?}: {}", err.path(), err.error()),
            }
        }

        if inputs.len() == before {
            warn!("{:?} matched no files", pattern);
        }
    }

    Ok(inputs)
}

pub fn init_logging(verbose: bool) {
    let level = match verbose {
        true => tracing::Level::DEBUG,
        false => tracing::Level::INFO,
    };

    let format = tracing_subscriber::fmt::format().compact();
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .event_format(format)
        .init();
}

async fn run(args: Args) -> CommandResult<()> {
    let options = args.options()?;
    let (patterns, output_dir) = args.split_paths()?;
    let inputs = expand_inputs(patterns)?;
    if inputs.is_empty() {
        return Err(CommandError {
            message: "no input fonts found".into(),
            exit_code: EX_NOINPUT,
        });
    }

    let mut processed = 0;
    for path in inputs.iter() {
        let bundle = match fontbm_atlas::bake_file(path, &options).await {
            Ok(bundle) => bundle,
            Err(err) => {
                error!("Skipping {:?}: {}", path, err);
                continue;
            }
        };

        match bundle.save(&output_dir).await {
            Ok(_) => {
                info!("Processed {}", bundle.name);
                processed += 1;
            }
            Err(err) => error!("Failed to save {}: {}", bundle.name, err),
        }
    }

    if processed == 0 {
        return Err(CommandError {
            message: "no fonts were processed".into(),
            exit_code: EX_NOINPUT,
        });
    }

    info!("Done! {} of {} fonts processed", processed, inputs.len());
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = normalize_args(std::env::args());
    if args.len() < 2 {
        let _ = Args::command().print_help();
        exit(EX_OK as i32);
    }

    let args = match Args::try_parse_from(args) {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => exit(EX_OK as i32),
                _ => exit(EX_USAGE as i32),
            }
        }
    };

    init_logging(args.verbose);
    match run(args).await {
        Ok(_) => exit(EX_OK as i32),
        Err(e) => {
            eprintln!("ERROR: {}", e.message);
            exit(e.exit_code as i32)
        }
    }
}
