//! Command-line front end.
//!
//! Works on local SVG files: list their colors, build a recolor profile, or
//! recolor and export them.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use log::info;
use thiserror::Error;

use crate::catalog::{Diagram, DiagramId};
use crate::color::{ColorParseError, HexColor};
use crate::config::{ConfigError, StudioConfig};
use crate::editor::{Configurable, Editor};
use crate::error::ExportError;
use crate::export::{DirectorySaver, ExportFormat, Exporter};
use crate::profile::RecolorProfile;

/// Recolor SVG diagrams and export them as PNG, SVG or PDF
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None, arg_required_else_help = true)]
pub struct Args {
    /// Path to configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List the hex colors found in an SVG
    Colors {
        /// Path to the SVG file
        svg: PathBuf,
    },

    /// Recolor an SVG and export it
    Export {
        /// Path to the SVG file
        svg: PathBuf,

        /// Output format (png, svg, pdf)
        #[arg(short, long, default_value = "png")]
        format: ExportFormat,

        /// Title used for the output file name (default: the file stem)
        #[arg(short, long)]
        title: Option<String>,

        /// Color replacement ORIG=NEW, applied after any profile
        #[arg(short, long = "map", value_name = "ORIG=NEW", value_parser = parse_replacement)]
        maps: Vec<(HexColor, HexColor)>,

        /// Recolor profile (JSON) to apply first
        #[arg(short, long)]
        profile: Option<PathBuf>,

        /// Directory to write the export into
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// Print the recolor profile for a set of replacements as JSON
    Profile {
        /// Path to the SVG file
        svg: PathBuf,

        /// Color replacement ORIG=NEW
        #[arg(short, long = "map", value_name = "ORIG=NEW", value_parser = parse_replacement)]
        maps: Vec<(HexColor, HexColor)>,
    },
}

/// Errors reported by the command-line front end.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid profile: {0}")]
    Profile(#[from] serde_json::Error),

    #[error("color {0} does not occur in the diagram")]
    UnknownColor(HexColor),

    #[error("{}", .0.user_message())]
    Export(ExportError),
}

/// Parses `ORIG=NEW`.
pub fn parse_replacement(s: &str) -> Result<(HexColor, HexColor), String> {
    let (original, replacement) = s
        .split_once('=')
        .ok_or_else(|| format!("expected ORIG=NEW, got {s:?}"))?;
    let parse = |value: &str| -> Result<HexColor, String> {
        value.trim().parse().map_err(|e: ColorParseError| e.to_string())
    };
    Ok((parse(original)?, parse(replacement)?))
}

/// Runs the command selected by `args`.
pub fn run(args: &Args) -> Result<(), CliError> {
    let config = StudioConfig::load(args.config.as_deref())?;

    match &args.command {
        Command::Colors { svg } => {
            let editor = open_file(svg, None)?;
            for color in editor.session().original_colors() {
                println!("{color}");
            }
        }
        Command::Export {
            svg,
            format,
            title,
            maps,
            profile,
            out_dir,
        } => {
            let mut editor = open_file(svg, title.as_deref())?;
            if let Some(path) = profile {
                editor.apply_profile(&read_profile(path)?);
            }
            apply_replacements(&mut editor, maps)?;

            let exporter = Exporter::new(config.export.rasterizer(), DirectorySaver::new(out_dir))
                .with_pixel_ratio(config.export.pixel_ratio);
            let download = editor.download(&exporter, *format);
            if let Some(err) = download.error() {
                return Err(CliError::Export(err.clone()));
            }
            info!(
                file = out_dir.join(download.filename()).display().to_string();
                "Export written"
            );
        }
        Command::Profile { svg, maps } => {
            let mut editor = open_file(svg, None)?;
            apply_replacements(&mut editor, maps)?;
            println!("{}", editor.export_profile().to_json_pretty()?);
        }
    }

    Ok(())
}

fn read_text(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn read_profile(path: &Path) -> Result<RecolorProfile, CliError> {
    Ok(RecolorProfile::from_json(&read_text(path)?)?)
}

/// Opens a local SVG as an unsaved diagram.
fn open_file(path: &Path, title: Option<&str>) -> Result<Editor, CliError> {
    let svg = read_text(path)?;
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "diagram".to_string());

    let diagram = Diagram {
        id: DiagramId::new(stem.clone()),
        title: title.map(str::to_string).unwrap_or(stem),
        description: String::new(),
        tags: Vec::new(),
        colors: Vec::new(),
        svg_url: path.display().to_string(),
        created_at: 0,
        updated_at: 0,
    };
    Ok(Editor::open(diagram, svg))
}

fn apply_replacements(editor: &mut Editor, maps: &[(HexColor, HexColor)]) -> Result<(), CliError> {
    for (original, replacement) in maps {
        if editor.session().current_color(original).is_none() {
            return Err(CliError::UnknownColor(original.clone()));
        }
        editor.set_color(original, replacement.clone());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="8" height="4"><rect width="8" height="4" fill="#ff0000"/></svg>"##;

    #[test]
    fn parses_replacements() {
        let (a, b) = parse_replacement("#ff0000=#00f").unwrap();
        assert_eq!(a.as_str(), "#ff0000");
        assert_eq!(b.as_str(), "#00f");
        assert!(parse_replacement("#ff0000").is_err());
        assert!(parse_replacement("red=#000").is_err());
    }

    #[test]
    fn args_parse_export_command() {
        let args = Args::try_parse_from([
            "diagram-studio",
            "export",
            "in.svg",
            "--format",
            "pdf",
            "--map",
            "#ff0000=#000000",
            "--map",
            "#fff=#111",
        ])
        .unwrap();

        match args.command {
            Command::Export { format, maps, .. } => {
                assert_eq!(format, ExportFormat::Pdf);
                assert_eq!(maps.len(), 2);
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert_eq!(args.log_level, "info");
    }

    #[test]
    fn export_writes_recolored_svg() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("chart.svg");
        fs::write(&input, SVG).unwrap();
        let out = dir.path().join("out");

        let args = Args {
            config: None,
            log_level: "info".into(),
            command: Command::Export {
                svg: input,
                format: ExportFormat::Svg,
                title: Some("Sales Chart".into()),
                maps: vec![parse_replacement("#ff0000=#123456").unwrap()],
                profile: None,
                out_dir: out.clone(),
            },
        };
        run(&args).unwrap();

        let written = fs::read_to_string(out.join("Sales_Chart_svg.svg")).unwrap();
        assert!(written.contains("#123456"));
        assert!(!written.contains("#ff0000"));
    }

    #[test]
    fn unknown_colors_are_errors() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("chart.svg");
        fs::write(&input, SVG).unwrap();

        let mut editor = open_file(&input, None).unwrap();
        assert_eq!(editor.title(), "chart");
        let err = apply_replacements(&mut editor, &[parse_replacement("#abcdef=#000").unwrap()])
            .unwrap_err();
        assert!(matches!(err, CliError::UnknownColor(_)));
    }
}
