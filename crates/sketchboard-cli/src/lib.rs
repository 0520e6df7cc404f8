//! Sketchboard inspector.
//!
//! Reads boards from a repository and prints what the engine sees: board
//! listings, item summaries, hit-test results and display lists.

use clap::{Parser, Subcommand};
use kurbo::{Point, Size};
use sketchboard_core::geometry::union_all;
use sketchboard_core::{
    Board, BoardRepository, ConfigError, EngineConfig, FileStorage, StorageError,
};
use sketchboard_render::{DisplayListRenderer, RenderContext, Renderer, RendererError};
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;

/// Inspector errors.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Render(#[from] RendererError),
    #[error("Output error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Parser, Debug)]
#[command(name = "sketchboard")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Board storage directory (defaults to the platform data directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub dir: Option<PathBuf>,

    /// Engine configuration file (JSON)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// What to inspect.
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// List stored boards
    List,
    /// Item counts, groups and bounds of a board
    Show { board_id: String },
    /// Topmost item at a canvas point
    #[command(allow_negative_numbers = true)]
    Hit {
        board_id: String,
        #[arg(value_parser = finite)]
        x: f64,
        #[arg(value_parser = finite)]
        y: f64,
    },
    /// Display list for a screen size
    Render {
        board_id: String,
        #[arg(value_parser = finite)]
        width: f64,
        #[arg(value_parser = finite)]
        height: f64,
    },
}

fn finite(value: &str) -> Result<f64, String> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("expected a finite number, got {:?}", value))
}

/// Load a stored board into a fresh engine.
pub fn load_board<R: BoardRepository>(
    repository: &R,
    config: EngineConfig,
    board_id: &str,
) -> Result<Board, CliError> {
    let meta = pollster::block_on(repository.load_board(board_id))?;
    let items = pollster::block_on(repository.load_board_items(board_id))?;
    let mut board = Board::with_config(config)?;
    board.load(meta, items);
    Ok(board)
}

/// Run one command against a repository, writing the report to `out`.
pub fn run<R: BoardRepository>(
    repository: &R,
    config: EngineConfig,
    command: &Command,
    out: &mut impl Write,
) -> Result<(), CliError> {
    match command {
        Command::List => {
            let boards = pollster::block_on(repository.list_boards())?;
            if boards.is_empty() {
                writeln!(out, "no boards")?;
            }
            for meta in boards {
                writeln!(out, "{}\t{}\t{}", meta.id, meta.title, meta.updated_at)?;
            }
        }
        Command::Show { board_id } => {
            let board = load_board(repository, config, board_id)?;
            let items = board.items();
            writeln!(out, "board {} {:?}", board.id(), board.meta().title)?;
            writeln!(
                out,
                "paths {} shapes {} texts {}",
                items.paths.len(),
                items.shapes.len(),
                items.texts.len()
            )?;
            writeln!(
                out,
                "groups {}",
                board.selection_engine().groups().group_count()
            )?;
            writeln!(
                out,
                "viewport scale {:.2} pan ({:.1}, {:.1})",
                board.viewport().scale,
                board.viewport().pan.x,
                board.viewport().pan.y
            )?;
            let measurer = board.measurer();
            match union_all(items.handles().iter().map(|h| h.bounds(measurer))) {
                Some(b) => writeln!(
                    out,
                    "bounds ({:.1}, {:.1})-({:.1}, {:.1})",
                    b.x0, b.y0, b.x1, b.y1
                )?,
                None => writeln!(out, "bounds none")?,
            }
        }
        Command::Hit { board_id, x, y } => {
            let board = load_board(repository, config, board_id)?;
            let point = Point::new(*x, *y);
            match board.item_at(point) {
                Some(item) => match item.group_id() {
                    Some(group) => {
                        writeln!(out, "{:?} {} group {}", item.kind(), item.id(), group)?
                    }
                    None => writeln!(out, "{:?} {}", item.kind(), item.id())?,
                },
                None => writeln!(out, "nothing at ({}, {})", point.x, point.y)?,
            }
        }
        Command::Render {
            board_id,
            width,
            height,
        } => {
            let board = load_board(repository, config, board_id)?;
            let mut renderer = DisplayListRenderer::new();
            renderer.build_scene(&RenderContext::new(&board, Size::new(*width, *height)))?;
            for command in renderer.scene().commands() {
                writeln!(out, "{}", command)?;
            }
        }
    }
    Ok(())
}

/// Open storage and configuration for a parsed command line and print to stdout.
pub fn run_cli(cli: Cli) -> Result<(), CliError> {
    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let storage = match cli.dir {
        Some(dir) => FileStorage::new(dir)?,
        None => FileStorage::default_location()?,
    };
    let stdout = io::stdout();
    run(&storage, config, &cli.command, &mut stdout.lock())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sketchboard_core::{BoardMeta, MemoryStorage, SerializableColor, ShapeData, ShapeKind};

    fn parse(line: &str) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("sketchboard").chain(line.split_whitespace()))
    }

    fn storage_with_square() -> (MemoryStorage, String) {
        let storage = MemoryStorage::new();
        pollster::block_on(storage.save_board(&BoardMeta::with_id("b1", "Sketch"))).unwrap();
        let shape = ShapeData::new(
            ShapeKind::Rectangle,
            Point::new(0.0, 0.0),
            Point::new(100.0, 100.0),
            SerializableColor::black(),
            2.0,
        )
        .with_filled(true);
        let id = shape.id.clone();
        pollster::block_on(storage.upsert_item("b1", &shape.into())).unwrap();
        (storage, id)
    }

    fn output(storage: &MemoryStorage, command: Command) -> String {
        let mut out = Vec::new();
        run(storage, EngineConfig::default(), &command, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_parse_commands() {
        let cli = parse("--dir /tmp/boards hit b1 10 20.5").unwrap();
        assert_eq!(cli.dir, Some(PathBuf::from("/tmp/boards")));
        assert_eq!(
            cli.command,
            Command::Hit {
                board_id: "b1".to_string(),
                x: 10.0,
                y: 20.5,
            }
        );

        let cli = parse("render b1 800 600 --config cfg.json").unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("cfg.json")));
        assert!(matches!(cli.command, Command::Render { .. }));

        let cli = parse("hit b1 -5 -7.5").unwrap();
        assert!(matches!(cli.command, Command::Hit { x, y, .. } if x == -5.0 && y == -7.5));
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse("").is_err());
        assert!(parse("show").is_err());
        assert!(parse("hit b1 x 2").is_err());
        assert!(parse("hit b1 NaN 2").is_err());
        assert!(parse("list extra").is_err());
        assert!(parse("--verbose list").is_err());
        assert!(parse("--dir").is_err());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let (storage, _) = storage_with_square();
        let config = EngineConfig {
            grid_size: 0.0,
            ..EngineConfig::default()
        };
        let result = load_board(&storage, config, "b1");
        assert!(matches!(result, Err(CliError::Config(ConfigError::Invalid(_)))));
    }

    #[test]
    fn test_list_and_show() {
        let (storage, _) = storage_with_square();
        let list = output(&storage, Command::List);
        assert!(list.starts_with("b1\tSketch\t"));

        let show = output(
            &storage,
            Command::Show {
                board_id: "b1".to_string(),
            },
        );
        assert!(show.contains("paths 0 shapes 1 texts 0"));
        assert!(show.contains("bounds (0.0, 0.0)-(100.0, 100.0)"));
    }

    #[test]
    fn test_hit() {
        let (storage, id) = storage_with_square();
        let hit = output(
            &storage,
            Command::Hit {
                board_id: "b1".to_string(),
                x: 50.0,
                y: 50.0,
            },
        );
        assert_eq!(hit.trim(), format!("Shape {}", id));

        let miss = output(
            &storage,
            Command::Hit {
                board_id: "b1".to_string(),
                x: 500.0,
                y: 500.0,
            },
        );
        assert!(miss.starts_with("nothing"));
    }

    #[test]
    fn test_render_and_missing_board() {
        let (storage, _) = storage_with_square();
        let render = output(
            &storage,
            Command::Render {
                board_id: "b1".to_string(),
                width: 400.0,
                height: 400.0,
            },
        );
        assert!(render.starts_with("clear "));
        assert!(render.contains("fill (0.0, 0.0)-(100.0, 100.0)"));

        let mut out = Vec::new();
        let result = run(
            &storage,
            EngineConfig::default(),
            &Command::Show {
                board_id: "missing".to_string(),
            },
            &mut out,
        );
        assert!(matches!(result, Err(CliError::Storage(StorageError::NotFound(_)))));
    }
}
