use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use swimboard::config::BoardConfig;
use swimboard::domain::{BoardId, CellKey, DragEnd, DragEntity, SwimlaneRef, TaskFilter};
use swimboard::repository::{BoardApi, HttpBoardApi, InMemoryBoardApi};
use swimboard::services::error_handling::UserErrorFormatter;
use swimboard::services::{BoardController, BoardState, DropOutcome, MutationState};
use swimboard::test_helpers::{sample_board, sample_tasks};

#[derive(Parser)]
#[command(name = "swimboard", about = "Kanban board client with optimistic drag-and-drop reordering", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Board to operate on (defaults to default_board from the config file)
    #[arg(short, long, global = true)]
    board: Option<String>,

    /// Use a seeded in-memory board instead of the configured backend
    #[arg(long, global = true)]
    offline: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the board grouped by swimlane and column
    Show(ShowArgs),
    /// Drop a task onto another task or into a cell
    MoveTask(MoveTaskArgs),
    /// Drop a column onto another column
    MoveColumn { column: String, onto: String },
    /// Drop a swimlane onto another swimlane
    MoveSwimlane { swimlane: String, onto: String },
    /// Write the config file, keeping values that are not given
    Init(InitArgs),
}

#[derive(Args)]
struct InitArgs {
    #[arg(long)]
    api_base_url: Option<String>,
    #[arg(long)]
    auth_token: Option<String>,
}

#[derive(Args)]
struct ShowArgs {
    /// Only show tasks whose title contains this text
    #[arg(long)]
    search: Option<String>,
    /// Only show tasks carrying this tag (repeatable)
    #[arg(long = "tag")]
    tags: Vec<String>,
}

#[derive(Args)]
struct MoveTaskArgs {
    task: String,
    /// Drop onto this task
    #[arg(long, conflicts_with = "cell", required_unless_present = "cell")]
    onto: Option<String>,
    /// Drop into the empty slot of a cell, written as swimlane/column ("default" for no swimlane)
    #[arg(long)]
    cell: Option<String>,
}

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    if let Err(e) = dispatch(cli).await {
        tracing::error!(error = %e, "Command failed");
        eprintln!("error: {}", UserErrorFormatter::format_for_ui(&e));
        std::process::exit(1);
    }
}

async fn dispatch(cli: Cli) -> Result<()> {
    if let Commands::Init(args) = cli.command {
        let mut config = BoardConfig::load()?;
        if let Some(url) = args.api_base_url {
            config.api_base_url = url;
        }
        if args.auth_token.is_some() {
            config.auth_token = args.auth_token;
        }
        if let Some(board) = cli.board {
            config.default_board = Some(BoardId::new(board));
        }
        config.save()?;
        println!("Wrote {}", BoardConfig::config_path()?.display());
        return Ok(());
    }

    if cli.offline {
        let board = sample_board();
        let api = Arc::new(InMemoryBoardApi::new(board.clone(), sample_tasks()));
        let state = BoardState::new(board, sample_tasks());
        let controller = BoardController::new(api, state, BoardConfig::default().resync_delay());
        return run(cli.command, controller).await;
    }

    let config = BoardConfig::load()?;
    let board_id = config.board_or_default(cli.board.map(BoardId::new))?;
    let api = Arc::new(HttpBoardApi::from_config(&config)?);
    let controller = BoardController::open(api, &board_id, config.resync_delay()).await?;
    run(cli.command, controller).await
}

async fn run<A: BoardApi + 'static>(command: Commands, controller: BoardController<A>) -> Result<()> {
    let event = match command {
        Commands::Show(args) => {
            let mut filter = TaskFilter {
                search: args.search,
                ..Default::default()
            };
            filter.tags.extend(args.tags);
            print_board(&controller, &filter).await;
            return Ok(());
        }
        Commands::MoveTask(args) => match (args.onto, args.cell) {
            (Some(onto), _) => DragEnd::task_onto_task(args.task, onto),
            (None, Some(cell)) => DragEnd::task_onto_cell(args.task, parse_cell(&cell)?),
            (None, None) => anyhow::bail!("either --onto or --cell is required"),
        },
        Commands::MoveColumn { column, onto } => DragEnd::column_onto(column, onto),
        Commands::MoveSwimlane { swimlane, onto } => DragEnd::swimlane_onto(swimlane, onto),
        Commands::Init(_) => anyhow::bail!("init does not need a board"),
    };

    controller.drag_start(event.active.clone()).await;
    if let DragEntity::Task(_) = &event.active {
        if let Some(preview) = controller.drag_preview().await {
            println!("Dragging \"{}\"", preview.title);
        }
    }

    match controller.drag_end(event).await {
        DropOutcome::Ignored => println!("Nothing to do: the drop did not change the board."),
        DropOutcome::Applied(report) => {
            match report.mutation.state {
                MutationState::Confirmed => println!("Saved."),
                state => {
                    println!("{}", UserErrorFormatter::format_mutation_failure(report.mutation.kind));
                    if state == MutationState::RolledBack {
                        if let Some(resync) = report.resync {
                            resync.await?;
                        }
                    }
                }
            }
        }
    }

    print_board(&controller, &TaskFilter::default()).await;
    Ok(())
}

fn parse_cell(raw: &str) -> Result<CellKey> {
    let (swimlane, column) = raw
        .split_once('/')
        .ok_or_else(|| anyhow::anyhow!("cell must look like swimlane/column, got '{}'", raw))?;
    Ok(CellKey::new(SwimlaneRef::from_raw(Some(swimlane)), column))
}

async fn print_board<A: BoardApi + 'static>(controller: &BoardController<A>, filter: &TaskFilter) {
    controller
        .with_grouping(filter, |board, index| {
            for lane in index.layout(board) {
                if lane.collapsed {
                    println!("== {} (collapsed) ==", lane.name);
                    continue;
                }
                println!("== {} ==", lane.name);
                for (column, tasks) in &lane.cells {
                    println!("  [{}]", board.column_name(column));
                    for task in tasks {
                        println!("    {} {}", task.id, task.title);
                    }
                }
            }
        })
        .await;
}
