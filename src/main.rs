//! # Undercroft Main Entry Point
//!
//! Generates a dungeon from the command line, prints it, and optionally walks
//! through it interactively.

use clap::Parser;
use log::{error, info};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use undercroft::{
    describe_room, minimap_legend, render_minimap, render_room, GameEvent, GameState,
    GenerationConfig, InputHandler, PlayerInput, RoomEvent, UndercroftResult,
};

/// Command line arguments for the Undercroft generator.
#[derive(Parser, Debug)]
#[command(name = "undercroft")]
#[command(about = "A seeded room-grid dungeon generator")]
#[command(version)]
struct Args {
    /// Random seed for dungeon generation
    #[arg(short, long)]
    seed: Option<u64>,

    /// JSON file with generation settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Grid width in rooms
    #[arg(long)]
    grid_width: Option<i32>,

    /// Grid height in rooms
    #[arg(long)]
    grid_height: Option<i32>,

    /// Number of main path steps
    #[arg(long)]
    main_path_length: Option<usize>,

    /// Walk through the dungeon with typed commands
    #[arg(short, long)]
    interactive: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() {
    let args = Args::parse();

    // Initialize logging
    env_logger::Builder::new()
        .parse_filters(&args.log_level)
        .format_timestamp(None)
        .init();

    if let Err(e) = run(&args) {
        error!("{e}");
        eprintln!("undercroft: {e}");
        std::process::exit(1);
    }
}

/// Builds the generation config from the optional file plus flag overrides.
fn build_config(args: &Args) -> UndercroftResult<GenerationConfig> {
    let mut config = match &args.config {
        Some(path) => GenerationConfig::from_json_file(path)?,
        None => GenerationConfig::default(),
    };

    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if let Some(width) = args.grid_width {
        config.grid_width = width;
    }
    if let Some(height) = args.grid_height {
        config.grid_height = height;
    }
    if let Some(length) = args.main_path_length {
        config.main_path_length = length;
    }

    config.validate()?;
    Ok(config)
}

fn run(args: &Args) -> UndercroftResult<()> {
    info!("Starting Undercroft v{}", undercroft::VERSION);

    let config = build_config(args)?;
    let mut state = GameState::new(config)?;
    print_summary(&state);

    if args.interactive {
        run_interactive(&mut state)?;
    }
    Ok(())
}

fn print_summary(state: &GameState) {
    let dungeon = &state.dungeon;
    println!("Seed: {}", dungeon.seed());
    println!(
        "Rooms: {}  main path: {}  deepest: {}",
        dungeon.room_count(),
        dungeon.unique_main_path().len(),
        dungeon.depth_map().values().max().copied().unwrap_or(0)
    );
    println!(
        "Shop: {}  Treasure: {}  Boss: {}",
        fmt_pos(dungeon.shop()),
        dungeon
            .treasures()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" "),
        fmt_pos(dungeon.boss())
    );
    println!();
    println!("{}", render_minimap(dungeon));
    println!("{}", minimap_legend());
    println!();
    if let Some(room) = dungeon.current_room() {
        println!("{}", render_room(room));
    }
    println!("{}", describe_room(dungeon));
}

fn fmt_pos(pos: Option<undercroft::GridPos>) -> String {
    pos.map_or_else(|| "none".to_string(), |p| p.to_string())
}

fn run_interactive(state: &mut GameState) -> UndercroftResult<()> {
    let handler = InputHandler::new();
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    println!("Type 'help' for commands.");
    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }

        let input = match handler.parse(&line) {
            Ok(input) => input,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };

        match input {
            PlayerInput::Quit => break,
            PlayerInput::Help => println!("{}", handler.help_text()),
            PlayerInput::ShowMap => {
                println!("{}", render_minimap(&state.dungeon));
                println!("{}", minimap_legend());
            }
            PlayerInput::ShowRoom => {
                if let Some(room) = state.dungeon.current_room() {
                    println!("{}", render_room(room));
                }
                println!("{}", describe_room(&state.dungeon));
            }
            _ => match state.handle_input(input) {
                Ok(events) => report(state, &events),
                Err(e) => println!("{e}"),
            },
        }
    }

    let stats = &state.statistics;
    println!(
        "Explored {}/{} rooms in {} moves, cleared {}, bosses defeated {}, items found {}",
        stats.rooms_explored,
        stats.rooms_total,
        stats.moves,
        stats.rooms_cleared,
        stats.bosses_defeated,
        stats.items_found
    );
    Ok(())
}

fn report(state: &GameState, events: &[GameEvent]) {
    for event in events {
        match event {
            GameEvent::Moved { direction, to, .. } => {
                println!("You go {} to {}.", direction.name(), to);
            }
            GameEvent::Room { event, .. } => match event {
                RoomEvent::EnemiesSpawned { count } => println!("{count} enemies attack!"),
                RoomEvent::BossAwakened { boss } => {
                    println!("{} awakens!", boss.blueprint().name);
                }
                RoomEvent::DoorsLocked => println!("The doors slam shut."),
                RoomEvent::DoorsUnlocked => println!("The doors open."),
                RoomEvent::ShopStocked { items } => {
                    println!("A merchant offers: {}", items.join(", "));
                }
                RoomEvent::RoomCleared { boss: Some(boss) } => {
                    println!("{} is defeated!", boss.blueprint().name);
                }
                RoomEvent::RoomCleared { boss: None } => println!("The room falls quiet."),
                RoomEvent::Left => {}
            },
            GameEvent::ContainerOpened { item, .. } => println!("You find {item}."),
            GameEvent::NewDungeon { seed } => println!("A new dungeon rises (seed {seed})."),
        }
    }

    if events
        .iter()
        .any(|e| matches!(e, GameEvent::Moved { .. } | GameEvent::NewDungeon { .. }))
    {
        println!("{}", describe_room(&state.dungeon));
    }
}
