use std::{fs, path::PathBuf};

use clap::{ArgAction, Parser, Subcommand};
use color_eyre::eyre::WrapErr;
use cube_solver::{
    CornerPruningTable, CubeState, MoveSequence, NOT_FOUND, Solver, SolverConfig,
};
use env_logger::TimestampPrecision;
use log::{LevelFilter, info};

/// Used by `solve` when no state is given.
const DEMO_SCRAMBLE: &str = "R U R' U'";

/// Solves 3x3 cubes with IDA* over a corner pattern database
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The solver configuration file to use, in TOML format
    #[arg(long, short = 'c', value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// The corner pattern database file, overriding the configuration
    #[arg(long, value_name = "DATABASE")]
    database: Option<PathBuf>,

    /// The longest solution to search for, overriding the configuration
    #[arg(long)]
    max_depth: Option<u8>,

    /// Increase logging verbosity (can be repeated)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Defaults to solving the demonstration scramble
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a cube and print the moves
    Solve {
        /// 54 facelet colors (W G R B O Y), faces in the order U L F R B D,
        /// each row-major. Defaults to the scramble R U R' U'
        state: Option<String>,
        /// Reject malformed states instead of reading unknown colors as white
        #[arg(long)]
        strict: bool,
    },
    /// Regenerate the corner pattern database and save it
    Generate,
    /// Print a random scramble and the facelets it produces
    Scramble {
        /// The number of moves
        #[arg(short, long, default_value_t = 20)]
        length: usize,
    },
    /// Print a cube as an unfolded net
    Show {
        /// 54 facelet colors, as for `solve`
        state: String,
    },
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(match cli.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        })
        .format_timestamp(Some(TimestampPrecision::Millis))
        .init();

    let config = load_config(&cli)?;

    match cli.command.unwrap_or(Commands::Solve {
        state: None,
        strict: false,
    }) {
        Commands::Solve { state, strict } => {
            let puzzle_state = match state {
                Some(facelets) if strict => facelets.parse::<CubeState>()?,
                Some(facelets) => CubeState::from_facelets_lossy(&facelets),
                None => {
                    let mut puzzle_state = CubeState::solved();
                    DEMO_SCRAMBLE
                        .parse::<MoveSequence>()?
                        .apply_to(&mut puzzle_state);
                    info!("Solving the scramble {DEMO_SCRAMBLE}: {puzzle_state}");
                    puzzle_state
                }
            };

            let pruning_table = CornerPruningTable::load_or_generate(&config);
            let solver = Solver::from_config(pruning_table, &config);
            match solver.solve(&puzzle_state) {
                Ok(solution) => println!("{solution}"),
                Err(_) => println!("{NOT_FOUND}"),
            }
        }
        Commands::Generate => {
            let mut pruning_table = CornerPruningTable::new_unvisited();
            let depth_counts = pruning_table.generate(config.generation_depth_limit);
            pruning_table.save(&config.database_path).wrap_err_with(|| {
                format!(
                    "Could not save the corner pattern database to {}",
                    config.database_path.display()
                )
            })?;
            for (depth, count) in depth_counts.iter().enumerate() {
                println!("{depth:>2} {count:>10}");
            }
        }
        Commands::Scramble { length } => {
            let scramble = MoveSequence::random(length);
            let mut puzzle_state = CubeState::solved();
            scramble.apply_to(&mut puzzle_state);
            println!("{scramble}");
            println!("{puzzle_state}");
        }
        Commands::Show { state } => {
            let puzzle_state = state.parse::<CubeState>()?;
            print!("{}", puzzle_state.net());
        }
    }

    Ok(())
}

/// The configuration file if one was given, with the command line overrides
/// applied on top.
fn load_config(cli: &Cli) -> color_eyre::Result<SolverConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .wrap_err_with(|| format!("Failed to read configuration file {}", path.display()))?;
            toml::from_str::<SolverConfig>(&text)
                .wrap_err_with(|| format!("Failed to parse configuration file {}", path.display()))?
        }
        None => SolverConfig::default(),
    };
    if let Some(database) = &cli.database {
        config.database_path.clone_from(database);
    }
    if let Some(max_depth) = cli.max_depth {
        config.max_depth = max_depth;
    }
    Ok(config)
}
