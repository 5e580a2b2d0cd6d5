use std::env;
use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::info;
use tracing_subscriber::EnvFilter;

use double_elim_bracket::{
    generate, generate_ordered, generate_unordered, BracketOptions, SeededShuffle,
};

struct CliArgs {
    count: Option<u32>,
    players: Vec<String>,
    starting_round: u32,
    ordered: bool,
    shuffle_seed: Option<u64>,
}

const USAGE: &str = "usage: double-elim-bracket <count> [--starting-round N] \
[--players a,b,c] [--ordered] [--shuffle-seed S]";

fn parse_args(mut args: env::Args) -> Result<CliArgs, String> {
    args.next();
    let mut parsed = CliArgs {
        count: None,
        players: Vec::new(),
        starting_round: 1,
        ordered: false,
        shuffle_seed: None,
    };
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--starting-round" => {
                let value = args.next().ok_or("--starting-round needs a value")?;
                parsed.starting_round = value
                    .parse()
                    .map_err(|_| format!("invalid starting round: {value}"))?;
            }
            "--players" => {
                let value = args.next().ok_or("--players needs a value")?;
                parsed.players = value.split(',').map(str::to_string).collect();
            }
            "--ordered" => parsed.ordered = true,
            "--shuffle-seed" => {
                let value = args.next().ok_or("--shuffle-seed needs a value")?;
                parsed.shuffle_seed =
                    Some(value.parse().map_err(|_| format!("invalid seed: {value}"))?);
            }
            "--help" | "-h" => return Err(USAGE.to_string()),
            other => {
                if parsed.count.is_some() {
                    return Err(format!("unexpected argument: {other}"));
                }
                parsed.count = Some(
                    other
                        .parse()
                        .map_err(|_| format!("invalid player count: {other}"))?,
                );
            }
        }
    }
    if parsed.count.is_none() && parsed.players.is_empty() {
        return Err(USAGE.to_string());
    }
    if parsed.count.is_some() && !parsed.players.is_empty() {
        return Err("pass either a count or --players, not both".to_string());
    }
    Ok(parsed)
}

fn time_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(1)
}

fn run(args: CliArgs) -> Result<String, String> {
    let options = BracketOptions {
        starting_round: args.starting_round,
    };
    let json = if let Some(count) = args.count {
        let matches = generate(count, &options).map_err(|e| e.to_string())?;
        info!(count, matches = matches.len(), "generated bracket");
        serde_json::to_string_pretty(&matches).map_err(|e| e.to_string())?
    } else if args.ordered {
        let matches = generate_ordered(&args.players, &options).map_err(|e| e.to_string())?;
        info!(players = args.players.len(), matches = matches.len(), "generated bracket");
        serde_json::to_string_pretty(&matches).map_err(|e| e.to_string())?
    } else {
        let seed = args.shuffle_seed.unwrap_or_else(time_seed);
        let mut shuffle = SeededShuffle::new(seed);
        let matches =
            generate_unordered(&args.players, &options, &mut shuffle).map_err(|e| e.to_string())?;
        info!(
            players = args.players.len(),
            matches = matches.len(),
            seed,
            "generated shuffled bracket"
        );
        serde_json::to_string_pretty(&matches).map_err(|e| e.to_string())?
    };
    Ok(json)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match parse_args(env::args()).and_then(run) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}
