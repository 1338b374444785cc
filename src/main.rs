use std::io::{self, Write};
use std::str::FromStr;

use clap::Parser;
use minegrid::{Config, Game};
use thiserror::Error;

#[derive(Debug, Parser)]
#[command(name = "minegrid", about = "Grid-reveal mine puzzle, text edition")]
struct Args {
    /// Board side length
    #[arg(long, default_value_t = 8)]
    size: usize,

    /// Number of mines (clamped to the board area)
    #[arg(long, default_value_t = 10)]
    mines: usize,

    #[command(flatten)]
    verbosity: clap_verbosity_flag::Verbosity,
}

fn main() {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbosity.log_level_filter())
        .init();

    println!("Welcome to Minegrid!");
    println!();

    let mut game = Game::new(Config::new(args.size, args.mines));

    loop {
        println!("{}", game);

        match get_command() {
            Command::Open { x, y } => {
                if game.open(x, y).is_mine_hit() {
                    print!("{}", game.reveal());
                    println!("Boom! You lose.");
                    return;
                }
            }
            Command::Flag { x, y } => game.toggle_flag(x, y),
            Command::Quit => {
                println!("Bye.");
                return;
            }
        }

        if game.is_finished() {
            print!("{}", game.reveal());
            println!("A winner is you!");
            return;
        }
    }
}

fn get_command() -> Command {
    loop {
        // Print prompt
        print!("o x y: open, f x y: flag, q: quit >> ");
        io::stdout().flush().unwrap();

        // Get user input
        let mut input = String::new();
        io::stdin().read_line(&mut input).unwrap();

        match input.parse() {
            Ok(command) => return command,
            Err(err) => eprintln!("error: {}", err),
        }
    }
}

/// A player command for one turn.
#[derive(Clone, Debug)]
enum Command {
    Open { x: usize, y: usize },
    Flag { x: usize, y: usize },
    Quit,
}

#[derive(Debug, Error)]
enum ParseCommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command `{0}`, expected `o`, `f`, or `q`")]
    Unknown(String),
    #[error("expected two coordinates")]
    Coords,
    #[error("invalid coordinate `{0}`")]
    BadCoord(String),
}

impl FromStr for Command {
    type Err = ParseCommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let verb = words.next().ok_or(ParseCommandError::Empty)?;

        match verb {
            "q" | "quit" => Ok(Command::Quit),
            "o" | "open" | "f" | "flag" => {
                let mut coord = || -> Result<usize, ParseCommandError> {
                    let word = words.next().ok_or(ParseCommandError::Coords)?;
                    word.parse()
                        .map_err(|_| ParseCommandError::BadCoord(word.to_string()))
                };
                let x = coord()?;
                let y = coord()?;
                if words.next().is_some() {
                    return Err(ParseCommandError::Coords);
                }

                Ok(match verb {
                    "o" | "open" => Command::Open { x, y },
                    _ => Command::Flag { x, y },
                })
            }
            _ => Err(ParseCommandError::Unknown(verb.to_string())),
        }
    }
}
