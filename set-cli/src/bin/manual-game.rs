use std::error::Error;
use std::io::{stdin, stdout, BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

use set_cli::{LoggingDisplay, TernarySetTester};
use set_core::{Game, GameConfig};
use structopt::StructOpt;

#[derive(StructOpt)]
struct Opt {
    #[structopt(long, default_value = "1")]
    human_players: usize,
    #[structopt(long, default_value = "1")]
    ai_players: usize,
    #[structopt(long, default_value = "81")]
    deck_size: usize,
    #[structopt(long, default_value = "12")]
    table_size: usize,
    #[structopt(long, default_value = "3")]
    set_size: usize,
    #[structopt(long, default_value = "60000", help = "Milliseconds; 0 = elapsed display, negative = no timer display")]
    turn_timeout_millis: i64,
    #[structopt(long, help = "Silence game prompts (useful for tests with set input)")]
    no_prompts: bool,
}

#[derive(Debug, Copy, Clone)]
enum Command {
    Press(usize),
    Info,
    Quit,
    Help,
}

fn print_help() {
    println!("Known commands are:");
    for (cmds, desc) in [
        ("(p)ress N", "Toggle your token on table slot N."),
        ("(i)nfo", "Print your current score."),
        ("(q)uit", "End the game and show the winner(s)."),
        ("(h)elp", "This output."),
    ] {
        println!("  {:10}: {}", cmds, desc);
    }
}

fn try_parse_command(stream: &mut dyn BufRead) -> Result<Command, Box<dyn Error>> {
    let mut s = String::new();
    let n = stream.read_line(&mut s)?;
    let words: Vec<&str> = s.split_whitespace().collect();
    if n == 0 {
        return Ok(Command::Quit);
    } else if words.is_empty() {
        return Err("Empty input".into());
    }
    let c = match words[0] {
        "info" | "i" => Command::Info,
        "quit" | "q" => Command::Quit,
        "help" | "h" => Command::Help,
        "press" | "p" => {
            if words.len() != 2 {
                return Err("press needs a slot number".into());
            }
            Command::Press(words[1].parse()?)
        }
        _ => return Err("Unable to parse first word as a command".into()),
    };
    Ok(c)
}

fn prompt(display_prompts: bool) -> Result<Command, Box<dyn Error>> {
    loop {
        if display_prompts {
            print!("> ");
            stdout().flush()?;
        }
        match try_parse_command(&mut stdin().lock()) {
            Ok(c) => return Ok(c),
            Err(e) => println!("{}", e),
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let opt = Opt::from_args();

    let config = GameConfig {
        players: opt.human_players + opt.ai_players,
        human_count: opt.human_players,
        deck_size: opt.deck_size,
        table_size: opt.table_size,
        set_size: opt.set_size,
        turn_timeout_millis: opt.turn_timeout_millis,
        ..Default::default()
    };
    let tester = Arc::new(TernarySetTester::for_deck_size(opt.deck_size));
    let display = Arc::new(LoggingDisplay);
    let game = Game::new(config, tester, display);
    game.start();

    if !opt.no_prompts {
        println!(
            "{} human, {} synthetic participant(s). Keys go to participant 0.",
            opt.human_players, opt.ai_players
        );
        print_help();
    }

    loop {
        match prompt(!opt.no_prompts)? {
            Command::Press(slot) => {
                if let Err(e) = game.on_key(0, slot) {
                    println!("{}", e);
                }
            }
            Command::Info => {
                if let Some(score) = game.score(0) {
                    println!("your score: {score}");
                }
            }
            Command::Quit => break,
            Command::Help => {
                if !opt.no_prompts {
                    print_help();
                }
            }
        }
    }

    game.terminate();
    std::thread::sleep(Duration::from_millis(10));
    Ok(())
}
