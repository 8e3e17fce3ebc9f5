/// Play — console front end for story files.
///
/// Usage: play [story.ron] [--seed <n>] [--quota <n>]
///
/// Logging: set RUST_LOG=debug to trace every transition and pacing
/// decision on stderr.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;

use story_engine::core::engine::{NarrativeEngine, Scene};
use story_engine::core::session::{
    run_session, AudioSink, ChoiceInput, SceneDisplay, SessionOutcome,
};

const DEFAULT_STORY: &str = "story_data/preludium/story.ron";

/// Reads numbered choices from stdin.
struct ConsoleInput {
    stdin: io::Stdin,
}

impl ChoiceInput for ConsoleInput {
    fn get_choice(&mut self, max: usize) -> io::Result<Option<usize>> {
        loop {
            print!("Enter your choice (1-{}): ", max);
            io::stdout().flush()?;

            let mut line = String::new();
            if self.stdin.lock().read_line(&mut line)? == 0 {
                return Ok(None);
            }
            let line = line.trim();
            if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("q") {
                return Ok(None);
            }
            match line.parse::<usize>() {
                Ok(n) if (1..=max).contains(&n) => return Ok(Some(n)),
                _ => println!("Invalid choice. Please try again."),
            }
        }
    }
}

/// Prints scenes as plain text.
struct ConsoleDisplay;

impl SceneDisplay for ConsoleDisplay {
    fn show(&mut self, scene: &Scene<'_>) -> io::Result<()> {
        let mut out = io::stdout().lock();
        writeln!(out)?;
        if let Some(art) = scene.illustration {
            match std::fs::read_to_string(art) {
                Ok(text) => writeln!(out, "{}", text)?,
                Err(_) => writeln!(out, "[illustration: {}]", art)?,
            }
        }
        writeln!(out, "{}", scene.text)?;
        writeln!(out)?;
        for (i, option) in scene.options.iter().enumerate() {
            writeln!(out, "  {}: {}", i + 1, option)?;
        }
        out.flush()
    }

    fn reject(&mut self, message: &str) -> io::Result<()> {
        println!("{}", message);
        Ok(())
    }
}

/// Announces tracks instead of playing them.
struct ConsoleAudio {
    last: Option<String>,
}

impl AudioSink for ConsoleAudio {
    fn play(&mut self, audio: &str) {
        if self.last.as_deref() != Some(audio) {
            println!("~ {} ~", audio);
            self.last = Some(audio.to_string());
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp_millis()
        .init();

    let args: Vec<String> = std::env::args().collect();

    let mut story_path = PathBuf::from(DEFAULT_STORY);
    let mut seed = None;
    let mut quota = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_usage();
                return;
            }
            "--seed" if i + 1 < args.len() => {
                i += 1;
                seed = Some(args[i].parse::<u64>().unwrap_or_else(|_| {
                    eprintln!("Error: --seed must be a non-negative integer");
                    process::exit(1);
                }));
            }
            "--quota" if i + 1 < args.len() => {
                i += 1;
                quota = Some(args[i].parse::<u32>().unwrap_or_else(|_| {
                    eprintln!("Error: --quota must be a positive integer");
                    process::exit(1);
                }));
            }
            other if !other.starts_with("--") => {
                story_path = PathBuf::from(other);
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    let mut builder = NarrativeEngine::builder().story_path(&story_path);
    if let Some(seed) = seed {
        builder = builder.seed(seed);
    }
    if let Some(quota) = quota {
        builder = builder.encounter_quota(quota);
    }

    let mut engine = match builder.build() {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("ERROR: Failed to load {}: {}", story_path.display(), e);
            process::exit(1);
        }
    };

    if let Ok(graph) = engine.graph() {
        if !graph.title().is_empty() {
            println!("=== {} ===", graph.title());
        }
    }
    println!("Type 'quit' to leave.");

    let mut input = ConsoleInput { stdin: io::stdin() };
    let mut display = ConsoleDisplay;
    let mut audio = ConsoleAudio { last: None };

    loop {
        let outcome = match run_session(&mut engine, &mut input, &mut display, &mut audio) {
            Ok(outcome) => outcome,
            Err(e) => {
                eprintln!("ERROR: {}", e);
                process::exit(1);
            }
        };

        match outcome {
            SessionOutcome::Finished {
                ending,
                turns,
                plot_points,
            } => {
                println!("\n========================================");
                println!("             GAME OVER");
                println!("========================================");
                println!("  Ending:      {}", ending);
                println!("  Turns:       {}", turns);
                println!("  Plot points: {}", plot_points);
                println!("========================================\n");
            }
            SessionOutcome::Quit { turns } => {
                println!("\nYou walk away after {} turns.", turns);
                break;
            }
        }

        if !prompt_restart(&mut input) {
            break;
        }
        if let Err(e) = engine.restart() {
            eprintln!("ERROR: {}", e);
            process::exit(1);
        }
    }

    println!("Thanks for playing!");
}

fn prompt_restart(input: &mut ConsoleInput) -> bool {
    println!("  1: Play again");
    println!("  2: Quit");
    matches!(input.get_choice(2), Ok(Some(1)))
}

fn print_usage() {
    println!("Usage: play [story.ron] [--seed <n>] [--quota <n>]");
    println!();
    println!("  story.ron   story file (default: {})", DEFAULT_STORY);
    println!("  --seed <n>  seed random encounters for a repeatable run");
    println!("  --quota <n> random encounters required per main encounter");
}
