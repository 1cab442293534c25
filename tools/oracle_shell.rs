/// Oracle Shell — interactive session for trying poems, moods and variations.
///
/// Usage: oracle_shell [--poems <path>] [--keywords <path>] [--synonyms <path>] [--seed <n>]
///
/// Commands:
///   say <text>          — type into the oracle (updates the mood)
///   mood <text>         — detect a mood without changing the session
///   ask                 — receive a poem
///   tick [n]            — advance the history fade n steps
///   view                — toggle standard / constellation view
///   vary <seed> <line>  — vary a line with the given seed
///   seed <n>            — restart the session with a new seed
///   help                — list commands
///   quit                — exit

use illume::core::constellation::{Constellation, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use illume::core::oracle::{Oracle, ViewMode};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::{self, BufRead, Write};
use std::process;
use tracing_subscriber::EnvFilter;

struct Options {
    poems: String,
    keywords: Option<String>,
    synonyms: Option<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    let mut options = Options {
        poems: "oracle_data/poems.json".to_string(),
        keywords: None,
        synonyms: None,
    };
    let mut seed: u64 = 42;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--poems" if i + 1 < args.len() => {
                i += 1;
                options.poems = args[i].clone();
            }
            "--keywords" if i + 1 < args.len() => {
                i += 1;
                options.keywords = Some(args[i].clone());
            }
            "--synonyms" if i + 1 < args.len() => {
                i += 1;
                options.synonyms = Some(args[i].clone());
            }
            "--seed" if i + 1 < args.len() => {
                i += 1;
                seed = args[i].parse().unwrap_or(42);
            }
            "--help" | "-h" => {
                print_usage();
                return;
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    let mut oracle = build_oracle(&options, seed).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        process::exit(1);
    });

    println!("Loaded {} poems", oracle.poems().len());
    println!("Seed: {}", seed);
    println!("Type 'help' for commands.\n");

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("oracle> ");
        stdout.flush().ok();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).is_err() || line.is_empty() {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let (cmd, rest) = match line.split_once(char::is_whitespace) {
            Some((cmd, rest)) => (cmd.to_lowercase(), rest.trim()),
            None => (line.to_lowercase(), ""),
        };

        match cmd.as_str() {
            "quit" | "exit" | "q" => {
                println!("Goodbye.");
                break;
            }
            "help" | "h" | "?" => print_help(),
            "say" => {
                let mood = oracle.set_input(rest);
                if mood.is_default() {
                    println!("(the oracle listens)");
                } else {
                    println!("sensing a {} mood...", mood);
                }
                let theme = oracle.theme();
                println!(
                    "  theme: {} | particles: {} x {}",
                    theme.gradient, theme.particle_count, theme.particle_color
                );
            }
            "mood" => {
                println!("{}", illume::core::mood::detect_mood(rest));
            }
            "ask" => {
                let faded = oracle.begin_fade();
                let Some(poem) = oracle.ask().cloned() else {
                    println!("No poems loaded.");
                    continue;
                };
                if faded {
                    println!("(previous poem drifts into memory)");
                }
                println!("\n--- {} ---", poem.title);
                match oracle.view_mode() {
                    ViewMode::Standard => {
                        for line in &poem.lines {
                            println!("{}", line);
                        }
                    }
                    ViewMode::Constellation => print_constellation(&poem.title, &poem.lines, seed),
                }
                println!("--- {} ---", oracle.visual_effect().name());
                if let Some(variation) = oracle.last_variation_seed() {
                    println!("(living poem, variation seed {:.3})", variation);
                }
                println!();
            }
            "tick" => {
                let count: usize = if rest.is_empty() {
                    1
                } else {
                    match rest.parse() {
                        Ok(n) => n,
                        Err(_) => {
                            println!("Invalid count: {}", rest);
                            continue;
                        }
                    }
                };
                for _ in 0..count {
                    oracle.tick();
                }
                if oracle.history().is_empty() {
                    println!("History is empty.");
                }
                for memory in oracle.history() {
                    println!(
                        "  [{:.2}] {}",
                        memory.opacity(),
                        memory.poem.first_line().unwrap_or("")
                    );
                }
            }
            "view" => {
                if oracle.current().is_none() {
                    println!("Ask for a poem first.");
                    continue;
                }
                println!("View: {}", oracle.toggle_view().name());
            }
            "vary" => {
                let Some((seed_str, text)) = rest.split_once(char::is_whitespace) else {
                    println!("Usage: vary <seed> <line>");
                    continue;
                };
                match seed_str.parse::<f64>() {
                    Ok(variation) => {
                        println!("{}", oracle.variator().vary_line(text.trim(), variation))
                    }
                    Err(_) => println!("Invalid seed: {}", seed_str),
                }
            }
            "seed" => {
                if rest.is_empty() {
                    println!("Current seed: {}", seed);
                    continue;
                }
                match rest.parse::<u64>() {
                    Ok(s) => match build_oracle(&options, s) {
                        Ok(rebuilt) => {
                            seed = s;
                            oracle = rebuilt;
                            println!("Seed set to {}", seed);
                        }
                        Err(e) => println!("ERROR: {}", e),
                    },
                    Err(_) => println!("Invalid seed: {}", rest),
                }
            }
            other => {
                println!("Unknown command: {}. Type 'help' for commands.", other);
            }
        }
    }
}

fn build_oracle(options: &Options, seed: u64) -> Result<Oracle, illume::core::oracle::OracleError> {
    let mut builder = Oracle::builder().seed(seed).poems_path(&options.poems);
    if let Some(ref path) = options.keywords {
        builder = builder.keywords_path(path);
    }
    if let Some(ref path) = options.synonyms {
        builder = builder.synonyms_path(path);
    }
    builder.build()
}

fn print_constellation(title: &str, lines: &[String], seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut constellation = Constellation::layout(title, lines, DEFAULT_WIDTH, DEFAULT_HEIGHT, &mut rng);
    constellation.reveal_until(constellation.full_reveal_ms());
    for star in &constellation.stars {
        println!("  * {:<14} ({:>5.1}, {:>5.1})", star.word, star.x, star.y);
    }
    println!("  {} connections", constellation.connections().len());
}

fn print_usage() {
    println!(
        "Usage: oracle_shell [--poems <path>] [--keywords <path>] [--synonyms <path>] [--seed <n>]"
    );
}

fn print_help() {
    println!("Commands:");
    println!("  say <text>          type into the oracle (updates the mood)");
    println!("  mood <text>         detect a mood without changing the session");
    println!("  ask                 receive a poem");
    println!("  tick [n]            advance the history fade n steps");
    println!("  view                toggle standard / constellation view");
    println!("  vary <seed> <line>  vary a line with the given seed");
    println!("  seed <n>            restart the session with a new seed");
    println!("  help                list commands");
    println!("  quit                exit");
}
