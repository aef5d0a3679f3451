use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

use policy_match::{
    links,
    ranking::{CosineRanker, LlmRanker, Ranker},
    tally::{self, TallyStore},
    Choice, CsvProfileSource, IssueSet, MatchEngine, MatchQuery, MatchResponse, QuizSession,
    Settings, SqliteTally, StanceVector,
};

#[derive(Parser)]
#[command(name = "policy-match")]
#[command(about = "Find the politicians closest to your positions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Candidate profiles CSV
    #[arg(short, long, env = "PROFILES_PATH")]
    profiles: Option<PathBuf>,

    /// Tally database path
    #[arg(short, long, env = "TALLY_DB")]
    db: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Method {
    /// Cosine similarity computed locally
    Cosine,
    /// Delegate ranking to the chat model
    Llm,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer the questions interactively
    Quiz {
        #[arg(short, long, value_enum, default_value = "cosine")]
        method: Method,

        /// Answer with a value in [-1, 1] plus an optional remark
        #[arg(long)]
        sliders: bool,

        /// Number of matches to show
        #[arg(short, long, default_value = "5")]
        top: usize,

        /// Do not add points to the leaderboard
        #[arg(long)]
        no_tally: bool,
    },

    /// Rank a stance given on the command line
    Rank {
        /// Issue answers as key=value, one per issue
        #[arg(short, long = "answer", value_parser = parse_answer, required = true)]
        answers: Vec<(String, f64)>,

        #[arg(short, long, value_enum, default_value = "cosine")]
        method: Method,

        #[arg(short, long, default_value = "5")]
        top: usize,

        #[arg(long)]
        no_tally: bool,
    },

    /// List the issues and their keys
    Issues,

    /// Show the cross-session leaderboard
    Leaderboard {
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Write the leaderboard as name,points CSV
    ExportTally {
        /// Output file
        path: PathBuf,
    },

    /// Delete every leaderboard entry
    ResetTally,
}

fn parse_answer(raw: &str) -> Result<(String, f64), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))?;
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid value for '{}': {}", key, e))?;
    Ok((key.trim().to_string(), value))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "policy_match=warn".into()),
        )
        .init();

    let cli = Cli::parse();

    let mut settings = Settings::from_env();
    if let Some(profiles) = cli.profiles {
        settings.profiles_path = profiles;
    }
    if let Some(db) = cli.db {
        settings.tally_db = db;
    }

    let issues = IssueSet::standard();

    match cli.command {
        Commands::Quiz { method, sliders, top, no_tally } => {
            let engine = build_engine(&settings, issues, method).await?;
            let theme = ColorfulTheme::default();

            loop {
                let mut session = engine.session();
                ask(&mut session, sliders, &theme)?;

                let stance = session.stance()?;
                let query = MatchQuery {
                    top_n: top,
                    record_tally: !no_tally,
                    ..MatchQuery::from_session(&session)
                };

                println!("\n🤖 Matching...");
                let response = engine.run(&stance, query).await?;
                print_response(&response);

                let again = Confirm::with_theme(&theme)
                    .with_prompt("Try again?")
                    .default(false)
                    .interact()?;
                if !again {
                    break;
                }
            }
        }

        Commands::Rank { answers, method, top, no_tally } => {
            let engine = build_engine(&settings, issues, method).await?;
            let stance = StanceVector::from_pairs(answers)?;

            let query = MatchQuery {
                top_n: top,
                record_tally: !no_tally,
                ..MatchQuery::default()
            };

            let response = engine.run(&stance, query).await?;
            print_response(&response);
        }

        Commands::Issues => {
            for (i, issue) in issues.iter().enumerate() {
                println!("{}. {:<16} {}", i + 1, issue.key, issue.prompt);
            }
        }

        Commands::Leaderboard { limit } => {
            let store = SqliteTally::new(&settings.tally_db).await?;
            let board = store.leaderboard(limit).await?;
            let stats = store.stats().await?;

            println!("🏆 Leaderboard ({} names, {} points):", stats.total_names, stats.total_points);
            for (i, entry) in board.iter().enumerate() {
                println!("   {}. {} - {} pts", i + 1, entry.name, entry.points);
            }

            if let Some(updated) = stats.last_updated {
                println!("   Last updated: {}", updated.format("%Y-%m-%d %H:%M:%S"));
            }
        }

        Commands::ExportTally { path } => {
            let store = SqliteTally::new(&settings.tally_db).await?;
            let board = store.leaderboard(usize::MAX).await?;

            let file = File::create(&path)
                .with_context(|| format!("creating {}", path.display()))?;
            tally::write_csv(&board, file)?;

            println!("✅ Wrote {} entries to {}", board.len(), path.display());
        }

        Commands::ResetTally => {
            let store = SqliteTally::new(&settings.tally_db).await?;
            let deleted = store.reset().await?;
            println!("✅ Deleted {} entries", deleted);
        }
    }

    Ok(())
}

async fn build_engine(settings: &Settings, issues: IssueSet, method: Method) -> anyhow::Result<MatchEngine> {
    let ranker: Arc<dyn Ranker> = match method {
        Method::Cosine => Arc::new(CosineRanker::new()),
        Method::Llm => Arc::new(LlmRanker::from_settings(settings)?),
    };

    let source = CsvProfileSource::new(&settings.profiles_path);
    let engine = MatchEngine::from_source(issues, &source, ranker)
        .await
        .with_context(|| format!("loading {}", settings.profiles_path.display()))?;

    let store = SqliteTally::new(&settings.tally_db).await?;
    Ok(engine.with_tally(Arc::new(store)))
}

/// Run the question loop until every issue has an answer
fn ask(session: &mut QuizSession, sliders: bool, theme: &ColorfulTheme) -> anyhow::Result<()> {
    while let Some(issue) = session.next_issue().cloned() {
        let prompt = format!("Q{}. {}", session.question_number(), issue.prompt);

        if sliders {
            let value: f64 = Input::with_theme(theme)
                .with_prompt(format!("{} (-1 oppose .. 1 support)", prompt))
                .default(0.0)
                .validate_with(|v: &f64| {
                    if (-1.0..=1.0).contains(v) {
                        Ok(())
                    } else {
                        Err("enter a value between -1 and 1")
                    }
                })
                .interact_text()?;
            session.answer_value(&issue.key, value)?;

            let remark: String = Input::with_theme(theme)
                .with_prompt("Anything to add? (optional)")
                .allow_empty(true)
                .interact_text()?;
            session.set_comment(&issue.key, remark)?;
        } else {
            let labels: Vec<&str> = Choice::ALL.iter().map(|c| c.label()).collect();
            let picked = Select::with_theme(theme)
                .with_prompt(prompt)
                .items(&labels)
                .default(0)
                .interact()?;
            session.answer(&issue.key, Choice::ALL[picked])?;
        }
    }
    Ok(())
}

fn print_response(response: &MatchResponse) {
    println!("\n✅ Your closest {} ({}):", response.results.len(), response.ranking_method);

    for (i, m) in response.results.iter().enumerate() {
        println!("\n{}. {} - match {}%", i + 1, m.candidate.display_name(), m.score);
        match &m.reason {
            Some(reason) => println!("   {}", reason),
            None => println!("   {}", m.candidate.policy),
        }
        println!("   🔎 {}", links::search_url(&m.candidate));
        println!("   📖 {}", links::wikipedia_url(&m.candidate));
    }

    println!(
        "\n   Compared {} candidates in {:.2}ms",
        response.candidates_considered, response.latency_ms
    );
}
