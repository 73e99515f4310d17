use std::io::{self, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use nutrifit::client::{
    AGE_RANGE, BackendClient, DEFAULT_BACKEND_URL, HEIGHT_RANGE, PanelOutcome, Shell,
    WEIGHT_RANGE, parse_in_range, render,
};
use nutrifit::models::{FitnessLevel, Gender, HealthProfile};

/// Terminal front end for the NutriFit AI backend
#[derive(Debug, Parser)]
#[command(name = "nutrifit-client", version, about)]
struct Cli {
    /// Base URL of the backend
    #[arg(long, env = "BACKEND_URL", default_value = DEFAULT_BACKEND_URL)]
    backend_url: String,

    /// Give up on a request after this many seconds (default: wait forever)
    #[arg(long)]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate a personalized meal plan from a health profile
    MealPlan {
        #[arg(long, value_parser = parse_age)]
        age: u32,
        #[arg(long, value_enum)]
        gender: Gender,
        /// Height in cm
        #[arg(long, value_parser = parse_height)]
        height: f64,
        /// Weight in kg
        #[arg(long, value_parser = parse_weight)]
        weight: f64,
        #[arg(long, default_value = "")]
        goal: String,
        /// Comma-separated
        #[arg(long, default_value = "")]
        allergies: String,
        #[arg(long, value_enum)]
        fitness_level: FitnessLevel,
    },
    /// Analyze a food photo (jpg, jpeg or png)
    AnalyzeFood { image: PathBuf },
    /// Ask a health or nutrition question
    Ask { question: String },
    /// Menu-driven session with all three panels (default)
    Interactive,
}

fn parse_age(raw: &str) -> Result<u32, String> {
    parse_in_range(raw, &AGE_RANGE)
}

fn parse_height(raw: &str) -> Result<f64, String> {
    parse_in_range(raw, &HEIGHT_RANGE)
}

fn parse_weight(raw: &str) -> Result<f64, String> {
    parse_in_range(raw, &WEIGHT_RANGE)
}

fn main() -> anyhow::Result<ExitCode> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nutrifit=warn".into()),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let client = BackendClient::new(&cli.backend_url, cli.timeout_secs.map(Duration::from_secs))
        .context("Failed to build HTTP client")?;

    let outcome = match cli.command.unwrap_or(Command::Interactive) {
        Command::MealPlan {
            age,
            gender,
            height,
            weight,
            goal,
            allergies,
            fitness_level,
        } => client.generate_meal_plan(&HealthProfile {
            age,
            gender,
            height,
            weight,
            goal,
            allergies,
            fitness_level,
        }),
        Command::AnalyzeFood { image } => client.analyze_food(&image),
        Command::Ask { question } => client.ask(&question),
        Command::Interactive => {
            let stdin = BufReader::new(io::stdin());
            Shell::new(&client, stdin, io::stdout()).run()?;
            return Ok(ExitCode::SUCCESS);
        }
    };

    render(&outcome, &mut io::stdout())?;
    Ok(match outcome {
        PanelOutcome::Success { .. } | PanelOutcome::Warning(_) => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    })
}
