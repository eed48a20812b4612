use clap::{Parser, Subcommand};

/// MealOptimizer — fit ingredient quantities to per-meal macro targets.
#[derive(Parser, Debug)]
#[command(name = "meal_optimizer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to the ingredient catalog (JSON or CSV).
    #[arg(short, long, default_value = "ingredients.json")]
    pub catalog: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Optimize quantities for a request file.
    Optimize {
        /// Path to the request JSON (ingredients, target, preferences).
        #[arg(short, long)]
        request: String,

        /// Write the result as JSON to this path.
        #[arg(short, long)]
        output: Option<String>,

        /// Seed for the stochastic solvers (reproducible runs).
        #[arg(long)]
        seed: Option<u64>,

        /// Achievement tolerance as a fraction (default 0.10).
        #[arg(long)]
        tolerance: Option<f64>,
    },

    /// Build a meal interactively and optimize it.
    Plan {
        /// Seed for the stochastic solvers (reproducible runs).
        #[arg(long)]
        seed: Option<u64>,
    },
}

impl Default for Command {
    fn default() -> Self {
        Command::Plan { seed: None }
    }
}
