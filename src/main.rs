use clap::Parser;
use std::path::Path;

use meal_optimizer_rs::catalog::{load_catalog, save_result};
use meal_optimizer_rs::cli::{Cli, Command};
use meal_optimizer_rs::engine::{EngineConfig, optimize};
use meal_optimizer_rs::error::Result;
use meal_optimizer_rs::interface::{
    display_result, prompt_ingredients, prompt_target, prompt_yes_no,
};
use meal_optimizer_rs::models::{OptimizationRequest, Preferences};

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or_default();

    match command {
        Command::Optimize {
            request,
            output,
            seed,
            tolerance,
        } => cmd_optimize(&cli.catalog, &request, output.as_deref(), seed, tolerance),
        Command::Plan { seed } => cmd_plan(&cli.catalog, seed),
    }
}

/// Run an optimization from a request file.
fn cmd_optimize(
    catalog_path: &str,
    request_path: &str,
    output: Option<&str>,
    seed: Option<u64>,
    tolerance: Option<f64>,
) -> Result<()> {
    if !Path::new(catalog_path).exists() {
        eprintln!("Catalog file not found: {}", catalog_path);
        return Ok(());
    }
    if !Path::new(request_path).exists() {
        eprintln!("Request file not found: {}", request_path);
        return Ok(());
    }

    let catalog = load_catalog(catalog_path)?;
    println!("Loaded {} catalog entries", catalog.len());

    let content = std::fs::read_to_string(request_path)?;
    let request: OptimizationRequest = serde_json::from_str(&content)?;

    let mut config = EngineConfig::default();
    config.seed = seed;
    if let Some(t) = tolerance {
        config.tolerance = t;
    }

    let result = optimize(
        &request.ingredients,
        &request.target,
        &request.preferences,
        &catalog,
        &config,
    )?;

    display_result(&result, &request.target);

    if let Some(path) = output {
        save_result(path, &result)?;
        println!("Result written to {}", path);
    }

    Ok(())
}

/// Build a meal interactively from the catalog and optimize it.
fn cmd_plan(catalog_path: &str, seed: Option<u64>) -> Result<()> {
    if !Path::new(catalog_path).exists() {
        eprintln!("Catalog file not found: {}", catalog_path);
        eprintln!("Provide one with --catalog (JSON or CSV).");
        return Ok(());
    }

    let catalog = load_catalog(catalog_path)?;
    if catalog.is_empty() {
        println!("Catalog is empty, nothing to plan with.");
        return Ok(());
    }

    println!("Loaded {} catalog entries", catalog.len());
    println!();

    let ingredients = prompt_ingredients(&catalog)?;
    let target = prompt_target()?;

    println!();
    println!("Optimizing...");

    let config = EngineConfig {
        seed,
        ..Default::default()
    };
    let result = optimize(
        &ingredients,
        &target,
        &Preferences::default(),
        &catalog,
        &config,
    )?;

    display_result(&result, &target);

    let save = prompt_yes_no("Save result to meal_result.json?", false)?;
    if save {
        save_result("meal_result.json", &result)?;
        println!("Result saved.");
    }

    Ok(())
}
