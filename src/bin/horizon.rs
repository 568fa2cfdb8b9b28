//! Safeguard Horizon CLI.
//!
//! Attacker-economics model for AI safeguard relevance.
//!
//! # Commands
//!
//! - `evaluate` - Run the full model and print the verdict
//! - `costs` - Print cost trajectories over the horizon
//! - `threat` - Print the residual-threat matrix
//! - `break-cost` - Steps-to-cost conversion (and the inverse budget query)
//! - `sweep` - One-dimensional sensitivity sweep over a named parameter
//! - `scenarios` - List built-in scenarios

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use horizon::{
    config::{scenario, Config, SCENARIO_NAMES},
    cost::{budget_to_steps, gpu_hours_for_steps, steps_to_cost},
    engine::{evaluate, sweep_scores},
    params::{Parameters, HORIZON_YEARS},
    VERSION,
};

#[derive(Parser)]
#[command(name = "horizon")]
#[command(version = VERSION)]
#[command(about = "Attacker-economics model for AI safeguard relevance", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Parameter source flags shared by the model subcommands.
#[derive(clap::Args)]
struct ParamSource {
    /// Config file path (TOML, [params] table)
    #[arg(short, long, conflicts_with = "scenario")]
    config: Option<PathBuf>,

    /// Built-in scenario name
    #[arg(short, long)]
    scenario: Option<String>,

    /// Override the model size (billions of parameters)
    #[arg(long)]
    model_size: Option<f64>,

    /// Override the safeguard strength (0-100)
    #[arg(long)]
    safeguard_strength: Option<f64>,

    /// Override the fine-tuning steps needed to strip the safeguard
    #[arg(long)]
    steps_to_break: Option<u32>,
}

impl ParamSource {
    fn resolve(&self) -> anyhow::Result<Parameters> {
        let mut params = if let Some(name) = &self.scenario {
            scenario(name).context("unknown scenario")?
        } else if let Some(path) = &self.config {
            Config::from_file(path)?.params
        } else if let Some(path) = Config::default_path().filter(|p| p.exists()) {
            Config::from_file(path)?.params
        } else {
            Parameters::default()
        };
        if let Some(v) = self.model_size {
            params.model_size_b = v;
        }
        if let Some(v) = self.safeguard_strength {
            params.safeguard_strength = v;
        }
        if let Some(v) = self.steps_to_break {
            params.steps_to_break = v;
        }
        Ok(params)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full model and print the verdict
    Evaluate {
        #[command(flatten)]
        source: ParamSource,

        /// Output the full result bundle as JSON
        #[arg(long)]
        json: bool,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Print cost trajectories over the horizon
    Costs {
        #[command(flatten)]
        source: ParamSource,

        /// Show fine-tune costs instead of training costs
        #[arg(long)]
        fine_tune: bool,
    },

    /// Print the residual-threat matrix
    Threat {
        #[command(flatten)]
        source: ParamSource,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Steps-to-cost conversion and the inverse budget query
    BreakCost {
        #[command(flatten)]
        source: ParamSource,

        /// GPU-hour price override
        #[arg(long)]
        gpu_hour_cost: Option<f64>,

        /// Invert: report the step count affordable at this budget
        #[arg(long)]
        budget: Option<f64>,
    },

    /// One-dimensional sensitivity sweep over a named parameter
    Sweep {
        #[command(flatten)]
        source: ParamSource,

        /// Parameter name (matches the Parameters field names)
        param: String,

        /// Range start
        #[arg(long = "from")]
        start: f64,

        /// Range end
        #[arg(long = "to")]
        end: f64,

        /// Number of sample points
        #[arg(long, default_value = "20")]
        points: usize,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List built-in scenarios
    Scenarios,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Evaluate {
            source,
            json,
            pretty,
        } => cmd_evaluate(&source, json, pretty),
        Commands::Costs { source, fine_tune } => cmd_costs(&source, fine_tune),
        Commands::Threat { source, json } => cmd_threat(&source, json),
        Commands::BreakCost {
            source,
            gpu_hour_cost,
            budget,
        } => cmd_break_cost(&source, gpu_hour_cost, budget),
        Commands::Sweep {
            source,
            param,
            start,
            end,
            points,
            json,
        } => cmd_sweep(&source, &param, start, end, points, json),
        Commands::Scenarios => {
            for name in SCENARIO_NAMES {
                println!("{name}");
            }
            Ok(())
        }
    }
}

fn cmd_evaluate(source: &ParamSource, json: bool, pretty: bool) -> anyhow::Result<()> {
    let params = source.resolve()?;
    let results = evaluate(&params)?;

    if json || pretty {
        let out = if pretty {
            serde_json::to_string_pretty(&results)?
        } else {
            serde_json::to_string(&results)?
        };
        println!("{out}");
        return Ok(());
    }

    let a = &results.assessment;
    println!("Relevance: {:.1}/100 ({}) - {}", a.score, a.level, a.reason);
    println!();
    println!(
        "  blocked at year 5:   {:.1}% of fine-tune-only attackers",
        a.metrics.blocked_pct5
    );
    println!(
        "  training window:     {} year(s) until from-scratch training is affordable",
        a.metrics.window_years
    );
    println!(
        "  break-cost burden:   {:.2}% of the reference budget (${:.0}, {:.1} GPU-h)",
        a.metrics.break_cost_pct, results.break_cost.cost_now, results.break_cost.gpu_hours
    );
    println!();
    println!(
        "  P(dangerous) = {:.3}   P(novel) = {:.3}",
        results.capability.dangerous, results.capability.novel
    );
    println!();
    println!("Interventions:");
    for iv in &results.interventions {
        let state = if iv.active { "active" } else { "off" };
        println!("  {:<24} {:>6.1}  [{state}]", iv.name, iv.value);
    }
    Ok(())
}

fn cmd_costs(source: &ParamSource, fine_tune: bool) -> anyhow::Result<()> {
    let params = source.resolve()?;
    let results = evaluate(&params)?;

    let (label, real, naive, rates) = if fine_tune {
        (
            "fine-tune",
            &results.fine_tune_cost,
            &results.fine_tune_cost_naive,
            &results.fine_tune_rate,
        )
    } else {
        (
            "training",
            &results.training_cost,
            &results.training_cost_naive,
            &results.training_rate,
        )
    };

    println!("{label} cost over {HORIZON_YEARS} years");
    println!("{:>4}  {:>16}  {:>16}  {:>8}", "year", "cost", "naive", "rate");
    for (i, point) in real.points.iter().enumerate() {
        println!(
            "{:>4}  {:>16.0}  {:>16.0}  {:>8.3}",
            point.year, point.cost, naive.points[i].cost, rates[i]
        );
    }
    Ok(())
}

fn cmd_threat(source: &ParamSource, json: bool) -> anyhow::Result<()> {
    let params = source.resolve()?;
    let results = evaluate(&params)?;

    if json {
        println!("{}", serde_json::to_string(&results.threat)?);
        return Ok(());
    }

    print!("{:<14}", "attacker");
    for year in 0..=HORIZON_YEARS {
        print!("{year:>6}");
    }
    println!();
    for (name, row) in results.threat.attackers.iter().zip(&results.threat.cells) {
        print!("{name:<14}");
        for cell in row {
            print!("{cell:>6.2}");
        }
        println!();
    }
    Ok(())
}

fn cmd_break_cost(
    source: &ParamSource,
    gpu_hour_cost: Option<f64>,
    budget: Option<f64>,
) -> anyhow::Result<()> {
    let mut params = source.resolve()?;
    // Route the override through validation so a zero or negative price is
    // rejected instead of producing an infinite step count.
    if let Some(price) = gpu_hour_cost {
        params.gpu_hour_cost = price;
    }
    params.validate()?;
    let price = params.gpu_hour_cost;

    if let Some(budget) = budget {
        let steps = budget_to_steps(budget, params.model_size_b, price);
        println!(
            "${budget:.0} buys {steps:.0} fine-tuning steps on a {:.1}B model at ${price:.2}/GPU-h",
            params.model_size_b
        );
        return Ok(());
    }

    let hours = gpu_hours_for_steps(params.steps_to_break, params.model_size_b);
    let cost = steps_to_cost(params.steps_to_break, params.model_size_b, price);
    println!(
        "{} steps on a {:.1}B model: {hours:.1} GPU-h, ${cost:.2} at ${price:.2}/GPU-h",
        params.steps_to_break, params.model_size_b
    );
    Ok(())
}

fn cmd_sweep(
    source: &ParamSource,
    param: &str,
    start: f64,
    end: f64,
    points: usize,
    json: bool,
) -> anyhow::Result<()> {
    let base = source.resolve()?;
    let sweep = sweep_scores(&base, param, start, end, points)?;

    if json {
        println!("{}", serde_json::to_string(&sweep)?);
        return Ok(());
    }

    println!("{param} sweep, {points} points");
    for point in &sweep {
        let bar = "#".repeat((point.score / 2.0).round() as usize);
        println!("{:>14.4}  {:>5.1}  {:<10} {bar}", point.value, point.score, point.level);
    }
    Ok(())
}
