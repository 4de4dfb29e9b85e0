use std::error::Error;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use ordered_float::OrderedFloat;
use rand::rngs::StdRng;
use rand::SeedableRng;
use uuid::Uuid;

use stock_gym::charts;
use stock_gym::data::load_feature_table;
use stock_gym::gym::{EnvConfig, TradingEnv};
use stock_gym::metrics;
use stock_gym::strategies::{
    bollinger_breakout, buy_and_hold, ma_crossover, macd_crossover, random_strategy,
    StrategyOutcome,
};
use stock_gym::types::FeatureRow;

#[derive(Parser)]
#[command(name = "stock_gym")]
#[command(about = "Single-asset trading gym with baseline strategies", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay the rule strategies over a historical CSV and compare them.
    Backtest {
        /// OHLCV CSV with Date, Open, High, Low, Close, Adj Close, Volume
        #[arg(short, long)]
        data: String,

        #[arg(short, long, default_value = "results")]
        output: String,

        #[arg(short, long, default_value_t = 100_000.0)]
        balance: f64,

        #[arg(long, default_value_t = 0.001)]
        cost: f64,

        #[arg(long, default_value_t = 0.5)]
        max_position: f64,

        #[arg(short, long, default_value_t = 42)]
        seed: u64,
    },
    /// Roll random-policy episodes through the simulator.
    Rollout {
        #[arg(short, long)]
        data: String,

        #[arg(short, long, default_value = "results")]
        output: String,

        #[arg(short, long, default_value_t = 10)]
        episodes: usize,

        #[arg(short, long, default_value_t = 100_000.0)]
        balance: f64,

        #[arg(long, default_value_t = 0.0001)]
        cost: f64,

        #[arg(short, long, default_value_t = 42)]
        seed: u64,
    },
}

fn main() {
    println!("{}", "Start".green());

    let cli = Cli::parse();
    match cli.command {
        Commands::Backtest { data, output, balance, cost, max_position, seed } => {
            backtest(&data, &output, balance, cost, max_position, seed).expect("backtest failed");
        }
        Commands::Rollout { data, output, episodes, balance, cost, seed } => {
            rollout(&data, &output, episodes, balance, cost, seed).expect("rollout failed");
        }
    }

    println!("{}", "End".green())
}

fn run_dir(output: &str) -> Result<PathBuf, Box<dyn Error>> {
    let dir = Path::new(output).join(Uuid::new_v4().to_string());
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

fn backtest(
    data: &str,
    output: &str,
    balance: f64,
    cost: f64,
    max_position: f64,
    seed: u64,
) -> Result<(), Box<dyn Error>> {
    let (rows, _scaler) = load_feature_table(data, None)?;
    println!("loaded {} rows from {data}", rows.len());

    let mut rng = StdRng::seed_from_u64(seed);
    let outcomes = vec![
        buy_and_hold(&rows, balance, cost),
        ma_crossover(&rows, balance, cost, max_position),
        macd_crossover(&rows, balance, cost, max_position),
        bollinger_breakout(&rows, balance, cost, max_position),
        random_strategy(&rows, balance, cost, max_position, &mut rng),
    ];

    let dir = run_dir(output)?;
    for outcome in &outcomes {
        print_outcome(outcome);
        write_outcome(&dir, outcome, &rows)?;
    }

    if let Some(best) = outcomes.iter().max_by_key(|o| OrderedFloat(o.profit)) {
        println!(
            "{} {}",
            "Best strategy:".bright_blue().bold(),
            best.name.bright_white().bold()
        );
    }
    println!("results written to {}", dir.display());
    Ok(())
}

fn print_outcome(outcome: &StrategyOutcome) {
    let pct = outcome.profit / outcome.initial_balance * 100.0;
    let profit_str = if outcome.profit >= 0.0 {
        format!("{pct:+.2}%").green()
    } else {
        format!("{pct:+.2}%").red()
    };

    let net_worths = outcome.history.net_worths();
    let drawdown = metrics::max_drawdown(&net_worths);
    let annual = metrics::annualized_return(&net_worths, 252);

    println!(
        "{} - Net Worth: {} ({}) | max drawdown {:.2}% | annualized {:+.2}% | trades {} | costs {}",
        outcome.name.bright_blue().bold(),
        format!("${:.2}", outcome.final_net_worth).bright_white().bold(),
        profit_str,
        drawdown * 100.0,
        annual * 100.0,
        outcome.transaction_count,
        format!("${:.2}", outcome.history.total_trade_costs).yellow(),
    );
}

fn write_outcome(
    dir: &Path,
    outcome: &StrategyOutcome,
    rows: &[FeatureRow],
) -> Result<(), Box<dyn Error>> {
    let slug = outcome.name.to_lowercase().replace(' ', "_");
    outcome.history.write_csv(dir.join(format!("history_{slug}.csv")))?;
    outcome.history.write_reports(dir.join(&slug))?;

    let prices: Vec<f64> = rows.iter().map(|r| r.close).collect();
    charts::buy_sell_chart(
        &dir.join(format!("{slug}_buy_sell.png")),
        &prices,
        &outcome.history.buys,
        &outcome.history.sells,
    )?;
    Ok(())
}

fn rollout(
    data: &str,
    output: &str,
    episodes: usize,
    balance: f64,
    cost: f64,
    seed: u64,
) -> Result<(), Box<dyn Error>> {
    let (rows, _scaler) = load_feature_table(data, None)?;
    println!("loaded {} rows from {data}", rows.len());

    let prices: Vec<f64> = rows.iter().map(|r| r.close).collect();
    let config = EnvConfig {
        initial_balance: balance,
        transaction_cost: cost,
        ..EnvConfig::default()
    };
    let mut env = TradingEnv::new(rows, config, seed)?;

    let dir = run_dir(output)?;
    for episode in 0..episodes {
        env.reset();
        loop {
            let action = env.sample_action();
            let result = env.step(action);
            if result.terminated || result.truncated {
                break;
            }
        }
        env.print_episode_summary(episode);

        if episode + 1 == episodes {
            env.history.write_csv(dir.join("history_rollout.csv"))?;
            env.history.write_reports(dir.join("rollout"))?;

            let net_worths = env.history.net_worths();
            let positioned: Vec<f64> = env
                .history
                .records
                .iter()
                .map(|r| r.position as f64 * r.price)
                .collect();
            charts::assets_chart(&dir.join("rollout_assets.png"), &net_worths, &positioned)?;
            charts::buy_sell_chart(
                &dir.join("rollout_buy_sell.png"),
                &prices,
                &env.history.buys,
                &env.history.sells,
            )?;
            charts::reward_chart(
                &dir.join("rollout_rewards.png"),
                &env.history.records.iter().map(|r| r.reward).collect::<Vec<_>>(),
            )?;
        }
    }

    println!("results written to {}", dir.display());
    Ok(())
}
