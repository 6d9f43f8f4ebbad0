use env_logger::{Builder, Env};
use shopsim::config::{ConcurrencyMode, ExecutionConfig, ShopConfig};
use shopsim::experiment::{run_scenarios, standard_scenarios};
use shopsim::stats::write_csv_file;
use std::path::PathBuf;

/// Usage: shop_floor_main [config.json] [output_dir]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    logger_builder(Env::default()).init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => ShopConfig::from_json_file(&path)?,
        None => ShopConfig::default(),
    };
    let output_dir = PathBuf::from(args.next().unwrap_or_else(|| ".".to_string()));
    std::fs::create_dir_all(&output_dir)?;

    println!("Starting shop floor simulation");
    println!("Configuration:");
    println!(
        "  Period length: {}, order interval: {}, horizon: {}",
        config.period_length, config.new_order_time, config.sim_time
    );
    println!(
        "  Mean processing time: {}, due window: {}..={} periods, seed: {}",
        config.mean_processing_time,
        config.due_date_periods.min,
        config.due_date_periods.max,
        config.random_seed
    );
    for product_type in config.routing.product_types() {
        let route = config.routing.route(product_type)?;
        println!("  Product {} route: {:?}", product_type, route);
    }

    let scenarios = standard_scenarios(&config);
    let execution = ExecutionConfig::new().with_concurrency(ConcurrencyMode::Rayon);
    let outcomes = run_scenarios(&scenarios, &execution)?;

    println!("\nResults:");
    for outcome in &outcomes {
        let summary = &outcome.summary;
        println!("  {} (stopped at t={})", outcome.name, outcome.final_time);
        println!(
            "    generated={} released={} finished={} unfinished={}",
            summary.generated,
            summary.released,
            summary.finished,
            summary.unfinished()
        );
        println!(
            "    early={} tardy={} mean earliness={} mean tardiness={}",
            summary.early,
            summary.tardy,
            format_mean(summary.mean_earliness()),
            format_mean(summary.mean_tardiness())
        );

        let path = output_dir.join(format!("{}.csv", outcome.name));
        write_csv_file(&outcome.rows, &path)?;
        println!("    wrote {} rows to {}", outcome.rows.len(), path.display());
    }

    Ok(())
}

fn format_mean(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.2}", v))
}

/// Info by default; a filter set in the environment (`RUST_LOG`) wins
fn logger_builder(env: Env<'_>) -> Builder {
    let mut builder = Builder::from_env(env.default_filter_or("info"));
    builder.format_timestamp(None);
    builder
}
