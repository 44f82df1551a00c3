//! sim-runner: headless simulation runner for flusim.
//!
//! Usage:
//!   sim-runner --seed 12345 --ticks 100 --infect 0
//!   sim-runner --scenario data/scenarios/flu.json --infect 0 --db run.db
//!   sim-runner --seed-infections 10 --json

use anyhow::Result;
use clap::Parser;
use flusim_core::{
    command::Intervention,
    config::ModelConfig,
    engine::SimEngine,
    stats::AgentCounts,
    store::SimStore,
    types::{AgentId, Tick},
};

#[derive(Parser, Debug)]
#[command(name = "sim-runner", about = "Run a flusim scenario headlessly")]
struct Args {
    /// Master random seed
    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// Number of ticks to run
    #[arg(short, long, default_value_t = 100)]
    ticks: u64,

    /// Scenario JSON file; the built-in flu scenario when omitted
    #[arg(long)]
    scenario: Option<String>,

    /// SQLite database path
    #[arg(long, default_value = ":memory:")]
    db: String,

    /// Run identifier; a random UUID when omitted
    #[arg(long)]
    run_id: Option<String>,

    /// Agent ids to infect before the first tick
    #[arg(long, value_delimiter = ',')]
    infect: Vec<AgentId>,

    /// Additionally infect this many randomly chosen susceptible agents
    #[arg(long, default_value_t = 0)]
    seed_infections: usize,

    /// Print the final counts as JSON instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(serde::Serialize)]
struct RunSummary<'a> {
    run_id: &'a str,
    seed: u64,
    ticks: Tick,
    counts: AgentCounts,
    peak_infected: Option<(Tick, usize)>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.scenario {
        Some(path) => ModelConfig::load(path)?,
        None => ModelConfig::flu_default(),
    };
    let run_id = args
        .run_id
        .clone()
        .unwrap_or_else(|| format!("run-{}", uuid::Uuid::new_v4()));

    if !args.json {
        println!("flusim — sim-runner");
        println!("  run_id:    {run_id}");
        println!("  seed:      {}", args.seed);
        println!("  ticks:     {}", args.ticks);
        println!("  db:        {}", args.db);
        println!("  agents:    {}", config.num_agents);
        println!();
    }

    let store = if args.db == ":memory:" {
        SimStore::in_memory()?
    } else {
        SimStore::open(&args.db)?
    };
    let mut engine = SimEngine::with_store(run_id.clone(), args.seed, config, store)?;

    if !args.infect.is_empty() {
        engine.apply(&Intervention::Infect {
            agent_ids: args.infect.clone(),
        })?;
    }
    if args.seed_infections > 0 {
        engine.apply(&Intervention::SeedInfections {
            count: args.seed_infections,
        })?;
    }

    engine.run_ticks(args.ticks)?;
    log::info!("run={run_id} finished at tick {}", engine.current_tick());

    let counts = engine.statistics();
    let peak_infected = match engine.store() {
        Some(store) => store.peak_infected(&run_id)?,
        None => None,
    };

    if args.json {
        let summary = RunSummary {
            run_id: &run_id,
            seed: args.seed,
            ticks: engine.current_tick(),
            counts,
            peak_infected,
        };
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&engine, &counts, peak_infected);
    }
    Ok(())
}

fn print_summary(engine: &SimEngine, counts: &AgentCounts, peak: Option<(Tick, usize)>) {
    println!("=== RUN SUMMARY ===");
    println!("  final tick:     {}", engine.current_tick());
    for (category, count) in counts.entries() {
        println!("  {:<15} {count}", format!("{}:", category.name()));
    }
    println!("  {:<15} {}", "total:", counts.total());
    if let Some((tick, infected)) = peak {
        println!("  peak infected:  {infected} at tick {tick}");
    }
}
