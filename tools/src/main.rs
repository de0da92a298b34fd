//! pool-runner: headless launcher for the xuansu pool engine.
//!
//! Usage:
//!   pool-runner --pool data/pools/login.json --seed 12345 --ticks 10
//!   pool-runner --pool data/pools/login.json --ticks 60 --interval-ms 1000 --timestamps
//!   pool-runner --ipc-mode --data-dir ./data
//!
//! Tick mode evaluates the pool once per tick and prints one payload per
//! line. With a seed, tick k uses the seed advanced k times, so a run is
//! reproducible line for line. Sending the payload anywhere is left to
//! whatever reads stdout.

use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::env;
use std::io::{self, BufRead, Write};
use std::time::Duration;
use xuansu_core::{
    rng::{next_seed, Seed},
    PoolEngine, SetOptions,
};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    Evaluate {
        pool: Value,
        #[serde(default)]
        seed: Option<Seed>,
    },
    Set {
        table: String,
        key: String,
        value: Value,
        #[serde(default)]
        fill: bool,
        #[serde(default)]
        trigger_disable: bool,
    },
    Get {
        table: String,
        #[serde(default)]
        key: Option<String>,
    },
    Quit,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed: Option<Seed> = parse_opt(&args, "--seed");
    let ticks = parse_arg(&args, "--ticks", 1u64);
    let interval_ms = parse_arg(&args, "--interval-ms", 0u64);
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let timestamps = args.iter().any(|a| a == "--timestamps");
    let data_dir = args
        .windows(2)
        .find(|w| w[0] == "--data-dir")
        .map(|w| w[1].as_str())
        .unwrap_or("./data");
    let pool_path = args
        .windows(2)
        .find(|w| w[0] == "--pool")
        .map(|w| w[1].as_str());

    let engine = PoolEngine::load(data_dir)?;

    if ipc_mode {
        return run_ipc_loop(engine);
    }

    let pool_path = pool_path.context("--pool <file.json> is required outside --ipc-mode")?;
    let content = std::fs::read_to_string(pool_path)
        .with_context(|| format!("Cannot read {pool_path}"))?;
    let pool: Value = serde_json::from_str(&content)
        .with_context(|| format!("Cannot parse {pool_path}"))?;

    eprintln!("xuansu pool-runner");
    eprintln!("  pool:      {pool_path}");
    eprintln!("  seed:      {}", seed.map_or("entropy".to_string(), |s| s.to_string()));
    eprintln!("  ticks:     {ticks}");
    eprintln!("  interval:  {interval_ms}ms");
    eprintln!("  data_dir:  {data_dir}");

    run_ticks(&engine, &pool, seed, ticks, interval_ms, timestamps)
}

fn run_ticks(
    engine: &PoolEngine,
    pool: &Value,
    seed: Option<Seed>,
    ticks: u64,
    interval_ms: u64,
    timestamps: bool,
) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for (tick, tick_seed) in (0..ticks).zip(tick_seeds(seed)) {
        let payload = engine.evaluate(pool, tick_seed);
        if payload.is_empty() {
            log::warn!("tick={tick} pool produced an empty payload");
        }
        if timestamps {
            writeln!(out, "{}\t{payload}", chrono::Utc::now().to_rfc3339())?;
        } else {
            writeln!(out, "{payload}")?;
        }
        out.flush()?;

        if interval_ms > 0 && tick + 1 < ticks {
            std::thread::sleep(Duration::from_millis(interval_ms));
        }
    }
    Ok(())
}

/// Seed for each tick: tick `k` gets `seed` advanced `k` times. Without a
/// seed every tick draws its own entropy.
fn tick_seeds(seed: Option<Seed>) -> impl Iterator<Item = Option<Seed>> {
    std::iter::successors(Some(seed), |s| Some(s.map(next_seed)))
}

fn run_ipc_loop(mut engine: PoolEngine) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }
        let Some(reply) = handle_line(&mut engine, &buffer) else {
            break;
        };
        writeln!(stdout, "{reply}")?;
        stdout.flush()?;
    }
    Ok(())
}

/// Reply to one IPC line, or `None` on `quit`. A malformed line is an
/// `{"error": ..}` reply, never fatal.
fn handle_line(engine: &mut PoolEngine, line: &str) -> Option<Value> {
    let cmd: IpcCommand = match serde_json::from_str(line) {
        Ok(c) => c,
        Err(e) => return Some(json!({ "error": e.to_string() })),
    };

    let reply = match cmd {
        IpcCommand::Quit => return None,
        IpcCommand::Evaluate { pool, seed } => match engine.try_evaluate(&pool, seed) {
            Ok(payload) => json!({ "payload": payload }),
            Err(e) => json!({ "error": e.to_string() }),
        },
        IpcCommand::Set {
            table,
            key,
            value,
            fill,
            trigger_disable,
        } => {
            let options = SetOptions {
                fill,
                trigger_disable,
            };
            match engine.registry_mut().set(&table, &key, value, options) {
                Some(stored) => json!({ "stored": stored }),
                None => json!({ "error": format!("invalid table name '{table}'") }),
            }
        }
        IpcCommand::Get { table, key } => {
            let registry = engine.registry();
            let value = match key {
                Some(key) => registry.get(&table, &key),
                None => registry.get_all(&table).map(Value::Object),
            };
            json!({ "value": value })
        }
    };
    Some(reply)
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    parse_opt(args, flag).unwrap_or(default)
}

fn parse_opt<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
}
