use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rand::Rng;
use round_robin_rule::{
    ClientConfig, RoundRobinRule, Server, ServerPool, ServerSelectionStrategy, StaticServerPool,
};
use tracing::{debug, info, trace, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    if let Err(e) = run().await {
        tracing::error!(
            error = %round_robin_rule::error::chain(&e),
            root_cause = %round_robin_rule::error::root_cause(&e),
            "selection run failed"
        );
        std::process::exit(1);
    }
}

async fn run() -> round_robin_rule::error::Result<()> {
    // Pool comes from LB_CONFIG (JSON) when set, otherwise eight local backends.
    let config = match std::env::var("LB_CONFIG") {
        Ok(path) => ClientConfig::from_file(&path).await?,
        Err(_) => ClientConfig::default(),
    };
    let workers: usize = env_or("LB_WORKERS", 4);
    let requests: usize = env_or("LB_REQUESTS", 16);
    let flap_ms: u64 = env_or("LB_FLAP_MS", 5);

    let pool = Arc::new(config.build_pool()?);
    let rule: Arc<RoundRobinRule<StaticServerPool>> =
        Arc::new(RoundRobinRule::with_pool(Arc::clone(&pool)));
    rule.init_with_client_config(&config);

    info!(
        pool = %config.name,
        servers = pool.len(),
        reachable = pool.reachable_servers().len(),
        workers,
        requests,
        "starting selection run"
    );

    // Randomly toggles readiness so workers have unhealthy backends to skip.
    let flapper = {
        let pool = Arc::clone(&pool);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_millis(flap_ms.max(1)));
            loop {
                ticker.tick().await;
                let servers = pool.all_servers();
                if servers.is_empty() {
                    continue;
                }
                let idx = rand::thread_rng().gen_range(0..servers.len());
                let ready = !servers[idx].is_ready_to_serve();
                servers[idx].set_ready_to_serve(ready);
                debug!(server = %servers[idx], ready, "flipped readiness");
            }
        })
    };

    let picks: Arc<Mutex<HashMap<String, u64>>> = Arc::new(Mutex::new(HashMap::new()));
    let misses = Arc::new(AtomicU64::new(0));

    let mut handles = Vec::with_capacity(workers);
    for worker in 0..workers {
        let rule = Arc::clone(&rule);
        let picks = Arc::clone(&picks);
        let misses = Arc::clone(&misses);
        handles.push(tokio::spawn(async move {
            for _ in 0..requests {
                match rule.choose_bound() {
                    Some(server) => {
                        *picks.lock().entry(server.to_string()).or_insert(0) += 1;
                    }
                    None => {
                        misses.fetch_add(1, Ordering::Relaxed);
                    }
                }
                if let Some(snapshot) = rule.debug_snapshot() {
                    trace!(worker, %snapshot);
                }
                tokio::task::yield_now().await;
            }
        }));
    }

    for handle in handles {
        if let Err(e) = handle.await {
            warn!(error = %e, "worker task failed");
        }
    }
    flapper.abort();

    let picks = picks.lock();
    let mut items: Vec<(&String, &u64)> = picks.iter().collect();
    items.sort();
    info!(
        selected = items.iter().map(|(_, c)| **c).sum::<u64>(),
        misses = misses.load(Ordering::Relaxed),
        "selection run finished"
    );
    for (server, count) in items {
        info!(server = %server, count = *count, "picks");
    }

    Ok(())
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
