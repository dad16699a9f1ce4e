//! `check` and `watch`: run poll cycles against the configured location.

use clap::Args;
use slotwatch_core::cowin::transport;
use slotwatch_core::{notify, today_date, CalendarFetcher, Config, PollCycle, SqliteDedupStore};

#[derive(Args)]
pub struct CheckArgs {
    /// Pincode to query (defaults to config `pincode`)
    #[arg(long)]
    pincode: Option<String>,
    /// Date as dd-mm-YYYY (defaults to today)
    #[arg(long)]
    date: Option<String>,
    /// Print matches as JSON
    #[arg(long)]
    json: bool,
    /// Report matches without notifying or marking them seen
    #[arg(long)]
    dry_run: bool,
}

#[derive(Args)]
pub struct WatchArgs {
    /// Pincode to query (defaults to config `pincode`)
    #[arg(long)]
    pincode: Option<String>,
    /// Seconds between cycles (defaults to config `fetch.interval_secs`)
    #[arg(long)]
    interval: Option<u64>,
}

fn resolve_pincode(arg: Option<String>, config: &Config) -> Result<String, Box<dyn std::error::Error>> {
    match arg {
        Some(p) if !p.trim().is_empty() => Ok(p),
        _ if !config.pincode.trim().is_empty() => Ok(config.pincode.clone()),
        _ => Err("no pincode: pass --pincode or run `slotwatch config set pincode <code>`".into()),
    }
}

fn build_fetcher(config: &Config) -> Result<CalendarFetcher, Box<dyn std::error::Error>> {
    let transport = transport::from_config(&config.transport, config.timeout())?;
    Ok(CalendarFetcher::new(transport, &config.fetch.base_url)?)
}

pub async fn check(args: CheckArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let pincode = resolve_pincode(args.pincode, &config)?;
    let date = args.date.unwrap_or_else(today_date);

    let fetcher = build_fetcher(&config)?;
    let store = SqliteDedupStore::open()?;
    let notifier = notify::from_config(&config.notify, config.timeout())?;
    let cycle = PollCycle {
        fetcher: &fetcher,
        criteria: &config.criteria,
        store: &store,
        notifier: &notifier,
    };

    let matched = if args.dry_run {
        cycle.matches(&pincode, &date).await?
    } else {
        cycle.run(&pincode, &date).await?.matched
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&matched)?);
    } else if matched.is_empty() {
        println!("no new slots for {pincode} on {date}");
    } else {
        for session in &matched {
            println!("{}", session.summary());
        }
    }
    Ok(())
}

pub async fn watch(args: WatchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let pincode = resolve_pincode(args.pincode, &config)?;
    let period = match args.interval {
        Some(0) => return Err("--interval must be greater than zero".into()),
        Some(secs) => std::time::Duration::from_secs(secs),
        None => config.interval(),
    };

    let fetcher = build_fetcher(&config)?;
    let store = SqliteDedupStore::open()?;
    let notifier = notify::from_config(&config.notify, config.timeout())?;
    let cycle = PollCycle {
        fetcher: &fetcher,
        criteria: &config.criteria,
        store: &store,
        notifier: &notifier,
    };

    tracing::info!(pincode = %pincode, interval_secs = period.as_secs(), "watching for slots");
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted, stopping");
                return Ok(());
            }
        }

        // Re-evaluated each cycle so a long watch rolls over to the next day.
        let date = today_date();
        tokio::select! {
            result = cycle.run(&pincode, &date) => {
                if let Err(e) = result {
                    tracing::error!(pincode = %pincode, date = %date, "poll cycle failed: {e}");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted during cycle, stopping");
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pincode_argument_wins_over_config() {
        let mut config = Config::default();
        config.pincode = "110001".into();
        assert_eq!(resolve_pincode(Some("560001".into()), &config).unwrap(), "560001");
        assert_eq!(resolve_pincode(None, &config).unwrap(), "110001");
    }

    #[test]
    fn missing_pincode_is_an_error() {
        let config = Config::default();
        assert!(resolve_pincode(None, &config).is_err());
        assert!(resolve_pincode(Some("  ".into()), &config).is_err());
    }
}
