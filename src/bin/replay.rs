use std::{fs::File, io::BufReader, path::PathBuf};

use anyhow::Context;
use itertools::Itertools;
use structopt::StructOpt;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use multicut_server::{
    multicut::{levels::read_levels, EdgeId, ScoreOrder, Session, SessionConfig},
    progress::{load_progress, spawn_progress_worker, JsonProgressStore, ProgressConfig},
};

/// Replays a sequence of edge toggles on one level and records improvements.
#[derive(StructOpt)]
struct Opts {
    /// Level file in `{"Graphs": [...]}` format
    #[structopt(parse(from_os_str))]
    levels: PathBuf,

    /// Index of the level within the file
    #[structopt(short, long, default_value = "0")]
    level: usize,

    /// Comma separated edge ids, toggled in order
    #[structopt(short, long, default_value = "")]
    toggles: String,

    #[structopt(short, long, default_value = "progress.json", parse(from_os_str))]
    progress: PathBuf,

    #[structopt(long)]
    higher_is_better: bool,

    #[structopt(long, default_value = "3")]
    save_retries: u32,
}

fn parse_toggles(toggles: &str) -> anyhow::Result<Vec<EdgeId>> {
    toggles
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse().with_context(|| format!("invalid edge id {s:?}")))
        .collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "multicut_server=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let opts = Opts::from_args();
    let toggles = parse_toggles(&opts.toggles)?;

    let file = File::open(&opts.levels)
        .with_context(|| format!("failed to open {}", opts.levels.display()))?;
    let mut levels = read_levels(BufReader::new(file))?;

    let progress = load_progress(&opts.progress).await?;
    let restored = progress.apply(&mut levels);
    info!(
        "Loaded {} level(s), restored progress for {restored}, {} completed",
        levels.len(),
        progress.completed_levels()
    );

    anyhow::ensure!(
        opts.level < levels.len(),
        "level index {} out of range; file contains {} level(s)",
        opts.level,
        levels.len()
    );
    let graph = levels.swap_remove(opts.level);

    let (handle, worker) = spawn_progress_worker(
        JsonProgressStore::new(&opts.progress),
        ProgressConfig {
            retries: opts.save_retries,
            ..Default::default()
        },
    );

    let config = SessionConfig {
        score_order: if opts.higher_is_better {
            ScoreOrder::HigherIsBetter
        } else {
            ScoreOrder::LowerIsBetter
        },
    };
    let mut session = Session::with_observer(graph, config, handle);

    println!(
        "level {:?}: {} nodes, {} edges, {} components, score {}",
        session.graph().name,
        session.graph().number_of_nodes(),
        session.graph().number_of_edges(),
        session.number_of_components(),
        session.display_score()
    );

    let mut outcome = Ok(());
    for edge in toggles {
        match session.toggle_edge(edge) {
            Ok(toggle) => println!(
                "edge {edge:>4} cut={:<5} {:?} score={} valid={} improved={} state={:?}",
                toggle.is_cut,
                toggle.update,
                session.display_score(),
                toggle.valid,
                toggle.improved,
                toggle.state
            ),
            Err(e) => {
                outcome = Err(anyhow::Error::new(e).context(format!("toggling edge {edge} failed")));
                break;
            }
        }
    }

    let redundant = session.redundant_cuts();
    if !redundant.is_empty() {
        println!("redundant cuts: {}", redundant.iter().join(", "));
    }
    println!(
        "best achieved: {:?} (optimal {})",
        session.graph().best_achieved_cost,
        session.graph().optimal_cost
    );

    // dropping the session closes the queue; wait until everything is written
    drop(session);
    worker.await.context("progress worker panicked")?;

    outcome
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn toggles_are_parsed() {
        assert_eq!(parse_toggles("").unwrap(), Vec::<EdgeId>::new());
        assert_eq!(parse_toggles("3, 1,4,").unwrap(), vec![3, 1, 4]);
        assert!(parse_toggles("1,x").is_err());
    }
}
