// src/cli/progress.rs - Terminal progress renderer for simulation rounds

use crate::core::orchestrator::RoundEvent;

/// Build a progress callback that writes formatted output to stderr.
///
/// Stdout stays reserved for round tables.
pub fn terminal_progress() -> impl Fn(RoundEvent) + Send + Sync + 'static {
    move |event| eprintln!("{}", render(&event))
}

fn render(event: &RoundEvent) -> String {
    match event {
        RoundEvent::RoundStarted { round, firms } => {
            format!("[round {round}] {firms} firm(s)")
        }
        RoundEvent::DisclosuresReady { round, count } => {
            format!("[round {round}]   disclosures: {count}")
        }
        RoundEvent::ScoringComplete {
            round,
            fallbacks,
            backfilled,
        } => {
            if *fallbacks + *backfilled == 0 {
                format!("[round {round}]   scoring done")
            } else {
                format!("[round {round}]   scoring done ({fallbacks} fallback, {backfilled} backfilled)")
            }
        }
        RoundEvent::AllocationsApplied {
            round,
            allocations,
            capital,
        } => {
            format!("[round {round}] {allocations} decision(s), {capital:.1} allocated")
        }
    }
}
