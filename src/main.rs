use anyhow::bail;
use tracing::log;

use futsal_score_rs::match_clock::{format_time, MatchClock};
use futsal_score_rs::match_list_service::MatchListService;
use futsal_score_rs::match_session::MatchSession;
use futsal_score_rs::merge_service::MergeService;
use futsal_score_rs::models::{CardKind, TeamSide};
use futsal_score_rs::outbox_service::{backoff_s, OutboxService, PendingKind};
use futsal_score_rs::rest_client::RestClient;
use futsal_score_rs::snapshot_service::{display_name, SnapshotService};
use futsal_score_rs::CONFIG;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::var_os("RUST_LOG").is_none() {
        // Set the RUST_LOG, if it hasn't been explicitly defined
        std::env::set_var("RUST_LOG", "debug,hyper=debug")
    }

    // Configure a custom event formatter
    let format = tracing_subscriber::fmt::format()
        .with_level(true)
        .with_target(false)
        .with_ansi(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .compact();
    tracing_subscriber::fmt()
        .event_format(format)
        .with_max_level(tracing::Level::INFO)
        .init();

    let client = RestClient::from_config(&CONFIG);
    let outbox = OutboxService::new();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(|s| s.as_str()).collect();

    match args.as_slice() {
        ["list"] => {
            for event in MatchListService::fetch(&client).await? {
                let date = event.date.as_deref().unwrap_or("no date");
                println!("{}\t{}\t{}", event.id, date, event.title.rendered);
            }
        }
        ["show", match_id] => {
            let (snapshot, directory) = SnapshotService::load(&client, match_id).await?;
            let session = MatchSession::from_snapshot(match_id, &snapshot, &directory)?;
            let board = session.scoreboard();
            println!(
                "{} {} - {} {}",
                session.info.local_team_id,
                board.local_score,
                board.visitor_score,
                session.info.visitor_team_id
            );
            for event in session.events() {
                println!("{event}");
            }
        }
        ["goal", match_id, side, scorer_id, minute, rest @ ..] => {
            let team: TeamSide = parse(side, "side, expected local|visitor")?;
            let scorer_id: u32 = parse(scorer_id, "scorer id")?;
            let minute: u32 = parse(minute, "minute")?;
            let assistant_id = match rest {
                [] => None,
                [assist] => Some(parse::<u32>(assist, "assistant id")?),
                _ => bail!("usage: goal <match_id> <local|visitor> <scorer_id> <minute> [assist_id]"),
            };
            let kind = PendingKind::Goal { team, scorer_id, assistant_id, minute };
            submit_or_queue(
                &outbox,
                match_id,
                kind,
                MergeService::submit_goal(&client, match_id, team, scorer_id, assistant_id, minute).await,
            )?;
        }
        ["card", match_id, side, player_id, kind, minute] => {
            let team: TeamSide = parse(side, "side, expected local|visitor")?;
            let player_id: u32 = parse(player_id, "player id")?;
            let kind: CardKind = parse(kind, "card kind, expected yellow|red|blue")?;
            let minute: u32 = parse(minute, "minute")?;
            let pending = PendingKind::Card { team, player_id, kind, minute };
            submit_or_queue(
                &outbox,
                match_id,
                pending,
                MergeService::submit_card(&client, match_id, team, player_id, kind, minute).await,
            )?;
        }
        ["delete-goal", match_id, side, scorer_id] => {
            let team: TeamSide = parse(side, "side, expected local|visitor")?;
            let scorer_id: u32 = parse(scorer_id, "scorer id")?;
            let pending = PendingKind::GoalDeletion { team, scorer_id };
            submit_or_queue(
                &outbox,
                match_id,
                pending,
                MergeService::delete_goal(&client, match_id, team, scorer_id).await,
            )?;
        }
        ["players", match_id] => {
            let (snapshot, directory) = SnapshotService::load(&client, match_id).await?;
            for id in snapshot.participant_ids() {
                println!("{}\t{}", id, display_name(&directory, id));
            }
        }
        ["clock", action] => {
            let mut clock = MatchClock::new(CONFIG.half_duration_s);
            match *action {
                "start" => clock.start(),
                "pause" => clock.pause(),
                "reset" => clock.reset(),
                "add-minute" => clock.add_minute(),
                "subtract-minute" => clock.subtract_minute(),
                "status" => {}
                _ => bail!("usage: clock <start|pause|status|reset|add-minute|subtract-minute>"),
            }
            if let Some(half) = clock.poll() {
                println!("half complete: {half:?}");
            }
            println!(
                "{} {} / {} (first: {}, second: {})",
                if clock.is_running() { "running" } else { "paused" },
                format_time(clock.elapsed_s()),
                format_time(clock.half_duration_s()),
                clock.first_saved.as_deref().unwrap_or("-"),
                clock.second_saved.as_deref().unwrap_or("-"),
            );
        }
        ["flush"] => {
            let mut round = 0;
            loop {
                let delivered = outbox.flush(&client).await;
                let remaining = outbox.pending().len();
                println!("delivered {delivered}, {remaining} still pending");
                if remaining == 0 || round >= 5 {
                    break;
                }
                tokio::time::sleep(std::time::Duration::from_secs(backoff_s(round))).await;
                round += 1;
            }
        }
        _ => {
            bail!(
                "usage: list | show <match_id> | players <match_id> \
                 | goal <match_id> <local|visitor> <scorer_id> <minute> [assist_id] \
                 | card <match_id> <local|visitor> <player_id> <yellow|red|blue> <minute> \
                 | delete-goal <match_id> <local|visitor> <scorer_id> \
                 | clock <start|pause|status|reset|add-minute|subtract-minute> | flush"
            );
        }
    }
    Ok(())
}

fn parse<T: std::str::FromStr>(raw: &str, what: &str) -> anyhow::Result<T>
where
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|e| anyhow::anyhow!("invalid {what} '{raw}': {e}"))
}

/// Queues the mutation for a later flush when the remote write fails
/// for a retryable reason. Validation failures surface immediately.
fn submit_or_queue(
    outbox: &OutboxService,
    match_id: &str,
    kind: PendingKind,
    result: Result<(), futsal_score_rs::errors::ApiError>,
) -> anyhow::Result<()> {
    match result {
        Ok(()) => {
            println!("saved");
            Ok(())
        }
        Err(e) if e.is_retryable_write() => {
            log::error!("[MAIN] Remote write failed, queueing: {e}");
            let key = outbox.enqueue(match_id, kind);
            println!("remote store unreachable, saved locally as {key}; run `flush` to retry");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
