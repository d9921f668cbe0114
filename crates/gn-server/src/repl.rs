//! Line-oriented search loop: every input line is a new query.
//!
//! Searches run concurrently with reading input. A line typed while an
//! earlier search is still running supersedes it; the earlier result is
//! dropped when it arrives.

use std::io;

use gn_core::{
  record::Citizen360,
  search::Aggregator,
  session::{SearchResponse, SearchSession, SearchState},
  store::RecordStore,
};
use tokio::{
  io::{AsyncBufRead, AsyncBufReadExt as _, AsyncWrite, AsyncWriteExt as _},
  sync::mpsc,
};

/// Run until `input` is exhausted and the last search has answered.
/// Returns the session so callers can inspect the final state.
pub async fn run<S, R, W>(
  aggregator: Aggregator<S>,
  input: R,
  mut out: W,
) -> io::Result<SearchSession>
where
  S: RecordStore + 'static,
  R: AsyncBufRead + Unpin,
  W: AsyncWrite + Unpin,
{
  let mut session = SearchSession::new();
  let mut lines = input.lines();
  let (tx, mut rx) = mpsc::unbounded_channel::<SearchResponse>();
  let mut tx = Some(tx);

  loop {
    tokio::select! {
      line = lines.next_line(), if tx.is_some() => {
        let Some(query) = line? else {
          // End of input: stop accepting queries, drain the last answer.
          tx = None;
          if !matches!(session.state(), SearchState::Searching { .. }) {
            break;
          }
          continue;
        };
        let request = session.begin(query);
        render(&mut out, session.state()).await?;

        let Some(sender) = tx.clone() else { continue };
        let aggregator = aggregator.clone();
        tokio::spawn(async move {
          let _ = sender.send(aggregator.respond(request).await);
        });
      }
      Some(response) = rx.recv() => {
        if session.complete(response) {
          render(&mut out, session.state()).await?;
          if tx.is_none() {
            break;
          }
        }
      }
      else => break,
    }
  }

  out.flush().await?;
  Ok(session)
}

async fn render<W: AsyncWrite + Unpin>(
  out: &mut W,
  state: &SearchState,
) -> io::Result<()> {
  let text = match state {
    SearchState::Idle => String::new(),
    SearchState::Searching { generation, query } => {
      format!("searching #{generation}: {query:?}\n")
    }
    SearchState::Empty => "no matching citizens\n".to_string(),
    SearchState::Failed(reason) => format!("search failed: {reason}\n"),
    SearchState::Results(results) => results.iter().map(describe).collect(),
  };
  out.write_all(text.as_bytes()).await
}

fn describe(d: &Citizen360) -> String {
  let mut line = format!(
    "{}  {}  welfare={} permits={} logs={} pensions={} elderly={} orgs={}\n",
    d.citizen.nic,
    d.citizen.full_name,
    d.welfare_programs.len(),
    d.permits.len(),
    d.daily_logs.len(),
    d.pensions.len(),
    d.elderly_ids.len(),
    d.voluntary_orgs.len(),
  );
  for w in &d.welfare_programs {
    line.push_str(&format!("    welfare  {} ({})\n", w.program_name, w.status));
  }
  for p in &d.permits {
    line.push_str(&format!("    permit   {} ({})\n", p.permit_type, p.status));
  }
  for p in &d.pensions {
    line.push_str(&format!("    pension  {}\n", p.pension_type));
  }
  for o in &d.voluntary_orgs {
    line.push_str(&format!("    org      {}\n", o.name));
  }
  line
}
