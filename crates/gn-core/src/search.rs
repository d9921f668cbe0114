//! Cross-collection search: resolve a free-text query into Citizen360
//! dossiers.
//!
//! Citizens are matched by substring on full name or NIC. Each match is then
//! joined against six other collections:
//!
//! | collection | join |
//! |------------|------|
//! | welfare programs, permits, pensions, elderly IDs | `nic` equals the citizen's NIC |
//! | daily logs | visitor name equals, or contains, the citizen's full name |
//! | voluntary orgs | president, secretary or treasurer name equals the citizen's full name |
//!
//! All comparisons go through [`crate::normalize`]. The name-based joins have
//! no foreign key, so two citizens sharing a name both claim the same logs
//! and organisations.

use std::{sync::Arc, time::Duration};

use crate::{
  Error, Result,
  normalize::{contains_normalized, normalize, same},
  record::{
    Citizen, Citizen360, DailyLog, ElderlyId, Entity, Pension, Permit,
    VoluntaryOrg, WelfareProgram,
  },
  store::RecordStore,
};

// ─── Snapshot ────────────────────────────────────────────────────────────────

/// One full read of every collection the search joins over.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
  pub citizens:         Vec<Citizen>,
  pub welfare_programs: Vec<WelfareProgram>,
  pub permits:          Vec<Permit>,
  pub daily_logs:       Vec<DailyLog>,
  pub pensions:         Vec<Pension>,
  pub elderly_ids:      Vec<ElderlyId>,
  pub voluntary_orgs:   Vec<VoluntaryOrg>,
}

impl Snapshot {
  /// Read all seven collections once. A collection that cannot be read is
  /// taken as empty.
  pub async fn load<S: RecordStore>(store: &S) -> Self {
    Self {
      citizens:         load_or_empty(store).await,
      welfare_programs: load_or_empty(store).await,
      permits:          load_or_empty(store).await,
      daily_logs:       load_or_empty(store).await,
      pensions:         load_or_empty(store).await,
      elderly_ids:      load_or_empty(store).await,
      voluntary_orgs:   load_or_empty(store).await,
    }
  }
}

async fn load_or_empty<S: RecordStore, E: Entity>(store: &S) -> Vec<E> {
  match store.read_all::<E>().await {
    Ok(records) => records,
    Err(e) => {
      tracing::warn!(
        collection = E::COLLECTION,
        error = %e,
        "collection unavailable; searching without it"
      );
      Vec::new()
    }
  }
}

// ─── Matching ────────────────────────────────────────────────────────────────

/// Whether `citizen` matches an already-normalised, non-empty `needle`.
pub fn citizen_matches(citizen: &Citizen, needle: &str) -> bool {
  contains_normalized(&citizen.full_name, needle)
    || contains_normalized(&citizen.nic, needle)
}

fn log_matches(log: &DailyLog, full_name: &str) -> bool {
  same(&log.visitor_name, full_name)
    || contains_normalized(&log.visitor_name, &normalize(full_name))
}

fn org_matches(org: &VoluntaryOrg, full_name: &str) -> bool {
  [&org.president_name, &org.secretary_name, &org.treasurer_name]
    .into_iter()
    .any(|officer| same(officer, full_name))
}

fn by_nic<T: Clone>(
  records: &[T],
  nic: &str,
  nic_of: impl Fn(&T) -> &str,
) -> Vec<T> {
  records
    .iter()
    .filter(|r| same(nic_of(*r), nic))
    .cloned()
    .collect()
}

/// Join one citizen against every auxiliary collection in `snapshot`.
pub fn dossier(citizen: &Citizen, snapshot: &Snapshot) -> Citizen360 {
  let nic = citizen.nic.as_str();
  let name = citizen.full_name.as_str();

  Citizen360 {
    citizen:          citizen.clone(),
    welfare_programs: by_nic(&snapshot.welfare_programs, nic, |w| w.nic.as_str()),
    permits:          by_nic(&snapshot.permits, nic, |p| p.nic.as_str()),
    daily_logs:       snapshot
      .daily_logs
      .iter()
      .filter(|l| log_matches(l, name))
      .cloned()
      .collect(),
    pensions:         by_nic(&snapshot.pensions, nic, |p| p.nic.as_str()),
    elderly_ids:      by_nic(&snapshot.elderly_ids, nic, |e| e.nic.as_str()),
    voluntary_orgs:   snapshot
      .voluntary_orgs
      .iter()
      .filter(|o| org_matches(o, name))
      .cloned()
      .collect(),
  }
}

/// Resolve `query` against an already-loaded snapshot. Results follow the
/// stored order of citizens.
pub fn assemble(query: &str, snapshot: &Snapshot) -> Vec<Citizen360> {
  let needle = normalize(query);
  if needle.is_empty() {
    return Vec::new();
  }
  snapshot
    .citizens
    .iter()
    .filter(|c| citizen_matches(c, &needle))
    .map(|c| dossier(c, snapshot))
    .collect()
}

// ─── Aggregator ──────────────────────────────────────────────────────────────

/// Runs searches against a shared store. Every call takes a fresh snapshot;
/// nothing is cached between calls.
pub struct Aggregator<S> {
  store:   Arc<S>,
  timeout: Option<Duration>,
}

impl<S> Clone for Aggregator<S> {
  fn clone(&self) -> Self {
    Self {
      store:   Arc::clone(&self.store),
      timeout: self.timeout,
    }
  }
}

impl<S: RecordStore + 'static> Aggregator<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self {
      store,
      timeout: None,
    }
  }

  /// Fail searches that take longer than `timeout`.
  pub fn with_timeout(mut self, timeout: Duration) -> Self {
    self.timeout = Some(timeout);
    self
  }

  pub fn store(&self) -> &Arc<S> { &self.store }

  /// Search inline. Blank queries return immediately without reading the
  /// store; unreadable collections are skipped.
  pub async fn search(&self, query: &str) -> Vec<Citizen360> {
    if normalize(query).is_empty() {
      return Vec::new();
    }
    let snapshot = Snapshot::load(self.store.as_ref()).await;
    let results = assemble(query, &snapshot);
    tracing::debug!(
      citizens = snapshot.citizens.len(),
      matched = results.len(),
      "search assembled"
    );
    results
  }

  /// Search on a separate task, so a fault while assembling or an elapsed
  /// deadline is reported as an error instead of unwinding into the caller.
  pub async fn try_search(&self, query: &str) -> Result<Vec<Citizen360>> {
    let this = self.clone();
    let query = query.to_owned();
    let handle = tokio::spawn(async move { this.search(&query).await });
    let abort = handle.abort_handle();

    let joined = match self.timeout {
      Some(limit) => match tokio::time::timeout(limit, handle).await {
        Ok(joined) => joined,
        Err(_) => {
          abort.abort();
          tracing::warn!(?limit, "search timed out");
          return Err(Error::SearchTimedOut(limit));
        }
      },
      None => handle.await,
    };

    joined.map_err(|e| {
      tracing::error!(error = %e, "search task failed");
      Error::SearchFailed(e.to_string())
    })
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
