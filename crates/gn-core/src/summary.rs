//! Dashboard counts across the registry.

use serde::Serialize;

use crate::{
  record::{
    Citizen, DailyLog, ElderlyId, Entity, Household, Pension, Permit,
    PermitStatus, RequestStatus, ServiceRequest, VoluntaryOrg, WelfareProgram,
    WelfareStatus,
  },
  store::RecordStore,
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrySummary {
  pub citizens:         usize,
  pub living_citizens:  usize,
  pub households:       usize,
  pub welfare_programs: usize,
  pub active_welfare:   usize,
  pub permits:          usize,
  pub active_permits:   usize,
  pub daily_logs:       usize,
  pub pensions:         usize,
  pub elderly_ids:      usize,
  pub voluntary_orgs:   usize,
  pub service_requests: usize,
  pub pending_requests: usize,
}

async fn load<S: RecordStore, E: Entity>(store: &S) -> Vec<E> {
  store.read_all::<E>().await.unwrap_or_else(|e| {
    tracing::warn!(collection = E::COLLECTION, error = %e, "counting as empty");
    Vec::new()
  })
}

/// Count every collection. Unreadable collections count as zero.
pub async fn summarize<S: RecordStore>(store: &S) -> RegistrySummary {
  let citizens: Vec<Citizen> = load(store).await;
  let welfare: Vec<WelfareProgram> = load(store).await;
  let permits: Vec<Permit> = load(store).await;
  let requests: Vec<ServiceRequest> = load(store).await;

  RegistrySummary {
    citizens:         citizens.len(),
    living_citizens:  citizens.iter().filter(|c| c.is_alive).count(),
    households:       load::<_, Household>(store).await.len(),
    welfare_programs: welfare.len(),
    active_welfare:   welfare
      .iter()
      .filter(|w| w.status == WelfareStatus::Active)
      .count(),
    permits:          permits.len(),
    active_permits:   permits
      .iter()
      .filter(|p| p.status == PermitStatus::Active)
      .count(),
    daily_logs:       load::<_, DailyLog>(store).await.len(),
    pensions:         load::<_, Pension>(store).await.len(),
    elderly_ids:      load::<_, ElderlyId>(store).await.len(),
    voluntary_orgs:   load::<_, VoluntaryOrg>(store).await.len(),
    service_requests: requests.len(),
    pending_requests: requests
      .iter()
      .filter(|r| r.status == RequestStatus::Pending)
      .count(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::memory::MemoryStore;

  #[tokio::test]
  async fn empty_registry() {
    assert_eq!(summarize(&MemoryStore::new()).await, RegistrySummary::default());
  }

  #[tokio::test]
  async fn counts_status_subsets() {
    let s = MemoryStore::new();
    s.write_all(vec![
      Citizen {
        nic: "123456789V".into(),
        full_name: "John Doe".into(),
        is_alive: true,
        ..Default::default()
      },
      Citizen {
        nic: "987654321V".into(),
        full_name: "Late Resident".into(),
        is_alive: false,
        ..Default::default()
      },
    ])
    .await
    .unwrap();
    s.write_all(vec![
      ServiceRequest {
        id: "r1".into(),
        nic: "123456789V".into(),
        request_type: "Residence certificate".into(),
        status: RequestStatus::Pending,
        ..Default::default()
      },
      ServiceRequest {
        id: "r2".into(),
        nic: "123456789V".into(),
        request_type: "Income certificate".into(),
        status: RequestStatus::Completed,
        ..Default::default()
      },
    ])
    .await
    .unwrap();
    s.put_raw(Household::COLLECTION, "garbage");

    let summary = summarize(&s).await;
    assert_eq!(summary.citizens, 2);
    assert_eq!(summary.living_citizens, 1);
    assert_eq!(summary.service_requests, 2);
    assert_eq!(summary.pending_requests, 1);
    assert_eq!(summary.households, 0);
  }
}
