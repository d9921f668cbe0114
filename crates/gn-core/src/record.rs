//! Registry records: one flat struct per persisted collection.
//!
//! Every record is stored as an element of a JSON array document named by
//! [`Entity::COLLECTION`]. Field names are camelCase on disk; missing optional
//! fields fall back to their defaults so hand-edited documents still load.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use strum::{Display, EnumString};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Entity ──────────────────────────────────────────────────────────────────

/// A record type with its own collection document and identity field.
pub trait Entity:
  Serialize + DeserializeOwned + Clone + Send + Sync + 'static
{
  /// Stable document name, e.g. `"citizens"`.
  const COLLECTION: &'static str;

  /// The identity field used by the upsert rule.
  fn key(&self) -> &str;

  /// Fill in a generated key if the caller left it blank.
  fn ensure_key(&mut self) {}

  /// Form-level checks applied before a write. Reads never validate.
  fn validate(&self) -> Result<()> { Ok(()) }
}

fn fresh_id() -> String { Uuid::new_v4().to_string() }

macro_rules! id_keyed {
  ($ty:ty, $collection:literal) => {
    impl Entity for $ty {
      const COLLECTION: &'static str = $collection;

      fn key(&self) -> &str { &self.id }

      fn ensure_key(&mut self) {
        if self.id.trim().is_empty() {
          self.id = fresh_id();
        }
      }
    }
  };
}

fn yes() -> bool { true }

// ─── Citizen ─────────────────────────────────────────────────────────────────

/// A registered resident, keyed by National Identity Card number.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Citizen {
  pub nic:           String,
  pub full_name:     String,
  #[serde(default)]
  pub date_of_birth: Option<NaiveDate>,
  #[serde(default)]
  pub gender:        String,
  #[serde(default)]
  pub occupation:    String,
  #[serde(default)]
  pub household_id:  Option<String>,
  #[serde(default)]
  pub address:       String,
  #[serde(default = "yes")]
  pub is_alive:      bool,
  #[serde(default = "yes")]
  pub is_active:     bool,
}

/// Shortest NIC the add-citizen form accepts (old 9-digit + letter format).
pub const MIN_NIC_LEN: usize = 10;

impl Entity for Citizen {
  const COLLECTION: &'static str = "citizens";

  fn key(&self) -> &str { &self.nic }

  fn validate(&self) -> Result<()> {
    let nic = self.nic.trim();
    if nic.is_empty() {
      return Err(Error::BlankField("nic"));
    }
    if nic.chars().count() < MIN_NIC_LEN {
      return Err(Error::InvalidNic(self.nic.clone()));
    }
    if self.full_name.trim().is_empty() {
      return Err(Error::BlankField("fullName"));
    }
    Ok(())
  }
}

// ─── Household ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Household {
  #[serde(default)]
  pub id:           String,
  #[serde(default)]
  pub house_number: String,
  #[serde(default)]
  pub address:      String,
  /// NIC of the head of household, if registered.
  #[serde(default)]
  pub head_nic:     Option<String>,
  #[serde(default)]
  pub member_nics:  Vec<String>,
}

id_keyed!(Household, "households");

// ─── Welfare ─────────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display,
  EnumString,
)]
pub enum WelfareStatus {
  #[default]
  Active,
  Pending,
  Discontinued,
}

/// Enrolment of a citizen in a welfare program such as Samurdhi or Aswesuma.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WelfareProgram {
  #[serde(default)]
  pub id:                String,
  pub nic:               String,
  pub program_name:      String,
  #[serde(default)]
  pub amount:            f64,
  #[serde(default)]
  pub status:            WelfareStatus,
  #[serde(default)]
  pub registration_date: Option<NaiveDate>,
}

id_keyed!(WelfareProgram, "welfare_programs");

// ─── Permits ─────────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display,
  EnumString,
)]
pub enum PermitType {
  Business,
  Firearm,
  ResourceTransport,
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display,
  EnumString,
)]
pub enum PermitStatus {
  #[default]
  Active,
  Expired,
  Revoked,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permit {
  #[serde(default)]
  pub id:          String,
  pub nic:         String,
  pub permit_type: PermitType,
  #[serde(default)]
  pub status:      PermitStatus,
  #[serde(default)]
  pub issue_date:  Option<NaiveDate>,
  #[serde(default)]
  pub expiry_date: Option<NaiveDate>,
}

id_keyed!(Permit, "permits");

// ─── Daily log ───────────────────────────────────────────────────────────────

/// A visitor entry in the officer's daily log. Visitors are recorded by the
/// name they give, not by NIC.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyLog {
  #[serde(default)]
  pub id:           String,
  pub visitor_name: String,
  #[serde(default)]
  pub purpose:      String,
  #[serde(default)]
  pub visit_date:   Option<NaiveDate>,
  #[serde(default)]
  pub remarks:      Option<String>,
}

id_keyed!(DailyLog, "daily_logs");

// ─── Pensions ────────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display,
  EnumString,
)]
pub enum PensionType {
  Civil,
  Farmer,
  Fisherman,
  Widow,
  Disability,
  #[default]
  Other,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pension {
  #[serde(default)]
  pub id:             String,
  pub nic:            String,
  #[serde(default)]
  pub pension_type:   PensionType,
  #[serde(default)]
  pub monthly_amount: f64,
  #[serde(default)]
  pub start_date:     Option<NaiveDate>,
}

id_keyed!(Pension, "pensions");

// ─── Elderly identity cards ──────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElderlyId {
  #[serde(default)]
  pub id:          String,
  pub nic:         String,
  /// Number printed on the elders' identity card.
  #[serde(default)]
  pub id_number:   String,
  #[serde(default)]
  pub issued_date: Option<NaiveDate>,
}

id_keyed!(ElderlyId, "elderly_ids");

// ─── Voluntary organisations ─────────────────────────────────────────────────

/// A registered community organisation. Office bearers are recorded by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoluntaryOrg {
  #[serde(default)]
  pub id:                  String,
  pub name:                String,
  #[serde(default)]
  pub registration_number: String,
  #[serde(default)]
  pub president_name:      String,
  #[serde(default)]
  pub secretary_name:      String,
  #[serde(default)]
  pub treasurer_name:      String,
}

id_keyed!(VoluntaryOrg, "voluntary_orgs");

// ─── Service requests ────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display,
  EnumString,
)]
pub enum RequestStatus {
  #[default]
  Pending,
  InProgress,
  Completed,
  Rejected,
}

/// A certificate or recommendation request lodged by a citizen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequest {
  #[serde(default)]
  pub id:           String,
  pub nic:          String,
  pub request_type: String,
  #[serde(default)]
  pub description:  String,
  #[serde(default)]
  pub status:       RequestStatus,
  #[serde(default)]
  pub created_at:   Option<DateTime<Utc>>,
}

id_keyed!(ServiceRequest, "service_requests");

// ─── Composite view ──────────────────────────────────────────────────────────

/// Everything the registry holds about one citizen. Never stored, always
/// assembled fresh by [`crate::search::Aggregator`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Citizen360 {
  pub citizen:          Citizen,
  pub welfare_programs: Vec<WelfareProgram>,
  pub permits:          Vec<Permit>,
  pub daily_logs:       Vec<DailyLog>,
  pub pensions:         Vec<Pension>,
  pub elderly_ids:      Vec<ElderlyId>,
  pub voluntary_orgs:   Vec<VoluntaryOrg>,
}

impl Citizen360 {
  /// Total number of joined records across all six lists.
  pub fn linked_count(&self) -> usize {
    self.welfare_programs.len()
      + self.permits.len()
      + self.daily_logs.len()
      + self.pensions.len()
      + self.elderly_ids.len()
      + self.voluntary_orgs.len()
  }
}
