//! Inter-process accessor contract over the store: four addressable resources
//! carrying flat field sets, the shape external callers are promised. The
//! repository inside this process talks to the store directly; this shim
//! exists as the reproduced wire boundary, not as another data-access layer.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::db::{self, Store, StoreError};
use crate::models::{Progress, ProgressDraft, Skill, SkillDraft, Status};

/// Flat field set exchanged across the boundary, one entry per column.
pub type FieldMap = Map<String, Value>;

/// Failures at the accessor boundary. Malformed addresses are the one hard
/// error class of the system; they only arise from external callers, since
/// internal addresses are constructed, not parsed.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("unknown resource: {0}")]
    UnknownResource(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The four resources the accessor exposes. Collections accept query and
/// insert; items accept query, update, and delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceAddress {
    Skills,
    Skill(i64),
    ProgressEntries,
    Progress(i64),
}

impl FromStr for ResourceAddress {
    type Err = ProviderError;

    fn from_str(address: &str) -> Result<Self, Self::Err> {
        let mut segments = address.split('/');
        let resource = segments.next().unwrap_or_default();
        let item = segments.next();

        // Exactly one or two segments, the second numeric; everything else is
        // an unknown resource.
        let id = if segments.next().is_some() {
            None
        } else {
            match item {
                Some(raw) => raw.parse::<i64>().ok().map(Some),
                None => Some(None),
            }
        };

        match id.map(|id| (resource, id)) {
            Some(("skill", None)) => Ok(ResourceAddress::Skills),
            Some(("skill", Some(id))) => Ok(ResourceAddress::Skill(id)),
            Some(("progress", None)) => Ok(ResourceAddress::ProgressEntries),
            Some(("progress", Some(id))) => Ok(ResourceAddress::Progress(id)),
            _ => Err(ProviderError::UnknownResource(address.to_string())),
        }
    }
}

impl fmt::Display for ResourceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceAddress::Skills => write!(f, "skill"),
            ResourceAddress::Skill(id) => write!(f, "skill/{id}"),
            ResourceAddress::ProgressEntries => write!(f, "progress"),
            ResourceAddress::Progress(id) => write!(f, "progress/{id}"),
        }
    }
}

/// Accessor shim bound to one store handle.
pub struct SkillsProvider {
    store: Arc<Store>,
}

impl SkillsProvider {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Query a resource. Collections return every matching row and items
    /// return zero or one. The `progress` collection filters by the first
    /// selection argument parsed as a skill id, `-1` when absent.
    pub fn query(
        &self,
        address: ResourceAddress,
        selection_args: &[String],
    ) -> Result<Vec<FieldMap>, ProviderError> {
        let rows: Vec<FieldMap> = match address {
            ResourceAddress::Skills => self
                .store
                .with_conn(|conn| db::fetch_skills(conn))?
                .iter()
                .map(skill_to_fields)
                .collect(),
            ResourceAddress::Skill(id) => self
                .store
                .with_conn(|conn| db::get_skill_by_id(conn, id))?
                .iter()
                .map(skill_to_fields)
                .collect(),
            ResourceAddress::ProgressEntries => {
                let skill_id = selection_args
                    .first()
                    .and_then(|raw| raw.parse::<i64>().ok())
                    .unwrap_or(-1);
                self.store
                    .with_conn(|conn| db::fetch_progress_for_skill(conn, skill_id))?
                    .iter()
                    .map(progress_to_fields)
                    .collect()
            }
            ResourceAddress::Progress(id) => self
                .store
                .with_conn(|conn| db::get_progress_by_id(conn, id))?
                .iter()
                .map(progress_to_fields)
                .collect(),
        };
        debug!(%address, count = rows.len(), "provider query");
        Ok(rows)
    }

    /// Insert into a collection, returning the address of the new item.
    /// Missing text fields default to empty and missing numeric fields to
    /// `-1`.
    pub fn insert(
        &self,
        address: ResourceAddress,
        values: &FieldMap,
    ) -> Result<ResourceAddress, ProviderError> {
        match address {
            ResourceAddress::Skills => {
                let draft = SkillDraft {
                    name: field_string(values, "name"),
                    description: Some(field_string(values, "description")),
                };
                let date = field_string(values, "lastEditDate");
                let id = self
                    .store
                    .with_conn(|conn| db::insert_skill(conn, None, &draft, &date))?;
                Ok(ResourceAddress::Skill(id))
            }
            ResourceAddress::ProgressEntries => {
                let skill_id = field_i64(values, "skillId").unwrap_or(-1);
                let draft = ProgressDraft {
                    status: Status::from_label(&field_string(values, "status")),
                    tracker: field_i64(values, "tracker").unwrap_or(-1),
                    personal_notes: Some(field_string(values, "personalNotes")),
                };
                let id = self
                    .store
                    .with_conn(|conn| db::insert_progress(conn, None, skill_id, &draft))?;
                Ok(ResourceAddress::Progress(id))
            }
            other => Err(ProviderError::UnknownResource(other.to_string())),
        }
    }

    /// Update one item, matched by the id in its address. Returns rows
    /// affected; collections are not updatable.
    pub fn update(
        &self,
        address: ResourceAddress,
        values: &FieldMap,
    ) -> Result<usize, ProviderError> {
        match address {
            ResourceAddress::Skill(id) => {
                let skill = Skill {
                    id,
                    name: field_string(values, "name"),
                    description: Some(field_string(values, "description")),
                    last_edit_date: field_string(values, "lastEditDate"),
                };
                Ok(self.store.with_conn(|conn| db::update_skill(conn, &skill))?)
            }
            ResourceAddress::Progress(id) => {
                let progress = Progress {
                    id,
                    skill_id: field_i64(values, "skillId").unwrap_or(-1),
                    status: Status::from_label(&field_string(values, "status")),
                    tracker: field_i64(values, "tracker").unwrap_or(-1),
                    personal_notes: Some(field_string(values, "personalNotes")),
                };
                Ok(self
                    .store
                    .with_conn(|conn| db::update_progress(conn, &progress))?)
            }
            other => Err(ProviderError::UnknownResource(other.to_string())),
        }
    }

    /// Delete one item by the id in its address. Returns rows affected;
    /// collections are not deletable.
    pub fn delete(&self, address: ResourceAddress) -> Result<usize, ProviderError> {
        match address {
            ResourceAddress::Skill(id) => Ok(self
                .store
                .with_conn(|conn| db::delete_skill_by_id(conn, id))?),
            ResourceAddress::Progress(id) => Ok(self
                .store
                .with_conn(|conn| db::delete_progress_by_id(conn, id))?),
            other => Err(ProviderError::UnknownResource(other.to_string())),
        }
    }
}

fn field_string(values: &FieldMap, key: &str) -> String {
    values
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn field_i64(values: &FieldMap, key: &str) -> Option<i64> {
    values.get(key).and_then(Value::as_i64)
}

fn skill_to_fields(skill: &Skill) -> FieldMap {
    let mut fields = FieldMap::new();
    fields.insert("id".to_string(), Value::from(skill.id));
    fields.insert("name".to_string(), Value::from(skill.name.clone()));
    fields.insert(
        "description".to_string(),
        skill
            .description
            .clone()
            .map(Value::from)
            .unwrap_or(Value::Null),
    );
    fields.insert(
        "lastEditDate".to_string(),
        Value::from(skill.last_edit_date.clone()),
    );
    fields
}

fn progress_to_fields(progress: &Progress) -> FieldMap {
    let mut fields = FieldMap::new();
    fields.insert("id".to_string(), Value::from(progress.id));
    fields.insert("skillId".to_string(), Value::from(progress.skill_id));
    fields.insert(
        "status".to_string(),
        Value::from(progress.status.as_str()),
    );
    fields.insert("tracker".to_string(), Value::from(progress.tracker));
    fields.insert(
        "personalNotes".to_string(),
        progress
            .personal_notes
            .clone()
            .map(Value::from)
            .unwrap_or(Value::Null),
    );
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn provider() -> SkillsProvider {
        SkillsProvider::new(Arc::new(Store::open_in_memory().unwrap()))
    }

    fn skill_fields(name: &str, date: &str) -> FieldMap {
        let mut fields = FieldMap::new();
        fields.insert("name".to_string(), json!(name));
        fields.insert("description".to_string(), json!("a description"));
        fields.insert("lastEditDate".to_string(), json!(date));
        fields
    }

    #[test]
    fn addresses_parse_and_print() {
        assert_eq!(
            "skill".parse::<ResourceAddress>().unwrap(),
            ResourceAddress::Skills
        );
        assert_eq!(
            "skill/12".parse::<ResourceAddress>().unwrap(),
            ResourceAddress::Skill(12)
        );
        assert_eq!(
            "progress".parse::<ResourceAddress>().unwrap(),
            ResourceAddress::ProgressEntries
        );
        assert_eq!(
            "progress/3".parse::<ResourceAddress>().unwrap(),
            ResourceAddress::Progress(3)
        );
        assert_eq!(ResourceAddress::Skill(12).to_string(), "skill/12");
    }

    #[test]
    fn malformed_addresses_are_hard_errors() {
        for address in ["skills", "skill/abc", "skill/1/2", "", "habit/4"] {
            assert!(matches!(
                address.parse::<ResourceAddress>(),
                Err(ProviderError::UnknownResource(_))
            ));
        }
    }

    #[test]
    fn insert_then_query_round_trips() {
        let provider = provider();
        let address = provider
            .insert(ResourceAddress::Skills, &skill_fields("Rust", "2024-06-15"))
            .unwrap();
        let ResourceAddress::Skill(id) = address else {
            panic!("insert returned a non-item address");
        };

        let rows = provider.query(ResourceAddress::Skill(id), &[]).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("name"), Some(&json!("Rust")));
        assert_eq!(rows[0].get("lastEditDate"), Some(&json!("2024-06-15")));

        let all = provider.query(ResourceAddress::Skills, &[]).unwrap();
        assert_eq!(all.len(), 1);
    }

    #[test]
    fn progress_collection_honors_skill_id_filter() {
        let provider = provider();
        let mut fields = FieldMap::new();
        fields.insert("skillId".to_string(), json!(7));
        fields.insert("status".to_string(), json!("Advanced"));
        fields.insert("tracker".to_string(), json!(75));
        fields.insert("personalNotes".to_string(), json!("notes"));
        provider
            .insert(ResourceAddress::ProgressEntries, &fields)
            .unwrap();

        let hits = provider
            .query(ResourceAddress::ProgressEntries, &["7".to_string()])
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].get("tracker"), Some(&json!(75)));

        let misses = provider
            .query(ResourceAddress::ProgressEntries, &["8".to_string()])
            .unwrap();
        assert!(misses.is_empty());

        // no filter argument means no matching skill id
        let unfiltered = provider
            .query(ResourceAddress::ProgressEntries, &[])
            .unwrap();
        assert!(unfiltered.is_empty());
    }

    #[test]
    fn update_and_delete_operate_on_items_only() {
        let provider = provider();
        let address = provider
            .insert(ResourceAddress::Skills, &skill_fields("Rust", "2024-01-01"))
            .unwrap();

        let rows = provider
            .update(address, &skill_fields("Rust", "2024-02-02"))
            .unwrap();
        assert_eq!(rows, 1);

        assert!(matches!(
            provider.update(ResourceAddress::Skills, &FieldMap::new()),
            Err(ProviderError::UnknownResource(_))
        ));
        assert!(matches!(
            provider.delete(ResourceAddress::ProgressEntries),
            Err(ProviderError::UnknownResource(_))
        ));
        assert!(matches!(
            provider.insert(ResourceAddress::Skill(1), &FieldMap::new()),
            Err(ProviderError::UnknownResource(_))
        ));

        assert_eq!(provider.delete(address).unwrap(), 1);
        assert_eq!(provider.delete(address).unwrap(), 0);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let provider = provider();
        let address = provider
            .insert(ResourceAddress::ProgressEntries, &FieldMap::new())
            .unwrap();
        let rows = provider.query(address, &[]).unwrap();
        assert_eq!(rows[0].get("skillId"), Some(&json!(-1)));
        assert_eq!(rows[0].get("tracker"), Some(&json!(-1)));
        assert_eq!(rows[0].get("status"), Some(&json!("Unknown")));
    }
}
