//! Typed read/write helpers over the state document.
//!
//! Records that fail to deserialize are skipped with a warning so one bad
//! entry never hides the rest of a collection.

use super::{StateResult, StateStore, DIRECTORY_FILTERS_KEY, LAST_ROUTE_KEY};
use crate::model::approval::{Approval, ApprovalStatus};
use crate::model::directory::{DirectoryFilters, ALL};
use crate::model::person::{OrgNode, Person};
use crate::model::request::{Request, RequestStatus, RequestType};
use crate::model::settings::Settings;
use crate::model::user::User;
use log::warn;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashSet;

/// Exact-match request filter; `None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestFilter {
    pub kind: Option<RequestType>,
    pub status: Option<RequestStatus>,
    pub dept: Option<String>,
}

impl RequestFilter {
    pub fn matches(&self, request: &Request) -> bool {
        self.kind.map_or(true, |kind| request.kind == kind)
            && self.status.map_or(true, |status| request.status == status)
            && self
                .dept
                .as_deref()
                .map_or(true, |dept| request.dept == dept)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApprovalFilter {
    pub status: Option<ApprovalStatus>,
}

impl ApprovalFilter {
    pub fn with_status(status: ApprovalStatus) -> Self {
        Self {
            status: Some(status),
        }
    }
}

impl StateStore {
    pub fn user(&self) -> Option<User> {
        self.get_as("user")
    }

    pub fn requests(&self, filter: &RequestFilter) -> Vec<Request> {
        self.collection::<Request>("requests")
            .into_iter()
            .filter(|request| filter.matches(request))
            .collect()
    }

    pub fn request(&self, id: &str) -> Option<Request> {
        self.collection::<Request>("requests")
            .into_iter()
            .find(|request| request.id == id)
    }

    pub fn approvals(&self, filter: &ApprovalFilter) -> Vec<Approval> {
        self.collection::<Approval>("approvals")
            .into_iter()
            .filter(|approval| filter.status.map_or(true, |status| approval.status == status))
            .collect()
    }

    pub fn approval(&self, id: &str) -> Option<Approval> {
        self.collection::<Approval>("approvals")
            .into_iter()
            .find(|approval| approval.id == id)
    }

    pub fn people(&self) -> Vec<Person> {
        self.collection("people")
    }

    pub fn person(&self, id: &str) -> Option<Person> {
        self.people().into_iter().find(|person| person.id == id)
    }

    /// People in `dept`; `None` or `"All"` returns everyone.
    pub fn people_by_dept(&self, dept: Option<&str>) -> Vec<Person> {
        let people = self.people();
        match dept {
            None | Some(ALL) | Some("") => people,
            Some(dept) => people.into_iter().filter(|p| p.dept == dept).collect(),
        }
    }

    pub fn direct_reports(&self, id: &str) -> Vec<Person> {
        self.people()
            .into_iter()
            .filter(|person| person.supervisor_id.as_deref() == Some(id))
            .collect()
    }

    /// Supervisors of `id`, top of the hierarchy first.
    ///
    /// Stops at the first missing supervisor or repeated id.
    pub fn supervisor_chain(&self, id: &str) -> Vec<Person> {
        let people = self.people();
        let find = |id: &str| people.iter().find(|person| person.id == id);

        let mut chain = Vec::new();
        let Some(mut current) = find(id) else {
            return chain;
        };
        let mut seen = HashSet::from([current.id.as_str()]);
        while let Some(supervisor_id) = current.supervisor_id.as_deref() {
            if !seen.insert(supervisor_id) {
                warn!("event=supervisor_chain module=state status=cycle person_id={id}");
                break;
            }
            let Some(supervisor) = find(supervisor_id) else {
                break;
            };
            chain.push(supervisor.clone());
            current = supervisor;
        }
        chain.reverse();
        chain
    }

    /// Merges `person` into the entry with the same id, or appends it.
    pub fn upsert_person(&mut self, person: &Person) -> StateResult<()> {
        let value = serde_json::to_value(person)?;
        let id = person.id.clone();
        let merged = self.update_item("people", |item| item["id"] == id.as_str(), value.clone())?;
        if !merged {
            self.push("people", value)?;
        }
        Ok(())
    }

    pub fn remove_person(&mut self, id: &str) -> StateResult<bool> {
        let removed = self.remove_item("people", |item| item["id"] == id)?;
        Ok(removed.is_some())
    }

    /// Current settings; missing or malformed settings read as defaults.
    pub fn settings(&self) -> Settings {
        self.get_as("settings").unwrap_or_default()
    }

    pub fn org_root(&self) -> Option<OrgNode> {
        self.get_as("org.root")
    }

    pub fn flash(&self) -> Option<String> {
        self.get_as::<Option<String>>("app.flash").flatten()
    }

    /// Returns the pending flash message and clears it.
    pub fn take_flash(&mut self) -> StateResult<Option<String>> {
        let flash = self.flash();
        if flash.is_some() {
            self.set("app.flash", Value::Null)?;
        }
        Ok(flash)
    }

    pub fn last_route(&self) -> Option<String> {
        self.side_value(LAST_ROUTE_KEY)
            .filter(|route| !route.trim().is_empty())
    }

    pub fn set_last_route(&self, route: &str) -> StateResult<()> {
        self.set_side_value(LAST_ROUTE_KEY, route)
    }

    /// Saved directory filters; `None` when absent or unreadable.
    pub fn directory_filters(&self) -> Option<DirectoryFilters> {
        let raw = self.side_value(DIRECTORY_FILTERS_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(filters) => Some(filters),
            Err(err) => {
                warn!("event=directory_filters_load module=state status=error error={err}");
                None
            }
        }
    }

    pub fn save_directory_filters(&self, filters: &DirectoryFilters) -> StateResult<()> {
        let raw = serde_json::to_string(filters)?;
        self.set_side_value(DIRECTORY_FILTERS_KEY, &raw)
    }

    fn collection<T: DeserializeOwned>(&self, path: &str) -> Vec<T> {
        let Some(Value::Array(items)) = super::path::lookup(self.document(), path) else {
            return Vec::new();
        };
        items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| match T::deserialize(item) {
                Ok(parsed) => Some(parsed),
                Err(err) => {
                    warn!(
                        "event=state_read module=state status=skipped path={path} index={index} error={err}"
                    );
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::RequestFilter;
    use crate::model::request::RequestType;
    use crate::state::{StateStore, STATE_KEY};
    use crate::storage::MemoryStorage;
    use serde_json::json;

    fn store(doc: serde_json::Value) -> StateStore {
        StateStore::open(Box::new(MemoryStorage::with_items([(
            STATE_KEY,
            doc.to_string(),
        )])))
    }

    #[test]
    fn malformed_records_are_skipped() {
        let store = store(json!({"requests": [
            {"id": "r1", "type": "Change", "title": "ok", "status": "Draft"},
            {"id": "r2", "title": "missing type and status"}
        ]}));
        let requests = store.requests(&RequestFilter::default());
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].kind, RequestType::Change);
    }

    #[test]
    fn supervisor_chain_stops_on_cycle() {
        let store = store(json!({"people": [
            {"id": "a", "name": "A", "supervisorId": "b"},
            {"id": "b", "name": "B", "supervisorId": "c"},
            {"id": "c", "name": "C", "supervisorId": "a"}
        ]}));
        let chain: Vec<String> = store
            .supervisor_chain("a")
            .into_iter()
            .map(|person| person.id)
            .collect();
        assert_eq!(chain, vec!["c".to_string(), "b".to_string()]);
    }

    #[test]
    fn take_flash_clears_message() {
        let mut store = store(json!({"app": {"flash": "Saved."}}));
        assert_eq!(
            store.take_flash().expect("flash should clear").as_deref(),
            Some("Saved.")
        );
        assert_eq!(store.flash(), None);
        assert_eq!(store.take_flash().expect("second take"), None);
    }
}
