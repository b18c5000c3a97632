//! Staff directory and org chart queries.
//!
//! # Responsibility
//! - Filter, sort and paginate the directory.
//! - Flatten the persisted org tree for display.
//! - Assemble person profiles (supervisor chain, direct reports).
//!
//! # Invariants
//! - Pages are 1-based and clamped to the available range.
//! - Missing start dates sort after every real date.

use crate::model::directory::{DirectoryFilters, ALL};
use crate::model::person::{OrgNode, Person};
use crate::state::StateStore;
use std::cmp::Ordering;
use std::collections::BTreeSet;

const MISSING_START_DATE: &str = "2100-01-01";
const DEFAULT_PAGE_SIZE: usize = 25;

/// One page of directory results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryResults {
    /// Matches across all pages.
    pub total: usize,
    pub page: usize,
    pub page_count: usize,
    pub items: Vec<Person>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrgEntry {
    pub depth: usize,
    pub person: Person,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonProfile {
    pub person: Person,
    /// Top of the hierarchy first.
    pub supervisor_chain: Vec<Person>,
    pub direct_reports: Vec<Person>,
}

pub struct PeopleService<'s> {
    store: &'s StateStore,
}

impl<'s> PeopleService<'s> {
    pub fn new(store: &'s StateStore) -> Self {
        Self { store }
    }

    pub fn search(&self, filters: &DirectoryFilters) -> DirectoryResults {
        let dept = (filters.dept != ALL).then_some(filters.dept.as_str());
        apply_filters(self.store.people_by_dept(dept), filters)
    }

    /// Sorted unique department names.
    pub fn departments(&self) -> Vec<String> {
        self.store
            .people()
            .into_iter()
            .map(|person| person.dept)
            .filter(|dept| !dept.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn profile(&self, id: &str) -> Option<PersonProfile> {
        let person = self.store.person(id)?;
        Some(PersonProfile {
            supervisor_chain: self.store.supervisor_chain(id),
            direct_reports: self.store.direct_reports(id),
            person,
        })
    }

    pub fn supervisor_name(&self, person: &Person) -> Option<String> {
        let supervisor_id = person.supervisor_id.as_deref()?;
        self.store.person(supervisor_id).map(|supervisor| supervisor.name)
    }

    /// Depth-first org chart, root at depth 0.
    pub fn org_chart(&self) -> Vec<OrgEntry> {
        match self.store.org_root() {
            Some(root) => flatten_org(&root, &self.store.people()),
            None => Vec::new(),
        }
    }
}

/// Applies type/status/search filters, sorts and slices one page.
///
/// The dept filter is applied by the caller's source list.
pub fn apply_filters(people: Vec<Person>, filters: &DirectoryFilters) -> DirectoryResults {
    let term = filters.search.trim().to_lowercase();
    let mut matches: Vec<Person> = people
        .into_iter()
        .filter(|person| {
            filters.employment_type == ALL || person.employment_type == filters.employment_type
        })
        .filter(|person| filters.status == ALL || person.status == filters.status)
        .filter(|person| term.is_empty() || search_haystack(person).contains(&term))
        .collect();

    let (key, descending) = filters.sort_parts();
    matches.sort_by(|left, right| {
        let ordering = compare_by(key, left, right);
        if descending {
            ordering.reverse()
        } else {
            ordering
        }
    });

    let page_size = if filters.page_size == 0 {
        DEFAULT_PAGE_SIZE
    } else {
        filters.page_size
    };
    let total = matches.len();
    let page_count = total.div_ceil(page_size).max(1);
    let page = filters.page.clamp(1, page_count);
    let items = matches
        .into_iter()
        .skip((page - 1) * page_size)
        .take(page_size)
        .collect();

    DirectoryResults {
        total,
        page,
        page_count,
        items,
    }
}

fn search_haystack(person: &Person) -> String {
    [
        person.name.as_str(),
        person.title.as_str(),
        person.email.as_str(),
        person.tags.join(" ").as_str(),
    ]
    .join(" ")
    .to_lowercase()
}

fn compare_by(key: &str, left: &Person, right: &Person) -> Ordering {
    match key {
        "title" => compare_text(&left.title, &right.title),
        "status" => compare_text(&left.status, &right.status),
        "startDate" | "seniority" => start_date(left).cmp(start_date(right)),
        _ => compare_text(&left.name, &right.name),
    }
}

fn compare_text(left: &str, right: &str) -> Ordering {
    left.to_lowercase()
        .cmp(&right.to_lowercase())
        .then_with(|| left.cmp(right))
}

fn start_date(person: &Person) -> &str {
    if person.start_date.is_empty() {
        MISSING_START_DATE
    } else {
        &person.start_date
    }
}

/// Flattens `root` depth-first. A node whose person is missing is skipped
/// together with its subtree.
pub fn flatten_org(root: &OrgNode, people: &[Person]) -> Vec<OrgEntry> {
    let mut entries = Vec::new();
    let mut stack = vec![(root, 0usize)];
    while let Some((node, depth)) = stack.pop() {
        let Some(person) = people.iter().find(|person| person.id == node.id) else {
            continue;
        };
        entries.push(OrgEntry {
            depth,
            person: person.clone(),
        });
        stack.extend(node.children.iter().rev().map(|child| (child, depth + 1)));
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::{apply_filters, flatten_org};
    use crate::model::directory::DirectoryFilters;
    use crate::model::person::{OrgNode, Person};

    fn person(id: &str, name: &str, kind: &str, start: &str) -> Person {
        Person {
            id: id.to_string(),
            name: name.to_string(),
            title: String::new(),
            email: format!("{id}@dept.edu"),
            phone: None,
            dept: "Physics".to_string(),
            employment_type: kind.to_string(),
            status: "Active".to_string(),
            start_date: start.to_string(),
            end_date: None,
            supervisor_id: None,
            tags: Vec::new(),
            location: None,
        }
    }

    fn names(people: &[Person]) -> Vec<&str> {
        people.iter().map(|person| person.name.as_str()).collect()
    }

    #[test]
    fn filters_sort_and_paginate() {
        let people = vec![
            person("1", "carol", "Staff", "2019-01-01"),
            person("2", "Alice", "Faculty", "2015-01-01"),
            person("3", "bob", "Staff", ""),
        ];
        let filters = DirectoryFilters {
            employment_type: "Staff".to_string(),
            ..DirectoryFilters::default()
        };
        let page = apply_filters(people.clone(), &filters);
        assert_eq!(page.total, 2);
        assert_eq!(names(&page.items), vec!["bob", "carol"]);

        let filters = DirectoryFilters {
            sort: "startDate-asc".to_string(),
            page_size: 2,
            page: 9,
            ..DirectoryFilters::default()
        };
        let page = apply_filters(people, &filters);
        assert_eq!((page.page, page.page_count), (2, 2));
        assert_eq!(names(&page.items), vec!["bob"]);
    }

    #[test]
    fn search_matches_email_and_tags_case_insensitively() {
        let mut tagged = person("1", "Dana", "Staff", "2020-01-01");
        tagged.tags = vec!["Lab-Safety".to_string()];
        let people = vec![tagged, person("2", "Eli", "Staff", "2020-01-01")];

        let filters = DirectoryFilters {
            search: "lab-safety".to_string(),
            ..DirectoryFilters::default()
        };
        assert_eq!(names(&apply_filters(people.clone(), &filters).items), vec!["Dana"]);

        let filters = DirectoryFilters {
            search: "2@DEPT".to_string(),
            ..DirectoryFilters::default()
        };
        assert_eq!(names(&apply_filters(people, &filters).items), vec!["Eli"]);
    }

    #[test]
    fn flatten_org_skips_missing_subtrees() {
        let root = OrgNode {
            id: "1".to_string(),
            children: vec![
                OrgNode {
                    id: "ghost".to_string(),
                    children: vec![OrgNode {
                        id: "2".to_string(),
                        children: Vec::new(),
                    }],
                },
                OrgNode {
                    id: "3".to_string(),
                    children: Vec::new(),
                },
            ],
        };
        let people = vec![
            person("1", "Root", "Faculty", ""),
            person("2", "Hidden", "Staff", ""),
            person("3", "Child", "Staff", ""),
        ];
        let entries = flatten_org(&root, &people);
        let flat: Vec<_> = entries
            .iter()
            .map(|entry| (entry.depth, entry.person.name.as_str()))
            .collect();
        assert_eq!(flat, vec![(0, "Root"), (1, "Child")]);
    }
}
