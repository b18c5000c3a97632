//! Staff directory and organization chart.

use super::{Mount, PageAction, PageModule, PageResult, Reaction};
use crate::env::{Debouncer, ListenerId};
use crate::model::directory::{DirectoryFilters, ALL, EMPLOYMENT_TYPES, PAGE_SIZES, PERSON_STATUSES};
use crate::service::people_service::{PeopleService, PersonProfile};
use crate::state::StateStore;
use crate::ui::{Block, Surface, Tone};
use log::debug;

const SORT_COLUMNS: &[(&str, &str)] = &[
    ("name", "Name"),
    ("title", "Title"),
    ("status", "Status"),
    ("startDate", "Start Date"),
];

fn select_field(surface: &mut Surface, name: &str, label: &str, options: &[String], value: &str) {
    surface.push(Block::Field {
        name: name.to_string(),
        label: format!("{label} [{}]", options.join("|")),
        value: value.to_string(),
        required: false,
    });
}

fn render_profile(surface: &mut Surface, profile: &PersonProfile) {
    let person = &profile.person;
    surface
        .heading(2, person.name.as_str())
        .detail("Title", person.title.as_str())
        .detail("Email", person.email.as_str())
        .detail("Phone", person.phone.clone().unwrap_or_else(|| "-".to_string()))
        .detail("Department", person.dept.as_str())
        .detail("Employment Type", person.employment_type.as_str())
        .detail("Status", person.status.as_str())
        .detail("Start Date", person.start_date.as_str())
        .detail(
            "Location",
            person.location.clone().unwrap_or_else(|| "-".to_string()),
        );
    if !profile.supervisor_chain.is_empty() {
        let chain: Vec<&str> = profile
            .supervisor_chain
            .iter()
            .map(|supervisor| supervisor.name.as_str())
            .collect();
        surface.detail("Reports To", chain.join(" > "));
    }
    if !profile.direct_reports.is_empty() {
        surface.heading(3, format!("Direct Reports ({})", profile.direct_reports.len()));
        for report in &profile.direct_reports {
            surface.text(format!("{} ({})", report.name, report.title));
        }
    }
    surface.button("Close", PageAction::Cancel);
}

/// Filterable, sortable, paginated staff list.
///
/// Filters persist across visits; the search box applies after a debounce.
#[derive(Debug, Default)]
pub struct DirectoryPage {
    filters: Option<DirectoryFilters>,
    draft_search: Option<String>,
    debouncer: Option<Debouncer>,
    selected: Option<String>,
    escape: Option<ListenerId>,
}

impl DirectoryPage {
    fn filters(&mut self, store: &StateStore) -> &mut DirectoryFilters {
        self.filters
            .get_or_insert_with(|| store.directory_filters().unwrap_or_default())
    }

    /// Applies `edit`, resets to the first page unless told otherwise, and
    /// persists the result.
    fn update_filters(
        &mut self,
        mount: &mut Mount<'_>,
        edit: impl FnOnce(&mut DirectoryFilters),
    ) -> PageResult<Reaction> {
        let filters = self.filters(mount.store);
        filters.page = 1;
        edit(filters);
        mount.store.save_directory_filters(filters)?;
        Ok(Reaction::Rerender)
    }

    fn close_profile(&mut self, mount: &mut Mount<'_>) {
        self.selected = None;
        if let Some(listener) = self.escape.take() {
            mount.scope.remove_key(listener);
        }
    }
}

impl PageModule for DirectoryPage {
    fn title(&self) -> Option<&'static str> {
        Some("Staff Directory")
    }

    fn render(&mut self, mount: &mut Mount<'_>) -> PageResult<()> {
        let filters = self.filters(mount.store).clone();
        let people = PeopleService::new(mount.store);
        let results = people.search(&filters);
        let mut departments = vec![ALL.to_string()];
        departments.extend(people.departments());
        let profile = self
            .selected
            .as_deref()
            .and_then(|id| people.profile(id));
        let supervisors: Vec<String> = results
            .items
            .iter()
            .map(|person| people.supervisor_name(person).unwrap_or_else(|| "-".to_string()))
            .collect();

        let surface = &mut *mount.container;
        surface.heading(1, "Staff Directory");
        surface.push(Block::Field {
            name: "search".to_string(),
            label: "Search".to_string(),
            value: self
                .draft_search
                .clone()
                .unwrap_or_else(|| filters.search.clone()),
            required: false,
        });
        let as_strings = |options: &[&str]| options.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        select_field(
            surface,
            "employmentType",
            "Employment Type",
            &as_strings(EMPLOYMENT_TYPES),
            &filters.employment_type,
        );
        select_field(
            surface,
            "status",
            "Status",
            &as_strings(PERSON_STATUSES),
            &filters.status,
        );
        select_field(surface, "dept", "Department", &departments, &filters.dept);
        select_field(
            surface,
            "pageSize",
            "Per Page",
            &PAGE_SIZES.iter().map(usize::to_string).collect::<Vec<_>>(),
            &filters.page_size.to_string(),
        );

        let (sort_key, descending) = filters.sort_parts();
        for (key, label) in SORT_COLUMNS {
            let marker = match (sort_key == *key, descending) {
                (true, false) => " ^",
                (true, true) => " v",
                (false, _) => "",
            };
            surface.button(
                format!("Sort by {label}{marker}"),
                PageAction::Sort(key.to_string()),
            );
        }
        surface.button("Clear Filters", PageAction::ClearFilters);

        if results.total == 0 {
            surface.notice(Tone::Neutral, "No people match your filters.");
        } else {
            let rows = results
                .items
                .iter()
                .zip(&supervisors)
                .map(|(person, supervisor)| {
                    vec![
                        person.name.clone(),
                        person.title.clone(),
                        person.dept.clone(),
                        person.employment_type.clone(),
                        person.status.clone(),
                        person.start_date.clone(),
                        supervisor.clone(),
                    ]
                })
                .collect();
            surface.table(
                &[
                    "Name",
                    "Title",
                    "Department",
                    "Type",
                    "Status",
                    "Start Date",
                    "Supervisor",
                ],
                rows,
            );
            for person in &results.items {
                surface.button(
                    format!("View {}", person.name),
                    PageAction::Select(person.id.clone()),
                );
            }
            surface.text(format!(
                "Page {} of {} ({} people)",
                results.page, results.page_count, results.total
            ));
            if results.page > 1 {
                surface.button("Previous", PageAction::Page(results.page - 1));
            }
            if results.page < results.page_count {
                surface.button("Next", PageAction::Page(results.page + 1));
            }
        }

        if let Some(profile) = &profile {
            render_profile(surface, profile);
        }
        Ok(())
    }

    fn handle(&mut self, action: PageAction, mount: &mut Mount<'_>) -> PageResult<Reaction> {
        match action {
            PageAction::Input { field, value } => match field.as_str() {
                "search" => {
                    self.draft_search = Some(value);
                    let delay = mount.config.search_debounce_ms;
                    self.debouncer
                        .get_or_insert_with(|| Debouncer::new(delay))
                        .trigger(mount.scope, PageAction::ApplySearch);
                    Ok(Reaction::None)
                }
                "employmentType" if EMPLOYMENT_TYPES.contains(&value.as_str()) => {
                    self.update_filters(mount, |filters| filters.employment_type = value)
                }
                "status" if PERSON_STATUSES.contains(&value.as_str()) => {
                    self.update_filters(mount, |filters| filters.status = value)
                }
                "dept" => {
                    let dept = if value.trim().is_empty() {
                        ALL.to_string()
                    } else {
                        value
                    };
                    self.update_filters(mount, |filters| filters.dept = dept)
                }
                "pageSize" => match value.trim().parse::<usize>() {
                    Ok(size) if PAGE_SIZES.contains(&size) => {
                        self.update_filters(mount, |filters| filters.page_size = size)
                    }
                    _ => Ok(Reaction::None),
                },
                _ => {
                    debug!("event=directory_input module=page status=ignored field={field}");
                    Ok(Reaction::None)
                }
            },
            PageAction::ApplySearch => {
                let Some(search) = self.draft_search.take() else {
                    return Ok(Reaction::None);
                };
                self.update_filters(mount, |filters| filters.search = search)
            }
            PageAction::Sort(key) => self.update_filters(mount, |filters| {
                let (current, descending) = filters.sort_parts();
                let direction = if current == key && !descending {
                    "desc"
                } else {
                    "asc"
                };
                filters.sort = format!("{key}-{direction}");
            }),
            PageAction::Page(page) => {
                let filters = self.filters(mount.store);
                filters.page = page.max(1);
                mount.store.save_directory_filters(filters)?;
                Ok(Reaction::Rerender)
            }
            PageAction::ClearFilters => {
                self.draft_search = None;
                if let Some(debouncer) = self.debouncer.as_mut() {
                    debouncer.cancel(mount.scope);
                }
                self.update_filters(mount, |filters| *filters = DirectoryFilters::default())
            }
            PageAction::Select(id) => {
                self.selected = Some(id);
                if self.escape.is_none() {
                    self.escape = Some(mount.scope.on_key("Escape", PageAction::Cancel));
                }
                Ok(Reaction::Rerender)
            }
            PageAction::Cancel => {
                if self.selected.is_none() {
                    return Ok(Reaction::None);
                }
                self.close_profile(mount);
                Ok(Reaction::Rerender)
            }
            PageAction::Navigate(route) => Ok(Reaction::Navigate(route)),
            _ => Ok(Reaction::None),
        }
    }

    fn cleanup(&mut self) {
        *self = Self::default();
    }
}

/// Indented reporting hierarchy from `org.root`.
#[derive(Debug, Default)]
pub struct OrgChartPage;

impl PageModule for OrgChartPage {
    fn title(&self) -> Option<&'static str> {
        Some("Organization Chart")
    }

    fn render(&mut self, mount: &mut Mount<'_>) -> PageResult<()> {
        let entries = PeopleService::new(mount.store).org_chart();
        let surface = &mut *mount.container;
        surface.heading(1, "Organization Chart");
        if entries.is_empty() {
            surface.notice(Tone::Neutral, "No organization data available.");
            return Ok(());
        }
        for entry in entries {
            surface.push(Block::TreeItem {
                depth: entry.depth,
                text: format!("{} - {}", entry.person.name, entry.person.title),
            });
        }
        Ok(())
    }

    fn handle(&mut self, action: PageAction, _mount: &mut Mount<'_>) -> PageResult<Reaction> {
        Ok(match action {
            PageAction::Navigate(route) => Reaction::Navigate(route),
            PageAction::Select(_) => Reaction::Navigate("/people/directory".to_string()),
            _ => Reaction::None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::DirectoryPage;
    use crate::model::directory::DirectoryFilters;

    #[test]
    fn default_page_has_no_loaded_filters() {
        let page = DirectoryPage::default();
        assert!(page.filters.is_none());
        assert_eq!(DirectoryFilters::default().page_size, 25);
    }
}
