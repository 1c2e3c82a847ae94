//! Text rendering of the result and detail tables.

use colored::Colorize;
use prettytable::{Cell, Row, Table};

use crate::api::{Actor, AggregationGroup, Event, EventType, GroupBy};
use crate::app::AppState;
use crate::query::{group_actor_options, group_type_options};

/// Page sizes offered for the result tables.
pub const PAGE_SIZES: [usize; 4] = [5, 10, 25, 50];
pub const DEFAULT_PAGE_SIZE: usize = 25;

const TITLE_WIDTH: usize = 60;
const SOURCE_WIDTH: usize = 60;

fn header(labels: &[&str]) -> Row {
    Row::new(labels.iter().map(|label| Cell::new(label).style_spec("b")).collect())
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let cut: String = text.chars().take(width.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

fn score(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "-".to_string())
}

/// Group table keyed by `Group_ID`: Count, Country, Region, City.
pub fn group_table(groups: &[AggregationGroup], limit: usize) -> Table {
    let mut table = Table::new();
    table.set_titles(header(&["ID", "Count", "Country", "Region", "City"]));
    for group in groups.iter().take(limit) {
        table.add_row(Row::new(vec![
            Cell::new(&group.group_id.to_string()),
            Cell::new(&group.count.to_string()).style_spec("r"),
            Cell::new(&group.country),
            Cell::new(&group.region),
            Cell::new(&group.city),
        ]));
    }
    table
}

/// Event detail table: Location Name, Title, Source, Goldstein Scale,
/// Average Tone, Date.
pub fn event_table(events: &[Event], limit: usize) -> Table {
    let mut table = Table::new();
    table.set_titles(header(&[
        "ID",
        "Location Name",
        "Title",
        "Source",
        "Goldstein Scale",
        "Average Tone",
        "Date",
    ]));
    for event in events.iter().take(limit) {
        table.add_row(Row::new(vec![
            Cell::new(&event.id),
            Cell::new(&event.location_name),
            Cell::new(&truncate(&event.title, TITLE_WIDTH)),
            Cell::new(&truncate(&event.source, SOURCE_WIDTH)),
            Cell::new(&score(event.goldstein_scale)).style_spec("r"),
            Cell::new(&score(event.avg_tone)).style_spec("r"),
            Cell::new(&event.date),
        ]));
    }
    table
}

pub fn actor_catalog_table(actors: &[Actor]) -> Table {
    let mut table = Table::new();
    table.set_titles(header(&["Group", "Actor", "Type", "Count"]));
    for (initial, members) in group_actor_options(actors) {
        for (i, actor) in members.iter().enumerate() {
            let label = if i == 0 { initial.as_str() } else { "" };
            table.add_row(Row::new(vec![
                Cell::new(label).style_spec("b"),
                Cell::new(&actor.name),
                Cell::new(actor.category.as_deref().unwrap_or("")),
                Cell::new(&actor.count.to_string()).style_spec("r"),
            ]));
        }
    }
    table
}

pub fn type_catalog_table(types: &[EventType]) -> Table {
    let mut table = Table::new();
    table.set_titles(header(&["Category", "Code", "Type", "Count"]));
    for (category, members) in group_type_options(types) {
        for (i, event_type) in members.iter().enumerate() {
            let label = if i == 0 { category.as_str() } else { "" };
            table.add_row(Row::new(vec![
                Cell::new(label).style_spec("b"),
                Cell::new(&event_type.code),
                Cell::new(&event_type.name),
                Cell::new(&event_type.count.to_string()).style_spec("r"),
            ]));
        }
    }
    table
}

fn tab_bar(selected: GroupBy) -> String {
    GroupBy::ALL
        .iter()
        .map(|tab| {
            let label = tab.to_string();
            if *tab == selected {
                format!("[{}]", label).bright_blue().bold().to_string()
            } else {
                format!(" {} ", label).dimmed().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Renders the tab bar and the group table of the selected tab.
pub fn render_results(state: &AppState, limit: usize) -> String {
    let mut out = format!("{}\n", tab_bar(state.tab));

    if state.loading {
        out.push_str(&format!("{}\n", "Loading…".yellow()));
    }
    if let Some(ref err) = state.aggregation_error {
        out.push_str(&format!("{} {}\n", "Error:".bright_red(), err));
    }

    let groups = state.visible_groups();
    if groups.is_empty() {
        if !state.loading {
            out.push_str(&format!("{}\n", "No results".dimmed()));
        }
        return out;
    }

    out.push_str(&group_table(groups, limit).to_string());
    out.push_str(&format!(
        "{}\n",
        format!("Showing {} of {} groups", groups.len().min(limit), groups.len()).dimmed()
    ));
    out
}

/// Renders the event detail view, or an empty string while it is closed.
pub fn render_detail(state: &AppState, limit: usize) -> String {
    if !state.modal_open {
        return String::new();
    }

    let mut out = String::new();
    let title = match state.selected_group {
        Some(id) => format!("Events of group {}", id),
        None => "Events".to_string(),
    };
    out.push_str(&format!("{}\n", "═".repeat(80).bright_blue()));
    out.push_str(&format!("{}\n", title.bright_blue().bold()));
    out.push_str(&format!("{}\n", "═".repeat(80).bright_blue()));

    if state.loading_events {
        out.push_str(&format!("{}\n", "Loading…".yellow()));
        return out;
    }
    if let Some(ref err) = state.events_error {
        out.push_str(&format!("{} {}\n", "Error:".bright_red(), err));
        return out;
    }
    if state.events.is_empty() {
        out.push_str(&format!("{}\n", "No events".dimmed()));
        return out;
    }

    out.push_str(&event_table(&state.events, limit).to_string());
    out
}
