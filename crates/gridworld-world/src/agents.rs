//! Agent scans and agent re-derivation.
//!
//! The grid is the source of truth for which agents exist, where they are and
//! what they are doing. [`derive_agents`] projects it onto the cached
//! [`Agent`] list while keeping each surviving agent's history.

use std::collections::{BTreeMap, BTreeSet};

use gridworld_types::{Agent, Grid, Location, agent_name};

/// One tagged cell found during a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sighting<'a> {
    /// Name inside the brackets.
    pub name: &'a str,
    /// Full cell text.
    pub state: &'a str,
    /// Cell position.
    pub location: Location,
}

/// Every tagged cell in row-major order. A name may appear more than once.
pub fn scan_agents(grid: &Grid) -> Vec<Sighting<'_>> {
    grid.cells()
        .filter_map(|(location, cell)| {
            agent_name(cell).map(|name| Sighting {
                name,
                state: cell,
                location,
            })
        })
        .collect()
}

/// Every location each agent name occupies, in scan order.
pub fn agent_locations(grid: &Grid) -> BTreeMap<String, Vec<Location>> {
    let mut map: BTreeMap<String, Vec<Location>> = BTreeMap::new();
    for sighting in scan_agents(grid) {
        map.entry(sighting.name.to_owned())
            .or_default()
            .push(sighting.location);
    }
    map
}

/// Re-derive the agent list from `grid`.
///
/// - Agents whose name no longer appears are dropped.
/// - Surviving agents keep their position in the list, colour and history,
///   and take state and location from the first cell carrying their name.
/// - Names seen for the first time are appended in scan order with the
///   default colour and an empty history. A name seen in several cells
///   becomes one agent.
///
/// Calling this twice with the same grid yields the same list.
pub fn derive_agents(grid: &Grid, existing: &[Agent]) -> Vec<Agent> {
    let sightings = scan_agents(grid);

    let mut first_seen: BTreeMap<&str, Sighting<'_>> = BTreeMap::new();
    for sighting in &sightings {
        first_seen.entry(sighting.name).or_insert(*sighting);
    }

    let mut known: BTreeSet<&str> = BTreeSet::new();
    let mut agents: Vec<Agent> = Vec::with_capacity(first_seen.len());

    for agent in existing {
        let Some(sighting) = first_seen.get(agent.name.as_str()) else {
            continue;
        };
        if !known.insert(sighting.name) {
            continue;
        }
        let mut updated = agent.clone();
        sighting.state.clone_into(&mut updated.current_state);
        updated.location = sighting.location;
        agents.push(updated);
    }

    for sighting in &sightings {
        if known.insert(sighting.name) {
            agents.push(Agent::discovered(
                sighting.name,
                sighting.state,
                sighting.location,
            ));
        }
    }

    agents
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use gridworld_types::{DEFAULT_AGENT_COLOR, HistoryEntry};

    use super::*;

    fn grid(rows: &[&[&str]]) -> Grid {
        Grid::from_rows(
            rows.iter()
                .map(|r| r.iter().map(|c| (*c).to_owned()).collect())
                .collect(),
        )
    }

    #[test]
    fn scan_finds_all_sightings() {
        let g = grid(&[&["<Druid> hums", "tree"], &["", "<Druid> also"]]);
        let sightings = scan_agents(&g);
        assert_eq!(sightings.len(), 2);
        assert_eq!(sightings[1].location, Location::new(1, 1));
        let locs = agent_locations(&g);
        assert_eq!(
            locs["Druid"],
            vec![Location::new(0, 0), Location::new(1, 1)]
        );
    }

    #[test]
    fn new_agents_are_discovered_once() {
        let g = grid(&[&["<Knight> guards", "<Knight> echo"], &["<Fox>", ""]]);
        let agents = derive_agents(&g, &[]);
        assert_eq!(agents.len(), 2);
        assert_eq!(agents[0].name, "Knight");
        assert_eq!(agents[0].location, Location::new(0, 0));
        assert_eq!(agents[0].color, DEFAULT_AGENT_COLOR);
        assert_eq!(agents[1].name, "Fox");
    }

    #[test]
    fn existing_agents_keep_history_and_colour() {
        let g = grid(&[&["", "<Knight> moved"]]);
        let mut knight = Agent::discovered("Knight", "<Knight>", Location::new(0, 0));
        knight.color = "blue".to_owned();
        knight.private_history.push(HistoryEntry {
            action: "walk east".to_owned(),
            agent_state: "<Knight>".to_owned(),
            location: Location::new(0, 0),
        });
        let agents = derive_agents(&g, &[knight]);
        assert_eq!(agents.len(), 1);
        assert_eq!(agents[0].color, "blue");
        assert_eq!(agents[0].current_state, "<Knight> moved");
        assert_eq!(agents[0].location, Location::new(0, 1));
        assert_eq!(agents[0].private_history.len(), 1);
    }

    #[test]
    fn absent_agents_are_retired() {
        let g = grid(&[&["<Fox>"]]);
        let knight = Agent::discovered("Knight", "<Knight>", Location::new(0, 0));
        let agents = derive_agents(&g, &[knight]);
        assert_eq!(agents.len(), 1);
        assert_eq!(agents[0].name, "Fox");
    }

    #[test]
    fn existing_order_precedes_new() {
        let g = grid(&[&["<Fox>", "<Knight>"]]);
        let knight = Agent::discovered("Knight", "<Knight>", Location::new(0, 1));
        let agents = derive_agents(&g, &[knight]);
        let names: Vec<&str> = agents.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Knight", "Fox"]);
    }

    #[test]
    fn rederivation_is_idempotent() {
        let g = grid(&[
            &["<Knight> guards", "", "<Druid> hums"],
            &["oak", "<Druid> twin", "<Fox> sniffs"],
        ]);
        let once = derive_agents(&g, &[]);
        let twice = derive_agents(&g, &once);
        assert_eq!(once, twice);
    }
}
