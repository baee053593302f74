//! The Turn Resolution Engine.
//!
//! One pass runs the stages strictly in sequence, each consuming the whole
//! output of the one before:
//!
//! 1. **Collect** -- translate every narrated action and generate
//!    environmental actions, concurrently.
//! 2. **Group** -- bucket proposals by target cell into accepted proposals
//!    and conflict groups.
//! 3. **Adjudicate** -- one oracle call per conflict group, concurrently.
//!    Skipped when there are no groups.
//! 4. **Validate** -- simulate the merge and find duplicated or missing
//!    agents.
//! 5. **Resolve** -- one oracle call to repair agent conflicts. Skipped when
//!    the validator finds none.
//! 6. **Merge & Apply** -- flatten accepted, adjudicated and resolution
//!    changes in that order and apply them to a copy of the prior grid.
//! 7. **Summarize** -- narrate the turn from the surviving explanations.
//!
//! Oracle failures never escape a stage; each stage substitutes its
//! fallback and the pass always completes.

use gridworld_types::{ProposalResult, TurnState};
use tracing::{debug, info, warn};

use crate::adjudicate::adjudicate_groups;
use crate::collect::{AgentIntent, collect_proposals};
use crate::config::TurnConfig;
use crate::conflict::group_proposals;
use crate::merge::{MergePlan, merge_and_apply};
use crate::oracle::{ApiKey, Oracle};
use crate::resolve::resolve_agent_conflicts;
use crate::summary::summarize_turn;
use crate::validate::detect_agent_conflicts;
use crate::view::WorldView;

/// Counters from one engine pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionStats {
    /// Proposals collected.
    pub proposals: usize,
    /// Proposals accepted without adjudication.
    pub accepted: usize,
    /// Conflict groups adjudicated.
    pub conflict_groups: usize,
    /// Duplicated agents found by the validator.
    pub duplicated_agents: usize,
    /// Missing agents found by the validator.
    pub missing_agents: usize,
    /// Whether the resolver was consulted.
    pub resolution_ran: bool,
    /// Violations left after resolution, when re-validation is on.
    pub unresolved_agents: Option<usize>,
    /// Changes in the merged list.
    pub changes_applied: usize,
    /// Changes dropped as out of range.
    pub out_of_bounds_dropped: usize,
}

/// The engine's product: the next turn and how it was reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// The new history entry.
    pub turn_state: TurnState,
    /// Stage counters.
    pub stats: ResolutionStats,
}

/// Run one pass of the engine over `view` with the given intents.
pub async fn resolve_turn<O: Oracle>(
    oracle: &O,
    credential: &ApiKey,
    config: &TurnConfig,
    view: &WorldView<'_>,
    intents: &[AgentIntent],
) -> Resolution {
    let mut stats = ResolutionStats::default();

    // Stage 1: collect
    let proposals = collect_proposals(oracle, credential, view, intents).await;
    stats.proposals = proposals.len();

    // Stage 2: group
    let grouping = group_proposals(&proposals, config.grouping);
    stats.accepted = grouping.accepted.len();
    stats.conflict_groups = grouping.groups.len();
    info!(
        proposals = stats.proposals,
        accepted = stats.accepted,
        conflict_groups = stats.conflict_groups,
        "proposals grouped"
    );

    // Stage 3: adjudicate
    let adjudicated: Vec<ProposalResult> = if grouping.has_conflicts() {
        adjudicate_groups(oracle, credential, view, &proposals, &grouping.groups).await
    } else {
        Vec::new()
    };
    let accepted = grouping.accepted_proposals(&proposals);

    // Stage 4: validate
    let report = {
        let pending = MergePlan {
            accepted: accepted.clone(),
            adjudicated: &adjudicated,
            resolution: None,
        };
        detect_agent_conflicts(view.grid, &pending.pre_resolution_changes())
    };
    stats.duplicated_agents = report.duplicated_agents.len();
    stats.missing_agents = report.missing_agents.len();

    // Stage 5: resolve
    let resolution = resolve_agent_conflicts(oracle, credential, view, &report).await;
    stats.resolution_ran = resolution.is_some();

    let plan = MergePlan {
        accepted,
        adjudicated: &adjudicated,
        resolution: resolution.as_ref(),
    };

    if config.revalidate_after_resolution && stats.resolution_ran {
        let leftover = detect_agent_conflicts(view.grid, &plan.changes());
        if !leftover.is_clean() {
            warn!(
                duplicated = leftover.duplicated_agents.len(),
                missing = leftover.missing_agents.len(),
                "agent conflicts remain after resolution"
            );
        }
        stats.unresolved_agents = Some(leftover.violation_count());
    }

    // Stage 6: merge & apply
    let changes = plan.changes();
    stats.changes_applied = changes.len();
    let applied = merge_and_apply(view.grid, &plan);
    stats.out_of_bounds_dropped = applied.dropped;
    debug!(
        changes = stats.changes_applied,
        dropped = stats.out_of_bounds_dropped,
        "changes applied"
    );

    // Stage 7: summarize
    let description =
        summarize_turn(oracle, credential, view.world_description, &plan.explanations()).await;

    Resolution {
        turn_state: TurnState {
            world: applied.grid,
            description,
        },
        stats,
    }
}
