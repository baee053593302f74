//! Adjudicator orchestration.
//!
//! Each conflict group goes to the oracle with the competing proposals'
//! explanations and changes, and comes back as one reconciled proposal. All
//! groups are adjudicated concurrently; results keep group order.

use futures::future::join_all;
use gridworld_types::ProposalResult;
use serde_json::json;
use tracing::warn;

use crate::conflict::ConflictGroup;
use crate::oracle::{ApiKey, CallSite, Oracle, OracleRequest};
use crate::parse::parse_payload;
use crate::view::WorldView;

/// Explanation used when a group could not be adjudicated.
pub const ADJUDICATION_FALLBACK: &str =
    "The contested actions cancelled each other out and nothing changed there";

/// Adjudicate every group, returning one proposal per group.
pub async fn adjudicate_groups<O: Oracle>(
    oracle: &O,
    credential: &ApiKey,
    view: &WorldView<'_>,
    proposals: &[ProposalResult],
    groups: &[ConflictGroup],
) -> Vec<ProposalResult> {
    join_all(
        groups
            .iter()
            .enumerate()
            .map(|(i, group)| adjudicate_group(oracle, credential, view, proposals, group, i)),
    )
    .await
}

async fn adjudicate_group<O: Oracle>(
    oracle: &O,
    credential: &ApiKey,
    view: &WorldView<'_>,
    proposals: &[ProposalResult],
    group: &ConflictGroup,
    index: usize,
) -> ProposalResult {
    let competing: Vec<&ProposalResult> = group
        .members
        .iter()
        .filter_map(|&i| proposals.get(i))
        .collect();
    let cells: Vec<String> = group
        .cells
        .iter()
        .map(|(r, c)| format!("({r},{c})"))
        .collect();
    let request = OracleRequest::new(
        CallSite::Adjudicate,
        json!({
            "worldDescription": view.world_description,
            "world": view.rendered,
            "cells": cells,
            "proposals": competing,
        }),
    );

    let raw = match oracle.request(credential, request).await {
        Ok(raw) => raw,
        Err(e) => {
            warn!(
                site = %CallSite::Adjudicate,
                group = index,
                error = %e,
                "oracle call failed, dropping contested changes"
            );
            return ProposalResult::empty(ADJUDICATION_FALLBACK);
        }
    };
    match parse_payload::<ProposalResult>(&raw) {
        Ok(resolved) => resolved,
        Err(e) => {
            warn!(
                site = %CallSite::Adjudicate,
                group = index,
                error = %e,
                raw_response = %raw,
                "unparsable adjudication, dropping contested changes"
            );
            ProposalResult::empty(ADJUDICATION_FALLBACK)
        }
    }
}
