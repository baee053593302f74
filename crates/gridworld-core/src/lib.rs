//! Turn resolution engine and orchestration for the Gridworld simulation.
//!
//! This crate owns the seven-stage turn pipeline: Collect, Group,
//! Adjudicate, Validate, Resolve, Merge and Summarize. It talks to the
//! language model only through the [`Oracle`] trait, so every stage can be
//! driven by the [`ScriptedOracle`] in tests.
//!
//! # Modules
//!
//! - [`adjudicate`] -- One oracle call per conflict group.
//! - [`collect`] -- Per-agent translation and environmental proposals.
//! - [`config`] -- Configuration loading from `gridworld.yaml`.
//! - [`conflict`] -- Cell buckets and conflict grouping.
//! - [`engine`] -- The pipeline that turns intents into the next turn.
//! - [`merge`] -- Ordered change concatenation and application.
//! - [`narrate`] -- Agent narration and private history appends.
//! - [`oracle`] -- [`Oracle`] trait, call sites and credentials.
//! - [`parse`] -- Tolerant JSON extraction from oracle text.
//! - [`resolve`] -- Agent-conflict resolution.
//! - [`scenario`] -- New sessions from a user description.
//! - [`scripted`] -- [`ScriptedOracle`] for tests and offline runs.
//! - [`story`] -- Whole-session storytelling.
//! - [`summary`] -- Turn summaries.
//! - [`turn`] -- The full turn: narration, resolution and history.
//! - [`validate`] -- Duplicated and missing agent detection.
//! - [`view`] -- Read-only world context shared by the stages.
//!
//! [`Oracle`]: oracle::Oracle
//! [`ScriptedOracle`]: scripted::ScriptedOracle

pub mod adjudicate;
pub mod collect;
pub mod config;
pub mod conflict;
pub mod engine;
pub mod merge;
pub mod narrate;
pub mod oracle;
pub mod parse;
pub mod resolve;
pub mod scenario;
pub mod scripted;
pub mod story;
pub mod summary;
pub mod turn;
pub mod validate;
pub mod view;
