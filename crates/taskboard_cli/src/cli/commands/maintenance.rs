//! `check` and `repair` handlers.

use anyhow::{bail, Result};
use log::{info, warn};
use rusqlite::Connection;
use serde_json::json;
use taskboard_core::{ScopeHealth, ScopeTable, ALL_SCOPES, COLUMN_SCOPE, PROJECT_SCOPE, TASK_SCOPE};
use uuid::Uuid;

use crate::cli::print_json;
use crate::ScopeKind;

pub fn handle_check_command(conn: &Connection) -> Result<()> {
    let mut reports = Vec::new();
    let mut corrupted = 0usize;
    for table in ALL_SCOPES {
        for health in table.inspect_all(conn)? {
            if !health.is_healthy() {
                corrupted += 1;
            }
            reports.push(health_json(&health));
        }
    }
    info!(
        "event=scope_check module=cli status=done scopes={} corrupted={}",
        reports.len(),
        corrupted
    );
    print_json(&json!({
        "scopes": reports.len(),
        "corrupted": corrupted,
        "reports": reports,
    }))?;
    if corrupted > 0 {
        bail!("{corrupted} corrupted scope(s) found; run `repair` on each");
    }
    Ok(())
}

pub fn handle_repair_command(kind: ScopeKind, scope: Uuid, conn: &Connection) -> Result<()> {
    let table = scope_table(kind);
    let changes = table.compact(conn, scope)?;
    if !changes.is_empty() {
        warn!(
            "event=scope_repair module=cli status=ok table={} scope={} changed={}",
            table.table,
            scope,
            changes.len()
        );
    }
    print_json(&json!({
        "table": table.table,
        "scope": scope,
        "changes": changes,
    }))
}

fn scope_table(kind: ScopeKind) -> ScopeTable {
    match kind {
        ScopeKind::Projects => PROJECT_SCOPE,
        ScopeKind::Columns => COLUMN_SCOPE,
        ScopeKind::Tasks => TASK_SCOPE,
    }
}

fn health_json(health: &ScopeHealth) -> serde_json::Value {
    json!({
        "kind": health.kind,
        "scope": health.scope,
        "len": health.len,
        "corruption": health.corruption.as_ref().map(ToString::to_string),
    })
}
