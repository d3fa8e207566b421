//! Jira Agile lookups used to describe the sprint of a sprint-status report.

use serde_json::Value;
use tracing::debug;

use crate::error::JiraReportError;
use crate::jira_client::JiraClient;
use crate::models::{BoardInfo, SprintInfo, SprintSelector};

/// Describe the sprint a selector points at.
///
/// Active sprints are looked up on the configured board, or on the project's
/// preferred board. Sprint ids are fetched directly. Names are used as-is.
///
/// # Errors
///
/// Returns `JiraReportError` if a lookup fails or finds nothing.
pub fn describe_sprint(
    client: &JiraClient,
    selector: &SprintSelector,
    project_key: &str,
    board_id: Option<u64>,
) -> Result<SprintInfo, JiraReportError> {
    match selector {
        SprintSelector::Active => {
            let board = resolve_board(client, project_key, board_id)?;
            active_sprint(client, board)
        }
        SprintSelector::Id(id) => sprint_by_id(client, *id),
        SprintSelector::Name(name) => Ok(SprintInfo {
            id: None,
            name: name.clone(),
            start_date: None,
            end_date: None,
            board: None,
        }),
    }
}

/// Find the board for a project, or load the configured one.
///
/// Without a configured id, scrum boards win over others, then name order.
///
/// # Errors
///
/// Returns `JiraReportError::Response` if the project has no board.
pub fn resolve_board(
    client: &JiraClient,
    project_key: &str,
    board_id: Option<u64>,
) -> Result<BoardInfo, JiraReportError> {
    if let Some(id) = board_id {
        let body = client.get_json(&format!("/rest/agile/1.0/board/{id}"), &[])?;
        return Ok(BoardInfo {
            id: body["id"].as_u64().unwrap_or(id),
            name: body["name"]
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| format!("Board {id}")),
        });
    }

    let body = client.get_json(
        "/rest/agile/1.0/board",
        &[("projectKeyOrId", project_key.to_string())],
    )?;
    let board = preferred_board(&body).ok_or_else(|| {
        JiraReportError::Response(format!("no boards found for project {project_key}"))
    })?;
    debug!(board_id = board.id, board = %board.name, "resolved board");
    Ok(board)
}

/// Active sprint on `board`.
///
/// # Errors
///
/// Returns `JiraReportError::Response` if the board has no active sprint.
pub fn active_sprint(client: &JiraClient, board: BoardInfo) -> Result<SprintInfo, JiraReportError> {
    let body = client.get_json(
        &format!("/rest/agile/1.0/board/{}/sprint", board.id),
        &[("state", "active".to_string())],
    )?;
    let sprint = body["values"]
        .as_array()
        .and_then(|values| values.first())
        .ok_or_else(|| {
            JiraReportError::Response(format!("no active sprint found on board {}", board.id))
        })?;
    let mut info = sprint_from_json(sprint, None);
    info.board = Some(board);
    Ok(info)
}

/// Sprint by numeric id.
///
/// # Errors
///
/// Returns `JiraReportError` if the sprint cannot be loaded.
pub fn sprint_by_id(client: &JiraClient, id: u64) -> Result<SprintInfo, JiraReportError> {
    let body = client.get_json(&format!("/rest/agile/1.0/sprint/{id}"), &[])?;
    Ok(sprint_from_json(&body, Some(id)))
}

fn preferred_board(body: &Value) -> Option<BoardInfo> {
    let mut boards: Vec<(bool, String, u64)> = body["values"]
        .as_array()?
        .iter()
        .filter_map(|board| {
            let id = board["id"].as_u64()?;
            let name = board["name"].as_str().unwrap_or_default().to_string();
            let not_scrum = board["type"].as_str() != Some("scrum");
            Some((not_scrum, name, id))
        })
        .collect();
    boards.sort();
    boards
        .into_iter()
        .next()
        .map(|(_, name, id)| BoardInfo { id, name })
}

fn sprint_from_json(sprint: &Value, fallback_id: Option<u64>) -> SprintInfo {
    let id = sprint["id"].as_u64().or(fallback_id);
    let name = sprint["name"]
        .as_str()
        .map(str::to_string)
        .or_else(|| id.map(|id| format!("Sprint {id}")))
        .unwrap_or_else(|| "Sprint".to_string());
    SprintInfo {
        id,
        name,
        start_date: sprint["startDate"].as_str().map(str::to_string),
        end_date: sprint["endDate"].as_str().map(str::to_string),
        board: None,
    }
}
