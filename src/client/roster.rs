use crate::{
    config::{RosterOrigin, RosterSettings},
    core::leaderboard::{Participant, UNKNOWN_PARTICIPANT},
    error::{BoardError, BoardResult},
};
use futures::future::BoxFuture;
use reqwest::Client;
use serde_json::Value;
use std::{path::PathBuf, sync::Arc};
use tracing::{info, warn};

/// Source of the participants list.
pub trait RosterSource: Send + Sync {
    fn load(&self) -> BoxFuture<'_, BoardResult<Vec<Participant>>>;
}

/// Column headers of the roster rows.
#[derive(Debug, Clone)]
pub struct RosterColumns {
    pub name: String,
    pub url: String,
}

/// Roster read from a JSON file on disk.
pub struct FileRoster {
    path: PathBuf,
    columns: RosterColumns,
}

/// Roster served as JSON by an HTTP endpoint, e.g. a published sheet.
pub struct HttpRoster {
    http_client: Client,
    url: String,
    columns: RosterColumns,
}

/// Fixed list of participants.
pub struct StaticRoster(Vec<Participant>);

/// Build the roster source described by the settings, if any.
pub fn from_settings(settings: &RosterSettings) -> BoardResult<Option<Arc<dyn RosterSource>>> {
    let columns = RosterColumns {
        name: settings.name_column.clone(),
        url: settings.url_column.clone(),
    };
    let source: Option<Arc<dyn RosterSource>> = match &settings.origin {
        Some(RosterOrigin::File(path)) => Some(Arc::new(FileRoster::new(path.clone(), columns))),
        Some(RosterOrigin::Http(url)) => Some(Arc::new(HttpRoster::new(
            url.clone(),
            settings.timeout,
            columns,
        )?)),
        None => None,
    };
    Ok(source)
}

impl FileRoster {
    pub fn new(path: PathBuf, columns: RosterColumns) -> Self {
        Self { path, columns }
    }
}

impl RosterSource for FileRoster {
    fn load(&self) -> BoxFuture<'_, BoardResult<Vec<Participant>>> {
        Box::pin(async move {
            info!("Loading roster from file {}", self.path.display());
            let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
                BoardError::RosterUnavailable(format!(
                    "Could not read {}. {e}",
                    self.path.display()
                ))
            })?;
            parse_roster(&content, &self.columns)
        })
    }
}

impl HttpRoster {
    pub fn new(
        url: String,
        timeout: std::time::Duration,
        columns: RosterColumns,
    ) -> BoardResult<Self> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            url,
            columns,
        })
    }
}

impl RosterSource for HttpRoster {
    fn load(&self) -> BoxFuture<'_, BoardResult<Vec<Participant>>> {
        Box::pin(async move {
            info!("Loading roster from {}", self.url);
            let response = self
                .http_client
                .get(&self.url)
                .send()
                .await
                .map_err(|e| BoardError::RosterUnavailable(e.to_string()))?;

            let content = match response.status() {
                status if status.is_success() => response
                    .text()
                    .await
                    .map_err(|e| BoardError::RosterUnavailable(e.to_string()))?,
                status => {
                    return Err(BoardError::RosterUnavailable(format!(
                        "Roster endpoint answered {status}"
                    )))
                }
            };
            parse_roster(&content, &self.columns)
        })
    }
}

impl StaticRoster {
    pub fn new(participants: Vec<Participant>) -> Self {
        StaticRoster(participants)
    }
}

impl RosterSource for StaticRoster {
    fn load(&self) -> BoxFuture<'_, BoardResult<Vec<Participant>>> {
        let participants = self.0.clone();
        Box::pin(async move {
            match participants.is_empty() {
                true => Err(BoardError::RosterUnavailable("No rows found in the roster".into())),
                false => Ok(participants),
            }
        })
    }
}

/// Parse a JSON array of rows keyed by column header. Rows missing a name or a URL,
/// or rows that are not objects at all, are kept with placeholder values; an empty
/// roster is an error.
pub fn parse_roster(content: &str, columns: &RosterColumns) -> BoardResult<Vec<Participant>> {
    let rows: Vec<Value> = serde_json::from_str(content)
        .map_err(|e| BoardError::RosterUnavailable(format!("Malformed roster. {e}")))?;

    if rows.is_empty() {
        return Err(BoardError::RosterUnavailable(
            "No rows found in the roster".into(),
        ));
    }

    let participants = rows
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            let name = cell(row, &columns.name);
            let url = cell(row, &columns.url);
            if name.is_none() || url.is_none() {
                warn!("Roster row {} is missing required fields: {:?}", idx + 1, row);
            }
            Participant::new(
                name.unwrap_or_else(|| UNKNOWN_PARTICIPANT.to_string()),
                url.unwrap_or_default(),
            )
        })
        .collect::<Vec<Participant>>();

    info!("Extracted {} participants", participants.len());
    Ok(participants)
}

// Non-blank cell value. Numbers are accepted as text, non-object rows have no cells.
fn cell(row: &Value, column: &str) -> Option<String> {
    let value = match row.get(column)? {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    };
    value.filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> RosterColumns {
        RosterColumns {
            name: "User Name".into(),
            url: "Google Cloud Skills Boost Profile URL".into(),
        }
    }

    #[test]
    fn rows_are_read_in_order() {
        let content = r#"[
            {"User Name": "Asha", "Google Cloud Skills Boost Profile URL": "https://p/asha", "Email": "a@x"},
            {"User Name": "Ben", "Google Cloud Skills Boost Profile URL": "https://p/ben"}
        ]"#;
        let participants = parse_roster(content, &columns()).unwrap();
        assert_eq!(
            participants,
            vec![
                Participant::new("Asha", "https://p/asha"),
                Participant::new("Ben", "https://p/ben"),
            ]
        );
    }

    #[test]
    fn malformed_rows_are_kept_with_placeholders() {
        let content = r#"[
            {"Google Cloud Skills Boost Profile URL": "https://p/anon"},
            {"User Name": "  ", "Google Cloud Skills Boost Profile URL": null},
            {"User Name": "Chen"}
        ]"#;
        let participants = parse_roster(content, &columns()).unwrap();
        assert_eq!(
            participants,
            vec![
                Participant::new("Unknown", "https://p/anon"),
                Participant::new("Unknown", ""),
                Participant::new("Chen", ""),
            ]
        );
    }

    #[test]
    fn rows_that_are_not_objects_become_unknown_participants() {
        let content = r#"[
            {"User Name": "Asha", "Google Cloud Skills Boost Profile URL": "https://p/asha"},
            null,
            "x",
            ["Ben", "https://p/ben"]
        ]"#;
        let participants = parse_roster(content, &columns()).unwrap();
        assert_eq!(
            participants,
            vec![
                Participant::new("Asha", "https://p/asha"),
                Participant::new("Unknown", ""),
                Participant::new("Unknown", ""),
                Participant::new("Unknown", ""),
            ]
        );
    }

    #[test]
    fn empty_roster_is_unavailable() {
        let err = parse_roster("[]", &columns()).unwrap_err();
        assert!(matches!(err, BoardError::RosterUnavailable(_)));
    }

    #[test]
    fn non_array_roster_is_unavailable() {
        let err = parse_roster(r#"{"rows": []}"#, &columns()).unwrap_err();
        assert!(matches!(err, BoardError::RosterUnavailable(_)));
    }

    #[tokio::test]
    async fn missing_file_is_unavailable() {
        let roster = FileRoster::new(PathBuf::from("/nonexistent/roster.json"), columns());
        let err = roster.load().await.unwrap_err();
        assert!(matches!(err, BoardError::RosterUnavailable(_)));
    }

    #[tokio::test]
    async fn empty_static_roster_is_unavailable() {
        let err = StaticRoster::new(vec![]).load().await.unwrap_err();
        assert!(matches!(err, BoardError::RosterUnavailable(_)));
    }
}
