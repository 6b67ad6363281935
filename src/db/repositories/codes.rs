use anyhow::Context;
use chrono::{SubsecRound, Utc};
use log::{debug, error, info, warn};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row, ToSql};

use crate::{
    db::{
        helpers::{format_datetime, parse_datetime},
        models::{CodeFilter, DeletedCode, StoredCode},
        Database,
    },
    error::{Error, Result},
    normalize::normalize,
    payload::IrPayload,
};

const CODE_COLUMNS: &str = "id, device, action, event_data, created_at";

fn row_to_code(row: &Row) -> anyhow::Result<StoredCode> {
    let event_data: String = row.get("event_data")?;
    let created_at: String = row.get("created_at")?;

    Ok(StoredCode {
        id: row.get("id")?,
        device: row.get("device")?,
        action: row.get("action")?,
        payload: IrPayload::parse_str(&event_data)?,
        created_at: parse_datetime(&created_at, "created_at")?,
    })
}

fn exists_in(conn: &Connection, device: &str, action: &str) -> anyhow::Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM ir_codes WHERE device = ?1 AND action = ?2",
        params![device, action],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn duplicate(device: &str, action: &str) -> anyhow::Error {
    anyhow::Error::new(Error::DuplicateKey(format!(
        "IR code for {device}.{action} already exists"
    )))
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err.sqlite_error_code(),
        Some(ErrorCode::ConstraintViolation)
    )
}

impl Database {
    /// Inserts a new code under a canonical key.
    ///
    /// Rejects the insert with [`Error::DuplicateKey`] when the pair is taken; existing
    /// rows are never overwritten.
    pub async fn create_code(
        &self,
        device: &str,
        action: &str,
        payload: &IrPayload,
    ) -> Result<StoredCode> {
        let device = device.to_string();
        let action = action.to_string();
        let payload = payload.clone();
        self.execute(move |conn| {
            if exists_in(conn, &device, &action)? {
                return Err(duplicate(&device, &action));
            }

            // Stored text keeps microseconds.
            let created_at = Utc::now().trunc_subsecs(6);
            let inserted = conn.execute(
                "INSERT INTO ir_codes (device, action, event_data, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    device,
                    action,
                    payload.to_json_string()?,
                    format_datetime(&created_at),
                ],
            );
            match inserted {
                Ok(_) => {}
                Err(err) if is_unique_violation(&err) => return Err(duplicate(&device, &action)),
                Err(err) => return Err(anyhow::Error::new(err).context("failed to insert IR code")),
            }

            debug!("IR code saved: {device}.{action}");
            Ok(StoredCode {
                id: conn.last_insert_rowid(),
                device,
                action,
                payload,
                created_at,
            })
        })
        .await
        .map_err(Error::from_storage)
    }

    /// Normalizes caller-supplied names and stores the code under the resulting key.
    ///
    /// Duplicate errors name both the raw and the canonical key so operators can tell
    /// which earlier entry collided.
    pub async fn create_named_code(
        &self,
        device_raw: &str,
        action_raw: &str,
        payload: &IrPayload,
    ) -> Result<StoredCode> {
        let device = normalize(device_raw);
        let action = normalize(action_raw);
        info!(
            "Normalized values - Original: '{device_raw}.{action_raw}' -> Normalized: '{device}.{action}'"
        );

        self.create_code(&device, &action, payload)
            .await
            .map_err(|err| match err {
                Error::DuplicateKey(_) => Error::DuplicateKey(format!(
                    "IR code for {device_raw}.{action_raw} (normalized: {device}.{action}) already exists"
                )),
                other => other,
            })
    }

    pub async fn code_exists(&self, device: &str, action: &str) -> Result<bool> {
        let device = device.to_string();
        let action = action.to_string();
        self.execute(move |conn| {
            let exists = exists_in(conn, &device, &action)?;
            debug!("IR code exists check for {device}.{action}: {exists}");
            Ok(exists)
        })
        .await
        .map_err(Error::from_storage)
    }

    /// Newest codes first, narrowed by the optional filters.
    ///
    /// Read failures are logged and yield an empty list.
    pub async fn list_codes(&self, filter: CodeFilter) -> Vec<StoredCode> {
        let result = self
            .execute(move |conn| {
                let mut clauses = Vec::new();
                let mut values: Vec<Box<dyn ToSql>> = Vec::new();

                if let Some(device) = filter.device.filter(|d| !d.is_empty()) {
                    clauses.push("device = ?");
                    values.push(Box::new(device));
                }
                if let Some(action) = filter.action.filter(|a| !a.is_empty()) {
                    clauses.push("action = ?");
                    values.push(Box::new(action));
                }

                let where_clause = if clauses.is_empty() {
                    String::new()
                } else {
                    format!("WHERE {}", clauses.join(" AND "))
                };
                values.push(Box::new(filter.limit));

                let query = format!(
                    "SELECT {CODE_COLUMNS} FROM ir_codes {where_clause}
                     ORDER BY created_at DESC, id DESC
                     LIMIT ?"
                );
                let params_refs: Vec<&dyn ToSql> = values.iter().map(|b| b.as_ref()).collect();

                let mut stmt = conn.prepare(&query)?;
                let mut rows = stmt.query(params_refs.as_slice())?;
                let mut codes = Vec::new();
                while let Some(row) = rows.next()? {
                    codes.push(row_to_code(row)?);
                }
                Ok(codes)
            })
            .await;

        match result {
            Ok(codes) => {
                debug!("Retrieved {} IR codes", codes.len());
                codes
            }
            Err(err) => {
                error!("Failed to retrieve IR codes: {err:#}");
                Vec::new()
            }
        }
    }

    /// Exact lookup by canonical key; `None` when nothing is stored under it.
    pub async fn get_code(&self, device: &str, action: &str) -> Result<Option<StoredCode>> {
        let device = device.to_string();
        let action = action.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CODE_COLUMNS} FROM ir_codes WHERE device = ?1 AND action = ?2"
            ))?;
            let mut rows = stmt.query(params![device, action])?;
            match rows.next()? {
                Some(row) => Ok(Some(
                    row_to_code(row).context("stored IR code is unreadable")?,
                )),
                None => Ok(None),
            }
        })
        .await
        .map_err(Error::from_storage)
    }

    /// Removes a row by id, returning its key, or `None` if the id does not exist.
    pub async fn delete_code(&self, id: i64) -> Result<Option<DeletedCode>> {
        self.execute(move |conn| {
            let deleted = conn
                .query_row(
                    "SELECT id, device, action FROM ir_codes WHERE id = ?1",
                    params![id],
                    |row| {
                        Ok(DeletedCode {
                            id: row.get(0)?,
                            device: row.get(1)?,
                            action: row.get(2)?,
                        })
                    },
                )
                .optional()?;
            let Some(deleted) = deleted else {
                warn!("No IR code found with ID {id}");
                return Ok(None);
            };

            conn.execute("DELETE FROM ir_codes WHERE id = ?1", params![id])
                .context("failed to delete IR code")?;
            debug!("IR code deleted successfully: ID {id}");
            Ok(Some(deleted))
        })
        .await
        .map_err(Error::from_storage)
    }
}
