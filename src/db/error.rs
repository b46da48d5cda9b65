use crate::db::DatabaseError;
use rusqlite::ErrorCode;

/// Short, user-facing description of a failed store operation
pub fn format_storage_error(action: &str, error: &anyhow::Error) -> String {
    if let Some(db_error) = error.downcast_ref::<DatabaseError>() {
        return match db_error {
            DatabaseError::Sqlite(e) => format!("{} failed: {}", action, describe_sqlite(e)),
            other => format!("{} failed: {}", action, other),
        };
    }

    let sqlite = error
        .chain()
        .find_map(|cause| cause.downcast_ref::<rusqlite::Error>());
    match sqlite {
        Some(e) => format!("{} failed: {}", action, describe_sqlite(e)),
        None => format!("{} failed: {}", action, error),
    }
}

fn describe_sqlite(error: &rusqlite::Error) -> String {
    match error {
        rusqlite::Error::SqliteFailure(err, msg) => match err.code {
            ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked => {
                "database is locked by another process, try again in a moment".to_string()
            }
            ErrorCode::ReadOnly => "diagram store is read-only".to_string(),
            ErrorCode::ConstraintViolation => format!(
                "constraint violation ({})",
                msg.as_deref().unwrap_or("unknown constraint")
            ),
            ErrorCode::DiskFull => "disk is full".to_string(),
            _ => match msg {
                Some(msg) => format!("storage error: {}", msg),
                None => format!("storage error (code {})", err.extended_code),
            },
        },
        rusqlite::Error::FromSqlConversionFailure(_, _, cause) => {
            format!("stored diagram data is corrupt ({})", cause)
        }
        other => other.to_string(),
    }
}
