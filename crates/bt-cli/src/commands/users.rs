//! Users command for registering and listing users.

use std::io::Write;

use anyhow::{Result, bail};
use bt_core::{Role, UserId, UserSnapshot};
use bt_db::Database;
use uuid::Uuid;

/// Registers a new offline user and returns its ID.
pub fn add<W: Write>(
    writer: &mut W,
    db: &mut Database,
    name: &str,
    role: Role,
    id: Option<&str>,
) -> Result<UserId> {
    let name = name.trim();
    if name.is_empty() {
        bail!("name cannot be empty");
    }
    let id = match id {
        Some(id) => UserId::new(id)?,
        None => UserId::new(Uuid::new_v4().to_string())?,
    };

    let user = UserSnapshot::new(id.clone(), name, role);
    if !db.insert_user(&user)? {
        bail!("user already exists: {id}");
    }
    tracing::debug!(user = %id, %role, "user registered");

    writeln!(writer, "Added {role} {name} ({id})")?;
    Ok(id)
}

/// Lists users with their current status.
pub fn list<W: Write>(writer: &mut W, db: &Database, json: bool) -> Result<()> {
    let users = db.list_all_users()?;

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&users)?)?;
        return Ok(());
    }

    if users.is_empty() {
        writeln!(writer, "No users registered.")?;
        return Ok(());
    }

    let id_width = users
        .iter()
        .map(|u| u.id.as_str().len())
        .max()
        .unwrap_or(0)
        .max("ID".len());
    let name_width = users
        .iter()
        .map(|u| u.name.len())
        .max()
        .unwrap_or(0)
        .max("NAME".len());

    writeln!(
        writer,
        "{:<id_width$}  {:<name_width$}  {:<8}  STATUS",
        "ID", "NAME", "ROLE"
    )?;
    for user in &users {
        writeln!(
            writer,
            "{:<id_width$}  {:<name_width$}  {:<8}  {}",
            user.id.as_str(),
            user.name,
            user.role.as_str(),
            user.status
        )?;
    }
    Ok(())
}
