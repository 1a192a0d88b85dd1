//! Plain-text and JSON output of users and roles.

use std::io::Write;

use anyhow::Result;
use chrono::Local;
use roster_model::{Role, Timestamp, User};
use serde::Serialize;

/// Last-login column format, e.g. `Mar 20, 2024, 12:00:00 AM`.
pub const LAST_LOGIN_FORMAT: &str = "%b %d, %Y, %I:%M:%S %p";

/// Render `ts` in the local time zone.
pub fn format_last_login(ts: &Timestamp) -> String {
    ts.as_datetime()
        .with_timezone(&Local)
        .format(LAST_LOGIN_FORMAT)
        .to_string()
}

pub fn format_permissions(role: &Role) -> String {
    role.permissions
        .iter()
        .map(|p| p.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn write_json<T: Serialize + ?Sized>(
    out: &mut dyn Write,
    value: &T,
) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

/// `users` is the visible slice; `total` the size of the whole collection.
pub fn write_users_table(
    out: &mut dyn Write,
    users: &[User],
    total: usize,
) -> Result<()> {
    writeln!(out, "Users({total})")?;
    if users.is_empty() {
        writeln!(out, "No users match the current filters.")?;
        return Ok(());
    }

    let rows: Vec<[String; 6]> = users
        .iter()
        .map(|user| {
            [
                user.id.to_string(),
                user.name.clone(),
                user.email.clone(),
                user.role.clone(),
                user.status.to_string(),
                format_last_login(&user.last_login),
            ]
        })
        .collect();
    write_table(
        out,
        ["ID", "NAME", "EMAIL", "ROLE", "STATUS", "LAST LOGIN"],
        &rows,
    )
}

pub fn write_roles_table(out: &mut dyn Write, roles: &[Role]) -> Result<()> {
    writeln!(out, "Roles({})", roles.len())?;
    if roles.is_empty() {
        writeln!(out, "No roles defined.")?;
        return Ok(());
    }

    let rows: Vec<[String; 4]> = roles
        .iter()
        .map(|role| {
            [
                role.id.to_string(),
                role.name.clone(),
                format_permissions(role),
                role.description.clone(),
            ]
        })
        .collect();
    write_table(out, ["ID", "ROLE NAME", "PERMISSIONS", "DESCRIPTION"], &rows)
}

fn write_table<const N: usize>(
    out: &mut dyn Write,
    header: [&str; N],
    rows: &[[String; N]],
) -> Result<()> {
    let mut widths = header.map(|h| h.chars().count());
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    writeln!(out, "{}", format_row(header.iter().copied(), &widths))?;
    for row in rows {
        let cells = row.iter().map(String::as_str);
        writeln!(out, "{}", format_row(cells, &widths))?;
    }
    Ok(())
}

fn format_row<'a>(
    cells: impl Iterator<Item = &'a str>,
    widths: &[usize],
) -> String {
    let padded: Vec<String> = cells
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect();
    padded.join("  ").trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_core::seed::{seed_roles, seed_users};

    fn render<F>(f: F) -> String
    where
        F: FnOnce(&mut dyn Write) -> Result<()>,
    {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn users_table_aligns_columns() {
        let users = seed_users();
        let text = render(|out| write_users_table(out, &users, users.len()));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Users(2)");
        assert!(lines[1].starts_with("ID  NAME        EMAIL"));
        assert!(
            lines[2].starts_with("1   John Doe    john@example.com  admin")
        );
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn empty_view_says_so() {
        let text = render(|out| write_users_table(out, &[], 2));
        assert!(text.contains("No users match"));
    }

    #[test]
    fn roles_table_lists_permissions() {
        let text = render(|out| write_roles_table(out, &seed_roles()));
        assert!(text.contains("read, write, delete"));
        assert!(text.contains("Basic access"));
    }

    #[test]
    fn last_login_has_twelve_hour_clock() {
        let ts: Timestamp = "2024-03-20T15:04:05.000Z".parse().unwrap();
        let text = format_last_login(&ts);
        assert!(text.ends_with(" AM") || text.ends_with(" PM"), "{text}");
        assert_eq!(text.split(", ").count(), 3, "{text}");
    }
}
