use std::io::Write;

use anyhow::{Context, Result, bail};
use roster_core::Dashboard;
use roster_model::{RoleDraft, RoleId};

use super::RolesAction;
use super::render;

pub fn run(
    dashboard: &mut Dashboard,
    action: RolesAction,
    out: &mut dyn Write,
) -> Result<()> {
    let mutates = !matches!(action, RolesAction::List { .. });

    match action {
        RolesAction::List { json } => {
            if json {
                render::write_json(out, dashboard.roles())?;
            } else {
                render::write_roles_table(out, dashboard.roles())?;
            }
        }
        RolesAction::Add {
            name,
            permissions,
            description,
        } => {
            let role = dashboard
                .create_role(RoleDraft::new(name, permissions, description))
                .context("failed to save roles")?;
            writeln!(out, "Added role {} ({})", role.id, role.name)?;
        }
        RolesAction::Edit {
            id,
            name,
            grant,
            revoke,
            description,
        } => {
            let id = RoleId(id);
            let Some(current) = dashboard.find_role(id) else {
                bail!("no role with id {id}");
            };
            let mut draft = current.to_draft();
            if let Some(name) = name {
                draft.name = name;
            }
            for permission in grant {
                draft.permissions.insert(permission);
            }
            for permission in revoke {
                draft.permissions.remove(permission);
            }
            if let Some(description) = description {
                draft.description = description;
            }
            dashboard
                .update_role(id, draft)
                .context("failed to save roles")?;
            writeln!(out, "Updated role {id}")?;
        }
        RolesAction::Rm { id } => {
            let id = RoleId(id);
            match dashboard
                .delete_role(id)
                .context("failed to save roles")?
            {
                Some(role) => {
                    writeln!(out, "Deleted role {id} ({})", role.name)?
                }
                None => bail!("no role with id {id}"),
            }
        }
    }

    if mutates && !dashboard.options().persist_roles {
        eprintln!(
            "note: role persistence is disabled; set persist_roles = true \
             (or ROSTER_PERSIST_ROLES=1) to keep role changes"
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Command};
    use clap::Parser;
    use roster_core::{DashboardOptions, MemoryStorage};
    use roster_model::Permission;

    fn exec(dashboard: &mut Dashboard, args: &[&str]) -> Result<String> {
        let argv = ["rosterctl", "roles"].iter().chain(args).copied();
        let Command::Roles { action } = Cli::parse_from(argv).command else {
            panic!("expected roles command");
        };
        let mut buf = Vec::new();
        run(dashboard, action, &mut buf)?;
        Ok(String::from_utf8(buf).unwrap())
    }

    fn persisted() -> Dashboard {
        let options = DashboardOptions {
            persist_roles: true,
            ..Default::default()
        };
        Dashboard::load(MemoryStorage::new(), options)
    }

    #[test]
    fn grant_and_revoke_adjust_permissions() {
        let mut dash = persisted();
        exec(&mut dash, &["edit", "2", "--grant", "write", "--revoke", "read"])
            .unwrap();
        let role = dash.find_role(RoleId(2)).unwrap();
        assert_eq!(role.permissions.as_slice(), &[Permission::Write]);
        assert_eq!(role.description, "Basic access");
    }

    #[test]
    fn add_then_list() {
        let mut dash = persisted();
        let added = exec(
            &mut dash,
            &["add", "--name", "auditor", "--permission", "read"],
        )
        .unwrap();
        assert_eq!(added.trim(), "Added role 3 (auditor)");
        let listing = exec(&mut dash, &["list"]).unwrap();
        assert!(listing.starts_with("Roles(3)"));
        assert!(listing.contains("auditor"));
    }

    #[test]
    fn rm_of_unknown_id_fails() {
        let mut dash = persisted();
        let err = exec(&mut dash, &["rm", "7"]).unwrap_err();
        assert_eq!(err.to_string(), "no role with id 7");
    }
}
