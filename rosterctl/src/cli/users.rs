use std::io::Write;

use anyhow::{Context, Result, bail};
use roster_core::Dashboard;
use roster_model::{
    DateRange, RoleFilter, SortConfig, SortDirection, UserDraft, UserFilters,
    UserId, UserQuery,
};
use tracing::warn;

use super::render;
use super::{ListUsersArgs, UsersAction};

pub fn run(
    dashboard: &mut Dashboard,
    action: UsersAction,
    out: &mut dyn Write,
) -> Result<()> {
    match action {
        UsersAction::List(args) => list(dashboard, args, out),
        UsersAction::Add {
            name,
            email,
            role,
            status,
        } => {
            let draft = UserDraft::new(name, email, role, status);
            warn_unknown_role(dashboard, &draft.role);
            let user = dashboard
                .create_user(draft)
                .context("failed to save users")?;
            writeln!(out, "Added user {} ({})", user.id, user.name)?;
            Ok(())
        }
        UsersAction::Edit {
            id,
            name,
            email,
            role,
            status,
        } => {
            let id = UserId(id);
            let Some(current) = dashboard.find_user(id) else {
                bail!("no user with id {id}");
            };
            let mut draft = current.to_draft();
            if let Some(name) = name {
                draft.name = name;
            }
            if let Some(email) = email {
                draft.email = email;
            }
            if let Some(role) = role {
                warn_unknown_role(dashboard, &role);
                draft.role = role;
            }
            if let Some(status) = status {
                draft.status = status;
            }
            dashboard
                .update_user(id, draft)
                .context("failed to save users")?;
            writeln!(out, "Updated user {id}")?;
            Ok(())
        }
        UsersAction::Rm { id } => {
            let id = UserId(id);
            match dashboard
                .delete_user(id)
                .context("failed to save users")?
            {
                Some(user) => {
                    writeln!(out, "Deleted user {id} ({})", user.name)?;
                    Ok(())
                }
                None => bail!("no user with id {id}"),
            }
        }
    }
}

pub fn query_from_args(args: &ListUsersArgs) -> UserQuery {
    let direction = if args.desc {
        SortDirection::Descending
    } else {
        SortDirection::Ascending
    };
    UserQuery {
        filters: UserFilters {
            status: args.status,
            role: args
                .role
                .clone()
                .map(RoleFilter::Named)
                .unwrap_or_default(),
            date_range: if args.recent {
                DateRange::Recent
            } else {
                DateRange::All
            },
        },
        search: args.search.clone().unwrap_or_default(),
        sort: SortConfig::new(args.sort, direction),
    }
}

fn list(
    dashboard: &mut Dashboard,
    args: ListUsersArgs,
    out: &mut dyn Write,
) -> Result<()> {
    dashboard.set_query(query_from_args(&args));
    let total = dashboard.users().len();
    let visible = dashboard.visible_users();
    if args.json {
        render::write_json(out, visible)
    } else {
        render::write_users_table(out, visible, total)
    }
}

fn warn_unknown_role(dashboard: &Dashboard, role: &str) {
    if !role.is_empty() && !dashboard.role_names().contains(&role) {
        warn!(role, "role is not defined; storing the label anyway");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Command};
    use clap::Parser;
    use roster_core::{DashboardOptions, MemoryStorage};
    use roster_model::{StatusFilter, UserStatus};

    fn users_action(args: &[&str]) -> UsersAction {
        let argv = ["rosterctl", "users"].iter().chain(args).copied();
        match Cli::parse_from(argv).command {
            Command::Users { action } => action,
            other => panic!("unexpected command {other:?}"),
        }
    }

    fn exec(dashboard: &mut Dashboard, args: &[&str]) -> Result<String> {
        let mut buf = Vec::new();
        run(dashboard, users_action(args), &mut buf)?;
        Ok(String::from_utf8(buf).unwrap())
    }

    fn dashboard() -> Dashboard {
        Dashboard::load(MemoryStorage::new(), DashboardOptions::default())
    }

    #[test]
    fn list_args_build_the_query() {
        let UsersAction::List(args) =
            users_action(&["list", "--role", "admin", "--search", "jo"])
        else {
            panic!("expected list");
        };
        let query = query_from_args(&args);
        assert_eq!(query.filters.role, RoleFilter::Named("admin".into()));
        assert_eq!(query.filters.status, StatusFilter::All);
        assert_eq!(query.search, "jo");
        assert_eq!(query.sort, SortConfig::default());
    }

    #[test]
    fn edit_keeps_unspecified_fields() {
        let mut dash = dashboard();
        exec(&mut dash, &["edit", "2", "--status", "inactive"]).unwrap();
        let jane = dash.find_user(UserId(2)).unwrap();
        assert_eq!(jane.name, "Jane Smith");
        assert_eq!(jane.status, UserStatus::Inactive);
    }

    #[test]
    fn edit_and_rm_of_unknown_id_fail() {
        let mut dash = dashboard();
        assert!(exec(&mut dash, &["edit", "9", "--name", "x"]).is_err());
        let err = exec(&mut dash, &["rm", "9"]).unwrap_err();
        assert_eq!(err.to_string(), "no user with id 9");
        assert_eq!(dash.users().len(), 2);
    }

    #[test]
    fn json_list_uses_wire_names() {
        let mut dash = dashboard();
        let text =
            exec(&mut dash, &["list", "--json", "--sort", "id", "--desc"])
                .unwrap();
        let users: Vec<serde_json::Value> =
            serde_json::from_str(&text).unwrap();
        assert_eq!(users[0]["id"], 2);
        assert_eq!(users[0]["lastLogin"], "2024-03-21T00:00:00.000Z");
    }
}
