//! `rolo user`: provision and list users.
//!
//! Users are the owners that company scoping is built from: a company
//! admin plus the agents it created.

use anyhow::Result;
use clap::{Args, Subcommand, ValueEnum};
use rolo_core::model::{Role, UserRecord};
use std::io::{self, Write};

use super::Context;
use crate::output::{render, render_mode};

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// Add a user.
    Add(UserAddArgs),
    /// List every user.
    List,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum RoleArg {
    CompanyAdmin,
    Agent,
    User,
}

impl From<RoleArg> for Role {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::CompanyAdmin => Self::CompanyAdmin,
            RoleArg::Agent => Self::Agent,
            RoleArg::User => Self::User,
        }
    }
}

#[derive(Args, Debug)]
pub struct UserAddArgs {
    /// User id.
    pub id: String,

    /// Display name used in duplicate attributions.
    #[arg(short, long)]
    pub name: String,

    #[arg(short, long, value_enum, default_value = "agent")]
    pub role: RoleArg,

    /// Company admin that provisioned this user. Required for agents.
    #[arg(long, value_name = "ADMIN_ID")]
    pub created_by: Option<String>,
}

pub fn run_user(command: &UserCommand, ctx: &Context) -> Result<()> {
    match command {
        UserCommand::Add(args) => run_add(args, ctx),
        UserCommand::List => run_list(ctx),
    }
}

fn run_add(args: &UserAddArgs, ctx: &Context) -> Result<()> {
    let role = Role::from(args.role);
    if role == Role::Agent && args.created_by.is_none() {
        return ctx.invalid("agents need --created-by <ADMIN_ID>");
    }
    let user = UserRecord {
        id: args.id.trim().to_string(),
        display_name: args.name.trim().to_string(),
        role,
        created_by: args.created_by.clone(),
    };
    if user.id.is_empty() {
        return ctx.invalid("user id must not be blank");
    }

    let store = ctx.open_store()?;
    store.insert_user(&user)?;
    render(ctx.output, &user, |u, w| {
        writeln!(w, "✓ added {} {} ({})", u.role, u.id, u.display_name)
    })
}

fn run_list(ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let users = store.users()?;
    render_mode(ctx.output, users.as_slice(), write_rows, write_rows)
}

fn write_rows(users: &[UserRecord], w: &mut dyn Write) -> io::Result<()> {
    for u in users {
        writeln!(
            w,
            "{}\t{}\t{}\t{}",
            u.id,
            u.role,
            u.created_by.as_deref().unwrap_or("-"),
            u.display_name
        )?;
    }
    Ok(())
}
