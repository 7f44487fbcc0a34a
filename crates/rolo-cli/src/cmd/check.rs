//! `rolo check`: duplicate pre-flight without writing anything.

use anyhow::Result;
use clap::Args;
use rolo_core::dedup::Conflict;
use serde::Serialize;

use super::{Context, parse_phone};
use crate::output::render;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Email address to probe (repeatable).
    #[arg(short, long = "email")]
    pub emails: Vec<String>,

    /// Phone to probe (repeatable).
    #[arg(short, long = "phone")]
    pub phones: Vec<String>,

    /// Ignore hits on this record (the one being edited).
    #[arg(long, value_name = "ID")]
    pub exclude: Option<String>,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    duplicate: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    conflict: Option<Conflict>,
}

pub fn run_check(args: &CheckArgs, ctx: &Context) -> Result<()> {
    if args.emails.is_empty() && args.phones.is_empty() {
        return ctx.invalid("pass at least one --email or --phone");
    }
    let actor = ctx.actor()?;
    let exclude = args.exclude.as_deref().map(|id| ctx.person_id(id)).transpose()?;
    let phones: Vec<_> = args.phones.iter().map(|p| parse_phone(p)).collect();

    let store = ctx.open_store()?;
    let conflict = ctx.check(ctx.engine(&store).check_duplicates(
        &actor,
        &phones,
        &args.emails,
        exclude.as_ref(),
    ))?;

    let result = CheckResult {
        duplicate: conflict.is_some(),
        conflict,
    };
    render(ctx.output, &result, |r, w| match &r.conflict {
        Some(conflict) => writeln!(w, "duplicate: {conflict}"),
        None => writeln!(w, "✓ no duplicates"),
    })
}
