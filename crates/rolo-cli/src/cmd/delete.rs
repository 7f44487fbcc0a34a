//! `rolo delete`: remove a record within the actor's management scope.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use super::Context;
use crate::output::render;

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Person id (`ps-...`).
    pub id: String,
}

#[derive(Debug, Serialize)]
struct Deleted<'a> {
    id: &'a str,
    category: &'a str,
    deleted: bool,
}

pub fn run_delete(args: &DeleteArgs, ctx: &Context) -> Result<()> {
    let actor = ctx.actor()?;
    let id = ctx.person_id(&args.id)?;
    let store = ctx.open_store()?;
    let record = ctx.check(ctx.engine(&store).delete(&actor, &id))?;

    let summary = Deleted {
        id: record.id().as_str(),
        category: record.category().as_str(),
        deleted: true,
    };
    render(ctx.output, &summary, |d, w| {
        writeln!(w, "✓ deleted {} {}", d.category, d.id)
    })
}
