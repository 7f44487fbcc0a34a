//! `rolo status`: move a record to a new status.
//!
//! `interested` on a contact promotes it to a lead.

use anyhow::Result;
use clap::Args;

use super::Context;
use super::show::render_person;

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Person id (`ps-...`).
    pub id: String,

    /// New status value from the company vocabulary.
    pub status: String,

    /// Free-text note stored with the pipeline entry.
    #[arg(short, long)]
    pub note: Option<String>,
}

pub fn run_status(args: &StatusArgs, ctx: &Context) -> Result<()> {
    let actor = ctx.actor()?;
    let id = ctx.person_id(&args.id)?;
    let store = ctx.open_store()?;
    let record = ctx.check(ctx.engine(&store).change_status(
        &actor,
        &id,
        &args.status,
        args.note.as_deref(),
    ))?;
    render_person(ctx.output, &record)
}
