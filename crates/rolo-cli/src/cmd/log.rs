//! `rolo log`: activity log of a record, oldest first.

use anyhow::Result;
use clap::Args;
use rolo_core::model::ActivityEntry;
use std::io::{self, Write};

use super::{Context, micros_to_local};
use crate::output::{pretty_section, render_mode};

#[derive(Args, Debug)]
pub struct LogArgs {
    /// Person id (`ps-...`).
    pub id: String,
}

pub fn run_log(args: &LogArgs, ctx: &Context) -> Result<()> {
    let actor = ctx.actor()?;
    let id = ctx.person_id(&args.id)?;
    let store = ctx.open_store()?;
    let entries = ctx.check(ctx.engine(&store).activity(&actor, &id))?;
    render_mode(ctx.output, entries.as_slice(), write_text, write_pretty)
}

fn write_text(entries: &[ActivityEntry], w: &mut dyn Write) -> io::Result<()> {
    for e in entries {
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}\t{}",
            e.entry_id, e.created_at_us, e.action, e.kind, e.actor_id, e.description
        )?;
    }
    Ok(())
}

fn write_pretty(entries: &[ActivityEntry], w: &mut dyn Write) -> io::Result<()> {
    let Some(first) = entries.first() else {
        return writeln!(w, "No activity recorded.");
    };
    pretty_section(w, &format!("Activity {}", first.person_id))?;
    for e in entries {
        writeln!(w, "{}  {}", micros_to_local(e.created_at_us), e.title)?;
        writeln!(w, "    {}", e.description)?;
    }
    Ok(())
}
