//! `rolo history`: pipeline entries of a lead, oldest first.

use anyhow::Result;
use clap::Args;
use rolo_core::pipeline::PipelineEntry;
use std::io::{self, Write};

use super::{Context, micros_to_local};
use crate::output::{pretty_section, render_mode};

#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Person id (`ps-...`).
    pub id: String,
}

pub fn run_history(args: &HistoryArgs, ctx: &Context) -> Result<()> {
    let actor = ctx.actor()?;
    let id = ctx.person_id(&args.id)?;
    let store = ctx.open_store()?;
    let entries = ctx.check(ctx.engine(&store).history(&actor, &id))?;
    render_mode(ctx.output, entries.as_slice(), write_text, write_pretty)
}

fn status_or_dash(status: Option<&str>) -> &str {
    match status {
        Some(s) if !s.is_empty() => s,
        _ => "-",
    }
}

fn write_text(entries: &[PipelineEntry], w: &mut dyn Write) -> io::Result<()> {
    for e in entries {
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}\t{}",
            e.entry_id,
            e.created_at_us,
            status_or_dash(e.previous_status.as_deref()),
            e.current_status,
            e.changed_by,
            e.note.as_deref().unwrap_or_default(),
        )?;
    }
    Ok(())
}

fn write_pretty(entries: &[PipelineEntry], w: &mut dyn Write) -> io::Result<()> {
    let Some(first) = entries.first() else {
        return writeln!(w, "No pipeline entries.");
    };
    pretty_section(w, &format!("Pipeline {}", first.lead_id))?;
    for e in entries {
        write!(
            w,
            "{}  {:>12} -> {:<12} by {}",
            micros_to_local(e.created_at_us),
            status_or_dash(e.previous_status.as_deref()),
            e.current_status,
            e.changed_by,
        )?;
        match &e.note {
            Some(note) => writeln!(w, "  ({note})")?,
            None => writeln!(w)?,
        }
    }
    Ok(())
}
