//! `rolo show`: display one contact or lead.
//!
//! Also home to the record renderer shared by every command that returns
//! a person.

use anyhow::Result;
use clap::Args;
use rolo_core::model::{Person, PersonRecord};
use std::io::{self, Write};

use super::{Context, micros_to_local};
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Person id (`ps-...`).
    pub id: String,
}

pub fn run_show(args: &ShowArgs, ctx: &Context) -> Result<()> {
    let actor = ctx.actor()?;
    let id = ctx.person_id(&args.id)?;
    let store = ctx.open_store()?;
    let record = ctx.check(ctx.engine(&store).get(&actor, &id))?;
    render_person(ctx.output, &record)
}

/// Render a person in the requested mode.
///
/// JSON is the serialized record, tagged with its `category`.
pub fn render_person(mode: OutputMode, record: &PersonRecord) -> Result<()> {
    render_mode(mode, record, write_text_row, write_pretty)
}

/// One tab-separated row: id, category, status, owner, name, emails, phones.
pub fn write_text_row(record: &PersonRecord, w: &mut dyn Write) -> io::Result<()> {
    let p = record.person();
    writeln!(
        w,
        "{}\t{}\t{}\t{}\t{}\t{}\t{}",
        p.id,
        record.category(),
        p.status,
        p.owner_id,
        p.display_name(),
        p.emails.join(","),
        phones(p).join(","),
    )
}

fn write_pretty(record: &PersonRecord, w: &mut dyn Write) -> io::Result<()> {
    let p = record.person();
    let heading = match record {
        PersonRecord::Contact(_) => "Contact",
        PersonRecord::Lead(_) => "Lead",
    };
    pretty_section(w, &format!("{heading} {}", p.id))?;
    pretty_kv(w, "Name", p.display_name())?;
    pretty_kv(w, "Owner", &p.owner_id)?;
    pretty_kv(w, "Status", if p.status.is_empty() { "-" } else { p.status.as_str() })?;
    if !p.emails.is_empty() {
        pretty_kv(w, "Emails", p.emails.join(", "))?;
    }
    if !p.phones.is_empty() {
        pretty_kv(w, "Phones", phones(p).join(", "))?;
    }
    if let Some(company) = &p.details.company {
        pretty_kv(w, "Company", company)?;
    }
    if let Some(designation) = &p.details.designation {
        pretty_kv(w, "Title", designation)?;
    }
    if p.is_favourite {
        pretty_kv(w, "Favourite", "yes")?;
    }
    if !p.tags.is_empty() {
        let names: Vec<&str> = p.tags.iter().map(|t| t.name.as_str()).collect();
        pretty_kv(w, "Tags", names.join(", "))?;
    }
    let counts = [
        ("Tasks", p.tasks.len()),
        ("Meetings", p.meetings.len()),
        ("Files", p.attachments.len()),
    ];
    for (label, n) in counts.into_iter().filter(|(_, n)| *n > 0) {
        pretty_kv(w, label, n.to_string())?;
    }
    pretty_kv(w, "Created", micros_to_local(p.created_at_us))?;
    pretty_kv(w, "Updated", micros_to_local(p.updated_at_us))?;
    writeln!(w)
}

fn phones(p: &Person) -> Vec<String> {
    p.phones.iter().map(ToString::to_string).collect()
}
