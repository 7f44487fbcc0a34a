//! `rolo vocab`: per-company status vocabularies.

use anyhow::Result;
use clap::{Args, Subcommand};
use rolo_core::model::{Category, StatusOption, StatusVocabulary};
use std::io::{self, Write};

use super::Context;
use crate::output::{pretty_section, render_mode};

#[derive(Subcommand, Debug)]
pub enum VocabCommand {
    /// Show the statuses the actor's company accepts.
    Show(VocabShowArgs),
    /// Replace the company's statuses for one category (company admin only).
    Set(VocabSetArgs),
}

#[derive(Args, Debug)]
pub struct VocabShowArgs {
    #[arg(short, long, default_value = "lead")]
    pub category: Category,
}

#[derive(Args, Debug)]
pub struct VocabSetArgs {
    #[arg(short, long)]
    pub category: Category,

    /// `value[:label[:group]]`, in display order (repeatable).
    #[arg(short, long = "option", required = true, value_parser = parse_option)]
    pub options: Vec<StatusOption>,
}

fn parse_option(raw: &str) -> Result<StatusOption, String> {
    let mut parts = raw.splitn(3, ':').map(str::trim);
    let value = parts.next().unwrap_or_default();
    if value.is_empty() {
        return Err("status value must not be blank".to_string());
    }
    let label = parts.next().filter(|l| !l.is_empty()).unwrap_or(value);
    let group = parts.next().filter(|g| !g.is_empty());
    Ok(StatusOption::new(value, label, group))
}

pub fn run_vocab(command: &VocabCommand, ctx: &Context) -> Result<()> {
    let actor = ctx.actor()?;
    let store = ctx.open_store()?;
    let engine = ctx.engine(&store);
    let vocab = match command {
        VocabCommand::Show(args) => ctx.check(engine.vocabulary(&actor, args.category))?,
        VocabCommand::Set(args) => {
            let vocab = StatusVocabulary::new(args.category, args.options.clone());
            ctx.check(engine.set_vocabulary(&actor, &vocab))?;
            vocab
        }
    };
    render_mode(ctx.output, &vocab, write_text, write_pretty)
}

fn write_text(vocab: &StatusVocabulary, w: &mut dyn Write) -> io::Result<()> {
    for o in &vocab.options {
        writeln!(
            w,
            "{}\t{}\t{}",
            o.value,
            o.label,
            o.group.as_deref().unwrap_or("-")
        )?;
    }
    Ok(())
}

fn write_pretty(vocab: &StatusVocabulary, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, &format!("{} statuses", vocab.category))?;
    for o in &vocab.options {
        match &o.group {
            Some(group) => writeln!(w, "{:<16} {:<20} [{group}]", o.value, o.label)?,
            None => writeln!(w, "{:<16} {}", o.value, o.label)?,
        }
    }
    Ok(())
}
