//! `rolo update`: patch a contact or lead, switching category if asked.

use anyhow::Result;
use clap::Args;
use rolo_core::PersonPatch;
use rolo_core::model::Category;
use std::path::PathBuf;

use super::show::render_person;
use super::{Context, parse_phone, read_json_input};

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Person id (`ps-...`).
    pub id: String,

    /// Move the record to this collection.
    #[arg(short, long)]
    pub category: Option<Category>,

    #[arg(long)]
    pub first_name: Option<String>,

    #[arg(long)]
    pub last_name: Option<String>,

    /// Replacement email list (repeatable).
    #[arg(short, long = "email")]
    pub emails: Vec<String>,

    /// Replacement phone list (repeatable).
    #[arg(short, long = "phone")]
    pub phones: Vec<String>,

    /// Remove every email.
    #[arg(long, conflicts_with = "emails")]
    pub clear_emails: bool,

    /// Remove every phone.
    #[arg(long, conflicts_with = "phones")]
    pub clear_phones: bool,

    #[arg(short, long)]
    pub status: Option<String>,

    #[arg(long)]
    pub favourite: Option<bool>,

    /// Read a patch document from a JSON file, or `-` for stdin. Flags
    /// override fields from the document.
    #[arg(long, value_name = "PATH")]
    pub input: Option<PathBuf>,
}

impl UpdateArgs {
    fn to_patch(&self) -> Result<PersonPatch> {
        let mut patch: PersonPatch = match &self.input {
            Some(path) => read_json_input(path)?,
            None => PersonPatch::default(),
        };
        if self.category.is_some() {
            patch.category = self.category;
        }
        if self.first_name.is_some() {
            patch.first_name.clone_from(&self.first_name);
        }
        if self.last_name.is_some() {
            patch.last_name.clone_from(&self.last_name);
        }
        if self.clear_emails {
            patch.emails = Some(Vec::new());
        } else if !self.emails.is_empty() {
            patch.emails = Some(self.emails.clone());
        }
        if self.clear_phones {
            patch.phones = Some(Vec::new());
        } else if !self.phones.is_empty() {
            patch.phones = Some(self.phones.iter().map(|p| parse_phone(p)).collect());
        }
        if self.status.is_some() {
            patch.status.clone_from(&self.status);
        }
        if self.favourite.is_some() {
            patch.is_favourite = self.favourite;
        }
        Ok(patch)
    }
}

pub fn run_update(args: &UpdateArgs, ctx: &Context) -> Result<()> {
    let actor = ctx.actor()?;
    let id = ctx.person_id(&args.id)?;
    let patch = args.to_patch()?;
    if patch == PersonPatch::default() {
        return ctx.invalid("nothing to update");
    }
    let store = ctx.open_store()?;
    let record = ctx.check(ctx.engine(&store).update(&actor, &id, &patch))?;
    render_person(ctx.output, &record)
}
