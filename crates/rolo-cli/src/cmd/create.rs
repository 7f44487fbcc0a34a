//! `rolo create`: add a contact or lead owned by the acting user.

use anyhow::Result;
use clap::Args;
use rolo_core::PersonDraft;
use rolo_core::model::Category;
use std::path::PathBuf;

use super::show::render_person;
use super::{Context, parse_phone, read_json_input};

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Collection to create in: contact or lead.
    #[arg(short, long, default_value = "contact")]
    pub category: Category,

    #[arg(long)]
    pub first_name: Option<String>,

    #[arg(long)]
    pub last_name: Option<String>,

    /// Email address (repeatable).
    #[arg(short, long = "email")]
    pub emails: Vec<String>,

    /// Phone, `+971501234567` or `971:501234567` (repeatable).
    #[arg(short, long = "phone")]
    pub phones: Vec<String>,

    /// Initial status. `interested` makes a contact a lead.
    #[arg(short, long)]
    pub status: Option<String>,

    #[arg(long)]
    pub company: Option<String>,

    #[arg(long)]
    pub designation: Option<String>,

    #[arg(long)]
    pub favourite: bool,

    /// Read a full person document (tags, tasks, meetings, ...) from a JSON
    /// file, or `-` for stdin. Flags override fields from the document.
    #[arg(long, value_name = "PATH")]
    pub input: Option<PathBuf>,
}

impl CreateArgs {
    fn to_draft(&self) -> Result<PersonDraft> {
        let mut draft: PersonDraft = match &self.input {
            Some(path) => read_json_input(path)?,
            None => PersonDraft::default(),
        };
        if let Some(first) = &self.first_name {
            draft.first_name.clone_from(first);
        }
        if let Some(last) = &self.last_name {
            draft.last_name.clone_from(last);
        }
        draft.emails.extend(self.emails.iter().cloned());
        draft.phones.extend(self.phones.iter().map(|p| parse_phone(p)));
        if self.status.is_some() {
            draft.status.clone_from(&self.status);
        }
        if self.company.is_some() {
            draft.details.company.clone_from(&self.company);
        }
        if self.designation.is_some() {
            draft.details.designation.clone_from(&self.designation);
        }
        draft.is_favourite |= self.favourite;
        Ok(draft)
    }
}

pub fn run_create(args: &CreateArgs, ctx: &Context) -> Result<()> {
    let actor = ctx.actor()?;
    let draft = args.to_draft()?;
    let store = ctx.open_store()?;
    let record = ctx.check(ctx.engine(&store).create(&actor, args.category, draft))?;
    render_person(ctx.output, &record)
}
