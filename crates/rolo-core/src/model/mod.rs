//! Domain types shared by every engine component.

pub mod activity;
pub mod id;
pub mod person;
pub mod status;
pub mod user;

pub use activity::{ActivityAction, ActivityEntry, ActivityEvent};
pub use id::PersonId;
pub use person::{
    Attachment, Category, Meeting, ParseEnumError, Person, PersonDetails, PersonRecord, Phone,
    Tag, Task,
};
pub use status::{INTERESTED, StatusOption, StatusVocabulary};
pub use user::{Role, UserRecord};
