use super::contact::Contact;
use anyhow::Result;
use prettytable::{row, Table};

pub struct View {}

impl View {
    pub fn contacts(contacts: &[Contact]) -> Result<()> {
        let mut table = Table::new();

        table.add_row(row!["ID", "NAME", "PHONE", "RELATIONSHIP", "ACTIVE", "UPDATED"]);
        for contact in contacts {
            let active = if contact.is_active { "yes" } else { "no" };
            table.add_row(row![
                contact.id,
                contact.name,
                contact.international_number(),
                contact.relationship.as_deref().unwrap_or("-"),
                active,
                contact.last_updated.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M")
            ]);
        }
        table.printstd();

        Ok(())
    }
}
