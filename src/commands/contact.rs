use crate::{
    db::contacts::Contacts,
    libs::{
        contact::{Contact, ContactUpdate, NewContact},
        error::AppError,
        messages::Message,
        view::View,
    },
    msg_error, msg_info, msg_print, msg_success, msg_warning,
};
use anyhow::Result;
use clap::{Args, Subcommand};
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};

#[derive(Debug, Args)]
pub struct ContactArgs {
    #[command(subcommand)]
    command: Option<ContactCommand>,
}

#[derive(Debug, Subcommand)]
enum ContactCommand {
    /// List emergency contacts
    List,
    /// Add an emergency contact
    Add {
        #[arg(short, long)]
        name: Option<String>,
        /// Local number, digits only
        #[arg(short, long)]
        phone: Option<String>,
        /// Dialling code, e.g. 86 or +86
        #[arg(short, long)]
        country_code: Option<String>,
        #[arg(short, long)]
        relationship: Option<String>,
    },
    /// Change fields of a contact
    Update {
        id: Option<String>,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        phone: Option<String>,
        #[arg(short, long)]
        country_code: Option<String>,
        /// Empty string clears the relationship
        #[arg(short, long)]
        relationship: Option<String>,
        #[arg(short, long)]
        active: Option<bool>,
    },
    /// Delete a contact
    Delete {
        id: Option<String>,
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Enable or disable a contact for alerts
    Toggle { id: Option<String> },
}

pub fn cmd(args: ContactArgs) -> Result<()> {
    let mut contacts = Contacts::new()?;
    match args.command {
        Some(ContactCommand::List) | None => handle_list(&contacts),
        Some(ContactCommand::Add {
            name,
            phone,
            country_code,
            relationship,
        }) => handle_add(&mut contacts, name, phone, country_code, relationship),
        Some(ContactCommand::Update {
            id,
            name,
            phone,
            country_code,
            relationship,
            active,
        }) => {
            let update = ContactUpdate {
                name,
                phone_number: phone,
                country_code,
                relationship,
                is_active: active,
            };
            handle_update(&mut contacts, id, update)
        }
        Some(ContactCommand::Delete { id, yes }) => handle_delete(&mut contacts, id, yes),
        Some(ContactCommand::Toggle { id }) => handle_toggle(&mut contacts, id),
    }
}

fn handle_list(contacts: &Contacts) -> Result<()> {
    let list = contacts.list_contacts();
    if list.is_empty() {
        msg_info!(Message::NoContacts);
        return Ok(());
    }
    msg_print!(Message::ContactsHeader, true);
    View::contacts(&list)?;
    Ok(())
}

fn handle_add(contacts: &mut Contacts, name: Option<String>, phone: Option<String>, country_code: Option<String>, relationship: Option<String>) -> Result<()> {
    let name = match name {
        Some(name) => name,
        None => Input::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptContactName.to_string())
            .interact_text()?,
    };
    let phone = match phone {
        Some(phone) => phone,
        None => Input::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptPhoneNumber.to_string())
            .interact_text()?,
    };
    let country_code = match country_code {
        Some(country_code) => country_code,
        None => Input::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptCountryCode.to_string())
            .interact_text()?,
    };
    let relationship: String = match relationship {
        Some(relationship) => relationship,
        None => Input::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptRelationship.to_string())
            .allow_empty(true)
            .interact_text()?,
    };

    let mut params = NewContact::new(&name, &phone, &country_code);
    if !relationship.trim().is_empty() {
        params = params.with_relationship(&relationship);
    }

    match contacts.add_contact(params) {
        Ok(contact) => {
            msg_success!(Message::ContactCreated(contact.name));
            Ok(())
        }
        Err(AppError::InvalidContact(reason)) => {
            msg_error!(Message::InvalidContact(reason));
            Ok(())
        }
        Err(e) => {
            msg_error!(Message::ContactSaveFailed);
            Err(e.into())
        }
    }
}

fn handle_update(contacts: &mut Contacts, id: Option<String>, update: ContactUpdate) -> Result<()> {
    let Some(contact) = resolve_contact(contacts, id, Message::SelectContactToEdit)? else {
        return Ok(());
    };

    let update = if update.is_empty() { prompt_update(&contact)? } else { update };
    if update.is_empty() {
        msg_info!(Message::NoChangesProvided);
        return Ok(());
    }

    match contacts.update_contact(&contact.id, update) {
        Ok(Some(updated)) => msg_success!(Message::ContactUpdated(updated.name)),
        Ok(None) => msg_error!(Message::ContactNotFound(contact.id)),
        Err(AppError::InvalidContact(reason)) => msg_error!(Message::InvalidContact(reason)),
        Err(e) => {
            msg_error!(Message::ContactSaveFailed);
            return Err(e.into());
        }
    }
    Ok(())
}

/// Asks for every field, prefilled with the current value. Unchanged
/// answers are left out of the update.
fn prompt_update(contact: &Contact) -> Result<ContactUpdate> {
    let name: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(Message::PromptContactName.to_string())
        .default(contact.name.clone())
        .interact_text()?;
    let phone: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(Message::PromptPhoneNumber.to_string())
        .default(contact.phone_number.clone())
        .interact_text()?;
    let country_code: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(Message::PromptCountryCode.to_string())
        .default(contact.country_code.clone())
        .interact_text()?;
    let current_relationship = contact.relationship.clone().unwrap_or_default();
    let relationship: String = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(Message::PromptRelationship.to_string())
        .default(current_relationship.clone())
        .allow_empty(true)
        .interact_text()?;

    Ok(ContactUpdate {
        name: Some(name).filter(|value| *value != contact.name),
        phone_number: Some(phone).filter(|value| *value != contact.phone_number),
        country_code: Some(country_code).filter(|value| *value != contact.country_code),
        relationship: Some(relationship).filter(|value| *value != current_relationship),
        is_active: None,
    })
}

fn handle_delete(contacts: &mut Contacts, id: Option<String>, yes: bool) -> Result<()> {
    let Some(contact) = resolve_contact(contacts, id, Message::SelectContactToDelete)? else {
        return Ok(());
    };

    if !yes {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::ConfirmDeleteContact(contact.name.clone()).to_string())
            .default(false)
            .interact()?;
        if !confirmed {
            msg_info!(Message::OperationCancelled);
            return Ok(());
        }
    }

    match contacts.delete_contact(&contact.id) {
        Ok(true) => msg_success!(Message::ContactDeleted(contact.name)),
        Ok(false) => msg_error!(Message::ContactNotFound(contact.id)),
        Err(e) => {
            msg_error!(Message::ContactSaveFailed);
            return Err(e.into());
        }
    }
    Ok(())
}

fn handle_toggle(contacts: &mut Contacts, id: Option<String>) -> Result<()> {
    let Some(contact) = resolve_contact(contacts, id, Message::SelectContactToToggle)? else {
        return Ok(());
    };

    match contacts.toggle_active(&contact.id) {
        Ok(Some(updated)) if updated.is_active => msg_success!(Message::ContactActivated(updated.name)),
        Ok(Some(updated)) => msg_warning!(Message::ContactDeactivated(updated.name)),
        Ok(None) => msg_error!(Message::ContactNotFound(contact.id)),
        Err(e) => {
            msg_error!(Message::ContactSaveFailed);
            return Err(e.into());
        }
    }
    Ok(())
}

/// Looks up the contact by id, or lets the user pick one when no id was given.
fn resolve_contact(contacts: &Contacts, id: Option<String>, prompt: Message) -> Result<Option<Contact>> {
    if let Some(id) = id {
        let contact = contacts.get_contact(&id)?;
        if contact.is_none() {
            msg_error!(Message::ContactNotFound(id));
        }
        return Ok(contact);
    }

    let list = contacts.list_contacts();
    if list.is_empty() {
        msg_info!(Message::NoContacts);
        return Ok(None);
    }

    let items: Vec<String> = list.iter().map(|c| format!("{} ({})", c.name, c.international_number())).collect();
    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt.to_string())
        .items(&items)
        .default(0)
        .interact()?;

    Ok(list.into_iter().nth(selection))
}
