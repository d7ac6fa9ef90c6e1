//! Ticket data model.
//!
//! Tickets arrive as already-parsed structured records; the training input
//! file is a single JSON document of shape `{"tickets": [...]}`. Unknown
//! fields from the ticketing system are ignored, missing fields default to
//! empty.

use crate::error::{DispatchError, Result};
use crate::normalize::Tech;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One reply on a ticket thread.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Comment {
    #[serde(default)]
    pub body: Option<String>,
}

/// The staff member a historical ticket was assigned to.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TicketUser {
    #[serde(default)]
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ticket {
    #[serde(default)]
    pub number: Option<u64>,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub problem_type: Option<String>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    /// Ground-truth assignee; present only in historical data.
    #[serde(default)]
    pub user: Option<TicketUser>,
}

impl Ticket {
    /// Canonical ground-truth assignee, if the ticket carries one.
    pub fn actual_tech(&self) -> Option<Tech> {
        let user = self.user.as_ref()?;
        Tech::normalize(user.full_name.as_deref())
    }
}

/// Training-input container: `{"tickets": [...]}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TicketFile {
    #[serde(default)]
    pub tickets: Vec<Ticket>,
}

/// Load tickets from a JSON file at `path`.
pub fn load_tickets(path: &Path) -> Result<Vec<Ticket>> {
    let content = fs::read_to_string(path).map_err(|e| {
        DispatchError::Dataset(format!("cannot read {}: {}", path.display(), e))
    })?;
    let file: TicketFile = serde_json::from_str(&content).map_err(|e| {
        DispatchError::Dataset(format!("cannot parse {}: {}", path.display(), e))
    })?;
    Ok(file.tickets)
}
