//! Authoring proposal details before submission

use serde::{Deserialize, Serialize};

use mcdao_common::{Error, Result};

use crate::details::ProposalDetails;

const MAX_TITLE_LEN: usize = 100;
const DRAFT_ID_LEN: usize = 10;

/// Details a member fills in when writing a proposal
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalDraft {
    pub title: String,
    pub description: String,
    pub link: Option<String>,
}

impl ProposalDraft {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            link: None,
        }
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::validation("Title cannot be empty"));
        }

        if self.title.chars().count() > MAX_TITLE_LEN {
            return Err(Error::validation(format!(
                "Title cannot exceed {} characters",
                MAX_TITLE_LEN
            )));
        }

        if self.description.trim().is_empty() {
            return Err(Error::validation("Description cannot be empty"));
        }

        if let Some(link) = self.link.as_deref().filter(|l| !l.is_empty()) {
            if !(link.starts_with("http://") || link.starts_with("https://")) {
                return Err(Error::validation(format!("Link must be an http(s) URL: {}", link)));
            }
        }

        Ok(())
    }

    /// Validate and turn the draft into a details document with a fresh id
    pub fn into_details(self) -> Result<ProposalDetails> {
        self.validate()?;

        let mut id = uuid::Uuid::new_v4().simple().to_string();
        id.truncate(DRAFT_ID_LEN);

        Ok(ProposalDetails {
            id: Some(id),
            title: Some(self.title),
            description: Some(self.description),
            link: self.link.filter(|l| !l.is_empty()),
            ..Default::default()
        })
    }

    /// JSON text ready to be submitted inline or uploaded to a content store
    pub fn to_details_json(&self) -> Result<String> {
        let details = self.clone().into_details()?;
        Ok(serde_json::to_string(&details)?)
    }
}
