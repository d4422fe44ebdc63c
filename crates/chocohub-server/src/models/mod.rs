//! Database records and request-scoped context types

use chocohub_common::types::PublicationType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Public profile of a registered user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserProfile {
    pub name: String,
    pub surname: String,
    pub affiliation: Option<String>,
    pub orcid: Option<String>,
}

/// The user on whose behalf an operation runs
///
/// Passed explicitly to every service call; nothing reads the current user
/// from ambient request state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActingUser {
    pub id: i64,
    pub profile: UserProfile,
    /// Staging directory holding this user's not-yet-associated uploads
    pub temp_folder: PathBuf,
}

impl ActingUser {
    /// Author entry derived from the user's profile
    pub fn main_author(&self) -> NewAuthor {
        NewAuthor {
            name: format!("{}, {}", self.profile.surname, self.profile.name),
            affiliation: self.profile.affiliation.clone(),
            orcid: self.profile.orcid.clone(),
        }
    }
}

/// Author as submitted in a form, before it is persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAuthor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub affiliation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orcid: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuthorRecord {
    pub id: i64,
    pub name: String,
    pub affiliation: Option<String>,
    pub orcid: Option<String>,
    pub position: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct DataSetRecord {
    pub id: i64,
    pub owner_id: i64,
    pub user_id: Option<i64>,
    pub ds_meta_data_id: i64,
    pub is_anonymous: bool,
    pub created_at: DateTime<Utc>,
}

impl DataSetRecord {
    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.owner_id == user_id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct DsMetaDataRecord {
    pub id: i64,
    pub title: String,
    pub description: String,
    #[sqlx(try_from = "String")]
    pub publication_type: StoredPublicationType,
    pub publication_doi: Option<String>,
    pub dataset_doi: Option<String>,
    pub tags: Option<String>,
}

/// Listing row joining a dataset with its metadata
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct DataSetSummary {
    pub id: i64,
    pub user_id: Option<i64>,
    pub is_anonymous: bool,
    pub created_at: DateTime<Utc>,
    pub title: String,
    pub dataset_doi: Option<String>,
}

/// [`PublicationType`] as read back from a TEXT column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoredPublicationType(pub PublicationType);

impl TryFrom<String> for StoredPublicationType {
    type Error = chocohub_common::HubError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse().map(StoredPublicationType)
    }
}
