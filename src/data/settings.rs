use bson::Document;
use chrono::{DateTime, Utc};
use utoipa::ToSchema;
use uuid::Uuid;

use super::entity::{require, Entity, Kind, Owned, Reference};
use super::repo::Repo;
use super::store::field_filter;
use crate::resp::problem::{problems, Problem};

fn default_theme() -> String {
    "light".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

fn enabled() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NotificationPreferences {
    #[serde(default = "enabled")]
    pub email: bool,
    #[serde(default)]
    pub sms: bool,
    #[serde(default = "enabled")]
    pub push: bool,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        NotificationPreferences {
            email: true,
            sms: false,
            push: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ProfileVisibility {
    #[default]
    Public,
    Private,
    Friends,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Privacy {
    #[serde(rename = "profileVisibility", default)]
    pub profile_visibility: ProfileVisibility,
}

/// Per-user preferences. At most one record per user.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserSettings {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(rename = "userId")]
    pub user_id: Uuid,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default)]
    pub notifications: NotificationPreferences,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub privacy: Privacy,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Upsert body. Sections left out keep their stored (or default) value.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UserSettingsPayload {
    #[serde(rename = "userId")]
    pub user_id: Option<Uuid>,
    pub theme: Option<String>,
    pub notifications: Option<NotificationPreferences>,
    pub language: Option<String>,
    pub privacy: Option<Privacy>,
}

impl Entity for UserSettings {
    const COLLECTION: &'static str = "user_settings";
    const NAME: &'static str = "User settings";

    fn id(&self) -> Uuid {
        self.id
    }
}

impl Owned for UserSettings {
    const OWNER_FIELD: &'static str = "userId";
}

impl UserSettings {
    fn new(user_id: Uuid, payload: UserSettingsPayload, now: DateTime<Utc>) -> UserSettings {
        UserSettings {
            id: Uuid::new_v4(),
            user_id,
            theme: payload.theme.unwrap_or_else(default_theme),
            notifications: payload.notifications.unwrap_or_default(),
            language: payload.language.unwrap_or_else(default_language),
            privacy: payload.privacy.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        }
    }
}

fn section_changes(payload: UserSettingsPayload) -> Result<Document, Problem> {
    let mut changes = Document::new();
    if let Some(theme) = payload.theme {
        changes.insert("theme", theme);
    }
    if let Some(notifications) = payload.notifications {
        changes.insert("notifications", bson::to_bson(&notifications)?);
    }
    if let Some(language) = payload.language {
        changes.insert("language", language);
    }
    if let Some(privacy) = payload.privacy {
        changes.insert("privacy", bson::to_bson(&privacy)?);
    }
    Ok(changes)
}

pub async fn find_settings(repo: &Repo<'_>, user_id: Uuid) -> Result<UserSettings, Problem> {
    repo.find_by::<UserSettings>(field_filter(UserSettings::OWNER_FIELD, user_id)?)
        .await?
        .ok_or_else(|| problems::not_found(UserSettings::NAME))
}

/// Creates the settings of a user or replaces the provided sections of the
/// existing ones.
pub async fn upsert_settings(
    repo: &Repo<'_>,
    payload: UserSettingsPayload,
) -> Result<UserSettings, Problem> {
    repo.ensure(&[Reference::required(Kind::User, payload.user_id)])
        .await?;
    let user_id = require(Kind::User, payload.user_id)?;
    let filter = field_filter(UserSettings::OWNER_FIELD, user_id)?;
    let changes = section_changes(payload.clone())?;

    if let Some(existing) = repo.find_by::<UserSettings>(filter.clone()).await? {
        return repo.update::<UserSettings>(existing.id, changes).await;
    }

    let settings = UserSettings::new(user_id, payload, Utc::now());
    if repo.insert_unique(&settings).await? {
        return Ok(settings);
    }

    // A concurrent upsert created them first.
    tracing::debug!("settings of user {} appeared during upsert", user_id);
    let existing = repo
        .find_by::<UserSettings>(filter)
        .await?
        .ok_or_else(|| problems::not_found(UserSettings::NAME))?;
    repo.update::<UserSettings>(existing.id, changes).await
}

pub async fn delete_settings(repo: &Repo<'_>, user_id: Uuid) -> Result<UserSettings, Problem> {
    let settings = find_settings(repo, user_id).await?;
    repo.delete::<UserSettings>(settings.id).await
}
