use crate::{
    config::AppConfig,
    error::ApiError,
    models::{NewUser, Role, User},
    oauth::VerifiedIdentity,
    repository::RepositoryState,
};

/// AdminAllowlist
///
/// The configured email domains and explicit addresses that receive the
/// administrator role automatically.
#[derive(Clone, Debug, Default)]
pub struct AdminAllowlist {
    domains: Vec<String>,
    emails: Vec<String>,
}

impl AdminAllowlist {
    pub fn new(domains: Vec<String>, emails: Vec<String>) -> Self {
        Self {
            domains: domains.into_iter().map(|d| d.to_lowercase()).collect(),
            emails: emails.into_iter().map(|e| e.to_lowercase()).collect(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.admin_domains.clone(), config.admin_emails.clone())
    }

    /// Matches case-insensitively on the full address or its domain.
    pub fn is_admin(&self, email: &str) -> bool {
        let email = email.to_lowercase();
        self.emails.contains(&email)
            || self
                .domains
                .iter()
                .any(|d| email.ends_with(&format!("@{d}")))
    }

    pub fn role_for(&self, email: &str) -> Role {
        if self.is_admin(email) {
            Role::Admin
        } else {
            Role::User
        }
    }
}

/// UserDirectory
///
/// Maps external identities to internal user records. Reads and writes are
/// deliberately separate operations: `lookup` is the pure read used on every
/// request, while `resolve_or_create` runs only on a login event and is the
/// single place a user row is created or promoted.
#[derive(Clone)]
pub struct UserDirectory {
    repo: RepositoryState,
    allowlist: AdminAllowlist,
}

impl UserDirectory {
    pub fn new(repo: RepositoryState, allowlist: AdminAllowlist) -> Self {
        Self { repo, allowlist }
    }

    /// lookup
    ///
    /// Resolves a subject id to its user record without side effects.
    pub async fn lookup(&self, google_id: &str) -> Result<Option<User>, sqlx::Error> {
        self.repo.find_user_by_subject(google_id).await
    }

    /// resolve_or_create
    ///
    /// Login-time resolution. Creates the record on first sight with a role
    /// derived from the allowlist; promotes an existing record when the
    /// allowlist now matches and it is not already an administrator. Never
    /// demotes. Idempotent: the unique index on the subject id guarantees
    /// repeated logins reuse the same row.
    pub async fn resolve_or_create(&self, identity: &VerifiedIdentity) -> Result<User, ApiError> {
        let qualifies = self.allowlist.is_admin(&identity.email);

        match self.repo.find_user_by_subject(&identity.sub).await? {
            Some(user) if qualifies && user.role != Role::Admin => {
                let promoted = self
                    .repo
                    .set_user_role(user.id, Role::Admin)
                    .await?
                    .ok_or(ApiError::UnknownUser)?;
                tracing::info!(user_id = promoted.id, "promoted user to admin at login");
                Ok(promoted)
            }
            Some(user) => Ok(user),
            None => {
                let user = self
                    .repo
                    .create_user(NewUser {
                        google_id: identity.sub.clone(),
                        email: identity.email.clone(),
                        name: identity.name.clone(),
                        profile_pic: identity.picture.clone(),
                        role: self.allowlist.role_for(&identity.email),
                    })
                    .await?;
                tracing::info!(user_id = user.id, role = user.role.as_str(), "created user");
                Ok(user)
            }
        }
    }
}
