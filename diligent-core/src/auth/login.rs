//! Login orchestration: directory bind, policy check, user record upsert

use super::policy::AuthorizationPolicy;
use crate::directory::{
    DirectoryAttributes, DirectoryClient, DirectoryError, GIVEN_NAME, LOGIN_ATTRIBUTES, SURNAME,
    TITLE,
};
use crate::error::DiligentError;
use crate::traits::UserStore;
use crate::types::{Credentials, User};
use std::sync::Arc;
use tracing::{info, warn};

/// Titles that mark an account as a student
pub const STUDENT_TITLES: &[&str] = &["Undergraduate", "Postgraduate", "Student"];

pub fn is_student(title: Option<&str>) -> bool {
    title.is_some_and(|title| STUDENT_TITLES.contains(&title))
}

#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    /// Bad password, unknown account, or an account the policy rejects
    #[error("authentication failed")]
    AuthenticationFailed,
    #[error("directory unavailable: {0}")]
    DirectoryUnavailable(String),
    #[error(transparent)]
    Storage(#[from] DiligentError),
}

#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: User,
    pub attributes: DirectoryAttributes,
}

/// Authenticates users against the directory and records first logins
#[derive(Clone)]
pub struct LoginService {
    directory: Arc<dyn DirectoryClient>,
    policy: AuthorizationPolicy,
    users: Arc<dyn UserStore>,
}

impl LoginService {
    pub fn new(
        directory: Arc<dyn DirectoryClient>,
        policy: AuthorizationPolicy,
        users: Arc<dyn UserStore>,
    ) -> Self {
        Self {
            directory,
            policy,
            users,
        }
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<LoginOutcome, LoginError> {
        let username = credentials.username();

        if !credentials.is_complete() {
            info!("Rejecting login with empty username or password");
            return Err(LoginError::AuthenticationFailed);
        }

        let attributes = self
            .directory
            .login(credentials, &LOGIN_ATTRIBUTES)
            .await
            .map_err(|e| match e {
                DirectoryError::InvalidCredentials | DirectoryError::NotFound => {
                    info!(username, reason = %e, "Directory authentication failed");
                    LoginError::AuthenticationFailed
                }
                DirectoryError::Connection(message) => {
                    warn!(username, error = %message, "Directory unavailable");
                    LoginError::DirectoryUnavailable(message)
                }
            })?;

        let decision = self.policy.evaluate(&attributes);
        if !decision.is_authorized() {
            info!(username, "Account not authorized by group policy");
            return Err(LoginError::AuthenticationFailed);
        }

        let user = match self.users.find_user_by_username(username).await? {
            Some(user) => user,
            None => {
                let user = user_from_attributes(username, &attributes);
                info!(username, is_student = user.is_student, "Recording first login");
                self.users.insert_user_if_absent(user).await?
            }
        };

        info!(username, ?decision, "Login succeeded");
        Ok(LoginOutcome { user, attributes })
    }
}

/// Build the user record for a first login
pub fn user_from_attributes(username: &str, attributes: &DirectoryAttributes) -> User {
    User {
        username: username.to_string(),
        firstname: attributes
            .scalar(GIVEN_NAME)
            .map(str::to_string)
            .unwrap_or_else(|| username.to_uppercase()),
        surname: attributes.scalar(SURNAME).unwrap_or_default().to_string(),
        is_student: is_student(attributes.scalar(TITLE)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::fixture::{FixtureDirectory, FixtureEntry};
    use crate::directory::{DISTINGUISHED_NAME, MEMBERSHIPS};
    use crate::storage::MemoryStore;
    use async_trait::async_trait;

    fn fixture() -> FixtureDirectory {
        let mut directory = FixtureDirectory::default();
        directory.insert(
            "jdoe",
            FixtureEntry::default()
                .with_password("secret")
                .with_attribute(TITLE, &["Undergraduate"])
                .with_attribute(GIVEN_NAME, &["John"])
                .with_attribute(SURNAME, &["Doe"])
                .with_attribute(DISTINGUISHED_NAME, &["CN=jdoe,OU=doc,OU=Users,DC=ic,DC=ac,DC=uk"])
                .with_attribute(MEMBERSHIPS, &["CN=unrelated,OU=Groups"]),
        );
        directory.insert(
            "staff1",
            FixtureEntry::default()
                .with_password("secret")
                .with_attribute(TITLE, &["Lecturer"])
                .with_attribute(DISTINGUISHED_NAME, &["CN=staff1,OU=eee,OU=Users"])
                .with_attribute(MEMBERSHIPS, &["CN=doc-staff-group,OU=Groups"]),
        );
        directory.insert(
            "nostudent",
            FixtureEntry::default()
                .with_password("secret")
                .with_attribute(DISTINGUISHED_NAME, &["CN=nostudent,OU=eee,OU=Users"])
                .with_attribute(MEMBERSHIPS, &["CN=eee-all-students,OU=Groups"]),
        );
        directory
    }

    fn service(store: &MemoryStore) -> LoginService {
        LoginService::new(
            Arc::new(fixture()),
            AuthorizationPolicy::default(),
            Arc::new(store.clone()),
        )
    }

    struct UnreachableDirectory;

    #[async_trait]
    impl DirectoryClient for UnreachableDirectory {
        async fn login(
            &self,
            _credentials: &Credentials,
            _requested: &[&str],
        ) -> Result<DirectoryAttributes, DirectoryError> {
            Err(DirectoryError::Connection("connection refused".to_string()))
        }
    }

    /// Bind succeeds but the account search comes back empty
    struct MissingEntryDirectory;

    #[async_trait]
    impl DirectoryClient for MissingEntryDirectory {
        async fn login(
            &self,
            _credentials: &Credentials,
            _requested: &[&str],
        ) -> Result<DirectoryAttributes, DirectoryError> {
            Err(DirectoryError::NotFound)
        }
    }

    #[tokio::test]
    async fn test_missing_entry_after_bind_is_authentication_failure() {
        let store = MemoryStore::new();
        let service = LoginService::new(
            Arc::new(MissingEntryDirectory),
            AuthorizationPolicy::default(),
            Arc::new(store.clone()),
        );

        let result = service.login(&Credentials::new("jdoe", "secret")).await;
        assert!(matches!(result, Err(LoginError::AuthenticationFailed)));
        assert_eq!(store.user_count().await, 0);
    }

    #[tokio::test]
    async fn test_privileged_unit_login_creates_user() {
        let store = MemoryStore::new();
        let outcome = service(&store)
            .login(&Credentials::new("JDoe", "secret"))
            .await
            .unwrap();

        assert_eq!(
            outcome.user,
            User {
                username: "jdoe".to_string(),
                firstname: "John".to_string(),
                surname: "Doe".to_string(),
                is_student: true,
            }
        );
        assert_eq!(store.user_count().await, 1);
    }

    #[tokio::test]
    async fn test_allowed_group_login_defaults_missing_names() {
        let store = MemoryStore::new();
        let outcome = service(&store)
            .login(&Credentials::new("staff1", "secret"))
            .await
            .unwrap();

        assert_eq!(outcome.user.firstname, "STAFF1");
        assert_eq!(outcome.user.surname, "");
        assert!(!outcome.user.is_student);
    }

    #[tokio::test]
    async fn test_policy_rejection_is_indistinguishable_from_bad_password() {
        let store = MemoryStore::new();
        let service = service(&store);

        let rejected = service.login(&Credentials::new("nostudent", "secret")).await;
        let bad_password = service.login(&Credentials::new("jdoe", "wrong")).await;

        assert!(matches!(rejected, Err(LoginError::AuthenticationFailed)));
        assert!(matches!(bad_password, Err(LoginError::AuthenticationFailed)));
        assert_eq!(store.user_count().await, 0);
    }

    #[tokio::test]
    async fn test_unknown_user_creates_no_record() {
        let store = MemoryStore::new();
        let result = service(&store).login(&Credentials::new("ghost", "secret")).await;

        assert!(matches!(result, Err(LoginError::AuthenticationFailed)));
        assert_eq!(store.user_count().await, 0);
    }

    #[tokio::test]
    async fn test_empty_password_never_reaches_directory() {
        let store = MemoryStore::new();
        let service = LoginService::new(
            Arc::new(UnreachableDirectory),
            AuthorizationPolicy::default(),
            Arc::new(store.clone()),
        );

        let result = service.login(&Credentials::new("jdoe", "   ")).await;
        assert!(matches!(result, Err(LoginError::AuthenticationFailed)));
    }

    #[tokio::test]
    async fn test_connection_failure_is_reported_separately() {
        let store = MemoryStore::new();
        let service = LoginService::new(
            Arc::new(UnreachableDirectory),
            AuthorizationPolicy::default(),
            Arc::new(store.clone()),
        );

        let result = service.login(&Credentials::new("jdoe", "secret")).await;
        assert!(matches!(result, Err(LoginError::DirectoryUnavailable(_))));
        assert_eq!(store.user_count().await, 0);
    }

    #[tokio::test]
    async fn test_second_login_reuses_existing_record() {
        let store = MemoryStore::new();
        let existing = User {
            username: "jdoe".to_string(),
            firstname: "Johnathan".to_string(),
            surname: "Doe".to_string(),
            is_student: false,
        };
        store.insert_user_if_absent(existing.clone()).await.unwrap();

        let service = service(&store);
        let first = service.login(&Credentials::new("jdoe", "secret")).await.unwrap();
        let second = service.login(&Credentials::new("jdoe", "secret")).await.unwrap();

        assert_eq!(first.user, existing);
        assert_eq!(second.user, existing);
        assert_eq!(store.user_count().await, 1);
    }

    #[test]
    fn test_is_student() {
        assert!(is_student(Some("Postgraduate")));
        assert!(!is_student(Some("Lecturer")));
        assert!(!is_student(None));
    }
}
