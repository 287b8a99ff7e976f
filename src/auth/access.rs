//! Authorization checks layered on top of a verified token.

use crate::error::AppError;
use crate::middleware::auth::AuthContext;
use crate::models::{Role, User};
use crate::store::IdentityStore;

/// The authenticated caller may only address their own email.
pub fn require_self(auth: &AuthContext, email: &str) -> Result<(), AppError> {
    if auth.email != email {
        tracing::warn!(caller = %auth.email, target = %email, "self-ownership check failed");
        return Err(AppError::forbidden("Forbidden"));
    }
    Ok(())
}

/// Looks the caller up and checks the stored role. Reads only.
pub async fn require_role(users: &dyn IdentityStore, auth: &AuthContext, role: Role) -> Result<User, AppError> {
    match users.find_by_email(&auth.email).await? {
        Some(user) if user.role == role => Ok(user),
        _ => {
            tracing::warn!(caller = %auth.email, required = %role, "role check failed");
            Err(AppError::forbidden("Unauthorized"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryIdentityStore;
    use crate::test_support::{auth_for, new_user};

    #[test]
    fn self_check_compares_emails() {
        let auth = auth_for("a@x.com");
        assert!(require_self(&auth, "a@x.com").is_ok());
        assert!(matches!(require_self(&auth, "b@x.com"), Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn role_check_is_repeatable() {
        let users = MemoryIdentityStore::new();
        users.create_user(new_user("a@x.com", Role::User)).await.unwrap();
        let auth = auth_for("a@x.com");

        for _ in 0..2 {
            let res = require_role(&users, &auth, Role::Admin).await;
            assert!(matches!(res, Err(AppError::Forbidden(_))));
        }
        assert_eq!(users.find_by_email("a@x.com").await.unwrap().unwrap().role, Role::User);
    }

    #[tokio::test]
    async fn unknown_caller_is_forbidden() {
        let users = MemoryIdentityStore::new();
        let res = require_role(&users, &auth_for("ghost@x.com"), Role::Deliveryman).await;
        assert!(matches!(res, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn matching_role_yields_record() {
        let users = MemoryIdentityStore::new();
        users.create_user(new_user("d@x.com", Role::Deliveryman)).await.unwrap();
        let user = require_role(&users, &auth_for("d@x.com"), Role::Deliveryman).await.unwrap();
        assert_eq!(user.email, "d@x.com");
    }
}
