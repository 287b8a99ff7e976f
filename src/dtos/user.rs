use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::{NewUser, ProfileUpdate, Role, UserId};
use crate::store::{InsertOutcome, Page};

/// Signup body. Every field is optional here so a missing one is reported
/// as a failed write rather than a body rejection.
#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub image: Option<String>,
    pub phone: Option<String>,
}

impl CreateUserRequest {
    /// `None` when a required field is absent or blank, or the role is not
    /// one a signup may claim.
    pub fn into_new_user(self) -> Option<NewUser> {
        let role = match self.role.as_deref() {
            None => Role::User,
            Some(raw) => match raw.parse::<Role>().ok()? {
                Role::Admin => return None,
                role => role,
            },
        };
        Some(NewUser {
            name: present(self.name)?,
            email: present(self.email)?,
            role,
            image: Some(present(self.image)?),
            phone: Some(present(self.phone)?),
        })
    }
}

fn present(field: Option<String>) -> Option<String> {
    field.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

#[derive(Deserialize)]
pub struct SocialLoginRequest {
    pub name: Option<String>,
    pub email: String,
    pub image: Option<String>,
    pub phone: Option<String>,
}

impl SocialLoginRequest {
    /// `None` when the email is blank. A missing name falls back to the email.
    pub fn into_new_user(self) -> Option<NewUser> {
        let email = present(Some(self.email))?;
        Some(NewUser {
            name: present(self.name).unwrap_or_else(|| email.clone()),
            email,
            role: Role::User,
            image: self.image,
            phone: self.phone,
        })
    }
}

#[derive(Serialize)]
#[serde(untagged)]
pub enum SocialLoginResponse {
    Created(InsertOutcome<UserId>),
    Exists(MessageResponse),
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub image: Option<String>,
    pub booking_count: Option<i64>,
    pub total_payment: Option<f64>,
    pub parcel_delivered: Option<i64>,
    pub role: Option<Role>,
}

impl UpdateUserRequest {
    pub fn into_parts(self) -> (ProfileUpdate, Option<Role>) {
        (
            ProfileUpdate {
                image: self.image,
                booking_count: self.booking_count,
                total_payment: self.total_payment,
                parcel_delivered: self.parcel_delivered,
            },
            self.role,
        )
    }
}

#[derive(Deserialize, Default)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl TryFrom<PageQuery> for Page {
    type Error = AppError;

    fn try_from(q: PageQuery) -> Result<Self, Self::Error> {
        let page = q.page.unwrap_or(0);
        if page < 0 || q.limit.is_some_and(|limit| limit < 0) {
            return Err(AppError::validation("page and limit must not be negative"));
        }
        Ok(Page { page, limit: q.limit })
    }
}

#[derive(Serialize)]
pub struct RoleStatus {
    pub admin: bool,
    pub deliveryman: bool,
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full() -> CreateUserRequest {
        CreateUserRequest {
            name: Some("Ann".into()),
            email: Some("a@x.com".into()),
            role: None,
            image: Some("https://img/a.png".into()),
            phone: Some("0123".into()),
        }
    }

    #[test]
    fn role_defaults_to_user() {
        assert_eq!(full().into_new_user().unwrap().role, Role::User);
    }

    #[test]
    fn missing_field_is_rejected() {
        let req = CreateUserRequest { phone: None, ..full() };
        assert!(req.into_new_user().is_none());
        let req = CreateUserRequest { name: Some("  ".into()), ..full() };
        assert!(req.into_new_user().is_none());
    }

    #[test]
    fn signup_cannot_claim_admin() {
        let req = CreateUserRequest { role: Some("admin".into()), ..full() };
        assert!(req.into_new_user().is_none());
        let req = CreateUserRequest { role: Some("deliveryman".into()), ..full() };
        assert_eq!(req.into_new_user().unwrap().role, Role::Deliveryman);
    }

    #[test]
    fn social_login_needs_an_email() {
        let req = SocialLoginRequest { name: None, email: "   ".into(), image: None, phone: None };
        assert!(req.into_new_user().is_none());

        let req = SocialLoginRequest { name: None, email: " a@x.com ".into(), image: None, phone: None };
        let user = req.into_new_user().unwrap();
        assert_eq!(user.email, "a@x.com");
        assert_eq!(user.name, "a@x.com");
    }

    #[test]
    fn negative_paging_is_rejected() {
        let page = Page::try_from(PageQuery { page: Some(1), limit: Some(2) }).unwrap();
        assert_eq!(page.offset(), 2);
        assert!(Page::try_from(PageQuery { page: None, limit: Some(-2) }).is_err());
        assert!(Page::try_from(PageQuery { page: Some(-1), limit: None }).is_err());
    }
}
