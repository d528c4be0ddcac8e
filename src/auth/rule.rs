use std::fmt;

use uuid::Uuid;

use super::Claims;
use crate::services::user::UserRole;

/// Named authorization policies applied by the route binders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Any authenticated admin or user.
    Any,
    AdminOnly,
    UserOnly,
    /// Admins, or users acting on a resource they own.
    AdminOrSubject,
}

impl Rule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rule::Any => "any",
            Rule::AdminOnly => "admin_only",
            Rule::UserOnly => "user_only",
            Rule::AdminOrSubject => "admin_or_subject",
        }
    }

    pub fn evaluate(&self, claims: &Claims, owner: Option<Uuid>) -> bool {
        let admin = claims.has_role(UserRole::Admin);
        let user = claims.has_role(UserRole::User);

        match self {
            Rule::Any => admin || user,
            Rule::AdminOnly => admin,
            Rule::UserOnly => user,
            Rule::AdminOrSubject => admin || (user && owner == Some(claims.sub)),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(roles: Vec<UserRole>) -> Claims {
        Claims {
            sub: Uuid::new_v4(),
            iss: "test".to_string(),
            iat: 0,
            exp: 0,
            roles,
        }
    }

    #[test]
    fn any_requires_a_known_role() {
        assert!(Rule::Any.evaluate(&claims(vec![UserRole::User]), None));
        assert!(Rule::Any.evaluate(&claims(vec![UserRole::Admin]), None));
        assert!(!Rule::Any.evaluate(&claims(vec![]), None));
    }

    #[test]
    fn admin_only_and_user_only_are_exclusive() {
        let admin = claims(vec![UserRole::Admin]);
        let user = claims(vec![UserRole::User]);
        assert!(Rule::AdminOnly.evaluate(&admin, None));
        assert!(!Rule::AdminOnly.evaluate(&user, None));
        assert!(Rule::UserOnly.evaluate(&user, None));
        assert!(!Rule::UserOnly.evaluate(&admin, None));
    }

    #[test]
    fn subject_must_own_the_resource() {
        let user = claims(vec![UserRole::User]);
        assert!(Rule::AdminOrSubject.evaluate(&user, Some(user.sub)));
        assert!(!Rule::AdminOrSubject.evaluate(&user, Some(Uuid::new_v4())));
        assert!(!Rule::AdminOrSubject.evaluate(&user, None));

        let admin = claims(vec![UserRole::Admin]);
        assert!(Rule::AdminOrSubject.evaluate(&admin, Some(Uuid::new_v4())));
        assert!(Rule::AdminOrSubject.evaluate(&admin, None));
    }
}
