//! Entity to DTO mappers
//!
//! Implements `From` conversions from domain entities to response DTOs.

use shop_core::{DirectoryEntry, RevokeOutcome, TokenSubject, User, UserListQuery, UserPage};

use super::responses::{InternalUserResponse, RevokeTokenResponse, UserListResponse, UserResponse};

// ============================================================================
// User Mappers
// ============================================================================

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            role: user.role,
            status: user.status,
            last_login_at: user.last_login_at,
            deleted_at: user.deleted_at,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self::from(&user)
    }
}

impl From<&User> for InternalUserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            role: user.role,
            status: user.status,
        }
    }
}

impl From<InternalUserResponse> for DirectoryEntry {
    fn from(user: InternalUserResponse) -> Self {
        Self {
            subject: TokenSubject {
                id: user.id,
                email: user.email,
                role: user.role,
            },
            status: user.status,
        }
    }
}

impl UserListResponse {
    pub fn from_page(page: UserPage, query: &UserListQuery) -> Self {
        Self {
            users: page.users.iter().map(UserResponse::from).collect(),
            page: query.page,
            limit: query.limit,
            total: page.total,
        }
    }
}

// ============================================================================
// Token Mappers
// ============================================================================

impl From<RevokeOutcome> for RevokeTokenResponse {
    fn from(outcome: RevokeOutcome) -> Self {
        Self {
            outcome: outcome.code().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shop_core::{UserRole, UserStatus};

    #[test]
    fn test_internal_user_into_directory_entry() {
        let mut user = User::new("a@x.com".to_string(), "Alice".to_string());
        user.role = UserRole::Admin;
        user.status = UserStatus::Blocked;

        let entry: DirectoryEntry = InternalUserResponse::from(&user).into();
        assert_eq!(entry.subject, user.subject());
        assert_eq!(entry.status, UserStatus::Blocked);
    }

    #[test]
    fn test_user_response_omits_deleted_at_when_absent() {
        let user = User::new("a@x.com".to_string(), "Alice".to_string());
        let json = serde_json::to_value(UserResponse::from(&user)).unwrap();
        assert_eq!(json["fullName"], "Alice");
        assert!(json.get("deletedAt").is_none());
        assert!(json.get("passwordHash").is_none());
    }

    #[test]
    fn test_revoke_outcome_codes() {
        let response = RevokeTokenResponse::from(RevokeOutcome::AlreadyRevoked);
        assert_eq!(response.outcome, "TOKEN_ALREADY_REVOKED");
    }
}
