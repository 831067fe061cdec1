//! DTOs for decoding the auth service's user payload.

use serde::Deserialize;

use crate::domain::ports::IdentityClaims;

#[derive(Debug, Deserialize)]
pub(super) struct AuthUserDto {
    pub(super) id: String,
    pub(super) email: Option<String>,
    #[serde(default)]
    pub(super) app_metadata: AppMetadataDto,
    #[serde(default)]
    pub(super) user_metadata: UserMetadataDto,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct AppMetadataDto {
    pub(super) role: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct UserMetadataDto {
    pub(super) name: Option<String>,
}

impl AuthUserDto {
    pub(super) fn into_claims(self) -> IdentityClaims {
        IdentityClaims {
            user_id: self.id,
            email: self.email,
            role: self.app_metadata.role,
            name: self.user_metadata.name,
        }
    }
}
