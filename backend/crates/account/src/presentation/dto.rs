//! API DTOs (Data Transfer Objects)

use axum::extract::Multipart;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::application::{UpdateProfileInput, UpdateProfileOutput};
use crate::domain::value_object::approval::{AccountStatus, FirstLogin};
use crate::error::{AccountError, AccountResult};

// ============================================================================
// Profile Information
// ============================================================================

/// Profile update response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileResponse {
    /// Acknowledgment to flash on the login page
    pub message: &'static str,
    /// Route the client should navigate to
    pub redirect: &'static str,
    pub verification_sent: bool,
    pub status: AccountStatus,
    pub first_login: FirstLogin,
}

impl From<UpdateProfileOutput> for UpdateProfileResponse {
    fn from(output: UpdateProfileOutput) -> Self {
        Self {
            message: output.acknowledgment,
            redirect: output.redirect.as_str(),
            verification_sent: output.verification_sent,
            status: output.status,
            first_login: output.first_login,
        }
    }
}

fn multipart_error(e: MultipartError) -> AccountError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AccountError::PayloadTooLarge
    } else {
        AccountError::BadRequest(e.body_text())
    }
}

/// Read the `multipart/form-data` profile form
///
/// Unknown parts are skipped. An empty `photo` part means no upload.
pub async fn read_profile_form(mut multipart: Multipart) -> AccountResult<UpdateProfileInput> {
    let mut input = UpdateProfileInput::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        let slot = match name.as_str() {
            "photo" => {
                let bytes = field.bytes().await.map_err(multipart_error)?;
                input.photo = (!bytes.is_empty()).then(|| bytes.to_vec());
                continue;
            }
            "firstname" => &mut input.firstname,
            "middlename" => &mut input.middlename,
            "lastname" => &mut input.lastname,
            "username" => &mut input.username,
            "email" => &mut input.email,
            "landlinetel" => &mut input.landlinetel,
            "mobiletel" => &mut input.mobiletel,
            "first_login" => &mut input.first_login,
            _ => continue,
        };
        *slot = Some(field.text().await.map_err(multipart_error)?);
    }

    Ok(input)
}

// ============================================================================
// Email Verification
// ============================================================================

/// Query string of a verification link
#[derive(Debug, Clone, Deserialize)]
pub struct VerifyEmailQuery {
    pub expires: i64,
    pub signature: String,
}
