//! OpenAPI document assembled from the schema-bearing DTOs.

use utoipa::OpenApi;

use crate::models::user::{LoginRequest, LoginResponse, UserResponse};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Presensi API",
        description = "Employee attendance, scheduling, and leave/overtime approvals."
    ),
    components(schemas(LoginRequest, LoginResponse, UserResponse))
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_builds() {
        let doc = ApiDoc::openapi();
        assert!(doc.components.is_some());
    }
}
