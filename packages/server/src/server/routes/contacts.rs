//! Contact CRUD and search endpoints.
//!
//! Handlers are thin: parse the request, run the pure validation layer,
//! hand validated input to the repository, wrap the result in the response
//! envelope. Every failure path goes through `ApiError`.

use std::collections::HashMap;

use axum::extract::{Extension, Path, Query};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::PgPool;

use crate::common::pagination::{self, PageEnvelope, PageParams};
use crate::common::{ApiError, ContactId};
use crate::domains::contacts::models::contact::like_pattern;
use crate::domains::contacts::models::{Contact, ContactChanges, NewContact, Telephone};
use crate::domains::contacts::validation::validate_numbers;
use crate::server::app::AppState;
use crate::server::middleware::AuthUser;

/// JSON representation of a telephone: just the number.
#[derive(Debug, Serialize, Deserialize)]
pub struct TelephoneBody {
    pub number: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateContactRequest {
    name: Option<String>,
    address_line_1: Option<String>,
    address_line_2: Option<String>,
    city: Option<String>,
    country: Option<String>,
    postcode: Option<String>,
    telephones: Option<Vec<TelephoneBody>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateContactRequest {
    name: Option<String>,
    address_line_1: Option<String>,
    address_line_2: Option<String>,
    city: Option<String>,
    country: Option<String>,
    postcode: Option<String>,
    telephones: Option<Vec<TelephoneBody>>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    q: Option<String>,
    page: Option<u32>,
    page_size: Option<u32>,
}

/// GET /contacts
pub async fn list_contacts_handler(
    user: AuthUser,
    Extension(state): Extension<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Json<PageEnvelope<ContactPayload>>, ApiError> {
    let page = params.resolve();

    let count = Contact::count_for_user(user.user_id, &state.db_pool).await?;
    if page.is_past_end(count) {
        return Err(ApiError::NotFound("Invalid page.".to_string()));
    }

    let contacts = Contact::list_for_user(user.user_id, page, &state.db_pool).await?;
    let results = attach_telephones(contacts, &state.db_pool).await?;

    Ok(Json(pagination::envelope(
        "/contacts",
        &[],
        page,
        count,
        results,
    )))
}

/// POST /contacts
pub async fn create_contact_handler(
    user: AuthUser,
    Extension(state): Extension<AppState>,
    Json(body): Json<CreateContactRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let input = validate_create(body)?;

    let (contact, telephones) = Contact::create(user.user_id, input, &state.db_pool).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Contact created successfully",
            "contact": ContactPayload::from_parts(contact, telephones),
        })),
    ))
}

/// PUT /contacts/{id}
pub async fn update_contact_handler(
    user: AuthUser,
    Extension(state): Extension<AppState>,
    Path(contact_id): Path<ContactId>,
    Json(body): Json<UpdateContactRequest>,
) -> Result<Json<Value>, ApiError> {
    let changes = validate_update(body)?;

    match Contact::update(user.user_id, contact_id, changes, &state.db_pool).await? {
        Some((contact, telephones)) => Ok(Json(json!({
            "message": "Contact updated successfully",
            "contact": ContactPayload::from_parts(contact, telephones),
        }))),
        None => Err(ApiError::NotFound(
            "Contact not found or you do not have permission to update it.".to_string(),
        )),
    }
}

/// DELETE /contacts/{id}
pub async fn delete_contact_handler(
    user: AuthUser,
    Extension(state): Extension<AppState>,
    Path(contact_id): Path<ContactId>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    if Contact::delete(user.user_id, contact_id, &state.db_pool).await? {
        Ok((
            StatusCode::NO_CONTENT,
            Json(json!({ "message": "Contact deleted successfully" })),
        ))
    } else {
        Err(ApiError::NotFound(
            "Contact not found or you do not have permission to delete it.".to_string(),
        ))
    }
}

/// GET /contacts/search
pub async fn search_contacts_handler(
    user: AuthUser,
    Extension(state): Extension<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<PageEnvelope<ContactPayload>>, ApiError> {
    let query = params.q.as_deref().map(str::trim).unwrap_or_default();
    if query.is_empty() {
        return Err(ApiError::request_validation("Search query is required."));
    }

    let page = PageParams {
        page: params.page,
        page_size: params.page_size,
    }
    .resolve();
    let pattern = like_pattern(query);

    let count = Contact::search_count(user.user_id, &pattern, &state.db_pool).await?;
    if page.is_past_end(count) {
        return Err(ApiError::NotFound("Invalid page.".to_string()));
    }

    let contacts = Contact::search_for_user(user.user_id, &pattern, page, &state.db_pool).await?;
    let results = attach_telephones(contacts, &state.db_pool).await?;

    Ok(Json(pagination::envelope(
        "/contacts/search",
        &[("q", query)],
        page,
        count,
        results,
    )))
}

// ============================================================================
// Request validation
// ============================================================================

fn validate_create(body: CreateContactRequest) -> Result<NewContact, ApiError> {
    let name = require_name(body.name)?;
    let numbers = match body.telephones {
        Some(telephones) => collect_numbers(telephones)?,
        None => {
            return Err(ApiError::field_validation(
                "telephones",
                "This field is required.",
            ))
        }
    };
    let telephones = validate_numbers(&numbers).map_err(ApiError::from)?;

    check_len("address_line_1", &body.address_line_1, 255)?;
    check_len("address_line_2", &body.address_line_2, 255)?;
    check_len("city", &body.city, 100)?;
    check_len("country", &body.country, 100)?;
    check_len("postcode", &body.postcode, 20)?;

    Ok(NewContact {
        name,
        address_line_1: body.address_line_1,
        address_line_2: body.address_line_2,
        city: body.city,
        country: body.country,
        postcode: body.postcode,
        telephones,
    })
}

fn validate_update(body: UpdateContactRequest) -> Result<ContactChanges, ApiError> {
    let name = body.name.map(require_name_value).transpose()?;
    let telephones = body
        .telephones
        .map(|telephones| {
            let numbers = collect_numbers(telephones)?;
            validate_numbers(&numbers).map_err(ApiError::from)
        })
        .transpose()?;

    check_len("address_line_1", &body.address_line_1, 255)?;
    check_len("address_line_2", &body.address_line_2, 255)?;
    check_len("city", &body.city, 100)?;
    check_len("country", &body.country, 100)?;
    check_len("postcode", &body.postcode, 20)?;

    Ok(ContactChanges {
        name,
        address_line_1: body.address_line_1,
        address_line_2: body.address_line_2,
        city: body.city,
        country: body.country,
        postcode: body.postcode,
        telephones,
    })
}

fn require_name(value: Option<String>) -> Result<String, ApiError> {
    match value {
        Some(value) => require_name_value(value),
        None => Err(ApiError::field_validation("name", "This field is required.")),
    }
}

fn require_name_value(value: String) -> Result<String, ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::field_validation(
            "name",
            "This field may not be blank.",
        ));
    }
    if value.chars().count() > 255 {
        return Err(ApiError::field_validation(
            "name",
            "Ensure this field has no more than 255 characters.",
        ));
    }
    Ok(value)
}

fn collect_numbers(telephones: Vec<TelephoneBody>) -> Result<Vec<String>, ApiError> {
    telephones
        .into_iter()
        .map(|t| {
            t.number.ok_or_else(|| {
                ApiError::field_validation("telephones", "This field is required.")
            })
        })
        .collect()
}

fn check_len(field: &str, value: &Option<String>, max: usize) -> Result<(), ApiError> {
    match value {
        Some(value) if value.chars().count() > max => Err(ApiError::field_validation(
            field,
            &format!("Ensure this field has no more than {max} characters."),
        )),
        _ => Ok(()),
    }
}

// ============================================================================
// Response payloads
// ============================================================================

/// Contact representation shared by create, update, list, and search.
#[derive(Debug, Serialize)]
pub struct ContactPayload {
    pub id: ContactId,
    pub name: String,
    pub address_line_1: Option<String>,
    pub address_line_2: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub postcode: Option<String>,
    pub telephones: Vec<TelephonePayload>,
}

#[derive(Debug, Serialize)]
pub struct TelephonePayload {
    pub number: String,
}

impl ContactPayload {
    fn from_parts(contact: Contact, telephones: Vec<Telephone>) -> Self {
        Self {
            id: contact.id,
            name: contact.name,
            address_line_1: contact.address_line_1,
            address_line_2: contact.address_line_2,
            city: contact.city,
            country: contact.country,
            postcode: contact.postcode,
            telephones: telephones
                .into_iter()
                .map(|t| TelephonePayload { number: t.number })
                .collect(),
        }
    }
}

/// Load the telephones for a page of contacts in one query and pair them up,
/// preserving contact order.
async fn attach_telephones(
    contacts: Vec<Contact>,
    pool: &PgPool,
) -> Result<Vec<ContactPayload>, sqlx::Error> {
    let ids: Vec<ContactId> = contacts.iter().map(|c| c.id).collect();
    let mut by_contact: HashMap<ContactId, Vec<Telephone>> = HashMap::new();
    for telephone in Telephone::for_contacts(&ids, pool).await? {
        by_contact
            .entry(telephone.contact_id)
            .or_default()
            .push(telephone);
    }

    Ok(contacts
        .into_iter()
        .map(|contact| {
            let telephones = by_contact.remove(&contact.id).unwrap_or_default();
            ContactPayload::from_parts(contact, telephones)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_body(name: Option<&str>, numbers: &[&str]) -> CreateContactRequest {
        CreateContactRequest {
            name: name.map(String::from),
            address_line_1: None,
            address_line_2: None,
            city: None,
            country: None,
            postcode: None,
            telephones: Some(
                numbers
                    .iter()
                    .map(|n| TelephoneBody {
                        number: Some((*n).to_string()),
                    })
                    .collect(),
            ),
        }
    }

    #[test]
    fn test_validate_create_ok() {
        let input = validate_create(create_body(Some("John Doe"), &["+123456789"])).unwrap();
        assert_eq!(input.name, "John Doe");
        assert_eq!(input.telephones, vec!["+123456789".to_string()]);
    }

    #[test]
    fn test_validate_create_missing_name() {
        let err = validate_create(create_body(None, &["+123456789"])).unwrap_err();
        assert!(matches!(err, ApiError::Validation(m) if m.starts_with("name,")));
    }

    #[test]
    fn test_validate_create_missing_telephones_key() {
        let mut body = create_body(Some("John Doe"), &[]);
        body.telephones = None;
        let err = validate_create(body).unwrap_err();
        assert!(matches!(err, ApiError::Validation(m) if m.starts_with("telephones,")));
    }

    #[test]
    fn test_validate_create_duplicate_numbers() {
        let err =
            validate_create(create_body(Some("John Doe"), &["+111111111", "+111111111"]))
                .unwrap_err();
        assert!(matches!(
            err,
            ApiError::Validation(m)
                if m == "telephones, duplicate telephone numbers are not allowed in the same request."
        ));
    }

    #[test]
    fn test_validate_update_all_optional() {
        let changes = validate_update(UpdateContactRequest {
            name: None,
            address_line_1: None,
            address_line_2: None,
            city: None,
            country: None,
            postcode: None,
            telephones: None,
        })
        .unwrap();
        assert!(changes.name.is_none());
        assert!(changes.telephones.is_none());
    }

    #[test]
    fn test_validate_update_blank_name_rejected() {
        let err = validate_update(UpdateContactRequest {
            name: Some("   ".to_string()),
            address_line_1: None,
            address_line_2: None,
            city: None,
            country: None,
            postcode: None,
            telephones: None,
        })
        .unwrap_err();
        assert!(matches!(err, ApiError::Validation(m) if m.starts_with("name,")));
    }

    #[test]
    fn test_check_len_caps_scalar_fields() {
        let long = Some("x".repeat(101));
        let err = check_len("city", &long, 100).unwrap_err();
        assert!(matches!(
            err,
            ApiError::Validation(m)
                if m == "city, ensure this field has no more than 100 characters."
        ));
    }
}
