//! Request-shape normalization: one submission out of either a JSON body or
//! a multipart form carrying JSON-encoded text fields plus an optional file.

use axum::{
    body::Bytes,
    extract::{FromRequest, Multipart, Request},
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::AppError;

/// Multipart field that carries the uploaded attachment.
const FILE_FIELD: &str = "idCopy";

/// Free-form field map rendered into the email body. Insertion order of the
/// incoming JSON object is preserved and becomes the render order.
pub type FormData = Map<String, Value>;

/// The `paymentInfo` record. Only `type` and `reference` matter; anything
/// else the client sends alongside them is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmissionMeta {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub reference: Option<String>,
}

/// Single uploaded file, forwarded byte-for-byte on the outgoing message.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    pub content: Vec<u8>,
}

/// One normalized form submission, alive for the duration of one request.
#[derive(Debug)]
pub struct Submission {
    pub form_data: FormData,
    pub meta: SubmissionMeta,
    pub attachment: Option<Attachment>,
}

/// Body shape, resolved from the declared content type. Anything that is
/// neither JSON nor multipart is rejected outright instead of guessed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyShape {
    Json,
    Multipart,
    Unsupported,
}

impl BodyShape {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let Some(content_type) = headers
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
        else {
            return Self::Unsupported;
        };

        if content_type.starts_with("application/json") {
            Self::Json
        } else if content_type.starts_with("multipart/form-data") {
            Self::Multipart
        } else {
            Self::Unsupported
        }
    }
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonBody {
    #[serde(default)]
    form_data: FormData,
    #[serde(default)]
    payment_info: SubmissionMeta,
}

impl Submission {
    /// Parse a JSON body. Missing `formData`/`paymentInfo` members are
    /// treated as empty records; a body that is not a JSON object is not.
    pub fn from_json(bytes: &[u8]) -> Result<Self, AppError> {
        let body: JsonBody = serde_json::from_slice(bytes)
            .map_err(|err| AppError::BadRequest(format!("invalid JSON body: {err}")))?;

        Ok(Self {
            form_data: body.form_data,
            meta: body.payment_info,
            attachment: None,
        })
    }

    /// Walk a multipart stream. `formData` and `paymentInfo` are JSON text,
    /// the `idCopy` field is the attachment, unknown fields are skipped.
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form_data = FormData::new();
        let mut meta = SubmissionMeta::default();
        let mut attachment = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|err| AppError::BadRequest(format!("unreadable multipart body: {err}")))?
        {
            let name = field.name().map(str::to_owned);
            match name.as_deref() {
                Some("formData") => {
                    let text = read_text(field, "formData").await?;
                    form_data = serde_json::from_str(&text).map_err(|err| {
                        AppError::BadRequest(format!("formData is not valid JSON: {err}"))
                    })?;
                }
                Some("paymentInfo") => {
                    let text = read_text(field, "paymentInfo").await?;
                    meta = serde_json::from_str(&text).map_err(|err| {
                        AppError::BadRequest(format!("paymentInfo is not valid JSON: {err}"))
                    })?;
                }
                Some(FILE_FIELD) => {
                    let filename = field
                        .file_name()
                        .unwrap_or("attachment")
                        .to_owned();
                    let content_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_owned();
                    let content = field.bytes().await.map_err(|err| {
                        AppError::BadRequest(format!("unreadable file upload: {err}"))
                    })?;

                    attachment = Some(Attachment {
                        filename,
                        content_type,
                        content: content.to_vec(),
                    });
                }
                _ => {}
            }
        }

        Ok(Self {
            form_data,
            meta,
            attachment,
        })
    }
}

async fn read_text(
    field: axum::extract::multipart::Field<'_>,
    name: &'static str,
) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|err| AppError::BadRequest(format!("unreadable {name} field: {err}")))
}

impl<S> FromRequest<S> for Submission
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match BodyShape::from_headers(req.headers()) {
            BodyShape::Json => {
                let bytes = Bytes::from_request(req, state)
                    .await
                    .map_err(IntoResponse::into_response)?;
                Self::from_json(&bytes).map_err(IntoResponse::into_response)
            }
            BodyShape::Multipart => {
                let multipart = Multipart::from_request(req, state)
                    .await
                    .map_err(IntoResponse::into_response)?;
                Self::from_multipart(multipart)
                    .await
                    .map_err(IntoResponse::into_response)
            }
            BodyShape::Unsupported => Err(AppError::BadRequest(
                "unsupported content type; expected application/json or multipart/form-data"
                    .to_string(),
            )
            .into_response()),
        }
    }
}

/// Closed set of submission kinds the relay knows a subject line for.
/// Unknown tags fall back to the generic pair instead of erroring, so new
/// form variants degrade gracefully.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionKind {
    ContactForm,
    ExamRegistration,
    StudyAbroad,
    JobApplication,
    CanadaVisaForm,
    Other,
}

impl SubmissionKind {
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            Some("contact_form") => Self::ContactForm,
            Some("exam_registration") => Self::ExamRegistration,
            Some("study_abroad") => Self::StudyAbroad,
            Some("job_application") => Self::JobApplication,
            Some("canada_visa_form") => Self::CanadaVisaForm,
            _ => Self::Other,
        }
    }

    /// Subject line of the outgoing email.
    pub const fn subject(self) -> &'static str {
        match self {
            Self::ContactForm => "📩 New Contact Message",
            Self::ExamRegistration => "📝 New Exam Registration",
            Self::StudyAbroad => "🌍 Study Abroad Application",
            Self::JobApplication => "💼 Job Application",
            Self::CanadaVisaForm => "🇨🇦 Canada Visa Application",
            Self::Other => "📋 New Form Submission",
        }
    }

    /// Heading rendered at the top of the email body.
    pub const fn title(self) -> &'static str {
        match self {
            Self::ContactForm => "New Contact Message",
            Self::ExamRegistration => "New Exam Registration",
            Self::StudyAbroad => "Study Abroad Application",
            Self::JobApplication => "Job Application",
            Self::CanadaVisaForm => "Canada Visa Application",
            Self::Other => "New Form Submission",
        }
    }
}
