use axum::body::Bytes;
use axum::extract::rejection::{FormRejection, JsonRejection};
use axum::extract::{Form, FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use axum::Json;
use image::DynamicImage;
use serde::Deserialize;

use crate::codec;
use crate::error::{OcrApiError, Result};
use crate::ocr::OcrToggles;

const MISSING_IMAGE: &str = "When sending a post request, data or files must have a value.";

fn parse_form_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Blank strings count as "not sent".
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// A scalar form value. JSON bodies may send real booleans or numbers.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum FormValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

fn toggle(name: &str, value: Option<FormValue>) -> Result<Option<bool>> {
    let parsed = match value {
        None => return Ok(None),
        Some(FormValue::Bool(b)) => Some(b),
        Some(FormValue::Int(1)) => Some(true),
        Some(FormValue::Int(0)) => Some(false),
        Some(FormValue::Int(_)) => None,
        Some(FormValue::Text(text)) if text.trim().is_empty() => return Ok(None),
        Some(FormValue::Text(text)) => parse_form_bool(&text),
    };

    parsed.map(Some).ok_or_else(|| {
        OcrApiError::Validation(format!("{name} must be one of true/false/1/0/yes/no/on/off"))
    })
}

/// Fields of a url-encoded or JSON body.
#[derive(Debug, Default, Deserialize)]
struct RawOcrFields {
    image_data: Option<String>,
    base64_img: Option<String>,
    use_det: Option<FormValue>,
    use_cls: Option<FormValue>,
    use_rec: Option<FormValue>,
    word_box: Option<FormValue>,
}

impl RawOcrFields {
    fn into_form(self) -> Result<OcrForm> {
        Ok(OcrForm {
            image_file: None,
            image_data: non_blank(self.image_data),
            base64_img: non_blank(self.base64_img),
            toggles: OcrToggles {
                use_det: toggle("use_det", self.use_det)?,
                use_cls: toggle("use_cls", self.use_cls)?,
                use_rec: toggle("use_rec", self.use_rec)?,
                return_word_box: toggle("word_box", self.word_box)?,
            },
        })
    }
}

/// Where the image came from.
#[derive(Debug, Clone)]
pub enum ImageInput {
    Upload(Bytes),
    Base64(String),
}

impl ImageInput {
    pub fn decode(&self) -> Result<DynamicImage> {
        match self {
            ImageInput::Upload(bytes) => codec::decode_image(bytes),
            ImageInput::Base64(data) => codec::decode_base64_image(data),
        }
    }
}

/// Body of the recognition endpoints, accepted as `multipart/form-data`,
/// `application/x-www-form-urlencoded` or `application/json`.
#[derive(Debug, Default)]
pub struct OcrForm {
    pub image_file: Option<Bytes>,
    pub image_data: Option<String>,
    pub base64_img: Option<String>,
    pub toggles: OcrToggles,
}

impl OcrForm {
    /// The image to recognize: `image_file`, then `image_data`, then (when
    /// `accept_base64_img` is set) `base64_img`.
    pub fn take_image(&mut self, accept_base64_img: bool) -> Result<ImageInput> {
        if let Some(bytes) = self.image_file.take() {
            return Ok(ImageInput::Upload(bytes));
        }
        if let Some(data) = self.image_data.take() {
            return Ok(ImageInput::Base64(data));
        }
        if accept_base64_img {
            if let Some(data) = self.base64_img.take() {
                return Ok(ImageInput::Base64(data));
            }
        }
        Err(OcrApiError::Validation(MISSING_IMAGE.to_string()))
    }

    async fn from_multipart(mut multipart: Multipart) -> Result<Self> {
        let mut form = OcrForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| OcrApiError::Validation(format!("Invalid multipart body: {e}")))?
        {
            let name = field.name().unwrap_or("").to_string();

            match name.as_str() {
                "image_file" => {
                    let bytes = field.bytes().await.map_err(|e| {
                        OcrApiError::Validation(format!("Failed to read image_file: {e}"))
                    })?;
                    if !bytes.is_empty() {
                        form.image_file = Some(bytes);
                    }
                }
                "image_data" | "base64_img" | "use_det" | "use_cls" | "use_rec" | "word_box" => {
                    let text = field.text().await.map_err(|e| {
                        OcrApiError::Validation(format!("Invalid {name} value: {e}"))
                    })?;
                    form.set_text_field(&name, text)?;
                }
                _ => {}
            }
        }

        Ok(form)
    }

    fn set_text_field(&mut self, name: &str, text: String) -> Result<()> {
        match name {
            "image_data" => self.image_data = non_blank(Some(text)),
            "base64_img" => self.base64_img = non_blank(Some(text)),
            "use_det" => self.toggles.use_det = toggle(name, Some(FormValue::Text(text)))?,
            "use_cls" => self.toggles.use_cls = toggle(name, Some(FormValue::Text(text)))?,
            "use_rec" => self.toggles.use_rec = toggle(name, Some(FormValue::Text(text)))?,
            "word_box" => {
                self.toggles.return_word_box = toggle(name, Some(FormValue::Text(text)))?
            }
            _ => {}
        }
        Ok(())
    }
}

fn map_form_rejection(rejection: FormRejection) -> OcrApiError {
    OcrApiError::Validation(format!("Invalid form body: {}", rejection.body_text()))
}

fn map_json_rejection(rejection: JsonRejection) -> OcrApiError {
    match rejection {
        JsonRejection::JsonSyntaxError(err) => {
            OcrApiError::Validation(format!("JSON syntax error: {err}"))
        }
        JsonRejection::JsonDataError(err) => {
            OcrApiError::Validation(format!("Invalid JSON: {err}"))
        }
        _ => OcrApiError::Validation(rejection.body_text()),
    }
}

impl<S> FromRequest<S> for OcrForm
where
    S: Send + Sync,
{
    type Rejection = OcrApiError;

    async fn from_request(req: Request, state: &S) -> std::result::Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| OcrApiError::Validation(e.body_text()))?;
            return Self::from_multipart(multipart).await;
        }

        if content_type.starts_with("application/json") {
            let Json(raw) = Json::<RawOcrFields>::from_request(req, state)
                .await
                .map_err(map_json_rejection)?;
            return raw.into_form();
        }

        if content_type.is_empty() {
            return Ok(OcrForm::default());
        }

        let Form(raw) = Form::<RawOcrFields>::from_request(req, state)
            .await
            .map_err(map_form_rejection)?;
        raw.into_form()
    }
}
