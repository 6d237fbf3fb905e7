//! Error taxonomy for the button flows.
//!
//! Only host-reported rejections get first-class handling (they carry the
//! buyer-facing messages); everything below the host-response layer is
//! surfaced to the SDK's own error handling as a rejected promise.

use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ButtonError {
    /// The host rejected the session-start request and reported
    /// buyer-facing validation messages.
    #[error("checkout rejected by the store: {0:?}")]
    Rejected(Vec<String>),

    /// The host response did not match either accepted shape.
    #[error("unexpected session-start response: {0}")]
    Response(String),

    /// The request never produced a usable host response.
    #[error("session-start request failed: {0}")]
    Request(String),

    /// A JavaScript call threw or a promise rejected.
    #[error("javascript error: {0}")]
    Js(String),

    /// A payment attempt is already running on this button.
    #[error("payment attempt already in flight")]
    InFlight,
}

impl ButtonError {
    /// Whether the flow already recovered by handing control back to the
    /// host's own form submission pipeline.
    pub fn is_recovered(&self) -> bool {
        matches!(self, ButtonError::Rejected(_))
    }

    pub(crate) fn from_js(value: JsValue) -> Self {
        let message = value
            .as_string()
            .unwrap_or_else(|| format!("{value:?}"));
        ButtonError::Js(message)
    }
}

impl From<ButtonError> for JsValue {
    fn from(err: ButtonError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}
