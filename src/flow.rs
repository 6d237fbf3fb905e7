//! The payment orchestration behind each rendered button.
//!
//! `PaymentFlow` owns the lifecycle of one activation: synthesize a cart
//! when needed, serialize the surrounding form, start a checkout session
//! against the store, and on approval hand control back to the host form or
//! the SDK redirect. It talks to the page exclusively through
//! [`HostGateway`] and [`AuthorizeActions`], so the browser wiring in
//! `gateway` and the test doubles below are interchangeable.

use std::cell::Cell;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::context::Placement;
use crate::error::ButtonError;

/// Shown when the store rejects a session-start without telling us why.
const GENERIC_FAILURE_MESSAGE: &str =
    "Unable to start the PayPal checkout. Please try again.";

/// Opaque identifier of an initiated checkout session, minted by the store
/// backend and consumed by the SDK's approval flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SessionToken {
    fn from(token: String) -> Self {
        Self(token)
    }
}

/// Buyer approval data delivered by the SDK's `onAuthorize` callback.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Authorization {
    #[serde(rename = "paymentToken")]
    pub payment_token: String,
    #[serde(rename = "payerID")]
    pub payer_id: String,
}

/// Everything the orchestration needs from the hosting page.
#[async_trait(?Send)]
pub trait HostGateway {
    /// Remove error markup left in the button container by a prior attempt.
    fn clear_notices(&self);

    /// Ask the host to build a cart from the current product selection.
    async fn create_cart(&self) -> Result<(), ButtonError>;

    /// Serialize the enclosing form plus the synthetic fields.
    fn collect_form_data(&self, from_checkout: bool) -> String;

    /// POST the payload to the session-start endpoint, returning the raw
    /// JSON response body.
    async fn start_checkout(&self, body: String) -> Result<Value, ButtonError>;

    /// Render host-reported validation messages.
    fn show_notices(&self, messages: &[String]);

    /// Submit the host checkout form, optionally with the authorization
    /// fields injected as hidden inputs.
    fn submit_checkout_form(&self, authorization: Option<&Authorization>);
}

/// The slice of the SDK's `onAuthorize` actions object this crate uses.
pub trait AuthorizeActions {
    /// Navigate to the confirmation URL the store supplied when the
    /// session was created.
    fn redirect(&self);
}

/// Parsed session-start response. The store historically answers in two
/// shapes depending on which backend path rejected the request, so the
/// error messages are looked up under `data.messages` first and top-level
/// `messages` second; a bare string counts as a one-element list.
#[derive(Debug, Clone, PartialEq)]
pub enum StartCheckoutResponse {
    Approved(SessionToken),
    Rejected(Vec<String>),
}

#[derive(Deserialize)]
struct RawResponse {
    success: bool,
    #[serde(default)]
    data: Option<RawData>,
    #[serde(default)]
    messages: Option<MessageList>,
}

#[derive(Deserialize)]
struct RawData {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    messages: Option<MessageList>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MessageList {
    One(String),
    Many(Vec<String>),
}

impl MessageList {
    fn into_vec(self) -> Vec<String> {
        match self {
            MessageList::One(message) => vec![message],
            MessageList::Many(messages) => messages,
        }
    }
}

impl StartCheckoutResponse {
    pub fn from_value(value: Value) -> Result<Self, ButtonError> {
        let raw: RawResponse = serde_json::from_value(value)
            .map_err(|e| ButtonError::Response(e.to_string()))?;
        if raw.success {
            let token = raw
                .data
                .and_then(|data| data.token)
                .ok_or_else(|| {
                    ButtonError::Response("success response without a session token".into())
                })?;
            Ok(StartCheckoutResponse::Approved(token.into()))
        } else {
            let messages = raw
                .data
                .and_then(|data| data.messages)
                .or(raw.messages)
                .map(MessageList::into_vec)
                .filter(|messages| !messages.is_empty())
                .unwrap_or_else(|| vec![GENERIC_FAILURE_MESSAGE.to_owned()]);
            Ok(StartCheckoutResponse::Rejected(messages))
        }
    }
}

/// One button's orchestrator.
pub struct PaymentFlow<G> {
    placement: Placement,
    gateway: G,
    in_flight: Cell<bool>,
}

impl<G: HostGateway> PaymentFlow<G> {
    pub fn new(placement: Placement, gateway: G) -> Self {
        Self {
            placement,
            gateway,
            in_flight: Cell::new(false),
        }
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    /// Run one activation through to a session token.
    ///
    /// Re-entrant activations are refused outright rather than trusting the
    /// SDK to keep the button disabled while a request is in flight.
    pub async fn begin_payment(&self) -> Result<SessionToken, ButtonError> {
        if self.in_flight.replace(true) {
            log::warn!("payment activation ignored: another attempt is in flight");
            return Err(ButtonError::InFlight);
        }
        let result = self.run_attempt().await;
        self.in_flight.set(false);
        result
    }

    async fn run_attempt(&self) -> Result<SessionToken, ButtonError> {
        self.gateway.clear_notices();

        if self.placement.is_single_product() {
            self.gateway.create_cart().await?;
        }

        let body = self
            .gateway
            .collect_form_data(self.placement.from_checkout());
        let response = self.gateway.start_checkout(body).await?;

        match StartCheckoutResponse::from_value(response)? {
            StartCheckoutResponse::Approved(token) => Ok(token),
            StartCheckoutResponse::Rejected(messages) => {
                self.gateway.show_notices(&messages);
                // Recovery path: the host form re-runs server-side
                // validation and renders errors through its own pipeline.
                self.gateway.submit_checkout_form(None);
                Err(ButtonError::Rejected(messages))
            }
        }
    }

    /// Buyer approved in the SDK flow. Checkout-page placements defer order
    /// placement to the host form; every other placement navigates to the
    /// confirmation URL via the SDK.
    pub fn authorize(&self, authorization: &Authorization, actions: &impl AuthorizeActions) {
        if self.placement.from_checkout() {
            self.gateway.submit_checkout_form(Some(authorization));
        } else {
            actions.redirect();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Page;
    use futures::executor::block_on;
    use serde_json::json;
    use std::cell::RefCell;

    struct RecordingGateway {
        calls: RefCell<Vec<String>>,
        response: Value,
    }

    impl RecordingGateway {
        fn new(response: Value) -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                response,
            }
        }

        fn record(&self, call: impl Into<String>) {
            self.calls.borrow_mut().push(call.into());
        }

        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }
    }

    #[async_trait(?Send)]
    impl HostGateway for RecordingGateway {
        fn clear_notices(&self) {
            self.record("clear_notices");
        }

        async fn create_cart(&self) -> Result<(), ButtonError> {
            self.record("create_cart");
            Ok(())
        }

        fn collect_form_data(&self, from_checkout: bool) -> String {
            self.record(format!("collect_form_data({from_checkout})"));
            format!("nonce=n&from_checkout={}", if from_checkout { "yes" } else { "no" })
        }

        async fn start_checkout(&self, _body: String) -> Result<Value, ButtonError> {
            self.record("start_checkout");
            Ok(self.response.clone())
        }

        fn show_notices(&self, messages: &[String]) {
            self.record(format!("show_notices({})", messages.join("|")));
        }

        fn submit_checkout_form(&self, authorization: Option<&Authorization>) {
            match authorization {
                Some(auth) => self.record(format!(
                    "submit_checkout_form({},{})",
                    auth.payment_token, auth.payer_id
                )),
                None => self.record("submit_checkout_form"),
            }
        }
    }

    struct RedirectRecorder {
        redirected: Cell<bool>,
    }

    impl RedirectRecorder {
        fn new() -> Self {
            Self {
                redirected: Cell::new(false),
            }
        }
    }

    impl AuthorizeActions for RedirectRecorder {
        fn redirect(&self) {
            self.redirected.set(true);
        }
    }

    fn approved() -> Value {
        json!({ "success": true, "data": { "token": "EC-7PX12345" } })
    }

    fn flow(page: Page, response: Value) -> PaymentFlow<RecordingGateway> {
        PaymentFlow::new(
            Placement::on_page(Some(page)),
            RecordingGateway::new(response),
        )
    }

    #[test]
    fn product_page_creates_a_cart_before_starting_the_session() {
        let flow = flow(Page::Product, approved());
        let token = block_on(flow.begin_payment()).expect("approved");
        assert_eq!(token.as_str(), "EC-7PX12345");
        assert_eq!(
            flow.gateway.calls(),
            vec![
                "clear_notices",
                "create_cart",
                "collect_form_data(false)",
                "start_checkout",
            ]
        );
    }

    #[test]
    fn cart_page_skips_cart_synthesis() {
        let flow = flow(Page::Cart, approved());
        block_on(flow.begin_payment()).expect("approved");
        assert_eq!(
            flow.gateway.calls(),
            vec!["clear_notices", "collect_form_data(false)", "start_checkout"]
        );
    }

    #[test]
    fn mini_cart_on_a_product_page_does_not_synthesize_a_cart() {
        let flow = PaymentFlow::new(
            Placement::mini_cart(Some(Page::Product)),
            RecordingGateway::new(approved()),
        );
        block_on(flow.begin_payment()).expect("approved");
        assert!(!flow.gateway.calls().contains(&"create_cart".to_owned()));
    }

    #[test]
    fn checkout_page_collects_with_the_origin_flag_set() {
        let flow = flow(Page::Checkout, approved());
        block_on(flow.begin_payment()).expect("approved");
        assert!(flow
            .gateway
            .calls()
            .contains(&"collect_form_data(true)".to_owned()));
    }

    #[test]
    fn rejection_shows_notices_then_falls_back_to_the_host_form() {
        let flow = flow(
            Page::Checkout,
            json!({ "success": false, "data": { "messages": "Invalid postcode" } }),
        );
        let err = block_on(flow.begin_payment()).expect_err("rejected");
        assert_eq!(err, ButtonError::Rejected(vec!["Invalid postcode".into()]));
        assert_eq!(
            flow.gateway.calls()[3..],
            [
                "show_notices(Invalid postcode)".to_owned(),
                "submit_checkout_form".to_owned(),
            ]
        );
    }

    #[test]
    fn the_in_flight_flag_resets_after_each_attempt() {
        let flow = flow(Page::Cart, approved());
        block_on(flow.begin_payment()).expect("first attempt");
        block_on(flow.begin_payment()).expect("second attempt");
    }

    #[test]
    fn checkout_authorization_submits_the_form_and_never_redirects() {
        let flow = flow(Page::Checkout, approved());
        let actions = RedirectRecorder::new();
        let auth = Authorization {
            payment_token: "EC-7PX12345".into(),
            payer_id: "PAYER123".into(),
        };
        flow.authorize(&auth, &actions);
        assert_eq!(
            flow.gateway.calls(),
            vec!["submit_checkout_form(EC-7PX12345,PAYER123)"]
        );
        assert!(!actions.redirected.get());
    }

    #[test]
    fn cart_authorization_redirects_and_never_submits() {
        let flow = flow(Page::Cart, approved());
        let actions = RedirectRecorder::new();
        let auth = Authorization {
            payment_token: "EC-7PX12345".into(),
            payer_id: "PAYER123".into(),
        };
        flow.authorize(&auth, &actions);
        assert!(actions.redirected.get());
        assert!(flow.gateway.calls().is_empty());
    }

    #[test]
    fn authorization_deserializes_the_sdk_field_names() {
        let auth: Authorization =
            serde_json::from_value(json!({ "paymentToken": "EC-1", "payerID": "P1" }))
                .expect("authorization");
        assert_eq!(auth.payment_token, "EC-1");
        assert_eq!(auth.payer_id, "P1");
    }

    mod response_parsing {
        use super::*;

        #[test]
        fn success_with_token_is_approved() {
            let parsed = StartCheckoutResponse::from_value(approved()).expect("parse");
            assert_eq!(
                parsed,
                StartCheckoutResponse::Approved("EC-7PX12345".to_owned().into())
            );
        }

        #[test]
        fn success_without_token_is_an_error() {
            let parsed = StartCheckoutResponse::from_value(json!({ "success": true }));
            assert!(matches!(parsed, Err(ButtonError::Response(_))));
        }

        #[test]
        fn nested_bare_string_promotes_to_a_single_message() {
            let parsed = StartCheckoutResponse::from_value(
                json!({ "success": false, "data": { "messages": "X" } }),
            )
            .expect("parse");
            assert_eq!(parsed, StartCheckoutResponse::Rejected(vec!["X".into()]));
        }

        #[test]
        fn top_level_message_list_is_accepted() {
            let parsed = StartCheckoutResponse::from_value(
                json!({ "success": false, "messages": ["A", "B"] }),
            )
            .expect("parse");
            assert_eq!(
                parsed,
                StartCheckoutResponse::Rejected(vec!["A".into(), "B".into()])
            );
        }

        #[test]
        fn nested_messages_win_over_top_level_when_both_are_present() {
            let parsed = StartCheckoutResponse::from_value(json!({
                "success": false,
                "data": { "messages": ["nested"] },
                "messages": ["top-level"],
            }))
            .expect("parse");
            assert_eq!(
                parsed,
                StartCheckoutResponse::Rejected(vec!["nested".into()])
            );
        }

        #[test]
        fn a_silent_rejection_gets_the_generic_message() {
            let parsed =
                StartCheckoutResponse::from_value(json!({ "success": false })).expect("parse");
            assert_eq!(
                parsed,
                StartCheckoutResponse::Rejected(vec![GENERIC_FAILURE_MESSAGE.to_owned()])
            );
        }

        #[test]
        fn an_empty_message_list_also_gets_the_generic_message() {
            let parsed = StartCheckoutResponse::from_value(
                json!({ "success": false, "data": { "messages": [] } }),
            )
            .expect("parse");
            assert_eq!(
                parsed,
                StartCheckoutResponse::Rejected(vec![GENERIC_FAILURE_MESSAGE.to_owned()])
            );
        }

        #[test]
        fn a_non_object_body_is_a_response_error() {
            let parsed = StartCheckoutResponse::from_value(json!("<html>502</html>"));
            assert!(matches!(parsed, Err(ButtonError::Response(_))));
        }
    }
}
