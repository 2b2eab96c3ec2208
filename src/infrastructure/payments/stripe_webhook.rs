use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

use crate::application::ports::{PaymentGatewayError, PaymentWebhookVerifier};
use crate::domain::{JobId, PaymentConfirmation};

type HmacSha256 = Hmac<Sha256>;

pub const DEFAULT_SIGNATURE_TOLERANCE_SECS: i64 = 300;

const CONFIRMING_EVENTS: [&str; 2] = [
    "checkout.session.completed",
    "checkout.session.async_payment_succeeded",
];

/// Checks `Stripe-Signature` headers (`t=<unix>,v1=<hex hmac>`) against the
/// endpoint secret and turns paid checkout events into confirmations.
pub struct StripeWebhookVerifier {
    secret: String,
    tolerance_secs: i64,
}

#[derive(Deserialize)]
struct Event {
    #[serde(rename = "type")]
    kind: String,
    data: EventData,
}

#[derive(Deserialize)]
struct EventData {
    object: SessionObject,
}

#[derive(Deserialize)]
struct SessionObject {
    id: String,
    #[serde(default)]
    payment_status: Option<String>,
    #[serde(default)]
    client_reference_id: Option<String>,
    #[serde(default)]
    amount_total: Option<i64>,
    #[serde(default)]
    metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

impl SessionObject {
    fn job_reference(&self) -> Option<&str> {
        self.client_reference_id.as_deref().or_else(|| {
            self.metadata
                .as_ref()
                .and_then(|m| m.get("job_id"))
                .and_then(|v| v.as_str())
        })
    }
}

struct SignatureHeader<'a> {
    timestamp: i64,
    signatures: Vec<&'a str>,
}

fn parse_header(header: &str) -> Result<SignatureHeader<'_>, PaymentGatewayError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => {
                timestamp = Some(value.parse::<i64>().map_err(|_| {
                    PaymentGatewayError::InvalidSignature("bad timestamp".to_string())
                })?)
            }
            Some(("v1", value)) => signatures.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp
        .ok_or_else(|| PaymentGatewayError::InvalidSignature("missing timestamp".to_string()))?;
    if signatures.is_empty() {
        return Err(PaymentGatewayError::InvalidSignature(
            "missing v1 signature".to_string(),
        ));
    }
    Ok(SignatureHeader {
        timestamp,
        signatures,
    })
}

fn mac_for(
    secret: &str,
    timestamp: i64,
    payload: &[u8],
) -> Result<HmacSha256, PaymentGatewayError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| PaymentGatewayError::InvalidSignature(e.to_string()))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac)
}

/// Produces a header the verifier accepts. Used to sign test fixtures.
pub fn signature_header(
    secret: &str,
    payload: &[u8],
    timestamp: i64,
) -> Result<String, PaymentGatewayError> {
    let signature = hex::encode(mac_for(secret, timestamp, payload)?.finalize().into_bytes());
    Ok(format!("t={},v1={}", timestamp, signature))
}

impl StripeWebhookVerifier {
    pub fn new(secret: impl Into<String>, tolerance_secs: i64) -> Self {
        Self {
            secret: secret.into(),
            tolerance_secs,
        }
    }

    pub fn verify_at(
        &self,
        payload: &[u8],
        signature_header: &str,
        now: i64,
    ) -> Result<Option<PaymentConfirmation>, PaymentGatewayError> {
        if self.secret.is_empty() {
            return Err(PaymentGatewayError::InvalidSignature(
                "no webhook secret configured".to_string(),
            ));
        }

        let header = parse_header(signature_header)?;

        if now.abs_diff(header.timestamp) > self.tolerance_secs.unsigned_abs() {
            return Err(PaymentGatewayError::InvalidSignature(
                "timestamp outside tolerance".to_string(),
            ));
        }

        let mac = mac_for(&self.secret, header.timestamp, payload)?;
        let matched = header.signatures.iter().any(|candidate| {
            hex::decode(candidate)
                .map(|bytes| mac.clone().verify_slice(&bytes).is_ok())
                .unwrap_or(false)
        });
        if !matched {
            return Err(PaymentGatewayError::InvalidSignature(
                "no matching signature".to_string(),
            ));
        }

        let event: Event = serde_json::from_slice(payload)
            .map_err(|e| PaymentGatewayError::MalformedEvent(e.to_string()))?;
        confirmation_from(event)
    }
}

fn confirmation_from(event: Event) -> Result<Option<PaymentConfirmation>, PaymentGatewayError> {
    if !CONFIRMING_EVENTS.contains(&event.kind.as_str()) {
        tracing::debug!(event_type = %event.kind, "Ignoring webhook event");
        return Ok(None);
    }

    let session = event.data.object;
    if session.payment_status.as_deref() != Some("paid") {
        tracing::debug!(session_id = %session.id, "Checkout completed without payment");
        return Ok(None);
    }

    let job_id = session
        .job_reference()
        .ok_or_else(|| PaymentGatewayError::MalformedEvent("no job reference".to_string()))?
        .parse::<JobId>()
        .map_err(PaymentGatewayError::MalformedEvent)?;

    let amount_cents = session
        .amount_total
        .ok_or_else(|| PaymentGatewayError::MalformedEvent("no amount_total".to_string()))?;

    Ok(Some(PaymentConfirmation {
        job_id,
        checkout_session_id: session.id,
        amount_cents: Some(amount_cents),
    }))
}

impl PaymentWebhookVerifier for StripeWebhookVerifier {
    fn verify(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<Option<PaymentConfirmation>, PaymentGatewayError> {
        self.verify_at(payload, signature_header, Utc::now().timestamp())
    }
}
