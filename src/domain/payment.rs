use super::JobId;

pub const RETURN_JOB_ID_PARAM: &str = "job_id";
pub const RETURN_SUCCESS_PARAM: &str = "payment_success";

/// Builds the URL the processor redirects to after a successful checkout:
/// `<success_url>?job_id=<id>&payment_success=true`.
pub fn success_redirect_url(success_url: &str, job_id: JobId) -> String {
    let separator = if success_url.contains('?') { '&' } else { '?' };
    format!(
        "{}{}{}={}&{}=true",
        success_url, separator, RETURN_JOB_ID_PARAM, job_id, RETURN_SUCCESS_PARAM
    )
}

/// The query a browser brings back from checkout. It identifies the job and
/// nothing more: it is a hint to go and verify, never proof of payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentReturn {
    pub job_id: JobId,
}

impl PaymentReturn {
    pub fn from_pairs<'a>(
        pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self, String> {
        let mut job_id = None;
        let mut success = None;

        for (key, value) in pairs {
            match key {
                RETURN_JOB_ID_PARAM => {
                    if job_id.replace(value.parse::<JobId>()?).is_some() {
                        return Err(format!("duplicate {}", RETURN_JOB_ID_PARAM));
                    }
                }
                RETURN_SUCCESS_PARAM => {
                    if success.replace(value == "true").is_some() {
                        return Err(format!("duplicate {}", RETURN_SUCCESS_PARAM));
                    }
                }
                _ => {}
            }
        }

        if success != Some(true) {
            return Err(format!("missing {}=true", RETURN_SUCCESS_PARAM));
        }
        job_id
            .map(|job_id| Self { job_id })
            .ok_or_else(|| format!("missing {}", RETURN_JOB_ID_PARAM))
    }
}

/// A payment the processor itself has vouched for, via a signed webhook or a
/// server-side session lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentConfirmation {
    pub job_id: JobId,
    pub checkout_session_id: String,
    pub amount_cents: Option<i64>,
}
