use chrono::NaiveDate;

use super::{
    Address, JobValidationError, NewJob, ServiceCategory, UserId, find_service_option,
};

/// Client-side booking state before submission. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingDraft {
    pub category: ServiceCategory,
    pub option_id: Option<String>,
    pub address: Address,
    pub scheduled_date: NaiveDate,
    pub notes: Option<String>,
}

impl BookingDraft {
    pub fn new(category: ServiceCategory, scheduled_date: NaiveDate) -> Self {
        Self {
            category,
            option_id: None,
            address: Address::default(),
            scheduled_date,
            notes: None,
        }
    }

    /// Turns the draft into job inputs. The price always comes from the
    /// catalog, never from the caller.
    pub fn submit(self, client_id: UserId) -> Result<NewJob, JobValidationError> {
        let option_id = self
            .option_id
            .filter(|id| !id.trim().is_empty())
            .ok_or(JobValidationError::MissingServiceType)?;
        let option = find_service_option(self.category, &option_id)
            .ok_or(JobValidationError::UnknownServiceOption(option_id))?;

        if self.address.street.trim().is_empty() {
            return Err(JobValidationError::MissingAddress);
        }

        let description = match self.notes.filter(|n| !n.trim().is_empty()) {
            Some(notes) => notes,
            None => format!(
                "Category: {}. Date Scheduled: {}",
                self.category,
                self.scheduled_date.format("%Y-%m-%d")
            ),
        };

        let new_job = NewJob {
            client_id,
            category: self.category,
            service_type: option.label.to_string(),
            price: option.base_price,
            address: self.address.to_line(),
            description: Some(description),
            scheduled_date: Some(self.scheduled_date),
        };
        new_job.validate()?;
        Ok(new_job)
    }
}
