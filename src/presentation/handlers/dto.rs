use serde::Serialize;

use crate::domain::{Job, ServiceOption, User};

#[derive(Debug, Serialize)]
pub struct JobResponse {
    pub id: String,
    pub client_id: String,
    pub provider_id: Option<String>,
    pub category: String,
    pub service_type: String,
    pub description: Option<String>,
    pub address: String,
    pub price: f64,
    pub scheduled_date: Option<String>,
    pub status: String,
    pub payment_status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Job> for JobResponse {
    fn from(job: &Job) -> Self {
        Self {
            id: job.id.to_string(),
            client_id: job.client_id.to_string(),
            provider_id: job.provider_id.map(|id| id.to_string()),
            category: job.category.as_str().to_string(),
            service_type: job.service_type.clone(),
            description: job.description.clone(),
            address: job.address.clone(),
            price: job.price.as_amount(),
            scheduled_date: job
                .scheduled_date
                .map(|d| d.format("%Y-%m-%d").to_string()),
            status: job.status.as_str().to_string(),
            payment_status: job.payment_status.as_str().to_string(),
            created_at: job.created_at.to_rfc3339(),
            updated_at: job.updated_at.to_rfc3339(),
        }
    }
}

impl From<Job> for JobResponse {
    fn from(job: Job) -> Self {
        Self::from(&job)
    }
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub rating: Option<f32>,
    pub completed_jobs: Option<u32>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role.as_str().to_string(),
            rating: user.rating,
            completed_jobs: user.completed_jobs,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ServiceOptionResponse {
    pub id: &'static str,
    pub category: &'static str,
    pub label: &'static str,
    pub base_price: f64,
    pub description: &'static str,
}

impl From<&ServiceOption> for ServiceOptionResponse {
    fn from(option: &ServiceOption) -> Self {
        Self {
            id: option.id,
            category: option.category.as_str(),
            label: option.label,
            base_price: option.base_price.as_amount(),
            description: option.description,
        }
    }
}

pub fn job_list(jobs: &[Job]) -> Vec<JobResponse> {
    jobs.iter().map(JobResponse::from).collect()
}
