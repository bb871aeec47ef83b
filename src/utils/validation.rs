use crate::domain::model::CreateSequenceData;
use crate::utils::error::{Result, SyncError};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(SyncError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(SyncError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(SyncError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(SyncError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_required(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(SyncError::validation(
            field_name,
            format!("{} is required", field_name),
        ));
    }
    Ok(())
}

/// Delays travel as strings but must hold a positive whole number of days.
pub fn validate_delay_days(field_name: &str, value: &str) -> Result<()> {
    match value.trim().parse::<u32>() {
        Ok(days) if days > 0 => Ok(()),
        _ => Err(SyncError::validation(
            field_name,
            format!("'{}' is not a positive number of days", value),
        )),
    }
}

impl Validate for CreateSequenceData {
    fn validate(&self) -> Result<()> {
        validate_required("title", &self.title)?;
        validate_required("description", &self.description)?;

        if self.steps.is_empty() {
            return Err(SyncError::validation("steps", "at least one step is required"));
        }

        for (index, step) in self.steps.iter().enumerate() {
            let field = |name: &str| format!("steps[{}].{}", index, name);
            validate_required(&field("step_title"), &step.step_title)?;
            validate_required(&field("content"), &step.content)?;
            validate_delay_days(&field("delay_days"), &step.delay_days)?;

            if step.step_number != index as u32 + 1 {
                return Err(SyncError::validation(
                    field("step_number"),
                    format!("expected step {}, found {}", index + 1, step.step_number),
                ));
            }
        }
        Ok(())
    }
}
