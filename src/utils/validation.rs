use validator::Validate;

use crate::errors::AppError;

pub fn validate_payload<T: Validate>(payload: &T) -> Result<(), AppError> {
    payload.validate().map_err(|err| {
        log::debug!("Rejected payload before sending: {}", err);
        AppError::from(err)
    })
}
