use super::ApiError;
use crate::models::{HolidayFilters, HolidayPatch, NewHoliday, NewUser, UserPatch};

const MAX_HOLIDAY_NAME_LEN: usize = 100;
const MAX_COUNTRY_LEN: usize = 2;
const MIN_YEAR: i32 = 2010;
const MAX_YEAR: i32 = 2200;

pub fn validate_holiday_filters(filters: &HolidayFilters) -> Result<(), ApiError> {
    validate_country(&filters.country)?;

    if !(MIN_YEAR..=MAX_YEAR).contains(&filters.year) {
        return Err(ApiError::validation(format!(
            "Invalid year: {}. Year must be between {} and {}",
            filters.year, MIN_YEAR, MAX_YEAR
        )));
    }

    if let Some(month) = filters.month
        && !(1..=12).contains(&month)
    {
        return Err(ApiError::validation(format!(
            "Invalid month: {}. Month must be between 1 and 12",
            month
        )));
    }

    if let Some(day) = filters.day {
        if filters.month.is_none() {
            return Err(ApiError::validation("day filter requires month"));
        }
        if !(1..=31).contains(&day) {
            return Err(ApiError::validation(format!(
                "Invalid day: {}. Day must be between 1 and 31",
                day
            )));
        }
    }

    Ok(())
}

pub fn validate_new_holiday(holiday: &NewHoliday) -> Result<(), ApiError> {
    validate_holiday_name(&holiday.name)?;
    validate_country(&holiday.country)?;
    Ok(())
}

pub fn validate_holiday_patch(patch: &HolidayPatch) -> Result<(), ApiError> {
    if let Some(name) = &patch.name {
        validate_holiday_name(name)?;
    }
    if let Some(country) = &patch.country {
        validate_country(country)?;
    }
    Ok(())
}

pub fn validate_holiday_name(name: &str) -> Result<&str, ApiError> {
    if name.chars().count() > MAX_HOLIDAY_NAME_LEN {
        return Err(ApiError::validation(format!(
            "Holiday name must be {} characters or less",
            MAX_HOLIDAY_NAME_LEN
        )));
    }

    Ok(name)
}

pub fn validate_country(country: &str) -> Result<&str, ApiError> {
    if country.chars().count() > MAX_COUNTRY_LEN {
        return Err(ApiError::validation(format!(
            "Country must be {} characters or less",
            MAX_COUNTRY_LEN
        )));
    }

    Ok(country)
}

pub fn validate_new_user(user: &NewUser) -> Result<(), ApiError> {
    validate_username(&user.username)?;
    validate_password(&user.password)?;
    Ok(())
}

pub fn validate_user_patch(patch: &UserPatch) -> Result<(), ApiError> {
    if let Some(username) = &patch.username {
        validate_username(username)?;
    }
    if let Some(password) = &patch.password {
        validate_password(password)?;
    }
    Ok(())
}

pub fn validate_username(username: &str) -> Result<&str, ApiError> {
    if username.trim().is_empty() {
        return Err(ApiError::validation("Username cannot be empty"));
    }
    if username.contains(':') {
        // Would be unusable with Basic auth
        return Err(ApiError::validation("Username cannot contain ':'"));
    }
    Ok(username)
}

pub fn validate_password(password: &str) -> Result<&str, ApiError> {
    if password.is_empty() {
        return Err(ApiError::validation("Password cannot be empty"));
    }
    Ok(password)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filters() -> HolidayFilters {
        HolidayFilters {
            country: "PL".to_string(),
            year: 2020,
            month: None,
            day: None,
            public: None,
        }
    }

    #[test]
    fn test_validate_holiday_filters() {
        assert!(validate_holiday_filters(&filters()).is_ok());

        let mut f = filters();
        f.month = Some(12);
        f.day = Some(25);
        assert!(validate_holiday_filters(&f).is_ok());

        let mut f = filters();
        f.day = Some(25);
        assert!(validate_holiday_filters(&f).is_err());

        let mut f = filters();
        f.year = 2009;
        assert!(validate_holiday_filters(&f).is_err());
        f.year = 2201;
        assert!(validate_holiday_filters(&f).is_err());

        let mut f = filters();
        f.month = Some(13);
        assert!(validate_holiday_filters(&f).is_err());

        let mut f = filters();
        f.month = Some(2);
        f.day = Some(0);
        assert!(validate_holiday_filters(&f).is_err());

        let mut f = filters();
        f.country = "POL".to_string();
        assert!(validate_holiday_filters(&f).is_err());
    }

    #[test]
    fn test_validate_holiday_name() {
        assert!(validate_holiday_name("Christmas Day").is_ok());
        assert!(validate_holiday_name(&"x".repeat(100)).is_ok());
        assert!(validate_holiday_name(&"x".repeat(101)).is_err());
        assert!(validate_holiday_name("").is_ok());
    }

    #[test]
    fn test_validate_new_holiday() {
        let mut holiday = NewHoliday {
            name: "Boxing Day".to_string(),
            date: chrono::NaiveDate::from_ymd_opt(2021, 12, 26).unwrap(),
            country: "GB".to_string(),
            public: true,
        };
        assert!(validate_new_holiday(&holiday).is_ok());

        holiday.country = String::new();
        assert!(validate_new_holiday(&holiday).is_ok());

        holiday.country = "GBR".to_string();
        assert!(validate_new_holiday(&holiday).is_err());

        holiday.country = "GB".to_string();
        holiday.name = "x".repeat(101);
        assert!(validate_new_holiday(&holiday).is_err());
    }

    #[test]
    fn test_validate_username_and_password() {
        assert!(validate_username("jan").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("ja:n").is_err());
        assert!(validate_password("x").is_ok());
        assert!(validate_password("").is_err());
    }
}
