use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::entities::holidays;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Holiday {
    pub id: i32,
    pub name: String,
    pub date: NaiveDate,
    pub public: bool,
    pub country: String,
}

impl From<holidays::Model> for Holiday {
    fn from(model: holidays::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            date: model.date,
            public: model.public,
            country: model.country,
        }
    }
}

/// Body of `POST /holidays` and `PUT /holidays/{id}`: every field is required.
#[derive(Debug, Clone, Deserialize)]
pub struct NewHoliday {
    pub name: String,
    pub date: NaiveDate,
    pub public: bool,
    pub country: String,
}

/// Body of `PATCH /holidays/{id}`: absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HolidayPatch {
    pub name: Option<String>,
    pub date: Option<NaiveDate>,
    pub public: Option<bool>,
    pub country: Option<String>,
}

impl From<NewHoliday> for HolidayPatch {
    fn from(holiday: NewHoliday) -> Self {
        Self {
            name: Some(holiday.name),
            date: Some(holiday.date),
            public: Some(holiday.public),
            country: Some(holiday.country),
        }
    }
}

/// Query string of `GET /holidays`.
///
/// `month`/`day` match the calendar components of the stored date, they do
/// not describe a range.
#[derive(Debug, Clone, Deserialize)]
pub struct HolidayFilters {
    pub country: String,
    pub year: i32,
    pub month: Option<i32>,
    pub day: Option<i32>,
    pub public: Option<bool>,
}
