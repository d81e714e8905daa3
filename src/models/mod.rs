pub mod holiday;
pub mod user;

pub use holiday::{Holiday, HolidayFilters, HolidayPatch, NewHoliday};
pub use user::{NewUser, PasswordChange, User, UserPatch};
