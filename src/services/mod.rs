pub mod holiday_service;
pub use holiday_service::{HolidayError, HolidayService};

pub mod holiday_service_impl;
pub use holiday_service_impl::SeaOrmHolidayService;

pub mod user_service;
pub use user_service::{UserError, UserService};

pub mod user_service_impl;
pub use user_service_impl::SeaOrmUserService;

pub mod visitors;
pub use visitors::{UniqueVisitorsMetric, VisitOutcome, VisitorCounter, VisitorError};
