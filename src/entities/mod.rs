pub mod prelude;

pub mod holidays;
pub mod total_unique_visitors;
pub mod unique_visitors;
pub mod users;
