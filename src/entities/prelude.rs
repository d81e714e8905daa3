pub use super::holidays::Entity as Holidays;
pub use super::total_unique_visitors::Entity as TotalUniqueVisitors;
pub use super::unique_visitors::Entity as UniqueVisitors;
pub use super::users::Entity as Users;
