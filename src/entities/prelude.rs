pub use super::activity_log::Entity as ActivityLog;
pub use super::announcements::Entity as Announcements;
pub use super::awards::Entity as Awards;
pub use super::documents::Entity as Documents;
pub use super::evaluations::Entity as Evaluations;
pub use super::gear_items::Entity as GearItems;
pub use super::gear_loadouts::Entity as GearLoadouts;
pub use super::operations::Entity as Operations;
pub use super::orbat_slots::Entity as OrbatSlots;
pub use super::personnel::Entity as Personnel;
pub use super::qualifications::Entity as Qualifications;
pub use super::settings::Entity as Settings;
pub use super::users::Entity as Users;
