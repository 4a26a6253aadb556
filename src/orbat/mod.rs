pub mod template;

pub use template::{ORBAT_TEMPLATE, OrbatKind, OrbatSlotSeed, find_slot};
