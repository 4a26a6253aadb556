use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrbatKind {
    Unit,
    Battalion,
    Company,
    Platoon,
    Command,
    Squad,
    Fireteam,
    Aviation,
    Role,
}

impl OrbatKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unit => "unit",
            Self::Battalion => "battalion",
            Self::Company => "company",
            Self::Platoon => "platoon",
            Self::Command => "command",
            Self::Squad => "squad",
            Self::Fireteam => "fireteam",
            Self::Aviation => "aviation",
            Self::Role => "role",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "unit" => Some(Self::Unit),
            "battalion" => Some(Self::Battalion),
            "company" => Some(Self::Company),
            "platoon" => Some(Self::Platoon),
            "command" => Some(Self::Command),
            "squad" => Some(Self::Squad),
            "fireteam" => Some(Self::Fireteam),
            "aviation" => Some(Self::Aviation),
            "role" => Some(Self::Role),
            _ => None,
        }
    }

    /// Whether a slot of this kind may carry a personnel assignment.
    #[must_use]
    pub const fn is_assignable(self) -> bool {
        matches!(self, Self::Role)
    }
}

impl std::fmt::Display for OrbatKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One row of the seed template. Parents always precede their children so
/// the batch insert satisfies the self-referencing foreign key.
#[derive(Debug, Clone, Copy)]
pub struct OrbatSlotSeed {
    pub id: &'static str,
    pub parent: Option<&'static str>,
    pub name: &'static str,
    pub kind: OrbatKind,
    pub callsign: Option<&'static str>,
    pub sort_order: i32,
}

const fn slot(
    id: &'static str,
    parent: Option<&'static str>,
    name: &'static str,
    kind: OrbatKind,
    callsign: Option<&'static str>,
    sort_order: i32,
) -> OrbatSlotSeed {
    OrbatSlotSeed {
        id,
        parent,
        name,
        kind,
        callsign,
        sort_order,
    }
}

/// The unit's default organizational tree, loaded once on first boot.
/// Ids are stable; renaming a node must keep its id so that re-seeding
/// an existing database stays a no-op.
pub const ORBAT_TEMPLATE: &[OrbatSlotSeed] = &[
    slot("tf", None, "Task Force Sabre", OrbatKind::Unit, None, 0),
    slot("1bn", Some("tf"), "1st Battalion", OrbatKind::Battalion, None, 0),
    slot("a-co", Some("1bn"), "Alpha Company", OrbatKind::Company, Some("Anvil"), 0),
    slot("a1", Some("a-co"), "1st Platoon", OrbatKind::Platoon, None, 0),
    // Platoon command element
    slot("a1-hq", Some("a1"), "Platoon Command", OrbatKind::Command, Some("Anvil 1-6"), 0),
    slot("a1-hq-pl", Some("a1-hq"), "Platoon Leader", OrbatKind::Role, None, 0),
    slot("a1-hq-psg", Some("a1-hq"), "Platoon Sergeant", OrbatKind::Role, None, 1),
    slot("a1-hq-rto", Some("a1-hq"), "Radio Operator", OrbatKind::Role, None, 2),
    slot("a1-hq-medic", Some("a1-hq"), "Platoon Medic", OrbatKind::Role, None, 3),
    // 1st Squad
    slot("a1-1", Some("a1"), "1st Squad", OrbatKind::Squad, Some("Anvil 1-1"), 1),
    slot("a1-1-sl", Some("a1-1"), "Squad Leader", OrbatKind::Role, None, 0),
    slot("a1-1-a", Some("a1-1"), "Alpha Team", OrbatKind::Fireteam, None, 1),
    slot("a1-1-a-tl", Some("a1-1-a"), "Team Leader", OrbatKind::Role, None, 0),
    slot("a1-1-a-ar", Some("a1-1-a"), "Automatic Rifleman", OrbatKind::Role, None, 1),
    slot("a1-1-a-gr", Some("a1-1-a"), "Grenadier", OrbatKind::Role, None, 2),
    slot("a1-1-a-rfl", Some("a1-1-a"), "Rifleman", OrbatKind::Role, None, 3),
    slot("a1-1-b", Some("a1-1"), "Bravo Team", OrbatKind::Fireteam, None, 2),
    slot("a1-1-b-tl", Some("a1-1-b"), "Team Leader", OrbatKind::Role, None, 0),
    slot("a1-1-b-ar", Some("a1-1-b"), "Automatic Rifleman", OrbatKind::Role, None, 1),
    slot("a1-1-b-gr", Some("a1-1-b"), "Grenadier", OrbatKind::Role, None, 2),
    slot("a1-1-b-rfl", Some("a1-1-b"), "Rifleman", OrbatKind::Role, None, 3),
    // 2nd Squad
    slot("a1-2", Some("a1"), "2nd Squad", OrbatKind::Squad, Some("Anvil 1-2"), 2),
    slot("a1-2-sl", Some("a1-2"), "Squad Leader", OrbatKind::Role, None, 0),
    slot("a1-2-a", Some("a1-2"), "Alpha Team", OrbatKind::Fireteam, None, 1),
    slot("a1-2-a-tl", Some("a1-2-a"), "Team Leader", OrbatKind::Role, None, 0),
    slot("a1-2-a-ar", Some("a1-2-a"), "Automatic Rifleman", OrbatKind::Role, None, 1),
    slot("a1-2-a-gr", Some("a1-2-a"), "Grenadier", OrbatKind::Role, None, 2),
    slot("a1-2-a-rfl", Some("a1-2-a"), "Rifleman", OrbatKind::Role, None, 3),
    slot("a1-2-b", Some("a1-2"), "Bravo Team", OrbatKind::Fireteam, None, 2),
    slot("a1-2-b-tl", Some("a1-2-b"), "Team Leader", OrbatKind::Role, None, 0),
    slot("a1-2-b-ar", Some("a1-2-b"), "Automatic Rifleman", OrbatKind::Role, None, 1),
    slot("a1-2-b-gr", Some("a1-2-b"), "Grenadier", OrbatKind::Role, None, 2),
    slot("a1-2-b-rfl", Some("a1-2-b"), "Rifleman", OrbatKind::Role, None, 3),
    // Aviation branch
    slot("avn", Some("tf"), "Aviation Detachment", OrbatKind::Aviation, Some("Phantom"), 1),
    slot("avn-lead", Some("avn"), "Flight Lead", OrbatKind::Role, None, 0),
    slot("avn-pilot", Some("avn"), "Pilot", OrbatKind::Role, None, 1),
    slot("avn-cc", Some("avn"), "Crew Chief", OrbatKind::Role, None, 2),
    slot("avn-dg", Some("avn"), "Door Gunner", OrbatKind::Role, None, 3),
];

#[must_use]
pub fn find_slot(id: &str) -> Option<&'static OrbatSlotSeed> {
    ORBAT_TEMPLATE.iter().find(|s| s.id == id)
}
