//! Entity kind to icon mapping for result rows.
//!
//! The mapping is total: every kind, including kinds the client has never
//! heard of, resolves to an icon.

use crate::result::EntityKind;

/// Icon data for rendering. `name` identifies the icon for front-ends with an
/// icon font or image set, `glyph` is the plain-text fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityIcon {
  pub name:  &'static str,
  pub glyph: &'static str,
}

impl EntityIcon {
  const fn new(name: &'static str, glyph: &'static str) -> Self {
    Self { name, glyph }
  }
}

const AREA: EntityIcon = EntityIcon::new("area", "◆");
const CLUSTER: EntityIcon = EntityIcon::new("cluster", "◈");
const SQUAD: EntityIcon = EntityIcon::new("squad", "●");
const PERSON: EntityIcon = EntityIcon::new("person", "☺");
const SERVICE: EntityIcon = EntityIcon::new("service", "⚙");

// Generic icon (fallback)
pub const FALLBACK: EntityIcon = EntityIcon::new("generic", "•");

pub fn icon_for_kind(kind: &EntityKind) -> EntityIcon {
  match kind {
    EntityKind::Area => AREA,
    EntityKind::Cluster => CLUSTER,
    EntityKind::Squad => SQUAD,
    EntityKind::Person => PERSON,
    EntityKind::Service => SERVICE,
    EntityKind::Unknown(_) => FALLBACK,
  }
}

/// Resolve straight from a raw `type` string.
pub fn icon_for_type(type_name: &str) -> EntityIcon {
  icon_for_kind(&EntityKind::parse(type_name))
}
