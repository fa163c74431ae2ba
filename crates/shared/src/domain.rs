use std::{collections::BTreeSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::UnknownKey;

macro_rules! keyed_enum {
    ($(#[$meta:meta])* $name:ident, $kind:literal { $($variant:ident => ($key:literal, $label:literal)),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $key)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Stable identifier used in persisted state and on the command line.
            pub fn key(self) -> &'static str {
                match self {
                    $($name::$variant => $key,)+
                }
            }

            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }

            pub fn from_key(raw: &str) -> Option<Self> {
                match raw {
                    $($key => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.key())
            }
        }

        impl FromStr for $name {
            type Err = UnknownKey;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                Self::from_key(raw.trim()).ok_or_else(|| UnknownKey::new($kind, raw))
            }
        }
    };
}

keyed_enum!(SizeClass, "TV size" {
    UpTo55 => ("up-to-55", "Up to 55\""),
    From56To75 => ("56-75", "56\" - 75\""),
    Over75 => ("over-75", "Over 75\""),
});

keyed_enum!(BracketType, "bracket" {
    Own => ("own", "Own Bracket"),
    Tilting => ("tilting", "Tilting/Fixed"),
    FullMotion => ("full-motion", "Full-Motion"),
});

keyed_enum!(WallType, "wall type" {
    DrywallNoFireplace => ("drywall-no-fp", "Drywall (no fireplace)"),
    DrywallAboveFireplace => ("drywall-above-fp", "Drywall (above fireplace)"),
    Plaster => ("plaster", "Plaster"),
    Masonry => ("other", "Brick / Stone / Wood Panel"),
    Commercial => ("commercial", "Commercial Building (Metal Studs)"),
    NotSure => ("not-sure", "I don't know"),
});

keyed_enum!(AddonKind, "add-on" {
    Concealment => ("concealment", "In-Wall Concealment"),
    CordCover => ("cord-cover", "External Cord Cover"),
    Soundbar => ("soundbar", "Soundbar Mounting"),
    Hdmi => ("hdmi", "HDMI/Power Cords"),
});

impl BracketType {
    /// The customer-supplied bracket; its price is the size's base price.
    pub fn is_baseline(self) -> bool {
        self == BracketType::Own
    }
}

/// Required steps of the selection flow, in the order the widget presents them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionField {
    Size,
    Bracket,
    Wall,
}

impl SelectionField {
    pub fn label(self) -> &'static str {
        match self {
            SelectionField::Size => "TV Size",
            SelectionField::Bracket => "Bracket Type",
            SelectionField::Wall => "Wall Type",
        }
    }
}

impl fmt::Display for SelectionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A fully specified TV mount: every required step answered.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MountSpec {
    pub size: SizeClass,
    pub bracket: BracketType,
    pub wall: WallType,
    pub addons: BTreeSet<AddonKind>,
}

/// A committed cart entry. Price and labels are captured at commit time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub size: SizeClass,
    #[serde(default)]
    pub size_label: String,
    pub bracket: BracketType,
    #[serde(default)]
    pub bracket_label: String,
    pub wall: WallType,
    #[serde(default)]
    pub wall_label: String,
    #[serde(default)]
    pub addons: BTreeSet<AddonKind>,
    #[serde(default)]
    pub addon_labels: Vec<String>,
    pub price: u32,
}

impl LineItem {
    pub fn snapshot(spec: MountSpec, price: u32) -> Self {
        Self {
            size: spec.size,
            size_label: spec.size.label().to_string(),
            bracket: spec.bracket,
            bracket_label: spec.bracket.label().to_string(),
            wall: spec.wall,
            wall_label: spec.wall.label().to_string(),
            addon_labels: spec
                .addons
                .iter()
                .map(|addon| addon.label().to_string())
                .collect(),
            addons: spec.addons,
            price,
        }
    }

    pub fn spec(&self) -> MountSpec {
        MountSpec {
            size: self.size,
            bracket: self.bracket,
            wall: self.wall,
            addons: self.addons.clone(),
        }
    }

    pub fn size_label(&self) -> &str {
        non_empty_or(&self.size_label, self.size.label())
    }

    pub fn bracket_label(&self) -> &str {
        non_empty_or(&self.bracket_label, self.bracket.label())
    }

    pub fn wall_label(&self) -> &str {
        non_empty_or(&self.wall_label, self.wall.label())
    }
}

fn non_empty_or<'a>(stored: &'a str, fallback: &'a str) -> &'a str {
    if stored.trim().is_empty() {
        fallback
    } else {
        stored
    }
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
