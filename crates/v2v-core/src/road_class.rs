//! Road classification, mirroring the OSM `highway=*` tag values the
//! simulator cares about.

use std::str::FromStr;

/// Functional class of a road segment.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RoadClass {
    Motorway,
    MotorwayLink,
    Trunk,
    TrunkLink,
    Primary,
    PrimaryLink,
    Secondary,
    SecondaryLink,
    Tertiary,
    TertiaryLink,
    Unclassified,
    Residential,
    Service,
    /// Any tag not listed above (footway, cycleway, track, …).
    #[default]
    Other,
}

impl RoadClass {
    /// `true` for the classes vehicles are allowed to traverse.
    ///
    /// Residential and service roads are deliberately excluded: vehicles stay
    /// on the through-road network.
    #[inline]
    pub fn is_drivable(self) -> bool {
        matches!(
            self,
            RoadClass::Motorway
                | RoadClass::MotorwayLink
                | RoadClass::Trunk
                | RoadClass::TrunkLink
                | RoadClass::Primary
                | RoadClass::PrimaryLink
                | RoadClass::Secondary
                | RoadClass::SecondaryLink
                | RoadClass::Tertiary
                | RoadClass::TertiaryLink
                | RoadClass::Unclassified
        )
    }

    /// OSM tag value for this class.
    pub fn as_str(self) -> &'static str {
        match self {
            RoadClass::Motorway      => "motorway",
            RoadClass::MotorwayLink  => "motorway_link",
            RoadClass::Trunk         => "trunk",
            RoadClass::TrunkLink     => "trunk_link",
            RoadClass::Primary       => "primary",
            RoadClass::PrimaryLink   => "primary_link",
            RoadClass::Secondary     => "secondary",
            RoadClass::SecondaryLink => "secondary_link",
            RoadClass::Tertiary      => "tertiary",
            RoadClass::TertiaryLink  => "tertiary_link",
            RoadClass::Unclassified  => "unclassified",
            RoadClass::Residential   => "residential",
            RoadClass::Service       => "service",
            RoadClass::Other         => "other",
        }
    }

    /// Parse an OSM `highway` tag.  Unknown values map to [`RoadClass::Other`].
    pub fn from_tag(tag: &str) -> RoadClass {
        match tag.trim() {
            "motorway"       => RoadClass::Motorway,
            "motorway_link"  => RoadClass::MotorwayLink,
            "trunk"          => RoadClass::Trunk,
            "trunk_link"     => RoadClass::TrunkLink,
            "primary"        => RoadClass::Primary,
            "primary_link"   => RoadClass::PrimaryLink,
            "secondary"      => RoadClass::Secondary,
            "secondary_link" => RoadClass::SecondaryLink,
            "tertiary"       => RoadClass::Tertiary,
            "tertiary_link"  => RoadClass::TertiaryLink,
            "unclassified"   => RoadClass::Unclassified,
            "residential"    => RoadClass::Residential,
            "service"        => RoadClass::Service,
            _                => RoadClass::Other,
        }
    }
}

impl FromStr for RoadClass {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(RoadClass::from_tag(s))
    }
}

impl std::fmt::Display for RoadClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
