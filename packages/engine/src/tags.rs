//! Component family descriptors.
//!
//! Each user-owned component family maps a tag name to the attribute that
//! carries its record array and to the record fields the family requires.
//! Keeping this knowledge here keeps the locator and codec family-agnostic.

use itinera_model::UserElementKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagFamily {
    /// Markup tag name, e.g. `AirplaneSection`.
    pub tag_name: &'static str,
    /// Attribute holding the bracketed record array.
    pub records_attribute: &'static str,
    /// Fields a record literal must carry to be usable at all; records
    /// missing one are skipped during decode.
    pub required_fields: &'static [&'static str],
    /// Owning user-element kind (decides the id prefix).
    pub kind: UserElementKind,
}

pub const AIRPLANE_SECTION: TagFamily = TagFamily {
    tag_name: "AirplaneSection",
    records_attribute: "flights",
    required_fields: &["airline", "flightNumber"],
    kind: UserElementKind::Airplane,
};

pub const HOTEL_SECTION: TagFamily = TagFamily {
    tag_name: "HotelSection",
    records_attribute: "hotels",
    required_fields: &["name", "checkIn"],
    kind: UserElementKind::Hotel,
};

pub fn family_for_kind(kind: UserElementKind) -> &'static TagFamily {
    match kind {
        UserElementKind::Airplane => &AIRPLANE_SECTION,
        UserElementKind::Hotel => &HOTEL_SECTION,
    }
}

/// Resolve the family owning a user id from its `user_<kind>_*` prefix.
pub fn family_for_id(id: &str) -> Option<&'static TagFamily> {
    for family in [&AIRPLANE_SECTION, &HOTEL_SECTION] {
        if id.starts_with(&family.kind.id_prefix()) {
            return Some(family);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_for_id() {
        assert_eq!(family_for_id("user_airplane_7"), Some(&AIRPLANE_SECTION));
        assert_eq!(family_for_id("user_hotel_2"), Some(&HOTEL_SECTION));
        assert_eq!(family_for_id("gen_sec_1"), None);
        assert_eq!(family_for_id("user_train_1"), None);
    }
}
