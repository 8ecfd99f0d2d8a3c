use crate::error::{JournalError, MissingField, Result};

use super::{GeoPoint, Record};

/// User-editable fields of a record while it is being composed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Draft {
    pub thoughts: String,
    pub location: Option<GeoPoint>,
    pub city: String,
    pub image: Option<String>,
}

/// A draft that passed validation.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ValidDraft<'a> {
    pub thoughts: &'a str,
    pub location: GeoPoint,
    pub city: &'a str,
    pub image: &'a str,
}

impl Draft {
    /// Seed a draft from a stored record, carrying every editable field forward.
    pub fn from_record(record: &Record) -> Self {
        Self {
            thoughts: record.thoughts.clone(),
            location: Some(record.position()),
            city: record.city.clone(),
            image: Some(record.image.clone()),
        }
    }

    pub(crate) fn validate(&self) -> Result<ValidDraft<'_>> {
        if self.thoughts.trim().is_empty() {
            return Err(JournalError::Validation(MissingField::Thoughts));
        }
        let location = self
            .location
            .ok_or(JournalError::Validation(MissingField::Location))?;
        // a non-finite coordinate would serialize as null and poison the slot
        if !location.is_valid() {
            return Err(JournalError::InvalidLocation {
                latitude: location.latitude,
                longitude: location.longitude,
            });
        }
        let image = self
            .image
            .as_deref()
            .filter(|i| !i.is_empty())
            .ok_or(JournalError::Validation(MissingField::Image))?;
        Ok(ValidDraft {
            thoughts: &self.thoughts,
            location,
            city: &self.city,
            image,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> Draft {
        Draft {
            thoughts: "Nice view".to_string(),
            location: Some(GeoPoint::new(1.0, 2.0)),
            city: String::new(),
            image: Some("file://a.jpg".to_string()),
        }
    }

    #[test]
    fn test_complete_draft_validates() {
        assert!(complete().validate().is_ok());
    }

    #[test]
    fn test_blank_thoughts_rejected() {
        let draft = Draft {
            thoughts: "   ".to_string(),
            ..complete()
        };
        assert!(matches!(
            draft.validate(),
            Err(JournalError::Validation(MissingField::Thoughts))
        ));
    }

    #[test]
    fn test_missing_location_rejected() {
        let draft = Draft {
            location: None,
            ..complete()
        };
        assert!(matches!(
            draft.validate(),
            Err(JournalError::Validation(MissingField::Location))
        ));
    }

    #[test]
    fn test_non_finite_or_out_of_range_location_rejected() {
        for point in [
            GeoPoint::new(f64::NAN, 2.0),
            GeoPoint::new(1.0, f64::INFINITY),
            GeoPoint::new(91.0, 2.0),
            GeoPoint::new(1.0, -181.0),
        ] {
            let draft = Draft {
                location: Some(point),
                ..complete()
            };
            assert!(matches!(
                draft.validate(),
                Err(JournalError::InvalidLocation { .. })
            ));
        }
    }

    #[test]
    fn test_empty_image_rejected() {
        let draft = Draft {
            image: Some(String::new()),
            ..complete()
        };
        assert!(matches!(
            draft.validate(),
            Err(JournalError::Validation(MissingField::Image))
        ));
    }

    #[test]
    fn test_empty_city_is_allowed() {
        let valid = complete();
        let checked = valid.validate().unwrap();
        assert_eq!(checked.city, "");
    }
}
