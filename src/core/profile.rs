use crate::error::{MatchError, Result};
use crate::models::{Participant, ProfileField};

/// Separators used inside multi-valued categorical cells
const VALUE_SEPARATORS: &[char] = &[';', ','];

/// Build the profile text of one participant
///
/// Each configured field is appended `repeat` times so that the term
/// weighting downstream sees it more often. Missing fields contribute
/// nothing.
pub fn build_profile(participant: &Participant, fields: &[ProfileField]) -> String {
    let mut parts: Vec<String> = Vec::new();

    for entry in fields {
        let Some(value) = participant.attribute(&entry.field) else {
            continue;
        };
        let normalized = normalize_value(value);
        if normalized.is_empty() {
            continue;
        }
        for _ in 0..entry.repeat {
            parts.push(normalized.clone());
        }
    }

    parts.join(" ")
}

/// Build profiles for a whole table, preserving row order
pub fn build_profiles<'a, I>(participants: I, fields: &[ProfileField]) -> Vec<String>
where
    I: IntoIterator<Item = &'a Participant>,
{
    participants
        .into_iter()
        .map(|p| build_profile(p, fields))
        .collect()
}

/// Check that both field lists are usable and produce comparable vocabularies
pub fn validate_field_lists(
    sponsor_fields: &[ProfileField],
    candidate_fields: &[ProfileField],
) -> Result<()> {
    for (side, fields) in [("sponsor", sponsor_fields), ("candidate", candidate_fields)] {
        if fields.is_empty() {
            return Err(MatchError::InvalidProfileFields(format!(
                "{} field list is empty",
                side
            )));
        }
        if let Some(entry) = fields.iter().find(|f| f.field.trim().is_empty()) {
            return Err(MatchError::InvalidProfileFields(format!(
                "{} field list has an entry without a field name (repeat {})",
                side, entry.repeat
            )));
        }
        if let Some(entry) = fields.iter().find(|f| f.repeat == 0) {
            return Err(MatchError::InvalidProfileFields(format!(
                "{} field '{}' has repeat count 0",
                side, entry.field
            )));
        }
    }

    let shared = sponsor_fields
        .iter()
        .any(|s| candidate_fields.iter().any(|c| c.field == s.field));
    if !shared {
        return Err(MatchError::InvalidProfileFields(
            "sponsor and candidate field lists share no field".to_string(),
        ));
    }

    Ok(())
}

fn normalize_value(value: &str) -> String {
    value
        .split(|c: char| c.is_whitespace() || VALUE_SEPARATORS.contains(&c))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn participant(attrs: &[(&str, &str)]) -> Participant {
        Participant {
            id: "p1".to_string(),
            level: "PhD".to_string(),
            attributes: attrs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_repeats_weighted_fields() {
        let p = participant(&[("area", "Neuroscience"), ("topic", "memory")]);
        let fields = vec![ProfileField::new("area", 2), ProfileField::new("topic", 1)];

        assert_eq!(build_profile(&p, &fields), "Neuroscience Neuroscience memory");
    }

    #[test]
    fn test_separators_become_whitespace() {
        let p = participant(&[("career", "grants;teaching, outreach")]);
        let fields = vec![ProfileField::new("career", 1)];

        assert_eq!(build_profile(&p, &fields), "grants teaching outreach");
    }

    #[test]
    fn test_missing_field_is_empty_contribution() {
        let p = participant(&[("topic", "memory")]);
        let fields = vec![ProfileField::new("area", 3), ProfileField::new("topic", 1)];

        assert_eq!(build_profile(&p, &fields), "memory");
        assert_eq!(build_profile(&participant(&[]), &fields), "");
    }

    #[test]
    fn test_validate_rejects_blank_field_name() {
        let bad = vec![ProfileField::new(" ", 1)];
        let good = vec![ProfileField::new("topic", 1)];

        assert!(matches!(
            validate_field_lists(&bad, &good),
            Err(MatchError::InvalidProfileFields(_))
        ));
    }

    #[test]
    fn test_validate_requires_shared_field() {
        let sponsor = vec![ProfileField::new("topic", 1)];
        let candidate = vec![ProfileField::new("area", 1)];

        assert!(validate_field_lists(&sponsor, &candidate).is_err());
        assert!(validate_field_lists(&sponsor, &sponsor).is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_repeat() {
        let fields = vec![ProfileField::new("topic", 0)];
        assert!(validate_field_lists(&fields, &fields).is_err());
    }
}
