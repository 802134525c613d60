use crate::model::{DefectCategory, Severity};

/// Severity of a defect, decided by the first matching rule:
///
/// 1. category names connectivity, or the description mentions "unreachable": CRITICAL
/// 2. category names interface and the description mentions "down": MAJOR
/// 3. anything else: MINOR
///
/// Matching is case-insensitive substring matching on free text, so rewording an issue
/// message can move it between severities.
pub fn determine_severity(category: &DefectCategory, description: &str) -> Severity {
    let category = category.as_str().to_lowercase();
    let description = description.to_lowercase();

    if category.contains("connectivity") || description.contains("unreachable") {
        Severity::Critical
    } else if category.contains("interface") && description.contains("down") {
        Severity::Major
    } else {
        Severity::Minor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connectivity_is_always_critical() {
        assert_eq!(
            determine_severity(&DefectCategory::Connectivity, "anything at all"),
            Severity::Critical
        );
    }

    #[test]
    fn unreachable_wins_over_category() {
        assert_eq!(
            determine_severity(&DefectCategory::Performance, "Device UNREACHABLE during poll"),
            Severity::Critical
        );
        assert_eq!(
            determine_severity(
                &DefectCategory::Interface,
                "Interface eth0 is down, peer unreachable"
            ),
            Severity::Critical
        );
    }

    #[test]
    fn down_interface_is_major() {
        assert_eq!(
            determine_severity(&DefectCategory::Interface, "Interface eth3 is down"),
            Severity::Major
        );
        // any text containing "down" qualifies, including other link states
        assert_eq!(
            determine_severity(&DefectCategory::Interface, "Interface eth1 is lowerLayerDown"),
            Severity::Major
        );
    }

    #[test]
    fn down_outside_interface_category_is_minor() {
        assert_eq!(
            determine_severity(&DefectCategory::Performance, "Interface eth3 is down"),
            Severity::Minor
        );
    }

    #[test]
    fn count_mismatch_and_performance_are_minor() {
        assert_eq!(
            determine_severity(&DefectCategory::Interface, "Expected 4 interfaces, found 3"),
            Severity::Minor
        );
        assert_eq!(
            determine_severity(&DefectCategory::Performance, "High CPU usage: 91.0%"),
            Severity::Minor
        );
        assert_eq!(
            determine_severity(&DefectCategory::Interface, "Interface eth2 is testing"),
            Severity::Minor
        );
    }

    #[test]
    fn open_categories_match_by_substring() {
        assert_eq!(
            determine_severity(&DefectCategory::from("Connectivity-Backup"), "link flap"),
            Severity::Critical
        );
        assert_eq!(
            determine_severity(&DefectCategory::from("optical_power"), "rx power low"),
            Severity::Minor
        );
    }
}
