/// Placement rule, every set field has to be a substring of the client's corresponding property.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config-file", derive(serde::Deserialize))]
#[cfg_attr(feature = "config-file", serde(default))]
pub struct Rule {
    pub class: Option<String>,
    pub instance: Option<String>,
    pub title: Option<String>,
    pub tags: u32,
    pub floating: bool,
    /// Monitor number to send matching clients to, -1 keeps the current one
    pub monitor: i32,
}

impl Default for Rule {
    fn default() -> Self {
        Self {
            class: None,
            instance: None,
            title: None,
            tags: 0,
            floating: false,
            monitor: -1,
        }
    }
}

impl Rule {
    #[must_use]
    pub fn matches(&self, class: &str, instance: &str, title: &str) -> bool {
        let field_matches = |rule: &Option<String>, prop: &str| {
            rule.as_deref().map_or(true, |needle| prop.contains(needle))
        };
        field_matches(&self.title, title)
            && field_matches(&self.class, class)
            && field_matches(&self.instance, instance)
    }
}

#[must_use]
pub fn default_rules() -> Vec<Rule> {
    vec![
        Rule {
            class: Some("Gimp".to_owned()),
            floating: true,
            ..Rule::default()
        },
        Rule {
            class: Some("Firefox".to_owned()),
            tags: 1 << 8,
            ..Rule::default()
        },
    ]
}

#[cfg(test)]
mod tests {
    use crate::config::rules::{default_rules, Rule};

    #[test]
    fn unset_fields_match_anything() {
        let rule = Rule::default();
        assert!(rule.matches("", "", ""));
        assert!(rule.matches("Gimp", "gimp", "GNU Image Manipulation Program"));
    }

    #[test]
    fn fields_are_substring_matched() {
        let rule = Rule {
            class: Some("Fire".to_owned()),
            title: Some("Mozilla".to_owned()),
            ..Rule::default()
        };
        assert!(rule.matches("Firefox", "Navigator", "Start Page - Mozilla Firefox"));
        assert!(!rule.matches("Firefox", "Navigator", "Start Page"));
        assert!(!rule.matches("firefox", "Navigator", "Mozilla"));
    }

    #[test]
    fn defaults_float_gimp_and_pin_firefox() {
        let rules = default_rules();
        let gimp = rules
            .iter()
            .find(|r| r.matches("Gimp", "gimp", ""))
            .unwrap();
        assert!(gimp.floating);
        assert_eq!(0, gimp.tags);
        let firefox = rules
            .iter()
            .find(|r| r.matches("Firefox", "Navigator", ""))
            .unwrap();
        assert_eq!(1 << 8, firefox.tags);
        assert_eq!(-1, firefox.monitor);
    }
}
