use pwout::settings::Settings;
use pwout::{Parser, PwoutError};

const MAGNETIZATION: &str = "     total magnetization       =     2.00 Bohr mag/cell";

fn setup(toml: &str) -> Parser {
    let settings = Settings::from_toml(toml).expect("settings should parse");
    Parser::new(settings.registry().expect("rules should compile"))
}

#[test]
fn defaults() {
    let settings = Settings::default();
    assert_eq!(settings.log_filter, "info");
    assert!(settings.disabled_rules.is_empty());
    assert!(settings.rules.is_empty());
    assert!(!settings.pretty);
    let empty = Settings::from_toml("").expect("empty settings");
    assert_eq!(empty.log_filter, "info");
}

#[test]
fn custom_rule_runs_before_scalar() {
    let parser = setup(
        r#"
        [[rules]]
        name = "magnetization"
        pattern = 'total magnetization\s*=\s*(?P<value>\S+)\s+(?P<unit>Bohr mag/cell)'
        key = "magnetization"
        "#,
    );
    let flat = parser.parse_flat([MAGNETIZATION]);
    assert_eq!(flat["magnetization"].as_f64(), Some(2.0));
    assert_eq!(flat["magnetization units"].as_str(), Some("Bohr mag/cell"));
    assert!(!flat.contains_key("total magnetization"));
    let names = parser.registry().names();
    assert_eq!(names[names.len() - 2], "magnetization");
    assert_eq!(names[names.len() - 1], "scalar");
}

#[test]
fn custom_rule_with_fixed_unit() {
    let parser = setup(
        r#"
        [[rules]]
        name = "absolute_magnetization"
        pattern = 'absolute magnetization\s*=\s*(?P<value>\S+)'
        key = "absolute magnetization"
        unit = "Bohr mag/cell"
        "#,
    );
    let flat = parser.parse_flat(["     absolute magnetization    =     2.12 Bohr mag/cell"]);
    assert_eq!(flat["absolute magnetization"].as_f64(), Some(2.12));
    assert_eq!(flat["absolute magnetization units"].as_str(), Some("Bohr mag/cell"));
}

#[test]
fn disabled_rules_are_removed() {
    let parser = setup(r#"disabled_rules = ["cpu_time", "fermi_energy"]"#);
    let names = parser.registry().names();
    assert!(!names.contains(&"cpu_time"));
    assert!(!names.contains(&"fermi_energy"));
    let flat = parser.parse_flat([
        "     the Fermi energy is     6.5407 ev",
        "     total cpu time spent up to now is        0.6 secs",
    ]);
    assert!(flat.is_empty());
}

#[test]
fn unknown_disabled_rule_is_ignored() {
    let parser = setup(r#"disabled_rules = ["no_such_rule"]"#);
    assert_eq!(parser.registry().len(), 9);
}

#[test]
fn invalid_pattern_is_reported() {
    let settings = Settings::from_toml(
        r#"
        [[rules]]
        name = "broken"
        pattern = '(?P<value>['
        key = "broken"
        "#,
    )
    .expect("settings should parse");
    match settings.registry() {
        Err(PwoutError::Pattern { rule, .. }) => assert_eq!(rule, "broken"),
        other => panic!("expected a pattern error, got {:?}", other.map(|r| r.names().len())),
    }
}

#[test]
fn pattern_without_value_group_is_reported() {
    let settings = Settings::from_toml(
        r#"
        [[rules]]
        name = "valueless"
        pattern = 'total magnetization\s*=\s*\S+'
        key = "magnetization"
        "#,
    )
    .expect("settings should parse");
    let err = settings.registry().err().expect("missing group should fail");
    assert!(matches!(err, PwoutError::Pattern { ref rule, .. } if rule == "valueless"));
    assert!(err.to_string().contains("value"));
}

#[test]
fn malformed_settings_are_a_config_error() {
    let err = Settings::from_toml(r#"pretty = "maybe""#).err().expect("should fail");
    assert!(matches!(err, PwoutError::Config(_)));
}
