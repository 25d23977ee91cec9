//! Tests for the theme system

use super::{set_colors, CssVariables, Theme, Themes};
use std::collections::HashMap;

#[test]
fn test_builtin_themes_have_fixed_keys() {
    let themes = Themes::default();
    assert_eq!(
        themes.names().collect::<Vec<_>>(),
        vec!["dark", "light", "lightblue"]
    );
    for (name, theme) in themes.iter() {
        let keys: Vec<&str> = theme.entries().iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, Theme::KEYS, "theme {name}");
        for (role, color) in theme.entries() {
            assert!(color.rgba().is_ok(), "theme {name} role {role}: {color}");
        }
    }
}

#[test]
fn test_set_colors_applies_each_role() {
    let themes: Themes = serde_yaml::from_str("light:\n  text: \"#222\"\n").unwrap();
    let mut vars = CssVariables::new();

    set_colors(&themes, "light", &mut vars);

    assert_eq!(vars.get("text"), Some("#222"));
    assert_eq!(vars.len(), 4);
}

#[test]
fn test_set_colors_unknown_theme_is_noop() {
    let themes = Themes::default();
    let mut vars = CssVariables::new();

    set_colors(&themes, "sepia", &mut vars);

    assert!(vars.is_empty());
}

#[test]
fn test_set_colors_overwrites_previous_theme() {
    let themes = Themes::default();
    let mut vars: HashMap<String, String> = HashMap::new();

    set_colors(&themes, "light", &mut vars);
    set_colors(&themes, "dark", &mut vars);

    assert_eq!(vars.len(), 4);
    assert_eq!(vars["text"], "#fff");
    assert_eq!(vars["background"], "#222");
}

#[test]
fn test_partial_theme_resets_missing_roles() {
    let mut themes = Themes::default();
    themes.insert("ink".to_string(), serde_yaml::from_str("text: \"#000\"\n").unwrap());
    let mut vars: HashMap<String, String> = HashMap::new();

    set_colors(&themes, "dark", &mut vars);
    set_colors(&themes, "ink", &mut vars);

    assert_eq!(vars.len(), 4);
    assert_eq!(vars["text"], "#000");
    assert_eq!(vars["background"], Theme::light().background.as_str());
}

#[test]
fn test_lightblue_to_css() {
    let mut vars = CssVariables::new();
    set_colors(&Themes::default(), "lightblue", &mut vars);

    assert_eq!(
        vars.to_css(":root"),
        ":root {\n  --text: #206095;\n  --muted: #707070;\n  --pale: #f0f0f0;\n  --background: rgb(188, 207, 222);\n}"
    );
}

#[test]
fn test_partial_theme_uses_defaults() {
    let yaml_content = "background: \"#111\"\n";

    let theme: Theme = serde_yaml::from_str(yaml_content).unwrap();
    assert_eq!(theme.background.as_str(), "#111");
    assert_eq!(theme.text, Theme::light().text);
    assert_eq!(theme.muted.as_str(), "#707070");
}

#[test]
fn test_invalid_theme_color_is_rejected() {
    let result: Result<Theme, _> = serde_yaml::from_str("text: \"#12\"\n");
    assert!(result.is_err());
}

#[test]
fn test_merge_replaces_same_name() {
    let mut themes = Themes::default();
    let mut extra = Themes::empty();
    extra.insert("dark", Theme::lightblue());
    extra.insert("sepia", Theme::light());

    themes.merge(extra);

    assert_eq!(themes.len(), 4);
    assert_eq!(themes.get("dark"), Some(&Theme::lightblue()));
    assert!(themes.contains("sepia"));
}
