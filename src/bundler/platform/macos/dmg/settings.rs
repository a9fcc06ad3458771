//! dmgbuild settings script generation.
//!
//! dmgbuild reads its layout from a Python file. Values are inserted into
//! single-quoted string literals, so every one of them goes through
//! [`escape_python_str`] before rendering.

use crate::bundler::{
    Environment,
    error::Result,
    template::{self, Escape, escape_python_str},
};
use std::path::Path;

/// Icon position of the app inside the window.
pub const APP_ICON_POSITION: (u32, u32) = (140, 120);
/// Icon position of the Applications link.
pub const APPLICATIONS_ICON_POSITION: (u32, u32) = (500, 120);

#[derive(serde::Serialize)]
struct SettingsContext {
    app_path: String,
    app_name: String,
    icon: String,
    app_x: u32,
    app_y: u32,
    applications_x: u32,
    applications_y: u32,
}

const SETTINGS_TEMPLATE: &str = r#"import os

files = ['{{app_path}}']
symlinks = { 'Applications': '/Applications' }

icon = '{{icon}}'

icon_locations = {
    '{{app_name}}': ({{app_x}}, {{app_y}}),
    'Applications': ({{applications_x}}, {{applications_y}})
}

background = 'builtin-arrow'

show_status_bar = False
show_tab_view = False
show_toolbar = False
show_pathbar = False
show_sidebar = False

show_icon_preview = False

default_view = 'icon-view'
"#;

/// Renders the settings script for the `.app` at `app_path`.
pub fn render(env: &Environment, app_path: &Path, app_name: &str) -> Result<String> {
    let context = SettingsContext {
        app_path: escape_python_str(&app_path.display().to_string()),
        app_name: escape_python_str(app_name),
        icon: escape_python_str(&env.assets_dir().join("icon.icns").display().to_string()),
        app_x: APP_ICON_POSITION.0,
        app_y: APP_ICON_POSITION.1,
        applications_x: APPLICATIONS_ICON_POSITION.0,
        applications_y: APPLICATIONS_ICON_POSITION.1,
    };

    template::render("dmgbuild settings", SETTINGS_TEMPLATE, &context, Escape::Verbatim)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::BuildFlags;

    fn environment(root: &Path) -> Environment {
        std::fs::write(
            root.join("Cargo.toml"),
            "[package]\nname = \"demo\"\nversion = \"0.1.0\"\n\n[package.metadata.flutter]\nversion = \"1.12.13\"\n",
        )
        .unwrap();
        Environment::discover(&BuildFlags::new(root)).unwrap()
    }

    #[test]
    fn settings_place_app_and_applications_link() {
        let tmp = tempfile::tempdir().unwrap();
        let env = environment(tmp.path());
        let app = env.output_dir().join("demo.app");

        let script = render(&env, &app, "demo.app").unwrap();
        assert!(script.contains(&format!("files = ['{}']", app.display())));
        assert!(script.contains("'demo.app': (140, 120)"));
        assert!(script.contains("'Applications': (500, 120)"));
        assert!(script.contains("background = 'builtin-arrow'"));
        assert!(script.contains("default_view = 'icon-view'"));
    }

    #[test]
    fn quotes_in_names_are_escaped() {
        let tmp = tempfile::tempdir().unwrap();
        let env = environment(tmp.path());
        let script = render(&env, Path::new("/out/it's.app"), "it's.app").unwrap();
        assert!(script.contains(r"files = ['/out/it\'s.app']"));
        assert!(script.contains(r"'it\'s.app': (140, 120)"));
    }
}
