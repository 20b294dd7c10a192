//! Guidance output for frameworks configured without file patching
//!
//! React, Vue and plain JS/jQuery apps have no build-config surface we can
//! safely patch (apart from a known React entry file), so the tool prints
//! the import lines instead.

use crate::error::Result;
use crate::options::InstallSettings;
use crate::patch::{patch_text, Insertion, TextEdit};
use crate::project::{ProjectDescriptor, StylesheetFormat};
use colored::Colorize;
use regex::Regex;
use semver::Version;

const DOCS_URL: &str = "https://docs.mobiscroll.com";

fn css_file(project: &ProjectDescriptor) -> &'static str {
    match project.stylesheet {
        StylesheetFormat::Scss => "mobiscroll.scss",
        StylesheetFormat::Css => "mobiscroll.min.css",
    }
}

fn is_v5(settings: &InstallSettings) -> bool {
    Version::parse(&settings.version).is_ok_and(|v| v.major >= 5)
}

/// Print React import guidance and, when a known entry file exists, add
/// the stylesheet import to it.
pub fn react(project: &ProjectDescriptor, settings: &InstallSettings) -> Result<()> {
    let css_import = format!(
        "import '{}/dist/css/{}';",
        settings.import_name,
        css_file(project)
    );

    println!();
    if is_v5(settings) {
        println!(
            "import {{ Eventcalendar }} from '{}'; {}",
            settings.import_name,
            "/* or import any other component */".dimmed()
        );
        println!("{}", css_import);
        println!();
        println!(
            "Find more information about the usage on the documentation page: {}",
            format!("{}/react", DOCS_URL).cyan()
        );
    } else {
        println!("You can import Mobiscroll to your react component like:");
        println!();
        println!("import mobiscroll from '{}';", settings.import_name);
        println!("{}", css_import);
    }
    println!();

    patch_react_entry(project, settings, &css_import);
    Ok(())
}

/// Add the stylesheet import to the app's entry file when one of the
/// conventional names is present. Absence is fine - the guidance above
/// already covers the manual route.
fn patch_react_entry(project: &ProjectDescriptor, _settings: &InstallSettings, css_import: &str) {
    let edit = TextEdit {
        skip_if_contains: None,
        remove: vec![
            Regex::new(r"(?m)^import '@mobiscroll/react[^']*';\n").expect("static pattern"),
        ],
        insert: Some(Insertion::Prepend(format!("{}\n", css_import))),
    };

    for candidate in ["src/index.tsx", "src/index.js", "src/App.tsx", "src/App.js"] {
        let path = project.root.join(candidate);
        if path.exists() {
            if let Ok(true) = patch_text(&path, &edit) {
                println!("  Added the stylesheet import to {}", candidate.dimmed());
            }
            return;
        }
    }
}

pub fn vue(project: &ProjectDescriptor, settings: &InstallSettings) {
    let star = if is_v5(settings) { "* as " } else { "" };
    println!();
    println!("A vue.js application detected. Here is how to import Mobiscroll into your app:");
    println!();
    println!("import {}mobiscroll from '{}';", star, settings.import_name);
    println!(
        "import '{}/dist/css/{}';",
        settings.import_name,
        css_file(project)
    );
    println!();
}

pub fn javascript(project: &ProjectDescriptor, settings: &InstallSettings) {
    println!();
    println!(
        "Mobiscroll is installed. Include it in your app the following way:"
    );
    println!();
    println!("import mobiscroll from '{}';", settings.import_name);
    println!(
        "import '{}/dist/css/{}';",
        settings.import_name,
        css_file(project)
    );
    println!();
    println!(
        "Find more information on the documentation page: {}",
        DOCS_URL.cyan()
    );
    println!();
}
