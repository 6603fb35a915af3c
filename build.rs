use std::fs;

const CONFIG_PATH: &str = "src/default_config.toml";
const TEMPLATE_PATH: &str = "src/prompt_template.md";

const SECTIONS: [&str; 4] = ["page", "font", "output", "generation"];

const PLACEHOLDERS: [&str; 9] = [
    "{{subject_upper}}",
    "{{author}}",
    "{{institution}}",
    "{{school_level}}",
    "{{class_phase}}",
    "{{subject}}",
    "{{time_allocation}}",
    "{{learning_outcomes}}",
    "{{learning_objectives}}",
];

fn main() {
    println!("cargo:rerun-if-changed={}", CONFIG_PATH);
    println!("cargo:rerun-if-changed={}", TEMPLATE_PATH);

    check_config();
    check_template();
}

/// The bundled config must parse and carry every section `Config` reads.
fn check_config() {
    let content = fs::read_to_string(CONFIG_PATH)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", CONFIG_PATH, e));

    let table = content
        .parse::<toml::Table>()
        .unwrap_or_else(|e| panic!("Invalid {}: {}", CONFIG_PATH, e));

    for section in SECTIONS {
        if !table.get(section).is_some_and(toml::Value::is_table) {
            panic!("{} is missing the [{}] section", CONFIG_PATH, section);
        }
    }
}

/// Every lesson field must appear in the prompt template.
fn check_template() {
    let template = fs::read_to_string(TEMPLATE_PATH)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", TEMPLATE_PATH, e));

    for placeholder in PLACEHOLDERS {
        if !template.contains(placeholder) {
            panic!("{} never uses {}", TEMPLATE_PATH, placeholder);
        }
    }
}
