// file: src/classifier/usage.rs
// description: language-keyed quick-start steps for a repository
// reference: fixed lookup table

const PYTHON_STEPS: &[&str] = &[
    "Create a virtual environment: python -m venv venv",
    "Install dependencies: pip install -r requirements.txt",
    "Run the project: python main.py",
];

const JAVA_STEPS: &[&str] = &[
    "Build with Maven: mvn clean install",
    "Run the project: java -jar target/*.jar",
];

const NODE_STEPS: &[&str] = &[
    "Install dependencies: npm install",
    "Start the dev server: npm run dev",
];

const GO_STEPS: &[&str] = &[
    "Download dependencies: go mod download",
    "Run the project: go run main.go",
];

const RUST_STEPS: &[&str] = &[
    "Build the project: cargo build --release",
    "Run the project: cargo run",
];

const GENERIC_STEPS: &[&str] = &[
    "Install dependencies as described in README.md",
    "Start the project",
];

fn language_steps(language: &str) -> &'static [&'static str] {
    match language {
        "Python" => PYTHON_STEPS,
        "Java" => JAVA_STEPS,
        "JavaScript" | "TypeScript" => NODE_STEPS,
        "Go" => GO_STEPS,
        "Rust" => RUST_STEPS,
        _ => GENERIC_STEPS,
    }
}

pub fn usage_steps(full_name: &str, language: &str) -> Vec<String> {
    let dir = full_name.rsplit('/').next().unwrap_or(full_name);

    let mut steps = vec![
        format!("Clone the repository: git clone https://github.com/{}", full_name),
        format!("Enter the project directory: cd {}", dir),
    ];
    steps.extend(language_steps(language).iter().map(|s| s.to_string()));
    steps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steps_start_with_clone_and_cd() {
        let steps = usage_steps("acme/widget", "Python");
        assert_eq!(steps[0], "Clone the repository: git clone https://github.com/acme/widget");
        assert_eq!(steps[1], "Enter the project directory: cd widget");
        assert_eq!(steps.len(), 5);
    }

    #[test]
    fn test_unknown_language_gets_generic_fallback() {
        let steps = usage_steps("acme/widget", "COBOL");
        assert_eq!(steps.len(), 4);
        assert_eq!(steps[2], GENERIC_STEPS[0]);
        assert_eq!(steps[3], GENERIC_STEPS[1]);
    }

    #[test]
    fn test_typescript_shares_node_steps() {
        assert_eq!(
            usage_steps("a/b", "TypeScript")[2..],
            usage_steps("a/b", "JavaScript")[2..]
        );
    }
}
