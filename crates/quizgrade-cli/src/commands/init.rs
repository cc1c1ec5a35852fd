//! The `quizgrade init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    // Create quizgrade.toml
    if std::path::Path::new("quizgrade.toml").exists() {
        println!("quizgrade.toml already exists, skipping.");
    } else {
        std::fs::write("quizgrade.toml", SAMPLE_CONFIG)?;
        println!("Created quizgrade.toml");
    }

    // Create example question set
    std::fs::create_dir_all("question-sets")?;
    let example_path = std::path::Path::new("question-sets/example.toml");
    if example_path.exists() {
        println!("question-sets/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_QUESTION_SET)?;
        println!("Created question-sets/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit quizgrade.toml with your API key");
    println!("  2. Run: quizgrade validate --questions question-sets/example.toml");
    println!("  3. Run: quizgrade run --questions question-sets/example.toml --answers answers.json --offline");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# quizgrade configuration

[graders.anthropic]
type = "anthropic"
api_key = "${ANTHROPIC_API_KEY}"

[graders.ollama]
type = "ollama"
base_url = "http://localhost:11434"
model = "llama3.1:8b"

default_grader = "anthropic"
judge_timeout_secs = 30
english_text_policy = "similarity"
"#;

const EXAMPLE_QUESTION_SET: &str = r#"[question_set]
id = "example"
name = "Example Question Set"
description = "A small mixed set to get started"
subject = "math"

[[questions]]
id = "add-12"
prompt = "What is 7 + 5?"
difficulty = "easy"
hints = [
    "Start from 7 and count up",
    "It is an even number",
    "It is more than 10",
    "7 + 5 = 12",
]

[questions.answer]
type = "number"
value = 12

[[questions]]
id = "evaporation"
prompt = "Why do puddles disappear on a sunny day?"
subject = "science"
difficulty = "medium"
hints = [
    "Think about what heat does to water",
    "The water does not soak away",
    "The water turns into a gas",
    "This process is called evaporation",
]

[questions.answer]
type = "explanation"
value = "The sun heats the water until it evaporates into the air."
keywords = ["evaporates", "heat"]

[[questions]]
id = "plural-child"
prompt = "What is the plural of 'child'?"
subject = "english"
difficulty = "easy"
hints = [
    "It is not 'childs'",
    "It is an irregular plural",
    "It ends in -ren",
    "child becomes children",
]

[questions.answer]
type = "text"
value = "children"
"#;
