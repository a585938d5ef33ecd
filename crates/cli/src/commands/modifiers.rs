//! `lucan modifiers`: show or change the persona's modifiers.
//!
//! Without flags this prints the loaded values. `--set key=value` and
//! `--adjust key=delta` may be repeated; each change is saved as it is made.

use lucan_core::Persona;

pub async fn run(
    persona: Option<&str>,
    set: &[String],
    adjust: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(persona)?;
    let mut persona = super::load_persona(&config)?;

    let mut failures = 0;
    for assignment in set {
        let (key, value) = parse_assignment(assignment)?;
        report(persona.set_modifier(&key, value), &mut failures);
    }
    for assignment in adjust {
        let (key, delta) = parse_assignment(assignment)?;
        report(persona.adjust_modifier(&key, delta), &mut failures);
    }

    if !set.is_empty() || !adjust.is_empty() {
        println!();
    }
    print_summary(&persona);

    if failures > 0 {
        return Err(format!("{failures} modifier change(s) failed").into());
    }
    Ok(())
}

fn report(
    result: Result<lucan_core::ModifierChange, lucan_core::error::PersonaError>,
    failures: &mut usize,
) {
    match result {
        Ok(change) => println!("{change}"),
        Err(e) => {
            eprintln!("Error: {e}");
            *failures += 1;
        }
    }
}

fn print_summary(persona: &Persona) {
    println!("Persona: {}", persona.name());
    print!("{}", persona.diagnostic_summary());
}

/// Parse `key=value` with an integer value.
fn parse_assignment(input: &str) -> Result<(String, i64), String> {
    let (key, value) = input
        .split_once('=')
        .ok_or_else(|| format!("Expected KEY=VALUE, got '{input}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("Missing modifier name in '{input}'"));
    }
    let value = value
        .trim()
        .parse::<i64>()
        .map_err(|_| format!("Modifier value must be an integer, got '{}'", value.trim()))?;
    Ok((key.to_string(), value))
}
