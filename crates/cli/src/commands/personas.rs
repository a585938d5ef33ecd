//! `lucan personas` / `lucan --list-personas`: list available personas.

use lucan_core::persona::TEMPLATE_DIR;
use lucan_core::PersonaDirectory;

pub async fn run(persona: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(persona)?;
    let directory = PersonaDirectory::new(config.personas_dir());
    let available = directory.list();

    if available.is_empty() {
        println!("No personas found in memory/personas/");
        println!(
            "Create personas using the template in {}/",
            directory.root().join(TEMPLATE_DIR).display()
        );
        return Ok(());
    }

    println!("Available personas:");
    for name in &available {
        if *name == config.persona {
            println!("  • {name} (current)");
        } else {
            println!("  • {name}");
        }
    }
    println!();
    println!("Use with: lucan --persona <name>");
    Ok(())
}
