//! `lucan relationships`: show remembered people.

use lucan_core::{RelationshipRecord, RelationshipStore};
use lucan_memory::FileRelationshipStore;

pub async fn run(name: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(None)?;
    let store = FileRelationshipStore::new(config.relationships_dir())?;

    match name {
        Some(name) => match store.get_notes(name).await? {
            Some(record) => print!("{}", format_record(&record)),
            None => println!("No information found about {name}"),
        },
        None => {
            let records = store.list().await?;
            if records.is_empty() {
                println!("No relationships remembered yet.");
                println!("Files live in {}", store.dir().display());
                return Ok(());
            }
            println!("Remembered people ({}):", records.len());
            for record in &records {
                println!("  • {}", summary_line(record));
            }
        }
    }
    Ok(())
}

fn summary_line(record: &RelationshipRecord) -> String {
    let notes = match record.notes.len() {
        1 => "1 note".to_string(),
        n => format!("{n} notes"),
    };
    if record.relationship.is_empty() {
        format!("{}: {notes}", record.name)
    } else {
        format!("{} ({}): {notes}", record.name, record.relationship)
    }
}

fn format_record(record: &RelationshipRecord) -> String {
    let mut out = format!("{}\n", record.name);
    if !record.relationship.is_empty() {
        out.push_str(&format!("  Relationship:    {}\n", record.relationship));
    }
    if let Some(first) = &record.first_mentioned {
        out.push_str(&format!("  First mentioned: {first}\n"));
    }
    if let Some(last) = &record.last_updated {
        out.push_str(&format!("  Last updated:    {last}\n"));
    }
    if record.notes.is_empty() {
        out.push_str("  (no notes yet)\n");
    } else {
        out.push_str("  Notes:\n");
        for note in &record.notes {
            out.push_str(&format!("    - {note}\n"));
        }
    }
    out
}
