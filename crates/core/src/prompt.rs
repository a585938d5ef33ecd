//! System prompt assembly.
//!
//! The prompt is rebuilt on every turn so that modifier changes and newly
//! remembered people are visible to the model immediately:
//!
//! 1. Persona profile (name, description, non-zero modifiers)
//! 2. Current value of every modifier
//! 3. Notes about people mentioned in the latest message
//! 4. Guidance on using the relationship tools
//! 5. Style reminder
//! 6. Optional coach warning

use crate::persona::Persona;
use crate::relationship::RelationshipRecord;

pub const RELATIONSHIP_GUIDANCE: &str = "

RELATIONSHIP MEMORY:
You have access to tools for remembering details about people the user mentions. Use these naturally in conversation:

- When someone new is mentioned, add a note about them with basic information
- When you learn new information about someone, add another note
- When someone is mentioned again, recall what you know about them naturally
- Don't announce that you're \"checking notes\" or \"looking up information\" - just remember naturally
- You can acknowledge you remember someone if directly asked about your memory
- Remember family, friends, colleagues, pets, therapists - anyone important to the user

Examples:
- User mentions \"My therapist Mervin\" → add note for Mervin as therapist
- User mentions someone again → naturally recall what you know without announcing it
- User asks \"Do you remember Sarah?\" → You can say \"Yes, I remember she got promoted recently\"

Remember people naturally, like a good friend would.
";

pub const STYLE_REMINDER: &str = "
Remember to stay true to your personality traits:
- Be unflinching and loyal
- Ask questions more than giving speeches
- Surface contradictions gently but directly
- Emphasize forward motion over emotional wallowing
- Use occasional metaphors and structured reframing when helpful

Keep responses concise and grounded. Your role is to help the user move forward and grow.

Pay attention to user feedback and be willing to adjust your approach when it's not working.
";

/// Builds the system prompt for one turn.
pub struct PromptBuilder<'a> {
    persona: &'a Persona,
    relationships: &'a [RelationshipRecord],
    warning: Option<&'a str>,
}

impl<'a> PromptBuilder<'a> {
    pub fn new(persona: &'a Persona) -> Self {
        Self {
            persona,
            relationships: &[],
            warning: None,
        }
    }

    /// Records to surface in the prompt, usually the people just mentioned.
    pub fn with_relationships(mut self, records: &'a [RelationshipRecord]) -> Self {
        self.relationships = records;
        self
    }

    pub fn with_warning(mut self, warning: Option<&'a str>) -> Self {
        self.warning = warning;
        self
    }

    pub fn build(&self) -> String {
        let mut prompt = String::with_capacity(4096);
        prompt.push_str(&self.persona.build_prompt_profile());

        prompt.push_str("CURRENT MODIFIER VALUES:\n");
        for (key, value) in self.persona.modifiers().iter() {
            prompt.push_str(&format!("- {key}: {value}\n"));
        }
        prompt.push_str("\nUse these current values when calculating absolute adjustments.\n\n");

        if !self.relationships.is_empty() {
            prompt.push_str("WHAT YOU REMEMBER ABOUT PEOPLE MENTIONED:\n");
            for record in self.relationships {
                if record.relationship.is_empty() {
                    prompt.push_str(&format!("- {}\n", record.name));
                } else {
                    prompt.push_str(&format!("- {} ({})\n", record.name, record.relationship));
                }
                for note in &record.notes {
                    prompt.push_str(&format!("  - {note}\n"));
                }
            }
        }

        prompt.push_str(RELATIONSHIP_GUIDANCE);
        prompt.push_str(STYLE_REMINDER);

        if let Some(warning) = self.warning {
            prompt.push_str(&format!("\n\n[COACH WARNING] {warning}"));
        }

        prompt
    }
}
