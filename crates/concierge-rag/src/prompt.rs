//! Prompt assembly
//!
//! Two fixed instruction templates: Hebrew for `he`, English for every
//! other language code.
//!
//! Author: hephaex@gmail.com

use concierge_core::{ChatPrompt, PersonaConfig};

/// Language code that selects the Hebrew templates
pub const HEBREW_LANG: &str = "he";

/// Builder for the system/user prompt pair
pub struct PromptBuilder<'a> {
    persona: &'a PersonaConfig,
    lang: String,
    question: String,
    context: String,
}

impl<'a> PromptBuilder<'a> {
    /// Create a new prompt builder
    pub fn new(persona: &'a PersonaConfig) -> Self {
        Self {
            persona,
            lang: HEBREW_LANG.to_string(),
            question: String::new(),
            context: String::new(),
        }
    }

    /// Set the answer language
    pub fn lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    /// Set the guest question
    pub fn question(mut self, q: impl Into<String>) -> Self {
        self.question = q.into();
        self
    }

    /// Set the rendered context block
    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    /// Build the final prompt
    pub fn build(self) -> ChatPrompt {
        let name = &self.persona.assistant_name;
        let property = &self.persona.property_name;

        if self.lang == HEBREW_LANG {
            ChatPrompt {
                system: format!(
                    "את/ה {name}, הקונסיארג' הדיגיטלי של {property}.\n\
                     ענה/י אך ורק על סמך קטעי המדריך שסופקו. אסור להמציא או לנחש.\n\
                     אם המידע לא נמצא בקטעים — אמור/י שאין מידע במדריך והצע/י ליצור קשר עם המארחים.\n\
                     תשובה קצרה ומעשית."
                ),
                user: format!(
                    "שאלת האורח/ת: {}\n\nקטעי המדריך (המקור היחיד למידע):\n{}",
                    self.question, self.context
                ),
            }
        } else {
            ChatPrompt {
                system: format!(
                    "You are {name}, the digital concierge for {property}.\n\
                     Answer ONLY using the provided guide excerpts. Do not invent or guess.\n\
                     If the information is not present, say so and suggest contacting the hosts.\n\
                     Keep the answer short and practical."
                ),
                user: format!(
                    "Guest question: {}\n\nGuide excerpts (your only source of truth):\n{}",
                    self.question, self.context
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english_prompt() {
        let persona = PersonaConfig::default();
        let prompt = PromptBuilder::new(&persona)
            .lang("en")
            .question("What time is check-in?")
            .context("[1] (info) Check-in is after 15:00.")
            .build();

        assert_eq!(
            prompt.system,
            "You are Blue, the digital concierge for Out of the Blue.\n\
             Answer ONLY using the provided guide excerpts. Do not invent or guess.\n\
             If the information is not present, say so and suggest contacting the hosts.\n\
             Keep the answer short and practical."
        );
        assert_eq!(
            prompt.user,
            "Guest question: What time is check-in?\n\n\
             Guide excerpts (your only source of truth):\n\
             [1] (info) Check-in is after 15:00."
        );
    }

    #[test]
    fn test_hebrew_is_default() {
        let persona = PersonaConfig::default();
        let prompt = PromptBuilder::new(&persona)
            .question("מתי הצ'ק-אין?")
            .context("ctx")
            .build();

        assert!(prompt.system.starts_with("את/ה Blue"));
        assert!(prompt.system.contains("המארחים"));
        assert_eq!(
            prompt.user,
            "שאלת האורח/ת: מתי הצ'ק-אין?\n\nקטעי המדריך (המקור היחיד למידע):\nctx"
        );
    }

    #[test]
    fn test_non_hebrew_codes_use_english() {
        let persona = PersonaConfig::default();
        for lang in ["en", "fr", "HE", ""] {
            let prompt = PromptBuilder::new(&persona).lang(lang).build();
            assert!(prompt.user.starts_with("Guest question:"), "lang {lang:?}");
        }
    }

    #[test]
    fn test_persona_names() {
        let persona = PersonaConfig {
            assistant_name: "Coral".to_string(),
            property_name: "Reef House".to_string(),
        };
        let prompt = PromptBuilder::new(&persona).lang("en").build();
        assert!(prompt
            .system
            .starts_with("You are Coral, the digital concierge for Reef House."));
    }
}
