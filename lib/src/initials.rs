/// Turns a display name into the short initials players are looked up by.
pub trait Transliterate {
    fn initials(&self, name: &str) -> String;
}

/// First letter of every word, lowercased.
///
/// Words are separated by whitespace, `-`, `_` and `.`; each CJK ideograph is a
/// word on its own and is kept as-is.
#[derive(Debug, Default, Clone, Copy)]
pub struct WordInitials;

impl Transliterate for WordInitials {
    fn initials(&self, name: &str) -> String {
        let mut initials = String::new();
        let mut word_start = true;
        for c in name.chars() {
            if is_ideograph(c) {
                initials.push(c);
                word_start = true;
            } else if c.is_whitespace() || matches!(c, '-' | '_' | '.') {
                word_start = true;
            } else {
                if word_start {
                    initials.extend(c.to_lowercase());
                }
                word_start = false;
            }
        }
        initials
    }
}

impl<F: Fn(&str) -> String> Transliterate for F {
    fn initials(&self, name: &str) -> String {
        self(name)
    }
}

fn is_ideograph(c: char) -> bool {
    matches!(c,
        '\u{3400}'..='\u{4DBF}'
        | '\u{4E00}'..='\u{9FFF}'
        | '\u{F900}'..='\u{FAFF}'
        | '\u{20000}'..='\u{2A6DF}')
}
