//! Slug generation for branch names

/// Turns free text into a token safe for branch names and URLs.
pub trait Slugifier: Send + Sync {
    fn slugify(&self, text: &str) -> String;
}

/// Lowercase, dash separated slug with Latin accents folded to ASCII.
/// Long slugs are cut at a word boundary.
#[derive(Debug, Clone)]
pub struct LatinSlugifier {
    max_length: usize,
}

impl Default for LatinSlugifier {
    fn default() -> Self {
        Self { max_length: 50 }
    }
}

impl LatinSlugifier {
    pub fn with_max_length(max_length: usize) -> Self {
        Self { max_length }
    }
}

impl Slugifier for LatinSlugifier {
    fn slugify(&self, text: &str) -> String {
        let folded = text.chars().map(fold_latin).collect::<String>().to_lowercase();

        let normalized = folded
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|s| !s.is_empty())
            .collect::<Vec<&str>>()
            .join("-");

        if normalized.len() <= self.max_length {
            return normalized;
        }

        // A single long word is cut mid-word
        if !normalized.contains('-') {
            return normalized.chars().take(self.max_length).collect();
        }

        let mut result = String::new();
        for word in normalized.split('-') {
            let next_length = if result.is_empty() {
                word.len()
            } else {
                result.len() + 1 + word.len()
            };
            if next_length > self.max_length {
                break;
            }
            if !result.is_empty() {
                result.push('-');
            }
            result.push_str(word);
        }

        if result.is_empty() {
            return normalized.chars().take(self.max_length).collect();
        }
        result
    }
}

fn fold_latin(c: char) -> String {
    let folded = match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'ā' | 'ă' | 'ą' => "a",
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' | 'Ā' | 'Ă' | 'Ą' => "A",
        'æ' => "ae",
        'Æ' => "AE",
        'ç' | 'ć' | 'č' => "c",
        'Ç' | 'Ć' | 'Č' => "C",
        'ď' | 'đ' => "d",
        'Ď' | 'Đ' => "D",
        'è' | 'é' | 'ê' | 'ë' | 'ē' | 'ę' | 'ě' => "e",
        'È' | 'É' | 'Ê' | 'Ë' | 'Ē' | 'Ę' | 'Ě' => "E",
        'ì' | 'í' | 'î' | 'ï' | 'ī' => "i",
        'Ì' | 'Í' | 'Î' | 'Ï' | 'Ī' => "I",
        'ł' => "l",
        'Ł' => "L",
        'ñ' | 'ń' | 'ň' => "n",
        'Ñ' | 'Ń' | 'Ň' => "N",
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'ō' | 'ő' => "o",
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ø' | 'Ō' | 'Ő' => "O",
        'œ' => "oe",
        'Œ' => "OE",
        'ř' => "r",
        'Ř' => "R",
        'ś' | 'š' | 'ş' => "s",
        'Ś' | 'Š' | 'Ş' => "S",
        'ß' => "ss",
        'ť' | 'ţ' => "t",
        'Ť' | 'Ţ' => "T",
        'ù' | 'ú' | 'û' | 'ü' | 'ū' | 'ů' | 'ű' => "u",
        'Ù' | 'Ú' | 'Û' | 'Ü' | 'Ū' | 'Ů' | 'Ű' => "U",
        'ý' | 'ÿ' => "y",
        'Ý' | 'Ÿ' => "Y",
        'ź' | 'ż' | 'ž' => "z",
        'Ź' | 'Ż' | 'Ž' => "Z",
        _ => return c.to_string(),
    };
    folded.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_slug() {
        let slugifier = LatinSlugifier::default();
        assert_eq!(slugifier.slugify("Fix the Login  Form!"), "fix-the-login-form");
        assert_eq!(slugifier.slugify("  --already-dashed--  "), "already-dashed");
    }

    #[test]
    fn test_latin_characters_are_folded() {
        let slugifier = LatinSlugifier::default();
        assert_eq!(slugifier.slugify("Crème brûlée à la carte"), "creme-brulee-a-la-carte");
        assert_eq!(slugifier.slugify("Straße"), "strasse");
    }

    #[test]
    fn test_truncates_at_word_boundary() {
        let slugifier = LatinSlugifier::with_max_length(15);
        assert_eq!(slugifier.slugify("add support for custom key bindings"), "add-support-for");
    }

    #[test]
    fn test_single_long_word_is_cut() {
        let slugifier = LatinSlugifier::with_max_length(5);
        assert_eq!(slugifier.slugify("supercalifragilistic"), "super");
    }

    #[test]
    fn test_first_word_longer_than_limit() {
        let slugifier = LatinSlugifier::with_max_length(5);
        assert_eq!(slugifier.slugify("extraordinary idea"), "extra");
    }
}
