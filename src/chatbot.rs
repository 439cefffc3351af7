// Keyword-matching FAQ assistant
use serde::{Deserialize, Serialize};

pub const FALLBACK_ANSWER: &str =
    "Sorry, I don't have an answer for that yet. Please contact our support team for help.";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FaqEntry {
    pub keywords: Vec<String>,
    pub answer: String,
}

// Lowercased words separated by single spaces, punctuation dropped
fn normalize_words(text: &str) -> String {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

impl FaqEntry {
    pub fn new(keywords: &[&str], answer: &str) -> Self {
        Self {
            keywords: keywords.iter().map(|k| normalize_words(k)).collect(),
            answer: answer.to_string(),
        }
    }

    // `question` is normalized and padded with a space on both ends,
    // so a keyword only counts when it lines up with whole words
    fn score(&self, question: &str) -> usize {
        self.keywords
            .iter()
            .filter(|keyword| !keyword.is_empty() && question.contains(&format!(" {keyword} ")))
            .count()
    }
}

#[derive(Debug, Clone)]
pub struct FaqBot {
    entries: Vec<FaqEntry>,
}

impl Default for FaqBot {
    fn default() -> Self {
        Self::new(default_entries())
    }
}

impl FaqBot {
    pub fn new(entries: Vec<FaqEntry>) -> Self {
        Self { entries }
    }

    // Loads a custom FAQ from a JSON array of entries
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let entries: Vec<FaqEntry> = serde_json::from_str(json)?;
        Ok(Self::new(
            entries
                .into_iter()
                .map(|e| FaqEntry {
                    keywords: e.keywords.iter().map(|k| normalize_words(k)).collect(),
                    answer: e.answer,
                })
                .collect(),
        ))
    }

    // Most keyword hits wins, earlier entries win ties
    pub fn answer(&self, question: &str) -> &str {
        let question = format!(" {} ", normalize_words(question));
        let mut best: Option<(&FaqEntry, usize)> = None;

        for entry in &self.entries {
            let score = entry.score(&question);
            if score == 0 {
                continue;
            }
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((entry, score));
            }
        }

        best.map_or(FALLBACK_ANSWER, |(entry, _)| entry.answer.as_str())
    }
}

fn default_entries() -> Vec<FaqEntry> {
    vec![
        FaqEntry::new(
            &["cancel", "cancelled", "cancellation", "refund", "refunds"],
            "You can cancel an upcoming booking from My Bookings. Ongoing and completed trips can no longer be cancelled.",
        ),
        FaqEntry::new(
            &["book", "booking", "reserve", "reservation"],
            "Open a destination, package or hotel room, choose your dates and options, then press Book Now.",
        ),
        FaqEntry::new(
            &["pay", "payment", "payments", "card"],
            "Payment is settled with our team after your booking is confirmed. You will receive a receipt right away.",
        ),
        FaqEntry::new(
            &["day tour", "overnight", "tour type"],
            "A day tour costs half of the destination budget. An overnight stay costs the full budget.",
        ),
        FaqEntry::new(
            &["van", "boat", "transport", "transportation", "transfer"],
            "Van rental adds 2,500 and boat transfer adds 1,800 to a destination booking.",
        ),
        FaqEntry::new(
            &["vat", "tax", "taxes"],
            "Receipts show a 12% VAT on top of the booking subtotal.",
        ),
        FaqEntry::new(
            &["password", "login", "log in", "account"],
            "Log in with the email you registered with. Contact support if you cannot access your account.",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("How do I CANCEL my trip?", "cancel an upcoming booking"; "cancellation")]
    #[test_case("Is there tax on the receipt?", "12% VAT"; "vat")]
    #[test_case("how much is the boat transfer", "boat transfer adds 1,800"; "transport")]
    #[test_case("what's the difference between a day tour and overnight?", "half of the destination budget"; "tour type")]
    fn test_default_answers(question: &str, expected_fragment: &str) {
        let bot = FaqBot::default();
        assert!(bot.answer(question).contains(expected_fragment));
    }

    #[test_case("What's the advantage of a package?"; "van inside advantage")]
    #[test_case("Can I take a taxi from the airport?"; "tax inside taxi")]
    #[test_case("Is the caravan included?"; "van inside caravan")]
    #[test_case("Any bookstores nearby?"; "book inside bookstores")]
    fn test_keywords_need_whole_words(question: &str) {
        assert_eq!(FaqBot::default().answer(question), FALLBACK_ANSWER);
    }

    #[test]
    fn test_phrase_keywords_ignore_punctuation() {
        let bot = FaqBot::default();
        assert!(bot.answer("Day-tour or overnight?").contains("half of the destination budget"));
        assert!(bot.answer("I can't LOG  IN!").contains("Log in with the email"));
        assert!(bot.answer("Was my booking cancelled?").contains("cancel an upcoming booking"));
    }

    #[test]
    fn test_fallback() {
        assert_eq!(FaqBot::default().answer("what's the weather like?"), FALLBACK_ANSWER);
        assert_eq!(FaqBot::new(vec![]).answer("cancel"), FALLBACK_ANSWER);
    }

    #[test]
    fn test_highest_score_wins_and_ties_keep_order() {
        let bot = FaqBot::new(vec![
            FaqEntry::new(&["hotel"], "first"),
            FaqEntry::new(&["hotel", "pool"], "second"),
            FaqEntry::new(&["pool"], "third"),
        ]);
        assert_eq!(bot.answer("Does the hotel have a pool?"), "second");
        assert_eq!(bot.answer("hotel"), "first");
        assert_eq!(bot.answer("pool"), "second");
    }

    #[test]
    fn test_from_json_lowercases_keywords() {
        let bot = FaqBot::from_json(r#"[{"keywords": ["WiFi"], "answer": "Free wifi everywhere"}]"#).unwrap();
        assert_eq!(bot.answer("is there wifi?"), "Free wifi everywhere");
        assert!(FaqBot::from_json("{").is_err());
    }
}
