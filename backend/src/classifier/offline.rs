use lazy_static::lazy_static;
use regex::Regex;
use shared::Verdict;

const FRAUD_KEYWORDS: &[&str] = &[
    "otp",
    "kyc",
    "urgent",
    "immediately",
    "verify",
    "verification",
    "blocked",
    "suspend",
    "suspended",
    "lottery",
    "gift",
    "refund",
    "click",
    "link",
    "qr",
    "scan",
    "pin",
    "password",
    "cvv",
    "update account",
    "reset",
    "collect request",
    "upi collect",
    "call",
    "whatsapp",
    "telegram",
    "send money",
    "transfer",
    "prize",
    "winner",
    "free",
    "limited time",
    "offer",
    "bonus",
    "bank manager",
    "customer care",
    "support",
];

const MEDIATE_SIGNALS: &[&str] = &["unknown", "unexpected", "strange", "suspicious"];

const SAFE_PATTERNS: &[&str] = &[
    r"upi payment received",
    r"credited to your account",
    r"debit of inr .* via upi",
    r"transaction id|txn id|utr",
    r"payment successful",
    r"thank you for using",
];

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref LINK_OR_PHONE: Regex =
        Regex::new(r"https?://|\bbit\.ly\b|tinyurl|\.link\b|\d{10}\b").unwrap();
    static ref AMOUNT: Regex = Regex::new(r"inr\s*\d+|rs\.?\s*\d+|\b\d{3,}\b").unwrap();
    static ref EMAIL_LIKE: Regex = Regex::new(r"[a-z0-9_.-]+@[a-z]+").unwrap();
    static ref SAFE: Vec<Regex> = SAFE_PATTERNS
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect();
}

/// Offline-only heuristic classifier. Scores a message against keyword and
/// pattern tables and buckets the score into a verdict; stays indecisive
/// (Mediate) in the grey zone so the online stage can weigh in.
pub struct OfflineClassifier;

impl OfflineClassifier {
    pub fn normalize(text: &str) -> String {
        WHITESPACE
            .replace_all(&text.trim().to_lowercase(), " ")
            .into_owned()
    }

    pub fn score(normalized: &str) -> u32 {
        let mut score = 0;
        for kw in FRAUD_KEYWORDS {
            if normalized.contains(kw) {
                score += 2;
            }
        }
        if LINK_OR_PHONE.is_match(normalized) {
            score += 3;
        }
        if AMOUNT.is_match(normalized)
            && (normalized.contains("urgent") || normalized.contains("immediately"))
        {
            score += 2;
        }
        if EMAIL_LIKE.is_match(normalized) {
            score += 1;
        }
        score
    }

    fn is_safe_like(normalized: &str) -> bool {
        SAFE.iter().any(|p| p.is_match(normalized))
    }

    pub fn predict(&self, text: &str) -> Option<Verdict> {
        if text.trim().is_empty() {
            return None;
        }
        let t = Self::normalize(text);
        let score = Self::score(&t);
        log::debug!("Offline score: {}", score);

        if Self::is_safe_like(&t) && score <= 1 {
            return Some(Verdict::NotFraud);
        }
        if score >= 5 {
            return Some(Verdict::Fraud);
        }
        if MEDIATE_SIGNALS.iter().any(|sig| t.contains(sig)) {
            return Some(Verdict::Mediate);
        }
        if (2..=4).contains(&score) {
            return Some(Verdict::Mediate);
        }
        Some(Verdict::NotFraud)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_indecisive() {
        assert_eq!(OfflineClassifier.predict(""), None);
        assert_eq!(OfflineClassifier.predict("   \n "), None);
    }

    #[test]
    fn normalize_collapses_whitespace_and_case() {
        assert_eq!(
            OfflineClassifier::normalize("  URGENT\n\tVerify   NOW "),
            "urgent verify now"
        );
    }

    #[test]
    fn receipt_like_messages_are_not_fraud() {
        let verdict = OfflineClassifier
            .predict("UPI payment received from Ramesh, txn id 128870");
        assert_eq!(verdict, Some(Verdict::NotFraud));
    }

    #[test]
    fn keyword_and_link_pileup_is_fraud() {
        let verdict = OfflineClassifier.predict(
            "URGENT your account is blocked, verify OTP at http://bit.ly/secure-pay",
        );
        assert_eq!(verdict, Some(Verdict::Fraud));
    }

    #[test]
    fn mediate_signal_words_stay_undecided() {
        let verdict = OfflineClassifier.predict("an unknown person messaged me today");
        assert_eq!(verdict, Some(Verdict::Mediate));
    }

    #[test]
    fn mid_scores_stay_undecided() {
        // Single keyword hit lands in the 2..=4 band.
        let verdict = OfflineClassifier.predict("they asked me to verify something");
        assert_eq!(verdict, Some(Verdict::Mediate));
    }

    #[test]
    fn plain_conversation_is_not_fraud() {
        let verdict =
            OfflineClassifier.predict("Hey, are we still meeting at the cafe tonight?");
        assert_eq!(verdict, Some(Verdict::NotFraud));
    }

    #[test]
    fn urgency_with_amount_raises_the_score() {
        let with_amount = OfflineClassifier::score(&OfflineClassifier::normalize(
            "urgent, pay inr 5000 now",
        ));
        let without_amount =
            OfflineClassifier::score(&OfflineClassifier::normalize("urgent, pay now"));
        assert!(with_amount > without_amount);
    }
}
