//! Deterministic rules used when the advisory backend is unavailable or
//! returns something unusable. Every advisor operation bottoms out here,
//! so callers always get a usable result.

use campus_types::models::Priority;

/// Urgency lexicon, Turkish and English. Matched as substrings of the
/// lowercased title + description, same as the original rule.
const HIGH_KEYWORDS: &[&str] = &[
    "acil",
    "hızlı",
    "urgent",
    "çok önemli",
    "acıl",
    "kapalı",
    "sistem",
    "çöktü",
];

const MEDIUM_KEYWORDS: &[&str] = &[
    "yavaş",
    "sürekli",
    "kopuyor",
    "erişim",
    "bağlantı",
    "ağ",
    "internet",
];

pub const EXPLANATION: &str = "Öneriler kural tabanlı veya LLM tarafından üretilmiştir.";

/// Rule-based priority: High keywords win over Medium ones, default Low.
pub fn priority_rule(title: &str, description: &str) -> Priority {
    let txt = format!("{} {}", title, description).to_lowercase();
    if HIGH_KEYWORDS.iter().any(|k| txt.contains(k)) {
        return Priority::High;
    }
    if MEDIUM_KEYWORDS.iter().any(|k| txt.contains(k)) {
        return Priority::Medium;
    }
    Priority::Low
}

/// Ordered priority options: best guess first, the rest in High/Medium/Low
/// order.
pub fn priority_options(top: Priority) -> Vec<Priority> {
    let mut options = vec![top];
    for p in Priority::ALL {
        if !options.contains(&p) {
            options.push(p);
        }
    }
    options
}

/// Ordered department options: best guess first, then remaining configured
/// departments, capped at three.
pub fn department_options(top: Option<&str>, departments: &[String]) -> Vec<String> {
    let mut options: Vec<String> = top.map(|d| vec![d.to_string()]).unwrap_or_default();
    for d in departments {
        if options.len() >= 3 {
            break;
        }
        if !options.contains(d) {
            options.push(d.clone());
        }
    }
    options
}

/// Title backfill: the given title when present, otherwise the first 80
/// characters of the description.
pub fn fallback_title(title: Option<&str>, description: &str) -> Option<String> {
    match title {
        Some(t) if !t.trim().is_empty() => Some(t.to_string()),
        _ if !description.is_empty() => Some(truncate_chars(description, 80)),
        _ => None,
    }
}

/// Short summary snippet: whole text up to 200 characters, preferring a
/// sentence boundary past the 150th character.
pub fn snippet(title: &str, description: &str) -> String {
    let full = if title.is_empty() {
        description.to_string()
    } else {
        format!("{}\n\n{}", title, description)
    };
    let full = full.trim();

    if full.chars().count() <= 200 {
        return full.to_string();
    }

    let tail_start = full
        .char_indices()
        .nth(150)
        .map(|(i, _)| i)
        .unwrap_or(full.len());
    if let Some(rel) = full[tail_start..].find(". ") {
        let end = tail_start + rel + 1;
        if full[..end].chars().count() < 300 {
            return full[..end].to_string();
        }
    }
    truncate_chars(full, 200)
}

/// Canned support-reply draft used when no advisory backend is configured.
pub fn reply_template(title: &str, description: &str) -> String {
    let short = if description.chars().count() > 150 {
        truncate_chars(description.trim(), 150)
    } else {
        description.trim().to_string()
    };

    format!(
        "Merhaba,\n\nTalebinizi aldık: '{}'. \nKısa özet: {}\n\n\
         En kısa sürede ilgileneceğiz. Ek bilgi gerekiyorsa lütfen bize iletin.\n\n\
         Saygılarımızla,\nDestek Ekibi",
        title, short
    )
}

/// Truncate to `n` characters on a char boundary, appending an ellipsis.
pub fn truncate_chars(s: &str, n: usize) -> String {
    match s.char_indices().nth(n) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urgent_keywords_map_to_high() {
        assert_eq!(priority_rule("", "sistem çöktü, hiçbir şey açılmıyor"), Priority::High);
        assert_eq!(priority_rule("Urgent help", "printer on fire"), Priority::High);
        assert_eq!(priority_rule("Acil durum", ""), Priority::High);
    }

    #[test]
    fn connectivity_keywords_map_to_medium() {
        assert_eq!(priority_rule("", "internet çok yavaş"), Priority::Medium);
        assert_eq!(priority_rule("Wifi", "bağlantı sürekli kopuyor"), Priority::Medium);
    }

    #[test]
    fn unmatched_text_defaults_to_low() {
        assert_eq!(priority_rule("Soru", "ders programı hakkında bilgi"), Priority::Low);
    }

    #[test]
    fn high_beats_medium_when_both_match() {
        assert_eq!(priority_rule("", "internet erişimi yok, sistem kapalı"), Priority::High);
    }

    #[test]
    fn priority_options_lead_with_best_guess() {
        assert_eq!(
            priority_options(Priority::Medium),
            vec![Priority::Medium, Priority::High, Priority::Low]
        );
        assert_eq!(
            priority_options(Priority::High),
            vec![Priority::High, Priority::Medium, Priority::Low]
        );
    }

    #[test]
    fn department_options_capped_at_three() {
        let departments: Vec<String> = ["A", "B", "C", "D"].iter().map(|s| s.to_string()).collect();
        let options = department_options(Some("C"), &departments);
        assert_eq!(options, vec!["C", "A", "B"]);
    }

    #[test]
    fn title_backfill_truncates_on_char_boundary() {
        let description = "ğ".repeat(100);
        let title = fallback_title(None, &description).unwrap();
        assert_eq!(title.chars().count(), 83); // 80 chars + "..."
        assert!(title.ends_with("..."));

        assert_eq!(
            fallback_title(Some("Kendi başlığım"), &description).as_deref(),
            Some("Kendi başlığım")
        );
    }

    #[test]
    fn snippet_keeps_short_text_whole() {
        assert_eq!(snippet("Başlık", "kısa açıklama"), "Başlık\n\nkısa açıklama");
    }

    #[test]
    fn snippet_prefers_sentence_boundary() {
        let description = format!("{}. {}", "a".repeat(170), "b".repeat(100));
        let s = snippet("", &description);
        assert!(s.ends_with('.'));
        assert_eq!(s.chars().count(), 171);
    }
}
