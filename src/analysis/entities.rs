//! Generic entity recognition for legal correspondence.
//!
//! Regex-only: persons, organizations, dates, dollar amounts and legal
//! citations. Results land in an [`EntityBag`], which handles dedup.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::EntityBag;

// ============================================================================
// Patterns
// ============================================================================

static CAPITALIZED_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Z][a-z]+(?:[ \t]+[A-Z][a-z]+)+\b")
        .expect("capitalized run pattern should compile")
});

static ORGANIZATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b((?:[A-Z][A-Za-z'\-]+|&)(?:[ \t]+(?:[A-Z][A-Za-z'\-]+|&|of))*,?[ \t]+(?:Law[ \t]+(?:Firm|Group|Offices?)|Legal[ \t]+(?:Services|Group|Aid)|Law|Legal|LLP|LLC|PLLC|P\.C\.|PC|Inc\.?|Corp\.?|Corporation))(?:\b|$)",
    )
    .expect("organization pattern should compile")
});

static MONTH_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:January|February|March|April|May|June|July|August|September|October|November|December)[ \t]+\d{1,2},?[ \t]+\d{4}\b",
    )
    .expect("month date pattern should compile")
});

static NUMERIC_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b\d{1,2}[/-]\d{1,2}[/-]\d{2,4}\b").expect("numeric date pattern should compile")
});

static DOLLAR_AMOUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$[ \t]?\d[\d,]*(?:\.\d{2})?").expect("amount pattern should compile")
});

static CITATION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        // 42 U.S.C. § 12182
        Regex::new(r"\b\d{1,2}[ \t]+U\.S\.C\.?[ \t]*(?:§+|[Ss]ec(?:tion|\.)?)?[ \t]*\d+[a-z]?(?:\([a-z0-9]+\))*")
            .expect("usc pattern should compile"),
        // 28 C.F.R. Part 36
        Regex::new(r"\b\d{1,2}[ \t]+C\.F\.R\.?[ \t]*(?:§+|Part)?[ \t]*\d+(?:\.\d+)?")
            .expect("cfr pattern should compile"),
        Regex::new(r"\bWCAG[ \t]+\d\.\d(?:[ \t]+(?:Level[ \t]+)?A{1,3}\b)?")
            .expect("wcag pattern should compile"),
        Regex::new(r"\bSection[ \t]+508\b").expect("section 508 pattern should compile"),
        Regex::new(r"\b(?:ADA[ \t]+)?Title[ \t]+(?:III|II|I|IV|V)\b(?:[ \t]+of[ \t]+the[ \t]+ADA)?")
            .expect("ada title pattern should compile"),
    ]
});

// ============================================================================
// Word lists
// ============================================================================

// Leading words dropped from a capitalized run before it is judged.
static LEADING_NOISE: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "Dear", "To", "Re", "From", "Attn", "Attention", "Sincerely", "Regards", "Plaintiff",
        "Defendant", "Attorney", "Counsel", "Mr", "Mrs", "Ms", "Dr", "Hello", "Hi", "Our",
        "Client", "The", "This", "Respectfully", "Contact", "Please", "Call", "Email",
    ]
    .into_iter()
    .collect()
});

// Any of these anywhere in a run means it is not a person.
static NOT_A_NAME: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "Law", "Legal", "Firm", "Group", "Offices", "Office", "Court", "County", "District",
        "Superior", "Circuit", "Supreme", "United", "States", "America", "Department", "Justice",
        "Act", "Title", "Section", "Disabilities", "Americans", "Guidelines", "Accessibility",
        "Content", "Web", "Notice", "Demand", "Letter", "Settlement", "Agreement", "Complaint",
        "Case", "Civil", "Action", "Inc", "Corp", "Corporation", "Company", "Street", "Avenue",
        "Road", "Suite", "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday",
        "Sunday", "January", "February", "March", "April", "May", "June", "July", "August",
        "September", "October", "November", "December", "Please", "Respond", "Failure", "Thank",
    ]
    .into_iter()
    .collect()
});

// ============================================================================
// Extraction
// ============================================================================

/// Extract all generic entities from `text`.
pub fn extract_entities(text: &str) -> EntityBag {
    let mut bag = EntityBag::default();
    extract_persons(text, &mut bag);
    extract_organizations(text, &mut bag);
    extract_dates(text, &mut bag);
    extract_amounts(text, &mut bag);
    extract_citations(text, &mut bag);
    bag
}

fn extract_persons(text: &str, bag: &mut EntityBag) {
    for m in CAPITALIZED_RUN.find_iter(text) {
        let mut parts: Vec<&str> = m.as_str().split_whitespace().collect();
        while parts.first().is_some_and(|p| LEADING_NOISE.contains(p)) {
            parts.remove(0);
        }
        if is_plausible_name(&parts) {
            bag.add_person(&parts.join(" "));
        }
    }
}

fn extract_organizations(text: &str, bag: &mut EntityBag) {
    for cap in ORGANIZATION.captures_iter(text) {
        let Some(m) = cap.get(1) else {
            continue;
        };
        let mut parts: Vec<&str> = m.as_str().split_whitespace().collect();
        while parts.len() > 1
            && (LEADING_NOISE.contains(parts[0]) || matches!(parts[0], "&" | "of"))
        {
            parts.remove(0);
        }
        let name = parts.join(" ");
        let name = name.trim_end_matches(',').trim();
        // A bare suffix is not an organization.
        if parts.len() >= 2 {
            bag.add_organization(name);
        }
    }
}

fn extract_dates(text: &str, bag: &mut EntityBag) {
    let mut found: Vec<(usize, &str)> = MONTH_DATE
        .find_iter(text)
        .chain(NUMERIC_DATE.find_iter(text))
        .map(|m| (m.start(), m.as_str()))
        .collect();
    found.sort_by_key(|(pos, _)| *pos);
    for (_, date) in found {
        bag.push_date(date);
    }
}

fn extract_amounts(text: &str, bag: &mut EntityBag) {
    for m in DOLLAR_AMOUNT.find_iter(text) {
        bag.push_amount(m.as_str().trim_end_matches(','));
    }
}

fn extract_citations(text: &str, bag: &mut EntityBag) {
    for pattern in CITATION_PATTERNS.iter() {
        for m in pattern.find_iter(text) {
            bag.add_citation(m.as_str());
        }
    }
}

fn is_plausible_name(parts: &[&str]) -> bool {
    if parts.len() < 2 || parts.len() > 3 {
        return false;
    }
    parts
        .iter()
        .all(|p| p.len() >= 2 && !NOT_A_NAME.contains(p) && !LEADING_NOISE.contains(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persons_skip_greetings_and_places() {
        let bag = extract_entities(
            "Dear John Smith,\nThe United States District Court has docketed the matter.",
        );
        assert!(bag.persons.contains("John Smith"));
        assert!(!bag.persons.iter().any(|p| p.contains("United")));
    }

    #[test]
    fn test_organization_dedup() {
        let text = "Smith Law Firm represents the plaintiff. Contact Smith Law Firm today. \
                    Smith Law Firm, LLP is not the same entity.";
        let bag = extract_entities(text);
        assert_eq!(
            bag.organizations.iter().filter(|o| *o == "Smith Law Firm").count(),
            1
        );
    }

    #[test]
    fn test_organization_drops_leading_article() {
        let bag = extract_entities("Please contact The Accessibility Law Group immediately.");
        assert!(bag.organizations.contains("Accessibility Law Group"));
    }

    #[test]
    fn test_bare_law_and_legal_suffixes() {
        let bag = extract_entities(
            "This letter is sent by Smith Law on behalf of Pacific Legal and Acme Corp. today.",
        );
        assert!(bag.organizations.contains("Smith Law"));
        assert!(bag.organizations.contains("Pacific Legal"));
        assert!(bag.organizations.contains("Acme Corp"));
        assert!(!bag.organizations.iter().any(|o| o.contains(" and ")));
    }

    #[test]
    fn test_ampersand_stays_in_firm_name() {
        let bag = extract_entities("Reply to Miles & Carter LLP and Baker Legal Aid.");
        assert!(bag.organizations.contains("Miles & Carter LLP"));
        assert!(bag.organizations.contains("Baker Legal Aid"));
    }

    #[test]
    fn test_dates_keep_document_order() {
        let bag = extract_entities("Sent 02/01/2025. Respond by March 15, 2025 or 02/01/2025.");
        assert_eq!(bag.dates, vec!["02/01/2025", "March 15, 2025"]);
    }

    #[test]
    fn test_amounts() {
        let bag = extract_entities("We demand $15,000, plus $250.00 in fees and $15,000 again.");
        assert_eq!(bag.amounts, vec!["$15,000", "$250.00"]);
    }

    #[test]
    fn test_citations() {
        let bag = extract_entities(
            "Your site violates Title III of the ADA, 42 U.S.C. § 12182, and fails WCAG 2.1 Level AA. \
             See also 28 C.F.R. Part 36 and Section 508.",
        );
        assert!(bag.legal_citations.contains("42 U.S.C. § 12182"));
        assert!(bag.legal_citations.contains("WCAG 2.1 Level AA"));
        assert!(bag.legal_citations.contains("28 C.F.R. Part 36"));
        assert!(bag.legal_citations.contains("Section 508"));
        assert!(bag.legal_citations.contains("Title III of the ADA"));
    }

    #[test]
    fn test_plain_text_has_no_entities() {
        assert!(extract_entities("milk, eggs and bread").is_empty());
    }
}
