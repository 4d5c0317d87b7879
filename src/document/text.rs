//! Cover letter and contract prose.
//!
//! Both templates are plain string substitution. The only impure input is the
//! current UTC date; the `*_on` variants take the date explicitly.

use chrono::{NaiveDate, Utc};

pub const DEFAULT_COMPANY_NAME: &str = "Your Company";

/// Format a date as "Month DD, YYYY" (e.g. "March 04, 2025").
pub fn format_long_date(date: NaiveDate) -> String {
    date.format("%B %d, %Y").to_string()
}

/// Today's date in UTC.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn company_or_default(company_name: &str) -> &str {
    let trimmed = company_name.trim();
    if trimmed.is_empty() {
        DEFAULT_COMPANY_NAME
    } else {
        trimmed
    }
}

pub fn cover_letter(client_name: &str, project_type: &str, company_name: &str) -> String {
    cover_letter_on(today(), client_name, project_type, company_name)
}

pub fn cover_letter_on(
    date: NaiveDate,
    client_name: &str,
    project_type: &str,
    company_name: &str,
) -> String {
    let company = company_or_default(company_name);
    format!(
        "{date}\n\n\
         Dear {client_name},\n\n\
         Thank you for considering {company} for your {project_type} needs. \
         We've prepared the enclosed proposal which outlines scope, pricing, and terms. \
         Our goal is to deliver high-quality results on time and within budget. \
         If you have questions or need adjustments, we'll be happy to iterate.\n\n\
         Warm regards,\n\
         {company}\n",
        date = format_long_date(date),
    )
}

pub fn contract_text(client_name: &str, project_type: &str, company_name: &str) -> String {
    contract_text_on(today(), client_name, project_type, company_name)
}

pub fn contract_text_on(
    date: NaiveDate,
    client_name: &str,
    project_type: &str,
    company_name: &str,
) -> String {
    let company = company_or_default(company_name);
    format!(
        "Agreement between {company} (\"Provider\") and {client_name} (\"Client\")\n\n\
         Date: {date}\n\n\
         1. Scope\n\
         Provider will perform the work described in the attached proposal for the {project_type}.\n\n\
         2. Payment\n\
         Client agrees to pay the amounts set out in the proposal. \
         Unless otherwise agreed, invoices are due within 14 days.\n\n\
         3. Intellectual Property\n\
         Upon full payment, Provider will transfer rights to the deliverables to the Client, \
         excluding any third-party licensed components.\n\n\
         4. Confidentiality\n\
         Both parties agree to keep confidential information private.\n\n\
         5. Termination\n\
         Either party may terminate with 14 days' written notice. \
         Fees for work performed up to termination are payable.\n\n\
         6. Governing Law\n\
         This agreement is governed by the laws applicable to the Provider's jurisdiction.\n\n\
         Signature: ______________________\n\
         Name: __________________________\n\
         Date: ___________________________\n",
        date = format_long_date(date),
    )
}

/// Split prose into paragraphs on blank lines. Single newlines inside a
/// paragraph are kept and become soft line breaks in the layout.
pub fn paragraphs(text: &str) -> Vec<&str> {
    text.split("\n\n")
        .map(|para| para.trim_matches('\n'))
        .filter(|para| !para.trim().is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pinned() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 4).unwrap()
    }

    #[test]
    fn test_format_long_date() {
        assert_eq!(format_long_date(pinned()), "March 04, 2025");
    }

    #[test]
    fn test_cover_letter_substitution() {
        let letter = cover_letter_on(pinned(), "Acme", "Website", "Co");
        assert!(letter.starts_with("March 04, 2025\n\n"));
        assert!(letter.contains("Dear Acme,"));
        assert!(letter.contains("considering Co for your Website needs"));
        assert!(letter.ends_with("Warm regards,\nCo\n"));
    }

    #[test]
    fn test_cover_letter_paragraphs() {
        let letter = cover_letter_on(pinned(), "Acme", "Website", "Co");
        let paras = paragraphs(&letter);
        assert_eq!(paras.len(), 4);
        assert_eq!(paras[1], "Dear Acme,");
        // sign-off keeps its soft line break
        assert_eq!(paras[3], "Warm regards,\nCo");
    }

    #[test]
    fn test_cover_letter_is_deterministic_for_pinned_date() {
        assert_eq!(
            cover_letter_on(pinned(), "Acme", "Website", "Co"),
            cover_letter_on(pinned(), "Acme", "Website", "Co")
        );
    }

    #[test]
    fn test_blank_company_uses_default() {
        let letter = cover_letter_on(pinned(), "Acme", "Website", "  ");
        assert!(letter.contains("considering Your Company for"));
        let contract = contract_text_on(pinned(), "Acme", "Website", "");
        assert!(contract.starts_with("Agreement between Your Company (\"Provider\")"));
    }

    #[test]
    fn test_current_date_variants() {
        let before = format_long_date(today());
        let letter = cover_letter("Acme", "Website", "Co");
        let contract = contract_text("Acme", "Website", "Co");
        let after = format_long_date(today());

        assert!(letter.starts_with(&before) || letter.starts_with(&after));
        assert!(letter.contains("Dear Acme,"));
        assert!(contract.contains("and Acme (\"Client\")"));
        assert!(
            contract.contains(&format!("Date: {before}"))
                || contract.contains(&format!("Date: {after}"))
        );
    }

    #[test]
    fn test_contract_sections() {
        let contract = contract_text_on(pinned(), "Acme", "Website redesign", "Co");
        assert!(contract.contains("and Acme (\"Client\")"));
        assert!(contract.contains("Date: March 04, 2025"));
        assert!(contract.contains("proposal for the Website redesign."));
        for heading in [
            "1. Scope",
            "2. Payment",
            "3. Intellectual Property",
            "4. Confidentiality",
            "5. Termination",
            "6. Governing Law",
        ] {
            assert!(contract.contains(heading), "missing {heading}");
        }
        assert_eq!(paragraphs(&contract).len(), 9);
    }
}
