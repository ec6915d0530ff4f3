//! HTML fragments for the page surfaces.
//!
//! All interpolated text is HTML-escaped; data files and server messages are never
//! trusted as markup.

use api_shared::{Medication, PreferenceSet, ProviderSummary};
use serde_json::Value;

/// Preference categories rendered first, in this order. Other keys follow in
/// document order.
pub const DISPLAY_ORDER: [&str; 6] = [
    "note_pref",
    "hpi_elements",
    "physical_exam",
    "mdm",
    "other_pref",
    "speed",
];

pub const NO_PREFERENCES: &str = "No specific preferences.";

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escapes `text` and turns its line breaks into `<br>`.
pub fn multiline(text: &str) -> String {
    escape_html(text)
        .replace("\r\n", "<br>")
        .replace(['\n', '\r'], "<br>")
}

/// Display label of a preference category.
///
/// Known keys have fixed labels; anything else has underscores replaced with spaces and
/// the first letter of every word upper-cased.
pub fn category_label(key: &str) -> String {
    match key {
        "note_pref" => "General Preferences".into(),
        "hpi_elements" => "HPI Elements".into(),
        "physical_exam" => "Physical Exam".into(),
        "mdm" => "MDM/ED Course".into(),
        "other_pref" => "Other Preferences".into(),
        "speed" => "Speed/Difficulty".into(),
        other => title_case(&other.replace('_', " ")),
    }
}

fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_boundary = true;
    for c in text.chars() {
        let word_char = c.is_alphanumeric() || c == '_';
        if word_char && at_boundary {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_boundary = !word_char;
    }
    out
}

/// Category keys of `prefs` in display order.
pub fn ordered_categories(prefs: &PreferenceSet) -> Vec<&str> {
    let mut keys = Vec::new();
    for key in DISPLAY_ORDER {
        if prefs.contains(key) {
            keys.push(key);
        }
    }
    keys.extend(prefs.categories().filter(|k| !DISPLAY_ORDER.contains(k)));
    keys
}

/// Rendered body of a preference set: one subheading per category followed by its items.
pub fn preference_details(prefs: &PreferenceSet) -> String {
    let mut html = String::new();
    for key in ordered_categories(prefs) {
        html.push_str(&format!(
            "<h4 class=\"preference-subcategory\">{}</h4>",
            escape_html(&category_label(key))
        ));
        match prefs.get(key) {
            Some(Value::Array(items)) if !items.is_empty() => {
                for item in items {
                    let text = match item {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    push_item(&mut html, &text);
                }
            }
            Some(Value::String(s)) => push_item(&mut html, s),
            _ => html.push_str(&format!(
                "<p class=\"preference-item-detail no-preference\">{NO_PREFERENCES}</p>"
            )),
        }
    }
    html
}

fn push_item(html: &mut String, text: &str) {
    html.push_str(&format!(
        "<p class=\"preference-item-detail\">{}</p>",
        escape_html(text)
    ));
}

/// Content of the hover preview panel.
pub fn preview_panel(provider_name: &str, prefs: &PreferenceSet) -> String {
    format!(
        "<h3>{} Preferences</h3><div id=\"panelProviderDetails\">{}</div>",
        escape_html(provider_name),
        preference_details(prefs)
    )
}

pub fn preview_error(provider_name: &str) -> String {
    error_paragraph(&format!(
        "Failed to load preferences for {provider_name}."
    ))
}

pub fn provider_list_error() -> String {
    error_paragraph("Failed to load providers.")
}

pub fn error_paragraph(message: &str) -> String {
    format!("<p class=\"error\">{}</p>", escape_html(message))
}

/// One row of the provider sidebar.
pub fn provider_row(provider: &ProviderSummary, pinned: bool) -> String {
    let class = if pinned {
        "provider-item pinned"
    } else {
        "provider-item"
    };
    format!(
        "<div class=\"{class}\" data-provider-id=\"{}\">{}</div>",
        escape_html(&provider.id),
        escape_html(&provider.name)
    )
}

/// Medication details for the results area.
pub fn medication_details(med: &Medication) -> String {
    let mut html = format!(
        "<h3>{}</h3><h4>Overview</h4><p>{}</p>",
        escape_html(&med.name),
        escape_html(&med.description)
    );
    if !med.alternate_names.is_empty() {
        html.push_str(&format!(
            "<p class=\"alternate-names\"><strong>Alternative names:</strong> <span class=\"detail-label\">{}</span></p>",
            escape_html(&med.alternate_names.join(", "))
        ));
    }
    html.push_str("<h4>Mechanism of Action</h4>");
    if !med.mechanism_of_action.is_empty() {
        html.push_str(&format!(
            "<p><span class=\"detail-label\">{}</span></p>",
            escape_html(&med.mechanism_of_action)
        ));
    }
    html
}

/// Label of one suggestion entry.
///
/// When the match came from an alternate name that contains the query, the matching
/// slice of that alternate is shown highlighted after the canonical name.
pub fn suggestion_label(name: &str, matched: &str, query: &str) -> String {
    if name.to_lowercase() != matched.to_lowercase() {
        if let Some(slice) = find_ignore_case(matched, query) {
            return format!(
                "{} (<span class=\"highlight\">{}</span>)",
                escape_html(name),
                escape_html(slice)
            );
        }
    }
    escape_html(name)
}

/// The slice of `haystack` matching `needle` case-insensitively, if any.
fn find_ignore_case<'a>(haystack: &'a str, needle: &str) -> Option<&'a str> {
    let needle = needle.to_lowercase();
    if needle.is_empty() {
        return None;
    }
    for (start, _) in haystack.char_indices() {
        let mut lowered = String::new();
        for (offset, c) in haystack[start..].char_indices() {
            lowered.extend(c.to_lowercase());
            if lowered.len() >= needle.len() {
                if lowered == needle {
                    return Some(&haystack[start..start + offset + c.len_utf8()]);
                }
                break;
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn prefs(value: Value) -> PreferenceSet {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn multiline_converts_breaks() {
        assert_eq!(multiline("a\nb\r\nc <d>"), "a<br>b<br>c &lt;d&gt;");
    }

    #[test]
    fn labels_known_and_unknown_categories() {
        assert_eq!(category_label("mdm"), "MDM/ED Course");
        assert_eq!(category_label("note_pref"), "General Preferences");
        assert_eq!(category_label("dictation_style"), "Dictation Style");
        assert_eq!(category_label("x-ray_notes"), "X-Ray Notes");
    }

    #[test]
    fn known_categories_come_first_then_document_order() {
        let set = prefs(json!({
            "zeta": "z",
            "speed": "fast",
            "alpha": "a",
            "note_pref": ["short"],
        }));
        assert_eq!(
            ordered_categories(&set),
            vec!["note_pref", "speed", "zeta", "alpha"]
        );
    }

    #[test]
    fn renders_lists_strings_and_empty_values() {
        let set = prefs(json!({
            "hpi_elements": ["Onset", "Severity"],
            "mdm": "Brief",
            "speed": [],
            "other_pref": null,
        }));
        let html = preference_details(&set);
        assert_eq!(
            html,
            "<h4 class=\"preference-subcategory\">HPI Elements</h4>\
             <p class=\"preference-item-detail\">Onset</p>\
             <p class=\"preference-item-detail\">Severity</p>\
             <h4 class=\"preference-subcategory\">MDM/ED Course</h4>\
             <p class=\"preference-item-detail\">Brief</p>\
             <h4 class=\"preference-subcategory\">Other Preferences</h4>\
             <p class=\"preference-item-detail no-preference\">No specific preferences.</p>\
             <h4 class=\"preference-subcategory\">Speed/Difficulty</h4>\
             <p class=\"preference-item-detail no-preference\">No specific preferences.</p>"
        );
    }

    #[test]
    fn preference_text_is_escaped() {
        let set = prefs(json!({"note_pref": ["<script>alert(1)</script>"]}));
        let html = preview_panel("Dr <X>", &set);
        assert!(html.starts_with("<h3>Dr &lt;X&gt; Preferences</h3>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn medication_with_alternates_and_mechanism() {
        let med = Medication {
            name: "Famotidine".into(),
            description: "H2 blocker".into(),
            alternate_names: vec!["Pepcid".into(), "Fluxid".into()],
            mechanism_of_action: "Blocks H2 receptors".into(),
        };
        assert_eq!(
            medication_details(&med),
            "<h3>Famotidine</h3><h4>Overview</h4><p>H2 blocker</p>\
             <p class=\"alternate-names\"><strong>Alternative names:</strong> <span class=\"detail-label\">Pepcid, Fluxid</span></p>\
             <h4>Mechanism of Action</h4><p><span class=\"detail-label\">Blocks H2 receptors</span></p>"
        );
    }

    #[test]
    fn medication_without_optional_parts() {
        let med = Medication {
            name: "Saline".into(),
            ..Default::default()
        };
        assert_eq!(
            medication_details(&med),
            "<h3>Saline</h3><h4>Overview</h4><p></p><h4>Mechanism of Action</h4>"
        );
    }

    #[test]
    fn suggestion_highlights_alternate_match() {
        assert_eq!(
            suggestion_label("Famotidine", "Pepcid", "pep"),
            "Famotidine (<span class=\"highlight\">Pep</span>)"
        );
        assert_eq!(suggestion_label("Amiodarone", "Amiodarone", "ami"), "Amiodarone");
        // A fuzzy hit without a literal match shows the name only.
        assert_eq!(suggestion_label("Amoxicillin", "Amoxil", "amxl"), "Amoxicillin");
    }

    #[test]
    fn provider_rows_mark_pinned() {
        let p = ProviderSummary {
            id: "7".into(),
            name: "Jane Doe".into(),
        };
        assert_eq!(
            provider_row(&p, true),
            "<div class=\"provider-item pinned\" data-provider-id=\"7\">Jane Doe</div>"
        );
    }
}
