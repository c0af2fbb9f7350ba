//! Field and type name derivation.
//!
//! Client queries address relationships as `<source><Verb><Target>` (OUT)
//! and `<source><Verb><Target>Reverse` (IN). Both are derived from the edge
//! kind name, e.g. `Drug_targets_protein` becomes `drugTargetsProtein`.

/// Suffix appended to the IN view of an edge.
pub const REVERSE_SUFFIX: &str = "Reverse";

/// `Drug_targets_protein` -> `drugTargetsProtein`, `GOTerm` -> `goTerm`.
pub fn lower_camel(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for (i, segment) in name.split('_').filter(|s| !s.is_empty()).enumerate() {
        if i == 0 {
            out.push_str(&lower_leading(segment));
        } else {
            out.push_str(&capitalize(segment));
        }
    }
    out
}

/// `drugTargetsProtein` -> `DrugTargetsProtein`.
pub fn upper_camel(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for segment in name.split('_').filter(|s| !s.is_empty()) {
        out.push_str(&capitalize(segment));
    }
    out
}

/// OUT view field name for an edge kind.
pub fn edge_field_name(edge: &str) -> String {
    lower_camel(edge)
}

/// IN view field name for an edge kind.
pub fn reverse_field_name(edge: &str) -> String {
    format!("{}{REVERSE_SUFFIX}", lower_camel(edge))
}

/// Root query field listing a node kind: `BiologicalProcess` ->
/// `biologicalProcesses`, `Gene` -> `genes`.
pub fn plural_field_name(kind: &str) -> String {
    pluralize(&lower_camel(kind))
}

/// Type-name form of [`plural_field_name`], used for mutation names.
pub fn plural_type_name(kind: &str) -> String {
    pluralize(&upper_camel(kind))
}

/// GraphQL name rule: `[_A-Za-z][_0-9A-Za-z]*`, without the reserved `__`
/// prefix.
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_ascii_alphabetic() || first == '_') || name.starts_with("__") {
        return false;
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn pluralize(word: &str) -> String {
    const SIBILANTS: [&str; 5] = ["s", "x", "z", "ch", "sh"];

    if SIBILANTS.iter().any(|s| word.ends_with(s)) {
        return format!("{word}es");
    }
    let mut rev = word.chars().rev();
    if let (Some('y'), Some(prev)) = (rev.next(), rev.next()) {
        if !"aeiou".contains(prev) {
            return format!("{}ies", &word[..word.len() - 1]);
        }
    }
    format!("{word}s")
}

fn capitalize(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Lowercase the leading run of capitals, keeping the last one when it
/// starts the next word (`GOTerm` -> `goTerm`).
fn lower_leading(segment: &str) -> String {
    let chars: Vec<char> = segment.chars().collect();
    let run = chars.iter().take_while(|c| c.is_ascii_uppercase()).count();
    let lowered = match run {
        0 => 0,
        n if n == chars.len() || n == 1 => n,
        n => n - 1,
    };
    chars
        .iter()
        .enumerate()
        .map(|(i, c)| if i < lowered { c.to_ascii_lowercase() } else { *c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_names_follow_client_convention() {
        assert_eq!(edge_field_name("Drug_targets_protein"), "drugTargetsProtein");
        assert_eq!(
            reverse_field_name("Drug_targets_protein"),
            "drugTargetsProteinReverse"
        );
        assert_eq!(edge_field_name("Ec_number_is_a_ec_number"), "ecNumberIsAEcNumber");
        assert_eq!(
            edge_field_name("Biological_process_is_a_biological_process"),
            "biologicalProcessIsABiologicalProcess"
        );
    }

    #[test]
    fn camel_case_of_kind_names() {
        assert_eq!(lower_camel("Protein"), "protein");
        assert_eq!(lower_camel("EcNumber"), "ecNumber");
        assert_eq!(lower_camel("GOTerm"), "goTerm");
        assert_eq!(lower_camel("ID"), "id");
        assert_eq!(upper_camel("proteinHasDomain"), "ProteinHasDomain");
    }

    #[test]
    fn plurals() {
        assert_eq!(plural_field_name("BiologicalProcess"), "biologicalProcesses");
        assert_eq!(plural_field_name("Disease"), "diseases");
        assert_eq!(plural_field_name("OrganismTaxon"), "organismTaxons");
        assert_eq!(plural_field_name("GOTerm"), "goTerms");
        assert_eq!(plural_type_name("Pathway"), "Pathways");
        assert_eq!(plural_type_name("Ontology"), "Ontologies");
    }

    #[test]
    fn graphql_name_rules() {
        assert!(is_valid_name("Drug_targets_protein"));
        assert!(is_valid_name("_private"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("1abc"));
        assert!(!is_valid_name("__typename"));
        assert!(!is_valid_name("has-dash"));
    }
}
