// Shared prompt fragments. Each feature keeps its own prompts.rs alongside it;
// this file holds the output-format instructions the parsers rely on.

/// Appended to prompts whose output is read back as "1. ...", "2. ..." lines.
pub const NUMBERED_LINES_INSTRUCTION: &str = "\
    Please provide the results in the same format, one per line, starting with the number. \
    Do not add headings, commentary, or blank numbered lines.";

/// Appended to prompts whose output is read back as a single JSON object.
pub const JSON_OBJECT_INSTRUCTION: &str = "\
    Respond with the JSON object only. \
    Do NOT include explanations before or after it.";

/// Substitutes `{name}` placeholders in one left-to-right pass. Inserted values
/// are never scanned again, so user text containing a placeholder stays literal.
/// Braces that do not name a known placeholder are copied through unchanged.
pub fn fill_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let matched = after.find('}').and_then(|close| {
            let name = &after[..close];
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (close, *value))
        });
        match matched {
            Some((close, value)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_template_substitutes_every_occurrence() {
        let out = fill_template("{a} and {b}, then {a}", &[("a", "x"), ("b", "y")]);
        assert_eq!(out, "x and y, then x");
    }

    #[test]
    fn test_fill_template_leaves_placeholders_inside_values_alone() {
        let out = fill_template(
            "JD: {job_description}\nBullets: {bullets}",
            &[("job_description", "needs {bullets} and {format_instruction}"), ("bullets", "1. Did X")],
        );
        assert_eq!(out, "JD: needs {bullets} and {format_instruction}\nBullets: 1. Did X");
    }

    #[test]
    fn test_fill_template_copies_json_braces_through() {
        let out = fill_template("{\n  \"role\": \"{role}\"\n}", &[("role", "Engineer")]);
        assert_eq!(out, "{\n  \"role\": \"Engineer\"\n}");
    }
}
