// Shared prompt fragments.
// Stage-specific templates live in chat/prompts.rs; the persona and domain
// rules below are restated by both chat stages so they cannot drift apart.

/// Opening line of every system instruction.
pub const ASSISTANT_PERSONA: &str = "You are the Campus Club Assistant.";

/// Rules common to the resolver and the injector.
pub const DOMAIN_RULES: &str = "\
- Always be helpful and encouraging to students.
- Never answer questions unrelated to campus clubs. Politely decline instead.
- Assume the user knows nothing about any club and cannot see the data given to you.";

/// Substitutes `{name}` placeholders in a single left-to-right pass.
/// Inserted values are never rescanned, so model or user text that happens to
/// contain a placeholder is kept literally. Unknown placeholders are left as is.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let hit = values.iter().find_map(|(name, value)| {
            let key_len = name.len() + 2;
            (tail.len() >= key_len
                && tail[1..].starts_with(name)
                && tail[1 + name.len()..].starts_with('}'))
            .then_some((key_len, *value))
        });
        match hit {
            Some((key_len, value)) => {
                out.push_str(value);
                rest = &tail[key_len..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
