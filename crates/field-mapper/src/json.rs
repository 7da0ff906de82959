/// Pull the first well-formed JSON array out of free text. Collaborator
/// responses arrive as prose, fenced code blocks, or bare JSON; all three
/// shapes are accepted.
pub fn extract_json_array(raw: &str) -> Option<String> {
    if raw.trim_start().starts_with('[') {
        return Some(trim_symmetric(raw));
    }

    let fence = "```";
    if let Some(start) = raw.find(fence) {
        let after_fence = &raw[start + fence.len()..];
        let after_lang = after_fence.trim_start_matches(|c: char| c.is_alphanumeric() || c == '_');
        if let Some(end) = after_lang.find(fence) {
            let block = &after_lang[..end];
            if block.contains('[') {
                if let Some(inner) = extract_json_array(block.trim()) {
                    return Some(inner);
                }
            }
        }
    }

    let start = raw.find('[')?;
    let rest = &raw[start + 1..];
    let mut depth = 1i32;
    let mut in_string = false;
    let mut escaped = false;
    for (idx, ch) in rest.char_indices() {
        if in_string {
            match ch {
                '\\' if !escaped => escaped = true,
                '"' if !escaped => in_string = false,
                _ => escaped = false,
            }
            if ch != '\\' {
                escaped = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    let mut candidate = String::from("[");
                    candidate.push_str(&rest[..=idx]);
                    return Some(trim_symmetric(&candidate));
                }
            }
            _ => {}
        }
    }
    None
}

fn trim_symmetric(value: &str) -> String {
    value.trim().trim_matches('`').trim().to_string()
}
