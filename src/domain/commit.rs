use crate::domain::version::BumpKind;

/// Extract the conventional type prefix from a commit message.
///
/// Only the subject (first line) is inspected. The prefix is everything before
/// the first `(` or `:`, lower-cased, with trailing `!` markers removed.
/// Returns `None` when the subject contains neither separator.
pub fn type_prefix(message: &str) -> Option<String> {
    let subject = message.lines().next().unwrap_or("");
    let end = subject.find(['(', ':'])?;

    Some(subject[..end].to_lowercase().trim_end_matches('!').to_string())
}

/// Classify a commit message into the bump it asks for.
///
/// `breaking` is major, `feat` is minor and everything else, including
/// subjects without a type prefix, is patch.
pub fn classify(message: &str) -> BumpKind {
    match type_prefix(message).as_deref() {
        Some("breaking") => BumpKind::Major,
        Some("feat") => BumpKind::Minor,
        Some("fix") => BumpKind::Patch,
        _ => BumpKind::Patch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_feature() {
        assert_eq!(classify("feat: add spell"), BumpKind::Minor);
    }

    #[test]
    fn test_classify_breaking_with_marker() {
        assert_eq!(classify("breaking!: remove field"), BumpKind::Major);
        assert_eq!(classify("breaking: drop legacy races"), BumpKind::Major);
    }

    #[test]
    fn test_classify_other_types_default_to_patch() {
        assert_eq!(classify("chore: cleanup"), BumpKind::Patch);
        assert_eq!(classify("fix: typo"), BumpKind::Patch);
        assert_eq!(classify("docs(readme): wording"), BumpKind::Patch);
    }

    #[test]
    fn test_classify_without_separator() {
        assert_eq!(classify("random text no separator"), BumpKind::Patch);
        assert_eq!(classify(""), BumpKind::Patch);
    }

    #[test]
    fn test_classify_with_scope() {
        assert_eq!(classify("feat(spells): add fireball"), BumpKind::Minor);
        assert_eq!(classify("breaking(races)!: rename ids"), BumpKind::Major);
    }

    #[test]
    fn test_classify_is_case_insensitive() {
        assert_eq!(classify("FEAT: shout"), BumpKind::Minor);
        assert_eq!(classify("Breaking: Rename"), BumpKind::Major);
    }

    #[test]
    fn test_first_separator_wins() {
        // The colon comes first, so the parenthesis in the description is ignored.
        assert_eq!(type_prefix("feat: support (optional) tags").as_deref(), Some("feat"));
        assert_eq!(classify("feat: support (optional) tags"), BumpKind::Minor);
    }

    #[test]
    fn test_only_subject_line_is_inspected() {
        assert_eq!(classify("update data\n\nfeat: not a prefix"), BumpKind::Patch);
    }

    #[test]
    fn test_classify_is_deterministic() {
        let message = "feat(classes): add artificer";
        assert_eq!(classify(message), classify(message));
    }

    #[test]
    fn test_prefix_keeps_inner_whitespace() {
        assert_eq!(type_prefix("feat : spaced").as_deref(), Some("feat "));
        assert_eq!(classify("feat : spaced"), BumpKind::Patch);
    }
}
