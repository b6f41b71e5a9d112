//! Tokenizer shared by the search engines

/// 소문자 토큰으로 분리
///
/// 영숫자가 아닌 문자와 camelCase 경계에서 자릅니다.
/// `createGitHubIssue` → `create`, `git`, `hub`, `issue`
/// `HTTPServer_v2` → `http`, `server`, `v2`
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for word in text.split(|c: char| !c.is_alphanumeric()) {
        if word.is_empty() {
            continue;
        }
        split_camel(word, &mut tokens);
    }
    tokens
}

fn split_camel(word: &str, out: &mut Vec<String>) {
    let chars: Vec<char> = word.chars().collect();
    let mut start = 0;

    for i in 1..chars.len() {
        let prev = chars[i - 1];
        let cur = chars[i];
        let next_is_lower = chars.get(i + 1).is_some_and(|c| c.is_lowercase());

        // aB 또는 ABc 의 B 앞
        let boundary = (prev.is_lowercase() && cur.is_uppercase())
            || (prev.is_uppercase() && cur.is_uppercase() && next_is_lower);

        if boundary {
            push_lower(&chars[start..i], out);
            start = i;
        }
    }
    push_lower(&chars[start..], out);
}

fn push_lower(chars: &[char], out: &mut Vec<String>) {
    if chars.is_empty() {
        return;
    }
    out.push(chars.iter().collect::<String>().to_lowercase());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_non_alphanumeric() {
        assert_eq!(
            tokenize("github_issue-create  now!"),
            vec!["github", "issue", "create", "now"]
        );
        assert!(tokenize("  ---  ").is_empty());
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(tokenize("createGitHubIssue"), vec!["create", "git", "hub", "issue"]);
        assert_eq!(tokenize("HTTPServer_v2"), vec!["http", "server", "v2"]);
        assert_eq!(tokenize("Look up current weather"), vec!["look", "up", "current", "weather"]);
    }
}
