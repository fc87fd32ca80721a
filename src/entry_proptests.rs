use super::*;
use proptest::prelude::*;

/// 説明文に使える文字列（`]` を含まない）
fn description_strategy() -> impl Strategy<Value = String> {
    "[A-Za-z0-9][A-Za-z0-9 _.-]{0,19}".prop_map(|s| s.trim_end().to_string())
}

/// URL（https://host/owner/repo）
fn url_strategy() -> impl Strategy<Value = String> {
    ("[a-z][a-z0-9-]{0,9}", "[a-zA-Z][a-zA-Z0-9_-]{0,9}", "[a-zA-Z][a-zA-Z0-9_.-]{0,9}")
        .prop_map(|(host, owner, repo)| format!("https://{}.example/{}/{}", host, owner, repo))
}

/// 相対パス（1〜3セグメント）
fn path_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-zA-Z][a-zA-Z0-9_.-]{0,9}", 1..=3).prop_map(|parts| parts.join("/"))
}

/// ブランチ名
fn branch_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9][a-zA-Z0-9._-]{0,14}".prop_map(|s| s)
}

proptest! {
    /// 文法どおりの行はキャプチャした値そのままのエントリになる
    #[test]
    fn prop_well_formed_line_round_trips_fields(
        description in description_strategy(),
        url in url_strategy(),
        path in prop::option::of(path_strategy()),
        branch in prop::option::of(branch_strategy())
    ) {
        let mut line = format!("- [{}]({})", description, url);
        if let Some(p) = &path {
            line.push('/');
            line.push_str(p);
        }
        if let Some(b) = &branch {
            line.push(' ');
            line.push_str(b);
        }

        let entry = parse_line(&line).unwrap();
        prop_assert_eq!(entry.description, description);
        prop_assert_eq!(entry.repository_url, url);
        prop_assert_eq!(entry.relative_path, path.unwrap_or_default());
        prop_assert_eq!(entry.branch, branch);
    }

    /// 任意の入力でパースはパニックしない
    #[test]
    fn prop_parse_entries_never_panics(text in "\\PC{0,200}") {
        let _ = parse_entries(&text);
    }

    /// 閉じ括弧を欠いた行は常に除外される
    #[test]
    fn prop_missing_closing_paren_is_skipped(
        description in description_strategy(),
        url in url_strategy()
    ) {
        let line = format!("- [{}]({}", description, url);
        prop_assert!(parse_line(&line).is_none());
    }

    /// エントリ行の間に任意の非リスト行を挟んでも件数と順序は変わらない
    #[test]
    fn prop_noise_lines_do_not_change_entries(
        urls in prop::collection::vec(url_strategy(), 0..5),
        noise in "[A-Za-z #]{0,30}"
    ) {
        let mut doc = String::new();
        for (i, url) in urls.iter().enumerate() {
            doc.push_str(&format!("{}\n- [Addon {}]({})\n", noise, i, url));
        }

        let entries = parse_entries(&doc);
        let parsed: Vec<&str> = entries.iter().map(|e| e.repository_url.as_str()).collect();
        let expected: Vec<&str> = urls.iter().map(String::as_str).collect();
        prop_assert_eq!(parsed, expected);
    }
}
