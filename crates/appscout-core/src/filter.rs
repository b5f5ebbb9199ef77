/// Decides whether an executable path is plausibly an application the
/// user would want to pick.
///
/// The rules are best-effort heuristics collected from what shows up in
/// real game and launcher install folders. No single entry is load-bearing;
/// together they keep installers, updaters, crash reporters, redistributable
/// payloads and similar helpers out of the list.
use crate::config::{has_extension, TARGET_EXTENSION};
use crate::platform::SYSTEM_DIRECTORY_NAME;
use std::path::Path;

/// Substrings that mark helper executables. Matched case-insensitively
/// against the whole path, so a folder named `Tools` excludes everything
/// inside it too.
pub const EXCLUDED_KEYWORDS: &[&str] = &[
    // Installers and updaters
    "redis",
    "unins",
    "setup",
    "patch",
    "update",
    "install",
    // Support and diagnostics
    "report",
    "support",
    "register",
    "activation",
    "diagnostics",
    "tool",
    "crash",
    "config",
    // Launchers and helpers
    "launch",
    "plugin",
    "benchmark",
    "steamvr",
    "cefprocess",
    // Background services (anti-cheat and friends)
    "svc",
    // Folders unlikely to hold anything useful
    "docs",
    "cache",
];

/// Whole path segments (case-insensitive) that are never application folders.
pub const EXCLUDED_SEGMENTS: &[&str] = &["_CommonRedist", "__Installer", SYSTEM_DIRECTORY_NAME];

/// Segment suffix marking user-data and engine-data folders
/// (`AppData`, `ProgramData`, `Game_Data`, ...).
pub const DATA_SEGMENT_SUFFIX: &str = "data";

/// Leading characters of hidden or system-reserved segments.
pub const HIDDEN_SEGMENT_PREFIXES: &[char] = &['.', '$'];

/// One exclusion rule. All comparisons are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matcher {
    /// The path contains this substring anywhere.
    Keyword(String),
    /// Some segment equals this name.
    Segment(String),
    /// Some segment ends with this suffix.
    SegmentSuffix(String),
    /// Some segment starts with this character.
    SegmentPrefix(char),
}

impl Matcher {
    /// `lower` is the lowercased path; `segments` are its components.
    fn matches(&self, lower: &str, segments: &[&str]) -> bool {
        match self {
            Self::Keyword(keyword) => lower.contains(keyword.as_str()),
            Self::Segment(name) => segments.iter().any(|s| *s == name.as_str()),
            Self::SegmentSuffix(suffix) => segments.iter().any(|s| s.ends_with(suffix.as_str())),
            Self::SegmentPrefix(prefix) => segments.iter().any(|s| s.starts_with(*prefix)),
        }
    }
}

/// Immutable, ordered set of exclusion matchers.
#[derive(Debug, Clone)]
pub struct ExclusionRules {
    matchers: Vec<Matcher>,
}

impl Default for ExclusionRules {
    fn default() -> Self {
        let mut matchers: Vec<Matcher> = EXCLUDED_KEYWORDS
            .iter()
            .map(|k| Matcher::Keyword(k.to_lowercase()))
            .collect();
        matchers.extend(
            EXCLUDED_SEGMENTS
                .iter()
                .map(|s| Matcher::Segment(s.to_lowercase())),
        );
        matchers.push(Matcher::SegmentSuffix(DATA_SEGMENT_SUFFIX.to_owned()));
        matchers.extend(HIDDEN_SEGMENT_PREFIXES.iter().map(|&c| Matcher::SegmentPrefix(c)));
        Self { matchers }
    }
}

impl ExclusionRules {
    /// Build a rule set from explicit matchers. Keyword and segment text is
    /// lowercased here so matching never has to.
    pub fn new(matchers: Vec<Matcher>) -> Self {
        let matchers = matchers
            .into_iter()
            .map(|m| match m {
                Matcher::Keyword(k) => Matcher::Keyword(k.to_lowercase()),
                Matcher::Segment(s) => Matcher::Segment(s.to_lowercase()),
                Matcher::SegmentSuffix(s) => Matcher::SegmentSuffix(s.to_lowercase()),
                Matcher::SegmentPrefix(c) => Matcher::SegmentPrefix(c),
            })
            .collect();
        Self { matchers }
    }

    pub fn matchers(&self) -> &[Matcher] {
        &self.matchers
    }

    /// First rule that excludes `path_text`, in rule order.
    ///
    /// Segments are split on both `/` and `\` so Windows paths are judged
    /// the same way on every host.
    pub fn first_match(&self, path_text: &str) -> Option<&Matcher> {
        let lower = path_text.to_lowercase();
        let segments: Vec<&str> = lower.split(['/', '\\']).filter(|s| !s.is_empty()).collect();
        self.matchers.iter().find(|m| m.matches(&lower, &segments))
    }

    pub fn is_excluded(&self, path_text: &str) -> bool {
        self.first_match(path_text).is_some()
    }
}

/// The candidate predicate: extension check, exclusion rules, existence.
#[derive(Debug, Clone)]
pub struct CandidateFilter {
    rules: ExclusionRules,
    extension: &'static str,
}

impl Default for CandidateFilter {
    fn default() -> Self {
        Self::new(ExclusionRules::default(), TARGET_EXTENSION)
    }
}

impl CandidateFilter {
    pub fn new(rules: ExclusionRules, extension: &'static str) -> Self {
        Self { rules, extension }
    }

    pub fn rules(&self) -> &ExclusionRules {
        &self.rules
    }

    /// Judge `path` as a whole.
    ///
    /// A file that disappeared since it was listed is a plain rejection.
    pub fn is_candidate(&self, path: &Path) -> bool {
        self.judge(path, path)
    }

    /// Judge `path`, applying the exclusion rules only to the part below
    /// `root`.
    ///
    /// Roots come from provenance probes and may themselves live under
    /// hidden or data folders (`~/.local/share/Steam/...`); only what the
    /// walk discovered beneath them is subject to the heuristics. Paths not
    /// under `root` are judged whole.
    pub fn is_candidate_under(&self, root: &Path, path: &Path) -> bool {
        let relative = path.strip_prefix(root).unwrap_or(path);
        self.judge(path, relative)
    }

    fn judge(&self, path: &Path, rule_subject: &Path) -> bool {
        if !has_extension(path, self.extension) {
            return false;
        }
        if let Some(rule) = self.rules.first_match(&rule_subject.to_string_lossy()) {
            tracing::trace!(path = %path.display(), ?rule, "Excluded candidate");
            return false;
        }
        path.is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"MZ").unwrap();
    }

    /// Every keyword excludes a file name containing it, whatever the case.
    #[test]
    fn keyword_in_file_name_is_excluded() {
        let rules = ExclusionRules::default();
        for name in [
            r"C:\Games\Foo\GameSetup.exe",
            r"C:\Games\Foo\update_tool.exe",
            r"C:\Games\Foo\UnityCrashHandler64.exe",
            r"C:\Games\Foo\EasyAntiCheat_EOS_Svc.exe",
            r"C:\Games\Foo\LAUNCHER.EXE",
            "/games/foo/unins000.exe",
        ] {
            assert!(rules.is_excluded(name), "{name} should be excluded");
        }
    }

    #[test]
    fn keyword_in_folder_excludes_contents() {
        let rules = ExclusionRules::default();
        assert!(rules.is_excluded(r"C:\Games\Foo\Tools\editor.exe"));
        assert!(rules.is_excluded("/games/foo/docs/viewer.exe"));
    }

    #[test]
    fn structural_segments_are_excluded() {
        let rules = ExclusionRules::default();
        assert!(rules.is_excluded(r"C:\Users\me\AppData\Local\thing.exe"));
        assert!(rules.is_excluded(r"C:\Games\Foo\Foo_Data\helper.exe"));
        assert!(rules.is_excluded(r"C:\Games\Foo\_CommonRedist\vcredist.exe"));
        assert!(rules.is_excluded(r"C:\Games\Foo\__Installer\dx.exe"));
        assert!(rules.is_excluded(r"C:\$Recycle.Bin\game.exe"));
        assert!(rules.is_excluded("/home/me/.wine/game.exe"));
        assert!(rules.is_excluded(r"C:\Windows\notepad.exe"));
    }

    /// Segment rules compare whole segments: `WindowsNoEditor` is a common
    /// packaged-game folder and must survive.
    #[test]
    fn segment_rules_do_not_match_partial_names() {
        let rules = ExclusionRules::default();
        assert!(!rules.is_excluded(r"C:\Games\Foo\WindowsNoEditor\Foo.exe"));
        assert!(!rules.is_excluded(r"C:\Games\Half-Life 2\hl2.exe"));
        assert!(!rules.is_excluded("/games/foo/bin64/game.exe"));
    }

    #[test]
    fn first_match_reports_rule_in_order() {
        let rules = ExclusionRules::default();
        assert_eq!(
            rules.first_match(r"C:\Games\Setup\update.exe"),
            Some(&Matcher::Keyword("setup".to_owned()))
        );
        assert_eq!(rules.first_match(r"C:\Games\hl2.exe"), None);
    }

    #[test]
    fn custom_rules_are_lowercased() {
        let rules = ExclusionRules::new(vec![Matcher::Keyword("DEMO".to_owned())]);
        assert!(rules.is_excluded("/games/Demo.exe"));
        assert!(!rules.is_excluded("/games/setup.exe"));
    }

    #[test]
    fn accepts_existing_exe_and_rejects_wrong_extension() {
        let tmp = TempDir::new().unwrap();
        let exe = tmp.path().join("game.exe");
        let upper = tmp.path().join("OTHER.EXE");
        let dll = tmp.path().join("game.dll");
        touch(&exe);
        touch(&upper);
        touch(&dll);

        let filter = CandidateFilter::default();
        assert!(filter.is_candidate_under(tmp.path(), &exe));
        assert!(filter.is_candidate_under(tmp.path(), &upper));
        assert!(!filter.is_candidate_under(tmp.path(), &dll));
    }

    #[test]
    fn vanished_file_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let exe = tmp.path().join("game.exe");
        touch(&exe);
        let filter = CandidateFilter::default();
        assert!(filter.is_candidate_under(tmp.path(), &exe));

        fs::remove_file(&exe).unwrap();
        assert!(!filter.is_candidate_under(tmp.path(), &exe));
    }

    #[test]
    fn directory_named_like_exe_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("folder.exe");
        fs::create_dir_all(&dir).unwrap();
        assert!(!CandidateFilter::default().is_candidate_under(tmp.path(), &dir));
    }

    /// The root prefix is trusted; only the discovered part is judged.
    #[test]
    fn rules_ignore_root_prefix() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join(".steam").join("steamapps").join("common");
        let exe = root.join("Foo").join("foo.exe");
        touch(&exe);

        let filter = CandidateFilter::default();
        assert!(!filter.is_candidate(&exe));
        assert!(filter.is_candidate_under(&root, &exe));

        let helper = root.join("Foo").join("FooSetup.exe");
        touch(&helper);
        assert!(!filter.is_candidate_under(&root, &helper));
    }

    #[test]
    fn predicate_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let keep = tmp.path().join("game.exe");
        let drop = tmp.path().join("GameSetup.exe");
        touch(&keep);
        touch(&drop);

        let filter = CandidateFilter::default();
        for path in [&keep, &drop] {
            let first = filter.is_candidate_under(tmp.path(), path);
            let second = filter.is_candidate_under(tmp.path(), path);
            assert_eq!(first, second);
        }
    }
}
