use kiln_fs::NormalizedPath;
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
#[case("a/../b", "b")]
#[case("/a/b/../../c", "/c")]
#[case("a\\..\\b", "b")]
#[case("a/./b//c", "a/b/c")]
#[case("../env", "../env")]
#[case("/../etc", "/etc")]
#[case("", ".")]
#[case("./", ".")]
fn normalizes_segments(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(NormalizedPath::new(input).as_str(), expected);
}

#[rstest]
#[case("/project", "src/index.ts", "/project/src/index.ts")]
#[case("/project", "../shared/.env", "/shared/.env")]
#[case("/project/", "dist", "/project/dist")]
#[case("/project", "/abs/public", "/abs/public")]
fn join_resolves_against_base(#[case] base: &str, #[case] segment: &str, #[case] expected: &str) {
    let base = NormalizedPath::new(base);
    assert_eq!(base.join(segment).as_str(), expected);
}

#[test]
fn absolute_detection() {
    assert!(NormalizedPath::new("/root").is_absolute());
    assert!(NormalizedPath::new("D:/root").is_absolute());
    assert!(!NormalizedPath::new("root").is_absolute());
    assert!(!NormalizedPath::new("./root").is_absolute());
}

#[test]
fn file_name_and_extension() {
    let path = NormalizedPath::new("/project/kiln.config.ts");
    assert_eq!(path.file_name(), Some("kiln.config.ts"));
    assert_eq!(path.extension(), Some("ts"));

    let dotfile = NormalizedPath::new("/project/.env");
    assert_eq!(dotfile.file_name(), Some(".env"));
    assert_eq!(dotfile.extension(), None);
}

#[test]
fn serde_roundtrip_as_plain_string() {
    let path = NormalizedPath::new("/project/./dist");
    let json = serde_json::to_string(&path).unwrap();
    assert_eq!(json, "\"/project/dist\"");

    let back: NormalizedPath = serde_json::from_str("\"/project\\\\dist\"").unwrap();
    assert_eq!(back.as_str(), "/project/dist");
}

#[test]
fn current_dir_is_absolute_and_normalized() {
    let cwd = NormalizedPath::current_dir().unwrap();
    assert!(cwd.is_absolute());
    assert!(!cwd.as_str().contains('\\'));
}
