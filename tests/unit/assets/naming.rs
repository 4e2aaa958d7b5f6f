use super::*;

#[test]
fn hyphen_suffix_wins_over_plain_suffix() {
    assert_eq!(
        strip_blue_token("logo-blue"),
        ("logo", Some(BlueToken::HyphenSuffix))
    );
    assert_eq!(
        strip_blue_token("logo-BLUE"),
        ("logo", Some(BlueToken::HyphenSuffix))
    );
}

#[test]
fn suffix_without_hyphen() {
    assert_eq!(strip_blue_token("shieldblue"), ("shield", Some(BlueToken::Suffix)));
}

#[test]
fn prefix_rule_fires_last() {
    assert_eq!(
        strip_blue_token("blue-sword"),
        ("sword", Some(BlueToken::HyphenPrefix))
    );
    // Suffix rule has priority even when the prefix also matches.
    assert_eq!(
        strip_blue_token("blue-skyblue"),
        ("blue-sky", Some(BlueToken::Suffix))
    );
}

#[test]
fn no_token_keeps_stem() {
    assert_eq!(strip_blue_token("axe"), ("axe", None));
    assert_eq!(strip_blue_token("bluebird"), ("bluebird", None));
}

#[test]
fn stripping_to_empty_is_refused() {
    assert_eq!(strip_blue_token("blue"), ("blue", None));
    assert_eq!(strip_blue_token("-blue"), ("-blue", None));
}

#[test]
fn non_ascii_stems_do_not_panic() {
    assert_eq!(strip_blue_token("é"), ("é", None));
    assert_eq!(strip_blue_token("ßblue"), ("ß", Some(BlueToken::Suffix)));
}

#[test]
fn output_names_are_png_and_keep_dirs() {
    assert_eq!(output_file_name("logo-blue.jpg"), "logo.png");
    assert_eq!(output_file_name("blue-axe.PNG"), "axe.png");
    assert_eq!(
        output_rel_path(Path::new("weapons/blue-axe.jpeg")),
        PathBuf::from("weapons/axe.png")
    );
    assert_eq!(output_rel_path(Path::new("axe.png")), PathBuf::from("axe.png"));
}

#[test]
fn rewrite_is_deterministic() {
    for name in ["a-blue.png", "ablue.png", "blue-a.png", "a.png"] {
        assert_eq!(output_file_name(name), output_file_name(name));
    }
}

#[test]
fn eligibility_is_case_insensitive() {
    assert!(is_source_raster(Path::new("a.PNG")));
    assert!(is_source_raster(Path::new("a.Jpeg")));
    assert!(!is_source_raster(Path::new("a.png.json")));
    assert!(!is_source_raster(Path::new("README")));
    assert!(is_output_raster(Path::new("x/y.png")));
    assert!(!is_output_raster(Path::new("x/y.jpg")));
}

#[test]
fn sidecar_appends_json_to_full_file_name() {
    assert_eq!(
        sidecar_path(Path::new("icons/blue/a-blue.png")),
        PathBuf::from("icons/blue/a-blue.png.json")
    );
}

#[test]
fn source_candidates_prefer_blue_suffix() {
    let candidates = source_candidates(Path::new("weapons/axe.png"));
    let expected: Vec<PathBuf> = [
        "weapons/axe-blue.png",
        "weapons/axe-blue.jpg",
        "weapons/axe-blue.jpeg",
        "weapons/axe.png",
        "weapons/axe.jpg",
        "weapons/axe.jpeg",
    ]
    .iter()
    .map(PathBuf::from)
    .collect();
    assert_eq!(candidates, expected);
}

#[test]
fn source_candidates_cover_jpeg_sources() {
    for source in ["logo-blue.jpg", "logo.jpeg"] {
        let out = output_rel_path(Path::new(source));
        assert!(source_candidates(&out).contains(&PathBuf::from(source)));
    }
}
