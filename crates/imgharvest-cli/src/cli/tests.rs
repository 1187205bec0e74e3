use super::*;

#[test]
fn cli_parse_no_args() {
    assert!(Cli::try_parse_from(["imgharvest"]).is_ok());
}

#[test]
fn cli_rejects_positional_url() {
    assert!(Cli::try_parse_from(["imgharvest", "https://example.com"]).is_err());
}

#[test]
fn cli_rejects_flags() {
    assert!(Cli::try_parse_from(["imgharvest", "--base-dir", "/tmp/site"]).is_err());
}

#[test]
fn cli_help_is_available() {
    let err = Cli::try_parse_from(["imgharvest", "--help"]).unwrap_err();
    assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
}

#[test]
fn seed_accepts_http_and_https() {
    assert_eq!(
        parse_seed("  https://example.com/\n").unwrap().as_str(),
        "https://example.com/"
    );
    assert_eq!(
        parse_seed("http://example.com:8080/projects").unwrap().as_str(),
        "http://example.com:8080/projects"
    );
}

#[test]
fn seed_rejects_bad_input() {
    assert!(parse_seed("").is_err());
    assert!(parse_seed("   \n").is_err());
    assert!(parse_seed("example.com").is_err());
    assert!(parse_seed("ftp://example.com/").is_err());
    assert!(parse_seed("file:///etc/passwd").is_err());
}
