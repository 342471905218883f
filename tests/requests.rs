// tests/requests.rs

//! End-to-end tests for the request parsing pipeline: raw argument
//! tokens through coalescing, repository prefixes, and kind handling to
//! the final wanted/unwanted sets.

use satchel::{
    CapKind, CompareOp, DuplicatePolicy, Options, Repository, RepositoryRegistry, RequestParser,
    Scripted, Session, coalesce_args,
};

fn scripted_session() -> (Session, satchel::Transcript) {
    let terminal = Scripted::new(Vec::<String>::new());
    let transcript = terminal.transcript();
    let session = Session::with_terminal(Options::default(), Box::new(terminal));
    (session, transcript)
}

fn registry() -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::new();
    let mut main = Repository::new("main", "https://download.example.com/main");
    main.name = "Main Packages".to_string();
    registry.add(main);
    registry.add(Repository::new(
        "perl-devel",
        "https://download.example.com/perl-devel",
    ));
    registry.add(Repository::new(
        "non-oss",
        "https://download.example.com/non-oss",
    ));
    registry
}

#[test]
fn operator_split_across_tokens_is_one_request() {
    let (mut session, _) = scripted_session();
    let registry = registry();
    let requests = RequestParser::new(&mut session, &registry, CapKind::Package)
        .parse(&["satchel", "=", "1.2.15"])
        .unwrap();

    assert_eq!(requests.wanted().len(), 1);
    let cap = &requests.wanted()[0].capability;
    assert_eq!(cap.name, "satchel");
    let constraint = cap.constraint.as_ref().unwrap();
    assert_eq!(constraint.op, CompareOp::Eq);
    assert_eq!(constraint.edition.to_string(), "1.2.15");
}

#[test]
fn leading_operator_token_stays_separate() {
    // no left operand, so '=' and 'foo' are independent specifiers
    assert_eq!(coalesce_args(&["=", "foo"]), vec!["=", "foo"]);

    let (mut session, _) = scripted_session();
    let registry = registry();
    let requests = RequestParser::new(&mut session, &registry, CapKind::Package)
        .parse(&["=", "foo"])
        .unwrap();
    let names: Vec<&str> = requests
        .wanted()
        .iter()
        .map(|p| p.capability.name.as_str())
        .collect();
    assert_eq!(names, vec!["=", "foo"]);
}

#[test]
fn coalescing_is_idempotent() {
    let once = coalesce_args(&["vim", "satchel", ">=", "1.2.15", "opera=", "2:10.1"]);
    assert_eq!(coalesce_args(&once), once);
}

#[test]
fn full_mixed_command_line() {
    let (mut session, _) = scripted_session();
    let registry = registry();
    let requests = RequestParser::new(&mut session, &registry, CapKind::Package)
        .parse(&[
            "+vim",
            "-emacs",
            "libdnet1.i586",
            "perl-devel:perl(Digest::MD5)",
            "~non-oss:opera-2:10.1-1.2.gcc44.x86_64",
            "satchel>=1.2.15",
        ])
        .unwrap();

    assert_eq!(requests.wanted().len(), 5);
    assert_eq!(requests.unwanted().len(), 1);
    assert_eq!(requests.unwanted()[0].capability.name, "emacs");

    let perl = &requests.wanted()[2];
    assert_eq!(perl.repo.as_deref(), Some("perl-devel"));
    assert_eq!(perl.capability.name, "perl(Digest::MD5)");

    let opera = &requests.wanted()[3];
    assert_eq!(opera.repo.as_deref(), Some("non-oss"));
    assert_eq!(opera.capability.name, "opera");
    assert_eq!(opera.capability.arch.as_deref(), Some("x86_64"));
    let constraint = opera.capability.constraint.as_ref().unwrap();
    assert_eq!(constraint.edition.epoch, 2);
    assert_eq!(constraint.edition.to_string(), "2:10.1-1.2.gcc44");
}

#[test]
fn unknown_repo_prefix_is_part_of_the_name() {
    let (mut session, _) = scripted_session();
    let registry = RepositoryRegistry::new();
    let requests = RequestParser::new(&mut session, &registry, CapKind::Package)
        .parse(&["perl-devel:perl(Digest::MD5)"])
        .unwrap();

    let pair = &requests.wanted()[0];
    assert!(pair.repo.is_none());
    assert_eq!(pair.capability.name, "perl-devel:perl(Digest::MD5)");
}

#[test]
fn repo_tag_resolves_by_number() {
    let (mut session, _) = scripted_session();
    let registry = registry();
    let requests = RequestParser::new(&mut session, &registry, CapKind::Package)
        .parse(&["2:vim"])
        .unwrap();

    assert_eq!(requests.wanted()[0].repo.as_deref(), Some("perl-devel"));
    assert_eq!(requests.wanted()[0].capability.name, "vim");
}

#[test]
fn scheme_colon_does_not_become_a_repo_tag() {
    // the first colon splits off 'https', which no registry resolves;
    // the argument stays one specifier
    let (mut session, _) = scripted_session();
    let registry = registry();
    let requests = RequestParser::new(&mut session, &registry, CapKind::Package)
        .parse(&["https://download.example.com/non-oss:htop"])
        .unwrap();

    assert!(requests.wanted()[0].repo.is_none());
}

#[test]
fn context_kind_wins_silently_for_plain_arguments() {
    let (mut session, transcript) = scripted_session();
    let registry = registry();
    let requests = RequestParser::new(&mut session, &registry, CapKind::Pattern)
        .parse(&["vim"])
        .unwrap();

    assert_eq!(requests.wanted()[0].capability.kind, CapKind::Pattern);
    assert_eq!(transcript.count_tagged("warning"), 0);
}

#[test]
fn explicit_kind_wins_with_exactly_one_warning() {
    let (mut session, transcript) = scripted_session();
    let registry = registry();
    let requests = RequestParser::new(&mut session, &registry, CapKind::Pattern)
        .parse(&["patch:openssl"])
        .unwrap();

    assert_eq!(requests.wanted()[0].capability.kind, CapKind::Patch);
    assert_eq!(transcript.count_tagged("warning"), 1);
}

#[test]
fn duplicate_requests_follow_policy() {
    let registry = registry();

    let (mut session, _) = scripted_session();
    let requests = RequestParser::new(&mut session, &registry, CapKind::Package)
        .parse(&["+foo", "-foo"])
        .unwrap();
    assert_eq!(requests.wanted().len(), 1);
    assert_eq!(requests.unwanted().len(), 1);

    let (mut session, _) = scripted_session();
    let requests = RequestParser::new(&mut session, &registry, CapKind::Package)
        .duplicate_policy(DuplicatePolicy::LastWins)
        .parse(&["+foo", "-foo"])
        .unwrap();
    assert!(requests.wanted().is_empty());
    assert_eq!(requests.unwanted().len(), 1);

    let (mut session, _) = scripted_session();
    let err = RequestParser::new(&mut session, &registry, CapKind::Package)
        .duplicate_policy(DuplicatePolicy::Reject)
        .parse(&["+foo", "-foo"])
        .unwrap_err();
    assert!(err.to_string().contains("foo"));
}

#[test]
fn registry_loaded_from_toml_resolves_prefixes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("repos.toml");
    std::fs::write(
        &path,
        r#"
[[repository]]
alias = "non-oss"
name = "Non-OSS Packages"
url = "https://download.example.com/non-oss"
"#,
    )
    .unwrap();

    let registry = RepositoryRegistry::load(&path).unwrap();
    let (mut session, _) = scripted_session();
    let requests = RequestParser::new(&mut session, &registry, CapKind::Package)
        .parse(&["non-oss:opera"])
        .unwrap();
    assert_eq!(requests.wanted()[0].repo.as_deref(), Some("non-oss"));
}
