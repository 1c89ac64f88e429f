use gamesoc_core::{
    build_recipient_set, parse_pasted, parse_sheet_csv, AddOutcome, Recipient,
    RecipientSetBuilder, RecipientSource, RecipientSources,
};

#[test]
fn pasted_text_parses_named_bare_and_bad_lines() {
    let parsed = parse_pasted("Alice, alice@x.com\nbob@x.com\nbad-line");

    assert_eq!(
        parsed.recipients,
        vec![
            Recipient {
                name: "Alice".to_string(),
                email: "alice@x.com".to_string(),
            },
            Recipient {
                name: "Participant".to_string(),
                email: "bob@x.com".to_string(),
            },
        ]
    );
    assert_eq!(parsed.errors.len(), 1);
    assert_eq!(parsed.errors[0].line, 3);
    assert_eq!(parsed.errors[0].input, "bad-line");
}

#[test]
fn build_keeps_line_errors_and_continues() {
    let set = build_recipient_set(&RecipientSources {
        pasted_text: Some("Alice, alice@x.com\nbob@x.com\nbad-line\nCara, cara@x.com".into()),
        ..RecipientSources::default()
    });

    assert_eq!(set.len(), 3);
    assert_eq!(set.errors().len(), 1);
    assert_eq!(set.errors()[0].source, RecipientSource::Pasted);
    assert_eq!(set.errors()[0].line, 3);
}

#[test]
fn dedup_is_case_insensitive_across_sources_and_first_wins() {
    let set = build_recipient_set(&RecipientSources {
        sheet_rows: vec![Recipient::new("Bob From Sheet", "Bob@X.com")],
        manual_entries: vec![Recipient::new("Bob Manual", "bob@x.com")],
        pasted_text: Some("Bobby, BOB@x.COM\nAna, ana@x.com".into()),
    });

    assert_eq!(set.len(), 2);
    assert_eq!(set.recipients()[0].name, "Bob From Sheet");
    assert_eq!(set.recipients()[0].email, "Bob@X.com");
    assert_eq!(set.recipients()[1].email, "ana@x.com");
    assert_eq!(set.duplicates(), 2);
    assert!(set.errors().is_empty());
}

#[test]
fn invalid_sheet_and_manual_entries_are_recorded_with_source() {
    let set = build_recipient_set(&RecipientSources {
        sheet_rows: vec![
            Recipient::new("Ok", "ok@x.com"),
            Recipient::new("Broken", "broken"),
        ],
        manual_entries: vec![Recipient::new("Typo", "typo@x")],
        pasted_text: None,
    });

    assert_eq!(set.len(), 1);
    let sources: Vec<(RecipientSource, usize)> = set
        .errors()
        .iter()
        .map(|err| (err.source, err.line))
        .collect();
    assert_eq!(
        sources,
        vec![(RecipientSource::Sheet, 2), (RecipientSource::Manual, 1)]
    );
}

#[test]
fn builder_reports_outcome_per_candidate() {
    let mut builder = RecipientSetBuilder::new();

    assert_eq!(
        builder.add(RecipientSource::Manual, 1, Recipient::new("Ana", "ana@x.com")),
        AddOutcome::Added
    );
    assert_eq!(
        builder.add(RecipientSource::Manual, 2, Recipient::new("Ana 2", " ANA@x.com ")),
        AddOutcome::Duplicate
    );
    assert_eq!(
        builder.add(RecipientSource::Manual, 3, Recipient::new("Nope", "nope")),
        AddOutcome::Rejected
    );

    let set = builder.build();
    assert_eq!(set.len(), 1);
    assert_eq!(set.duplicates(), 1);
    assert_eq!(set.errors().len(), 1);
}

#[test]
fn selection_controls_dispatch_total() {
    let mut set = build_recipient_set(&RecipientSources {
        pasted_text: Some("a@x.com\nb@x.com\nc@x.com".into()),
        ..RecipientSources::default()
    });
    assert_eq!(set.selected_count(), 3);

    assert!(set.set_selected("B@X.COM", false));
    assert!(!set.set_selected("missing@x.com", false));
    assert!(!set.is_selected("b@x.com"));
    assert_eq!(set.selected_count(), 2);

    let emails: Vec<String> = set.selected().into_iter().map(|r| r.email).collect();
    assert_eq!(emails, vec!["a@x.com", "c@x.com"]);

    set.select_all(false);
    assert!(set.selected().is_empty());
    set.select_all(true);
    assert_eq!(set.selected_count(), 3);
}

#[test]
fn sheet_export_feeds_recipient_set() {
    let parsed = parse_sheet_csv(
        "Timestamp,Name,Email\n\
         2024-09-01,Ana,ana@uni.ac.uk\n\
         2024-09-02,Ben,BEN@uni.ac.uk\n\
         2024-09-03,Ben again,ben@uni.ac.uk\n",
    )
    .unwrap();
    assert!(parsed.errors.is_empty());

    let set = build_recipient_set(&RecipientSources {
        sheet_rows: parsed.recipients,
        ..RecipientSources::default()
    });
    assert_eq!(set.len(), 2);
    assert_eq!(set.recipients()[1].name, "Ben");
}
