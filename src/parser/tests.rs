use super::*;

fn parser() -> AttendanceParser {
    AttendanceParser::new(ParserConfig::default()).expect("parser regexes should compile")
}

fn assert_consistent(records: &[ParsedRecord]) {
    for record in records {
        assert!(record.present <= record.total, "{record:?}");
        assert!(record.absent <= record.total, "{record:?}");
        assert_eq!(record.present + record.absent, record.total, "{record:?}");
        let expected = if record.total > 0 {
            f64::from(record.present) / f64::from(record.total) * 100.0
        } else {
            0.0
        };
        assert!((record.percentage - expected).abs() < 1e-9, "{record:?}");
    }
}

#[test]
fn empty_input_yields_no_records() {
    assert!(parser().parse("").is_empty());
    assert!(parser().parse("\n\n   \n").is_empty());
}

#[test]
fn portal_row_is_parsed_positionally() {
    let records = parser().parse("DATA STRUCTURES AND ALGORITHMS 23 17 6 73.91 0.00");

    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.name, "DATA STRUCTURES AND ALGORITHMS");
    assert_eq!((record.total, record.present, record.absent), (23, 17, 6));
    assert!((record.percentage - 73.913).abs() < 0.01);
    assert_eq!(record.code, None);
}

#[test]
fn labeled_row_is_parsed() {
    let records = parser().parse("21CSC201J TH:34 PH:31 AH:3");

    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.name, "21CSC201J");
    assert_eq!(record.code.as_deref(), Some("21CSC201J"));
    assert_eq!((record.total, record.present, record.absent), (34, 31, 3));
    assert!((record.percentage - 91.176).abs() < 0.01);
}

#[test]
fn class_in_charge_row_keeps_reserved_code() {
    let records = parser().parse("CL 10 9 1");

    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.name, "CL");
    assert_eq!(record.code.as_deref(), Some("CL"));
    assert_eq!((record.total, record.present, record.absent), (10, 9, 1));
}

#[test]
fn class_in_charge_row_resolves_through_legend() {
    let text = "CL 8 6 75%\nLegend:\nCL - Class Teacher Hour";
    let records = parser().parse(text);

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "Class Teacher Hour");
    assert_eq!(records[0].code.as_deref(), Some("CL"));
    assert_eq!((records[0].total, records[0].present, records[0].absent), (8, 6, 2));
}

#[test]
fn legend_spelling_out_class_in_charge_stays_cl() {
    let text = "CL 10 9 1\nLegend:\nCL - Class In Charge";
    let records = parser().parse(text);

    assert_eq!(records[0].name, "CL");
}

#[test]
fn last_updated_stamp_is_ignored() {
    assert!(parser().parse("Last updated: 10/10/2024 12:30 PM").is_empty());
    assert!(parser().parse("LASTUPDATED ON 10 10 2024").is_empty());
}

#[test]
fn implausible_total_is_dropped() {
    let records = parser().parse("Physics Lab 450 400 50");
    assert!(records.is_empty());
}

#[test]
fn placeholder_with_large_total_is_dropped() {
    let records = parser().parse("X 250 200 50\nY 150 100 50");

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "Subject 1");
    assert_eq!(records[0].total, 150);
}

#[test]
fn thresholds_are_configurable() {
    let parser = AttendanceParser::new(ParserConfig {
        max_total: 500,
        max_placeholder_total: 200,
    })
    .expect("parser regexes should compile");

    let records = parser.parse("Physics Lab 450 400 50");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].total, 450);
}

#[test]
fn legend_resolves_code_and_is_excluded_from_rows() {
    let text = "\
Code TH PH AH %
21CSC201J TH:34 PH:31 AH:3
21MAB204T 40 30 10 75.00
Legend:
21CSC201J - Data Structures
21MAB204T : Probability and Queueing Theory
";
    let records = parser().parse(text);

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].name, "Data Structures");
    assert_eq!(records[0].code.as_deref(), Some("21CSC201J"));
    assert_eq!(records[1].name, "Probability and Queueing Theory");
    assert_eq!(records[1].code.as_deref(), Some("21MAB204T"));
    assert_eq!((records[1].total, records[1].present, records[1].absent), (40, 30, 10));
}

#[test]
fn header_and_portal_total_rows_are_skipped() {
    let text = "\
Description Max Hours Att Hours Absent Average
Max. Hours 120
Att Hours 100
OD/ML 0
Total 120 100 20 83.33
Compiler Design 40 36 4 90.00
";
    let records = parser().parse(text);

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "Compiler Design");
}

#[test]
fn subject_token_borrows_numbers_from_next_line() {
    let text = "21CSC202J\n30 27 3 90.00%\n21CSC203P\n20 10";
    let records = parser().parse(text);

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].name, "21CSC202J");
    assert_eq!((records[0].total, records[0].present, records[0].absent), (30, 27, 3));
    assert_eq!(records[1].name, "21CSC203P");
    assert_eq!((records[1].total, records[1].present, records[1].absent), (20, 10, 10));
}

#[test]
fn next_line_outside_two_or_three_numbers_is_not_borrowed() {
    assert!(parser().parse("21CSC202J\n30").is_empty());
    assert!(parser().parse("21CSC202J\n30 27 3 5").is_empty());

    let records = parser().parse("21CSC202J 30 27\n1 2 3 4");
    assert_eq!(records.len(), 1);
    assert_eq!((records[0].total, records[0].present, records[0].absent), (30, 27, 3));
}

#[test]
fn numeric_lines_without_subject_token_are_skipped() {
    let text = "12:45 98%\n4G 67 12";
    assert!(parser().parse(text).is_empty());
}

#[test]
fn reordered_columns_are_corrected() {
    let records = parser().parse("21CSC205P 5 40 35 87.5%");

    assert_eq!(records.len(), 1);
    assert_eq!((records[0].total, records[0].present, records[0].absent), (40, 35, 5));
}

#[test]
fn off_by_one_absent_is_repaired() {
    let records = parser().parse("Networks TH 40 PH 30 AH 12");

    assert_eq!(records.len(), 1);
    assert_eq!((records[0].total, records[0].present, records[0].absent), (42, 30, 12));

    let records = parser().parse("Networks TH 40 PH 30 AH 8");
    assert_eq!((records[0].total, records[0].present, records[0].absent), (40, 30, 10));
}

#[test]
fn missing_field_is_inferred() {
    let records = parser().parse("Maths PH 18 AH 2\nChemistry TC 25 AH 5");

    assert_eq!(records.len(), 2);
    assert_eq!((records[0].total, records[0].present, records[0].absent), (20, 18, 2));
    assert_eq!((records[1].total, records[1].present, records[1].absent), (25, 20, 5));
}

#[test]
fn single_count_without_partner_is_discarded() {
    assert!(parser().parse("21CSC201J total 34").is_empty());
}

#[test]
fn short_fragments_become_placeholders() {
    let records = parser().parse("EE 20 15 5\nCS 10 9 1");

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].name, "Subject 1");
    assert_eq!(records[1].name, "Subject 2");
}

#[test]
fn duplicate_names_keep_first_occurrence() {
    let text = "Physics 20 18 2\nphysics 30 15 15\nChemistry 10 5 5";
    let records = parser().parse(text);

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].name, "Physics");
    assert_eq!(records[0].total, 20);
    assert_eq!(records[1].name, "Chemistry");
}

#[test]
fn dedupe_by_name_is_stable() {
    let records = vec![
        ParsedRecord::new("A".to_string(), 1, 1, 0, None),
        ParsedRecord::new("b".to_string(), 2, 1, 1, None),
        ParsedRecord::new("a".to_string(), 3, 3, 0, None),
        ParsedRecord::new("B".to_string(), 4, 4, 0, None),
        ParsedRecord::new("c".to_string(), 5, 5, 0, None),
    ];

    let names = dedupe_by_name(records)
        .into_iter()
        .map(|record| (record.name, record.total))
        .collect::<Vec<_>>();
    assert_eq!(
        names,
        vec![
            ("A".to_string(), 1),
            ("b".to_string(), 2),
            ("c".to_string(), 5)
        ]
    );
}

#[test]
fn noisy_screenshot_text_keeps_invariants_and_is_repeatable() {
    let text = "\
9:41 4G 87%
Attendance Details
Code Description TH PH AH %
21CSC201J TH:34 PH:31 AH:3 91.18%
21MAB204T 40 31 10 77.50
C L
10 9 1
Average 85.00
Last updated: 10/10/2024 12:30 PM
Legend:
21CSC201J - Data Structures
21MAB204T - Probability
CL - Class In Charge
";
    let parser = parser();
    let first = parser.parse(text);
    let second = parser.parse(text);

    assert_eq!(first, second);
    assert_consistent(&first);

    let names = first
        .iter()
        .map(|record| record.name.as_str())
        .collect::<Vec<&str>>();
    assert!(names.contains(&"Data Structures"));
    assert!(names.contains(&"Probability"));
    assert!(names.contains(&"CL"));
}

#[test]
fn infer_missing_count_needs_two_fields() {
    assert_eq!(infer_missing_count(Some(10), None, None), None);
    assert_eq!(
        infer_missing_count(None, Some(7), Some(3)),
        Some(Counts {
            total: 10,
            present: 7,
            absent: 3
        })
    );
    assert_eq!(
        infer_missing_count(Some(5), None, Some(8)),
        Some(Counts {
            total: 5,
            present: 0,
            absent: 8
        })
    );
}

#[test]
fn repair_counts_trusts_present_over_absent() {
    let repaired = repair_counts(Counts {
        total: 5,
        present: 0,
        absent: 8,
    });
    assert_eq!(
        repaired,
        Counts {
            total: 8,
            present: 0,
            absent: 8
        }
    );

    let repaired = repair_counts(Counts {
        total: 30,
        present: 20,
        absent: 1,
    });
    assert_eq!(repaired.absent, 10);
}

#[test]
fn placeholder_name_detection() {
    assert!(is_placeholder_name("Subject 12"));
    assert!(is_placeholder_name("subject  3"));
    assert!(!is_placeholder_name("Subject Design"));
    assert!(!is_placeholder_name("Subjects"));
}

#[test]
fn code_detection_helpers() {
    assert!(is_code_like("21CSC201J"));
    assert!(!is_code_like("CSC2"));
    assert!(!is_code_like("PHYSICS"));
    assert!(contains_code_like_token("(21MAB204T)"));
    assert_eq!(code_from_name("cl"), Some("CL".to_string()));
    assert_eq!(code_from_name("Lab 21csc201j"), Some("21CSC201J".to_string()));
    assert_eq!(code_from_name("Physics"), None);
}
