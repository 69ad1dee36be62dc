use blasthits_core::hits::{count_hits, HitCounter, HitsError};

const FIVE_HITS: &str = include_str!("data/five_hits.xml");

/// Report whose container holds `elements` hits with `spacers` whitespace
/// nodes spread between them
fn report(elements: usize, spacers: usize) -> String {
    let mut body = String::new();
    for i in 0..elements.max(spacers) {
        if i < spacers {
            body.push_str(if i % 2 == 0 { "\n" } else { "\n    \t" });
        }
        if i < elements {
            body.push_str(&format!("<Hit><Hit_num>{}</Hit_num></Hit>", i + 1));
        }
    }
    format!(
        "<?xml version=\"1.0\"?>\n<BlastOutput><BlastOutput_iterations><Iteration><Iteration_hits>{}</Iteration_hits></Iteration></BlastOutput_iterations></BlastOutput>",
        body
    )
}

#[test]
fn whitespace_nodes_never_count() {
    for elements in [0, 1, 4, 7] {
        for spacers in [0, 1, 5, 12] {
            let xml = report(elements, spacers);
            assert_eq!(
                count_hits(&xml).unwrap(),
                elements,
                "{} elements with {} whitespace nodes",
                elements,
                spacers
            );
        }
    }
}

#[test]
fn empty_container_is_zero() {
    assert_eq!(count_hits("<Iteration><Iteration_hits/></Iteration>").unwrap(), 0);
    assert_eq!(count_hits("<Iteration><Iteration_hits>\n\n</Iteration_hits></Iteration>").unwrap(), 0);
}

#[test]
fn three_hits_in_any_whitespace_mix() {
    let compact = "<r><Iteration_hits><Hit/><Hit/><Hit/></Iteration_hits></r>";
    let spaced = "<r><Iteration_hits>\n<Hit/>\n\n<Hit>\n</Hit>  <Hit/>\n</Iteration_hits></r>";
    assert_eq!(count_hits(compact).unwrap(), 3);
    assert_eq!(count_hits(spaced).unwrap(), 3);
}

#[test]
fn any_element_counts_regardless_of_tag() {
    let xml = "<r><Iteration_hits><Hit/><NotAHit>x</NotAHit><other/></Iteration_hits></r>";
    assert_eq!(count_hits(xml).unwrap(), 3);
}

#[test]
fn not_xml_is_a_parse_error() {
    assert!(matches!(count_hits("not xml"), Err(HitsError::Parse(_))));
}

#[test]
fn truncated_document_is_a_parse_error() {
    let truncated = &FIVE_HITS[..FIVE_HITS.len() / 2];
    assert!(matches!(count_hits(truncated), Err(HitsError::Parse(_))));
}

#[test]
fn ncbi_report_with_doctype() {
    assert_eq!(count_hits(FIVE_HITS).unwrap(), 5);

    let summaries = HitCounter::new().summarize(FIVE_HITS).unwrap();
    assert_eq!(summaries.len(), 5);
    assert_eq!(summaries[0].accession.as_deref(), Some("OP123401"));
    assert_eq!(summaries[4].length, Some(2584));
}

#[test]
fn counting_is_idempotent() {
    let counter = HitCounter::new();
    let first = counter.count(FIVE_HITS).unwrap();
    let second = counter.count(FIVE_HITS).unwrap();
    assert_eq!(first, second);
}
