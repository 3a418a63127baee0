//! End-to-end tests for CSV formatting of frequency distribution results.

use freqdist_flatten::aggregator::{apply_baseline, flatten_tree, FlatTable};
use freqdist_flatten::parser::{parse_results, ResultNode};
use freqdist_flatten::utils::error::FormatError;
use freqdist_flatten::{format_result, json_to_csv, FormattedOutput, OutputFormat, TaskDescriptor};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

// ============================================================================
// SHARED TEST HELPERS
// ============================================================================

fn gender_result() -> Value {
    json!({
        "interactions": 18,
        "unique_authors": 9,
        "analysis": {
            "analysis_type": "freqDist",
            "parameters": { "target": "fb.author.gender", "threshold": 3 },
            "results": [
                { "key": "male", "interactions": 10, "unique_authors": 5 },
                { "key": "female", "interactions": 8, "unique_authors": 4 }
            ],
            "redacted": false
        }
    })
}

/// brand → age → gender, three levels
fn brand_age_gender() -> Value {
    json!({
        "analysis": {
            "results": [{
                "key": "brand",
                "interactions": 60,
                "unique_authors": 30,
                "child": { "results": [
                    {
                        "key": "18-24",
                        "interactions": 30,
                        "unique_authors": 16,
                        "child": { "results": [
                            { "key": "male", "interactions": 20, "unique_authors": 10 },
                            { "key": "female", "interactions": 10, "unique_authors": 6 }
                        ] }
                    },
                    {
                        "key": "25-34",
                        "interactions": 30,
                        "unique_authors": 14,
                        "child": { "results": [
                            { "key": "male", "interactions": 12, "unique_authors": 5 },
                            { "key": "female", "interactions": 18, "unique_authors": 9 }
                        ] }
                    }
                ] }
            }]
        }
    })
}

fn brand_age_gender_task() -> TaskDescriptor {
    TaskDescriptor::new("interaction.tag_tree.brand", 200).with_child(
        TaskDescriptor::new("fb.author.age", 6)
            .with_child(TaskDescriptor::new("fb.author.gender", 6)),
    )
}

fn table_for(raw: &Value, baseline_depth: Option<usize>) -> FlatTable {
    let nodes = parse_results(raw).unwrap();
    let table = flatten_tree(&nodes).unwrap();
    match baseline_depth {
        Some(depth) => apply_baseline(table, depth).unwrap(),
        None => table,
    }
}

fn count_leaves(nodes: &[ResultNode]) -> usize {
    nodes.iter().map(ResultNode::leaf_count).sum()
}

// ============================================================================
// SCENARIOS
// ============================================================================

#[test]
fn test_two_leaf_tree_without_baseline() {
    let task = TaskDescriptor::new("fb.author.gender", 3);
    let csv = json_to_csv(&task, &gender_result()).unwrap();

    assert_eq!(
        csv,
        "key1,interactions,unique_authors\n\
         male,10,5\n\
         female,8,4\n"
    );
}

#[test]
fn test_two_leaf_tree_with_baseline() {
    let task = TaskDescriptor::new("fb.author.gender", 3).as_baseline();
    let csv = json_to_csv(&task, &gender_result()).unwrap();

    let male = 5.0_f64 / 9.0;
    let female = 4.0_f64 / 9.0;
    let expected = format!(
        "key1,interactions,unique_authors,baselinekey_percent,percent_of_total,total_authors\n\
         male,10,5,{m},{m},9\n\
         female,8,4,{f},{f},9\n",
        m = male,
        f = female
    );
    assert_eq!(csv, expected);
}

#[test]
fn test_merged_leaf_key_expands_columns() {
    let task = TaskDescriptor::new("fb.author.age", 2);
    let raw = json!([
        { "key": "18-24__male", "interactions": 7, "unique_authors": 3 },
        { "key": "18-24__female", "interactions": 2, "unique_authors": 2 }
    ]);
    let csv = json_to_csv(&task, &raw).unwrap();

    assert_eq!(
        csv,
        "key2,key1,interactions,unique_authors\n\
         18-24,male,7,3\n\
         18-24,female,2,2\n"
    );
}

#[test]
fn test_merged_task_object_labels() {
    let task = TaskDescriptor::new("fb.parent.author.gender", 2).with_child(
        TaskDescriptor::new("fb.parent.author.age", 2)
            .with_child(TaskDescriptor::new("fb.type", 2)),
    );
    let raw = json!([{
        "male__18-24": [
            { "key": "photo", "interactions": 4, "unique_authors": 3 },
            { "key": "status", "interactions": 1, "unique_authors": 1 }
        ],
        "female__18-24": [
            { "key": "photo", "interactions": 6, "unique_authors": 5 }
        ]
    }]);

    // Merged labels sit one tree level above the leaves, but split into two columns
    let nodes = parse_results(&raw).unwrap();
    assert_eq!(count_leaves(&nodes), 3);

    let table = flatten_tree(&nodes).unwrap();
    assert_eq!(table.key_columns(), 3);
    let keys: Vec<String> = table.rows.keys().map(|k| k.to_csv()).collect();
    assert_eq!(
        keys,
        vec!["male,18-24,photo", "male,18-24,status", "female,18-24,photo"]
    );

    // Two tree levels, but three key columns for a three-level task
    let csv = json_to_csv(&task, &raw).unwrap();
    assert_eq!(
        csv,
        "key3,key2,key1,interactions,unique_authors\n\
         male,18-24,photo,4,3\n\
         male,18-24,status,1,1\n\
         female,18-24,photo,6,5\n"
    );
}

#[test]
fn test_three_level_baseline_on_age() {
    let mut task = brand_age_gender_task();
    task.child.as_mut().unwrap().baseline = true;

    let csv = json_to_csv(&task, &brand_age_gender()).unwrap();
    let lines: Vec<&str> = csv.lines().collect();

    assert_eq!(
        lines[0],
        "key3,key2,key1,interactions,unique_authors,baselinekey_percent,percent_of_total,total_authors"
    );
    assert_eq!(lines.len(), 5);
    assert!(lines[1].starts_with("brand,18-24,male,20,10,"));
    assert!(lines[1].ends_with(",30"));
}

#[test]
fn test_json_format_is_passthrough() {
    let task = TaskDescriptor::new("fb.author.gender", 3).as_baseline();
    let output = format_result(&task, brand_age_gender(), OutputFormat::Json).unwrap();
    assert_eq!(output, FormattedOutput::Json(brand_age_gender()));
}

// ============================================================================
// PROPERTIES
// ============================================================================

#[test]
fn test_row_count_equals_leaf_count() {
    for raw in [gender_result(), brand_age_gender()] {
        let nodes = parse_results(&raw).unwrap();
        let table = flatten_tree(&nodes).unwrap();
        assert_eq!(table.rows.len(), count_leaves(&nodes));
    }
}

#[test]
fn test_key_column_count_constant() {
    let table = table_for(&brand_age_gender(), None);
    assert!(table.rows.keys().all(|k| k.len() == table.key_columns()));
}

#[test]
fn test_no_baseline_counts_verbatim() {
    let task = brand_age_gender_task();
    let csv = json_to_csv(&task, &brand_age_gender()).unwrap();

    assert_eq!(
        csv,
        "key3,key2,key1,interactions,unique_authors\n\
         brand,18-24,male,20,10\n\
         brand,18-24,female,10,6\n\
         brand,25-34,male,12,5\n\
         brand,25-34,female,18,9\n"
    );
}

#[test]
fn test_percent_of_class_shared_within_class() {
    let table = table_for(&brand_age_gender(), Some(2));

    let mut by_class: Vec<(String, f64, u64)> = Vec::new();
    for row in table.rows.values() {
        let share = row.baseline.as_ref().unwrap();
        match by_class.iter().find(|(c, _, _)| *c == share.class) {
            Some((_, pct, total)) => {
                assert_eq!(*pct, share.percent_of_class);
                assert_eq!(*total, share.class_total_unique_authors);
            }
            None => by_class.push((
                share.class.clone(),
                share.percent_of_class,
                share.class_total_unique_authors,
            )),
        }
    }

    // male: 10 + 5, female: 6 + 9
    assert_eq!(by_class.len(), 2);
    let class_sum: u64 = by_class.iter().map(|(_, _, t)| t).sum();
    assert_eq!(class_sum, table.total_unique_authors);
    let pct_sum: f64 = by_class.iter().map(|(_, p, _)| p).sum();
    assert!((pct_sum - 1.0).abs() < 1e-9);
}

#[test]
fn test_percent_of_total_sums_to_one() {
    for depth in 0..3 {
        let table = table_for(&brand_age_gender(), Some(depth));
        let sum: f64 = table
            .rows
            .values()
            .map(|r| r.baseline.as_ref().unwrap().percent_of_total)
            .sum();
        assert!((sum - 1.0).abs() < 1e-9, "depth {} sums to {}", depth, sum);
    }
}

// ============================================================================
// EDGE CASES
// ============================================================================

#[test]
fn test_escaping_in_rows() {
    let task = TaskDescriptor::new("fb.author.name", 3);
    let raw = json!([
        { "key": "He said \"hi\", bye", "interactions": 1, "unique_authors": 1 },
        { "key": "two\nlines", "interactions": 2, "unique_authors": 1 }
    ]);
    let csv = json_to_csv(&task, &raw).unwrap();

    assert_eq!(
        csv,
        "key1,interactions,unique_authors\n\
         \"He said \"\"hi\"\", bye\",1,1\n\
         twolines,2,1\n"
    );
}

#[test]
fn test_commas_in_labels_do_not_shift_baseline_class() {
    // A label with ",x" inside must stay one column; the class is the whole label
    let task = TaskDescriptor::new("fb.author.region", 10)
        .as_baseline()
        .with_child(TaskDescriptor::new("fb.author.gender", 2));
    let raw = json!([{
        "key": "Washington,DC",
        "interactions": 3,
        "unique_authors": 3,
        "child": { "results": [
            { "key": "male", "interactions": 2, "unique_authors": 2 },
            { "key": "female", "interactions": 1, "unique_authors": 1 }
        ] }
    }]);

    let table = table_for(&raw, Some(0));
    let share = table.rows[0].baseline.as_ref().unwrap();
    assert_eq!(share.class, "\"Washington,DC\"");
    assert_eq!(share.class_total_unique_authors, 3);

    let csv = json_to_csv(&task, &raw).unwrap();
    assert!(csv.contains("\"Washington,DC\",male,2,2,1,"));
}

#[test]
fn test_zero_authors_with_baseline_is_reported() {
    let task = TaskDescriptor::new("fb.author.gender", 3).as_baseline();
    let raw = json!({ "analysis": { "results": [], "redacted": true } });
    assert!(matches!(json_to_csv(&task, &raw), Err(FormatError::ZeroTotal)));
}

#[test]
fn test_empty_result_without_baseline() {
    let task = TaskDescriptor::new("fb.author.gender", 3);
    let raw = json!({ "analysis": { "results": [], "redacted": true } });
    assert_eq!(
        json_to_csv(&task, &raw).unwrap(),
        "interactions,unique_authors\n"
    );
}

#[test]
fn test_baseline_deeper_than_keys_is_mismatch() {
    let task = TaskDescriptor::new("fb.author.gender", 3)
        .with_child(TaskDescriptor::new("fb.type", 2).as_baseline());
    // Leaves at the first level only: descriptor says two levels
    let raw = json!([
        { "key": "male", "interactions": 1, "unique_authors": 1 }
    ]);
    assert!(matches!(
        json_to_csv(&task, &raw),
        Err(FormatError::StructuralMismatch(_))
    ));
}

#[test]
fn test_tree_nested_deeper_than_task_is_mismatch() {
    // One-level task, two-level result: rendering it would invent a key column
    let task = TaskDescriptor::new("fb.author.gender", 3);
    let raw = json!([{
        "key": "male",
        "interactions": 3,
        "unique_authors": 3,
        "child": { "results": [
            { "key": "photo", "interactions": 2, "unique_authors": 2 },
            { "key": "status", "interactions": 1, "unique_authors": 1 }
        ] }
    }]);

    assert!(matches!(
        json_to_csv(&task, &raw),
        Err(FormatError::StructuralMismatch(_))
    ));
    assert!(format_result(&task, raw.clone(), OutputFormat::Csv).is_err());
    // JSON pass-through never inspects the shape
    assert!(format_result(&task, raw, OutputFormat::Json).is_ok());
}

#[test]
fn test_invalid_key_type_fails_fast() {
    let task = TaskDescriptor::new("fb.author.gender", 3);
    let raw = json!([{ "key": ["male"], "interactions": 1, "unique_authors": 1 }]);
    assert!(matches!(json_to_csv(&task, &raw), Err(FormatError::Parse(_))));
}
